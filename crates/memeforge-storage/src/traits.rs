//! Storage abstraction trait
//!
//! The service keeps two flat working directories (temporary uploads and public output). Both
//! are driven through [`Storage`], which is what the retention sweep and the generation pipeline
//! depend on.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::Stream;
use std::path::PathBuf;
use std::pin::Pin;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("List failed: {0}")]
    ListFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A file found while listing a storage directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub key: String,
    pub modified: DateTime<Utc>,
    pub size_bytes: u64,
}

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// Flat, key-addressed file storage.
///
/// Keys are plain file names: no separators, no `..`.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Short label used in logs (e.g. "uploads")
    fn label(&self) -> &str;

    /// Resolve a key to the file system path backing it
    fn locate(&self, storage_key: &str) -> StorageResult<PathBuf>;

    /// Write `data` under `storage_key`. Returns only after the data is flushed to disk.
    async fn write(&self, storage_key: &str, data: &[u8]) -> StorageResult<PathBuf>;

    /// Read a whole file
    async fn read(&self, storage_key: &str) -> StorageResult<Vec<u8>>;

    /// Stream a file in chunks
    async fn read_stream(&self, storage_key: &str) -> StorageResult<ByteStream>;

    /// Delete a file. Deleting a missing file succeeds.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Check if a file exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Size in bytes of a stored file
    async fn content_length(&self, storage_key: &str) -> StorageResult<u64>;

    /// List regular files with their modification times.
    ///
    /// Entries that cannot be inspected are logged and skipped; only a failure to read the
    /// directory itself is an error.
    async fn list(&self) -> StorageResult<Vec<StoredFile>>;
}
