//! Memeforge Storage Library
//!
//! Flat file storage for uploaded source images and generated output.
//!
//! # Storage key format
//!
//! Keys are bare file names of the form `{unix_millis}-{token}.{ext}` (see [`generate_key`]).
//! Keys must not contain separators, `..`, or a leading `.`.

pub mod keys;
pub mod local;
pub mod traits;

pub use keys::{generate_key, validate_key};
pub use local::LocalStorage;
pub use traits::{ByteStream, Storage, StorageError, StorageResult, StoredFile};
