//! Key generation and validation for flat storage directories.
//!
//! Generated keys look like `{unix_millis}-{token}.{ext}`: the timestamp keeps directory
//! listings sortable, the random token keeps two writes in the same millisecond apart.

use crate::traits::{StorageError, StorageResult};
use chrono::Utc;
use uuid::Uuid;

const TOKEN_LEN: usize = 12;

/// Generate a new collision-free key with the given extension (without the dot).
pub fn generate_key(extension: &str) -> String {
    let token = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}.{}",
        Utc::now().timestamp_millis(),
        &token[..TOKEN_LEN],
        extension.trim_start_matches('.').to_lowercase()
    )
}

/// Reject keys that could escape the storage directory or name something other than a file.
pub fn validate_key(storage_key: &str) -> StorageResult<()> {
    if storage_key.is_empty() {
        return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
    }

    if storage_key.contains("..")
        || storage_key.contains('/')
        || storage_key.contains('\\')
        || storage_key.contains('\0')
        || storage_key.starts_with('.')
    {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }

    Ok(())
}
