use crate::error::{Result, WorkoutError};

/// Abstract interface for raw keyed blob I/O.
/// This trait handles the "how" of storage (filesystem vs memory),
/// while [`super::persistence::Persistence`] handles the "what" (encoding, failure policy).
///
/// Backends are shared between the store actor and the import reconciler,
/// so every method takes `&self` and implementations must be `Send + Sync`.
pub trait StorageBackend: Send + Sync {
    /// Read the blob stored under `key`.
    /// Returns Ok(None) if nothing was ever written.
    /// Returns Err only on actual I/O errors (permissions, disk failure).
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Replace the blob stored under `key`.
    /// MUST be atomic at the key level (e.g. write to tmp then rename).
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Remove the blob. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Keys double as file names for [`super::fs_backend::FsBackend`], so they are
/// restricted to a portable character set.
pub fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(WorkoutError::InvalidKey(key.to_string()))
    }
}
