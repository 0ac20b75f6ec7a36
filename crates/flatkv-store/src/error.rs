use std::io;
use std::path::PathBuf;

/// Errors from key-value store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing file could not be opened or read.
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Persisted content does not follow the `<key>:<value>` line format.
    #[error("malformed content at line {line}: {reason}")]
    Format { line: usize, reason: String },

    /// The key contains characters outside `[A-Za-z0-9_-]`.
    #[error("invalid key format: {0:?}")]
    InvalidKey(String),

    /// The value contains a line terminator and could not be persisted.
    #[error("invalid value for key {0:?}: values must not contain a newline")]
    InvalidValue(String),

    /// Create was called with a key that is already present.
    #[error("key already exists: {0}")]
    DuplicateKey(String),

    /// The key is not present in the store.
    #[error("key not found: {0}")]
    NotFound(String),

    /// The store has been closed and cannot be used anymore.
    #[error("store is closed")]
    Closed,

    /// Writing the entries to the backing file failed during close.
    #[error("failed to persist store: {0}")]
    Persist(#[source] io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            StoreError::DuplicateKey("a".into()).to_string(),
            "key already exists: a"
        );
        assert_eq!(StoreError::NotFound("a".into()).to_string(), "key not found: a");
        assert_eq!(StoreError::Closed.to_string(), "store is closed");
        assert_eq!(
            StoreError::Format {
                line: 3,
                reason: "missing ':' separator".into()
            }
            .to_string(),
            "malformed content at line 3: missing ':' separator"
        );
    }

    #[test]
    fn open_error_mentions_path() {
        let err = StoreError::Open {
            path: PathBuf::from("/nope/db.data"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/nope/db.data"));
        assert!(msg.contains("denied"));
    }
}
