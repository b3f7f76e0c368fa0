//! Error types for build-cache operations.

use std::path::PathBuf;

/// Errors that can occur while accessing the build cache.
///
/// All variants are fatal for the run. In particular, `Unavailable` must
/// never be treated as a cache miss by callers.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The backing file could not be opened, created, or locked after
    /// bounded retries.
    #[error("build cache unavailable at {path}: {reason}")]
    Unavailable {
        /// The backing file that could not be acquired.
        path: PathBuf,
        /// Description of the open/lock failure.
        reason: String,
    },

    /// An I/O error occurred while reading or writing a locked backing file.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_display_names_path() {
        let err = CacheError::Unavailable {
            path: PathBuf::from("/tmp/wiregen/cache.json"),
            reason: "lock held by another process".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("cache.json"));
        assert!(msg.contains("lock held"));
    }

    #[test]
    fn io_display_names_path() {
        let err = CacheError::Io {
            path: PathBuf::from("cache.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("cache.json"));
    }
}
