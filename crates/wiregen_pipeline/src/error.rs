//! Error types for the file pipeline.

use std::path::PathBuf;

use wiregen_cache::CacheError;
use wiregen_emit::EmitError;

/// Errors that abort a generation run.
///
/// Every variant fails the run fast: generated code is committed as source,
/// and a half-generated service is strictly worse than a failed build.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The external syntax checker rejected staged content. The staged
    /// artifact is kept for inspection and the final path is untouched.
    #[error("syntax check failed for {path}:\n{diagnostics}")]
    SyntaxInvalid {
        /// The staged file that failed the check.
        path: PathBuf,
        /// The checker's full diagnostic text.
        diagnostics: String,
    },

    /// The syntax checker subprocess could not be spawned at all.
    #[error("syntax checker `{command}` could not run: {source}")]
    CheckerUnavailable {
        /// The command that failed to spawn.
        command: String,
        /// The underlying spawn error.
        source: std::io::Error,
    },

    /// An output directory could not be created.
    #[error("could not create output directory {path}: {source}")]
    DirectoryUnwritable {
        /// The directory that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// An I/O error on a staged or committed file.
    #[error("pipeline I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The build cache failed; never downgraded to a cache miss.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Source emission failed for a shape.
    #[error(transparent)]
    Emit(#[from] EmitError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_invalid_carries_diagnostics() {
        let err = PipelineError::SyntaxInvalid {
            path: PathBuf::from("TagInput.php.staged"),
            diagnostics: "PHP Parse error: syntax error, unexpected '}'".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("TagInput.php.staged"));
        assert!(msg.contains("Parse error"));
    }

    #[test]
    fn cache_errors_pass_through() {
        let err: PipelineError = CacheError::Unavailable {
            path: PathBuf::from("cache.json"),
            reason: "locked".to_string(),
        }
        .into();
        assert!(err.to_string().contains("cache.json"));
    }
}
