//! External syntax verification of staged files.
//!
//! The checker runs against the staging path before the atomic rename, so
//! the final path is never replaced with content that does not parse.

use std::path::Path;
use std::process::Command;

use crate::error::PipelineError;

/// Validates a staged source file before it is committed.
pub trait SyntaxChecker {
    /// Checks the file at `path`; `Err(SyntaxInvalid)` carries the
    /// checker's full diagnostic text.
    fn check(&self, path: &Path) -> Result<(), PipelineError>;
}

/// Syntax checker invoking `php -l` as a synchronous subprocess.
///
/// Exit code 0 means valid; nonzero means invalid with diagnostics on the
/// error stream (php -l also prints to stdout, so both are captured).
#[derive(Debug, Clone)]
pub struct PhpLintChecker {
    binary: String,
}

impl PhpLintChecker {
    /// Creates a checker using the given PHP binary name or path.
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for PhpLintChecker {
    fn default() -> Self {
        Self::new("php")
    }
}

impl SyntaxChecker for PhpLintChecker {
    fn check(&self, path: &Path) -> Result<(), PipelineError> {
        let output = Command::new(&self.binary)
            .arg("-l")
            .arg(path)
            .output()
            .map_err(|e| PipelineError::CheckerUnavailable {
                command: self.binary.clone(),
                source: e,
            })?;
        if output.status.success() {
            return Ok(());
        }
        let mut diagnostics = String::from_utf8_lossy(&output.stderr).into_owned();
        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            if !diagnostics.is_empty() {
                diagnostics.push('\n');
            }
            diagnostics.push_str(stdout.trim_end());
        }
        Err(PipelineError::SyntaxInvalid {
            path: path.to_path_buf(),
            diagnostics,
        })
    }
}

/// A checker that accepts everything.
///
/// For tests and for callers running without a PHP toolchain on the path.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullChecker;

impl SyntaxChecker for NullChecker {
    fn check(&self, _path: &Path) -> Result<(), PipelineError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_checker_accepts() {
        assert!(NullChecker.check(Path::new("anything.php")).is_ok());
    }

    #[test]
    fn zero_exit_is_valid() {
        // `true` ignores its arguments and exits 0.
        let checker = PhpLintChecker::new("true");
        assert!(checker.check(Path::new("whatever.php")).is_ok());
    }

    #[test]
    fn nonzero_exit_is_syntax_invalid() {
        let checker = PhpLintChecker::new("false");
        let err = checker.check(Path::new("broken.php")).unwrap_err();
        match err {
            PipelineError::SyntaxInvalid { path, .. } => {
                assert!(path.ends_with("broken.php"));
            }
            other => panic!("expected SyntaxInvalid, got {other}"),
        }
    }

    #[test]
    fn missing_binary_is_checker_unavailable() {
        let checker = PhpLintChecker::new("definitely-not-a-real-binary-xyz");
        let err = checker.check(Path::new("a.php")).unwrap_err();
        assert!(matches!(err, PipelineError::CheckerUnavailable { .. }));
    }
}
