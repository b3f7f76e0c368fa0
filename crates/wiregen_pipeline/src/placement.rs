//! Maps class identities to on-disk output paths.

use std::path::{Path, PathBuf};

use wiregen_model::ClassName;

use crate::error::PipelineError;

/// Derives the output directory and final path for a generated class.
///
/// The package path's leading segment is the service name; normally the
/// class lands under `<generated_root>/<Service>/src/<rest of package>`.
/// One service is designated the core package and placed at a dedicated
/// root instead, and a `Tests` package segment reroutes the remainder into
/// the service's `tests` tree.
#[derive(Debug, Clone)]
pub struct OutputPlacement {
    generated_root: PathBuf,
    core_root: PathBuf,
    core_package: String,
}

impl OutputPlacement {
    /// Creates a placement with the given roots and core package name.
    pub fn new(
        generated_root: impl Into<PathBuf>,
        core_root: impl Into<PathBuf>,
        core_package: impl Into<String>,
    ) -> Self {
        Self {
            generated_root: generated_root.into(),
            core_root: core_root.into(),
            core_package: core_package.into(),
        }
    }

    /// The directory a package path maps to, without touching the disk.
    pub fn directory_for(&self, package: &[String]) -> PathBuf {
        let (service, rest) = match package.split_first() {
            Some((service, rest)) => (service.as_str(), rest),
            None => ("", &[][..]),
        };

        let mut dir = if service == self.core_package {
            self.core_root.clone()
        } else {
            self.generated_root.join(service)
        };

        // A `Tests` segment switches to the tests tree; the segment itself
        // is consumed, the remainder keeps its structure.
        if let Some(pos) = rest.iter().position(|s| s == "Tests") {
            dir.push("tests");
            for segment in rest.iter().take(pos).chain(rest.iter().skip(pos + 1)) {
                dir.push(segment);
            }
        } else {
            dir.push("src");
            for segment in rest {
                dir.push(segment);
            }
        }
        dir
    }

    /// Resolves the final path for `class`, creating its directory.
    pub fn place(&self, class: &ClassName) -> Result<PathBuf, PipelineError> {
        let dir = self.directory_for(&class.package);
        std::fs::create_dir_all(&dir).map_err(|e| PipelineError::DirectoryUnwritable {
            path: dir.clone(),
            source: e,
        })?;
        Ok(dir.join(format!("{}.php", class.name)))
    }

    /// The root all non-core services are placed under.
    pub fn generated_root(&self) -> &Path {
        &self.generated_root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placement() -> OutputPlacement {
        OutputPlacement::new("/out/services", "/out/core", "Core")
    }

    fn pkg(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn service_package_lands_under_src() {
        let dir = placement().directory_for(&pkg(&["S3", "Input"]));
        assert_eq!(dir, PathBuf::from("/out/services/S3/src/Input"));
    }

    #[test]
    fn core_package_uses_core_root() {
        let dir = placement().directory_for(&pkg(&["Core", "Exception"]));
        assert_eq!(dir, PathBuf::from("/out/core/src/Exception"));
    }

    #[test]
    fn tests_segment_reroutes_to_tests_tree() {
        let dir = placement().directory_for(&pkg(&["S3", "Tests", "Unit", "Input"]));
        assert_eq!(dir, PathBuf::from("/out/services/S3/tests/Unit/Input"));
    }

    #[test]
    fn place_creates_directory_and_appends_file() {
        let out = tempfile::tempdir().unwrap();
        let placement = OutputPlacement::new(out.path(), out.path().join("core"), "Core");
        let class = ClassName::new("TagInput", pkg(&["S3", "Input"]));

        let path = placement.place(&class).unwrap();
        assert_eq!(path, out.path().join("S3/src/Input/TagInput.php"));
        assert!(path.parent().unwrap().is_dir());
    }

    #[test]
    fn unwritable_directory_is_reported() {
        let out = tempfile::tempdir().unwrap();
        // A plain file where the service directory should be.
        std::fs::write(out.path().join("S3"), "not a directory").unwrap();
        let placement = OutputPlacement::new(out.path(), out.path().join("core"), "Core");
        let class = ClassName::new("TagInput", pkg(&["S3", "Input"]));

        let err = placement.place(&class).unwrap_err();
        assert!(matches!(err, PipelineError::DirectoryUnwritable { .. }));
    }
}
