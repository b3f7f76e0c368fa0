//! Removal of previously generated files the current run no longer produces.
//!
//! Sweeping is scoped strictly to the generated-only bucket directories the
//! namer derives. Hand-written code lives outside those buckets and is
//! never considered.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use wiregen_model::{ClassNamer, ClassRole};

use crate::error::PipelineError;
use crate::placement::OutputPlacement;

/// Sweeps bucket directories and deletes generated files whose class is
/// absent from the current run's output set.
pub struct OrphanCollector<'a> {
    namer: &'a dyn ClassNamer,
    placement: &'a OutputPlacement,
}

impl<'a> OrphanCollector<'a> {
    /// Creates a collector sharing the run's namer and placement, so the
    /// paths it reconstructs agree with the paths generation produced.
    pub fn new(namer: &'a dyn ClassNamer, placement: &'a OutputPlacement) -> Self {
        Self { namer, placement }
    }

    /// Deletes every `.php` file in a bucket directory whose reconstructed
    /// fully-qualified class name is not in `generated`. Returns the number
    /// of files removed.
    ///
    /// Non-`.php` files and files whose identity cannot be reconstructed
    /// are left alone.
    pub fn collect(&self, generated: &BTreeSet<String>) -> Result<usize, PipelineError> {
        let mut removed = 0;
        for role in ClassRole::BUCKETS {
            let package = self.namer.bucket_package(role);
            let dir = self.placement.directory_for(&package);
            if !dir.is_dir() {
                continue;
            }
            removed += self.sweep_dir(&dir, &package, generated)?;
        }
        if removed > 0 {
            tracing::info!(removed, "collected orphaned generated files");
        }
        Ok(removed)
    }

    fn sweep_dir(
        &self,
        dir: &Path,
        package: &[String],
        generated: &BTreeSet<String>,
    ) -> Result<usize, PipelineError> {
        let io = |path: &Path, e| PipelineError::Io {
            path: path.to_path_buf(),
            source: e,
        };
        let mut removed = 0;
        let entries = fs::read_dir(dir).map_err(|e| io(dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| io(dir, e))?;
            let path = entry.path();
            if path.is_dir() {
                // Subpackage: recurse with the directory name appended.
                let Some(segment) = path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                let mut sub = package.to_vec();
                sub.push(segment.to_string());
                removed += self.sweep_dir(&path, &sub, generated)?;
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some("php") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let fqcn = reconstruct_fqcn(package, stem);
            if !generated.contains(&fqcn) {
                fs::remove_file(&path).map_err(|e| io(&path, e))?;
                tracing::debug!(path = %path.display(), class = %fqcn, "removed orphan");
                removed += 1;
            }
        }
        Ok(removed)
    }
}

/// The fully-qualified class name a bucket file corresponds to.
fn reconstruct_fqcn(package: &[String], stem: &str) -> String {
    let mut fqcn = package.join("\\");
    if !fqcn.is_empty() {
        fqcn.push('\\');
    }
    fqcn.push_str(stem);
    fqcn
}
