//! The per-file staging pipeline: freshness check, staged write, syntax
//! verification, atomic commit, and cache persistence.
//!
//! Per-file states: Unknown → Clean (skip) | Stale (rewrite) → Rewritten.
//! A file is clean only when both fingerprints match what the cache
//! recorded: the rendered content's fingerprint and the current on-disk
//! fingerprint. The disk fingerprint recorded at shutdown is the
//! *post-formatting* one, which is what makes an external formatter pass
//! between runs not dirty every file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use wiregen_cache::BuildCache;
use wiregen_common::Fingerprint;

use crate::checker::SyntaxChecker;
use crate::error::PipelineError;

/// The cache key holding the whole path→fingerprints record.
const CACHE_KEY: &str = "generated-files";

/// Suffix distinguishing the staging path from the final path.
const STAGING_SUFFIX: &str = ".staged";

/// Persisted per-file record: `(fingerprint of rendered content at write
/// time, fingerprint of the on-disk bytes after the last commit)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct FileRecord(Fingerprint, Fingerprint);

type RecordMap = BTreeMap<String, FileRecord>;

/// What happened to one file handed to the stager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file was clean; nothing was written.
    Unchanged,
    /// The file was stale and has been rewritten through the staged path.
    Rewritten,
}

/// Stages, verifies, and commits generated files against the build cache.
pub struct FileStager {
    cache: BuildCache,
    checker: Box<dyn SyntaxChecker>,
    records: RecordMap,
    /// Content fingerprints of the paths written this run, keyed by path.
    written: BTreeMap<String, Fingerprint>,
}

impl FileStager {
    /// Loads the stager's record map from the cache.
    ///
    /// Entries whose path no longer exists on disk are dropped, so a
    /// manually deleted output self-heals into a rewrite.
    pub fn load(cache: BuildCache, checker: Box<dyn SyntaxChecker>) -> Result<Self, PipelineError> {
        let mut records: RecordMap = match cache.get(CACHE_KEY)? {
            Some(json) => serde_json::from_str(&json).unwrap_or_default(),
            None => RecordMap::new(),
        };
        records.retain(|path, _| Path::new(path).exists());
        Ok(Self {
            cache,
            checker,
            records,
            written: BTreeMap::new(),
        })
    }

    /// Stages freshly rendered `content` for `path`, committing it only if
    /// the file is stale.
    ///
    /// The write protocol: render to `<path>.staged`, run the syntax
    /// checker against the staged file, then atomically rename onto the
    /// final path. On checker failure the staged artifact is left on disk
    /// for inspection and the final path is untouched.
    pub fn write(&mut self, path: &Path, content: &str) -> Result<WriteOutcome, PipelineError> {
        let content_fp = Fingerprint::from_str_content(content);
        if self.is_clean(path, content_fp) {
            tracing::debug!(path = %path.display(), "unchanged, skipping write");
            return Ok(WriteOutcome::Unchanged);
        }

        let staged = staging_path(path);
        fs::write(&staged, content).map_err(|e| PipelineError::Io {
            path: staged.clone(),
            source: e,
        })?;
        self.checker.check(&staged)?;
        fs::rename(&staged, path).map_err(|e| PipelineError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        self.written
            .insert(path.to_string_lossy().into_owned(), content_fp);
        tracing::info!(path = %path.display(), "rewrote generated file");
        Ok(WriteOutcome::Rewritten)
    }

    /// The number of files actually rewritten this run.
    pub fn written_count(&self) -> usize {
        self.written.len()
    }

    /// Persists fingerprints for everything written this run.
    ///
    /// The disk fingerprint is recomputed now, after any external
    /// formatting pass, so the next run compares against the bytes a
    /// formatter left behind rather than the bytes we wrote. Goes through
    /// the cache's `update` primitive so concurrent services merging into
    /// one shared cache never lose each other's entries.
    pub fn persist(&self) -> Result<(), PipelineError> {
        let mut fresh: Vec<(String, FileRecord)> = Vec::new();
        for (path, content_fp) in &self.written {
            // A path that vanished between write and persist simply drops
            // out of the record, same as the load-time self-healing.
            if let Ok(bytes) = fs::read(path) {
                let disk_fp = Fingerprint::from_bytes(&bytes);
                fresh.push((path.clone(), FileRecord(*content_fp, disk_fp)));
            }
        }

        self.cache.update(CACHE_KEY, |current| {
            let mut map: RecordMap = current
                .and_then(|json| serde_json::from_str(json).ok())
                .unwrap_or_default();
            for (path, record) in &fresh {
                map.insert(path.clone(), *record);
            }
            map.retain(|path, _| Path::new(path).exists());
            serde_json::to_string_pretty(&map).unwrap_or_default()
        })?;
        Ok(())
    }

    /// A file is clean iff its current on-disk fingerprint matches the
    /// recorded disk fingerprint and the rendered content's fingerprint
    /// matches the recorded content fingerprint.
    fn is_clean(&self, path: &Path, content_fp: Fingerprint) -> bool {
        let key = path.to_string_lossy();
        let Some(FileRecord(rec_content, rec_disk)) = self.records.get(key.as_ref()) else {
            return false;
        };
        if *rec_content != content_fp {
            return false;
        }
        let Ok(bytes) = fs::read(path) else {
            return false;
        };
        Fingerprint::from_bytes(&bytes) == *rec_disk
    }
}

/// The staging path for a final path: same path with a distinguishing
/// suffix appended.
fn staging_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(STAGING_SUFFIX);
    PathBuf::from(os)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::NullChecker;

    /// A checker that rejects everything with fixed diagnostics.
    struct RejectChecker;

    impl SyntaxChecker for RejectChecker {
        fn check(&self, path: &Path) -> Result<(), PipelineError> {
            Err(PipelineError::SyntaxInvalid {
                path: path.to_path_buf(),
                diagnostics: "unexpected token".to_string(),
            })
        }
    }

    fn make_stager(dir: &Path) -> FileStager {
        let cache = BuildCache::shared_file(dir.join("cache.json"));
        FileStager::load(cache, Box::new(NullChecker)).unwrap()
    }

    #[test]
    fn first_write_commits_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut stager = make_stager(dir.path());
        let target = dir.path().join("TagInput.php");

        let outcome = stager.write(&target, "<?php // v1").unwrap();
        assert_eq!(outcome, WriteOutcome::Rewritten);
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "<?php // v1");
        // No staging artifact left behind on success.
        assert!(!staging_path(&target).exists());
    }

    #[test]
    fn second_run_with_same_content_is_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("TagInput.php");

        let mut stager = make_stager(dir.path());
        stager.write(&target, "<?php // v1").unwrap();
        stager.persist().unwrap();

        let mut second = make_stager(dir.path());
        let outcome = second.write(&target, "<?php // v1").unwrap();
        assert_eq!(outcome, WriteOutcome::Unchanged);
        assert_eq!(second.written_count(), 0);
    }

    #[test]
    fn changed_content_rewrites() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("TagInput.php");

        let mut stager = make_stager(dir.path());
        stager.write(&target, "<?php // v1").unwrap();
        stager.persist().unwrap();

        let mut second = make_stager(dir.path());
        let outcome = second.write(&target, "<?php // v2").unwrap();
        assert_eq!(outcome, WriteOutcome::Rewritten);
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "<?php // v2");
    }

    #[test]
    fn reformatting_after_persist_stays_clean() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("TagInput.php");

        let mut stager = make_stager(dir.path());
        stager.write(&target, "<?php // v1").unwrap();
        // An external formatter rewrites the committed file before the
        // pipeline shuts down; persist records the post-format bytes.
        std::fs::write(&target, "<?php\n// v1 formatted\n").unwrap();
        stager.persist().unwrap();

        let mut second = make_stager(dir.path());
        let outcome = second.write(&target, "<?php // v1").unwrap();
        assert_eq!(outcome, WriteOutcome::Unchanged);
    }

    #[test]
    fn external_edit_without_persist_knowledge_rewrites() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("TagInput.php");

        let mut stager = make_stager(dir.path());
        stager.write(&target, "<?php // v1").unwrap();
        stager.persist().unwrap();

        // Someone edits the committed file after persist: the disk
        // fingerprint no longer matches and the file must be rewritten.
        std::fs::write(&target, "<?php // tampered").unwrap();

        let mut second = make_stager(dir.path());
        let outcome = second.write(&target, "<?php // v1").unwrap();
        assert_eq!(outcome, WriteOutcome::Rewritten);
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "<?php // v1");
    }

    #[test]
    fn deleted_file_self_heals_into_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("TagInput.php");

        let mut stager = make_stager(dir.path());
        stager.write(&target, "<?php // v1").unwrap();
        stager.persist().unwrap();

        std::fs::remove_file(&target).unwrap();

        let mut second = make_stager(dir.path());
        let outcome = second.write(&target, "<?php // v1").unwrap();
        assert_eq!(outcome, WriteOutcome::Rewritten);
        assert!(target.exists());
    }

    #[test]
    fn rejected_content_keeps_staged_artifact_and_final_path() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("TagInput.php");

        // Commit a valid version first.
        let mut stager = make_stager(dir.path());
        stager.write(&target, "<?php // v1").unwrap();
        stager.persist().unwrap();

        // Now a broken render is rejected by the checker.
        let cache = BuildCache::shared_file(dir.path().join("cache.json"));
        let mut broken = FileStager::load(cache, Box::new(RejectChecker)).unwrap();
        let err = broken.write(&target, "<?php // v2 broken").unwrap_err();
        assert!(matches!(err, PipelineError::SyntaxInvalid { .. }));

        // The staged artifact stays for inspection; the final path still
        // holds the last valid content.
        let staged = staging_path(&target);
        assert_eq!(
            std::fs::read_to_string(&staged).unwrap(),
            "<?php // v2 broken"
        );
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "<?php // v1");
    }

    #[test]
    fn persist_drops_records_for_deleted_paths() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("A.php");
        let b = dir.path().join("B.php");

        let mut stager = make_stager(dir.path());
        stager.write(&a, "<?php // a").unwrap();
        stager.write(&b, "<?php // b").unwrap();
        stager.persist().unwrap();

        std::fs::remove_file(&b).unwrap();

        // Persisting again (e.g. from a later run) drops the dead entry.
        let stager = make_stager(dir.path());
        stager.persist().unwrap();

        let cache = BuildCache::shared_file(dir.path().join("cache.json"));
        let json = cache.get("generated-files").unwrap().unwrap();
        assert!(json.contains("A.php"));
        assert!(!json.contains("B.php"));
    }

    #[test]
    fn staging_path_appends_suffix() {
        let staged = staging_path(Path::new("out/TagInput.php"));
        assert_eq!(staged, PathBuf::from("out/TagInput.php.staged"));
    }
}
