//! The lock-guarded key/value store.
//!
//! Two storage modes, chosen once at construction: one shared file holding
//! a JSON key→value map, or one file per key (key hashed into a filename)
//! inside a directory. Either way every operation acquires an exclusive
//! advisory lock on the relevant backing file (`fs2`), so concurrent
//! processes serialize on it.
//!
//! A shared-map file that fails to parse is treated as empty and rewritten
//! on the next `update` — corruption is fail-safe. Lock and open failures
//! are not: they surface as [`CacheError::Unavailable`].

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use fs2::FileExt;
use wiregen_common::Fingerprint;

use crate::error::CacheError;

/// Bounded attempts for opening/creating and for acquiring the lock.
const LOCK_RETRIES: u32 = 10;

/// Backoff between lock attempts.
const LOCK_BACKOFF: Duration = Duration::from_millis(50);

/// Extension for per-key backing files.
const ENTRY_EXT: &str = "entry";

/// How cache entries are laid out on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStorage {
    /// One shared file holding a JSON object mapping key to value.
    SharedFile,
    /// One file per key, named by the key's fingerprint, inside a directory.
    FilePerKey,
}

/// A cross-process key/value store backed by locked files.
#[derive(Debug, Clone)]
pub struct BuildCache {
    path: PathBuf,
    storage: CacheStorage,
}

impl BuildCache {
    /// Creates a cache storing all keys in one shared file at `path`.
    pub fn shared_file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            storage: CacheStorage::SharedFile,
        }
    }

    /// Creates a cache storing one file per key inside the directory `dir`.
    pub fn file_per_key(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into(),
            storage: CacheStorage::FilePerKey,
        }
    }

    /// The storage mode chosen at construction.
    pub fn storage(&self) -> CacheStorage {
        self.storage
    }

    /// Returns the value stored under `key`, or `None` if absent.
    pub fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let path = self.backing_file(key);
        let mut file = self.open_locked(&path)?;
        let content = read_all(&mut file, &path)?;
        let value = match self.storage {
            CacheStorage::SharedFile => parse_map(&content).get(key).cloned(),
            CacheStorage::FilePerKey => {
                if content.is_empty() {
                    None
                } else {
                    Some(content)
                }
            }
        };
        unlock(&file, &path)?;
        Ok(value)
    }

    /// Atomically replaces the value under `key` with `transform(current)`.
    ///
    /// The read, the transform, and the truncate-and-rewrite all happen
    /// under one exclusive lock, so a concurrent `update` on the same key
    /// always observes this call's result or is observed by it. Returns the
    /// new value.
    pub fn update(
        &self,
        key: &str,
        transform: impl FnOnce(Option<&str>) -> String,
    ) -> Result<String, CacheError> {
        let path = self.backing_file(key);
        let mut file = self.open_locked(&path)?;
        let content = read_all(&mut file, &path)?;
        let new_value;
        let serialized = match self.storage {
            CacheStorage::SharedFile => {
                let mut map = parse_map(&content);
                new_value = transform(map.get(key).map(String::as_str));
                map.insert(key.to_string(), new_value.clone());
                serde_json::to_string_pretty(&map).unwrap_or_default()
            }
            CacheStorage::FilePerKey => {
                let current = if content.is_empty() {
                    None
                } else {
                    Some(content.as_str())
                };
                new_value = transform(current);
                new_value.clone()
            }
        };
        rewrite(&mut file, &path, &serialized)?;
        unlock(&file, &path)?;
        tracing::debug!(key, path = %path.display(), "cache entry updated");
        Ok(new_value)
    }

    /// Stores a constant value under `key`. Shorthand for an `update` with
    /// a constant transform.
    pub fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.update(key, |_| value.to_string())?;
        Ok(())
    }

    /// The backing file holding `key`'s entry.
    fn backing_file(&self, key: &str) -> PathBuf {
        match self.storage {
            CacheStorage::SharedFile => self.path.clone(),
            CacheStorage::FilePerKey => {
                let name = Fingerprint::from_bytes(key.as_bytes());
                self.path.join(format!("{name}.{ENTRY_EXT}"))
            }
        }
    }

    /// Opens `path` read-write and acquires an exclusive lock, creating the
    /// file if missing and tolerating the creation race with another
    /// writer. Bounded retries with short backoff; never proceeds unlocked.
    fn open_locked(&self, path: &Path) -> Result<File, CacheError> {
        let file = self.open_or_create(path)?;
        for attempt in 0..LOCK_RETRIES {
            match file.try_lock_exclusive() {
                Ok(()) => return Ok(file),
                Err(err) => {
                    if attempt + 1 == LOCK_RETRIES {
                        return Err(CacheError::Unavailable {
                            path: path.to_path_buf(),
                            reason: format!("could not acquire exclusive lock: {err}"),
                        });
                    }
                    std::thread::sleep(LOCK_BACKOFF);
                }
            }
        }
        unreachable!("lock retry loop always returns")
    }

    fn open_or_create(&self, path: &Path) -> Result<File, CacheError> {
        for _ in 0..LOCK_RETRIES {
            match OpenOptions::new().read(true).write(true).open(path) {
                Ok(file) => return Ok(file),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent).map_err(|e| CacheError::Unavailable {
                            path: path.to_path_buf(),
                            reason: format!("could not create cache directory: {e}"),
                        })?;
                    }
                    match OpenOptions::new()
                        .read(true)
                        .write(true)
                        .create_new(true)
                        .open(path)
                    {
                        Ok(file) => return Ok(file),
                        // Another process created it between our open and
                        // create; retry the plain open.
                        Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => continue,
                        Err(err) => {
                            return Err(CacheError::Unavailable {
                                path: path.to_path_buf(),
                                reason: format!("could not create backing file: {err}"),
                            });
                        }
                    }
                }
                Err(err) => {
                    return Err(CacheError::Unavailable {
                        path: path.to_path_buf(),
                        reason: format!("could not open backing file: {err}"),
                    });
                }
            }
        }
        Err(CacheError::Unavailable {
            path: path.to_path_buf(),
            reason: "backing file kept vanishing during creation".to_string(),
        })
    }
}

/// Parses the shared-map content; unparseable content is an empty map.
fn parse_map(content: &str) -> BTreeMap<String, String> {
    if content.trim().is_empty() {
        return BTreeMap::new();
    }
    serde_json::from_str(content).unwrap_or_default()
}

fn read_all(file: &mut File, path: &Path) -> Result<String, CacheError> {
    let mut content = String::new();
    file.read_to_string(&mut content).map_err(|e| CacheError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(content)
}

/// Truncates and rewrites the locked backing file with `content`.
fn rewrite(file: &mut File, path: &Path, content: &str) -> Result<(), CacheError> {
    let io = |e| CacheError::Io {
        path: path.to_path_buf(),
        source: e,
    };
    file.seek(SeekFrom::Start(0)).map_err(io)?;
    file.set_len(0).map_err(io)?;
    file.write_all(content.as_bytes()).map_err(io)?;
    file.flush().map_err(io)
}

fn unlock(file: &File, path: &Path) -> Result<(), CacheError> {
    FileExt::unlock(file).map_err(|e| CacheError::Unavailable {
        path: path.to_path_buf(),
        reason: format!("could not release lock: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared() -> (tempfile::TempDir, BuildCache) {
        let dir = tempfile::tempdir().unwrap();
        let cache = BuildCache::shared_file(dir.path().join("cache.json"));
        (dir, cache)
    }

    fn per_key() -> (tempfile::TempDir, BuildCache) {
        let dir = tempfile::tempdir().unwrap();
        let cache = BuildCache::file_per_key(dir.path().join("entries"));
        (dir, cache)
    }

    #[test]
    fn get_missing_key_is_none() {
        let (_dir, cache) = shared();
        assert!(cache.get("nope").unwrap().is_none());
    }

    #[test]
    fn set_then_get_roundtrip_shared() {
        let (_dir, cache) = shared();
        cache.set("a", "value-a").unwrap();
        cache.set("b", "value-b").unwrap();
        assert_eq!(cache.get("a").unwrap().as_deref(), Some("value-a"));
        assert_eq!(cache.get("b").unwrap().as_deref(), Some("value-b"));
    }

    #[test]
    fn set_then_get_roundtrip_per_key() {
        let (_dir, cache) = per_key();
        cache.set("a", "value-a").unwrap();
        cache.set("b", "value-b").unwrap();
        assert_eq!(cache.get("a").unwrap().as_deref(), Some("value-a"));
        assert_eq!(cache.get("b").unwrap().as_deref(), Some("value-b"));
    }

    #[test]
    fn per_key_files_are_fingerprint_named() {
        let (dir, cache) = per_key();
        cache.set("some/generated/path.php", "v").unwrap();
        let entries: Vec<_> = std::fs::read_dir(dir.path().join("entries"))
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].ends_with(".entry"));
        // 32 hex chars + ".entry"
        assert_eq!(entries[0].len(), 32 + 6);
    }

    #[test]
    fn update_observes_current_value() {
        let (_dir, cache) = shared();
        cache.set("n", "1").unwrap();
        let new = cache
            .update("n", |current| {
                let n: i64 = current.unwrap().parse().unwrap();
                (n + 1).to_string()
            })
            .unwrap();
        assert_eq!(new, "2");
        assert_eq!(cache.get("n").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn update_absent_key_sees_none() {
        let (_dir, cache) = per_key();
        let new = cache
            .update("fresh", |current| {
                assert!(current.is_none());
                "init".to_string()
            })
            .unwrap();
        assert_eq!(new, "init");
    }

    #[test]
    fn shared_file_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        {
            let cache = BuildCache::shared_file(&path);
            cache.set("k", "v").unwrap();
        }
        let cache = BuildCache::shared_file(&path);
        assert_eq!(cache.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn corrupt_shared_map_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "{{{ not json").unwrap();
        let cache = BuildCache::shared_file(&path);
        assert!(cache.get("k").unwrap().is_none());
        // And update recovers the file.
        cache.set("k", "v").unwrap();
        assert_eq!(cache.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn open_failure_is_unavailable_not_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        // Point the shared file at an existing directory: open must fail.
        let cache = BuildCache::shared_file(dir.path());
        let err = cache.get("k").unwrap_err();
        assert!(matches!(err, CacheError::Unavailable { .. }));
    }

    #[test]
    fn concurrent_updates_never_lose_an_increment() {
        let modes: [fn() -> (tempfile::TempDir, BuildCache); 2] = [shared, per_key];
        for make in modes {
            let (_dir, cache) = make();
            cache.set("counter", "0").unwrap();

            let threads: Vec<_> = (0..2)
                .map(|_| {
                    let cache = cache.clone();
                    std::thread::spawn(move || {
                        for _ in 0..20 {
                            cache
                                .update("counter", |current| {
                                    let n: i64 = current.unwrap().parse().unwrap();
                                    (n + 1).to_string()
                                })
                                .unwrap();
                        }
                    })
                })
                .collect();
            for t in threads {
                t.join().unwrap();
            }

            assert_eq!(cache.get("counter").unwrap().as_deref(), Some("40"));
        }
    }
}
