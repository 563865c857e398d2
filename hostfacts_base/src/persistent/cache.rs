//! File-backed cache of resolved group values
//!
//! One JSON file per fact group lives under the cache directory. An entry is
//! served while `now - resolved_at < ttl`; expired, missing, or unreadable
//! entries are treated as misses.

use super::error::CacheError;
use crate::types::FactValue;
use crate::{log_debug, log_info, log_warning};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

pub const CACHE_FORMAT_VERSION: u32 = 1;

/// Values for one group and when they were resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub values: BTreeMap<String, Option<FactValue>>,
    pub resolved_at: DateTime<Utc>,
    pub ttl: Duration,
}

impl CacheEntry {
    pub fn new(resolved_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            values: BTreeMap::new(),
            resolved_at,
            ttl,
        }
    }

    /// Fresh while the age is below the TTL. A timestamp in the future counts
    /// as expired.
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        match now.signed_duration_since(self.resolved_at).to_std() {
            Ok(age) => age < self.ttl,
            Err(_) => false,
        }
    }

    pub fn get(&self, fact: &str) -> Option<&Option<FactValue>> {
        self.values.get(fact)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    format_version: u32,
    group: String,
    #[serde(flatten)]
    entry: CacheEntry,
}

/// Persistent cache keyed by group name
#[derive(Debug)]
pub struct PersistentCache {
    dir: PathBuf,
    ttls: BTreeMap<String, Duration>,
    io_lock: Mutex<()>,
}

impl PersistentCache {
    pub fn new(dir: impl Into<PathBuf>, ttls: BTreeMap<String, Duration>) -> Self {
        Self {
            dir: dir.into(),
            ttls,
            io_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ttl_for(&self, group: &str) -> Option<Duration> {
        self.ttls.get(group).copied()
    }

    pub fn is_cached_group(&self, group: &str) -> bool {
        self.ttls.contains_key(group)
    }

    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.ttls.keys().map(String::as_str)
    }

    pub fn path_for(&self, group: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_group(group)))
    }

    pub fn lookup(&self, group: &str) -> Option<CacheEntry> {
        self.lookup_at(group, Utc::now())
    }

    /// Fresh entry for `group` as of `now`, if any
    pub fn lookup_at(&self, group: &str, now: DateTime<Utc>) -> Option<CacheEntry> {
        self.ttl_for(group)?;
        let _guard = self.lock();
        let entry = self.read_or_discard(group)?;

        if entry.is_fresh_at(now) {
            log_debug!("Persistent cache hit", "group" => group);
            Some(entry)
        } else {
            log_debug!("Persistent cache entry expired", "group" => group);
            None
        }
    }

    /// Cached value of one fact: `Some(value)` on hit (value may be nil)
    pub fn fact_value_at(
        &self,
        group: &str,
        fact: &str,
        now: DateTime<Utc>,
    ) -> Option<Option<FactValue>> {
        self.lookup_at(group, now)
            .and_then(|entry| entry.values.get(fact).cloned())
    }

    pub fn store(&self, group: &str, fact: &str, value: Option<FactValue>) {
        self.store_at(group, fact, value, Utc::now())
    }

    /// Record a freshly resolved value. A fresh entry keeps its timestamp; an
    /// expired or absent one is replaced with a new entry resolved at `now`.
    pub fn store_at(&self, group: &str, fact: &str, value: Option<FactValue>, now: DateTime<Utc>) {
        let ttl = match self.ttl_for(group) {
            Some(ttl) => ttl,
            None => return,
        };
        let _guard = self.lock();

        let mut entry = match self.read_or_discard(group) {
            Some(existing) if existing.is_fresh_at(now) => existing,
            _ => CacheEntry::new(now, ttl),
        };
        entry.values.insert(fact.to_string(), value);

        if let Err(err) = self.write_entry(group, &entry) {
            log_warning!("Failed to write persistent cache",
                "group" => group,
                "error" => err.to_string()
            );
        }
    }

    /// Replace the whole entry for `group`
    pub fn store_entry(&self, group: &str, entry: &CacheEntry) {
        if !self.is_cached_group(group) {
            return;
        }
        let _guard = self.lock();
        if let Err(err) = self.write_entry(group, entry) {
            log_warning!("Failed to write persistent cache",
                "group" => group,
                "error" => err.to_string()
            );
        }
    }

    pub fn invalidate(&self, group: &str) -> bool {
        let _guard = self.lock();
        self.remove_file(&self.path_for(group))
    }

    pub fn invalidate_all(&self) -> usize {
        let _guard = self.lock();
        self.ttls
            .keys()
            .filter(|group| self.remove_file(&self.path_for(group)))
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ()> {
        self.io_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read_or_discard(&self, group: &str) -> Option<CacheEntry> {
        match self.read_entry(group) {
            Ok(entry) => entry,
            Err(err) => {
                log_warning!("Ignoring unreadable persistent cache file",
                    "group" => group,
                    "error" => err.to_string()
                );
                if err.is_corrupt() {
                    self.remove_file(err.path());
                }
                None
            }
        }
    }

    fn read_entry(&self, group: &str) -> Result<Option<CacheEntry>, CacheError> {
        let path = self.path_for(group);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(CacheError::Read { path, source }),
        };

        if content.trim().is_empty() {
            return Err(CacheError::Malformed {
                path,
                reason: "empty file".to_string(),
            });
        }

        let file: CacheFile =
            serde_json::from_str(&content).map_err(|e| CacheError::Malformed {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        if file.format_version != CACHE_FORMAT_VERSION {
            return Err(CacheError::FormatVersion {
                path,
                found: file.format_version,
                expected: CACHE_FORMAT_VERSION,
            });
        }

        if file.group != group {
            return Err(CacheError::GroupMismatch {
                path,
                found: file.group,
                expected: group.to_string(),
            });
        }

        Ok(Some(file.entry))
    }

    fn write_entry(&self, group: &str, entry: &CacheEntry) -> Result<(), CacheError> {
        let path = self.path_for(group);
        let write_err = |source| CacheError::Write {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(write_err)?;

        let file = CacheFile {
            format_version: CACHE_FORMAT_VERSION,
            group: group.to_string(),
            entry: entry.clone(),
        };
        let content = serde_json::to_string_pretty(&file).map_err(|e| CacheError::Malformed {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        // Write to a sibling temp file, then rename into place.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content).map_err(write_err)?;
        fs::rename(&tmp, &path).map_err(write_err)?;

        log_debug!("Persistent cache written",
            "group" => group,
            "facts" => entry.values.len().to_string()
        );
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> bool {
        match fs::remove_file(path) {
            Ok(()) => {
                log_info!("Removed persistent cache file",
                    "path" => path.display().to_string()
                );
                true
            }
            Err(_) => false,
        }
    }
}

fn sanitize_group(group: &str) -> String {
    group
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
