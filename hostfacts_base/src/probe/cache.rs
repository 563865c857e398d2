//! Run-scoped memoization of expensive OS probes
//!
//! Several facts often need the same raw data (every memory fact parses one
//! `/proc/meminfo` read). Probes are keyed by `(resolver, key)` and executed
//! at most once per key until invalidated, even when several threads ask
//! for the same key at once.

use super::error::ProbeError;
use crate::types::FactValue;
use crate::{log_debug, log_warning};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

type ProbeSlot = Arc<OnceLock<Option<FactValue>>>;

/// Shared probe cache
///
/// A probe's `compute` must not ask the cache for its own key.
#[derive(Debug, Default)]
pub struct ProbeCache {
    entries: Mutex<HashMap<(String, String), ProbeSlot>>,
    executions: AtomicUsize,
}

/// Probe cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeCacheStats {
    pub cached_keys: usize,
    pub executions: usize,
}

impl ProbeCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_entries(&self) -> MutexGuard<'_, HashMap<(String, String), ProbeSlot>> {
        // Slots are only ever inserted or removed whole, so a poisoned map
        // is still consistent.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Return the cached value for `(resolver, key)`, computing it on first use
    ///
    /// A failing probe is logged and cached as `None` for the rest of the run.
    pub fn resolve<F>(&self, resolver: &str, key: &str, compute: F) -> Option<FactValue>
    where
        F: FnOnce() -> Result<Option<FactValue>, ProbeError>,
    {
        let slot = {
            let mut entries = self.lock_entries();
            entries
                .entry((resolver.to_string(), key.to_string()))
                .or_insert_with(|| Arc::new(OnceLock::new()))
                .clone()
        };

        slot.get_or_init(|| {
            self.executions.fetch_add(1, Ordering::SeqCst);
            log_debug!("Executing probe", "resolver" => resolver, "key" => key);

            match compute() {
                Ok(value) => value,
                Err(e) => {
                    log_warning!(
                        "Probe failed, value will be nil",
                        "resolver" => resolver,
                        "key" => key,
                        "error" => e
                    );
                    None
                }
            }
        })
        .clone()
    }

    /// Check whether a key has been computed
    pub fn contains(&self, resolver: &str, key: &str) -> bool {
        self.lock_entries()
            .get(&(resolver.to_string(), key.to_string()))
            .map_or(false, |slot| slot.get().is_some())
    }

    /// Drop every cached key of one resolver; returns how many were dropped
    pub fn invalidate(&self, resolver: &str) -> usize {
        let mut entries = self.lock_entries();
        let before = entries.len();
        entries.retain(|(owner, _), _| owner != resolver);
        before - entries.len()
    }

    /// Drop every cached key
    pub fn invalidate_all(&self) {
        self.lock_entries().clear();
    }

    pub fn stats(&self) -> ProbeCacheStats {
        ProbeCacheStats {
            cached_keys: self.lock_entries().len(),
            executions: self.executions.load(Ordering::SeqCst),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    #[test]
    fn test_probe_executes_once_per_key() {
        let cache = ProbeCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..5 {
            let value = cache.resolve("linux.memory", "total", || {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(Some(FactValue::Integer(3_331_551_232)))
            });
            assert_eq!(value, Some(FactValue::Integer(3_331_551_232)));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats().executions, 1);
    }

    #[test]
    fn test_distinct_keys_and_resolvers_are_separate() {
        let cache = ProbeCache::new();
        cache.resolve("linux.memory", "total", || Ok(Some(FactValue::Integer(1))));
        cache.resolve("linux.memory", "free", || Ok(Some(FactValue::Integer(2))));
        cache.resolve("uname", "total", || Ok(Some(FactValue::Integer(3))));

        assert_eq!(cache.stats().cached_keys, 3);
        assert_eq!(
            cache.resolve("uname", "total", || Ok(None)),
            Some(FactValue::Integer(3))
        );
    }

    #[test]
    fn test_failed_probe_is_cached_as_nil() {
        let cache = ProbeCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache.resolve("os_release", "file", || {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ProbeError::Io {
                    path: "/etc/os-release".to_string(),
                    reason: "not found".to_string(),
                })
            });
            assert_eq!(value, None);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.contains("os_release", "file"));
    }

    #[test]
    fn test_targeted_invalidation() {
        let cache = ProbeCache::new();
        cache.resolve("linux.memory", "total", || Ok(Some(FactValue::Integer(1))));
        cache.resolve("linux.memory", "free", || Ok(Some(FactValue::Integer(2))));
        cache.resolve("uname", "-s", || Ok(Some(FactValue::from("Linux"))));

        assert_eq!(cache.invalidate("linux.memory"), 2);
        assert!(!cache.contains("linux.memory", "total"));
        assert!(cache.contains("uname", "-s"));

        let value = cache.resolve("linux.memory", "total", || Ok(Some(FactValue::Integer(7))));
        assert_eq!(value, Some(FactValue::Integer(7)));
    }

    #[test]
    fn test_invalidate_all() {
        let cache = ProbeCache::new();
        cache.resolve("a", "k", || Ok(Some(FactValue::Integer(1))));
        cache.invalidate_all();
        assert_eq!(cache.stats().cached_keys, 0);
        assert!(!cache.contains("a", "k"));
    }

    #[test]
    fn test_concurrent_callers_share_one_execution() {
        let cache = Arc::new(ProbeCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                thread::spawn(move || {
                    cache.resolve("linux.memory", "meminfo", || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(std::time::Duration::from_millis(20));
                        Ok(Some(FactValue::from("parsed")))
                    })
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), Some(FactValue::from("parsed")));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
