//! # Engine Configuration

use crate::options::RuntimeConfig;
use crate::probe::command_executor::DEFAULT_COMMAND_TIMEOUT;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the fact engine
///
/// Controls persistent caching, command timeouts and the overall run
/// deadline. Option toggles are not part of it: they arrive as a snapshot on
/// every call.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Directory for persistent cache files; `None` disables the cache
    pub cache_dir: Option<PathBuf>,

    /// Per-group TTLs; only groups listed here are persisted
    pub ttls: BTreeMap<String, Duration>,

    /// Fact groups from configuration, merged over the catalog's defaults
    pub fact_groups: BTreeMap<String, Vec<String>>,

    /// Timeout for each external command
    pub command_timeout: Duration,

    /// Overall deadline for one run
    pub run_timeout: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            ttls: BTreeMap::new(),
            fact_groups: BTreeMap::new(),
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            run_timeout: None,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take cache directory, TTLs and fact groups from a loaded config file
    pub fn from_runtime(runtime: &RuntimeConfig) -> Self {
        Self {
            cache_dir: Some(runtime.cache_dir()),
            ttls: runtime.ttls(),
            fact_groups: runtime.fact_groups.clone(),
            ..Self::default()
        }
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.cache_dir = None;
        self
    }

    pub fn with_ttl(mut self, group: impl Into<String>, ttl: Duration) -> Self {
        self.ttls.insert(group.into(), ttl);
        self
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_builder() {
        let config = EngineConfig::new()
            .with_cache_dir("/tmp/facts")
            .with_ttl("memory", Duration::from_secs(60))
            .with_run_timeout(Duration::from_secs(30));

        assert_eq!(config.cache_dir.as_deref(), Some(Path::new("/tmp/facts")));
        assert_eq!(config.ttls.get("memory"), Some(&Duration::from_secs(60)));
        assert_eq!(config.command_timeout, DEFAULT_COMMAND_TIMEOUT);
        assert!(config.without_cache().cache_dir.is_none());
    }

    #[test]
    fn test_from_runtime() {
        let runtime = RuntimeConfig::from_toml_str(
            r#"
            [facts]
            ttls = { "memory" = "1 hour" }

            [fact-groups]
            "my group" = ["kernel"]
            "#,
            Path::new("hostfacts.toml"),
        )
        .unwrap();

        let config = EngineConfig::from_runtime(&runtime);

        assert_eq!(config.ttls.get("memory"), Some(&Duration::from_secs(3600)));
        assert_eq!(
            config.fact_groups.get("my group"),
            Some(&vec!["kernel".to_string()])
        );
        assert!(config.cache_dir.is_some());
    }
}
