// RUNTIME CONFIGURATION (config file + environment)

use super::error::ConfigError;
use super::store::{OptionChange, OptionStore};
use crate::logging::parse_log_level;
use crate::persistent::ttl::parse_ttl;
use crate::{log_debug, log_warning};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default location of the persistent fact cache
pub const DEFAULT_CACHE_DIR: &str = "/var/cache/hostfacts/cached_facts";

/// Default config file name looked up by the CLI
pub const DEFAULT_CONFIG_FILE: &str = "/etc/hostfacts/hostfacts.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GlobalSection {
    /// Directories holding custom definitions
    pub custom_dir: Vec<PathBuf>,

    /// Directories holding external definitions
    pub external_dir: Vec<PathBuf>,

    pub no_custom_facts: bool,
    pub no_external_facts: bool,
    pub no_local_definitions: bool,

    /// Disable the persistent cache entirely
    pub no_cache: bool,

    /// Where persistent cache group files live
    pub cache_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CliSection {
    pub debug: bool,
    pub trace: bool,
    pub verbose: bool,
    pub log_level: Option<String>,
    pub show_legacy: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FactsSection {
    /// Facts or fact groups never registered
    pub blocklist: Vec<String>,

    /// Persistent cache TTL per fact group (`memory = "30 days"`)
    pub ttls: BTreeMap<String, String>,
}

/// Runtime configuration loaded from `hostfacts.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RuntimeConfig {
    pub global: GlobalSection,
    pub cli: CliSection,
    pub facts: FactsSection,

    /// Extra or replacement fact groups
    pub fact_groups: BTreeMap<String, Vec<String>>,
}

impl RuntimeConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load configuration from a file; a missing file yields defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log_debug!("Config file not found, using defaults", "path" => path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_toml_str(&content, path)?;
        log_debug!(
            "Loaded config file",
            "path" => path.display(),
            "blocklist" => config.facts.blocklist.len(),
            "ttls" => config.facts.ttls.len()
        );
        Ok(config)
    }

    /// Apply `HOSTFACTS_*` environment variable overrides
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(show) = lookup(env_vars::SHOW_LEGACY).and_then(|v| v.parse().ok()) {
            self.cli.show_legacy = Some(show);
        }
        if let Some(cache) = lookup(env_vars::CACHE).and_then(|v| v.parse::<bool>().ok()) {
            self.global.no_cache = !cache;
        }
        if let Some(level) = lookup(env_vars::LOG_LEVEL) {
            self.cli.log_level = Some(level);
        }
        if let Some(dir) = lookup(env_vars::CACHE_DIR) {
            self.global.cache_dir = Some(PathBuf::from(dir));
        }
        if let Some(custom) = lookup(env_vars::CUSTOM_FACTS).and_then(|v| v.parse::<bool>().ok()) {
            self.global.no_custom_facts = !custom;
        }
        if let Some(external) =
            lookup(env_vars::EXTERNAL_FACTS).and_then(|v| v.parse::<bool>().ok())
        {
            self.global.no_external_facts = !external;
        }
        if let Some(blocklist) = lookup(env_vars::BLOCKLIST) {
            self.facts.blocklist.extend(
                blocklist
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string),
            );
        }
        self
    }

    /// Option changes this configuration implies, in application order
    pub fn option_changes(&self) -> Vec<OptionChange> {
        let mut changes = Vec::new();

        if !self.global.custom_dir.is_empty() {
            changes.push(OptionChange::CustomDir(self.global.custom_dir.clone()));
        }
        if !self.global.external_dir.is_empty() {
            changes.push(OptionChange::ExternalDir(self.global.external_dir.clone()));
        }
        if self.global.no_custom_facts {
            changes.push(OptionChange::CustomFacts(false));
        }
        if self.global.no_external_facts {
            changes.push(OptionChange::ExternalFacts(false));
        }
        if self.global.no_local_definitions {
            changes.push(OptionChange::LocalDefinitions(false));
        }
        if self.global.no_cache {
            changes.push(OptionChange::Cache(false));
        }
        if !self.facts.blocklist.is_empty() {
            changes.push(OptionChange::BlockedFacts(self.facts.blocklist.clone()));
        }
        if let Some(show) = self.cli.show_legacy {
            changes.push(OptionChange::ShowLegacy(show));
        }
        if let Some(raw) = &self.cli.log_level {
            match parse_log_level(raw) {
                Some(level) => changes.push(OptionChange::LogLevel(level)),
                None => log_warning!("Ignoring invalid log level in config", "value" => raw),
            }
        }
        // debug/verbose/trace win over an explicit log level
        if self.cli.verbose {
            changes.push(OptionChange::Verbose(true));
        }
        if self.cli.debug {
            changes.push(OptionChange::Debug(true));
        }
        if self.cli.trace {
            changes.push(OptionChange::Trace(true));
        }

        changes
    }

    /// Fold this configuration into an option store
    pub fn apply_to(&self, store: OptionStore) -> OptionStore {
        store.apply_all(self.option_changes())
    }

    /// Parsed TTLs per group; unparseable entries are logged and skipped
    pub fn ttls(&self) -> BTreeMap<String, Duration> {
        let mut ttls = BTreeMap::new();
        for (group, raw) in &self.facts.ttls {
            match parse_ttl(raw) {
                Ok(ttl) => {
                    ttls.insert(group.clone(), ttl);
                }
                Err(e) => {
                    log_warning!(
                        "Ignoring invalid cache TTL, group will not be cached",
                        "group" => group,
                        "error" => e
                    );
                }
            }
        }
        ttls
    }

    /// Directory for persistent cache files
    pub fn cache_dir(&self) -> PathBuf {
        self.global
            .cache_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR))
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    pub const SHOW_LEGACY: &str = "HOSTFACTS_SHOW_LEGACY";
    pub const CACHE: &str = "HOSTFACTS_CACHE";
    pub const LOG_LEVEL: &str = "HOSTFACTS_LOG_LEVEL";
    pub const CACHE_DIR: &str = "HOSTFACTS_CACHE_DIR";
    pub const CUSTOM_FACTS: &str = "HOSTFACTS_CUSTOM_FACTS";
    pub const EXTERNAL_FACTS: &str = "HOSTFACTS_EXTERNAL_FACTS";
    pub const BLOCKLIST: &str = "HOSTFACTS_BLOCKLIST";
}
