//! Option store with pure, cascading transitions
//!
//! Every mutation goes through [`OptionStore::apply`], which takes the old
//! store by value and returns the new one. Derived toggles (for example
//! `debug` driving `log_level`) are applied inside the transition so they can
//! be tested without an engine.

use super::error::OptionError;
use super::snapshot::OptionSnapshot;
use crate::logging::{parse_log_level, LogLevel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Group name blocked when local definitions are switched off
pub const LOCAL_DEFINITIONS_GROUP: &str = "local_definitions";

/// Full option set of the configuration collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionStore {
    pub block: bool,
    pub blocked_facts: Vec<String>,
    pub custom_dir: Vec<PathBuf>,
    pub custom_facts: bool,
    pub debug: bool,
    pub external_dir: Vec<PathBuf>,
    pub external_facts: bool,
    pub log_level: LogLevel,
    pub local_definitions: bool,
    pub show_legacy: bool,
    pub trace: bool,
    pub user_query: Vec<String>,
    pub verbose: bool,
    pub config: Option<PathBuf>,
    pub cache: bool,
}

impl Default for OptionStore {
    fn default() -> Self {
        Self {
            block: true,
            blocked_facts: Vec::new(),
            custom_dir: Vec::new(),
            custom_facts: true,
            debug: false,
            external_dir: Vec::new(),
            external_facts: true,
            log_level: LogLevel::Warn,
            local_definitions: true,
            show_legacy: true,
            trace: false,
            user_query: Vec::new(),
            verbose: false,
            config: None,
            cache: true,
        }
    }
}

/// A single option mutation
#[derive(Debug, Clone, PartialEq)]
pub enum OptionChange {
    Block(bool),
    BlockedFacts(Vec<String>),
    CustomDir(Vec<PathBuf>),
    CustomFacts(bool),
    Debug(bool),
    ExternalDir(Vec<PathBuf>),
    ExternalFacts(bool),
    LogLevel(LogLevel),
    LocalDefinitions(bool),
    ShowLegacy(bool),
    Trace(bool),
    UserQuery(Vec<String>),
    Verbose(bool),
    Config(Option<PathBuf>),
    Cache(bool),
}

impl OptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one change with its documented cascades
    pub fn apply(mut self, change: OptionChange) -> Self {
        match change {
            OptionChange::Block(block) => self.block = block,
            OptionChange::BlockedFacts(facts) => {
                // An empty list never clears what is already blocked
                for fact in facts {
                    if !self.blocked_facts.contains(&fact) {
                        self.blocked_facts.push(fact);
                    }
                }
            }
            OptionChange::CustomDir(dirs) => {
                if !dirs.is_empty() {
                    self.custom_dir = dirs;
                    self.local_definitions = true;
                }
            }
            OptionChange::CustomFacts(enabled) => {
                self.custom_facts = enabled;
                if enabled {
                    self.local_definitions = true;
                }
            }
            OptionChange::Debug(enabled) => {
                self.debug = enabled;
                self.log_level = if enabled {
                    LogLevel::Debug
                } else {
                    LogLevel::default()
                };
            }
            OptionChange::ExternalDir(dirs) => {
                if !dirs.is_empty() {
                    self.external_dir = dirs;
                }
            }
            OptionChange::ExternalFacts(enabled) => self.external_facts = enabled,
            OptionChange::LogLevel(level) => {
                self.log_level = match level {
                    LogLevel::Trace => LogLevel::Debug,
                    other => other,
                };
            }
            OptionChange::LocalDefinitions(enabled) => {
                self.local_definitions = enabled;
                if !enabled {
                    self.custom_facts = false;
                    self = self.apply(OptionChange::BlockedFacts(vec![
                        LOCAL_DEFINITIONS_GROUP.to_string(),
                    ]));
                }
            }
            OptionChange::ShowLegacy(enabled) => {
                self.show_legacy = enabled;
                if enabled {
                    self.local_definitions = true;
                }
            }
            OptionChange::Trace(enabled) => {
                self.trace = enabled;
                self.log_level = if enabled {
                    LogLevel::Debug
                } else {
                    LogLevel::default()
                };
            }
            OptionChange::UserQuery(query) => self.user_query = query,
            OptionChange::Verbose(enabled) => {
                self.verbose = enabled;
                self.log_level = if enabled {
                    LogLevel::Info
                } else {
                    LogLevel::default()
                };
            }
            OptionChange::Config(path) => self.config = path,
            OptionChange::Cache(enabled) => self.cache = enabled,
        }

        self
    }

    /// Apply a sequence of changes in order
    pub fn apply_all(self, changes: impl IntoIterator<Item = OptionChange>) -> Self {
        changes
            .into_iter()
            .fold(self, |store, change| store.apply(change))
    }

    /// String-keyed setter used by config files and generic callers
    pub fn set(self, name: &str, value: &str) -> Result<Self, OptionError> {
        let change = parse_change(name, value)?;
        Ok(self.apply(change))
    }

    /// Reset every option to its default
    pub fn reset(self) -> Self {
        Self::default()
    }

    /// Flatten into the read contract consumed by the engine
    pub fn snapshot(&self) -> OptionSnapshot {
        let blocked_facts: BTreeSet<String> = if self.block {
            self.blocked_facts.iter().cloned().collect()
        } else {
            BTreeSet::new()
        };

        OptionSnapshot {
            blocked_facts,
            custom_facts: self.custom_facts,
            external_facts: self.external_facts,
            local_definitions: self.local_definitions,
            show_legacy: self.show_legacy,
            cache: self.cache,
            user_query: self.user_query.clone(),
        }
    }
}

/// Parse an option name and raw value into a typed change
pub fn parse_change(name: &str, value: &str) -> Result<OptionChange, OptionError> {
    let normalized = name.trim().replace('-', "_").to_lowercase();

    let change = match normalized.as_str() {
        "block" => OptionChange::Block(parse_bool(name, value)?),
        "blocked_facts" | "blocklist" => OptionChange::BlockedFacts(parse_list(value)),
        "custom_dir" => {
            OptionChange::CustomDir(parse_list(value).into_iter().map(PathBuf::from).collect())
        }
        "custom_facts" => OptionChange::CustomFacts(parse_bool(name, value)?),
        "debug" => OptionChange::Debug(parse_bool(name, value)?),
        "external_dir" => {
            OptionChange::ExternalDir(parse_list(value).into_iter().map(PathBuf::from).collect())
        }
        "external_facts" => OptionChange::ExternalFacts(parse_bool(name, value)?),
        "log_level" => {
            let level = parse_log_level(value).ok_or_else(|| OptionError::InvalidValue {
                name: name.to_string(),
                value: value.to_string(),
                reason: "expected one of error, warn, info, debug, trace".to_string(),
            })?;
            OptionChange::LogLevel(level)
        }
        "local_definitions" => OptionChange::LocalDefinitions(parse_bool(name, value)?),
        "show_legacy" => OptionChange::ShowLegacy(parse_bool(name, value)?),
        "trace" => OptionChange::Trace(parse_bool(name, value)?),
        "user_query" => OptionChange::UserQuery(parse_list(value)),
        "verbose" => OptionChange::Verbose(parse_bool(name, value)?),
        "config" => {
            let path = value.trim();
            OptionChange::Config(if path.is_empty() {
                None
            } else {
                Some(PathBuf::from(path))
            })
        }
        "cache" => OptionChange::Cache(parse_bool(name, value)?),
        _ => {
            return Err(OptionError::UnknownOption {
                name: name.to_string(),
            })
        }
    };

    Ok(change)
}

fn parse_bool(name: &str, value: &str) -> Result<bool, OptionError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(OptionError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
