//! Read-only view of the option store consulted by the engine

use crate::resolution::FactSource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Flattened toggles the engine reads on every registration and resolution
/// pass
///
/// Snapshots are cheap to build and are handed to the engine explicitly;
/// the engine never stores one between calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSnapshot {
    /// Effective blocklist (empty when blocking is switched off)
    pub blocked_facts: BTreeSet<String>,

    /// Whether custom (user supplied, in-process) definitions are registered
    pub custom_facts: bool,

    /// Whether externally sourced definitions are registered
    pub external_facts: bool,

    /// Whether locally defined, in-process definitions are registered at all
    pub local_definitions: bool,

    /// Whether legacy aliases appear in output
    pub show_legacy: bool,

    /// Whether the persistent cache may be read or written
    pub cache: bool,

    /// Names the caller asked for; empty means everything
    pub user_query: Vec<String>,
}

impl Default for OptionSnapshot {
    fn default() -> Self {
        Self {
            blocked_facts: BTreeSet::new(),
            custom_facts: true,
            external_facts: true,
            local_definitions: true,
            show_legacy: true,
            cache: true,
            user_query: Vec::new(),
        }
    }
}

impl OptionSnapshot {
    /// Check whether a name is blocked directly or through a dotted ancestor
    ///
    /// Blocking `memory` blocks `memory.system.total_bytes`, but not
    /// `memorysize_mb`.
    pub fn blocks_name(&self, name: &str) -> bool {
        self.blocked_facts.iter().any(|blocked| {
            name == blocked
                || (name.len() > blocked.len()
                    && name.starts_with(blocked.as_str())
                    && name.as_bytes()[blocked.len()] == b'.')
        })
    }

    /// Check whether definitions from this source may be registered
    pub fn allows_source(&self, source: FactSource) -> bool {
        match source {
            FactSource::Core => true,
            FactSource::Local => self.local_definitions,
            FactSource::Custom => self.local_definitions && self.custom_facts,
            FactSource::External => self.external_facts,
        }
    }

    /// Check whether a name was asked for by the caller's query
    ///
    /// An empty query selects everything. A query selects itself and its
    /// dotted descendants.
    pub fn is_queried(&self, name: &str) -> bool {
        if self.user_query.is_empty() {
            return true;
        }

        self.user_query.iter().any(|query| {
            name == query
                || (name.len() > query.len()
                    && name.starts_with(query.as_str())
                    && name.as_bytes()[query.len()] == b'.')
        })
    }

    pub fn with_blocked(mut self, names: &[&str]) -> Self {
        self.blocked_facts
            .extend(names.iter().map(|name| name.to_string()));
        self
    }

    pub fn with_show_legacy(mut self, show_legacy: bool) -> Self {
        self.show_legacy = show_legacy;
        self
    }

    pub fn with_cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_user_query(mut self, query: &[&str]) -> Self {
        self.user_query = query.iter().map(|q| q.to_string()).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_dotted_descendants_only() {
        let snapshot = OptionSnapshot::default().with_blocked(&["memory"]);

        assert!(snapshot.blocks_name("memory"));
        assert!(snapshot.blocks_name("memory.system.total_bytes"));
        assert!(!snapshot.blocks_name("memorysize_mb"));
        assert!(!snapshot.blocks_name("kernel"));
    }

    #[test]
    fn test_source_gating() {
        let mut snapshot = OptionSnapshot::default();
        assert!(snapshot.allows_source(FactSource::Custom));

        snapshot.custom_facts = false;
        assert!(!snapshot.allows_source(FactSource::Custom));
        assert!(snapshot.allows_source(FactSource::Local));

        snapshot.custom_facts = true;
        snapshot.local_definitions = false;
        assert!(!snapshot.allows_source(FactSource::Custom));
        assert!(!snapshot.allows_source(FactSource::Local));
        assert!(snapshot.allows_source(FactSource::Core));

        snapshot.external_facts = false;
        assert!(!snapshot.allows_source(FactSource::External));
    }

    #[test]
    fn test_user_query_selection() {
        let snapshot = OptionSnapshot::default();
        assert!(snapshot.is_queried("anything"));

        let snapshot = snapshot.with_user_query(&["memory.system"]);
        assert!(snapshot.is_queried("memory.system"));
        assert!(snapshot.is_queried("memory.system.total_bytes"));
        assert!(!snapshot.is_queried("memory.swap.total_bytes"));
        assert!(!snapshot.is_queried("memory.systemd"));
    }
}
