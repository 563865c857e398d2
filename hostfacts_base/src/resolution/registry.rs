//! Fact registry: facts, their candidate resolutions, and legacy aliases

use super::groups::FactGroups;
use super::resolution::Resolution;
use crate::legacy::{LegacyAlias, LegacyMapper};
use crate::options::OptionSnapshot;
use crate::{log_debug, log_info};
use std::collections::BTreeMap;

/// Outcome of a registration attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Added,
    /// Name (or its group) is on the blocklist
    Blocked,
    /// The definition's source kind is switched off
    SourceDisabled,
}

impl Registration {
    pub fn is_added(&self) -> bool {
        matches!(self, Registration::Added)
    }
}

/// A fact and its resolutions in selection order
#[derive(Debug, Clone)]
pub struct FactDefinition {
    name: String,
    resolutions: Vec<Resolution>,
}

impl FactDefinition {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            resolutions: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Keep `resolutions` ordered by specificity, then registration order,
    /// both descending. The newcomer is the most recent, so it goes in front
    /// of every resolution that is not more specific.
    fn insert(&mut self, resolution: Resolution) {
        let specificity = resolution.specificity();
        let position = self
            .resolutions
            .iter()
            .position(|existing| existing.specificity() <= specificity)
            .unwrap_or(self.resolutions.len());

        self.resolutions.insert(position, resolution);
    }

    pub fn resolutions(&self) -> impl Iterator<Item = &Resolution> {
        self.resolutions.iter()
    }

    pub fn len(&self) -> usize {
        self.resolutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolutions.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FactRegistry {
    facts: BTreeMap<String, FactDefinition>,
    legacy: LegacyMapper,
}

impl FactRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a candidate resolution, honoring the blocklist and source
    /// toggles of `options` at call time
    pub fn add(
        &mut self,
        options: &OptionSnapshot,
        groups: &FactGroups,
        name: &str,
        resolution: Resolution,
    ) -> Registration {
        if groups.is_blocked(options, name) {
            log_debug!("Fact is blocked, resolution not registered", "fact" => name);
            return Registration::Blocked;
        }

        if !options.allows_source(resolution.fact_source) {
            log_debug!("Fact source disabled, resolution not registered",
                "fact" => name,
                "source" => resolution.fact_source.as_str()
            );
            return Registration::SourceDisabled;
        }

        self.facts
            .entry(name.to_string())
            .or_insert_with(|| FactDefinition::new(name))
            .insert(resolution);

        Registration::Added
    }

    /// Register a legacy alias unless its name is blocked
    pub fn add_legacy_alias(
        &mut self,
        options: &OptionSnapshot,
        groups: &FactGroups,
        alias: LegacyAlias,
    ) -> Registration {
        if groups.is_blocked(options, &alias.name) {
            log_debug!("Legacy fact is blocked, alias not registered", "fact" => &alias.name);
            return Registration::Blocked;
        }

        self.legacy.add(alias);
        Registration::Added
    }

    pub fn get(&self, name: &str) -> Option<&FactDefinition> {
        self.facts.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.facts.contains_key(name)
    }

    /// Resolutions of `name` in the order they should be tried
    pub fn candidates(&self, name: &str) -> impl Iterator<Item = &Resolution> {
        self.facts
            .get(name)
            .into_iter()
            .flat_map(|definition| definition.resolutions())
    }

    pub fn legacy(&self) -> &LegacyMapper {
        &self.legacy
    }

    pub fn legacy_alias(&self, name: &str) -> Option<&LegacyAlias> {
        self.legacy.get(name)
    }

    /// Structured fact names in sorted order
    pub fn fact_names(&self) -> impl Iterator<Item = &str> {
        self.facts.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty() && self.legacy.is_empty()
    }

    /// Drop every registration
    pub fn reset(&mut self) {
        log_info!("Resetting fact registry",
            "facts" => self.facts.len(),
            "legacy_aliases" => self.legacy.len()
        );
        self.facts.clear();
        self.legacy.clear();
    }
}
