//! Legacy alias mapping
//!
//! A legacy alias names a structured fact and a unit conversion. Mapping a
//! resolved structured fact yields one legacy entry per alias; a nil source
//! yields nil legacy entries rather than dropping them.

use super::units::UnitConversion;
use crate::types::{FactValue, ResolvedFact};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A deprecated flat name derived from a structured fact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyAlias {
    pub name: String,
    pub source: String,
    pub conversion: UnitConversion,
}

impl LegacyAlias {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            conversion: UnitConversion::Identity,
        }
    }

    pub fn with_conversion(mut self, conversion: UnitConversion) -> Self {
        self.conversion = conversion;
        self
    }

    /// Convert a structured value into this alias' value
    pub fn convert(&self, value: Option<&FactValue>) -> Option<FactValue> {
        value.and_then(|v| self.conversion.apply(v))
    }
}

/// Index of legacy aliases by legacy name and by structured source
#[derive(Debug, Clone, Default)]
pub struct LegacyMapper {
    aliases: BTreeMap<String, LegacyAlias>,
    by_source: BTreeMap<String, Vec<String>>,
}

impl LegacyMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an alias
    pub fn add(&mut self, alias: LegacyAlias) {
        if let Some(previous) = self.aliases.remove(&alias.name) {
            if let Some(names) = self.by_source.get_mut(&previous.source) {
                names.retain(|name| name != &previous.name);
            }
        }

        self.by_source
            .entry(alias.source.clone())
            .or_default()
            .push(alias.name.clone());
        self.aliases.insert(alias.name.clone(), alias);
    }

    pub fn get(&self, name: &str) -> Option<&LegacyAlias> {
        self.aliases.get(name)
    }

    pub fn is_legacy(&self, name: &str) -> bool {
        self.aliases.contains_key(name)
    }

    pub fn aliases_for<'a>(&'a self, source: &str) -> impl Iterator<Item = &'a LegacyAlias> + 'a {
        self.by_source
            .get(source)
            .into_iter()
            .flatten()
            .filter_map(move |name| self.aliases.get(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.aliases.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Legacy entries derived from one structured result
    pub fn map(&self, structured: &ResolvedFact) -> Vec<ResolvedFact> {
        self.aliases_for(&structured.name)
            .map(|alias| ResolvedFact::legacy(&alias.name, alias.convert(structured.value.as_ref())))
            .collect()
    }

    pub fn clear(&mut self) {
        self.aliases.clear();
        self.by_source.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FactKind;

    fn memory_mapper() -> LegacyMapper {
        let mut mapper = LegacyMapper::new();
        mapper.add(
            LegacyAlias::new("memorysize_mb", "memory.system.total_bytes")
                .with_conversion(UnitConversion::BytesToMegabytes),
        );
        mapper.add(
            LegacyAlias::new("memorysize", "memory.system.total_bytes")
                .with_conversion(UnitConversion::BytesToHumanReadable),
        );
        mapper
    }

    #[test]
    fn test_map_converts_units() {
        let mapper = memory_mapper();
        let structured = ResolvedFact::structured(
            "memory.system.total_bytes",
            Some(FactValue::Integer(3_331_551_232)),
        );

        let legacy = mapper.map(&structured);

        assert_eq!(legacy.len(), 2);
        assert!(legacy.iter().all(|fact| fact.kind == FactKind::Legacy));
        assert!(legacy.contains(&ResolvedFact::legacy(
            "memorysize_mb",
            Some(FactValue::Float(3177.21))
        )));
        assert!(legacy.contains(&ResolvedFact::legacy(
            "memorysize",
            Some(FactValue::String("3.10 GiB".to_string()))
        )));
    }

    #[test]
    fn test_nil_source_yields_nil_legacy_entries() {
        let mapper = memory_mapper();
        let structured = ResolvedFact::structured("memory.system.total_bytes", None);

        let legacy = mapper.map(&structured);

        assert_eq!(legacy.len(), 2);
        assert!(legacy
            .iter()
            .all(|fact| fact.value.is_none() && fact.kind == FactKind::Legacy));
    }

    #[test]
    fn test_unaliased_fact_maps_to_nothing() {
        let mapper = memory_mapper();
        let structured = ResolvedFact::structured("kernel", Some("Linux".into()));
        assert!(mapper.map(&structured).is_empty());
    }

    #[test]
    fn test_replacing_alias_moves_source() {
        let mut mapper = memory_mapper();
        mapper.add(LegacyAlias::new("memorysize", "memory.system.available_bytes"));

        assert_eq!(mapper.len(), 2);
        assert_eq!(mapper.aliases_for("memory.system.total_bytes").count(), 1);
        assert_eq!(
            mapper.get("memorysize").map(|alias| alias.source.as_str()),
            Some("memory.system.available_bytes")
        );
    }
}
