//! Resolved fact output records

use super::value::FactValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a resolved fact is addressed by its structured or legacy name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactKind {
    Structured,
    Legacy,
}

impl FactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FactKind::Structured => "structured",
            FactKind::Legacy => "legacy",
        }
    }
}

/// A fact name paired with its (possibly absent) value
///
/// `value == None` is a valid result: the fact was not applicable on this
/// host or its probe failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedFact {
    pub name: String,
    pub value: Option<FactValue>,
    pub kind: FactKind,
}

impl ResolvedFact {
    pub fn structured(name: impl Into<String>, value: Option<FactValue>) -> Self {
        Self {
            name: name.into(),
            value,
            kind: FactKind::Structured,
        }
    }

    pub fn legacy(name: impl Into<String>, value: Option<FactValue>) -> Self {
        Self {
            name: name.into(),
            value,
            kind: FactKind::Legacy,
        }
    }

    pub fn is_legacy(&self) -> bool {
        self.kind == FactKind::Legacy
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }
}

impl fmt::Display for ResolvedFact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{} => {}", self.name, value),
            None => write!(f, "{} => ", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let fact = ResolvedFact::legacy("memorysize_mb", None);
        assert!(fact.is_legacy());
        assert!(!fact.has_value());

        let fact = ResolvedFact::structured("kernel", Some(FactValue::from("Linux")));
        assert_eq!(fact.kind, FactKind::Structured);
        assert_eq!(fact.to_string(), "kernel => Linux");
    }

    #[test]
    fn test_serialization() {
        let fact = ResolvedFact::legacy("memorysize_mb", Some(FactValue::Float(3177.21)));
        let json = serde_json::to_string(&fact).unwrap();
        assert_eq!(
            json,
            r#"{"name":"memorysize_mb","value":3177.21,"kind":"legacy"}"#
        );
    }
}
