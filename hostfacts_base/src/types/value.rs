//! Fact value model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Value produced by a fact resolution
///
/// Serialized untagged so that JSON output carries the natural shape of the
/// value (`"Linux"`, `3331551232`, `{"total_bytes": ...}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<FactValue>),
    Map(BTreeMap<String, FactValue>),
}

impl FactValue {
    /// Check if this is a string value
    pub fn is_string(&self) -> bool {
        matches!(self, FactValue::String(_))
    }

    /// Get as string if possible
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FactValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as integer if possible
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FactValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as float, widening integers
    pub fn as_float(&self) -> Option<f64> {
        match self {
            FactValue::Float(f) => Some(*f),
            FactValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get as boolean if possible
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FactValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as map if possible
    pub fn as_map(&self) -> Option<&BTreeMap<String, FactValue>> {
        match self {
            FactValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a nested value by dotted path (`"system.total_bytes"`)
    pub fn get_path(&self, path: &str) -> Option<&FactValue> {
        let mut current = self;
        for part in path.split('.') {
            current = current.as_map()?.get(part)?;
        }
        Some(current)
    }

    /// String rendering used by confine literal comparison
    ///
    /// Scalars render without quotes; composite values fall back to JSON.
    pub fn to_match_string(&self) -> String {
        match self {
            FactValue::String(s) => s.clone(),
            FactValue::Integer(i) => i.to_string(),
            FactValue::Float(f) => f.to_string(),
            FactValue::Boolean(b) => b.to_string(),
            FactValue::Array(_) | FactValue::Map(_) => {
                serde_json::to_string(self).unwrap_or_default()
            }
        }
    }

    /// Case-insensitive comparison against another value's string form
    pub fn matches_literal(&self, literal: &FactValue) -> bool {
        self.to_match_string()
            .eq_ignore_ascii_case(&literal.to_match_string())
    }
}

impl fmt::Display for FactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactValue::String(s) => write!(f, "{}", s),
            FactValue::Integer(i) => write!(f, "{}", i),
            FactValue::Float(fl) => write!(f, "{}", fl),
            FactValue::Boolean(b) => write!(f, "{}", b),
            FactValue::Array(_) | FactValue::Map(_) => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

impl From<&str> for FactValue {
    fn from(value: &str) -> Self {
        FactValue::String(value.to_string())
    }
}

impl From<String> for FactValue {
    fn from(value: String) -> Self {
        FactValue::String(value)
    }
}

impl From<i64> for FactValue {
    fn from(value: i64) -> Self {
        FactValue::Integer(value)
    }
}

impl From<u64> for FactValue {
    fn from(value: u64) -> Self {
        // Values past i64::MAX are not realistic for host facts; saturate.
        FactValue::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<usize> for FactValue {
    fn from(value: usize) -> Self {
        FactValue::from(value as u64)
    }
}

impl From<f64> for FactValue {
    fn from(value: f64) -> Self {
        FactValue::Float(value)
    }
}

impl From<bool> for FactValue {
    fn from(value: bool) -> Self {
        FactValue::Boolean(value)
    }
}

impl From<Vec<FactValue>> for FactValue {
    fn from(value: Vec<FactValue>) -> Self {
        FactValue::Array(value)
    }
}

impl From<BTreeMap<String, FactValue>> for FactValue {
    fn from(value: BTreeMap<String, FactValue>) -> Self {
        FactValue::Map(value)
    }
}
