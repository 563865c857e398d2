//! Unit conversions applied when deriving legacy values

use crate::types::FactValue;
use serde::{Deserialize, Serialize};

const BYTES_PER_MEGABYTE: f64 = 1024.0 * 1024.0;
const BINARY_PREFIXES: [&str; 6] = ["KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];

/// Round half away from zero to two decimal places
pub fn round_2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Bytes to megabytes, rounded to two decimals (3331551232 -> 3177.21)
pub fn bytes_to_mb(bytes: f64) -> f64 {
    round_2(bytes / BYTES_PER_MEGABYTE)
}

/// Render a byte count with a binary prefix (`"3.10 GiB"`, `"512 bytes"`)
pub fn bytes_to_human_readable(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{} bytes", bytes);
    }

    let mut value = bytes as f64;
    let mut prefix = 0;
    value /= 1024.0;
    while value >= 1024.0 && prefix + 1 < BINARY_PREFIXES.len() {
        value /= 1024.0;
        prefix += 1;
    }

    // 1023.999 KiB would print as "1024.00 KiB"
    if round_2(value) >= 1024.0 && prefix + 1 < BINARY_PREFIXES.len() {
        value /= 1024.0;
        prefix += 1;
    }

    format!("{:.2} {}", value, BINARY_PREFIXES[prefix])
}

/// Percentage of `part` in `total` as `"12.34%"`; `None` when total is zero
pub fn percentage(part: u64, total: u64) -> Option<String> {
    if total == 0 {
        return None;
    }
    Some(format!("{:.2}%", part as f64 / total as f64 * 100.0))
}

/// Conversion from a structured value to its legacy rendition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitConversion {
    Identity,
    BytesToMegabytes,
    BytesToHumanReadable,
}

impl UnitConversion {
    /// Convert a value. Non-numeric input to a byte conversion yields `None`.
    pub fn apply(&self, value: &FactValue) -> Option<FactValue> {
        match self {
            UnitConversion::Identity => Some(value.clone()),
            UnitConversion::BytesToMegabytes => {
                numeric_bytes(value).map(|bytes| FactValue::Float(bytes_to_mb(bytes)))
            }
            UnitConversion::BytesToHumanReadable => numeric_bytes(value)
                .filter(|bytes| *bytes >= 0.0)
                .map(|bytes| FactValue::String(bytes_to_human_readable(bytes as u64))),
        }
    }
}

fn numeric_bytes(value: &FactValue) -> Option<f64> {
    match value {
        FactValue::Integer(i) => Some(*i as f64),
        FactValue::Float(f) => Some(*f),
        FactValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
