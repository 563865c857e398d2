//! Human-readable TTL parsing (`"30 days"`, `"1 hour"`, `"90s"`)

use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TtlError {
    #[error("Malformed TTL '{0}': expected '<number> <unit>'")]
    Malformed(String),

    #[error("Unknown TTL unit '{unit}' in '{input}'")]
    UnknownUnit { input: String, unit: String },

    #[error("TTL '{0}' must be greater than zero")]
    Zero(String),
}

fn ttl_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(\d+)\s*([A-Za-z]+)\s*$").expect("TTL pattern is a valid regex")
    })
}

/// Parse a TTL such as `"30 days"` into a duration
pub fn parse_ttl(input: &str) -> Result<Duration, TtlError> {
    let captures = ttl_pattern()
        .captures(input)
        .ok_or_else(|| TtlError::Malformed(input.to_string()))?;

    let amount: u64 = captures[1]
        .parse()
        .map_err(|_| TtlError::Malformed(input.to_string()))?;
    let unit = captures[2].to_lowercase();

    let duration = match unit.as_str() {
        "ns" | "nanosecond" | "nanoseconds" => Duration::from_nanos(amount),
        "ms" | "millisecond" | "milliseconds" => Duration::from_millis(amount),
        "s" | "sec" | "second" | "seconds" => Duration::from_secs(amount),
        "m" | "min" | "minute" | "minutes" => Duration::from_secs(amount.saturating_mul(60)),
        "h" | "hour" | "hours" => Duration::from_secs(amount.saturating_mul(3_600)),
        "d" | "day" | "days" => Duration::from_secs(amount.saturating_mul(86_400)),
        _ => {
            return Err(TtlError::UnknownUnit {
                input: input.to_string(),
                unit,
            })
        }
    };

    if duration.is_zero() {
        return Err(TtlError::Zero(input.to_string()));
    }

    Ok(duration)
}
