//! Legacy flat-name aliases derived from structured facts

pub mod mapper;
pub mod units;

pub use mapper::{LegacyAlias, LegacyMapper};
pub use units::{bytes_to_human_readable, bytes_to_mb, percentage, round_2, UnitConversion};
