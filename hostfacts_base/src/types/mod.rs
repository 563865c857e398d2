//! Shared value types for the fact engine

pub mod resolved;
pub mod value;

pub use resolved::{FactKind, ResolvedFact};
pub use value::FactValue;
