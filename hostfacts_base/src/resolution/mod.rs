//! Fact resolution: confines, resolutions, the registry and the evaluator

pub mod cancel;
pub mod confine;
pub mod error;
pub mod evaluator;
pub mod groups;
pub mod registry;
pub mod resolution;

pub use cancel::CancellationToken;
pub use confine::{Confine, Matcher};
pub use error::ResolutionError;
pub use evaluator::{MemoTable, ResolutionContext};
pub use groups::FactGroups;
pub use registry::{FactDefinition, FactRegistry, Registration};
pub use resolution::{FactSource, Resolution, ValueSource, COMMAND_RESOLVER};
