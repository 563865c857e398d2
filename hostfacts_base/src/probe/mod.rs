//! Probe plumbing: the run-scoped probe cache and the command executor

pub mod cache;
pub mod command_executor;
pub mod error;

pub use cache::{ProbeCache, ProbeCacheStats};
pub use command_executor::{command_key, command_line, CommandOutput, SystemCommandExecutor};
pub use error::ProbeError;
