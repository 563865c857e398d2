//! Option store, read-only snapshots and runtime configuration

pub mod error;
pub mod runtime;
pub mod snapshot;
pub mod store;

pub use error::{ConfigError, OptionError};
pub use runtime::RuntimeConfig;
pub use snapshot::OptionSnapshot;
pub use store::{OptionChange, OptionStore};
