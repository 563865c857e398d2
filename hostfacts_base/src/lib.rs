//! # hostfacts base - fact resolution engine
//!
//! Registry of facts and their candidate resolutions, confine-based
//! selection, memoized evaluation with cycle detection, a run-scoped probe
//! cache, a TTL-bounded persistent cache and the legacy alias layer.

pub mod api;
pub mod legacy;
pub mod logging;
pub mod options;
pub mod persistent;
pub mod probe;
pub mod resolution;
pub mod types;

// Convenience re-exports
pub use api::*;

pub mod prelude {
    pub use crate::api::{EngineConfig, EngineError, FactEngine};

    pub use crate::legacy::{LegacyAlias, UnitConversion};
    pub use crate::options::{OptionChange, OptionSnapshot, OptionStore, RuntimeConfig};
    pub use crate::persistent::PersistentCache;
    pub use crate::probe::{ProbeCache, ProbeError, SystemCommandExecutor};

    pub use crate::resolution::{
        CancellationToken, Confine, FactGroups, FactSource, Registration, Resolution,
        ResolutionContext, ResolutionError, ValueSource,
    };

    pub use crate::types::{FactKind, FactValue, ResolvedFact};
}
