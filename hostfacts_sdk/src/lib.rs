//! # hostfacts SDK
//!
//! Representative host fact catalog on top of the hostfacts engine.
//! Provides kernel, operating system, memory, processor, hostname and runtime facts
//! with their legacy aliases.

// Module declarations
pub mod commands;
pub mod facts;
pub mod resolvers;

use hostfacts_base::api::{EngineConfig, FactEngine};
use hostfacts_base::options::store::LOCAL_DEFINITIONS_GROUP;
use hostfacts_base::options::OptionSnapshot;
use hostfacts_base::resolution::FactGroups;
use resolvers::{LinuxMemoryResolver, OsReleaseResolver};

/// Default fact groups: blocking and persistent caching units
pub fn default_fact_groups() -> FactGroups {
    FactGroups::new()
        .with_group(
            "kernel",
            &["kernel", "kernelrelease", "kernelversion", "kernelmajversion"],
        )
        .with_group(
            "operating system",
            &[
                "os",
                "operatingsystem",
                "osfamily",
                "operatingsystemrelease",
                "operatingsystemmajrelease",
            ],
        )
        .with_group(
            "memory",
            &[
                "memory",
                "memorysize_mb",
                "memoryfree_mb",
                "memorysize",
                "memoryfree",
                "swapsize_mb",
                "swapfree_mb",
                "swapsize",
                "swapfree",
            ],
        )
        .with_group("processors", &["processors", "processorcount"])
        .with_group("networking", &["networking", "hostname"])
        .with_group(LOCAL_DEFINITIONS_GROUP, &["runtime", "runtimeversion"])
}

/// Sources the catalog reads from
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub memory: LinuxMemoryResolver,
    pub os_release: OsReleaseResolver,
}

impl Catalog {
    /// Register every catalog fact and legacy alias
    ///
    /// Registration honors the blocklist and source toggles of `options`.
    pub fn register(&self, engine: &mut FactEngine, options: &OptionSnapshot) {
        facts::kernel::register(engine, options);
        facts::os::register(engine, options, &self.os_release);
        facts::memory::register(engine, options, &self.memory);
        facts::processors::register(engine, options);
        facts::networking::register(engine, options);
        facts::runtime::register(engine, options);
    }
}

/// Create an engine with the whitelisted executor, the default groups and
/// the full catalog registered
pub fn create_fact_engine(config: EngineConfig, options: &OptionSnapshot) -> FactEngine {
    let mut engine = FactEngine::with_config(config, commands::create_linux_command_executor())
        .with_default_groups(default_fact_groups());
    Catalog::default().register(&mut engine, options);
    engine
}
