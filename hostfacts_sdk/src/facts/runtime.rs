//! Facts about the runtime that evaluates local definitions
//!
//! These live in the local definitions group, so switching local definitions
//! off blocks them together with every `FactSource::Local` resolution.

use hostfacts_base::api::FactEngine;
use hostfacts_base::legacy::LegacyAlias;
use hostfacts_base::options::OptionSnapshot;
use hostfacts_base::resolution::Resolution;

pub const RUNTIME_VERSION: &str = "runtime.version";
pub const RUNTIME_PLATFORM: &str = "runtime.platform";

/// `<arch>-<os>` of the running binary
pub fn platform() -> String {
    format!("{}-{}", std::env::consts::ARCH, std::env::consts::OS)
}

pub fn register(engine: &mut FactEngine, options: &OptionSnapshot) {
    engine.add(
        options,
        RUNTIME_VERSION,
        Resolution::static_value(env!("CARGO_PKG_VERSION")),
    );
    engine.add(options, RUNTIME_PLATFORM, Resolution::static_value(platform()));
    engine.add_legacy_alias(options, LegacyAlias::new("runtimeversion", RUNTIME_VERSION));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::default_fact_groups;
    use hostfacts_base::options::{OptionChange, OptionStore};
    use hostfacts_base::probe::SystemCommandExecutor;
    use hostfacts_base::types::FactValue;

    fn engine() -> FactEngine {
        FactEngine::new(SystemCommandExecutor::new()).with_default_groups(default_fact_groups())
    }

    #[test]
    fn test_runtime_facts() {
        let options = OptionSnapshot::default();
        let mut engine = engine();
        register(&mut engine, &options);

        assert_eq!(
            engine.value(&options, RUNTIME_VERSION).unwrap(),
            Some(FactValue::from(env!("CARGO_PKG_VERSION")))
        );
        assert_eq!(
            engine.value(&options, "runtimeversion").unwrap(),
            Some(FactValue::from(env!("CARGO_PKG_VERSION")))
        );
        assert!(platform().ends_with(std::env::consts::OS));
    }

    #[test]
    fn test_disabling_local_definitions_blocks_runtime_facts() {
        let options = OptionStore::new()
            .apply(OptionChange::LocalDefinitions(false))
            .snapshot();
        let mut engine = engine();
        register(&mut engine, &options);

        assert!(!engine.registry().contains(RUNTIME_VERSION));
        assert!(!engine.registry().contains(RUNTIME_PLATFORM));
        assert!(engine.registry().legacy_alias("runtimeversion").is_none());
    }
}
