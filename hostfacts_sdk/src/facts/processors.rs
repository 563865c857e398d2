//! Processor facts

use hostfacts_base::api::FactEngine;
use hostfacts_base::legacy::LegacyAlias;
use hostfacts_base::options::OptionSnapshot;
use hostfacts_base::resolution::Resolution;
use hostfacts_base::types::FactValue;

pub const PROCESSORS_COUNT: &str = "processors.count";

pub fn register(engine: &mut FactEngine, options: &OptionSnapshot) {
    engine.add(
        options,
        PROCESSORS_COUNT,
        Resolution::computed(|_| Ok(Some(FactValue::from(num_cpus::get())))),
    );
    engine.add_legacy_alias(options, LegacyAlias::new("processorcount", PROCESSORS_COUNT));
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostfacts_base::probe::SystemCommandExecutor;

    #[test]
    fn test_processor_count() {
        let options = OptionSnapshot::default();
        let mut engine = FactEngine::new(SystemCommandExecutor::new());
        register(&mut engine, &options);

        let count = engine
            .value(&options, PROCESSORS_COUNT)
            .unwrap()
            .and_then(|value| value.as_integer())
            .unwrap();
        assert!(count >= 1);
        assert_eq!(
            engine.value(&options, "processorcount").unwrap(),
            Some(FactValue::Integer(count))
        );
    }
}
