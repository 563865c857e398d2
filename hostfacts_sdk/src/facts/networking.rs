//! Networking facts

use hostfacts_base::api::FactEngine;
use hostfacts_base::legacy::LegacyAlias;
use hostfacts_base::options::OptionSnapshot;
use hostfacts_base::resolution::{Resolution, ResolutionError};
use hostfacts_base::types::FactValue;

pub const NETWORKING_HOSTNAME: &str = "networking.hostname";

/// Host part of a possibly fully qualified name
pub fn short_hostname(name: &str) -> Option<&str> {
    name.split('.').next().filter(|host| !host.is_empty())
}

pub fn register(engine: &mut FactEngine, options: &OptionSnapshot) {
    engine.add(
        options,
        NETWORKING_HOSTNAME,
        Resolution::computed(|_| {
            let name = hostname::get()
                .map_err(|e| ResolutionError::computation(NETWORKING_HOSTNAME, e.to_string()))?
                .into_string()
                .map_err(|_| {
                    ResolutionError::computation(NETWORKING_HOSTNAME, "hostname is not valid UTF-8")
                })?;
            Ok(short_hostname(&name).map(FactValue::from))
        }),
    );
    engine.add_legacy_alias(options, LegacyAlias::new("hostname", NETWORKING_HOSTNAME));
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostfacts_base::probe::SystemCommandExecutor;

    #[test]
    fn test_short_hostname() {
        assert_eq!(short_hostname("web01.example.com"), Some("web01"));
        assert_eq!(short_hostname("web01"), Some("web01"));
        assert_eq!(short_hostname(""), None);
    }

    #[test]
    fn test_legacy_hostname_matches_structured() {
        let options = OptionSnapshot::default();
        let mut engine = FactEngine::new(SystemCommandExecutor::new());
        register(&mut engine, &options);

        let structured = engine.value(&options, NETWORKING_HOSTNAME).unwrap();
        let legacy = engine.value(&options, "hostname").unwrap();
        assert_eq!(structured, legacy);
    }
}
