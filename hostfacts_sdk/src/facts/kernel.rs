//! Kernel facts

use crate::resolvers::{compiled_kernel_name, uname};
use hostfacts_base::api::FactEngine;
use hostfacts_base::options::OptionSnapshot;
use hostfacts_base::resolution::Resolution;
use hostfacts_base::types::FactValue;

pub const KERNEL: &str = "kernel";
pub const KERNEL_RELEASE: &str = "kernelrelease";
pub const KERNEL_VERSION: &str = "kernelversion";
pub const KERNEL_MAJOR_VERSION: &str = "kernelmajversion";

/// `5.14.0-284.el9.x86_64` -> `5.14.0`
pub fn version_from_release(release: &str) -> Option<&str> {
    release.split('-').next().filter(|version| !version.is_empty())
}

/// `5.14.0` -> `5.14`
pub fn major_version(version: &str) -> String {
    version.split('.').take(2).collect::<Vec<_>>().join(".")
}

pub fn register(engine: &mut FactEngine, options: &OptionSnapshot) {
    engine.add(
        options,
        KERNEL,
        Resolution::computed(|ctx| {
            let name = uname(ctx, "-s").unwrap_or_else(|| compiled_kernel_name().to_string());
            Ok(Some(FactValue::String(name)))
        }),
    );

    engine.add(
        options,
        KERNEL_RELEASE,
        Resolution::computed(|ctx| Ok(uname(ctx, "-r").map(FactValue::String))),
    );

    engine.add(
        options,
        KERNEL_VERSION,
        Resolution::computed(|ctx| {
            Ok(ctx
                .string_value(KERNEL_RELEASE)?
                .as_deref()
                .and_then(version_from_release)
                .map(FactValue::from))
        }),
    );

    engine.add(
        options,
        KERNEL_MAJOR_VERSION,
        Resolution::computed(|ctx| {
            Ok(ctx
                .string_value(KERNEL_VERSION)?
                .map(|version| FactValue::String(major_version(&version))))
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostfacts_base::probe::SystemCommandExecutor;

    #[test]
    fn test_version_parsing() {
        assert_eq!(version_from_release("5.14.0-284.el9.x86_64"), Some("5.14.0"));
        assert_eq!(version_from_release("22.1.0"), Some("22.1.0"));
        assert_eq!(version_from_release(""), None);
        assert_eq!(major_version("5.14.0"), "5.14");
        assert_eq!(major_version("6"), "6");
    }

    #[test]
    fn test_derived_versions_follow_release() {
        let options = OptionSnapshot::default();
        let mut engine = FactEngine::new(SystemCommandExecutor::new());
        register(&mut engine, &options);
        // Weighted override wins over the uname resolution
        engine.add(
            &options,
            KERNEL_RELEASE,
            Resolution::static_value("4.12.14-150.82-default").with_weight(10),
        );

        assert_eq!(
            engine.value(&options, KERNEL_VERSION).unwrap(),
            Some("4.12.14".into())
        );
        assert_eq!(
            engine.value(&options, KERNEL_MAJOR_VERSION).unwrap(),
            Some("4.12".into())
        );
    }

    #[test]
    fn test_kernel_falls_back_without_uname() {
        let options = OptionSnapshot::default();
        // No whitelist: uname cannot run
        let mut engine = FactEngine::new(SystemCommandExecutor::new());
        register(&mut engine, &options);

        assert_eq!(
            engine.value(&options, KERNEL).unwrap(),
            Some(compiled_kernel_name().into())
        );
        assert_eq!(engine.value(&options, KERNEL_RELEASE).unwrap(), None);
        assert_eq!(engine.value(&options, KERNEL_VERSION).unwrap(), None);
    }
}
