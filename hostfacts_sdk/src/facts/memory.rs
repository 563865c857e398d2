//! Memory facts backed by one shared meminfo probe

use super::linux_only;
use crate::resolvers::{LinuxMemoryResolver, MemoryKey};
use hostfacts_base::api::FactEngine;
use hostfacts_base::legacy::{percentage, LegacyAlias, UnitConversion};
use hostfacts_base::options::OptionSnapshot;
use hostfacts_base::resolution::{Resolution, ResolutionContext, ResolutionError};
use hostfacts_base::types::FactValue;

/// Facts for one memory kind (`system` or `swap`)
struct MemoryFacts {
    prefix: &'static str,
    total_key: MemoryKey,
    available_key: MemoryKey,
}

const SYSTEM: MemoryFacts = MemoryFacts {
    prefix: "memory.system",
    total_key: MemoryKey::Total,
    available_key: MemoryKey::Available,
};

const SWAP: MemoryFacts = MemoryFacts {
    prefix: "memory.swap",
    total_key: MemoryKey::SwapTotal,
    available_key: MemoryKey::SwapFree,
};

fn bytes_of(ctx: &mut ResolutionContext<'_>, fact: &str) -> Result<Option<u64>, ResolutionError> {
    Ok(ctx
        .value_or_nil(fact)?
        .and_then(|value| value.as_integer())
        .and_then(|bytes| u64::try_from(bytes).ok()))
}

impl MemoryFacts {
    fn name(&self, suffix: &str) -> String {
        format!("{}.{}", self.prefix, suffix)
    }

    fn register(
        &self,
        engine: &mut FactEngine,
        options: &OptionSnapshot,
        resolver: &LinuxMemoryResolver,
    ) {
        let total_bytes = self.name("total_bytes");
        let available_bytes = self.name("available_bytes");
        let used_bytes = self.name("used_bytes");

        for (fact, key) in [
            (&total_bytes, self.total_key),
            (&available_bytes, self.available_key),
        ] {
            let resolver = resolver.clone();
            engine.add(
                options,
                fact,
                linux_only(Resolution::computed(move |ctx| {
                    Ok(resolver.resolve(ctx, key).map(FactValue::from))
                })),
            );
        }

        let (total, available) = (total_bytes.clone(), available_bytes.clone());
        engine.add(
            options,
            &used_bytes,
            linux_only(Resolution::computed(move |ctx| {
                let total = bytes_of(ctx, &total)?;
                let available = bytes_of(ctx, &available)?;
                Ok(total
                    .zip(available)
                    .map(|(total, available)| FactValue::from(total.saturating_sub(available))))
            })),
        );

        for (fact, source) in [
            (self.name("total"), total_bytes.clone()),
            (self.name("available"), available_bytes),
            (self.name("used"), used_bytes.clone()),
        ] {
            engine.add(
                options,
                &fact,
                linux_only(Resolution::computed(move |ctx| {
                    Ok(ctx
                        .value_or_nil(&source)?
                        .and_then(|bytes| UnitConversion::BytesToHumanReadable.apply(&bytes)))
                })),
            );
        }

        engine.add(
            options,
            &self.name("capacity"),
            linux_only(Resolution::computed(move |ctx| {
                let used = bytes_of(ctx, &used_bytes)?;
                let total = bytes_of(ctx, &total_bytes)?;
                Ok(used
                    .zip(total)
                    .and_then(|(used, total)| percentage(used, total))
                    .map(FactValue::String))
            })),
        );
    }
}

pub fn register(engine: &mut FactEngine, options: &OptionSnapshot, resolver: &LinuxMemoryResolver) {
    SYSTEM.register(engine, options, resolver);
    SWAP.register(engine, options, resolver);

    for (legacy, structured, conversion) in [
        ("memorysize_mb", "memory.system.total_bytes", UnitConversion::BytesToMegabytes),
        ("memoryfree_mb", "memory.system.available_bytes", UnitConversion::BytesToMegabytes),
        ("memorysize", "memory.system.total_bytes", UnitConversion::BytesToHumanReadable),
        ("memoryfree", "memory.system.available_bytes", UnitConversion::BytesToHumanReadable),
        ("swapsize_mb", "memory.swap.total_bytes", UnitConversion::BytesToMegabytes),
        ("swapfree_mb", "memory.swap.available_bytes", UnitConversion::BytesToMegabytes),
        ("swapsize", "memory.swap.total_bytes", UnitConversion::BytesToHumanReadable),
        ("swapfree", "memory.swap.available_bytes", UnitConversion::BytesToHumanReadable),
    ] {
        engine.add_legacy_alias(
            options,
            LegacyAlias::new(legacy, structured).with_conversion(conversion),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::kernel::KERNEL;
    use hostfacts_base::probe::SystemCommandExecutor;
    use hostfacts_base::types::{FactKind, ResolvedFact};
    use std::fs;
    use tempfile::TempDir;

    const MEMINFO: &str = "\
MemTotal:        3253468 kB
MemFree:          212116 kB
MemAvailable:    1626734 kB
SwapTotal:       2097148 kB
SwapFree:        1048574 kB
";

    fn engine_with(meminfo: Option<&str>) -> (TempDir, FactEngine, OptionSnapshot) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("meminfo");
        if let Some(content) = meminfo {
            fs::write(&path, content).unwrap();
        }

        let options = OptionSnapshot::default();
        let mut engine = FactEngine::new(SystemCommandExecutor::new());
        engine.add(&options, KERNEL, Resolution::static_value("Linux"));
        register(&mut engine, &options, &LinuxMemoryResolver::new(path));
        (dir, engine, options)
    }

    #[test]
    fn test_total_bytes_and_legacy_mb() {
        let (_dir, mut engine, options) = engine_with(Some(MEMINFO));

        assert_eq!(
            engine.resolve(&options, "memory.system.total_bytes").unwrap(),
            ResolvedFact::structured("memory.system.total_bytes", Some(FactValue::Integer(3_331_551_232)))
        );
        assert_eq!(
            engine.resolve(&options, "memorysize_mb").unwrap(),
            ResolvedFact::legacy("memorysize_mb", Some(FactValue::Float(3177.21)))
        );
        assert_eq!(
            engine.value(&options, "memorysize").unwrap(),
            Some("3.10 GiB".into())
        );
    }

    #[test]
    fn test_derived_facts() {
        let (_dir, mut engine, options) = engine_with(Some(MEMINFO));

        let used = (3_253_468 - 1_626_734) * 1024;
        assert_eq!(
            engine.value(&options, "memory.system.used_bytes").unwrap(),
            Some(FactValue::Integer(used))
        );
        assert_eq!(
            engine.value(&options, "memory.system.capacity").unwrap(),
            Some("50.00%".into())
        );
        assert_eq!(
            engine.value(&options, "memory.swap.capacity").unwrap(),
            Some("50.00%".into())
        );
        assert_eq!(
            engine.value(&options, "memory.swap.total").unwrap(),
            Some("2.00 GiB".into())
        );
    }

    #[test]
    fn test_meminfo_is_read_once() {
        let (_dir, mut engine, options) = engine_with(Some(MEMINFO));

        let facts = engine.all(&options).unwrap();

        assert!(facts.len() > 20);
        assert_eq!(engine.probe_cache().stats().executions, 1);
    }

    #[test]
    fn test_missing_meminfo_yields_nil_everywhere() {
        let (_dir, mut engine, options) = engine_with(None);

        let facts = engine.all(&options).unwrap();
        let memory: Vec<_> = facts.iter().filter(|f| f.name != KERNEL).collect();

        assert!(memory.iter().all(|f| f.value.is_none()));
        assert!(memory
            .iter()
            .any(|f| f.name == "memorysize_mb" && f.kind == FactKind::Legacy));
    }

    #[test]
    fn test_not_linux_is_nil() {
        let (_dir, mut engine, options) = engine_with(Some(MEMINFO));
        engine.add(&options, KERNEL, Resolution::static_value("Darwin"));

        assert_eq!(engine.value(&options, "memory.system.total_bytes").unwrap(), None);
        assert_eq!(engine.probe_cache().stats().executions, 0);
    }
}
