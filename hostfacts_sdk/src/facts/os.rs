//! Operating system facts and the osfamily mapping

use super::kernel::{KERNEL, KERNEL_RELEASE};
use super::linux_only;
use crate::resolvers::OsReleaseResolver;
use hostfacts_base::api::FactEngine;
use hostfacts_base::legacy::LegacyAlias;
use hostfacts_base::options::OptionSnapshot;
use hostfacts_base::resolution::Resolution;
use hostfacts_base::types::FactValue;

pub const OS_NAME: &str = "os.name";
pub const OS_FAMILY: &str = "os.family";
pub const OS_RELEASE_FULL: &str = "os.release.full";
pub const OS_RELEASE_MAJOR: &str = "os.release.major";

/// Canonical operating system name for an os-release `ID`
pub fn os_name_from_id(id: &str) -> String {
    let canonical = match id.to_ascii_lowercase().as_str() {
        "rhel" | "redhat" => "RedHat",
        "centos" => "CentOS",
        "fedora" => "Fedora",
        "scientific" => "Scientific",
        "ol" | "oracle" => "OracleLinux",
        "amzn" => "Amazon",
        "cloudlinux" => "CloudLinux",
        "xenenterprise" => "XenServer",
        "ubuntu" => "Ubuntu",
        "debian" => "Debian",
        "linuxmint" => "LinuxMint",
        "cumulus-linux" => "CumulusLinux",
        "sles" => "SLES",
        "sled" => "SLED",
        "opensuse" | "opensuse-leap" | "opensuse-tumbleweed" => "OpenSuSE",
        "gentoo" => "Gentoo",
        "arch" | "archarm" => "Archlinux",
        "mageia" => "Mageia",
        "mandriva" => "Mandriva",
        _ => return capitalize(id),
    };
    canonical.to_string()
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Family of an operating system name; `None` means "use the kernel"
pub fn os_family(os_name: &str) -> Option<&'static str> {
    let family = match os_name {
        "RedHat" | "Fedora" | "CentOS" | "Scientific" | "SLC" | "Ascendos" | "CloudLinux"
        | "PSBM" | "OracleLinux" | "OVS" | "OEL" | "Amazon" | "XenServer" => "RedHat",
        "LinuxMint" | "Ubuntu" | "Debian" | "CumulusLinux" => "Debian",
        "SLES" | "SLED" | "OpenSuSE" | "SuSE" => "Suse",
        "Solaris" | "Nexenta" | "OmniOS" | "OpenIndiana" | "SmartOS" => "Solaris",
        "Gentoo" => "Gentoo",
        "Archlinux" => "Archlinux",
        "Mageia" | "Mandriva" | "Mandrake" => "Mandrake",
        _ => return None,
    };
    Some(family)
}

/// `15.4` -> `15`
pub fn major_release(full: &str) -> Option<&str> {
    full.split(|c| c == '.' || c == '-')
        .next()
        .filter(|major| !major.is_empty())
}

pub fn register(engine: &mut FactEngine, options: &OptionSnapshot, os_release: &OsReleaseResolver) {
    // Any kernel: the operating system is named after the kernel
    engine.add(
        options,
        OS_NAME,
        Resolution::computed(|ctx| ctx.value(KERNEL)),
    );

    let resolver = os_release.clone();
    engine.add(
        options,
        OS_NAME,
        linux_only(Resolution::computed(move |ctx| {
            Ok(resolver
                .resolve(ctx, "ID")
                .map(|id| FactValue::String(os_name_from_id(&id))))
        })),
    );

    engine.add(
        options,
        OS_FAMILY,
        Resolution::computed(|ctx| {
            let name = ctx.string_value(OS_NAME)?;
            match name.as_deref().and_then(os_family) {
                Some(family) => Ok(Some(family.into())),
                None => ctx.value_or_nil(KERNEL),
            }
        }),
    );

    engine.add(
        options,
        OS_RELEASE_FULL,
        Resolution::computed(|ctx| ctx.value_or_nil(KERNEL_RELEASE)),
    );

    let resolver = os_release.clone();
    engine.add(
        options,
        OS_RELEASE_FULL,
        linux_only(Resolution::computed(move |ctx| {
            Ok(resolver.resolve(ctx, "VERSION_ID").map(FactValue::String))
        })),
    );

    engine.add(
        options,
        OS_RELEASE_MAJOR,
        Resolution::computed(|ctx| {
            Ok(ctx
                .string_value(OS_RELEASE_FULL)?
                .as_deref()
                .and_then(major_release)
                .map(FactValue::from))
        }),
    );

    for (legacy, structured) in [
        ("operatingsystem", OS_NAME),
        ("osfamily", OS_FAMILY),
        ("operatingsystemrelease", OS_RELEASE_FULL),
        ("operatingsystemmajrelease", OS_RELEASE_MAJOR),
    ] {
        engine.add_legacy_alias(options, LegacyAlias::new(legacy, structured));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostfacts_base::probe::SystemCommandExecutor;
    use std::fs;
    use tempfile::TempDir;

    fn engine_with(kernel: &str, os_release: &str) -> (TempDir, FactEngine, OptionSnapshot) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("os-release");
        fs::write(&path, os_release).unwrap();

        let options = OptionSnapshot::default();
        let mut engine = FactEngine::new(SystemCommandExecutor::new());
        engine.add(&options, KERNEL, Resolution::static_value(kernel));
        engine.add(&options, KERNEL_RELEASE, Resolution::static_value("5.14.21-150400.22-default"));
        register(&mut engine, &options, &OsReleaseResolver::new(path));

        (dir, engine, options)
    }

    #[test]
    fn test_family_mapping() {
        assert_eq!(os_family("SLES"), Some("Suse"));
        assert_eq!(os_family("Ubuntu"), Some("Debian"));
        assert_eq!(os_family("Amazon"), Some("RedHat"));
        assert_eq!(os_family("Mageia"), Some("Mandrake"));
        assert_eq!(os_family("Darwin"), None);
    }

    #[test]
    fn test_name_from_id() {
        assert_eq!(os_name_from_id("sles"), "SLES");
        assert_eq!(os_name_from_id("opensuse-leap"), "OpenSuSE");
        assert_eq!(os_name_from_id("rocky"), "Rocky");
    }

    #[test]
    fn test_linux_distribution() {
        let (_dir, mut engine, options) =
            engine_with("Linux", "ID=\"sles\"\nVERSION_ID=\"15.4\"\n");

        assert_eq!(engine.value(&options, OS_NAME).unwrap(), Some("SLES".into()));
        assert_eq!(engine.value(&options, OS_FAMILY).unwrap(), Some("Suse".into()));
        assert_eq!(engine.value(&options, OS_RELEASE_FULL).unwrap(), Some("15.4".into()));
        assert_eq!(engine.value(&options, OS_RELEASE_MAJOR).unwrap(), Some("15".into()));
        assert_eq!(engine.value(&options, "osfamily").unwrap(), Some("Suse".into()));
        assert_eq!(
            engine.value(&options, "operatingsystemmajrelease").unwrap(),
            Some("15".into())
        );
    }

    #[test]
    fn test_unknown_os_family_is_kernel() {
        let (_dir, mut engine, options) = engine_with("Darwin", "ID=sles\n");

        // The linux-only resolution does not apply; the name is the kernel
        assert_eq!(engine.value(&options, OS_NAME).unwrap(), Some("Darwin".into()));
        assert_eq!(engine.value(&options, OS_FAMILY).unwrap(), Some("Darwin".into()));
        assert_eq!(
            engine.value(&options, OS_RELEASE_FULL).unwrap(),
            Some("5.14.21-150400.22-default".into())
        );
    }

    #[test]
    fn test_missing_os_release_is_nil() {
        let options = OptionSnapshot::default();
        let mut engine = FactEngine::new(SystemCommandExecutor::new());
        engine.add(&options, KERNEL, Resolution::static_value("Linux"));
        register(&mut engine, &options, &OsReleaseResolver::new("/nonexistent/os-release"));

        // Selected resolution returns nil; lower priority ones are not tried
        assert_eq!(engine.value(&options, OS_NAME).unwrap(), None);
        assert_eq!(engine.value(&options, OS_FAMILY).unwrap(), Some("Linux".into()));
    }
}
