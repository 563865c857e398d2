//! `uname` probe, one execution per flag per run

use hostfacts_base::resolution::ResolutionContext;
use hostfacts_base::types::FactValue;

pub const UNAME_RESOLVER: &str = "uname";

/// Output of `uname <flag>`, or `None` when the command fails
pub fn uname(ctx: &ResolutionContext<'_>, flag: &str) -> Option<String> {
    let executor = ctx.executor();

    ctx.probes()
        .resolve(UNAME_RESOLVER, flag, || {
            executor
                .execute_checked("uname", &[flag], None)
                .map(|stdout| (!stdout.is_empty()).then(|| FactValue::String(stdout)))
        })
        .and_then(|value| value.as_str().map(str::to_string))
}

/// Kernel name for the platform this binary was built for
pub fn compiled_kernel_name() -> &'static str {
    match std::env::consts::OS {
        "linux" | "android" => "Linux",
        "macos" | "ios" => "Darwin",
        "freebsd" => "FreeBSD",
        "openbsd" => "OpenBSD",
        "netbsd" => "NetBSD",
        "dragonfly" => "DragonFly",
        "solaris" | "illumos" => "SunOS",
        "windows" => "windows",
        other => other,
    }
}
