//! Shared OS probes
//!
//! Each resolver reads its source once per run through the probe cache, so
//! every fact built on it shares one read.

pub mod meminfo;
pub mod os_release;
pub mod uname;

pub use meminfo::{parse_meminfo, LinuxMemoryResolver, MemoryInfo, MemoryKey};
pub use os_release::{parse_os_release, OsReleaseResolver};
pub use uname::{compiled_kernel_name, uname};
