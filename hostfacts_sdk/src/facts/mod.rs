//! Representative fact catalog
//!
//! Each module registers the resolutions and legacy aliases of one area.

pub mod kernel;
pub mod memory;
pub mod networking;
pub mod os;
pub mod processors;
pub mod runtime;

use hostfacts_base::resolution::{Confine, Resolution};

/// Restrict a resolution to Linux kernels
pub(crate) fn linux_only(resolution: Resolution) -> Resolution {
    resolution.confine(Confine::equals(kernel::KERNEL, "Linux"))
}
