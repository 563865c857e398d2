//! Command execution configurations for fact discovery
//!
//! Provides whitelisted command executors for probing the host.

pub mod linux;

pub use linux::create_linux_command_executor;
