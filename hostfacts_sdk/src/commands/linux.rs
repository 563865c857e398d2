//! Linux command executor configuration
//!
//! Provides the whitelisted command executor used by the fact catalog.

use hostfacts_base::probe::SystemCommandExecutor;
use std::time::Duration;

/// Create command executor configured for fact discovery
///
/// Whitelist includes:
/// - uname: kernel name, release and version
pub fn create_linux_command_executor() -> SystemCommandExecutor {
    let mut executor = SystemCommandExecutor::with_timeout(Duration::from_secs(5));

    executor.allow_commands(&[
        "uname", // Kernel identity
    ]);

    executor
}
