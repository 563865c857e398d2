//! Probe errors
//!
//! Every variant is an environmental failure: the engine logs it and the
//! affected fact resolves to `None`.

/// Low-level OS access failures (files, commands)
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProbeError {
    #[error("Program not found: {program}")]
    ProgramNotFound { program: String },

    #[error("Execution failed for '{program}': {reason}")]
    ExecutionFailed { program: String, reason: String },

    #[error("Command '{program}' timed out after {timeout_ms}ms")]
    Timeout { program: String, timeout_ms: u64 },

    #[error("Permission denied: {program}")]
    PermissionDenied { program: String },

    #[error("Security violation: {reason}")]
    SecurityViolation { reason: String },

    #[error("Command '{program}' exited with status {exit_code}: {stderr}")]
    NonZeroExit {
        program: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("Failed to read '{path}': {reason}")]
    Io { path: String, reason: String },

    #[error("Failed to parse {source_name}: {reason}")]
    Parse { source_name: String, reason: String },
}

impl ProbeError {
    /// Check if the failure was a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProbeError::Timeout { .. })
    }

    /// Build an I/O error for a path
    pub fn io(path: impl AsRef<std::path::Path>, error: &std::io::Error) -> Self {
        ProbeError::Io {
            path: path.as_ref().display().to_string(),
            reason: error.to_string(),
        }
    }
}
