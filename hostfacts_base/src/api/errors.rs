//! # Engine Errors

use crate::options::ConfigError;
use crate::resolution::ResolutionError;

/// Errors surfaced by the fact engine facade
///
/// Environmental failures never reach this type; they resolve to nil. What
/// remains is structural.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl EngineError {
    /// Cyclic fact dependencies indicate a catalog defect
    pub fn is_cycle(&self) -> bool {
        matches!(self, EngineError::Resolution(e) if e.is_cycle())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, EngineError::Resolution(ResolutionError::Cancelled { .. }))
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            EngineError::Resolution(ResolutionError::CircularDependency { cycle }) => format!(
                "Facts depend on each other and cannot be resolved: {}",
                cycle.join(" -> ")
            ),
            EngineError::Resolution(ResolutionError::Cancelled { fact }) => {
                format!("Fact resolution was cancelled while resolving '{}'", fact)
            }
            EngineError::Resolution(e) => format!("Resolution failed: {}", e),
            EngineError::Config(e) => format!("Configuration error: {}", e),
        }
    }
}
