//! Resolution errors
//!
//! Only structural errors (cycles, cancellation) leave the evaluator. Every
//! other variant is absorbed: logged and turned into a nil value.

use crate::probe::ProbeError;

#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionError {
    /// Facts that require each other's value before either can complete
    CircularDependency { cycle: Vec<String> },

    /// The run was cancelled while `fact` was being resolved
    Cancelled { fact: String },

    ProbeFailed { fact: String, source: ProbeError },

    Computation { fact: String, reason: String },
}

impl ResolutionError {
    pub fn computation(fact: impl Into<String>, reason: impl Into<String>) -> Self {
        ResolutionError::Computation {
            fact: fact.into(),
            reason: reason.into(),
        }
    }

    pub fn probe(fact: impl Into<String>, source: ProbeError) -> Self {
        ResolutionError::ProbeFailed {
            fact: fact.into(),
            source,
        }
    }

    /// Structural errors propagate to the caller instead of becoming nil
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            ResolutionError::CircularDependency { .. } | ResolutionError::Cancelled { .. }
        )
    }

    pub fn is_cycle(&self) -> bool {
        matches!(self, ResolutionError::CircularDependency { .. })
    }
}

impl std::fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolutionError::CircularDependency { cycle } => {
                write!(f, "Circular dependency detected: {}", cycle.join(" -> "))
            }
            ResolutionError::Cancelled { fact } => {
                write!(f, "Resolution cancelled while resolving '{}'", fact)
            }
            ResolutionError::ProbeFailed { fact, source } => {
                write!(f, "Probe failed for '{}': {}", fact, source)
            }
            ResolutionError::Computation { fact, reason } => {
                write!(f, "Failed to compute '{}': {}", fact, reason)
            }
        }
    }
}

impl std::error::Error for ResolutionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResolutionError::ProbeFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_display() {
        let err = ResolutionError::CircularDependency {
            cycle: vec!["a".to_string(), "b".to_string(), "a".to_string()],
        };
        assert_eq!(err.to_string(), "Circular dependency detected: a -> b -> a");
        assert!(err.is_structural());
        assert!(err.is_cycle());
    }

    #[test]
    fn test_absorbed_errors_are_not_structural() {
        let probe = ResolutionError::probe(
            "kernel",
            ProbeError::ProgramNotFound {
                program: "uname".to_string(),
            },
        );
        assert!(!probe.is_structural());
        assert!(std::error::Error::source(&probe).is_some());

        assert!(!ResolutionError::computation("x", "bad input").is_structural());
        assert!(ResolutionError::Cancelled {
            fact: "x".to_string()
        }
        .is_structural());
    }
}
