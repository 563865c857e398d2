//! Applicability predicates over other facts' values

use super::error::ResolutionError;
use super::evaluator::ResolutionContext;
use crate::log_debug;
use crate::types::FactValue;
use std::fmt;
use std::sync::Arc;

pub type PredicateFn = Arc<dyn Fn(Option<&FactValue>) -> bool + Send + Sync>;

/// How a dependency value is tested
#[derive(Clone)]
pub enum Matcher {
    /// Case-insensitive equality with a literal
    Equals(FactValue),
    /// Equality with any literal of the set
    OneOf(Vec<FactValue>),
    /// Arbitrary test; receives `None` when the dependency is nil
    Predicate(PredicateFn),
}

impl Matcher {
    pub fn matches(&self, value: Option<&FactValue>) -> bool {
        match self {
            Matcher::Equals(literal) => value.map_or(false, |v| v.matches_literal(literal)),
            Matcher::OneOf(literals) => value.map_or(false, |v| {
                literals.iter().any(|literal| v.matches_literal(literal))
            }),
            Matcher::Predicate(predicate) => predicate(value),
        }
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Equals(literal) => f.debug_tuple("Equals").field(literal).finish(),
            Matcher::OneOf(literals) => f.debug_tuple("OneOf").field(literals).finish(),
            Matcher::Predicate(_) => f.write_str("Predicate(<fn>)"),
        }
    }
}

/// `(dependency fact, matcher)` pair restricting a resolution
#[derive(Debug, Clone)]
pub struct Confine {
    pub fact: String,
    pub matcher: Matcher,
}

impl Confine {
    pub fn equals(fact: impl Into<String>, literal: impl Into<FactValue>) -> Self {
        Self {
            fact: fact.into(),
            matcher: Matcher::Equals(literal.into()),
        }
    }

    pub fn one_of<V: Into<FactValue>>(
        fact: impl Into<String>,
        literals: impl IntoIterator<Item = V>,
    ) -> Self {
        Self {
            fact: fact.into(),
            matcher: Matcher::OneOf(literals.into_iter().map(Into::into).collect()),
        }
    }

    pub fn predicate<F>(fact: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(Option<&FactValue>) -> bool + Send + Sync + 'static,
    {
        Self {
            fact: fact.into(),
            matcher: Matcher::Predicate(Arc::new(predicate)),
        }
    }

    /// Resolve the dependency and test it
    ///
    /// Structural errors propagate; anything else counts as a non-match.
    pub fn evaluate(&self, ctx: &mut ResolutionContext<'_>) -> Result<bool, ResolutionError> {
        match ctx.value(&self.fact) {
            Ok(value) => Ok(self.matcher.matches(value.as_ref())),
            Err(err) if err.is_structural() => Err(err),
            Err(err) => {
                log_debug!("Confine evaluation failed, treating as non-match",
                    "dependency" => &self.fact,
                    "error" => err
                );
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equals_is_case_insensitive() {
        let matcher = Matcher::Equals("linux".into());
        assert!(matcher.matches(Some(&"Linux".into())));
        assert!(!matcher.matches(Some(&"Darwin".into())));
        assert!(!matcher.matches(None));
    }

    #[test]
    fn test_one_of() {
        let confine = Confine::one_of("os.name", ["SLES", "SLED", "OpenSuSE"]);
        assert!(confine.matcher.matches(Some(&"sles".into())));
        assert!(!confine.matcher.matches(Some(&"Debian".into())));
    }

    #[test]
    fn test_non_string_literals_compare_by_rendering() {
        let matcher = Matcher::Equals(FactValue::Boolean(true));
        assert!(matcher.matches(Some(&"TRUE".into())));

        let matcher = Matcher::Equals(FactValue::Integer(8));
        assert!(matcher.matches(Some(&FactValue::Integer(8))));
        assert!(matcher.matches(Some(&"8".into())));
    }

    #[test]
    fn test_predicate_sees_nil() {
        let confine = Confine::predicate("virtual", |value| value.is_none());
        assert!(confine.matcher.matches(None));
        assert!(!confine.matcher.matches(Some(&"kvm".into())));
        assert_eq!(format!("{:?}", confine.matcher), "Predicate(<fn>)");
    }
}
