//! Candidate implementations of a fact

use super::confine::Confine;
use super::error::ResolutionError;
use super::evaluator::ResolutionContext;
use crate::probe::{command_key, command_line};
use crate::types::FactValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Probe-cache resolver identity shared by every command value source
pub const COMMAND_RESOLVER: &str = "command";

/// Where a resolution was defined; gates registration through the options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactSource {
    /// Built into the catalog
    Core,
    /// Defined in-process by the embedding program
    Local,
    /// User supplied in-process definitions
    Custom,
    /// Loaded from outside the process
    External,
}

impl FactSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FactSource::Core => "core",
            FactSource::Local => "local",
            FactSource::Custom => "custom",
            FactSource::External => "external",
        }
    }
}

pub type ComputeFn = Arc<
    dyn Fn(&mut ResolutionContext<'_>) -> Result<Option<FactValue>, ResolutionError> + Send + Sync,
>;

/// How a selected resolution produces its value
#[derive(Clone)]
pub enum ValueSource {
    Static(Option<FactValue>),
    Computed(ComputeFn),
    /// Trimmed stdout of a whitelisted command; empty output is nil
    Command { program: String, args: Vec<String> },
}

impl ValueSource {
    /// Evaluate within the current resolution context
    pub fn evaluate(
        &self,
        ctx: &mut ResolutionContext<'_>,
        fact: &str,
    ) -> Result<Option<FactValue>, ResolutionError> {
        match self {
            ValueSource::Static(value) => Ok(value.clone()),
            ValueSource::Computed(compute) => compute(ctx),
            ValueSource::Command { program, args } => {
                let args: Vec<&str> = args.iter().map(String::as_str).collect();
                let key = command_key(program, &args);
                let executor = ctx.executor();

                crate::log_debug!("Evaluating command source",
                    "fact" => fact,
                    "command" => command_line(program, &args)
                );

                Ok(ctx.probes().resolve(COMMAND_RESOLVER, &key, || {
                    executor
                        .execute_checked(program, &args, None)
                        .map(|stdout| (!stdout.is_empty()).then(|| FactValue::String(stdout)))
                }))
            }
        }
    }
}

impl fmt::Debug for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSource::Static(value) => f.debug_tuple("Static").field(value).finish(),
            ValueSource::Computed(_) => f.write_str("Computed(<fn>)"),
            ValueSource::Command { program, args } => f
                .debug_struct("Command")
                .field("program", program)
                .field("args", args)
                .finish(),
        }
    }
}

/// One candidate implementation of a fact, guarded by confines
#[derive(Debug, Clone)]
pub struct Resolution {
    pub confines: Vec<Confine>,
    pub weight: Option<usize>,
    pub source: ValueSource,
    pub fact_source: FactSource,
}

impl Resolution {
    pub fn new(source: ValueSource) -> Self {
        Self {
            confines: Vec::new(),
            weight: None,
            source,
            fact_source: FactSource::Core,
        }
    }

    pub fn static_value(value: impl Into<FactValue>) -> Self {
        Self::new(ValueSource::Static(Some(value.into())))
    }

    pub fn nil() -> Self {
        Self::new(ValueSource::Static(None))
    }

    pub fn computed<F>(compute: F) -> Self
    where
        F: Fn(&mut ResolutionContext<'_>) -> Result<Option<FactValue>, ResolutionError>
            + Send
            + Sync
            + 'static,
    {
        Self::new(ValueSource::Computed(Arc::new(compute)))
    }

    pub fn command(program: impl Into<String>, args: &[&str]) -> Self {
        Self::new(ValueSource::Command {
            program: program.into(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
        })
    }

    pub fn confine(mut self, confine: Confine) -> Self {
        self.confines.push(confine);
        self
    }

    pub fn with_weight(mut self, weight: usize) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn from_source(mut self, fact_source: FactSource) -> Self {
        self.fact_source = fact_source;
        self
    }

    /// Explicit weight, else the number of confines
    pub fn specificity(&self) -> usize {
        self.weight.unwrap_or(self.confines.len())
    }

    /// Applicable iff every confine matches
    pub fn is_applicable(&self, ctx: &mut ResolutionContext<'_>) -> Result<bool, ResolutionError> {
        for confine in &self.confines {
            if !confine.evaluate(ctx)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specificity() {
        assert_eq!(Resolution::nil().specificity(), 0);

        let confined = Resolution::static_value("x")
            .confine(Confine::equals("kernel", "Linux"))
            .confine(Confine::equals("os.family", "Debian"));
        assert_eq!(confined.specificity(), 2);
        assert_eq!(confined.with_weight(100).specificity(), 100);
    }

    #[test]
    fn test_builder_defaults() {
        let resolution = Resolution::command("uname", &["-s"]);
        assert_eq!(resolution.fact_source, FactSource::Core);
        assert!(resolution.confines.is_empty());
        assert_eq!(
            format!("{:?}", resolution.source),
            r#"Command { program: "uname", args: ["-s"] }"#
        );
        assert_eq!(
            Resolution::nil().from_source(FactSource::External).fact_source,
            FactSource::External
        );
    }
}
