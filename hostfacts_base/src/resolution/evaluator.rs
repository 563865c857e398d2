//! Lazy, memoized fact evaluation with cycle detection
//!
//! A `ResolutionContext` is threaded through every evaluation: confines and
//! computed value sources ask it for other facts' values, and it keeps the
//! memo table and the stack of facts currently being computed.

use super::cancel::CancellationToken;
use super::error::ResolutionError;
use super::groups::FactGroups;
use super::registry::FactRegistry;
use super::resolution::Resolution;
use crate::options::OptionSnapshot;
use crate::persistent::PersistentCache;
use crate::probe::{ProbeCache, SystemCommandExecutor};
use crate::types::FactValue;
use crate::{log_debug, log_warning};
use chrono::Utc;
use std::collections::HashMap;

/// Per-run memo of resolved values (nil included)
#[derive(Debug, Clone, Default)]
pub struct MemoTable {
    values: HashMap<String, Option<FactValue>>,
    evaluations: usize,
}

impl MemoTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Option<FactValue>> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    fn insert(&mut self, name: &str, value: Option<FactValue>) {
        self.values.insert(name.to_string(), value);
    }

    pub fn invalidate(&mut self, name: &str) -> bool {
        self.values.remove(name).is_some()
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.evaluations = 0;
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value sources executed since the last clear
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }
}

/// Everything a resolution may consult while it runs
pub struct ResolutionContext<'a> {
    registry: &'a FactRegistry,
    groups: &'a FactGroups,
    options: &'a OptionSnapshot,
    probes: &'a ProbeCache,
    executor: &'a SystemCommandExecutor,
    persistent: Option<&'a PersistentCache>,
    cancel: &'a CancellationToken,
    memo: &'a mut MemoTable,
    stack: Vec<String>,
}

impl<'a> ResolutionContext<'a> {
    pub fn new(
        registry: &'a FactRegistry,
        groups: &'a FactGroups,
        options: &'a OptionSnapshot,
        probes: &'a ProbeCache,
        executor: &'a SystemCommandExecutor,
        memo: &'a mut MemoTable,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            registry,
            groups,
            options,
            probes,
            executor,
            persistent: None,
            cancel,
            memo,
            stack: Vec::new(),
        }
    }

    /// Attach a persistent cache; ignored when the `cache` option is off
    pub fn with_persistent_cache(mut self, cache: Option<&'a PersistentCache>) -> Self {
        self.persistent = cache.filter(|_| self.options.cache);
        self
    }

    pub fn options(&self) -> &'a OptionSnapshot {
        self.options
    }

    pub fn probes(&self) -> &'a ProbeCache {
        self.probes
    }

    pub fn executor(&self) -> &'a SystemCommandExecutor {
        self.executor
    }

    /// Facts currently being computed, outermost first
    pub fn active(&self) -> &[String] {
        &self.stack
    }

    /// Resolve a fact (structured or legacy name)
    ///
    /// Returns the memoized value when present. Fails with
    /// `CircularDependency` when `name` is already being computed further up
    /// the stack, and with `Cancelled` once the run's token trips.
    pub fn value(&mut self, name: &str) -> Result<Option<FactValue>, ResolutionError> {
        self.cancel.check(name)?;

        if let Some(value) = self.memo.get(name) {
            return Ok(value.clone());
        }

        if let Some(start) = self.stack.iter().position(|active| active == name) {
            let mut cycle: Vec<String> = self.stack[start..].to_vec();
            cycle.push(name.to_string());
            return Err(ResolutionError::CircularDependency { cycle });
        }

        let registry = self.registry;
        if let Some(alias) = registry.legacy_alias(name) {
            let source = self.value(&alias.source)?;
            return Ok(alias.convert(source.as_ref()));
        }

        self.stack.push(name.to_string());
        let result = self.compute(name);
        self.stack.pop();

        let value = result?;
        self.memo.insert(name, value.clone());
        Ok(value)
    }

    /// Value of a fact, for use inside value sources where nil is expected
    pub fn value_or_nil(&mut self, name: &str) -> Result<Option<FactValue>, ResolutionError> {
        match self.value(name) {
            Err(err) if !err.is_structural() => Ok(None),
            other => other,
        }
    }

    /// String value of a fact, if it has one
    pub fn string_value(&mut self, name: &str) -> Result<Option<String>, ResolutionError> {
        Ok(self
            .value_or_nil(name)?
            .map(|value| value.to_match_string()))
    }

    fn compute(&mut self, name: &str) -> Result<Option<FactValue>, ResolutionError> {
        if !self.registry.contains(name) {
            log_debug!("No resolutions registered", "fact" => name);
            return Ok(None);
        }

        let cache_group = self.cache_group(name);
        if let (Some(cache), Some(group)) = (self.persistent, cache_group) {
            if let Some(cached) = cache.fact_value_at(group, name, Utc::now()) {
                log_debug!("Serving fact from persistent cache", "fact" => name, "group" => group);
                return Ok(cached);
            }
        }

        let value = match self.select(name)? {
            Some(resolution) => self.evaluate(name, resolution)?,
            None => {
                log_debug!("No applicable resolution", "fact" => name);
                None
            }
        };

        // Nothing computed under cancellation reaches the memo or the disk
        self.cancel.check(name)?;

        if let (Some(cache), Some(group)) = (self.persistent, cache_group) {
            cache.store(group, name, value.clone());
        }

        Ok(value)
    }

    /// Group under which `name` is persisted, if it is cacheable
    fn cache_group(&self, name: &str) -> Option<&'a str> {
        let cache = self.persistent?;
        self.groups
            .group_of(name)
            .filter(|group| cache.is_cached_group(group))
    }

    /// First applicable resolution in priority order
    fn select(&mut self, name: &str) -> Result<Option<&'a Resolution>, ResolutionError> {
        let registry = self.registry;
        for resolution in registry.candidates(name) {
            if resolution.is_applicable(self)? {
                return Ok(Some(resolution));
            }
        }
        Ok(None)
    }

    fn evaluate(
        &mut self,
        name: &str,
        resolution: &Resolution,
    ) -> Result<Option<FactValue>, ResolutionError> {
        self.memo.evaluations += 1;

        match resolution.source.evaluate(self, name) {
            Ok(value) => Ok(value),
            Err(err) if err.is_structural() => Err(err),
            Err(err) => {
                log_warning!("Resolution failed, value will be nil",
                    "fact" => name,
                    "error" => err
                );
                Ok(None)
            }
        }
    }
}
