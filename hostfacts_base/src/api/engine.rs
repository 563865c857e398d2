//! # Fact Engine
//!
//! Registration and query surface over the registry, evaluator and caches.
//! Every call takes the caller's current option snapshot; the engine never
//! keeps one.

use super::config::EngineConfig;
use super::errors::EngineError;
use crate::legacy::LegacyAlias;
use crate::options::OptionSnapshot;
use crate::persistent::PersistentCache;
use crate::probe::{ProbeCache, SystemCommandExecutor};
use crate::resolution::{
    CancellationToken, FactGroups, FactRegistry, MemoTable, Registration, Resolution,
    ResolutionContext,
};
use crate::types::{FactValue, ResolvedFact};
use crate::{log_debug, log_info};
use uuid::Uuid;

pub struct FactEngine {
    registry: FactRegistry,
    groups: FactGroups,
    probes: ProbeCache,
    executor: SystemCommandExecutor,
    persistent: Option<PersistentCache>,
    memo: MemoTable,
    cancel: CancellationToken,
    config: EngineConfig,
    run_id: Uuid,
}

impl FactEngine {
    /// Engine without persistent cache
    pub fn new(executor: SystemCommandExecutor) -> Self {
        Self::with_config(EngineConfig::default(), executor)
    }

    pub fn with_config(config: EngineConfig, mut executor: SystemCommandExecutor) -> Self {
        executor.set_default_timeout(config.command_timeout);

        let persistent = config
            .cache_dir
            .as_ref()
            .filter(|_| !config.ttls.is_empty())
            .map(|dir| PersistentCache::new(dir.clone(), config.ttls.clone()));

        let mut groups = FactGroups::new();
        groups.merge(&config.fact_groups);

        let run_id = Uuid::new_v4();
        let cancel = Self::token_for(&config);

        log_info!("Fact engine created",
            "run_id" => run_id,
            "persistent_cache" => persistent.is_some()
        );

        Self {
            registry: FactRegistry::new(),
            groups,
            probes: ProbeCache::new(),
            executor,
            persistent,
            memo: MemoTable::new(),
            cancel,
            config,
            run_id,
        }
    }

    fn token_for(config: &EngineConfig) -> CancellationToken {
        match config.run_timeout {
            Some(timeout) => CancellationToken::with_timeout(timeout),
            None => CancellationToken::new(),
        }
    }

    /// Install default groups; groups from configuration keep precedence
    pub fn with_default_groups(mut self, defaults: FactGroups) -> Self {
        let mut groups = defaults;
        groups.merge(&self.config.fact_groups);
        self.groups = groups;
        self
    }

    // ========================================================================
    // Registration surface
    // ========================================================================

    pub fn add(
        &mut self,
        options: &OptionSnapshot,
        name: &str,
        resolution: Resolution,
    ) -> Registration {
        self.registry.add(options, &self.groups, name, resolution)
    }

    pub fn add_legacy_alias(&mut self, options: &OptionSnapshot, alias: LegacyAlias) -> Registration {
        self.registry.add_legacy_alias(options, &self.groups, alias)
    }

    // ========================================================================
    // Query surface
    // ========================================================================

    /// Value of a structured or legacy fact
    pub fn value(
        &mut self,
        options: &OptionSnapshot,
        name: &str,
    ) -> Result<Option<FactValue>, EngineError> {
        let mut ctx = self.context(options);
        Ok(ctx.value(name)?)
    }

    /// Value of a fact together with its name and kind
    pub fn resolve(
        &mut self,
        options: &OptionSnapshot,
        name: &str,
    ) -> Result<ResolvedFact, EngineError> {
        let value = self.value(options, name)?;
        if self.registry.legacy_alias(name).is_some() {
            Ok(ResolvedFact::legacy(name, value))
        } else {
            Ok(ResolvedFact::structured(name, value))
        }
    }

    /// Every registered, non-blocked fact selected by the user query, sorted
    /// by name
    ///
    /// Legacy entries appear when explicitly queried, or when the query is
    /// empty and `show_legacy` is on.
    pub fn all(&mut self, options: &OptionSnapshot) -> Result<Vec<ResolvedFact>, EngineError> {
        log_info!("Resolving facts",
            "run_id" => self.run_id,
            "query" => options.user_query.join(",")
        );

        let structured: Vec<String> = self
            .registry
            .fact_names()
            .filter(|name| !self.groups.is_blocked(options, name) && options.is_queried(name))
            .map(str::to_string)
            .collect();

        let legacy: Vec<String> = self
            .registry
            .legacy()
            .names()
            .filter(|name| !self.groups.is_blocked(options, name))
            .filter(|name| {
                options.user_query.iter().any(|query| query.as_str() == *name)
                    || (options.user_query.is_empty() && options.show_legacy)
            })
            .map(str::to_string)
            .collect();

        let mut facts = Vec::with_capacity(structured.len() + legacy.len());
        {
            let mut ctx = self.context(options);
            for name in structured {
                let value = ctx.value(&name)?;
                facts.push(ResolvedFact::structured(name, value));
            }
            for name in legacy {
                let value = ctx.value(&name)?;
                facts.push(ResolvedFact::legacy(name, value));
            }
        }
        facts.sort_by(|a, b| a.name.cmp(&b.name));

        log_info!("Resolved facts",
            "run_id" => self.run_id,
            "count" => facts.len(),
            "evaluations" => self.memo.evaluations()
        );
        Ok(facts)
    }

    fn context<'a>(&'a mut self, options: &'a OptionSnapshot) -> ResolutionContext<'a> {
        ResolutionContext::new(
            &self.registry,
            &self.groups,
            options,
            &self.probes,
            &self.executor,
            &mut self.memo,
            &self.cancel,
        )
        .with_persistent_cache(self.persistent.as_ref())
    }

    // ========================================================================
    // Invalidation and run lifecycle
    // ========================================================================

    /// Forget the memoized value of one fact
    pub fn invalidate(&mut self, name: &str) -> bool {
        log_debug!("Invalidating fact", "fact" => name);
        self.memo.invalidate(name)
    }

    /// Drop cached probe results of one resolver
    pub fn invalidate_probes(&mut self, resolver: &str) -> usize {
        self.probes.invalidate(resolver)
    }

    /// Start a new run: fresh memo table, probe cache, run id and token.
    /// Registrations are kept.
    pub fn new_run(&mut self) -> Uuid {
        self.memo.clear();
        self.probes.invalidate_all();
        self.cancel = Self::token_for(&self.config);
        self.run_id = Uuid::new_v4();
        log_info!("Starting new run", "run_id" => self.run_id);
        self.run_id
    }

    /// Clear every registration and run-scoped cache
    pub fn reset(&mut self) {
        self.registry.reset();
        self.new_run();
    }

    /// Handle that cancels the current run when triggered
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn registry(&self) -> &FactRegistry {
        &self.registry
    }

    pub fn groups(&self) -> &FactGroups {
        &self.groups
    }

    pub fn probe_cache(&self) -> &ProbeCache {
        &self.probes
    }

    pub fn persistent_cache(&self) -> Option<&PersistentCache> {
        self.persistent.as_ref()
    }

    pub fn executor(&self) -> &SystemCommandExecutor {
        &self.executor
    }

    pub fn memo(&self) -> &MemoTable {
        &self.memo
    }
}
