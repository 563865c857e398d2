//! # hostfacts CLI
//!

use clap::Parser;
use hostfacts_base::api::EngineConfig;
use hostfacts_base::logging::parse_log_level;
use hostfacts_base::options::runtime::DEFAULT_CONFIG_FILE;
use hostfacts_base::options::{OptionChange, OptionStore, RuntimeConfig};
use hostfacts_base::types::{FactValue, ResolvedFact};
use hostfacts_base::{log_error, log_info};
use hostfacts_sdk::create_fact_engine;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

/// Discover and report facts about this host
#[derive(Parser, Debug)]
#[command(name = "hostfacts", version)]
struct Cli {
    /// Facts to report; a dotted name also selects its descendants
    #[arg(value_name = "QUERY")]
    query: Vec<String>,

    /// Print facts as JSON
    #[arg(short, long)]
    json: bool,

    /// Include legacy facts
    #[arg(long, conflicts_with = "hide_legacy")]
    show_legacy: bool,

    /// Omit legacy facts
    #[arg(long)]
    hide_legacy: bool,

    /// Neither read nor write the persistent cache
    #[arg(long)]
    no_cache: bool,

    /// Fact or fact group to block (repeatable)
    #[arg(long = "blocklist", value_name = "FACT")]
    blocklist: Vec<String>,

    /// Configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Persistent cache directory
    #[arg(long, value_name = "DIR")]
    cache_dir: Option<PathBuf>,

    #[arg(short, long)]
    debug: bool,

    #[arg(long)]
    verbose: bool,

    #[arg(long)]
    trace: bool,

    /// error, warn, info, debug or trace
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

impl Cli {
    /// Option changes from the command line, applied after the config file
    fn option_changes(&self) -> Result<Vec<OptionChange>, String> {
        let mut changes = vec![
            OptionChange::Config(self.config.clone()),
            OptionChange::UserQuery(self.query.clone()),
            OptionChange::BlockedFacts(self.blocklist.clone()),
        ];

        if self.show_legacy {
            changes.push(OptionChange::ShowLegacy(true));
        }
        if self.hide_legacy {
            changes.push(OptionChange::ShowLegacy(false));
        }
        if self.no_cache {
            changes.push(OptionChange::Cache(false));
        }
        if let Some(raw) = &self.log_level {
            let level = parse_log_level(raw).ok_or_else(|| format!("invalid log level '{}'", raw))?;
            changes.push(OptionChange::LogLevel(level));
        }
        if self.verbose {
            changes.push(OptionChange::Verbose(true));
        }
        if self.debug {
            changes.push(OptionChange::Debug(true));
        }
        if self.trace {
            changes.push(OptionChange::Trace(true));
        }

        Ok(changes)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let runtime = match RuntimeConfig::load(&config_path) {
        Ok(runtime) => runtime.with_env_overrides(),
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };

    let changes = match cli.option_changes() {
        Ok(changes) => changes,
        Err(message) => {
            eprintln!("Error: {}", message);
            return ExitCode::from(2);
        }
    };
    let store = runtime.apply_to(OptionStore::new()).apply_all(changes);

    init_logging(&store);
    log_info!("hostfacts starting", "config" => config_path.display());

    let mut engine_config = EngineConfig::from_runtime(&runtime);
    if let Some(dir) = &cli.cache_dir {
        engine_config = engine_config.with_cache_dir(dir);
    }

    let options = store.snapshot();
    let mut engine = create_fact_engine(engine_config, &options);

    let facts = match engine.all(&options) {
        Ok(facts) => facts,
        Err(e) => {
            log_error!("Fact resolution failed", "error" => &e);
            eprintln!("Error: {}", e.user_message());
            return ExitCode::from(1);
        }
    };

    if cli.json {
        match render_json(&facts) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: failed to render JSON: {}", e);
                return ExitCode::from(1);
            }
        }
    } else if cli.query.len() == 1 && facts.len() == 1 {
        // A single queried fact prints just its value
        println!(
            "{}",
            facts[0].value.as_ref().map(ToString::to_string).unwrap_or_default()
        );
    } else {
        for fact in &facts {
            println!("{}", fact);
        }
    }

    ExitCode::SUCCESS
}

/// `RUST_LOG` directives take precedence over the configured level
fn init_logging(store: &OptionStore) {
    env_logger::Builder::new()
        .filter_level(store.log_level.to_level_filter())
        .parse_default_env()
        .format_timestamp_secs()
        .init();
}

fn render_json(facts: &[ResolvedFact]) -> Result<String, serde_json::Error> {
    let map: BTreeMap<&str, Option<&FactValue>> = facts
        .iter()
        .map(|fact| (fact.name.as_str(), fact.value.as_ref()))
        .collect();
    serde_json::to_string_pretty(&map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_changes() {
        let cli = Cli::parse_from([
            "hostfacts",
            "--hide-legacy",
            "--no-cache",
            "--blocklist",
            "memory",
            "--blocklist",
            "kernel",
            "--debug",
            "os.family",
        ]);

        let store = OptionStore::new().apply_all(cli.option_changes().unwrap());

        assert!(!store.show_legacy);
        assert!(!store.cache);
        assert_eq!(store.blocked_facts, vec!["memory", "kernel"]);
        assert_eq!(store.user_query, vec!["os.family"]);
        assert_eq!(store.log_level, hostfacts_base::logging::LogLevel::Debug);
    }

    #[test]
    fn test_invalid_log_level() {
        let cli = Cli::parse_from(["hostfacts", "--log-level", "loud"]);
        assert!(cli.option_changes().is_err());
    }

    #[test]
    fn test_show_and_hide_legacy_conflict() {
        assert!(Cli::try_parse_from(["hostfacts", "--show-legacy", "--hide-legacy"]).is_err());
    }

    #[test]
    fn test_render_json() {
        let facts = vec![
            ResolvedFact::structured("kernel", Some("Linux".into())),
            ResolvedFact::legacy("memorysize_mb", None),
        ];

        let json: serde_json::Value = serde_json::from_str(&render_json(&facts).unwrap()).unwrap();

        assert_eq!(json["kernel"], "Linux");
        assert!(json["memorysize_mb"].is_null());
    }
}
