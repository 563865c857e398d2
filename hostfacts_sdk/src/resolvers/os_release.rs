//! `/etc/os-release` probe

use hostfacts_base::probe::ProbeError;
use hostfacts_base::resolution::ResolutionContext;
use hostfacts_base::types::FactValue;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

pub const OS_RELEASE_RESOLVER: &str = "os_release";
pub const OS_RELEASE_PATH: &str = "/etc/os-release";

fn assignment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*([A-Za-z0-9_]+)=(.*)$").expect("os-release pattern is a valid regex")
    })
}

/// Parse `KEY=value` lines, dropping surrounding quotes
pub fn parse_os_release(content: &str) -> BTreeMap<String, String> {
    content
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .filter_map(|line| assignment_pattern().captures(line))
        .map(|captures| (captures[1].to_string(), unquote(captures[2].trim())))
        .collect()
}

fn unquote(value: &str) -> String {
    let stripped = ['"', '\'']
        .iter()
        .find_map(|quote| {
            value
                .strip_prefix(*quote)
                .and_then(|rest| rest.strip_suffix(*quote))
        })
        .unwrap_or(value);
    stripped.replace("\\\"", "\"").replace("\\$", "$")
}

/// Reads os-release once per run through the probe cache
#[derive(Debug, Clone)]
pub struct OsReleaseResolver {
    path: PathBuf,
}

impl Default for OsReleaseResolver {
    fn default() -> Self {
        Self::new(OS_RELEASE_PATH)
    }
}

impl OsReleaseResolver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Value of an os-release key such as `ID` or `VERSION_ID`
    pub fn resolve(&self, ctx: &ResolutionContext<'_>, key: &str) -> Option<String> {
        let path = &self.path;
        let probe_key = path.display().to_string();

        let fields = ctx
            .probes()
            .resolve(OS_RELEASE_RESOLVER, &probe_key, || {
                let content = fs::read_to_string(path).map_err(|e| ProbeError::io(path, &e))?;
                let map: BTreeMap<String, FactValue> = parse_os_release(&content)
                    .into_iter()
                    .map(|(key, value)| (key, FactValue::String(value)))
                    .collect();
                Ok(Some(FactValue::Map(map)))
            })?;

        fields
            .as_map()?
            .get(key)
            .and_then(FactValue::as_str)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }
}
