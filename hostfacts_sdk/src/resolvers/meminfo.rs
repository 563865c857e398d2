//! `/proc/meminfo` probe shared by every memory fact

use hostfacts_base::probe::ProbeError;
use hostfacts_base::resolution::ResolutionContext;
use hostfacts_base::types::FactValue;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

pub const LINUX_MEMORY_RESOLVER: &str = "linux_memory";
pub const MEMINFO_PATH: &str = "/proc/meminfo";

/// Values the memory probe exposes, in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryKey {
    Total,
    Available,
    Free,
    SwapTotal,
    SwapFree,
}

impl MemoryKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryKey::Total => "total",
            MemoryKey::Available => "available",
            MemoryKey::Free => "free",
            MemoryKey::SwapTotal => "swap_total",
            MemoryKey::SwapFree => "swap_free",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryInfo {
    pub total: Option<u64>,
    pub available: Option<u64>,
    pub free: Option<u64>,
    pub swap_total: Option<u64>,
    pub swap_free: Option<u64>,
}

impl MemoryInfo {
    pub fn get(&self, key: MemoryKey) -> Option<u64> {
        match key {
            MemoryKey::Total => self.total,
            MemoryKey::Available => self.available,
            MemoryKey::Free => self.free,
            MemoryKey::SwapTotal => self.swap_total,
            MemoryKey::SwapFree => self.swap_free,
        }
    }

    fn to_fact_value(&self) -> FactValue {
        let keys = [
            MemoryKey::Total,
            MemoryKey::Available,
            MemoryKey::Free,
            MemoryKey::SwapTotal,
            MemoryKey::SwapFree,
        ];
        let map: BTreeMap<String, FactValue> = keys
            .iter()
            .filter_map(|key| self.get(*key).map(|bytes| (key.as_str().to_string(), bytes.into())))
            .collect();
        FactValue::Map(map)
    }
}

/// Parse `/proc/meminfo` content; sizes are reported in kB
///
/// Kernels without `MemAvailable` get `MemFree + Buffers + Cached`.
pub fn parse_meminfo(content: &str) -> MemoryInfo {
    let mut fields: BTreeMap<&str, u64> = BTreeMap::new();

    for line in content.lines() {
        let Some((name, rest)) = line.split_once(':') else {
            continue;
        };
        let mut parts = rest.split_whitespace();
        let Some(amount) = parts.next().and_then(|v| v.parse::<u64>().ok()) else {
            continue;
        };
        let bytes = match parts.next() {
            Some(unit) if unit.eq_ignore_ascii_case("kb") => amount.saturating_mul(1024),
            _ => amount,
        };
        fields.insert(name.trim(), bytes);
    }

    let free = fields.get("MemFree").copied();
    let available = fields.get("MemAvailable").copied().or_else(|| {
        free.map(|free| {
            free.saturating_add(fields.get("Buffers").copied().unwrap_or(0))
                .saturating_add(fields.get("Cached").copied().unwrap_or(0))
        })
    });

    MemoryInfo {
        total: fields.get("MemTotal").copied(),
        available,
        free,
        swap_total: fields.get("SwapTotal").copied(),
        swap_free: fields.get("SwapFree").copied(),
    }
}

/// Reads memory statistics once per run through the probe cache
#[derive(Debug, Clone)]
pub struct LinuxMemoryResolver {
    path: PathBuf,
}

impl Default for LinuxMemoryResolver {
    fn default() -> Self {
        Self::new(MEMINFO_PATH)
    }
}

impl LinuxMemoryResolver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn resolve(&self, ctx: &ResolutionContext<'_>, key: MemoryKey) -> Option<u64> {
        let path = &self.path;
        let probe_key = path.display().to_string();

        let info = ctx
            .probes()
            .resolve(LINUX_MEMORY_RESOLVER, &probe_key, || {
                let content = fs::read_to_string(path).map_err(|e| ProbeError::io(path, &e))?;
                let info = parse_meminfo(&content);
                if info.total.is_none() {
                    return Err(ProbeError::Parse {
                        source_name: probe_key.clone(),
                        reason: "MemTotal not found".to_string(),
                    });
                }
                Ok(Some(info.to_fact_value()))
            })?;

        info.get_path(key.as_str())?
            .as_integer()
            .and_then(|bytes| u64::try_from(bytes).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
MemTotal:        3253468 kB
MemFree:          212116 kB
MemAvailable:    1626640 kB
Buffers:          100000 kB
Cached:          1200000 kB
SwapTotal:       2097148 kB
SwapFree:        2097148 kB
HugePages_Total:       0
";

    #[test]
    fn test_parse_meminfo() {
        let info = parse_meminfo(SAMPLE);

        assert_eq!(info.total, Some(3_331_551_232));
        assert_eq!(info.available, Some(1_626_640 * 1024));
        assert_eq!(info.free, Some(212_116 * 1024));
        assert_eq!(info.swap_total, Some(2_097_148 * 1024));
        assert_eq!(info.swap_free, info.swap_total);
    }

    #[test]
    fn test_available_fallback() {
        let info = parse_meminfo("MemTotal: 1000 kB\nMemFree: 100 kB\nBuffers: 10 kB\nCached: 20 kB\n");
        assert_eq!(info.available, Some(130 * 1024));
    }

    #[test]
    fn test_available_fallback_saturates() {
        let content = format!(
            "MemTotal: {max} kB\nMemFree: {max} kB\nBuffers: {max} kB\nCached: 1 kB\n",
            max = u64::MAX
        );
        let info = parse_meminfo(&content);
        assert_eq!(info.free, Some(u64::MAX));
        assert_eq!(info.available, Some(u64::MAX));
    }

    #[test]
    fn test_garbage_lines_are_skipped() {
        let info = parse_meminfo("not a meminfo line\nMemTotal: lots kB\n");
        assert_eq!(info, MemoryInfo::default());
    }
}
