//! Named groups of facts
//!
//! Groups are the unit of blocking by group name and the key of the
//! persistent cache: one probe usually seeds every fact in a group.

use crate::options::OptionSnapshot;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Default)]
pub struct FactGroups {
    groups: BTreeMap<String, Vec<String>>,
    index: HashMap<String, String>,
}

impl FactGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(mut self, group: impl Into<String>, facts: &[&str]) -> Self {
        self.insert(group, facts.iter().map(|fact| fact.to_string()).collect());
        self
    }

    /// Add or replace a group. A fact belongs to at most one group; the most
    /// recent insertion claims it.
    pub fn insert(&mut self, group: impl Into<String>, facts: Vec<String>) {
        let group = group.into();

        if let Some(previous) = self.groups.remove(&group) {
            for fact in previous {
                if self.index.get(&fact) == Some(&group) {
                    self.index.remove(&fact);
                }
            }
        }

        for fact in &facts {
            if let Some(owner) = self.index.insert(fact.clone(), group.clone()) {
                if owner != group {
                    if let Some(members) = self.groups.get_mut(&owner) {
                        members.retain(|member| member != fact);
                    }
                }
            }
        }
        self.groups.insert(group, facts);
    }

    /// Merge groups from configuration over the current table
    pub fn merge(&mut self, groups: &BTreeMap<String, Vec<String>>) {
        for (group, facts) in groups {
            self.insert(group.clone(), facts.clone());
        }
    }

    /// Group owning `fact`: an exact member, else the member that is the
    /// closest dotted ancestor
    pub fn group_of(&self, fact: &str) -> Option<&str> {
        if let Some(group) = self.index.get(fact) {
            return Some(group.as_str());
        }

        let mut name = fact;
        while let Some((parent, _)) = name.rsplit_once('.') {
            if let Some(group) = self.index.get(parent) {
                return Some(group.as_str());
            }
            name = parent;
        }
        None
    }

    pub fn facts_in(&self, group: &str) -> Option<&[String]> {
        self.groups.get(group).map(Vec::as_slice)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn contains_group(&self, group: &str) -> bool {
        self.groups.contains_key(group)
    }

    /// Blocked by name, by dotted ancestor, or through its group
    pub fn is_blocked(&self, options: &OptionSnapshot, fact: &str) -> bool {
        options.blocks_name(fact)
            || self
                .group_of(fact)
                .map_or(false, |group| options.blocked_facts.contains(group))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups() -> FactGroups {
        FactGroups::new()
            .with_group(
                "memory",
                &["memory.system", "memory.swap", "memorysize_mb", "swapsize_mb"],
            )
            .with_group("kernel", &["kernel", "kernelrelease"])
    }

    #[test]
    fn test_group_of_exact_and_ancestor() {
        let groups = groups();
        assert_eq!(groups.group_of("kernel"), Some("kernel"));
        assert_eq!(groups.group_of("memorysize_mb"), Some("memory"));
        assert_eq!(groups.group_of("memory.system.total_bytes"), Some("memory"));
        assert_eq!(groups.group_of("networking.hostname"), None);
    }

    #[test]
    fn test_blocking_a_group_blocks_its_members() {
        let groups = groups();
        let options = OptionSnapshot::default().with_blocked(&["memory"]);

        assert!(groups.is_blocked(&options, "memorysize_mb"));
        assert!(groups.is_blocked(&options, "memory.swap.free_bytes"));
        assert!(!groups.is_blocked(&options, "kernel"));
    }

    #[test]
    fn test_group_with_spaces() {
        let groups = FactGroups::new().with_group("operating system", &["os", "osfamily"]);
        let options = OptionSnapshot::default().with_blocked(&["operating system"]);

        assert!(groups.is_blocked(&options, "os.family"));
        assert!(groups.is_blocked(&options, "osfamily"));
    }

    #[test]
    fn test_reassigning_a_fact_moves_it() {
        let mut groups = groups();
        groups.insert("legacy memory", vec!["memorysize_mb".to_string()]);

        assert_eq!(groups.group_of("memorysize_mb"), Some("legacy memory"));
        assert!(!groups
            .facts_in("memory")
            .unwrap()
            .contains(&"memorysize_mb".to_string()));
    }

    #[test]
    fn test_merge_replaces_group() {
        let mut groups = groups();
        let mut overrides = BTreeMap::new();
        overrides.insert("kernel".to_string(), vec!["kernelversion".to_string()]);
        groups.merge(&overrides);

        assert_eq!(groups.group_of("kernelversion"), Some("kernel"));
        assert_eq!(groups.group_of("kernelrelease"), None);
    }
}
