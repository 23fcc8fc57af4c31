//! # Controller white list.
//!
//! Controllers excluded from cleanup, derived once from
//! `destroy_controllers.excluded_list` whenever the configuration is
//! applied: entries ending in the wildcard marker `*` become prefix rules
//! (stored without the marker), all others exact class names.
//!
//! Exact lookup is O(1); prefix lookup is a linear scan over the registered
//! prefixes. Any prefix match is equivalent (the predicate is boolean), so
//! first match wins without an ordering guarantee.

use std::collections::HashSet;

/// Trailing marker turning an excluded-list entry into a prefix rule.
pub const WILDCARD: char = '*';

/// Exact-name set plus prefix list of controllers excluded from cleanup.
#[derive(Debug, Default)]
pub struct ControllerWhitelist {
    exact: HashSet<String>,
    prefixes: Vec<String>,
}

impl ControllerWhitelist {
    /// Builds the white list from excluded-list entries.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut exact = HashSet::new();
        let mut prefixes = Vec::new();

        for entry in entries {
            let entry = entry.as_ref();
            if let Some(prefix) = entry.strip_suffix(WILDCARD) {
                prefixes.push(prefix.to_string());
            } else {
                exact.insert(entry.to_string());
            }
        }

        Self { exact, prefixes }
    }

    /// Whether `class` is excluded from controller cleanup.
    pub fn is_excluded(&self, class: &str) -> bool {
        if self.exact.contains(class) {
            return true;
        }
        self.prefixes.iter().any(|p| class.starts_with(p.as_str()))
    }

    /// True when no exclusion rule is registered.
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.prefixes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_entries_match_exactly() {
        let wl = ControllerWhitelist::from_entries(["App\\Http\\AuthController"]);
        assert!(wl.is_excluded("App\\Http\\AuthController"));
        assert!(!wl.is_excluded("App\\Http\\AuthControllerV2"));
        assert!(!wl.is_excluded("App\\Http\\PageController"));
    }

    #[test]
    fn wildcard_entries_match_by_prefix() {
        let wl = ControllerWhitelist::from_entries(["App\\Admin\\*"]);
        assert!(wl.is_excluded("App\\Admin\\UserController"));
        assert!(wl.is_excluded("App\\Admin\\Nested\\AuditController"));
        assert!(!wl.is_excluded("App\\Http\\UserController"));
    }

    #[test]
    fn marker_is_stripped_from_stored_prefix() {
        let wl = ControllerWhitelist::from_entries(["Exact*"]);
        // "Exact" itself starts with the stored prefix, so it is excluded;
        // the literal entry including the marker is not special-cased.
        assert!(wl.is_excluded("Exact"));
        assert!(wl.is_excluded("ExactMatchController"));
    }

    #[test]
    fn empty_list_excludes_nothing() {
        let wl = ControllerWhitelist::from_entries(Vec::<String>::new());
        assert!(wl.is_empty());
        assert!(!wl.is_excluded("App\\Http\\PageController"));
    }

    #[test]
    fn mixed_rules_compose() {
        let wl = ControllerWhitelist::from_entries([
            "App\\Http\\HealthController",
            "App\\Admin\\*",
            "Vendor\\Package\\*",
        ]);
        assert!(wl.is_excluded("App\\Http\\HealthController"));
        assert!(wl.is_excluded("Vendor\\Package\\WebhookController"));
        assert!(!wl.is_excluded("App\\Http\\CartController"));
    }
}
