//! Grant-set compaction
//!
//! Before a selection is persisted, every scope already covered by a
//! selected ancestor is dropped, so a fully selected subtree collapses to its
//! topmost selected scope.

use std::collections::{BTreeSet, HashSet};

use crate::entitlement::is_authorized;
use crate::scope::ScopeCatalog;

/// Remove scopes whose parent is already authorized by the same set
///
/// Checking the parent with ancestor coverage makes this transitive in one
/// pass: a scope is dropped when any strict ancestor is in the set. Names
/// unknown to the catalog are left untouched.
///
/// # Examples
///
/// ```
/// use idconsole_authz::editor::compact;
/// use idconsole_authz::scope::{ScopeCatalog, ScopeRecord};
///
/// let catalog = ScopeCatalog::new(vec![
///     ScopeRecord::new("admin:profile"),
///     ScopeRecord::new("admin:profile:write").with_parent("admin:profile"),
///     ScopeRecord::new("admin:profile:read").with_parent("admin:profile"),
/// ]).unwrap();
///
/// let compacted = compact(&catalog, ["admin:profile", "admin:profile:write", "admin:profile:read"]);
/// assert_eq!(compacted.into_iter().collect::<Vec<_>>(), vec!["admin:profile"]);
/// ```
pub fn compact<I, S>(catalog: &ScopeCatalog, selected: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let candidates: HashSet<String> = selected
        .into_iter()
        .map(|s| s.as_ref().to_string())
        .collect();

    candidates
        .iter()
        .filter(|name| {
            !catalog
                .parent_of(name)
                .is_some_and(|parent| is_authorized(catalog, parent, &candidates))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::ScopeRecord;

    fn catalog() -> ScopeCatalog {
        ScopeCatalog::new(vec![
            ScopeRecord::new("admin"),
            ScopeRecord::new("admin:profile").with_parent("admin"),
            ScopeRecord::new("admin:profile:write").with_parent("admin:profile"),
            ScopeRecord::new("admin:profile:read").with_parent("admin:profile"),
            ScopeRecord::new("admin:roles").with_parent("admin"),
        ])
        .unwrap()
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_subtree_collapses_to_parent() {
        let compacted = compact(
            &catalog(),
            ["admin:profile", "admin:profile:write", "admin:profile:read"],
        );
        assert_eq!(compacted, set(&["admin:profile"]));
    }

    #[test]
    fn test_siblings_without_parent_unchanged() {
        let input = set(&["admin:profile:write", "admin:profile:read"]);
        assert_eq!(compact(&catalog(), &input), input);
    }

    #[test]
    fn test_transitive_removal_skips_gap() {
        // Grandchild is removed even though its direct parent is not selected
        let compacted = compact(&catalog(), ["admin", "admin:profile:write"]);
        assert_eq!(compacted, set(&["admin"]));
    }

    #[test]
    fn test_full_tree_collapses_to_root() {
        let catalog = catalog();
        let all: Vec<&str> = catalog.names().collect();
        assert_eq!(compact(&catalog, all), set(&["admin"]));
    }

    #[test]
    fn test_unknown_names_left_untouched() {
        let compacted = compact(&catalog(), ["legacy:scope", "admin:roles"]);
        assert_eq!(compacted, set(&["admin:roles", "legacy:scope"]));
    }

    #[test]
    fn test_duplicates_collapse() {
        let compacted = compact(&catalog(), ["admin:roles", "admin:roles"]);
        assert_eq!(compacted, set(&["admin:roles"]));
    }

    #[test]
    fn test_empty_input() {
        assert!(compact(&catalog(), Vec::<String>::new()).is_empty());
    }
}
