//! In-memory scope catalog with parent/child traversal
//!
//! The catalog is built once per session from a flat list of scope records
//! and shared read-only by the entitlement resolver and the selection editor.
//!
//! Structural rules:
//! 1. Duplicate names and parent cycles are rejected at construction
//! 2. A parent of `"*"` (or empty) means "no parent"
//! 3. A parent naming a scope that is not in the catalog is tolerated: the
//!    scope becomes a structural root and is never reached from the missing name

use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, warn};

use super::types::ScopeRecord;
use crate::error::Result;

/// Catalog construction errors
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    /// Scope name supplied more than once
    #[error("Duplicate scope name: {0}")]
    DuplicateScope(String),

    /// Parent references form a cycle
    #[error("Circular parent chain: {0}")]
    CircularParent(String),
}

/// All known scopes and their parent/child relationships
///
/// # Example
///
/// ```
/// use idconsole_authz::scope::{ScopeCatalog, ScopeRecord};
///
/// let catalog = ScopeCatalog::new(vec![
///     ScopeRecord::new("admin"),
///     ScopeRecord::new("admin:profile").with_parent("admin"),
///     ScopeRecord::new("admin:profile:write").with_parent("admin:profile"),
/// ]).unwrap();
///
/// assert_eq!(catalog.parent_of("admin:profile:write"), Some("admin:profile"));
/// assert_eq!(catalog.descendants_of("admin").len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScopeCatalog {
    /// Records in insertion order
    records: Vec<ScopeRecord>,

    /// Name -> position in `records`
    index: HashMap<String, usize>,

    /// Child -> parent, only for parents present in the catalog
    parents: HashMap<String, String>,

    /// Parent -> direct children, in insertion order
    children: HashMap<String, Vec<String>>,

    /// Scopes whose declared parent is missing from the catalog
    dangling: Vec<String>,
}

impl ScopeCatalog {
    /// Build a catalog from a flat sequence of scope records
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A scope name is duplicated
    /// - Parent references form a cycle (including a scope naming itself)
    pub fn new<I>(records: I) -> std::result::Result<Self, CatalogError>
    where
        I: IntoIterator<Item = ScopeRecord>,
    {
        let mut catalog = Self::default();

        for record in records {
            if catalog.index.contains_key(&record.name) {
                return Err(CatalogError::DuplicateScope(record.name));
            }
            catalog.index.insert(record.name.clone(), catalog.records.len());
            catalog.records.push(record);
        }

        // Edges need every name registered first
        for record in &catalog.records {
            let Some(parent) = record.declared_parent() else {
                continue;
            };

            if catalog.index.contains_key(parent) {
                catalog.parents.insert(record.name.clone(), parent.to_string());
                catalog
                    .children
                    .entry(parent.to_string())
                    .or_default()
                    .push(record.name.clone());
            } else {
                warn!(scope = %record.name, parent, "scope parent not in catalog, treating as root");
                catalog.dangling.push(record.name.clone());
            }
        }

        catalog.detect_cycles()?;

        debug!(
            scopes = catalog.records.len(),
            roots = catalog.roots().len(),
            "scope catalog built"
        );

        Ok(catalog)
    }

    /// Build a catalog from a JSON array of scope records
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<ScopeRecord> = serde_json::from_str(json)?;
        Ok(Self::new(records)?)
    }

    /// Walk up from every scope; a name seen twice on one walk closes a cycle.
    ///
    /// Each scope has at most one parent, so finished walks are memoised and
    /// the whole check is linear in the number of scopes.
    fn detect_cycles(&self) -> std::result::Result<(), CatalogError> {
        let mut finished: HashSet<&str> = HashSet::new();

        for record in &self.records {
            let mut path: Vec<&str> = Vec::new();
            let mut current = Some(record.name.as_str());

            while let Some(name) = current {
                if finished.contains(name) {
                    break;
                }
                if let Some(start) = path.iter().position(|seen| *seen == name) {
                    let cycle: Vec<&str> = path[start..]
                        .iter()
                        .copied()
                        .chain(std::iter::once(name))
                        .collect();
                    return Err(CatalogError::CircularParent(cycle.join(" -> ")));
                }
                path.push(name);
                current = self.parent_of(name);
            }

            finished.extend(path);
        }

        Ok(())
    }

    /// Look up a scope record
    pub fn get(&self, name: &str) -> Option<&ScopeRecord> {
        self.index.get(name).map(|&idx| &self.records[idx])
    }

    /// Whether the catalog knows this scope
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Immediate structural parent
    ///
    /// `None` if the scope is absent, is a root, or declares a parent that is
    /// not in the catalog.
    pub fn parent_of(&self, name: &str) -> Option<&str> {
        self.parents.get(name).map(String::as_str)
    }

    /// Direct children only, in catalog order
    pub fn children_of(&self, name: &str) -> &[String] {
        self.children.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Transitive closure of `children_of`, depth-first pre-order
    ///
    /// Never includes `name` itself.
    pub fn descendants_of(&self, name: &str) -> Vec<&str> {
        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(name);

        let mut out = Vec::new();
        let mut stack: Vec<&str> = self.children_of(name).iter().rev().map(String::as_str).collect();

        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            out.push(current);
            stack.extend(self.children_of(current).iter().rev().map(String::as_str));
        }

        out
    }

    /// Ancestor chain, immediate parent first
    pub fn ancestors_of(&self, name: &str) -> Vec<&str> {
        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(name);

        let mut out = Vec::new();
        let mut current = self.parent_of(name);

        while let Some(parent) = current {
            if !visited.insert(parent) {
                break;
            }
            out.push(parent);
            current = self.parent_of(parent);
        }

        out
    }

    /// Number of ancestors above the scope
    pub fn depth_of(&self, name: &str) -> Option<usize> {
        self.contains(name).then(|| self.ancestors_of(name).len())
    }

    /// Structural roots in catalog order (dangling scopes included)
    pub fn roots(&self) -> Vec<&str> {
        self.records
            .iter()
            .map(|r| r.name.as_str())
            .filter(|name| !self.parents.contains_key(*name))
            .collect()
    }

    /// Scopes whose declared parent is not in the catalog
    pub fn dangling(&self) -> &[String] {
        &self.dangling
    }

    /// All records in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &ScopeRecord> {
        self.records.iter()
    }

    /// All scope names in catalog order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl TryFrom<Vec<ScopeRecord>> for ScopeCatalog {
    type Error = CatalogError;

    fn try_from(records: Vec<ScopeRecord>) -> std::result::Result<Self, Self::Error> {
        Self::new(records)
    }
}
