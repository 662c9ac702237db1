//! Scope record definitions
//!
//! A scope is the atomic permission unit. Records arrive already parsed
//! from the identity service and are assembled into a `ScopeCatalog`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::ScopeName;

/// Parent value meaning "no parent" in catalogs that name an explicit forest root
pub const ROOT_SENTINEL: &str = "*";

/// A named permission, optionally nested under a parent scope
///
/// # Examples
///
/// ```
/// use idconsole_authz::scope::ScopeRecord;
///
/// let scope = ScopeRecord::new("admin:profile:write").with_parent("admin:profile");
/// assert_eq!(scope.declared_parent(), Some("admin:profile"));
///
/// let root = ScopeRecord::new("admin").with_parent("*");
/// assert_eq!(root.declared_parent(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeRecord {
    /// Unique, stable scope name used as the graph key
    pub name: ScopeName,

    /// Parent scope name as supplied by the catalog source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ScopeName>,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_description: Option<String>,
}

impl ScopeRecord {
    /// Create a root scope with no description
    pub fn new(name: impl Into<ScopeName>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            description: String::new(),
            admin_description: None,
        }
    }

    /// Set the parent scope name
    pub fn with_parent(mut self, parent: impl Into<ScopeName>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Set the human-readable description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Parent name with the root sentinel and empty values normalised away
    pub fn declared_parent(&self) -> Option<&str> {
        match self.parent.as_deref() {
            None | Some("") | Some(ROOT_SENTINEL) => None,
            Some(parent) => Some(parent),
        }
    }
}

impl fmt::Display for ScopeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
