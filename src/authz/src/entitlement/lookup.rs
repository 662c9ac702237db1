//! Grant-set and role lookup abstractions
//!
//! The resolver only needs membership tests on grant sets and by-id access to
//! roles, so both are expressed as small traits with impls for the standard
//! collections callers already hold.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::hash::BuildHasher;

use crate::error::Result;
use crate::types::{Role, RoleId};

/// Membership test over a set of granted scope names
pub trait GrantLookup {
    /// Whether `scope` is explicitly granted
    fn holds(&self, scope: &str) -> bool;
}

impl<S: BuildHasher> GrantLookup for HashSet<String, S> {
    fn holds(&self, scope: &str) -> bool {
        self.contains(scope)
    }
}

impl<S: BuildHasher> GrantLookup for HashSet<&str, S> {
    fn holds(&self, scope: &str) -> bool {
        self.contains(scope)
    }
}

impl GrantLookup for BTreeSet<String> {
    fn holds(&self, scope: &str) -> bool {
        self.contains(scope)
    }
}

impl GrantLookup for [String] {
    fn holds(&self, scope: &str) -> bool {
        self.iter().any(|s| s == scope)
    }
}

impl GrantLookup for [&str] {
    fn holds(&self, scope: &str) -> bool {
        self.iter().any(|s| *s == scope)
    }
}

impl GrantLookup for Vec<String> {
    fn holds(&self, scope: &str) -> bool {
        self.as_slice().holds(scope)
    }
}

impl<T: GrantLookup + ?Sized> GrantLookup for &T {
    fn holds(&self, scope: &str) -> bool {
        (**self).holds(scope)
    }
}

/// By-id access to role definitions, used for role fallback
pub trait RoleLookup {
    fn role(&self, id: &str) -> Option<&Role>;
}

impl<S: BuildHasher> RoleLookup for HashMap<RoleId, Role, S> {
    fn role(&self, id: &str) -> Option<&Role> {
        self.get(id)
    }
}

impl RoleLookup for [Role] {
    fn role(&self, id: &str) -> Option<&Role> {
        self.iter().find(|r| r.id == id)
    }
}

impl RoleLookup for Vec<Role> {
    fn role(&self, id: &str) -> Option<&Role> {
        self.as_slice().role(id)
    }
}

/// Role catalog snapshot keyed by role id
///
/// Later duplicates replace earlier ones.
#[derive(Debug, Clone, Default)]
pub struct RoleDirectory {
    roles: HashMap<RoleId, Role>,
}

impl RoleDirectory {
    pub fn new<I>(roles: I) -> Self
    where
        I: IntoIterator<Item = Role>,
    {
        Self {
            roles: roles.into_iter().map(|r| (r.id.clone(), r)).collect(),
        }
    }

    /// Build a directory from a JSON array of roles
    pub fn from_json(json: &str) -> Result<Self> {
        let roles: Vec<Role> = serde_json::from_str(json)?;
        Ok(Self::new(roles))
    }

    pub fn get(&self, id: &str) -> Option<&Role> {
        self.roles.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.roles.values()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl RoleLookup for RoleDirectory {
    fn role(&self, id: &str) -> Option<&Role> {
        self.get(id)
    }
}
