//! Core principal and role types

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Unique scope name (e.g. `"admin:profile:write"`)
pub type ScopeName = String;

/// Unique role identifier
pub type RoleId = String;

/// Unique principal identifier
pub type PrincipalId = String;

/// Kind of entity that can hold scopes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalKind {
    /// Human user account
    User,
    /// Role referenced by other principals as a fallback scope source
    Role,
    /// OAuth client application
    Client,
}

impl fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Role => write!(f, "role"),
            Self::Client => write!(f, "client"),
        }
    }
}

/// Identity of a principal, without its grants
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrincipalRef {
    /// Principal identifier
    pub id: PrincipalId,

    /// Principal kind
    #[serde(rename = "type")]
    pub kind: PrincipalKind,
}

impl fmt::Display for PrincipalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Anything that can hold permissions: a user, a role, or a client application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Principal identifier
    pub id: PrincipalId,

    /// Principal kind (user, role, client)
    #[serde(rename = "type")]
    pub kind: PrincipalKind,

    /// Scope names explicitly assigned to this principal
    #[serde(default, rename = "scope")]
    pub granted_scopes: HashSet<ScopeName>,

    /// Fallback entitlement source (users and clients only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<RoleId>,
}

impl Principal {
    /// Create a principal with no grants and no role
    pub fn new(id: impl Into<PrincipalId>, kind: PrincipalKind) -> Self {
        Self {
            id: id.into(),
            kind,
            granted_scopes: HashSet::new(),
            role: None,
        }
    }

    /// Shorthand for a user principal
    pub fn user(id: impl Into<PrincipalId>) -> Self {
        Self::new(id, PrincipalKind::User)
    }

    /// Shorthand for a client application principal
    pub fn client(id: impl Into<PrincipalId>) -> Self {
        Self::new(id, PrincipalKind::Client)
    }

    /// Add granted scopes
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ScopeName>,
    {
        self.granted_scopes.extend(scopes.into_iter().map(Into::into));
        self
    }

    /// Attach a fallback role
    pub fn with_role(mut self, role: impl Into<RoleId>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Identity of this principal
    pub fn identity(&self) -> PrincipalRef {
        PrincipalRef {
            id: self.id.clone(),
            kind: self.kind,
        }
    }
}

/// Which principals a role may be assigned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleAudience {
    #[default]
    User,
    Client,
}

/// Role definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    /// Role identifier (e.g. `"admin"`, `"super_admin"`)
    pub id: RoleId,

    /// Human-readable name
    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub description: String,

    /// Scopes granted to every principal holding this role
    #[serde(default, rename = "scope")]
    pub granted_scopes: HashSet<ScopeName>,

    /// Ordering hint for listings
    #[serde(default)]
    pub ranking: i32,

    /// Protected from deletion
    #[serde(default)]
    pub system: bool,

    /// Principal kind this role applies to
    #[serde(default, rename = "type")]
    pub audience: RoleAudience,
}

impl Role {
    /// Create a role with no grants
    pub fn new(id: impl Into<RoleId>) -> Self {
        Self {
            id: id.into(),
            display_name: String::new(),
            description: String::new(),
            granted_scopes: HashSet::new(),
            ranking: 0,
            system: false,
            audience: RoleAudience::User,
        }
    }

    /// Add granted scopes
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ScopeName>,
    {
        self.granted_scopes.extend(scopes.into_iter().map(Into::into));
        self
    }

    /// Mark the role as a system role
    pub fn system(mut self) -> Self {
        self.system = true;
        self
    }

    /// View this role as a principal whose grant set can be edited
    pub fn as_principal(&self) -> Principal {
        Principal {
            id: self.id.clone(),
            kind: PrincipalKind::Role,
            granted_scopes: self.granted_scopes.clone(),
            role: None,
        }
    }
}
