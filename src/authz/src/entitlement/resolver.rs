//! Entitlement resolver with ancestor coverage and role fallback
//!
//! Decision rules, in order:
//! 1. Missing catalog or principal: deny
//! 2. Principal holding the super-role: allow (no catalog lookup)
//! 3. Scope unknown to the catalog: deny
//! 4. Scope, or any ancestor of it, in the principal's grants: allow
//! 5. Same check against the principal's role grants, when fallback is enabled
//!
//! Every path that lacks data ends in a denial. Nothing here returns an error.

use std::collections::BTreeSet;
use tracing::debug;

use super::lookup::{GrantLookup, RoleLookup};
use crate::config::ResolverConfig;
use crate::scope::ScopeCatalog;
use crate::types::Principal;

/// Whether a principal check may consult the principal's role grants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleFallback {
    /// Direct grants first, then the role's grants
    Enabled,
    /// Direct grants only
    Disabled,
}

impl From<bool> for RoleFallback {
    fn from(enabled: bool) -> Self {
        if enabled {
            Self::Enabled
        } else {
            Self::Disabled
        }
    }
}

/// Check a required scope against a grant set using ancestor coverage
///
/// A grant on any ancestor covers every descendant, so `"admin:profile"`
/// authorizes `"admin:profile:access:write"`. Unknown scopes are never
/// authorized.
///
/// # Examples
///
/// ```
/// use idconsole_authz::entitlement::is_authorized;
/// use idconsole_authz::scope::{ScopeCatalog, ScopeRecord};
///
/// let catalog = ScopeCatalog::new(vec![
///     ScopeRecord::new("admin"),
///     ScopeRecord::new("admin:profile").with_parent("admin"),
///     ScopeRecord::new("admin:profile:write").with_parent("admin:profile"),
/// ]).unwrap();
///
/// let grants = vec!["admin".to_string()];
/// assert!(is_authorized(&catalog, "admin:profile:write", &grants));
/// assert!(!is_authorized(&catalog, "billing", &grants));
/// ```
pub fn is_authorized<G>(catalog: &ScopeCatalog, required: &str, grants: &G) -> bool
where
    G: GrantLookup + ?Sized,
{
    if !catalog.contains(required) {
        return false;
    }

    grants.holds(required)
        || catalog
            .ancestors_of(required)
            .into_iter()
            .any(|ancestor| grants.holds(ancestor))
}

/// Answers authorization queries for principals against a catalog snapshot
///
/// The catalog and role lookup are optional so that callers can query before
/// either has been loaded; such queries deny.
///
/// # Example
///
/// ```
/// use idconsole_authz::entitlement::{EntitlementResolver, RoleDirectory, RoleFallback};
/// use idconsole_authz::scope::{ScopeCatalog, ScopeRecord};
/// use idconsole_authz::types::{Principal, Role};
///
/// let catalog = ScopeCatalog::new(vec![
///     ScopeRecord::new("admin"),
///     ScopeRecord::new("admin:roles").with_parent("admin"),
/// ]).unwrap();
/// let roles = RoleDirectory::new(vec![Role::new("admin").with_scopes(["admin"])]);
///
/// let resolver = EntitlementResolver::new(&catalog).with_roles(&roles);
/// let alice = Principal::user("alice").with_role("admin");
///
/// assert!(resolver.is_authorized_for_principal("admin:roles", Some(&alice), RoleFallback::Enabled));
/// assert!(!resolver.is_authorized_for_principal("admin:roles", Some(&alice), RoleFallback::Disabled));
/// ```
#[derive(Clone)]
pub struct EntitlementResolver<'a> {
    catalog: Option<&'a ScopeCatalog>,
    roles: Option<&'a dyn RoleLookup>,
    config: ResolverConfig,
}

impl<'a> EntitlementResolver<'a> {
    /// Create a resolver over a catalog (or `None` if not loaded yet)
    pub fn new(catalog: impl Into<Option<&'a ScopeCatalog>>) -> Self {
        Self {
            catalog: catalog.into(),
            roles: None,
            config: ResolverConfig::default(),
        }
    }

    /// Resolver with nothing loaded yet; every query denies
    pub fn unloaded() -> Self {
        Self::new(None::<&'a ScopeCatalog>)
    }

    /// Attach the role catalog used for fallback checks
    pub fn with_roles<R: RoleLookup + 'a>(mut self, roles: &'a R) -> Self {
        self.roles = Some(roles);
        self
    }

    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn catalog(&self) -> Option<&'a ScopeCatalog> {
        self.catalog
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Whether the principal holds the distinguished super-role
    pub fn is_super(&self, principal: &Principal) -> bool {
        principal.role.as_deref() == Some(self.config.super_role.as_str())
    }

    /// Check a grant set against the loaded catalog
    pub fn is_authorized<G>(&self, required: &str, grants: &G) -> bool
    where
        G: GrantLookup + ?Sized,
    {
        match self.catalog {
            Some(catalog) => is_authorized(catalog, required, grants),
            None => {
                debug!(scope = required, "denied: scope catalog not loaded");
                false
            }
        }
    }

    /// Check a principal, honoring the super-role bypass and optional role fallback
    pub fn is_authorized_for_principal(
        &self,
        required: &str,
        principal: Option<&Principal>,
        fallback: RoleFallback,
    ) -> bool {
        let (Some(catalog), Some(principal)) = (self.catalog, principal) else {
            debug!(scope = required, "denied: catalog or principal missing");
            return false;
        };

        if self.is_super(principal) {
            return true;
        }

        if is_authorized(catalog, required, &principal.granted_scopes) {
            return true;
        }

        if fallback == RoleFallback::Disabled {
            return false;
        }

        match principal.role.as_deref() {
            Some(role) => self.is_authorized_by_role(required, role),
            None => false,
        }
    }

    /// Principal check using the configured default fallback mode
    pub fn permits(&self, required: &str, principal: &Principal) -> bool {
        self.is_authorized_for_principal(
            required,
            Some(principal),
            RoleFallback::from(self.config.role_fallback),
        )
    }

    /// Check only the grants of a role
    pub fn is_authorized_by_role(&self, required: &str, role_id: &str) -> bool {
        let Some(roles) = self.roles else {
            debug!(scope = required, role = role_id, "denied: role catalog not loaded");
            return false;
        };

        match roles.role(role_id) {
            Some(role) => self.is_authorized(required, &role.granted_scopes),
            None => {
                debug!(scope = required, role = role_id, "denied: unknown role");
                false
            }
        }
    }

    /// Every catalog scope covered by a grant set
    pub fn authorized_closure<G>(&self, grants: &G) -> BTreeSet<String>
    where
        G: GrantLookup + ?Sized,
    {
        let Some(catalog) = self.catalog else {
            return BTreeSet::new();
        };

        catalog
            .names()
            .filter(|name| is_authorized(catalog, name, grants))
            .map(str::to_string)
            .collect()
    }

    /// Every catalog scope the principal is entitled to under the default fallback mode
    pub fn entitled_scopes(&self, principal: &Principal) -> BTreeSet<String> {
        let Some(catalog) = self.catalog else {
            return BTreeSet::new();
        };

        catalog
            .names()
            .filter(|name| self.permits(name, principal))
            .map(str::to_string)
            .collect()
    }
}

impl std::fmt::Debug for EntitlementResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntitlementResolver")
            .field("catalog_loaded", &self.catalog.is_some())
            .field("roles_loaded", &self.roles.is_some())
            .field("config", &self.config)
            .finish()
    }
}
