//! Access-update hand-off and edit guardrails
//!
//! The editor never persists anything itself. A save builds an
//! `AccessUpdate` and hands it to an `AccessWriter` (an HTTP call in the
//! admin console), but only when the acting principal may edit the target.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::config::EditorConfig;
use crate::entitlement::EntitlementResolver;
use crate::error::Result;
use crate::types::{Principal, PrincipalKind, PrincipalRef};

/// Payload persisted by the external "update access" operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessUpdate {
    /// Unique request identifier
    pub request_id: Uuid,

    /// Principal whose grant set is replaced
    pub target: PrincipalRef,

    /// Compacted grant set, sorted
    pub scopes: Vec<String>,

    pub requested_at: DateTime<Utc>,
}

impl AccessUpdate {
    pub fn new(target: PrincipalRef, scopes: impl IntoIterator<Item = String>) -> Self {
        let mut scopes: Vec<String> = scopes.into_iter().collect();
        scopes.sort();
        scopes.dedup();

        Self {
            request_id: Uuid::new_v4(),
            target,
            scopes,
            requested_at: Utc::now(),
        }
    }
}

/// External collaborator that persists an access grant
#[async_trait]
pub trait AccessWriter: Send + Sync {
    /// Replace the target's grant set with `update.scopes`
    async fn update_access(&self, update: &AccessUpdate) -> Result<()>;
}

/// Why an edit is not allowed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefusalReason {
    /// Acting principal is the target, or holds the target role
    SelfEdit,
    /// Target is the super-role
    ProtectedRole,
    /// Acting principal lacks the configured access scope
    MissingAccessScope(String),
    /// Editor was already saved or cancelled
    Closed,
}

impl fmt::Display for RefusalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfEdit => write!(f, "You cannot edit your own permissions"),
            Self::ProtectedRole => write!(f, "The super-role's permissions cannot be edited"),
            Self::MissingAccessScope(scope) => write!(f, "Editing access requires scope '{}'", scope),
            Self::Closed => write!(f, "Editor is closed"),
        }
    }
}

/// Result of the edit guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditPermission {
    Allowed,
    Refused(RefusalReason),
}

impl EditPermission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    pub fn refusal(&self) -> Option<&RefusalReason> {
        match self {
            Self::Allowed => None,
            Self::Refused(reason) => Some(reason),
        }
    }
}

/// Result of a save attempt that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The writer accepted the update
    Saved(AccessUpdate),
    /// Nothing was sent
    Refused(RefusalReason),
}

/// Decide whether `actor` may edit the grant set of `target`
///
/// Self-edit is checked first so the operator sees that reason even when
/// others also apply.
pub fn edit_permission(
    resolver: &EntitlementResolver<'_>,
    config: &EditorConfig,
    actor: &Principal,
    target: &Principal,
) -> EditPermission {
    if actor.id == target.id {
        return EditPermission::Refused(RefusalReason::SelfEdit);
    }

    if target.kind == PrincipalKind::Role && actor.role.as_deref() == Some(target.id.as_str()) {
        return EditPermission::Refused(RefusalReason::SelfEdit);
    }

    if config.protect_super_role
        && target.kind == PrincipalKind::Role
        && target.id == resolver.config().super_role
    {
        return EditPermission::Refused(RefusalReason::ProtectedRole);
    }

    if let Some(scope) = config.required_access_scope() {
        if !resolver.permits(scope, actor) {
            return EditPermission::Refused(RefusalReason::MissingAccessScope(scope.to_string()));
        }
    }

    EditPermission::Allowed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::{ScopeCatalog, ScopeRecord};
    use crate::types::Role;

    fn catalog() -> ScopeCatalog {
        ScopeCatalog::new(vec![
            ScopeRecord::new("admin"),
            ScopeRecord::new("admin:profile").with_parent("admin"),
            ScopeRecord::new("admin:profile:access").with_parent("admin:profile"),
            ScopeRecord::new("admin:profile:access:write").with_parent("admin:profile:access"),
        ])
        .unwrap()
    }

    #[test]
    fn test_self_edit_by_id() {
        let catalog = catalog();
        let resolver = EntitlementResolver::new(&catalog);
        let alice = Principal::user("alice").with_scopes(["admin"]);

        let permission = edit_permission(&resolver, &EditorConfig::default(), &alice, &alice);
        assert_eq!(permission, EditPermission::Refused(RefusalReason::SelfEdit));
    }

    #[test]
    fn test_self_edit_by_role() {
        let catalog = catalog();
        let resolver = EntitlementResolver::new(&catalog);
        let actor = Principal::user("alice").with_scopes(["admin"]).with_role("admin");
        let target = Role::new("admin").as_principal();

        let permission = edit_permission(&resolver, &EditorConfig::default(), &actor, &target);
        assert_eq!(permission.refusal(), Some(&RefusalReason::SelfEdit));
    }

    #[test]
    fn test_user_with_same_id_as_role_name_is_not_role_self_edit() {
        let catalog = catalog();
        let resolver = EntitlementResolver::new(&catalog);
        let actor = Principal::user("alice").with_scopes(["admin"]).with_role("admin");
        let target = Principal::user("admin");

        assert!(edit_permission(&resolver, &EditorConfig::default(), &actor, &target).is_allowed());
    }

    #[test]
    fn test_protected_super_role() {
        let catalog = catalog();
        let resolver = EntitlementResolver::new(&catalog);
        let actor = Principal::user("root").with_role("super_admin");
        let target = Role::new("super_admin").system().as_principal();

        let permission = edit_permission(&resolver, &EditorConfig::default(), &actor, &target);
        assert_eq!(permission.refusal(), Some(&RefusalReason::SelfEdit));

        let other = Principal::user("ops").with_scopes(["admin"]);
        let permission = edit_permission(&resolver, &EditorConfig::default(), &other, &target);
        assert_eq!(permission, EditPermission::Refused(RefusalReason::ProtectedRole));

        let config = EditorConfig {
            protect_super_role: false,
            ..EditorConfig::default()
        };
        assert!(edit_permission(&resolver, &config, &other, &target).is_allowed());
    }

    #[test]
    fn test_missing_access_scope() {
        let catalog = catalog();
        let resolver = EntitlementResolver::new(&catalog);
        let actor = Principal::user("bob").with_scopes(["admin:profile:access"]);
        let weak = Principal::user("carol");
        let target = Principal::user("dave");

        assert!(edit_permission(&resolver, &EditorConfig::default(), &actor, &target).is_allowed());
        assert!(matches!(
            edit_permission(&resolver, &EditorConfig::default(), &weak, &target),
            EditPermission::Refused(RefusalReason::MissingAccessScope(_))
        ));

        let open = EditorConfig {
            access_scope: String::new(),
            ..EditorConfig::default()
        };
        assert!(edit_permission(&resolver, &open, &weak, &target).is_allowed());
    }

    #[test]
    fn test_access_update_sorted_and_deduplicated() {
        let target = Principal::client("app").identity();
        let update = AccessUpdate::new(
            target.clone(),
            vec!["b".to_string(), "a".to_string(), "b".to_string()],
        );

        assert_eq!(update.scopes, vec!["a", "b"]);
        assert_eq!(update.target, target);
    }

    #[test]
    fn test_access_update_serializes_camel_case() {
        let update = AccessUpdate::new(Principal::user("u1").identity(), vec!["admin".to_string()]);
        let json = serde_json::to_value(&update).unwrap();

        assert!(json.get("requestId").is_some());
        assert!(json.get("requestedAt").is_some());
        assert_eq!(json["target"]["type"], "user");
        assert_eq!(json["target"]["id"], "u1");
        assert_eq!(json["scopes"][0], "admin");
    }

    #[test]
    fn test_refusal_messages() {
        assert_eq!(
            RefusalReason::SelfEdit.to_string(),
            "You cannot edit your own permissions"
        );
        assert!(RefusalReason::MissingAccessScope("x".into()).to_string().contains("'x'"));
    }
}
