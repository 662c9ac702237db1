//! Integration tests for the scope selection editor
//!
//! Tests the full edit session: open from a principal's current grants,
//! cascade toggles, compact, and hand the update to an access writer.

use async_trait::async_trait;
use idconsole_authz::config::{AuthzConfig, EditorConfig};
use idconsole_authz::editor::{
    AccessUpdate, AccessWriter, EditorState, NodeState, RefusalReason, SaveOutcome,
    ScopeSelectionEditor,
};
use idconsole_authz::entitlement::{EntitlementResolver, RoleDirectory};
use idconsole_authz::scope::{ScopeCatalog, ScopeRecord};
use idconsole_authz::types::{Principal, Role};
use idconsole_authz::{AuthzError, Result};
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory stand-in for the identity service's access endpoint
#[derive(Default)]
struct AccessStore {
    grants: Mutex<HashMap<String, Vec<String>>>,
    requests: Mutex<Vec<AccessUpdate>>,
}

impl AccessStore {
    fn grants_of(&self, id: &str) -> Option<Vec<String>> {
        self.grants.lock().unwrap().get(id).cloned()
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl AccessWriter for AccessStore {
    async fn update_access(&self, update: &AccessUpdate) -> Result<()> {
        self.requests.lock().unwrap().push(update.clone());
        self.grants
            .lock()
            .unwrap()
            .insert(update.target.id.clone(), update.scopes.clone());
        Ok(())
    }
}

struct RejectingWriter;

#[async_trait]
impl AccessWriter for RejectingWriter {
    async fn update_access(&self, _update: &AccessUpdate) -> Result<()> {
        Err(AuthzError::AccessWrite("403 Forbidden".to_string()))
    }
}

fn catalog() -> ScopeCatalog {
    ScopeCatalog::new(vec![
        ScopeRecord::new("admin").with_parent("*").with_description("Administration"),
        ScopeRecord::new("admin:profile").with_parent("admin"),
        ScopeRecord::new("admin:profile:read").with_parent("admin:profile"),
        ScopeRecord::new("admin:profile:write").with_parent("admin:profile"),
        ScopeRecord::new("admin:profile:access").with_parent("admin:profile"),
        ScopeRecord::new("admin:profile:access:write").with_parent("admin:profile:access"),
        ScopeRecord::new("admin:roles").with_parent("admin"),
        ScopeRecord::new("audit").with_parent("*"),
        ScopeRecord::new("audit:export").with_parent("audit"),
    ])
    .unwrap()
}

fn roles() -> RoleDirectory {
    RoleDirectory::new(vec![
        Role::new("super_admin").system(),
        Role::new("admin").system().with_scopes(["admin"]),
        Role::new("auditor").with_scopes(["audit"]),
    ])
}

#[tokio::test]
async fn test_edit_session_persists_compacted_grants() {
    let catalog = catalog();
    let roles = roles();
    let resolver = EntitlementResolver::new(&catalog).with_roles(&roles);
    let store = AccessStore::default();

    let operator = Principal::user("operator").with_role("admin");
    let alice = Principal::user("alice").with_scopes(["admin:profile:read"]);

    let mut editor =
        ScopeSelectionEditor::open(&resolver, &EditorConfig::default(), &operator, &alice).unwrap();
    assert!(editor.can_edit());

    editor.toggle("admin:profile:write");
    editor.toggle("admin:profile:access");
    assert!(editor.is_selected("admin:profile"));
    assert!(editor.is_selected("admin:profile:access:write"));

    let outcome = editor.save(&store).await.unwrap();
    assert!(matches!(outcome, SaveOutcome::Saved(_)));
    assert_eq!(store.grants_of("alice"), Some(vec!["admin:profile".to_string()]));
    assert_eq!(editor.state(), EditorState::Closed);
}

#[tokio::test]
async fn test_reopen_after_save_reflects_new_grants() {
    let catalog = catalog();
    let roles = roles();
    let resolver = EntitlementResolver::new(&catalog).with_roles(&roles);
    let store = AccessStore::default();
    let operator = Principal::user("operator").with_role("super_admin");

    let bob = Principal::user("bob").with_scopes(["audit"]);
    let mut editor =
        ScopeSelectionEditor::open(&resolver, &EditorConfig::default(), &operator, &bob).unwrap();
    editor.toggle("audit:export");
    editor.toggle("admin:roles");
    editor.save(&store).await.unwrap();

    let saved = store.grants_of("bob").unwrap();
    assert_eq!(saved, vec!["admin:roles".to_string()]);

    let bob = Principal::user("bob").with_scopes(saved);
    let editor =
        ScopeSelectionEditor::open(&resolver, &EditorConfig::default(), &operator, &bob).unwrap();
    assert!(editor.is_selected("admin:roles"));
    assert!(!editor.is_selected("audit"));
    assert!(!editor.is_selected("audit:export"));
}

#[tokio::test]
async fn test_operator_limited_to_own_entitlements() {
    let catalog = catalog();
    let roles = roles();
    let resolver = EntitlementResolver::new(&catalog).with_roles(&roles);
    let store = AccessStore::default();

    let operator = Principal::user("lead")
        .with_scopes(["admin:profile:access:write"])
        .with_role("auditor");
    let target = Principal::user("dave").with_scopes(["admin:roles"]);

    let mut editor =
        ScopeSelectionEditor::open(&resolver, &EditorConfig::default(), &operator, &target).unwrap();

    assert_eq!(
        editor.node_state("admin:roles"),
        Some(NodeState::NotGrantable { selected: true })
    );
    assert!(!editor.toggle("admin:roles"));
    assert!(editor.toggle("audit"));
    assert!(editor.is_selected("audit:export"));

    let SaveOutcome::Saved(update) = editor.save(&store).await.unwrap() else {
        panic!("expected save");
    };
    assert_eq!(update.scopes, vec!["admin:roles", "audit"]);
}

#[tokio::test]
async fn test_role_target_edit_and_self_role_guard() {
    let catalog = catalog();
    let roles = roles();
    let resolver = EntitlementResolver::new(&catalog).with_roles(&roles);
    let store = AccessStore::default();

    let auditor_role = roles.get("auditor").unwrap().as_principal();

    let member = Principal::user("ann")
        .with_scopes(["admin:profile:access:write"])
        .with_role("auditor");
    let mut editor =
        ScopeSelectionEditor::open(&resolver, &EditorConfig::default(), &member, &auditor_role).unwrap();
    assert_eq!(editor.permission().refusal(), Some(&RefusalReason::SelfEdit));
    assert_eq!(
        editor.save(&store).await.unwrap(),
        SaveOutcome::Refused(RefusalReason::SelfEdit)
    );

    let operator = Principal::user("operator").with_role("admin");
    let mut editor =
        ScopeSelectionEditor::open(&resolver, &EditorConfig::default(), &operator, &auditor_role).unwrap();
    assert!(editor.is_selected("audit:export"));
    editor.toggle("admin:profile:read");
    editor.save(&store).await.unwrap();

    assert_eq!(
        store.grants_of("auditor"),
        Some(vec!["admin:profile:read".to_string(), "audit".to_string()])
    );
    assert_eq!(store.request_count(), 1);
}

#[tokio::test]
async fn test_super_role_protected_unless_configured() {
    let catalog = catalog();
    let roles = roles();
    let resolver = EntitlementResolver::new(&catalog).with_roles(&roles);
    let store = AccessStore::default();

    let operator = Principal::user("operator").with_role("admin");
    let super_role = roles.get("super_admin").unwrap().as_principal();

    let mut editor =
        ScopeSelectionEditor::open(&resolver, &EditorConfig::default(), &operator, &super_role).unwrap();
    assert_eq!(
        editor.save(&store).await.unwrap(),
        SaveOutcome::Refused(RefusalReason::ProtectedRole)
    );

    let config = AuthzConfig::from_toml("[editor]\nprotect_super_role = false\n").unwrap();
    let mut editor =
        ScopeSelectionEditor::open(&resolver, &config.editor, &operator, &super_role).unwrap();
    assert!(matches!(editor.save(&store).await.unwrap(), SaveOutcome::Saved(_)));
    assert_eq!(store.request_count(), 1);
}

#[tokio::test]
async fn test_rejected_write_can_be_cancelled() {
    let catalog = catalog();
    let roles = roles();
    let resolver = EntitlementResolver::new(&catalog).with_roles(&roles);
    let operator = Principal::user("operator").with_role("super_admin");

    let mut editor = ScopeSelectionEditor::open(
        &resolver,
        &EditorConfig::default(),
        &operator,
        &Principal::user("erin"),
    )
    .unwrap();
    editor.toggle("audit");

    let err = editor.save(&RejectingWriter).await.unwrap_err();
    assert!(err.to_string().contains("403 Forbidden"));
    assert_eq!(editor.state(), EditorState::Open);
    assert!(editor.is_selected("audit:export"));

    editor.cancel();
    assert_eq!(editor.state(), EditorState::Closed);
    assert!(!editor.toggle("admin"));
}

#[tokio::test]
async fn test_writer_behind_trait_object() {
    let catalog = catalog();
    let resolver = EntitlementResolver::new(&catalog);
    let operator = Principal::user("operator").with_role("super_admin");
    let writer: Box<dyn AccessWriter> = Box::new(AccessStore::default());

    let mut editor = ScopeSelectionEditor::open(
        &resolver,
        &EditorConfig::default(),
        &operator,
        &Principal::client("app"),
    )
    .unwrap();
    editor.toggle("admin:roles");

    let outcome = editor.save(writer.as_ref()).await.unwrap();
    let SaveOutcome::Saved(update) = outcome else {
        panic!("expected save");
    };
    assert_eq!(update.target.to_string(), "client:app");
}

#[test]
fn test_tree_rows_carry_descriptions() {
    let catalog = catalog();
    let resolver = EntitlementResolver::new(&catalog);
    let operator = Principal::user("operator").with_role("super_admin");
    let editor = ScopeSelectionEditor::open(
        &resolver,
        &EditorConfig::default(),
        &operator,
        &Principal::user("frank"),
    )
    .unwrap();

    let tree = editor.tree();
    assert_eq!(tree.len(), catalog.len());
    assert_eq!(tree[0].name, "admin");
    assert_eq!(tree[0].description, "Administration");
    assert_eq!(tree[0].state, NodeState::Unselected);
    assert_eq!(tree.last().map(|n| (n.name, n.depth)), Some(("audit:export", 1)));
}
