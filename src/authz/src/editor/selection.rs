//! Cascading scope selection editor
//!
//! The editor keeps a working selection while an operator edits one
//! principal's grants. The selection always starts as the target's
//! authorized closure, so a parent-level grant pre-selects its whole subtree
//! exactly as the resolver would authorize it.
//!
//! Toggle rules:
//! - Select: the scope and all descendants become selected; each ancestor
//!   whose children are now all selected is selected too, walking upward
//!   until one is not
//! - Deselect: the scope and all descendants are cleared; each selected
//!   ancestor that now has an unselected child is cleared too, walking
//!   upward until an ancestor is already unselected

use std::collections::BTreeSet;
use tracing::{debug, error, info, warn};

use super::access::{
    edit_permission, AccessUpdate, AccessWriter, EditPermission, RefusalReason, SaveOutcome,
};
use super::compact::compact;
use crate::config::EditorConfig;
use crate::entitlement::EntitlementResolver;
use crate::error::{AuthzError, Result};
use crate::scope::ScopeCatalog;
use crate::types::{Principal, PrincipalRef};

/// Editor lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    /// Accepting toggles
    Open,
    /// Saved or cancelled; the instance should be discarded
    Closed,
}

/// Render state of one scope checkbox
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Selected,
    Unselected,
    /// The acting principal may not grant this scope; toggling is a no-op
    NotGrantable { selected: bool },
}

impl NodeState {
    pub fn is_selected(&self) -> bool {
        matches!(self, Self::Selected | Self::NotGrantable { selected: true })
    }
}

/// One row of the rendered scope tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeNode<'a> {
    pub name: &'a str,
    pub description: &'a str,
    /// Number of ancestors above this scope
    pub depth: usize,
    pub state: NodeState,
}

/// Stateful cascading multi-select over a scope catalog
pub struct ScopeSelectionEditor<'a> {
    catalog: &'a ScopeCatalog,
    actor: PrincipalRef,
    target: PrincipalRef,
    selected: BTreeSet<String>,
    grantable: BTreeSet<String>,
    permission: EditPermission,
    state: EditorState,
}

impl<'a> ScopeSelectionEditor<'a> {
    /// Open an editor for `target`, acting as `actor`
    ///
    /// # Errors
    ///
    /// Returns `AuthzError::CatalogUnavailable` if the resolver has no catalog.
    pub fn open(
        resolver: &EntitlementResolver<'a>,
        config: &EditorConfig,
        actor: &Principal,
        target: &Principal,
    ) -> Result<Self> {
        let catalog = resolver.catalog().ok_or(AuthzError::CatalogUnavailable)?;

        let selected = resolver.authorized_closure(&target.granted_scopes);
        let grantable = resolver.entitled_scopes(actor);
        let permission = edit_permission(resolver, config, actor, target);

        debug!(
            actor = %actor.identity(),
            subject = %target.identity(),
            selected = selected.len(),
            grantable = grantable.len(),
            can_edit = permission.is_allowed(),
            "scope editor opened"
        );

        Ok(Self {
            catalog,
            actor: actor.identity(),
            target: target.identity(),
            selected,
            grantable,
            permission,
            state: EditorState::Open,
        })
    }

    /// Current working selection (never compacted)
    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.contains(name)
    }

    /// Whether the acting principal may toggle this scope
    pub fn is_grantable(&self, name: &str) -> bool {
        self.grantable.contains(name)
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn target(&self) -> &PrincipalRef {
        &self.target
    }

    /// Whether a save would be sent
    pub fn can_edit(&self) -> bool {
        self.permission.is_allowed()
    }

    pub fn permission(&self) -> &EditPermission {
        &self.permission
    }

    /// Render state of one scope, `None` if the catalog does not know it
    pub fn node_state(&self, name: &str) -> Option<NodeState> {
        if !self.catalog.contains(name) {
            return None;
        }

        let selected = self.is_selected(name);
        Some(match (self.is_grantable(name), selected) {
            (false, selected) => NodeState::NotGrantable { selected },
            (true, true) => NodeState::Selected,
            (true, false) => NodeState::Unselected,
        })
    }

    /// Whole catalog as pre-order rows, roots in catalog order
    pub fn tree(&self) -> Vec<ScopeNode<'a>> {
        let catalog = self.catalog;
        let mut rows = Vec::with_capacity(catalog.len());

        for root in catalog.roots() {
            for name in std::iter::once(root).chain(catalog.descendants_of(root)) {
                let (Some(record), Some(state)) = (catalog.get(name), self.node_state(name)) else {
                    continue;
                };
                rows.push(ScopeNode {
                    name: record.name.as_str(),
                    description: record.description.as_str(),
                    depth: catalog.ancestors_of(name).len(),
                    state,
                });
            }
        }

        rows
    }

    /// Flip one scope, cascading down to descendants and up through ancestors
    ///
    /// Returns `false` without changing anything when the editor is closed,
    /// the scope is unknown, or the acting principal may not grant it.
    pub fn toggle(&mut self, name: &str) -> bool {
        if self.state != EditorState::Open {
            debug!(scope = name, "toggle ignored: editor closed");
            return false;
        }

        if !self.catalog.contains(name) {
            debug!(scope = name, "toggle ignored: unknown scope");
            return false;
        }

        if !self.is_grantable(name) {
            debug!(scope = name, actor = %self.actor, "toggle ignored: scope not grantable");
            return false;
        }

        if self.selected.contains(name) {
            self.deselect_cascade(name);
        } else {
            self.select_cascade(name);
        }

        true
    }

    fn select_cascade(&mut self, name: &str) {
        let catalog = self.catalog;

        self.selected.insert(name.to_string());
        for descendant in catalog.descendants_of(name) {
            self.selected.insert(descendant.to_string());
        }

        for ancestor in catalog.ancestors_of(name) {
            let all_children_selected = catalog
                .children_of(ancestor)
                .iter()
                .all(|child| self.selected.contains(child));

            if !all_children_selected {
                break;
            }
            self.selected.insert(ancestor.to_string());
        }

        debug!(scope = name, selected = self.selected.len(), "scope selected");
    }

    fn deselect_cascade(&mut self, name: &str) {
        let catalog = self.catalog;

        self.selected.remove(name);
        for descendant in catalog.descendants_of(name) {
            self.selected.remove(descendant);
        }

        for ancestor in catalog.ancestors_of(name) {
            if !self.selected.contains(ancestor) {
                break;
            }

            let any_child_unselected = catalog
                .children_of(ancestor)
                .iter()
                .any(|child| !self.selected.contains(child));

            if !any_child_unselected {
                break;
            }
            self.selected.remove(ancestor);
        }

        debug!(scope = name, selected = self.selected.len(), "scope deselected");
    }

    /// Minimal grant set equivalent to the current selection
    pub fn compacted(&self) -> BTreeSet<String> {
        compact(self.catalog, &self.selected)
    }

    /// Payload a save would send, without sending it
    pub fn pending_update(&self) -> AccessUpdate {
        AccessUpdate::new(self.target.clone(), self.compacted())
    }

    /// Hand the compacted selection to the access writer
    ///
    /// A refused save makes no call. A failed write leaves the editor open
    /// with its selection untouched so the operator can retry or cancel.
    pub async fn save<W>(&mut self, writer: &W) -> Result<SaveOutcome>
    where
        W: AccessWriter + ?Sized,
    {
        if self.state != EditorState::Open {
            return Ok(SaveOutcome::Refused(RefusalReason::Closed));
        }

        if let EditPermission::Refused(reason) = &self.permission {
            warn!(actor = %self.actor, subject = %self.target, %reason, "access update refused");
            return Ok(SaveOutcome::Refused(reason.clone()));
        }

        let update = self.pending_update();

        match writer.update_access(&update).await {
            Ok(()) => {
                info!(
                    actor = %self.actor,
                    subject = %self.target,
                    request_id = %update.request_id,
                    scopes = update.scopes.len(),
                    "access updated"
                );
                self.state = EditorState::Closed;
                Ok(SaveOutcome::Saved(update))
            }
            Err(e) => {
                error!(
                    subject = %self.target,
                    request_id = %update.request_id,
                    error = %e,
                    "access update failed"
                );
                Err(match e {
                    AuthzError::AccessWrite(_) => e,
                    other => AuthzError::AccessWrite(other.to_string()),
                })
            }
        }
    }

    /// Close without saving
    pub fn cancel(&mut self) {
        if self.state == EditorState::Open {
            debug!(subject = %self.target, "scope editor cancelled");
            self.state = EditorState::Closed;
        }
    }
}

impl std::fmt::Debug for ScopeSelectionEditor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeSelectionEditor")
            .field("actor", &self.actor)
            .field("target", &self.target)
            .field("selected", &self.selected)
            .field("permission", &self.permission)
            .field("state", &self.state)
            .finish()
    }
}
