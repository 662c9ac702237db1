//! Scope selection editing
//!
//! An operator opens a [`ScopeSelectionEditor`] for one target principal,
//! toggles scopes in a cascading tree, and saves. Saving compacts the
//! selection and hands it to an [`AccessWriter`]; the editor never persists
//! anything itself.
//!
//! # Example
//!
//! ```
//! use idconsole_authz::config::EditorConfig;
//! use idconsole_authz::editor::ScopeSelectionEditor;
//! use idconsole_authz::entitlement::EntitlementResolver;
//! use idconsole_authz::scope::{ScopeCatalog, ScopeRecord};
//! use idconsole_authz::types::Principal;
//!
//! let catalog = ScopeCatalog::new(vec![
//!     ScopeRecord::new("admin:profile"),
//!     ScopeRecord::new("admin:profile:write").with_parent("admin:profile"),
//!     ScopeRecord::new("admin:profile:read").with_parent("admin:profile"),
//! ]).unwrap();
//! let resolver = EntitlementResolver::new(&catalog);
//!
//! let operator = Principal::user("op").with_scopes(["admin:profile"]);
//! let target = Principal::user("alice");
//!
//! let mut editor = ScopeSelectionEditor::open(&resolver, &EditorConfig::default(), &operator, &target).unwrap();
//! editor.toggle("admin:profile:write");
//! editor.toggle("admin:profile:read");
//!
//! // Both children selected, so the parent is selected too and compaction keeps only it
//! assert!(editor.is_selected("admin:profile"));
//! assert_eq!(editor.compacted().len(), 1);
//! ```

mod access;
mod compact;
mod selection;


pub use access::{
    edit_permission, AccessUpdate, AccessWriter, EditPermission, RefusalReason, SaveOutcome,
};
pub use compact::compact;
pub use selection::{EditorState, NodeState, ScopeNode, ScopeSelectionEditor};
