//! # IdConsole Scope Authorization Engine
//!
//! Hierarchical scope model, entitlement checks, and cascading grant editing
//! for the identity admin console.
//!
//! ## Features
//!
//! - **Scope catalog** built once from a flat record list, with parent/child traversal
//! - **Ancestor coverage**: a grant on a parent scope covers its whole subtree
//! - **Fail-closed resolution** with super-role bypass and role fallback
//! - **Cascading selection editor** with compaction before persistence
//! - **Self-edit protection** for access updates
//!
//! ## Example
//!
//! ```rust
//! use idconsole_authz::{EntitlementResolver, Principal, ScopeCatalog, ScopeRecord};
//!
//! let catalog = ScopeCatalog::new(vec![
//!     ScopeRecord::new("admin").with_parent("*"),
//!     ScopeRecord::new("admin:profile").with_parent("admin"),
//!     ScopeRecord::new("admin:profile:write").with_parent("admin:profile"),
//! ])?;
//!
//! let resolver = EntitlementResolver::new(&catalog);
//! let alice = Principal::user("alice").with_scopes(["admin:profile"]);
//!
//! assert!(resolver.permits("admin:profile:write", &alice));
//! assert!(!resolver.permits("admin", &alice));
//! # Ok::<(), idconsole_authz::CatalogError>(())
//! ```

pub mod config;
pub mod editor;
pub mod entitlement;
pub mod error;
pub mod scope;
pub mod types;

// Re-export commonly used types
pub use config::AuthzConfig;
pub use editor::{
    compact, AccessUpdate, AccessWriter, EditPermission, RefusalReason, SaveOutcome,
    ScopeSelectionEditor,
};
pub use entitlement::{is_authorized, EntitlementResolver, RoleDirectory, RoleFallback};
pub use error::{AuthzError, Result};
pub use scope::{CatalogError, ScopeCatalog, ScopeRecord};
pub use types::{Principal, PrincipalKind, PrincipalRef, Role, RoleId, ScopeName};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
