//! Scope catalog module
//!
//! This module models the hierarchical set of named permissions ("scopes")
//! and answers structural queries over the parent forest.
//!
//! # Examples
//!
//! ```
//! use idconsole_authz::scope::{ScopeCatalog, ScopeRecord};
//!
//! let catalog = ScopeCatalog::new(vec![
//!     ScopeRecord::new("admin").with_parent("*"),
//!     ScopeRecord::new("admin:roles").with_parent("admin"),
//! ]).unwrap();
//!
//! assert_eq!(catalog.children_of("admin"), ["admin:roles"]);
//! ```

mod catalog;
mod types;


pub use catalog::{CatalogError, ScopeCatalog};
pub use types::{ScopeRecord, ROOT_SENTINEL};
