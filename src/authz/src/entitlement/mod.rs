//! Entitlement resolution module
//!
//! Decides whether a principal (user, role, or client application) is
//! entitled to a scope:
//!
//! - **Ancestor coverage**: a grant on any ancestor covers all descendants
//! - **Fail closed**: unknown scopes, missing catalogs, missing principals deny
//! - **Super-role bypass**: checked before any catalog lookup
//! - **Role fallback**: optional second check against the principal's role

mod lookup;
mod resolver;

pub use lookup::{GrantLookup, RoleDirectory, RoleLookup};
pub use resolver::{is_authorized, EntitlementResolver, RoleFallback};
