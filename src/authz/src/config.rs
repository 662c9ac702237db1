//! Engine configuration loading and validation

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{AuthzError, Result};
use crate::scope::ROOT_SENTINEL;

/// Role id that bypasses every scope check unless configured otherwise
pub const DEFAULT_SUPER_ROLE: &str = "super_admin";

/// Scope an operator needs before editing anyone's access
pub const DEFAULT_ACCESS_SCOPE: &str = "admin:profile:access:write";

/// Complete engine configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthzConfig {
    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub editor: EditorConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResolverConfig {
    /// Role id whose holders are authorized for everything
    #[serde(default = "default_super_role")]
    pub super_role: String,

    /// Default for checks that do not pick a fallback mode explicitly
    #[serde(default = "default_true")]
    pub role_fallback: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EditorConfig {
    /// Scope the acting principal must hold to edit access; empty disables the check
    #[serde(default = "default_access_scope")]
    pub access_scope: String,

    /// Refuse edits to the super-role's own grant set
    #[serde(default = "default_true")]
    pub protect_super_role: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            super_role: default_super_role(),
            role_fallback: true,
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            access_scope: default_access_scope(),
            protect_super_role: true,
        }
    }
}

impl EditorConfig {
    /// Required access scope, if the check is enabled
    pub fn required_access_scope(&self) -> Option<&str> {
        let scope = self.access_scope.trim();
        (!scope.is_empty()).then_some(scope)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_true() -> bool { true }
fn default_super_role() -> String { DEFAULT_SUPER_ROLE.to_string() }
fn default_access_scope() -> String { DEFAULT_ACCESS_SCOPE.to_string() }
fn default_log_level() -> String { "info".to_string() }

impl AuthzConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AuthzConfig = toml::from_str(contents)
            .map_err(|e| AuthzError::Config(format!("Failed to parse configuration: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let super_role = self.resolver.super_role.trim();

        if super_role.is_empty() {
            return Err(AuthzError::Config("resolver.super_role cannot be empty".to_string()));
        }

        if super_role == ROOT_SENTINEL {
            return Err(AuthzError::Config(format!(
                "resolver.super_role cannot be the root sentinel '{}'",
                ROOT_SENTINEL
            )));
        }

        if self.logging.level.trim().is_empty() {
            return Err(AuthzError::Config("logging.level cannot be empty".to_string()));
        }

        Ok(())
    }
}
