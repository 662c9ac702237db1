//! IdConsole scope tool
//!
//! Runs entitlement checks, renders the editable scope tree, and compacts
//! grant sets against a scope catalog exported as JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use idconsole_authz::config::AuthzConfig;
use idconsole_authz::editor::{compact, NodeState, ScopeSelectionEditor};
use idconsole_authz::entitlement::{EntitlementResolver, RoleDirectory, RoleFallback};
use idconsole_authz::scope::ScopeCatalog;
use idconsole_authz::types::Principal;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// IdConsole scope authorization CLI
#[derive(Parser)]
#[command(name = "scopectl")]
#[command(about = "Inspect scope catalogs and entitlements")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "IDCONSOLE_AUTHZ_CONFIG")]
    config: Option<PathBuf>,

    /// Scope catalog (JSON array of scope records)
    #[arg(long, env = "IDCONSOLE_SCOPES")]
    catalog: PathBuf,

    /// Role catalog (JSON array of roles), used for role fallback
    #[arg(long, env = "IDCONSOLE_ROLES")]
    roles: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check whether a principal is entitled to a scope
    Check {
        /// Principal (JSON object)
        #[arg(short, long)]
        principal: PathBuf,

        /// Required scope name
        scope: String,

        /// Ignore the principal's role grants
        #[arg(long)]
        no_fallback: bool,
    },

    /// Print the scope tree as an operator would edit it for a target
    Tree {
        /// Acting principal (JSON object)
        #[arg(short, long)]
        actor: PathBuf,

        /// Principal being edited (JSON object)
        #[arg(short, long)]
        target: PathBuf,
    },

    /// Drop scopes already covered by a listed ancestor
    Compact {
        /// Scope names
        #[arg(required = true)]
        scopes: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AuthzConfig::load(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => AuthzConfig::default(),
    };

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { config.logging.level.as_str() };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.to_string().into()),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    debug!(?config, "configuration loaded");

    let catalog_json = read(&cli.catalog)?;
    let catalog = ScopeCatalog::from_json(&catalog_json)
        .with_context(|| format!("Invalid scope catalog {:?}", cli.catalog))?;
    info!(scopes = catalog.len(), dangling = catalog.dangling().len(), "scope catalog loaded");

    let roles = match &cli.roles {
        Some(path) => RoleDirectory::from_json(&read(path)?)
            .with_context(|| format!("Invalid role catalog {:?}", path))?,
        None => RoleDirectory::default(),
    };

    let resolver = EntitlementResolver::new(&catalog)
        .with_roles(&roles)
        .with_config(config.resolver.clone());

    match cli.command {
        Command::Check {
            principal,
            scope,
            no_fallback,
        } => {
            let principal = load_principal(&principal)?;
            let fallback = if no_fallback {
                RoleFallback::Disabled
            } else {
                RoleFallback::from(config.resolver.role_fallback)
            };

            let allowed = resolver.is_authorized_for_principal(&scope, Some(&principal), fallback);
            println!(
                "{} {} {}",
                principal.identity(),
                if allowed { "ALLOW" } else { "DENY" },
                scope
            );
        }
        Command::Tree { actor, target } => {
            let actor = load_principal(&actor)?;
            let target = load_principal(&target)?;
            let editor = ScopeSelectionEditor::open(&resolver, &config.editor, &actor, &target)?;

            for node in editor.tree() {
                let mark = match node.state {
                    NodeState::Selected => "[x]",
                    NodeState::Unselected => "[ ]",
                    NodeState::NotGrantable { selected: true } => "(x)",
                    NodeState::NotGrantable { selected: false } => "( )",
                };
                println!("{}{} {}", "  ".repeat(node.depth), mark, node.name);
            }

            if let Some(reason) = editor.permission().refusal() {
                println!("read-only: {}", reason);
            }
        }
        Command::Compact { scopes } => {
            for name in compact(&catalog, &scopes) {
                println!("{}", name);
            }
        }
    }

    Ok(())
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))
}

fn load_principal(path: &Path) -> Result<Principal> {
    serde_json::from_str(&read(path)?).with_context(|| format!("Invalid principal {:?}", path))
}
