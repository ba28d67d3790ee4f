//! CLI command implementations.

mod reset;
mod sidebar;
mod spy;
mod toggle;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use rw_nav::{DefaultOpen, ExpansionStore, NavigationController, NavigationTree};
use rw_nav_config::{CliSettings, Config};
use rw_nav_store::{FileStore, KeyValueStore, NullStore};
use serde::de::DeserializeOwned;

use crate::error::CliError;

pub(crate) use reset::ResetArgs;
pub(crate) use sidebar::SidebarArgs;
pub(crate) use spy::SpyArgs;
pub(crate) use toggle::ToggleArgs;

/// Configuration options shared by every command.
#[derive(Args)]
pub(crate) struct ConfigArgs {
    /// Path to configuration file (default: auto-discover rw-nav.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Navigation tree file (overrides config).
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// Directory of the persisted state (overrides config).
    #[arg(long, env = "RW_NAV_STATE_DIR")]
    store_dir: Option<PathBuf>,

    /// Key of the persisted state (overrides config).
    #[arg(long)]
    namespace: Option<String>,

    /// Do not read or write persisted state.
    #[arg(long)]
    no_persist: bool,
}

impl ConfigArgs {
    /// Load the configuration with these overrides applied.
    pub(crate) fn load(&self) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            source: self.source.clone(),
            store_dir: self.store_dir.clone(),
            namespace: self.namespace.clone(),
            persist: self.no_persist.then_some(false),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        match &config.config_path {
            Some(path) => tracing::info!(path = %path.display(), "Loaded config"),
            None => tracing::info!("No rw-nav.toml found, using defaults"),
        }
        tracing::info!(
            source = %config.navigation_resolved.source.display(),
            store = %store_summary(&config),
            "Resolved navigation settings"
        );
        Ok(config)
    }
}

/// Describe where expansion state lives, e.g. `.rw/nav-state (quartz-open-sections)`.
pub(crate) fn store_summary(config: &Config) -> String {
    let store = &config.store_resolved;
    if store.enabled {
        format!("{} ({})", store.dir.display(), store.namespace)
    } else {
        "persistence disabled".to_owned()
    }
}

/// Open the persisted store described by `config`.
pub(crate) fn open_store(config: &Config) -> Arc<dyn KeyValueStore> {
    if config.store_resolved.enabled {
        Arc::new(FileStore::new(config.store_resolved.dir.clone()))
    } else {
        Arc::new(NullStore)
    }
}

/// Build an unloaded expansion store for `config`.
pub(crate) fn expansion_store(config: &Config, store: Arc<dyn KeyValueStore>) -> ExpansionStore {
    ExpansionStore::new(store, config.store_resolved.namespace.clone()).with_default_open(
        DefaultOpen::new(config.navigation_resolved.default_open.iter().cloned()),
    )
}

/// Load the navigation tree and build a sidebar controller for `config`.
pub(crate) fn sidebar_controller(
    config: &Config,
    store: Arc<dyn KeyValueStore>,
) -> Result<NavigationController, CliError> {
    let tree = NavigationTree::load(&config.navigation_resolved.source)?;
    Ok(
        NavigationController::new(Arc::new(tree), expansion_store(config, store))
            .with_reveal_delay(config.reveal.delay()),
    )
}

/// Read and decode a JSON file.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| CliError::Json {
        path: path.display().to_string(),
        source,
    })
}
