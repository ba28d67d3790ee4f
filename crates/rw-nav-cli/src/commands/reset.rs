//! `rw-nav reset` command implementation.

use clap::Args;
use rw_nav_store::KeyValueStore;

use super::{ConfigArgs, expansion_store, open_store, store_summary};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the reset command.
#[derive(Args)]
pub(crate) struct ResetArgs {
    #[command(flatten)]
    config: ConfigArgs,
}

impl ResetArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.config.load()?;
        output.info(&format!("Store: {}", store_summary(&config)));

        let store = open_store(&config);
        let namespace = &config.store_resolved.namespace;
        // Surface I/O problems here; the expansion store only logs them
        store.get(namespace)?;

        let mut expansion = expansion_store(&config, store);
        let entries = expansion.load().len();
        expansion.reset();

        output.success(&format!("Cleared {entries} entries from {namespace}"));
        Ok(())
    }
}
