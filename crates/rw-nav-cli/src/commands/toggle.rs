//! `rw-nav toggle` command implementation.

use clap::Args;
use rw_nav::{NavigationTree, NodePath};

use super::{ConfigArgs, open_store, sidebar_controller};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the toggle command.
#[derive(Args)]
pub(crate) struct ToggleArgs {
    /// Node path, e.g. "/Guides/Install".
    node: String,

    #[command(flatten)]
    config: ConfigArgs,
}

impl ToggleArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.config.load()?;
        if !config.store_resolved.enabled {
            output.warning("Persistence is disabled; the change will not be saved");
        }

        let mut sidebar = sidebar_controller(&config, open_store(&config))?;
        sidebar.load();

        let path = find_node(sidebar.tree(), &self.node)?;
        let is_open = sidebar
            .toggle(&path)
            .ok_or_else(|| CliError::Validation(format!("{path} has no children to expand")))?;

        if is_open {
            output.success(&format!("Expanded {path}"));
        } else {
            output.success(&format!("Collapsed {path}"));
        }
        Ok(())
    }
}

/// Resolve a node path key against the tree.
///
/// Matches whole keys, so a title containing `/` resolves as long as its key
/// is unique. Tree construction rejects keys shared by two nodes.
fn find_node(tree: &NavigationTree, key: &str) -> Result<NodePath, CliError> {
    let key = if key.starts_with('/') {
        key.to_owned()
    } else {
        format!("/{key}")
    };
    tree.iter()
        .map(|(path, _)| path)
        .find(|path| path.key() == key)
        .ok_or_else(|| CliError::Validation(format!("no navigation node at {key}")))
}
