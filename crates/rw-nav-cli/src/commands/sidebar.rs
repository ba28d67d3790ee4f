//! `rw-nav sidebar` command implementation.

use std::time::Instant;

use clap::Args;
use rw_nav::{RenderedNode, RowKind};

use super::{ConfigArgs, open_store, sidebar_controller};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the sidebar command.
#[derive(Args)]
pub(crate) struct SidebarArgs {
    /// Current page path; its ancestors are expanded and persisted.
    #[arg(short, long)]
    path: Option<String>,

    /// Print the rendered tree as JSON.
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    config: ConfigArgs,
}

impl SidebarArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.config.load()?;

        let mut sidebar = sidebar_controller(&config, open_store(&config))?;
        sidebar.load();

        if let Some(path) = &self.path {
            let update = sidebar.navigate(path, Instant::now());
            if update.matched.is_none() {
                output.warning(&format!("Page {path} is not in the navigation"));
            }
        }

        let rows = sidebar.render();
        if self.json {
            output.line(&serde_json::to_string_pretty(&rows)?);
            return Ok(());
        }

        if let Some(title) = sidebar.section_title() {
            let crumbs: Vec<_> = sidebar
                .breadcrumbs()
                .iter()
                .map(|node| node.title.as_str())
                .collect();
            output.muted(&format!("Section: {title} ({})", crumbs.join(" > ")));
        }
        for (line, is_active) in format_rows(&rows) {
            if is_active {
                output.highlight(&line);
            } else {
                output.line(&line);
            }
        }
        Ok(())
    }
}

/// Lay out rendered rows as indented text lines, flagging the active row.
fn format_rows(rows: &[RenderedNode]) -> Vec<(String, bool)> {
    fn visit(rows: &[RenderedNode], lines: &mut Vec<(String, bool)>) {
        for row in rows {
            let marker = match (row.kind, row.is_open) {
                (RowKind::Toggle | RowKind::LinkWithToggle, true) => "[-]",
                (RowKind::Toggle | RowKind::LinkWithToggle, false) => "[+]",
                (RowKind::Link | RowKind::Label, _) => " - ",
            };
            let mut line = format!("{}{marker} {}", "  ".repeat(row.depth), row.title);
            if let Some(href) = &row.href {
                line.push_str("  ");
                line.push_str(href.as_str());
            }
            if row.is_active {
                line.push_str("  *");
            }
            lines.push((line, row.is_active));
            visit(&row.children, lines);
        }
    }

    let mut lines = Vec::new();
    visit(rows, &mut lines);
    lines
}
