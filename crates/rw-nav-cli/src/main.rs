//! RW navigation CLI.
//!
//! Provides commands for:
//! - `sidebar`: Render the sidebar for a page with persisted expansion state
//! - `toggle`: Expand or collapse one sidebar node and persist it
//! - `reset`: Forget all persisted expansion state
//! - `spy`: Replay scroll observations and report the active heading

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ResetArgs, SidebarArgs, SpyArgs, ToggleArgs};
use output::Output;

/// RW navigation - sidebar and table-of-contents state.
#[derive(Parser)]
#[command(name = "rw-nav", version, about)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the sidebar tree for a page.
    Sidebar(SidebarArgs),
    /// Expand or collapse a sidebar node.
    Toggle(ToggleArgs),
    /// Clear persisted expansion state.
    Reset(ResetArgs),
    /// Replay scroll observations through the scroll spy.
    Spy(SpyArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Sidebar(args) => args.execute(),
        Commands::Toggle(args) => args.execute(),
        Commands::Reset(args) => args.execute(),
        Commands::Spy(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
