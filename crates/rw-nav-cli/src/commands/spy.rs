//! `rw-nav spy` command implementation.

use std::path::PathBuf;

use clap::Args;
use rw_nav::{
    ActivationZone, IntersectionSource, ObservationBatch, ObserverOptions, ScrollSpy,
    SyntheticPage, TableOfContents, TocEntry,
};
use rw_nav_config::ScrollSpyConfig;
use serde::Deserialize;

use super::{ConfigArgs, read_json};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the spy command.
#[derive(Args)]
#[command(group = clap::ArgGroup::new("input").required(true))]
pub(crate) struct SpyArgs {
    /// Table of contents: nested sections or flat heading entries (JSON).
    #[arg(long)]
    toc: PathBuf,

    /// Recorded observation batches (JSON array).
    #[arg(long, group = "input")]
    batches: Option<PathBuf>,

    /// Page layout with heading positions and scroll offsets (JSON).
    #[arg(long, group = "input")]
    layout: Option<PathBuf>,

    /// Print the active id after each step as JSON.
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    config: ConfigArgs,
}

/// Either shape accepted by `--toc`.
#[derive(Deserialize)]
#[serde(untagged)]
enum TocFile {
    Entries(Vec<TocEntry>),
    Sections(TableOfContents),
}

/// Heading position in a `--layout` file.
#[derive(Deserialize)]
struct LayoutHeading {
    id: String,
    top: f64,
    #[serde(default)]
    height: f64,
}

/// Contents of a `--layout` file.
#[derive(Deserialize)]
struct Layout {
    viewport_height: f64,
    document_height: f64,
    headings: Vec<LayoutHeading>,
    scroll: Vec<f64>,
}

/// Source for recorded batches: the headings existed when they were recorded.
struct Recorded;

impl IntersectionSource for Recorded {
    fn resolve(&self, _id: &str) -> bool {
        true
    }

    fn observe(&mut self, _id: &str) {}

    fn unobserve(&mut self, _id: &str) {}
}

impl SpyArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.config.load()?;

        let toc = match read_json::<TocFile>(&self.toc)? {
            TocFile::Entries(entries) => TableOfContents::from_entries(&entries)?,
            TocFile::Sections(toc) => toc,
        };
        let mut spy = scroll_spy(&config.scroll_spy);

        let steps = if let Some(path) = &self.layout {
            replay_layout(&mut spy, &toc, read_json(path)?)
        } else if let Some(path) = &self.batches {
            replay_batches(&mut spy, &toc, &read_json::<Vec<ObservationBatch>>(path)?)
        } else {
            return Err(CliError::Validation(
                "either --batches or --layout is required".to_owned(),
            ));
        };

        if self.json {
            output.line(&serde_json::to_string_pretty(&steps)?);
            return Ok(());
        }

        for (i, active) in steps.iter().enumerate() {
            output.muted(&format!("step {i}: {}", active.as_deref().unwrap_or("-")));
        }
        for row in toc.rows(spy.active()) {
            let line = format!("{}{}  {}", "  ".repeat(usize::from(row.depth)), row.title, row.href);
            if row.is_active {
                output.highlight(&line);
            } else {
                output.line(&line);
            }
        }
        Ok(())
    }
}

/// Build a scroll spy tuned by `config`.
fn scroll_spy(config: &ScrollSpyConfig) -> ScrollSpy {
    ScrollSpy::new(ObserverOptions {
        zone: ActivationZone::new(config.activation_zone),
        thresholds: config.thresholds.clone(),
    })
    .with_bottom_epsilon(config.bottom_epsilon)
}

/// Feed recorded batches, returning the active id after each.
fn replay_batches(
    spy: &mut ScrollSpy,
    toc: &TableOfContents,
    batches: &[ObservationBatch],
) -> Vec<Option<String>> {
    spy.observe(toc.heading_ids(), &mut Recorded);
    batches
        .iter()
        .map(|batch| spy.on_batch(batch).map(str::to_owned))
        .collect()
}

/// Scroll a synthetic page through `layout.scroll`, returning the active id
/// after the initial observation and after each scroll.
fn replay_layout(spy: &mut ScrollSpy, toc: &TableOfContents, layout: Layout) -> Vec<Option<String>> {
    let mut page = SyntheticPage::new(
        layout.viewport_height,
        layout.document_height,
        spy.observer_options().clone(),
    );
    for heading in layout.headings {
        page = page.with_heading(heading.id, heading.top, heading.height);
    }

    spy.observe(toc.heading_ids(), &mut page);
    let mut steps = vec![spy.on_batch(&page.flush()).map(str::to_owned)];
    for y in layout.scroll {
        let batch = page.scroll_to(y);
        steps.push(spy.on_batch(&batch).map(str::to_owned));
    }
    spy.disconnect(&mut page);
    steps
}
