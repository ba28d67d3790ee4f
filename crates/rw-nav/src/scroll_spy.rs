//! Active heading tracking.
//!
//! [`ScrollSpy`] turns observation batches into a single current heading id:
//!
//! 1. At the bottom of the page the last observed heading wins, so a short
//!    final section can still become current.
//! 2. Otherwise the intersecting heading with the largest ratio wins; on a tie
//!    the entry reported first in the batch is kept.
//! 3. When nothing intersects, the previous id is kept.
//!
//! Every batch is evaluated on its own; the latest batch decides.

use std::collections::HashSet;
use std::sync::mpsc;

use crate::viewport::{IntersectionSource, ObservationBatch, ObserverOptions};

/// Default slack, in pixels, for the bottom-of-page rule.
pub const DEFAULT_BOTTOM_EPSILON: f64 = 10.0;

/// Receiver for active heading changes.
///
/// Wraps a [`std::sync::mpsc::Receiver`]. Each value is the new active id;
/// repeated batches that keep the same id send nothing.
pub struct ActiveHeadingReceiver {
    rx: mpsc::Receiver<String>,
}

impl ActiveHeadingReceiver {
    /// Wait for the next change (blocking).
    ///
    /// Returns `None` when the scroll spy is dropped.
    #[must_use]
    pub fn recv(&self) -> Option<String> {
        self.rx.recv().ok()
    }

    /// Take the next change without blocking.
    #[must_use]
    pub fn try_recv(&self) -> Option<String> {
        self.rx.try_recv().ok()
    }

    /// Iterate over changes until the scroll spy is dropped.
    pub fn iter(&self) -> impl Iterator<Item = String> + '_ {
        self.rx.iter()
    }
}

/// Scroll-position to active-heading state machine.
pub struct ScrollSpy {
    options: ObserverOptions,
    bottom_epsilon: f64,
    observed: Vec<String>,
    observed_set: HashSet<String>,
    active: Option<String>,
    subscribers: Vec<mpsc::Sender<String>>,
}

impl Default for ScrollSpy {
    fn default() -> Self {
        Self::new(ObserverOptions::default())
    }
}

impl ScrollSpy {
    #[must_use]
    pub fn new(options: ObserverOptions) -> Self {
        Self {
            options,
            bottom_epsilon: DEFAULT_BOTTOM_EPSILON,
            observed: Vec::new(),
            observed_set: HashSet::new(),
            active: None,
            subscribers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_bottom_epsilon(mut self, epsilon: f64) -> Self {
        self.bottom_epsilon = epsilon;
        self
    }

    /// Options the host should configure its native observer with.
    #[must_use]
    pub fn observer_options(&self) -> &ObserverOptions {
        &self.options
    }

    /// Current heading id.
    #[must_use]
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Heading ids that resolved and are being observed, in document order.
    #[must_use]
    pub fn observed(&self) -> &[String] {
        &self.observed
    }

    /// Receive every future change of the active id.
    pub fn subscribe(&mut self) -> ActiveHeadingReceiver {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        ActiveHeadingReceiver { rx }
    }

    /// Track `ids` (document order), replacing the previous page's headings.
    ///
    /// The active id starts at the first given id. Ids that do not resolve
    /// through `source` are skipped. Returns the number of observed headings.
    pub fn observe<I, S>(&mut self, ids: I, source: &mut dyn IntersectionSource) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.disconnect(source);

        let mut first = None;
        for id in ids {
            let id = id.as_ref();
            if first.is_none() {
                first = Some(id.to_owned());
            }
            if !source.resolve(id) {
                tracing::debug!(id, "heading not found on page");
                continue;
            }
            if self.observed_set.insert(id.to_owned()) {
                source.observe(id);
                self.observed.push(id.to_owned());
            }
        }

        tracing::debug!(observed = self.observed.len(), "observing headings");
        self.set_active(first);
        self.observed.len()
    }

    /// Stop observing every heading.
    pub fn disconnect(&mut self, source: &mut dyn IntersectionSource) {
        for id in self.observed.drain(..) {
            source.unobserve(&id);
        }
        self.observed_set.clear();
    }

    /// Process one observation batch and return the active id.
    pub fn on_batch(&mut self, batch: &ObservationBatch) -> Option<&str> {
        if self.observed.is_empty() {
            return self.active();
        }

        let next = if batch.metrics.at_bottom(self.bottom_epsilon) {
            self.observed.last().cloned()
        } else {
            self.most_visible(batch)
        };

        if next.is_some() {
            self.set_active(next);
        }
        self.active()
    }

    fn most_visible(&self, batch: &ObservationBatch) -> Option<String> {
        let mut best: Option<&str> = None;
        let mut max_ratio = 0.0;
        for entry in &batch.entries {
            if entry.is_intersecting
                && entry.ratio > max_ratio
                && self.observed_set.contains(&entry.id)
            {
                best = Some(entry.id.as_str());
                max_ratio = entry.ratio;
            }
        }
        best.map(str::to_owned)
    }

    fn set_active(&mut self, next: Option<String>) {
        if self.active == next {
            return;
        }
        tracing::debug!(from = ?self.active, to = ?next, "active heading changed");
        self.active = next;
        if let Some(id) = &self.active {
            self.subscribers.retain(|tx| tx.send(id.clone()).is_ok());
        }
    }
}
