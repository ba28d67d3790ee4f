//! Deferred scroll-into-view of the active sidebar row.
//!
//! After forced-open resolution expands the branches above the current page,
//! the row for that page is scrolled into view once the expanded rows have
//! been laid out. The host owns the clock and the scrolling primitive; this
//! module only decides *when* and *what* to reveal.

use std::time::{Duration, Instant};

use crate::tree::NodePath;

/// Delay between scheduling a reveal and performing it.
pub const DEFAULT_REVEAL_DELAY: Duration = Duration::from_millis(100);

/// Scroll animation style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScrollBehavior {
    /// Animate the scroll.
    #[default]
    Smooth,
    /// Jump directly.
    Instant,
}

/// Which edge of the scroll container the element is aligned with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScrollBlock {
    /// Scroll the minimum distance that makes the element visible.
    #[default]
    Nearest,
    /// Align with the top edge.
    Start,
    /// Center in the container.
    Center,
    /// Align with the bottom edge.
    End,
}

/// Options passed to [`RevealTarget::scroll_into_view`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScrollOptions {
    pub behavior: ScrollBehavior,
    pub block: ScrollBlock,
}

/// Host capability that scrolls a rendered sidebar row into view.
pub trait RevealTarget {
    /// Scroll the row for `path` into view.
    ///
    /// Returns `false` when the row is no longer rendered.
    fn scroll_into_view(&mut self, path: &NodePath, options: ScrollOptions) -> bool;
}

/// What happened when a pending reveal was polled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    /// Nothing was scheduled.
    Idle,
    /// A reveal is scheduled but not yet due.
    Pending,
    /// The row was scrolled into view.
    Revealed(NodePath),
    /// The row disappeared before the reveal fired.
    Missing(NodePath),
}

/// At most one pending scroll-into-view request.
#[derive(Clone, Debug)]
pub struct DeferredReveal {
    delay: Duration,
    options: ScrollOptions,
    pending: Option<(NodePath, Instant)>,
}

impl Default for DeferredReveal {
    fn default() -> Self {
        Self::new(DEFAULT_REVEAL_DELAY)
    }
}

impl DeferredReveal {
    /// Create an idle reveal with the given delay.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            options: ScrollOptions::default(),
            pending: None,
        }
    }

    /// Delay applied by [`schedule`](Self::schedule).
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule a reveal of `path` at `now + delay`, replacing any pending one.
    pub fn schedule(&mut self, path: NodePath, now: Instant) {
        let due = now + self.delay;
        tracing::debug!(path = %path, delay_ms = self.delay.as_millis(), "scheduled reveal");
        self.pending = Some((path, due));
    }

    /// Drop the pending reveal, if any.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Node path of the pending reveal.
    #[must_use]
    pub fn pending(&self) -> Option<&NodePath> {
        self.pending.as_ref().map(|(path, _)| path)
    }

    /// Fire the pending reveal if it is due.
    ///
    /// A fired reveal is consumed whether or not the row still exists.
    pub fn poll(&mut self, now: Instant, target: &mut dyn RevealTarget) -> RevealOutcome {
        match &self.pending {
            None => return RevealOutcome::Idle,
            Some((_, due)) if now < *due => return RevealOutcome::Pending,
            Some(_) => {}
        }
        let Some((path, _)) = self.pending.take() else {
            return RevealOutcome::Idle;
        };

        if target.scroll_into_view(&path, self.options) {
            RevealOutcome::Revealed(path)
        } else {
            tracing::debug!(path = %path, "reveal target missing");
            RevealOutcome::Missing(path)
        }
    }
}
