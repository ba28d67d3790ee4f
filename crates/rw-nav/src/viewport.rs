//! Viewport geometry and the intersection-observation capability.
//!
//! The scroll spy consumes batches of [`IntersectionEntry`]s plus the page's
//! [`ScrollMetrics`]. Browser hosts produce entries from their native
//! intersection primitive configured with [`ObserverOptions`]; other hosts can
//! compute them with [`ActivationZone::measure`], and [`SyntheticPage`] drives
//! a whole page layout for replay and tests.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Default top fraction of the viewport where headings become current.
pub const DEFAULT_ACTIVATION_ZONE: f64 = 0.4;

/// Default intersection-ratio thresholds that trigger an observation.
pub const DEFAULT_THRESHOLDS: [f64; 4] = [0.0, 0.1, 0.5, 1.0];

/// Scroll position and page size, in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollMetrics {
    pub scroll_y: f64,
    pub viewport_height: f64,
    pub document_height: f64,
}

impl ScrollMetrics {
    /// Whether the viewport bottom is within `epsilon` of the document end.
    #[must_use]
    pub fn at_bottom(&self, epsilon: f64) -> bool {
        self.viewport_height + self.scroll_y >= self.document_height - epsilon
    }
}

/// Heading bounding box relative to the viewport top.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadingRect {
    pub top: f64,
    pub height: f64,
}

impl HeadingRect {
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Visibility of one heading inside the activation zone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntersectionEntry {
    /// Heading element id.
    pub id: String,
    pub is_intersecting: bool,
    /// Visible fraction of the heading inside the zone, `0.0..=1.0`.
    #[serde(default)]
    pub ratio: f64,
}

/// Entries delivered together, with the metrics at delivery time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationBatch {
    pub entries: Vec<IntersectionEntry>,
    pub metrics: ScrollMetrics,
}

/// The top band of the viewport in which a heading counts as current.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActivationZone {
    fraction: f64,
}

impl Default for ActivationZone {
    fn default() -> Self {
        Self {
            fraction: DEFAULT_ACTIVATION_ZONE,
        }
    }
}

impl ActivationZone {
    /// Zone covering the top `fraction` of the viewport.
    ///
    /// `fraction` is clamped to `0.0..=1.0`.
    #[must_use]
    pub fn new(fraction: f64) -> Self {
        Self {
            fraction: fraction.clamp(0.0, 1.0),
        }
    }

    #[must_use]
    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    /// Intersect a heading with the zone of a viewport `viewport_height` tall.
    ///
    /// Edges touching counts as intersecting. A zero-height heading is either
    /// fully inside (ratio 1) or outside.
    #[must_use]
    pub fn measure(&self, id: &str, rect: HeadingRect, viewport_height: f64) -> IntersectionEntry {
        let zone_bottom = viewport_height * self.fraction;
        let is_intersecting = rect.top <= zone_bottom && rect.bottom() >= 0.0;

        let ratio = if !is_intersecting {
            0.0
        } else if rect.height <= 0.0 {
            1.0
        } else {
            let visible = rect.bottom().min(zone_bottom) - rect.top.max(0.0);
            (visible / rect.height).clamp(0.0, 1.0)
        };

        IntersectionEntry {
            id: id.to_owned(),
            is_intersecting,
            ratio,
        }
    }
}

/// Configuration for a native intersection observer.
#[derive(Clone, Debug, PartialEq)]
pub struct ObserverOptions {
    pub zone: ActivationZone,
    pub thresholds: Vec<f64>,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            zone: ActivationZone::default(),
            thresholds: DEFAULT_THRESHOLDS.to_vec(),
        }
    }
}

impl ObserverOptions {
    /// CSS root margin shrinking the observed area to the zone.
    ///
    /// The default zone yields `0px 0px -60% 0px`.
    #[must_use]
    pub fn root_margin_css(&self) -> String {
        let excluded = ((1.0 - self.zone.fraction()) * 100.0).round();
        format!("0px 0px -{excluded}% 0px")
    }

    /// Number of thresholds at or below `ratio`.
    fn bucket(&self, entry: &IntersectionEntry) -> usize {
        if !entry.is_intersecting {
            return 0;
        }
        self.thresholds.iter().filter(|&&t| entry.ratio >= t).count()
    }
}

/// Host capability that locates and watches heading elements.
pub trait IntersectionSource {
    /// Whether a heading element with `id` exists on the page.
    fn resolve(&self, id: &str) -> bool;

    /// Start reporting intersection changes for `id`.
    fn observe(&mut self, id: &str);

    /// Stop reporting intersection changes for `id`.
    fn unobserve(&mut self, id: &str);
}

/// Page layout that produces observation batches as it is scrolled.
///
/// Mirrors a native observer: each observed heading reports once when
/// observation starts, and afterwards only when it enters, leaves, or crosses
/// a threshold.
#[derive(Clone, Debug)]
pub struct SyntheticPage {
    options: ObserverOptions,
    viewport_height: f64,
    document_height: f64,
    scroll_y: f64,
    headings: HashMap<String, HeadingRect>,
    observed: Vec<String>,
    buckets: HashMap<String, usize>,
    queued: Vec<IntersectionEntry>,
}

impl SyntheticPage {
    /// Empty page scrolled to the top.
    #[must_use]
    pub fn new(viewport_height: f64, document_height: f64, options: ObserverOptions) -> Self {
        Self {
            options,
            viewport_height,
            document_height,
            scroll_y: 0.0,
            headings: HashMap::new(),
            observed: Vec::new(),
            buckets: HashMap::new(),
            queued: Vec::new(),
        }
    }

    /// Add a heading at document offset `top`.
    #[must_use]
    pub fn with_heading(mut self, id: impl Into<String>, top: f64, height: f64) -> Self {
        self.headings.insert(id.into(), HeadingRect { top, height });
        self
    }

    /// Remove a heading, as when the content is re-rendered.
    pub fn remove_heading(&mut self, id: &str) {
        self.headings.remove(id);
    }

    #[must_use]
    pub fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics {
            scroll_y: self.scroll_y,
            viewport_height: self.viewport_height,
            document_height: self.document_height,
        }
    }

    /// Ids currently observed, in registration order.
    #[must_use]
    pub fn observed(&self) -> &[String] {
        &self.observed
    }

    /// Deliver the initial entries queued by [`observe`](IntersectionSource::observe).
    pub fn flush(&mut self) -> ObservationBatch {
        ObservationBatch {
            entries: std::mem::take(&mut self.queued),
            metrics: self.metrics(),
        }
    }

    /// Scroll to `scroll_y` and deliver the entries that changed.
    ///
    /// The position is clamped to the scrollable range.
    pub fn scroll_to(&mut self, scroll_y: f64) -> ObservationBatch {
        let max_scroll = (self.document_height - self.viewport_height).max(0.0);
        self.scroll_y = scroll_y.clamp(0.0, max_scroll);

        let mut entries = std::mem::take(&mut self.queued);
        for id in &self.observed {
            let Some(entry) = self.entry(id) else {
                continue;
            };
            let bucket = self.options.bucket(&entry);
            if self.buckets.insert(id.clone(), bucket) != Some(bucket) {
                entries.push(entry);
            }
        }

        ObservationBatch {
            entries,
            metrics: self.metrics(),
        }
    }

    fn entry(&self, id: &str) -> Option<IntersectionEntry> {
        let rect = self.headings.get(id)?;
        let in_viewport = HeadingRect {
            top: rect.top - self.scroll_y,
            height: rect.height,
        };
        Some(self.options.zone.measure(id, in_viewport, self.viewport_height))
    }
}

impl IntersectionSource for SyntheticPage {
    fn resolve(&self, id: &str) -> bool {
        self.headings.contains_key(id)
    }

    fn observe(&mut self, id: &str) {
        let Some(entry) = self.entry(id) else {
            return;
        };
        self.buckets.insert(id.to_owned(), self.options.bucket(&entry));
        self.observed.push(id.to_owned());
        self.queued.push(entry);
    }

    fn unobserve(&mut self, id: &str) {
        self.observed.retain(|observed| observed != id);
        self.buckets.remove(id);
        self.queued.retain(|entry| entry.id != id);
    }
}
