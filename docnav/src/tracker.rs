//! Active-section tracking
//!
//! Keeps a registry of rendered headings and their vertical positions and
//! decides which section is "current" for a given scroll position. The
//! tracker never reads positions itself: each registered heading supplies a
//! [`PositionSource`], so any layout engine (a browser, a terminal pager, a
//! precomputed positions file) can drive it.

mod hub;

pub use hub::{ListenerHost, SubscriptionId, ViewportEvent, ViewportEventKind, ViewportHub};

use crate::outline::AncestorMap;
use serde::{Deserialize, Serialize};

/// Source of a rendered heading's vertical position
pub trait PositionSource {
    /// Current top offset relative to the scroll root
    fn top(&self) -> f64;

    /// The element's own leading margin
    fn leading_margin(&self) -> f64 {
        0.0
    }

    /// Top offset with the leading margin removed
    fn effective_top(&self) -> f64 {
        self.top() - self.leading_margin()
    }
}

/// A fixed position, e.g. from a precomputed layout
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StaticPosition {
    /// Top offset relative to the scroll root
    pub top: f64,
    /// Leading margin of the element
    #[serde(default)]
    pub margin: f64,
}

impl StaticPosition {
    /// Position with no margin
    pub fn at(top: f64) -> Self {
        Self { top, margin: 0.0 }
    }
}

impl PositionSource for StaticPosition {
    fn top(&self) -> f64 {
        self.top
    }

    fn leading_margin(&self) -> f64 {
        self.margin
    }
}

impl<F> PositionSource for F
where
    F: Fn() -> f64,
{
    fn top(&self) -> f64 {
        self()
    }
}

/// How the scroll position is rounded before comparing against headings
///
/// `Ceil` compensates for scroll positions that land a fraction of a pixel
/// short of a heading after jumping to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBias {
    /// Round the scroll position up
    #[default]
    Ceil,
    /// Use the scroll position as-is
    Exact,
}

impl ScrollBias {
    fn apply(self, scroll_y: f64) -> f64 {
        match self {
            ScrollBias::Ceil => scroll_y.ceil(),
            ScrollBias::Exact => scroll_y,
        }
    }
}

/// Tracker tunables
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerOptions {
    /// Offset added to the scroll position (e.g. a sticky header height)
    pub offset: f64,
    /// Scroll rounding
    pub scroll_bias: ScrollBias,
}

/// The currently active section and its ancestor chain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActiveSectionState {
    /// Id of the active section; empty when nothing is registered
    pub active_id: String,
    /// Ancestor ids of the active section, root first
    pub active_ancestor_ids: Vec<String>,
}

/// A registered heading
struct RegistryEntry {
    id: String,
    source: Box<dyn PositionSource>,
}

/// Tracks which section is active as the view scrolls
pub struct ActiveSectionTracker {
    /// Registered headings in registration order
    entries: Vec<RegistryEntry>,
    ancestors: AncestorMap,
    bias: ScrollBias,
    /// Arguments of the most recent recompute
    last_scroll_y: f64,
    last_offset: f64,
    state: ActiveSectionState,
}

impl ActiveSectionTracker {
    /// Create an empty tracker for a document's ancestor map
    pub fn new(ancestors: AncestorMap) -> Self {
        Self::with_options(ancestors, TrackerOptions::default())
    }

    /// Create an empty tracker with explicit options
    pub fn with_options(ancestors: AncestorMap, options: TrackerOptions) -> Self {
        Self {
            entries: Vec::new(),
            ancestors,
            bias: options.scroll_bias,
            last_scroll_y: 0.0,
            last_offset: options.offset,
            state: ActiveSectionState::default(),
        }
    }

    /// Register a rendered heading and recompute immediately
    ///
    /// Registering an id that is already present replaces its position
    /// source and keeps its place in registration order.
    pub fn register(&mut self, id: impl Into<String>, source: impl PositionSource + 'static) {
        let id = id.into();
        let source: Box<dyn PositionSource> = Box::new(source);

        match self.entries.iter_mut().find(|entry| entry.id == id) {
            Some(entry) => entry.source = source,
            None => self.entries.push(RegistryEntry { id, source }),
        }

        self.recompute_last();
    }

    /// Remove a heading; unknown ids are ignored
    pub fn unregister(&mut self, id: &str) {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);

        if self.entries.len() != before {
            self.recompute_last();
        }
    }

    /// Replace the ancestor map after the document changed
    pub fn set_ancestors(&mut self, ancestors: AncestorMap) {
        self.ancestors = ancestors;
        self.recompute_last();
    }

    /// Recompute the active section for a scroll position
    ///
    /// The active section is the last heading (by position) whose effective
    /// top is at or above `scroll_y + offset`. When no heading has been
    /// reached yet, the topmost heading on the page is active.
    pub fn recompute(&mut self, scroll_y: f64, offset: f64) -> &ActiveSectionState {
        self.last_scroll_y = scroll_y;
        self.last_offset = offset;

        let mut positioned: Vec<(f64, &str)> = self
            .entries
            .iter()
            .map(|entry| (entry.source.effective_top(), entry.id.as_str()))
            .collect();
        // Stable: equal tops keep registration order
        positioned.sort_by(|a, b| a.0.total_cmp(&b.0));

        let threshold = self.bias.apply(scroll_y) + offset;
        let active_id = positioned
            .iter()
            .rev()
            .find(|(top, _)| *top <= threshold)
            .or_else(|| positioned.first())
            .map(|(_, id)| (*id).to_string())
            .unwrap_or_default();

        let active_ancestor_ids = self.ancestors.ancestors_of(&active_id);

        if active_id != self.state.active_id {
            log::debug!("Active section: '{}' -> '{}'", self.state.active_id, active_id);
        }

        self.state = ActiveSectionState {
            active_id,
            active_ancestor_ids,
        };
        &self.state
    }

    /// Recompute with the arguments of the previous call
    fn recompute_last(&mut self) {
        self.recompute(self.last_scroll_y, self.last_offset);
    }

    /// React to a viewport event from a [`ViewportHub`]
    pub fn handle_event(&mut self, event: ViewportEvent) -> &ActiveSectionState {
        self.recompute(event.scroll_y, self.last_offset)
    }

    /// Current state
    pub fn state(&self) -> &ActiveSectionState {
        &self.state
    }

    /// Id of the active section (empty when nothing is registered)
    pub fn active_id(&self) -> &str {
        &self.state.active_id
    }

    /// Ancestor ids of the active section
    pub fn active_ancestor_ids(&self) -> &[String] {
        &self.state.active_ancestor_ids
    }

    /// Whether `id` is the active section or one of its ancestors
    pub fn is_on_active_path(&self, id: &str) -> bool {
        self.state.active_id == id || self.state.active_ancestor_ids.iter().any(|a| a == id)
    }

    /// Number of registered headings
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no headings are registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One rendered heading in a positions file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HeadingPosition {
    /// Heading id, as produced by the slugger
    pub id: String,
    /// Top offset relative to the scroll root
    pub top: f64,
    /// Leading margin of the heading element
    #[serde(default)]
    pub margin: f64,
}

/// Precomputed heading positions, as written by a layout pass
///
/// ```toml
/// [[heading]]
/// id = "intro"
/// top = 0.0
///
/// [[heading]]
/// id = "usage"
/// top = 420.0
/// margin = 16.0
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HeadingPositions {
    /// Headings in file order
    #[serde(default)]
    pub heading: Vec<HeadingPosition>,
}

impl HeadingPositions {
    /// Parse a positions file
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Register every position with `tracker`, in file order
    pub fn register_all(&self, tracker: &mut ActiveSectionTracker) {
        for entry in &self.heading {
            tracker.register(
                entry.id.clone(),
                StaticPosition {
                    top: entry.top,
                    margin: entry.margin,
                },
            );
        }
    }
}

impl std::fmt::Debug for ActiveSectionTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveSectionTracker")
            .field("ids", &self.entries.iter().map(|e| &e.id).collect::<Vec<_>>())
            .field("bias", &self.bias)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::{build_outline, Heading};
    use std::cell::Cell;
    use std::rc::Rc;

    fn tracker_with(tops: &[(&str, f64)]) -> ActiveSectionTracker {
        let mut tracker = ActiveSectionTracker::new(AncestorMap::default());
        for (id, top) in tops {
            tracker.register(*id, StaticPosition::at(*top));
        }
        tracker
    }

    #[test]
    fn test_empty_registry_has_no_active_id() {
        let mut tracker = ActiveSectionTracker::new(AncestorMap::default());
        assert_eq!(tracker.recompute(500.0, 0.0).active_id, "");
        assert!(tracker.active_ancestor_ids().is_empty());
    }

    #[test]
    fn test_last_reached_heading_is_active() {
        let mut tracker = tracker_with(&[("a", 0.0), ("b", 100.0), ("c", 300.0)]);

        assert_eq!(tracker.recompute(50.0, 0.0).active_id, "a");
        assert_eq!(tracker.recompute(150.0, 0.0).active_id, "b");
        assert_eq!(tracker.recompute(300.0, 0.0).active_id, "c");
        assert_eq!(tracker.recompute(10_000.0, 0.0).active_id, "c");
    }

    #[test]
    fn test_heading_at_exact_scroll_position_is_reached() {
        let mut tracker = tracker_with(&[("a", 0.0), ("b", 100.0), ("c", 300.0)]);
        assert_eq!(tracker.recompute(0.0, 0.0).active_id, "a");
        assert_eq!(tracker.recompute(100.0, 0.0).active_id, "b");
    }

    #[test]
    fn test_first_heading_is_active_before_any_is_reached() {
        let mut tracker = tracker_with(&[("a", 20.0), ("b", 100.0), ("c", 300.0)]);
        assert_eq!(tracker.recompute(0.0, 0.0).active_id, "a");
    }

    #[test]
    fn test_fallback_uses_page_order() {
        let mut tracker = tracker_with(&[("late", 200.0), ("early", 20.0)]);
        assert_eq!(tracker.recompute(0.0, 0.0).active_id, "early");
        assert_eq!(tracker.recompute(20.0, 0.0).active_id, "early");
    }

    #[test]
    fn test_offset_moves_the_threshold() {
        let mut tracker = tracker_with(&[("a", 0.0), ("b", 100.0)]);
        assert_eq!(tracker.recompute(50.0, 0.0).active_id, "a");
        assert_eq!(tracker.recompute(50.0, 60.0).active_id, "b");
    }

    #[test]
    fn test_ceil_bias_covers_subpixel_landing() {
        let mut tracker = tracker_with(&[("a", 0.0), ("b", 100.0)]);
        assert_eq!(tracker.recompute(99.4, 0.0).active_id, "b");

        let mut exact = ActiveSectionTracker::with_options(
            AncestorMap::default(),
            TrackerOptions {
                offset: 0.0,
                scroll_bias: ScrollBias::Exact,
            },
        );
        exact.register("a", StaticPosition::at(0.0));
        exact.register("b", StaticPosition::at(100.0));
        assert_eq!(exact.recompute(99.4, 0.0).active_id, "a");
    }

    #[test]
    fn test_registration_order_does_not_matter_for_position() {
        let mut tracker = tracker_with(&[("c", 300.0), ("a", 0.0), ("b", 100.0)]);
        assert_eq!(tracker.recompute(150.0, 0.0).active_id, "b");
        assert_eq!(tracker.recompute(0.0, 0.0).active_id, "a");
    }

    #[test]
    fn test_ties_resolve_to_later_registration() {
        let mut tracker = tracker_with(&[("a", 0.0), ("b", 100.0), ("c", 100.0)]);
        assert_eq!(tracker.recompute(120.0, 0.0).active_id, "c");
    }

    #[test]
    fn test_ties_before_threshold_fall_back_to_first_registered() {
        let mut tracker = tracker_with(&[("x", 50.0), ("y", 50.0)]);
        assert_eq!(tracker.recompute(0.0, 0.0).active_id, "x");
    }

    #[test]
    fn test_leading_margin_is_subtracted() {
        let mut tracker = ActiveSectionTracker::new(AncestorMap::default());
        tracker.register("a", StaticPosition::at(0.0));
        tracker.register(
            "b",
            StaticPosition {
                top: 120.0,
                margin: 30.0,
            },
        );
        assert_eq!(tracker.recompute(90.0, 0.0).active_id, "b");
    }

    #[test]
    fn test_register_recomputes_synchronously() {
        // Page loaded mid-document: scroll position known before headings mount
        let mut tracker = ActiveSectionTracker::new(AncestorMap::default());
        tracker.recompute(250.0, 0.0);
        assert_eq!(tracker.active_id(), "");

        tracker.register("a", StaticPosition::at(0.0));
        assert_eq!(tracker.active_id(), "a");
        tracker.register("b", StaticPosition::at(200.0));
        assert_eq!(tracker.active_id(), "b");
        tracker.register("c", StaticPosition::at(400.0));
        assert_eq!(tracker.active_id(), "b");
    }

    #[test]
    fn test_unregister_recomputes_and_ignores_unknown() {
        let mut tracker = tracker_with(&[("a", 0.0), ("b", 100.0)]);
        tracker.recompute(150.0, 0.0);
        assert_eq!(tracker.active_id(), "b");

        tracker.unregister("missing");
        assert_eq!(tracker.len(), 2);

        tracker.unregister("b");
        assert_eq!(tracker.active_id(), "a");

        tracker.unregister("a");
        assert_eq!(tracker.active_id(), "");
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_reregister_replaces_source_in_place() {
        let mut tracker = tracker_with(&[("a", 0.0), ("b", 100.0)]);
        tracker.register("a", StaticPosition::at(500.0));

        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.recompute(150.0, 0.0).active_id, "b");
        assert_eq!(tracker.recompute(600.0, 0.0).active_id, "a");
    }

    #[test]
    fn test_positions_are_read_live() {
        let top = Rc::new(Cell::new(400.0));
        let mut tracker = ActiveSectionTracker::new(AncestorMap::default());
        tracker.register("a", StaticPosition::at(0.0));
        let live = Rc::clone(&top);
        tracker.register("b", move || live.get());

        assert_eq!(tracker.recompute(200.0, 0.0).active_id, "a");

        // Layout shift moves the heading up
        top.set(150.0);
        assert_eq!(tracker.recompute(200.0, 0.0).active_id, "b");
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut tracker = tracker_with(&[("a", 0.0), ("b", 100.0)]);
        let first = tracker.recompute(120.0, 0.0).clone();
        let second = tracker.recompute(120.0, 0.0).clone();
        assert_eq!(first, second);
    }

    #[test]
    fn test_ancestor_ids_follow_active_section() {
        let headings = vec![
            Heading::new("Guide", "guide", 1),
            Heading::new("Install", "install", 2),
            Heading::new("Linux", "linux", 3),
            Heading::new("Usage", "usage", 2),
        ];
        let (_, ancestors) = build_outline(&headings);
        let mut tracker = ActiveSectionTracker::new(ancestors);
        tracker.register("guide", StaticPosition::at(0.0));
        tracker.register("install", StaticPosition::at(100.0));
        tracker.register("linux", StaticPosition::at(200.0));
        tracker.register("usage", StaticPosition::at(300.0));

        let state = tracker.recompute(250.0, 0.0);
        assert_eq!(state.active_id, "linux");
        assert_eq!(state.active_ancestor_ids, vec!["guide", "install"]);
        assert!(tracker.is_on_active_path("install"));
        assert!(!tracker.is_on_active_path("usage"));

        let state = tracker.recompute(350.0, 0.0);
        assert_eq!(state.active_ancestor_ids, vec!["guide"]);
    }

    #[test]
    fn test_unknown_active_id_has_no_ancestors() {
        let mut tracker = tracker_with(&[("orphan", 0.0)]);
        let state = tracker.recompute(0.0, 0.0);
        assert_eq!(state.active_id, "orphan");
        assert!(state.active_ancestor_ids.is_empty());
    }

    #[test]
    fn test_set_ancestors_refreshes_state() {
        let mut tracker = tracker_with(&[("a", 0.0), ("b", 100.0)]);
        tracker.recompute(150.0, 0.0);
        assert!(tracker.active_ancestor_ids().is_empty());

        let (_, ancestors) = build_outline(&[Heading::new("A", "a", 1), Heading::new("B", "b", 2)]);
        tracker.set_ancestors(ancestors);
        assert_eq!(tracker.active_ancestor_ids(), ["a".to_string()]);
    }

    #[test]
    fn test_positions_file_drives_tracker() {
        // Arrange
        let positions = HeadingPositions::from_toml(
            "[[heading]]\nid = \"a\"\ntop = 0.0\n\n[[heading]]\nid = \"b\"\ntop = 120.0\nmargin = 20.0\n",
        )
        .unwrap();
        let mut tracker = ActiveSectionTracker::new(AncestorMap::default());

        // Act
        positions.register_all(&mut tracker);

        // Assert
        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.recompute(99.0, 0.0).active_id, "a");
        assert_eq!(tracker.recompute(100.0, 0.0).active_id, "b");
    }

    #[test]
    fn test_empty_positions_file() {
        let positions = HeadingPositions::from_toml("").unwrap();
        assert!(positions.heading.is_empty());
    }
}
