// SPDX-License-Identifier: MIT OR Apache-2.0
//! Track definitions.

use crate::event::{EventId, TimelineEvent};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Palette a new track's display color is drawn from.
pub const TRACK_COLORS: [&str; 6] = [
    "#007acc", "#e74c3c", "#2ecc71", "#f39c12", "#9b59b6", "#1abc9c",
];

/// Unique identifier for a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackId(pub Uuid);

impl TrackId {
    /// Create a new random track ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TrackId {
    fn default() -> Self {
        Self::new()
    }
}

/// An ordered lane of time-stamped events.
///
/// `events` is kept sorted ascending by time after every mutation that goes
/// through this API. Callers that mutate an event's `time` in place (drag
/// gestures) must call [`Track::sort_events`] when the edit completes; the
/// invariant is not maintained mid-gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Unique track ID
    pub id: TrackId,
    /// Track name
    pub name: String,
    /// Display color (hex string), chosen randomly from [`TRACK_COLORS`]
    pub color: String,
    /// Visibility hint. Declared placeholder, not enforced by the core.
    pub visible: bool,
    /// Edit-lock hint. Declared placeholder, not enforced by the core.
    pub locked: bool,
    /// Events on this track, sorted ascending by time
    pub events: Vec<TimelineEvent>,
}

impl Track {
    /// Create an empty track with a random palette color.
    pub fn new(name: impl Into<String>) -> Self {
        let color = TRACK_COLORS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(TRACK_COLORS[0]);
        Self {
            id: TrackId::new(),
            name: name.into(),
            color: color.to_string(),
            visible: true,
            locked: false,
            events: Vec::new(),
        }
    }

    /// Add an event, then re-sort by time. Returns the event's id.
    pub fn add_event(&mut self, event: TimelineEvent) -> EventId {
        let id = event.id;
        self.events.push(event);
        self.sort_events();
        id
    }

    /// Remove an event by id, reporting whether it existed.
    pub fn remove_event(&mut self, event_id: EventId) -> bool {
        let before = self.events.len();
        self.events.retain(|e| e.id != event_id);
        self.events.len() != before
    }

    /// Get an event by id.
    pub fn get_event(&self, event_id: EventId) -> Option<&TimelineEvent> {
        self.events.iter().find(|e| e.id == event_id)
    }

    /// Get a mutable event by id.
    pub fn get_event_mut(&mut self, event_id: EventId) -> Option<&mut TimelineEvent> {
        self.events.iter_mut().find(|e| e.id == event_id)
    }

    /// Re-establish the time-ascending invariant.
    ///
    /// The sort is stable: events with equal times keep their relative order.
    pub fn sort_events(&mut self) {
        self.events.sort_by(|a, b| a.time.total_cmp(&b.time));
    }

    /// Move an event to a new time and re-sort. Returns false for unknown ids.
    pub fn set_event_time(&mut self, event_id: EventId, time: f64) -> bool {
        let Some(event) = self.get_event_mut(event_id) else {
            return false;
        };
        event.set_time(time);
        self.sort_events();
        true
    }

    /// All events with `time` in `[start, end]` inclusive.
    pub fn events_in_range(&self, start: f64, end: f64) -> Vec<&TimelineEvent> {
        self.events
            .iter()
            .filter(|e| e.time >= start && e.time <= end)
            .collect()
    }

    /// All events on this track.
    pub fn events(&self) -> &[TimelineEvent] {
        &self.events
    }

    /// Number of events on this track.
    pub fn event_count(&self) -> usize {
        self.events.len()
    }
}
