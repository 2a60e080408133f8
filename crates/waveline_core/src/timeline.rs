// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline aggregate root.

use crate::event::TimelineEvent;
use crate::track::{Track, TrackId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Floor the timeline duration is clamped to, in seconds.
pub const MIN_DURATION: f64 = 10.0;

/// Duration a fresh timeline starts with, in seconds.
pub const DEFAULT_DURATION: f64 = 60.0;

/// Default tolerance for [`Timeline::events_at_time`], in seconds.
pub const SCRUB_TOLERANCE: f64 = 0.1;

/// Unique identifier for a timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimelineId(pub Uuid);

impl TimelineId {
    /// Create a new random timeline ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TimelineId {
    fn default() -> Self {
        Self::new()
    }
}

/// The aggregate root: duration, tracks and metadata.
///
/// Track insertion order is display order. Destroying the timeline destroys
/// all tracks and their events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    /// Unique timeline ID
    pub id: TimelineId,
    /// Timeline name, also the exported wave name
    pub name: String,
    /// Total duration in seconds, always >= [`MIN_DURATION`]
    pub duration: f64,
    /// Scrub position in seconds
    pub current_time: f64,
    /// Lingering serialized zoom level, distinct from the interactive
    /// pixels-per-second ratio owned by the coordinate engine
    pub zoom: f64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Tracks in display order
    pub tracks: Vec<Track>,
}

impl Timeline {
    /// Create an empty timeline with the default duration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TimelineId::new(),
            name: name.into(),
            duration: DEFAULT_DURATION,
            current_time: 0.0,
            zoom: 10.0,
            created_at: Utc::now(),
            tracks: Vec::new(),
        }
    }

    /// Add a track at the end of the display order. Returns its id.
    pub fn add_track(&mut self, track: Track) -> TrackId {
        let id = track.id;
        self.tracks.push(track);
        id
    }

    /// Remove a track and all its events, reporting whether it existed.
    pub fn remove_track(&mut self, track_id: TrackId) -> bool {
        let before = self.tracks.len();
        self.tracks.retain(|t| t.id != track_id);
        self.tracks.len() != before
    }

    /// Get a track by id.
    pub fn get_track(&self, track_id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == track_id)
    }

    /// Get a mutable track by id.
    pub fn get_track_mut(&mut self, track_id: TrackId) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.id == track_id)
    }

    /// All tracks in display order.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Number of tracks.
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Set the duration, silently floor-clamped to [`MIN_DURATION`].
    pub fn set_duration(&mut self, duration: f64) {
        self.duration = duration.max(MIN_DURATION);
    }

    /// Flatten all tracks into (track, event) pairs.
    pub fn all_events(&self) -> impl Iterator<Item = (&Track, &TimelineEvent)> {
        self.tracks
            .iter()
            .flat_map(|track| track.events().iter().map(move |event| (track, event)))
    }

    /// All (track, event) pairs whose event time is within `tolerance` of
    /// `time` (absolute difference <= tolerance). Used for scrubbing.
    pub fn events_at_time(&self, time: f64, tolerance: f64) -> Vec<(&Track, &TimelineEvent)> {
        self.all_events()
            .filter(|(_, event)| (event.time - time).abs() <= tolerance)
            .collect()
    }

    /// Serialize the full aggregate to pretty JSON (authoring format).
    pub fn export(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| {
            tracing::error!("timeline export failed: {e}");
            String::new()
        })
    }

    /// Deserialize a timeline from the authoring format.
    ///
    /// Returns `None` and logs on invalid JSON or a structurally
    /// incompatible payload; never partially applies a bad import.
    pub fn import(json: &str) -> Option<Timeline> {
        match serde_json::from_str(json) {
            Ok(timeline) => Some(timeline),
            Err(e) => {
                tracing::error!("timeline import failed: {e}");
                None
            }
        }
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new("Untitled Timeline")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{EventTypeRegistry, FieldValue};

    #[test]
    fn test_set_duration_floor_clamps() {
        let mut timeline = Timeline::new("t");
        timeline.set_duration(5.0);
        assert_eq!(timeline.duration, 10.0);
        timeline.set_duration(120.0);
        assert_eq!(timeline.duration, 120.0);
    }

    #[test]
    fn test_track_lifecycle() {
        let mut timeline = Timeline::new("t");
        let id = timeline.add_track(Track::new("Track 1"));
        timeline.add_track(Track::new("Track 2"));

        assert_eq!(timeline.track_count(), 2);
        assert_eq!(timeline.get_track(id).unwrap().name, "Track 1");
        assert!(timeline.remove_track(id));
        assert!(!timeline.remove_track(id));
        assert_eq!(timeline.track_count(), 1);
    }

    #[test]
    fn test_events_at_time_tolerance_is_inclusive() {
        let registry = EventTypeRegistry::new();
        let mut timeline = Timeline::new("t");
        let track_id = timeline.add_track(Track::new("a"));
        let track = timeline.get_track_mut(track_id).unwrap();
        // Boundary values exactly representable in binary; a decimal pair
        // like 2.0/2.1 sits just outside a 0.1 tolerance in f64.
        for time in [1.0, 1.875, 2.0, 2.125, 3.0] {
            track.add_event(TimelineEvent::with_defaults(time, "default", &registry));
        }

        let hits = timeline.events_at_time(2.0, 0.125);
        let times: Vec<f64> = hits.iter().map(|(_, e)| e.time).collect();
        assert_eq!(times, vec![1.875, 2.0, 2.125]);

        let hits = timeline.events_at_time(2.0, SCRUB_TOLERANCE);
        let times: Vec<f64> = hits.iter().map(|(_, e)| e.time).collect();
        assert_eq!(times, vec![2.0]);
    }

    #[test]
    fn test_export_import_round_trip_is_lossless() {
        let registry = EventTypeRegistry::new();
        let mut timeline = Timeline::new("Wave 3");
        timeline.set_duration(90.0);
        timeline.current_time = 12.5;

        let track_id = timeline.add_track(Track::new("Spawns"));
        let track = timeline.get_track_mut(track_id).unwrap();
        let mut event = TimelineEvent::with_defaults(4.0, "spawn_enemy", &registry);
        event.set_field("enemyId", FieldValue::Text("grunt".to_string()));
        event.set_field("count", FieldValue::Number(3.0));
        track.add_event(event);
        track.add_event(TimelineEvent::with_defaults(1.5, "marker", &registry));

        let json = timeline.export();
        let restored = Timeline::import(&json).unwrap();
        assert_eq!(restored, timeline);
    }

    #[test]
    fn test_import_rejects_bad_payloads() {
        assert!(Timeline::import("not json at all").is_none());
        assert!(Timeline::import(r#"{"id": 42}"#).is_none());
        assert!(Timeline::import(r#"{"tracks": "nope"}"#).is_none());
    }

    #[test]
    fn test_wire_keys_are_camel_case() {
        let timeline = Timeline::new("t");
        let value: serde_json::Value = serde_json::to_value(&timeline).unwrap();
        assert!(value.get("currentTime").is_some());
        assert!(value.get("createdAt").is_some());
        assert!(value.get("zoom").is_some());
    }
}
