// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor session: the context owning the timeline and both registries.

use waveline_core::{
    EnemyTypeRegistry, EventTypeRegistry, RegistryStore, RegistryValidation, Timeline, Track,
    WaveExporter,
};

/// Session-owned services and document state.
///
/// The registries are constructed once per session and passed by reference to
/// every component that needs type resolution; nothing in the editor reaches
/// for globals.
pub struct EditorSession {
    /// The timeline being authored
    pub timeline: Timeline,
    /// Event type registry
    pub event_types: EventTypeRegistry,
    /// Enemy type registry
    pub enemy_types: EnemyTypeRegistry,
}

impl EditorSession {
    /// Create a session with ephemeral registries and one starter track.
    pub fn new() -> Self {
        Self::with_enemy_registry(EnemyTypeRegistry::new())
    }

    /// Create a session whose enemy registry persists through the store.
    pub fn with_enemy_store(store: Box<dyn RegistryStore>) -> Self {
        Self::with_enemy_registry(EnemyTypeRegistry::with_store(store))
    }

    fn with_enemy_registry(enemy_types: EnemyTypeRegistry) -> Self {
        let mut timeline = Timeline::default();
        timeline.add_track(Track::new("Track 1"));
        Self {
            timeline,
            event_types: EventTypeRegistry::new(),
            enemy_types,
        }
    }

    /// Add a track named after its display position. Returns nothing; the
    /// track lands at the end of the display order.
    pub fn add_numbered_track(&mut self) {
        let number = self.timeline.track_count() + 1;
        self.timeline.add_track(Track::new(format!("Track {number}")));
    }

    /// Serialize the timeline in the authoring format.
    pub fn export_timeline(&self) -> String {
        self.timeline.export()
    }

    /// Replace the timeline from an authoring-format payload.
    ///
    /// Returns false (leaving the current timeline untouched) when the
    /// payload is rejected.
    pub fn import_timeline(&mut self, json: &str) -> bool {
        match Timeline::import(json) {
            Some(timeline) => {
                self.timeline = timeline;
                true
            }
            None => false,
        }
    }

    /// Derive the wave configuration JSON plus its pre-export advisory.
    pub fn export_wave(&self) -> (String, RegistryValidation) {
        let (data, advisory) =
            WaveExporter::generate_with_advisory(&self.timeline, &self.enemy_types);
        (data.to_json_string(), advisory)
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waveline_core::{EnemyType, FieldValue, TimelineEvent, SPAWN_EVENT_TYPE};

    #[test]
    fn test_new_session_has_starter_track() {
        let session = EditorSession::new();
        assert_eq!(session.timeline.track_count(), 1);
        assert_eq!(session.timeline.tracks()[0].name, "Track 1");
    }

    #[test]
    fn test_numbered_tracks() {
        let mut session = EditorSession::new();
        session.add_numbered_track();
        session.add_numbered_track();
        assert_eq!(session.timeline.tracks()[2].name, "Track 3");
    }

    #[test]
    fn test_import_failure_keeps_current_timeline() {
        let mut session = EditorSession::new();
        let name = session.timeline.name.clone();
        assert!(!session.import_timeline("garbage"));
        assert_eq!(session.timeline.name, name);
    }

    #[test]
    fn test_timeline_round_trip_through_session() {
        let mut session = EditorSession::new();
        session.timeline.set_duration(45.0);
        let json = session.export_timeline();

        let mut other = EditorSession::new();
        assert!(other.import_timeline(&json));
        assert_eq!(other.timeline, session.timeline);
    }

    #[test]
    fn test_export_wave_surfaces_advisory() {
        let mut session = EditorSession::new();
        session.enemy_types.register(EnemyType::new("g", "Grunt", "G"));
        let track_id = session.timeline.tracks()[0].id;
        let track = session.timeline.get_track_mut(track_id).unwrap();
        let mut event = TimelineEvent::with_defaults(2.0, SPAWN_EVENT_TYPE, &session.event_types);
        event.set_field("enemyId", FieldValue::Text("g".to_string()));
        track.add_event(event);

        let (json, advisory) = session.export_wave();
        assert!(!advisory.valid);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["spawnEvents"][0]["enemyName"], "Grunt");
    }
}
