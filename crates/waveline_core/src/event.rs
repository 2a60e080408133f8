// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline event definitions.

use crate::registry::{EventType, EventTypeRegistry, FieldValue};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub Uuid);

impl EventId {
    /// Create a new random event ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

/// A typed, timed point entity placed on a track.
///
/// `custom_data` keys mirror the declared field schema of the event's type at
/// creation time; mutators never re-validate a patch against the schema, the
/// caller is responsible for staying consistent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    /// Unique event ID
    pub id: EventId,
    /// Trigger time in seconds, >= 0
    pub time: f64,
    /// Key into the event type registry
    #[serde(rename = "type")]
    pub event_type: String,
    /// Schema-shaped payload
    pub custom_data: IndexMap<String, FieldValue>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last-modified timestamp
    pub updated_at: DateTime<Utc>,
}

impl TimelineEvent {
    /// Create an event with an explicit payload.
    pub fn new(
        time: f64,
        event_type: impl Into<String>,
        custom_data: IndexMap<String, FieldValue>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: EventId::new(),
            time,
            event_type: event_type.into(),
            custom_data,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create an event carrying the type's default field values.
    ///
    /// The type id is resolved through the registry's fallback policy, so an
    /// unknown id yields the `default` type's payload.
    pub fn with_defaults(time: f64, event_type: &str, registry: &EventTypeRegistry) -> Self {
        let custom_data = registry
            .get(event_type)
            .map(EventType::default_custom_data)
            .unwrap_or_default();
        Self::new(time, event_type, custom_data)
    }

    /// Resolve the event's current type through the registry.
    pub fn type_config<'r>(&self, registry: &'r EventTypeRegistry) -> Option<&'r EventType> {
        registry.get(&self.event_type)
    }

    /// Set the trigger time and refresh `updated_at`.
    pub fn set_time(&mut self, time: f64) {
        self.time = time;
        self.touch();
    }

    /// Change the event's type, resetting `custom_data` to the new type's
    /// default field values.
    pub fn set_type(&mut self, event_type: impl Into<String>, registry: &EventTypeRegistry) {
        self.event_type = event_type.into();
        self.custom_data = registry
            .get(&self.event_type)
            .map(EventType::default_custom_data)
            .unwrap_or_default();
        self.touch();
    }

    /// Set a single custom field and refresh `updated_at`. No schema check.
    pub fn set_field(&mut self, name: impl Into<String>, value: FieldValue) {
        self.custom_data.insert(name.into(), value);
        self.touch();
    }

    /// Shallow-merge a patch of custom fields and refresh `updated_at`.
    pub fn update_fields(&mut self, patch: impl IntoIterator<Item = (String, FieldValue)>) {
        for (name, value) in patch {
            self.custom_data.insert(name, value);
        }
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SPAWN_EVENT_TYPE;

    #[test]
    fn test_with_defaults_materializes_schema() {
        let registry = EventTypeRegistry::new();
        let event = TimelineEvent::with_defaults(2.0, SPAWN_EVENT_TYPE, &registry);
        assert_eq!(event.event_type, SPAWN_EVENT_TYPE);
        assert_eq!(
            event.custom_data.get("count"),
            Some(&FieldValue::Number(1.0))
        );
    }

    #[test]
    fn test_set_type_resets_custom_data() {
        let registry = EventTypeRegistry::new();
        let mut event = TimelineEvent::with_defaults(1.0, "audio", &registry);
        event.set_field("volume", FieldValue::Number(0.5));

        event.set_type("marker", &registry);
        assert!(event.custom_data.get("volume").is_none());
        assert_eq!(
            event.custom_data.get("label"),
            Some(&FieldValue::Text(String::new()))
        );
    }

    #[test]
    fn test_update_refreshes_updated_at() {
        let registry = EventTypeRegistry::new();
        let mut event = TimelineEvent::with_defaults(1.0, "default", &registry);
        let created = event.updated_at;
        std::thread::sleep(std::time::Duration::from_millis(2));
        event.set_time(3.0);
        assert!(event.updated_at > created);
        assert_eq!(event.created_at, created);
    }

    #[test]
    fn test_serde_round_trip_preserves_all_attributes() {
        let registry = EventTypeRegistry::new();
        let mut event = TimelineEvent::with_defaults(4.5, "audio", &registry);
        event.set_field("loop", FieldValue::Bool(true));

        let json = serde_json::to_string(&event).unwrap();
        let back: TimelineEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_wire_keys_are_camel_case() {
        let registry = EventTypeRegistry::new();
        let event = TimelineEvent::with_defaults(1.0, "default", &registry);
        let value: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert!(value.get("type").is_some());
        assert!(value.get("customData").is_some());
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
    }
}
