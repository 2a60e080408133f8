// SPDX-License-Identifier: MIT OR Apache-2.0
//! Event and enemy type registries.
//!
//! Both registries are plain in-memory entry stores owned by the session and
//! passed by reference to whatever needs type resolution. The enemy registry
//! additionally persists its full entry set through a [`RegistryStore`]
//! collaborator on every mutation.

use crate::store::RegistryStore;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Id of the built-in fallback event type.
pub const DEFAULT_EVENT_TYPE: &str = "default";

/// Id of the event type the wave exporter projects into spawn records.
pub const SPAWN_EVENT_TYPE: &str = "spawn_enemy";

/// Input kind of a custom field, declared explicitly in the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Checkbox-style flag
    Boolean,
    /// Numeric input
    Number,
    /// Free text input
    Text,
}

/// A custom field value carried by an event.
///
/// Serialized untagged so `customData` round-trips as plain JSON scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Boolean value
    Bool(bool),
    /// Numeric value
    Number(f64),
    /// Text value
    Text(String),
}

impl FieldValue {
    /// The declared kind matching this value.
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Bool(_) => FieldKind::Boolean,
            FieldValue::Number(_) => FieldKind::Number,
            FieldValue::Text(_) => FieldKind::Text,
        }
    }

    /// Get as bool if possible
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as number if possible
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as text if possible
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

/// Declaration of one custom field in an event type's schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name, used as the `customData` key
    pub name: String,
    /// Declared input kind
    pub kind: FieldKind,
    /// Default value materialized into new events
    pub default: FieldValue,
}

impl FieldSpec {
    /// Create a field spec whose kind matches the default value.
    pub fn new(name: impl Into<String>, default: FieldValue) -> Self {
        Self {
            name: name.into(),
            kind: default.kind(),
            default,
        }
    }
}

/// A named, user-extensible event type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventType {
    /// Registry key
    pub id: String,
    /// Display name
    pub name: String,
    /// Display color (hex string, e.g. `#3498db`)
    pub color: String,
    /// Optional display icon
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Custom field schema
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl EventType {
    /// Create an event type with no icon and no fields.
    pub fn new(id: impl Into<String>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
            icon: None,
            fields: Vec::new(),
        }
    }

    /// Add a field to the schema (builder style).
    pub fn with_field(mut self, name: impl Into<String>, default: FieldValue) -> Self {
        self.fields.push(FieldSpec::new(name, default));
        self
    }

    /// Materialize the schema's default values for a fresh event.
    pub fn default_custom_data(&self) -> IndexMap<String, FieldValue> {
        self.fields
            .iter()
            .map(|f| (f.name.clone(), f.default.clone()))
            .collect()
    }
}

/// Registry of event types, keyed by id.
///
/// `get` on a missing id falls back to the `default` type, so rendering
/// always has a usable config even when an event references a type that was
/// removed.
#[derive(Debug, Clone)]
pub struct EventTypeRegistry {
    types: IndexMap<String, EventType>,
}

impl EventTypeRegistry {
    /// Create a registry populated with the built-in types.
    pub fn new() -> Self {
        let mut registry = Self {
            types: IndexMap::new(),
        };
        registry.register_default_types();
        registry
    }

    fn register_default_types(&mut self) {
        self.register(
            EventType::new(DEFAULT_EVENT_TYPE, "Default", "#3498db")
                .with_field("description", FieldValue::Text(String::new())),
        );
        self.register(
            EventType::new("audio", "Audio", "#e74c3c")
                .with_field("soundFile", FieldValue::Text(String::new()))
                .with_field("volume", FieldValue::Number(1.0))
                .with_field("loop", FieldValue::Bool(false)),
        );
        self.register(
            EventType::new("animation", "Animation", "#2ecc71")
                .with_field("animationType", FieldValue::Text(String::new()))
                .with_field("duration", FieldValue::Number(1.0))
                .with_field("easing", FieldValue::Text("linear".to_string())),
        );
        self.register(
            EventType::new("marker", "Marker", "#f39c12")
                .with_field("label", FieldValue::Text(String::new()))
                .with_field("note", FieldValue::Text(String::new())),
        );
        self.register(
            EventType::new(SPAWN_EVENT_TYPE, "Spawn Enemy", "#9b59b6")
                .with_field("enemyId", FieldValue::Text(String::new()))
                .with_field("count", FieldValue::Number(1.0))
                .with_field("spawnPosition", FieldValue::Text(String::new()))
                .with_field("formationType", FieldValue::Text(String::new())),
        );
    }

    /// Insert or replace a type under its id. Never fails.
    pub fn register(&mut self, event_type: EventType) {
        self.types.insert(event_type.id.clone(), event_type);
    }

    /// Get a type by id, falling back to the `default` type when missing.
    ///
    /// Returns `None` only if the fallback itself has been removed.
    pub fn get(&self, id: &str) -> Option<&EventType> {
        self.types
            .get(id)
            .or_else(|| self.types.get(DEFAULT_EVENT_TYPE))
    }

    /// All registered types in insertion order.
    pub fn get_all(&self) -> impl Iterator<Item = &EventType> {
        self.types.values()
    }

    /// Remove a type, reporting whether it existed.
    pub fn remove(&mut self, id: &str) -> bool {
        self.types.shift_remove(id).is_some()
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the registry has no entries.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for EventTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// An enemy type: the template a spawn event references by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnemyType {
    /// Registry key
    pub id: String,
    /// Display name
    pub name: String,
    /// Short glyph or embedded image payload (data URL)
    pub icon: String,
    /// Engine scene path, used only by the exporter. Empty = unset.
    #[serde(default)]
    pub scene_path: String,
    /// Engine resource uid, used only by the exporter. Empty = unset.
    #[serde(default)]
    pub uid: String,
}

impl EnemyType {
    /// Create an enemy type without engine cross-reference fields.
    pub fn new(id: impl Into<String>, name: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: icon.into(),
            scene_path: String::new(),
            uid: String::new(),
        }
    }
}

/// Result of validating one or all enemy types for export completeness.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryValidation {
    /// Whether every checked entry is complete
    pub valid: bool,
    /// One human-readable warning per missing field
    pub warnings: Vec<String>,
}

impl RegistryValidation {
    fn ok() -> Self {
        Self {
            valid: true,
            warnings: Vec::new(),
        }
    }
}

/// Registry of enemy types, keyed by id, persisted through a store.
///
/// `get` on a missing id falls back to the first registered entry so a spawn
/// event whose enemy was deleted still resolves to something renderable;
/// `None` only on an empty registry.
pub struct EnemyTypeRegistry {
    types: IndexMap<String, EnemyType>,
    store: Option<Box<dyn RegistryStore>>,
}

impl EnemyTypeRegistry {
    /// Create an ephemeral registry with no backing store.
    pub fn new() -> Self {
        Self {
            types: IndexMap::new(),
            store: None,
        }
    }

    /// Create a registry backed by a store, rehydrating from it.
    ///
    /// A missing snapshot yields an empty registry; a corrupt or unreadable
    /// one is logged and likewise yields an empty registry, never an error.
    pub fn with_store(store: Box<dyn RegistryStore>) -> Self {
        let types = match store.load() {
            Ok(Some(entries)) => entries.into_iter().map(|e| (e.id.clone(), e)).collect(),
            Ok(None) => IndexMap::new(),
            Err(e) => {
                tracing::warn!("discarding corrupt enemy registry snapshot: {e}");
                IndexMap::new()
            }
        };
        Self {
            types,
            store: Some(store),
        }
    }

    /// Insert or replace an enemy type, persisting the full entry set.
    pub fn register(&mut self, enemy: EnemyType) {
        self.types.insert(enemy.id.clone(), enemy);
        self.persist();
    }

    /// Remove an enemy type, reporting whether it existed. Persists.
    pub fn remove(&mut self, id: &str) -> bool {
        let existed = self.types.shift_remove(id).is_some();
        if existed {
            self.persist();
        }
        existed
    }

    /// Get an enemy type by id, falling back to any available entry.
    pub fn get(&self, id: &str) -> Option<&EnemyType> {
        self.types
            .get(id)
            .or_else(|| self.types.values().next())
    }

    /// All registered enemy types in insertion order.
    pub fn get_all(&self) -> impl Iterator<Item = &EnemyType> {
        self.types.values()
    }

    /// Number of registered enemy types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the registry has no entries.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Validate one enemy type for export completeness.
    ///
    /// Emits a warning for each of `scene_path`/`uid` that is empty; an
    /// unregistered id is itself a warning.
    pub fn validate(&self, id: &str) -> RegistryValidation {
        let Some(enemy) = self.types.get(id) else {
            return RegistryValidation {
                valid: false,
                warnings: vec![format!("enemy type '{id}' is not registered")],
            };
        };

        let mut warnings = Vec::new();
        if enemy.scene_path.is_empty() {
            warnings.push(format!("enemy '{}' has no scene path", enemy.name));
        }
        if enemy.uid.is_empty() {
            warnings.push(format!("enemy '{}' has no uid", enemy.name));
        }
        RegistryValidation {
            valid: warnings.is_empty(),
            warnings,
        }
    }

    /// Fold [`Self::validate`] over every entry.
    pub fn validate_all(&self) -> RegistryValidation {
        let mut result = RegistryValidation::ok();
        for id in self.types.keys() {
            let entry = self.validate(id);
            result.valid &= entry.valid;
            result.warnings.extend(entry.warnings);
        }
        result
    }

    /// Write the full entry set through the store, logging failures.
    fn persist(&self) {
        let Some(store) = &self.store else {
            return;
        };
        let entries: Vec<EnemyType> = self.types.values().cloned().collect();
        if let Err(e) = store.save(&entries) {
            tracing::warn!("failed to persist enemy registry: {e}");
        }
    }
}

impl Default for EnemyTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EnemyTypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnemyTypeRegistry")
            .field("types", &self.types)
            .field("store", &self.store.as_ref().map(|_| "dyn RegistryStore"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_event_type_fallback() {
        let registry = EventTypeRegistry::new();
        let ty = registry.get("nonexistent").unwrap();
        assert_eq!(ty.id, DEFAULT_EVENT_TYPE);
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = EventTypeRegistry::new();
        let before = registry.len();
        registry.register(EventType::new("marker", "Renamed", "#ffffff"));
        assert_eq!(registry.len(), before);
        assert_eq!(registry.get("marker").unwrap().name, "Renamed");
    }

    #[test]
    fn test_remove_reports_existence() {
        let mut registry = EventTypeRegistry::new();
        assert!(registry.remove("audio"));
        assert!(!registry.remove("audio"));
    }

    #[test]
    fn test_default_custom_data_matches_schema() {
        let registry = EventTypeRegistry::new();
        let spawn = registry.get(SPAWN_EVENT_TYPE).unwrap();
        let data = spawn.default_custom_data();
        assert_eq!(data.get("count"), Some(&FieldValue::Number(1.0)));
        assert_eq!(data.get("enemyId"), Some(&FieldValue::Text(String::new())));
        assert_eq!(data.len(), spawn.fields.len());
    }

    #[test]
    fn test_field_value_untagged_round_trip() {
        let values = vec![
            FieldValue::Bool(true),
            FieldValue::Number(2.5),
            FieldValue::Text("hello".to_string()),
        ];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"[true,2.5,"hello"]"#);
        let back: Vec<FieldValue> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, values);
    }

    #[test]
    fn test_enemy_fallback_to_any_entry() {
        let mut registry = EnemyTypeRegistry::new();
        assert!(registry.get("missing").is_none());

        registry.register(EnemyType::new("e1", "Grunt", "G"));
        let fallback = registry.get("missing").unwrap();
        assert_eq!(fallback.id, "e1");
    }

    #[test]
    fn test_validate_warns_on_empty_refs() {
        let mut registry = EnemyTypeRegistry::new();
        registry.register(EnemyType::new("e1", "Grunt", "G"));

        let result = registry.validate("e1");
        assert!(!result.valid);
        assert_eq!(result.warnings.len(), 2);

        let mut complete = EnemyType::new("e2", "Boss", "B");
        complete.scene_path = "res://enemies/boss.tscn".to_string();
        complete.uid = "uid://abc123".to_string();
        registry.register(complete);
        assert!(registry.validate("e2").valid);

        let all = registry.validate_all();
        assert!(!all.valid);
        assert_eq!(all.warnings.len(), 2);
    }

    /// In-memory store fake recording every snapshot written through it.
    struct FakeStore {
        snapshots: Rc<RefCell<Vec<Vec<EnemyType>>>>,
        initial: Option<Vec<EnemyType>>,
        corrupt: bool,
    }

    impl RegistryStore for FakeStore {
        fn load(&self) -> Result<Option<Vec<EnemyType>>, StoreError> {
            if self.corrupt {
                return Err(StoreError::Json(
                    serde_json::from_str::<Vec<EnemyType>>("not json").unwrap_err(),
                ));
            }
            Ok(self.initial.clone())
        }

        fn save(&self, entries: &[EnemyType]) -> Result<(), StoreError> {
            self.snapshots.borrow_mut().push(entries.to_vec());
            Ok(())
        }
    }

    #[test]
    fn test_every_mutation_persists_full_snapshot() {
        let snapshots = Rc::new(RefCell::new(Vec::new()));
        let store = FakeStore {
            snapshots: Rc::clone(&snapshots),
            initial: None,
            corrupt: false,
        };
        let mut registry = EnemyTypeRegistry::with_store(Box::new(store));

        registry.register(EnemyType::new("e1", "Grunt", "G"));
        registry.register(EnemyType::new("e2", "Boss", "B"));
        registry.remove("e1");

        let written = snapshots.borrow();
        assert_eq!(written.len(), 3);
        assert_eq!(written[1].len(), 2);
        assert_eq!(written[2].len(), 1);
        assert_eq!(written[2][0].id, "e2");
    }

    #[test]
    fn test_rehydrates_from_store() {
        let store = FakeStore {
            snapshots: Rc::new(RefCell::new(Vec::new())),
            initial: Some(vec![EnemyType::new("e1", "Grunt", "G")]),
            corrupt: false,
        };
        let registry = EnemyTypeRegistry::with_store(Box::new(store));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("e1").unwrap().name, "Grunt");
    }

    #[test]
    fn test_corrupt_snapshot_yields_empty_registry() {
        let store = FakeStore {
            snapshots: Rc::new(RefCell::new(Vec::new())),
            initial: None,
            corrupt: true,
        };
        let registry = EnemyTypeRegistry::with_store(Box::new(store));
        assert!(registry.is_empty());
    }
}
