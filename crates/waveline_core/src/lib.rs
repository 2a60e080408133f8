// SPDX-License-Identifier: MIT OR Apache-2.0
//! Core model for the Waveline wave-configuration editor.
//!
//! This crate provides everything below the rendering surface:
//! - Timeline/track/event data model with lossless JSON serialization
//! - Event and enemy type registries with schema-driven custom fields
//! - Persistent enemy registry storage through an injectable store
//! - Time <-> pixel coordinate engine with zoom, pan and snapping
//! - Wave configuration derivation and export
//!
//! ## Architecture
//!
//! The model is mutated synchronously through plain method calls; the
//! interactive surface (see the `waveline_editor` crate) translates pointer
//! input into those calls via the coordinate engine. Registries are explicit
//! session-owned services passed by reference, never globals.

pub mod coords;
pub mod event;
pub mod export;
pub mod registry;
pub mod store;
pub mod timeline;
pub mod track;

pub use coords::{CoordinateEngine, DEFAULT_PIXELS_PER_SECOND, MAX_ZOOM, MIN_ZOOM, ZOOM_STEP};
pub use event::{EventId, TimelineEvent};
pub use export::{SpawnEvent, WaveData, WaveExporter};
pub use registry::{
    EnemyType, EnemyTypeRegistry, EventType, EventTypeRegistry, FieldKind, FieldSpec, FieldValue,
    RegistryValidation, DEFAULT_EVENT_TYPE, SPAWN_EVENT_TYPE,
};
pub use store::{FileRegistryStore, RegistryStore, StoreError, ENEMY_TYPES_FILE};
pub use timeline::{Timeline, TimelineId, DEFAULT_DURATION, MIN_DURATION, SCRUB_TOLERANCE};
pub use track::{Track, TrackId, TRACK_COLORS};
