// SPDX-License-Identifier: MIT OR Apache-2.0
//! Wave configuration export.
//!
//! Derives the engine-consumable projection from a timeline and the enemy
//! registry. The output is one-way: it cannot be imported back into a
//! timeline.

use crate::registry::{EnemyType, EnemyTypeRegistry, RegistryValidation, SPAWN_EVENT_TYPE};
use crate::timeline::Timeline;
use serde::{Deserialize, Serialize};

/// One spawn record in the exported wave configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpawnEvent {
    /// Spawn time in seconds
    pub time: f64,
    /// Enemy type id referenced by the event
    pub enemy_id: String,
    /// Enemy display name, resolved through the registry
    pub enemy_name: String,
    /// Number of enemies to spawn
    pub count: f64,
    /// Spawn position descriptor
    pub spawn_position: String,
    /// Formation descriptor
    pub formation_type: String,
    /// Engine scene path, copied from the enemy type
    pub scene_path: String,
    /// Engine resource uid, copied from the enemy type
    pub uid: String,
    /// Name of the track the event was placed on
    pub track_name: String,
}

/// The exported wave configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveData {
    /// Wave name, taken from the timeline name
    pub wave_name: String,
    /// Timeline duration in seconds
    pub duration: f64,
    /// Every registered enemy type
    pub enemies: Vec<EnemyType>,
    /// Spawn records, sorted ascending by time
    pub spawn_events: Vec<SpawnEvent>,
}

impl WaveData {
    /// Serialize to the pretty JSON consumption format.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| {
            tracing::error!("wave export failed: {e}");
            String::new()
        })
    }
}

/// Derives wave configurations from timelines.
pub struct WaveExporter;

impl WaveExporter {
    /// Build the wave projection from every `spawn_enemy` event across every
    /// track.
    ///
    /// Spawn records are sorted ascending by time after collection; that is
    /// the canonical output ordering regardless of track iteration order.
    /// Enemy references that no longer resolve fall back to the registry's
    /// any-available-entry policy, or to empty fields on an empty registry.
    pub fn generate_wave_data(timeline: &Timeline, enemies: &EnemyTypeRegistry) -> WaveData {
        let mut spawn_events: Vec<SpawnEvent> = timeline
            .all_events()
            .filter(|(_, event)| event.event_type == SPAWN_EVENT_TYPE)
            .map(|(track, event)| {
                let enemy_id = event
                    .custom_data
                    .get("enemyId")
                    .and_then(|v| v.as_text())
                    .unwrap_or_default()
                    .to_string();
                let resolved = enemies.get(&enemy_id);

                SpawnEvent {
                    time: event.time,
                    enemy_name: resolved.map(|e| e.name.clone()).unwrap_or_default(),
                    scene_path: resolved.map(|e| e.scene_path.clone()).unwrap_or_default(),
                    uid: resolved.map(|e| e.uid.clone()).unwrap_or_default(),
                    enemy_id,
                    count: event
                        .custom_data
                        .get("count")
                        .and_then(|v| v.as_number())
                        .unwrap_or(1.0),
                    spawn_position: event
                        .custom_data
                        .get("spawnPosition")
                        .and_then(|v| v.as_text())
                        .unwrap_or_default()
                        .to_string(),
                    formation_type: event
                        .custom_data
                        .get("formationType")
                        .and_then(|v| v.as_text())
                        .unwrap_or_default()
                        .to_string(),
                    track_name: track.name.clone(),
                }
            })
            .collect();

        spawn_events.sort_by(|a, b| a.time.total_cmp(&b.time));

        WaveData {
            wave_name: timeline.name.clone(),
            duration: timeline.duration,
            enemies: enemies.get_all().cloned().collect(),
            spawn_events,
        }
    }

    /// Generate the wave data together with the pre-export advisory.
    ///
    /// The advisory is confirmable, never blocking: incomplete enemy entries
    /// produce warnings the caller should surface, but the data is always
    /// returned.
    pub fn generate_with_advisory(
        timeline: &Timeline,
        enemies: &EnemyTypeRegistry,
    ) -> (WaveData, RegistryValidation) {
        let advisory = enemies.validate_all();
        if !advisory.valid {
            tracing::info!(
                warning_count = advisory.warnings.len(),
                "wave export advisory: enemy registry is incomplete"
            );
        }
        (Self::generate_wave_data(timeline, enemies), advisory)
    }
}
