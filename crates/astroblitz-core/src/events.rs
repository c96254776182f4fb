//! Events emitted by the simulation for the host's rendering, audio,
//! animation, and persistence layers.
//!
//! The simulation never plays effects or writes storage itself; it
//! emits these intents on each snapshot and the host acts on them.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::templates::ProgressState;

/// Outbound intents, drained into every snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    /// A new wave has started.
    WaveStarted {
        /// Index into the authored wave list.
        wave: usize,
        /// Absolute wave number across Endless Mode repeats.
        absolute_wave: usize,
        message: String,
    },
    /// All enemies of a wave are gone.
    WaveCleared { wave: usize },
    /// The level was won.
    Victory,
    /// The player died.
    Defeat,
    /// A new entity exists; the host should instantiate its visuals.
    EntitySpawned { id: u64, kind: EntityKind },
    /// An entity is gone; the host should tear down its visuals.
    EntityRemoved { id: u64 },
    /// Play a visual effect at a position and heading.
    EffectRequested {
        effect: EffectKind,
        x: f32,
        y: f32,
        heading: f32,
    },
    /// Play a sound.
    SoundRequested { sound: SoundCue },
    /// A health or shield bar changed; `fraction` is the normalized
    /// fill value (values at or below zero render as empty).
    BarChanged { id: u64, bar: BarKind, fraction: f32 },
    /// An entity took health damage and should play its hit reaction.
    HitReaction { id: u64 },
    /// The low-health state of an entity toggled.
    LowHealth { id: u64, active: bool },
    /// The player's ghost state toggled.
    GhostChanged { id: u64, active: bool },
    /// The score changed by `delta` (multiplier already applied).
    ScoreChanged { score: i64, delta: i64 },
    /// An item was picked up; `stored` means it went into the
    /// inventory instead of being used.
    ItemPickedUp {
        id: u64,
        template: usize,
        stored: bool,
    },
    /// Persist this progression state for the level.
    ProgressSaved { state: ProgressState },
    /// Delete the persisted progression state for the level.
    ProgressCleared,
}
