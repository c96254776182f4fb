//! Game state snapshot — the complete visible state sent to the host
//! each tick.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::GameEvent;
use crate::types::SimTime;

/// Complete game state broadcast to the host after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub time: SimTime,
    pub phase: GamePhase,
    pub score: ScoreView,
    pub wave: WaveView,
    pub player: Option<PlayerView>,
    pub entities: Vec<EntityView>,
    /// Inventory slots; each holds an item template index or nothing.
    pub inventory: Vec<Option<usize>>,
    pub events: Vec<GameEvent>,
}

/// Running score for display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreView {
    pub score: i64,
    pub multiplier: f32,
}

/// Wave progression for display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaveView {
    pub current_wave: usize,
    pub wave_count: usize,
    pub repeat_count: u32,
    /// The current wave's spawn timers are running.
    pub spawning: bool,
    pub enemies_alive: u32,
}

/// The player's visible state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub health: f32,
    pub health_max: f32,
    pub shield: f32,
    pub shield_max: f32,
    pub is_dead: bool,
    pub speed: f32,
    pub weapon_index: usize,
}

/// A non-player entity on the field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityView {
    pub id: u64,
    pub kind: EntityKind,
    /// Template index for enemies and items.
    pub template: Option<usize>,
    pub x: f32,
    pub y: f32,
    pub heading: f32,
}
