//! Player commands sent from the host to the simulation.
//!
//! Commands are queued and processed at the next tick boundary.

use serde::{Deserialize, Serialize};

use crate::templates::ProgressState;

/// All possible player actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    /// Start (or restart) the level.
    StartMission,
    /// Pause the simulation.
    Pause,
    /// Resume the simulation.
    Resume,
    /// Set the time scale (1.0 = normal, 0.0 = frozen).
    SetTimeScale { scale: f32 },
    /// Set the position the player ship steers toward.
    SetMoveTarget { x: f32, y: f32 },
    /// Set the score multiplier.
    SetScoreMultiplier { value: f32 },
    /// Use the item stored in an inventory slot.
    UseInventorySlot { slot: usize },
    /// Load previously saved progression state. Applied at the next
    /// StartMission.
    ApplyProgress { state: ProgressState },
}
