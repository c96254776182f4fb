//! ECS components for hecs entities.
//!
//! Components are plain data structs with no methods beyond small
//! accessors. Game logic lives in systems, not components.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::enums::Faction;
use crate::types::Rect;

// `Position` is defined in `types` but used throughout as an ECS component;
// re-export it here so `components::Position` resolves as the code expects.
pub use crate::types::Position;

/// Marks the player entity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Player;

/// Marks an enemy entity and remembers which template spawned it, so
/// death handling can look up score, drops, and removal delay.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Enemy {
    pub template: usize,
}

/// Marks the player as untouchable: contacts involving a ghosted entity
/// are ignored entirely.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Ghosted;

/// Health and shield state shared by player and enemies.
///
/// `is_dead` is a one-way latch: it transitions false -> true exactly
/// once and is never reset, which keeps repeated lethal damage from
/// re-firing death side effects.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Vitals {
    pub health: f32,
    pub health_max: f32,
    /// May go below zero: a hit larger than the remaining shield is
    /// fully absorbed by the shield and does not carry over to health.
    pub shield: f32,
    pub shield_max: f32,
    pub is_dead: bool,
    pub low_health: bool,
}

impl Vitals {
    /// Fresh vitals at full health and shield.
    pub fn new(health: f32, shield: f32) -> Self {
        Self {
            health,
            health_max: health,
            shield,
            shield_max: shield,
            is_dead: false,
            low_health: false,
        }
    }

    /// Health as a display fraction; anything at or below zero is empty.
    pub fn health_fraction(&self) -> f32 {
        if self.health_max <= 0.0 {
            return 0.0;
        }
        (self.health / self.health_max).clamp(0.0, 1.0)
    }

    /// Shield as a display fraction; anything at or below zero is empty.
    pub fn shield_fraction(&self) -> f32 {
        if self.shield_max <= 0.0 {
            return 0.0;
        }
        (self.shield / self.shield_max).clamp(0.0, 1.0)
    }
}

/// Shield regeneration (player only — enemies do not regenerate).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ShieldRecharge {
    /// Shield points restored per second once recharging.
    pub speed: f32,
    /// Seconds without taking damage before recharge begins.
    pub delay: f32,
    /// Accumulator toward `delay`; reset to zero by any damage.
    pub delay_count: f32,
}

impl ShieldRecharge {
    pub fn new(speed: f32, delay: f32) -> Self {
        Self {
            speed,
            delay,
            delay_count: 0.0,
        }
    }
}

/// Contact damage dealt when touching the opposing faction.
/// Melee bypasses shields and is applied directly to health.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MeleeAttack {
    pub damage: f32,
    /// The attacker dies on its first melee contact (e.g. meteors).
    pub one_hit: bool,
    /// The attacker is shoved back after a melee contact.
    pub push_back: bool,
}

/// Player steering state: chases a commanded target position inside a
/// bounded move area.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlayerMotion {
    pub speed: f32,
    pub move_area: Rect,
    pub target_position: Vec2,
}

/// Pulls nearby magnetic items toward the player.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Magnet {
    pub range: f32,
    pub speed: f32,
}

/// The player's position in its weapon progression list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Loadout {
    pub weapon_index: usize,
}

/// A melee push-back in progress: the enemy is displaced toward `target`
/// and cannot steer until the window expires.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PushState {
    pub target: Vec2,
    pub speed: f32,
    pub time_left: f32,
}

/// Enemy steering state: chase with engage/disengage hysteresis, or
/// wander between random waypoints, or fly straight along the heading
/// set at spawn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyMotion {
    pub speed: f32,
    pub chase_target: bool,
    pub look_at_target: bool,
    /// Chasing starts within this distance of the target.
    pub engage_range: f32,
    /// Chasing stops beyond this distance.
    pub disengage_range: f32,
    pub is_chasing: bool,
    /// Movement heading in radians.
    pub heading: f32,
    pub random_waypoint: bool,
    pub waypoint_time: f32,
    pub waypoint_time_count: f32,
    pub waypoint_area: Rect,
    pub current_waypoint: Vec2,
    pub push: Option<PushState>,
}

/// A projectile in flight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Shot {
    pub damage: f32,
    pub speed: f32,
    pub speed_max: f32,
    pub acceleration: f32,
    pub remove_on_contact: bool,
    pub target_faction: Faction,
    /// Angular wobble amplitude in radians; 0 disables the sine motion.
    pub sine_range: f32,
    pub sine_speed: f32,
    pub sine_phase: f32,
    pub heading: f32,
    /// Heading at spawn; the sine wobble oscillates around this.
    pub initial_heading: f32,
}

/// A dropped or spawned pickup waiting on the field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Item {
    pub template: usize,
    /// Seconds until the item fades out.
    pub remove_after: f32,
    pub picked_up: bool,
    /// The item can be picked up and pulled by magnets.
    pub active: bool,
    /// The fade-out has started; removal is already scheduled.
    pub fading: bool,
}

/// Items carrying this marker are pulled by the player's magnet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Magnetic;
