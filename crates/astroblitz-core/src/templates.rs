//! Authored level configuration.
//!
//! Everything in this module is immutable at runtime: the simulation
//! derives per-entity and per-wave runtime state from these templates
//! instead of mutating them in place. The host deserializes a
//! `LevelConfig` from JSON and hands it to the engine at construction.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_INVENTORY_SLOTS;
use crate::enums::ActionTarget;
use crate::types::Rect;

/// Complete authored description of one level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelConfig {
    pub player: PlayerTemplate,
    pub enemies: Vec<EnemyTemplate>,
    pub items: Vec<ItemTemplate>,
    pub waves: Vec<WaveDef>,
    #[serde(default)]
    pub endless: EndlessMode,
    /// Enemies spawn on the edges of (or inside) this area; it also
    /// bounds target acquisition.
    #[serde(default)]
    pub spawn_area: Rect,
    /// The player is clamped to this area.
    #[serde(default = "default_move_area")]
    pub move_area: Rect,
    /// Optional ambient item spawner.
    #[serde(default)]
    pub item_spawner: Option<ItemSpawnerDef>,
    /// Emit progress-save intents at wave checkpoints.
    #[serde(default)]
    pub save_progress: bool,
    #[serde(default = "default_inventory_slots")]
    pub inventory_slots: usize,
}

fn default_move_area() -> Rect {
    Rect::new(-9.0, -5.0, 9.0, 5.0)
}

fn default_inventory_slots() -> usize {
    DEFAULT_INVENTORY_SLOTS
}

/// The player's authored stats and weapon progression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerTemplate {
    pub health: f32,
    pub shield: f32,
    pub recharge_speed: f32,
    pub recharge_delay: f32,
    pub speed: f32,
    pub melee_damage: f32,
    /// Seconds the corpse lingers before removal (and defeat).
    pub remove_dead_secs: f32,
    pub magnet_range: f32,
    pub magnet_speed: f32,
    /// Ordered weapon upgrade path; `weapon_index` selects within it.
    pub weapons: Vec<WeaponTemplate>,
    #[serde(default)]
    pub weapon_index: usize,
}

impl Default for PlayerTemplate {
    fn default() -> Self {
        Self {
            health: 100.0,
            shield: 100.0,
            recharge_speed: 10.0,
            recharge_delay: 2.0,
            speed: 3.0,
            melee_damage: 1.0,
            remove_dead_secs: 2.5,
            magnet_range: 0.0,
            magnet_speed: 1.0,
            weapons: vec![WeaponTemplate::default()],
            weapon_index: 0,
        }
    }
}

/// One enemy archetype.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyTemplate {
    pub name: String,
    pub health: f32,
    pub shield: f32,
    pub speed: f32,
    pub melee_damage: f32,
    /// Dies on its first melee contact (meteor-style).
    #[serde(default)]
    pub one_hit_melee: bool,
    #[serde(default = "default_true")]
    pub chase_target: bool,
    #[serde(default)]
    pub look_at_target: bool,
    pub engage_range: f32,
    pub disengage_range: f32,
    #[serde(default)]
    pub random_waypoint: bool,
    #[serde(default = "default_waypoint_time")]
    pub waypoint_time: f32,
    #[serde(default)]
    pub waypoint_area: Rect,
    #[serde(default)]
    pub remove_dead_secs: f32,
    #[serde(default)]
    pub weapon: Option<WeaponTemplate>,
    /// Points awarded to the player on kill.
    pub score: i64,
    /// Weighted drop table; flattened into a pool at level load.
    #[serde(default)]
    pub drops: Vec<ItemDropDef>,
    /// Bounds of the uniform roll for how many items drop on death.
    #[serde(default = "default_drop_count")]
    pub drop_count_min: f32,
    #[serde(default = "default_drop_count")]
    pub drop_count_max: f32,
    /// Dropped items are displaced this far along a random heading.
    #[serde(default)]
    pub drop_spread: f32,
}

fn default_true() -> bool {
    true
}

fn default_waypoint_time() -> f32 {
    3.0
}

fn default_drop_count() -> f32 {
    1.0
}

/// A weapon: muzzles, burst timing, and aiming behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponTemplate {
    pub muzzles: Vec<MuzzleDef>,
    /// Seconds between bursts.
    #[serde(default)]
    pub burst_delay: f32,
    /// Shots per burst.
    pub burst_shots: u32,
    /// Seconds between shots within a burst.
    pub shot_rate: f32,
    /// Fire from one muzzle per shot in round-robin order instead of
    /// from all muzzles at once.
    #[serde(default)]
    pub shoot_in_sequence: bool,
    /// Track the target; when false the weapon free-spins at
    /// `rotate_speed`.
    #[serde(default = "default_true")]
    pub look_at_target: bool,
    #[serde(default)]
    pub rotate_speed: f32,
}

impl Default for WeaponTemplate {
    fn default() -> Self {
        Self {
            muzzles: vec![MuzzleDef {
                offset: Vec2::ZERO,
                shot: ShotTemplate::default(),
            }],
            burst_delay: 0.0,
            burst_shots: 1,
            shot_rate: 0.5,
            shoot_in_sequence: false,
            look_at_target: true,
            rotate_speed: 0.0,
        }
    }
}

/// A fire point on a weapon, bound to the shot it releases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MuzzleDef {
    /// Offset from the owner, in the weapon's local frame.
    pub offset: Vec2,
    pub shot: ShotTemplate,
}

/// A projectile archetype.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShotTemplate {
    pub damage: f32,
    pub speed: f32,
    pub speed_max: f32,
    pub acceleration: f32,
    #[serde(default = "default_true")]
    pub remove_on_contact: bool,
    /// Seconds before the shot expires on its own.
    pub lifetime_secs: f32,
    #[serde(default)]
    pub sine_range: f32,
    #[serde(default)]
    pub sine_speed: f32,
    #[serde(default)]
    pub sine_phase: f32,
}

impl Default for ShotTemplate {
    fn default() -> Self {
        Self {
            damage: 1.0,
            speed: 10.0,
            speed_max: 20.0,
            acceleration: 1.0,
            remove_on_contact: true,
            lifetime_secs: 3.0,
            sine_range: 0.0,
            sine_speed: 0.0,
            sine_phase: 0.0,
        }
    }
}

/// One entry of an enemy's weighted drop table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ItemDropDef {
    /// Index into `LevelConfig::items`.
    pub item: usize,
    /// Relative weight: the item contributes this many slots to the
    /// flattened pool.
    pub drop_rate: u32,
}

/// A pickup archetype.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemTemplate {
    pub name: String,
    /// Executed on pickup (unless stored in the inventory), each on its
    /// own delay.
    pub effects: Vec<ItemEffect>,
    #[serde(default)]
    pub add_to_inventory: bool,
    pub score: i64,
    pub pickup_range: f32,
    /// Seconds the item lies on the field before fading.
    pub remove_after: f32,
    /// Length of the removal fade animation.
    #[serde(default)]
    pub fade_secs: f32,
    /// Pulled by the player's magnet.
    #[serde(default)]
    pub magnetic: bool,
}

/// A delayed, typed action an item performs when used.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemEffect {
    pub target: ActionTarget,
    pub action: ItemAction,
    #[serde(default)]
    pub delay_secs: f32,
}

/// Typed item actions, resolved at load time rather than dispatched by
/// function name.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ItemAction {
    AddScore(i64),
    SetScoreMultiplier(f32),
    ChangeHealth(f32),
    ChangeSpeed(f32),
    ChangeMeleeDamage(f32),
    /// Step the player's weapon index by this amount (clamped to the
    /// weapon list).
    UpgradeWeapon(i32),
    ChangeMagnetRange(f32),
    ChangeMagnetSpeed(f32),
    SetGhost(bool),
    SetTimeScale(f32),
}

/// Periodic ambient item spawner, cycling round-robin through a list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSpawnerDef {
    /// Indices into `LevelConfig::items`.
    pub items: Vec<usize>,
    /// Seconds between spawns.
    pub drop_rate: f32,
    pub drop_area: Rect,
}

/// Post-final-wave repeat loop with escalating enemy counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndlessMode {
    pub repeat_after_end: bool,
    /// Maximum number of repeats; 0 means unlimited.
    pub repeat_limit: u32,
    /// Wave index the sequence restarts from.
    pub repeat_from_wave: usize,
    /// Added to every spawn's count once per completed repeat.
    pub spawn_increase: u32,
    /// Prefix for the synthesized wave message on repeats.
    pub wave_message_prefix: String,
}

impl Default for EndlessMode {
    fn default() -> Self {
        Self {
            repeat_after_end: false,
            repeat_limit: 0,
            repeat_from_wave: 0,
            spawn_increase: 3,
            wave_message_prefix: "WAVE ".to_string(),
        }
    }
}

/// A timed batch of enemy spawns constituting one progression unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveDef {
    pub message: String,
    pub spawns: Vec<SpawnDef>,
    /// Total spawn time in distributed mode. In sequential mode the
    /// total is derived from the spawns instead.
    pub spawn_time: f32,
    /// Spawn groups one after another instead of interleaved across the
    /// whole spawn time.
    #[serde(default)]
    pub spawn_in_sequence: bool,
}

/// One group of identical enemies within a wave.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpawnDef {
    /// Index into `LevelConfig::enemies`.
    pub enemy: usize,
    pub count: u32,
    /// Seconds between units in sequential mode; derived from the
    /// wave's spawn time in distributed mode.
    #[serde(default)]
    pub spawn_rate: f32,
    /// Spawn inside the spawn area instead of beyond its edges.
    #[serde(default)]
    pub spawn_inside: bool,
}

/// Progression state persisted between runs. The engine emits save
/// intents carrying this; the host owns the storage format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressState {
    pub current_wave: usize,
    pub repeat_count: u32,
    pub score: i64,
    pub player_speed: f32,
    pub weapon_index: usize,
    /// Round-robin position of the ambient item spawner.
    pub item_index: usize,
}
