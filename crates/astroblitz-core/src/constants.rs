//! Simulation constants and tuning parameters.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 60;

/// Seconds per tick at time scale 1.0.
pub const DT: f32 = 1.0 / TICK_RATE as f32;

/// Upper bound for the time scale multiplier.
pub const MAX_TIME_SCALE: f32 = 4.0;

// --- Wave scheduling ---

/// Distance beyond the spawn-area edge at which outside spawns appear.
pub const SPAWN_EDGE_MARGIN: f32 = 2.0;

/// Presentation delay between a wave being cleared and the next wave's
/// spawn timers starting.
pub const WAVE_START_DELAY: f32 = 0.5;

/// Delay before the victory/defeat terminal state is entered.
pub const END_SCREEN_DELAY: f32 = 1.0;

// --- Combat ---

/// Health fraction below which the low-health state is active.
pub const LOW_HEALTH_FRACTION: f32 = 0.2;

/// Distance an enemy is displaced by a melee push-back.
pub const PUSH_BACK_DISTANCE: f32 = 1.5;

/// Lerp rate of the push-back displacement.
pub const PUSH_BACK_SPEED: f32 = 10.0;

/// Duration of the push-back window (seconds). The enemy cannot steer
/// while pushed.
pub const PUSH_BACK_DURATION: f32 = 0.3;

// --- Player movement ---

/// The player steps directly toward its move target while farther than
/// speed * dt * this factor, and eases in below it.
pub const ARRIVE_THRESHOLD_FACTOR: f32 = 4.0;

/// Lerp rate factor for the final approach to the move target.
pub const SETTLE_RATE_FACTOR: f32 = 2.0;

// --- Items ---

/// Extra lifetime granted past an item effect's delay so the effect
/// always fires before the item is removed.
pub const ITEM_EFFECT_GRACE: f32 = 0.5;

/// Default number of inventory slots.
pub const DEFAULT_INVENTORY_SLOTS: usize = 4;
