//! Two-tier damage pipeline shared by player and enemies.
//!
//! Shot damage lands on the shield first; only once the shield is
//! depleted does it reach health. Melee skips this module's shield tier
//! and calls [`change_health`] directly.

use astroblitz_core::components::{ShieldRecharge, Vitals};
use astroblitz_core::constants::LOW_HEALTH_FRACTION;

/// What a call to [`absorb_damage`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// The shield took the hit. The shield may now be negative: a hit
    /// larger than the remaining shield is absorbed whole and the
    /// excess does NOT carry over to health in the same call.
    ShieldAbsorbed,
    /// No shield was left; the hit went to health.
    HealthApplied(HealthChange),
}

/// Result of a health change.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HealthChange {
    /// The delta was negative (a hit, not a heal).
    pub damaged: bool,
    /// The death latch flipped during this call. True at most once per
    /// entity lifetime.
    pub died: bool,
    /// The low-health state crossed its threshold; carries the new
    /// state.
    pub low_health_toggled: Option<bool>,
}

/// Apply shot damage: shield first, health only when the shield is
/// already gone.
pub fn absorb_damage(vitals: &mut Vitals, amount: f32) -> DamageOutcome {
    if vitals.shield > 0.0 {
        vitals.shield -= amount;
        DamageOutcome::ShieldAbsorbed
    } else {
        DamageOutcome::HealthApplied(change_health(vitals, -amount))
    }
}

/// Change health by a signed delta (damage or heal). Health is clamped
/// at the maximum only; it may go arbitrarily negative. The death latch
/// flips exactly once, on the first call that leaves health at or below
/// zero.
pub fn change_health(vitals: &mut Vitals, delta: f32) -> HealthChange {
    vitals.health += delta;
    if vitals.health > vitals.health_max {
        vitals.health = vitals.health_max;
    }

    let was_low = vitals.low_health;
    vitals.low_health = vitals.health < vitals.health_max * LOW_HEALTH_FRACTION;
    let low_health_toggled = (vitals.low_health != was_low).then_some(vitals.low_health);

    let mut died = false;
    if vitals.health <= 0.0 && !vitals.is_dead {
        vitals.is_dead = true;
        died = true;
    }

    HealthChange {
        damaged: delta < 0.0,
        died,
        low_health_toggled,
    }
}

/// Advance shield regeneration by one tick. The delay accumulator must
/// fill up (it is zeroed by any damage) before the shield climbs toward
/// its maximum. Returns true when the shield value changed.
pub fn recharge_shield(vitals: &mut Vitals, recharge: &mut ShieldRecharge, dt: f32) -> bool {
    if recharge.delay_count < recharge.delay {
        recharge.delay_count += dt;
        return false;
    }
    let before = vitals.shield;
    vitals.shield += recharge.speed * dt;
    if vitals.shield > vitals.shield_max {
        vitals.shield = vitals.shield_max;
    }
    vitals.shield != before
}
