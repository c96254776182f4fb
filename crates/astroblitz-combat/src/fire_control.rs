//! Burst fire-control clock.
//!
//! A weapon fires in bursts: wait `burst_delay`, then release
//! `burst_shots` shots spaced `shot_rate` apart, then reset and wait
//! again. The clock only advances while the weapon has a target — the
//! caller simply stops ticking it otherwise.

use astroblitz_core::templates::WeaponTemplate;

/// Authored burst timing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurstParams {
    /// Seconds between bursts.
    pub burst_delay: f32,
    /// Shots per burst.
    pub burst_shots: u32,
    /// Seconds between shots within a burst.
    pub shot_rate: f32,
}

impl From<&WeaponTemplate> for BurstParams {
    fn from(t: &WeaponTemplate) -> Self {
        Self {
            burst_delay: t.burst_delay,
            burst_shots: t.burst_shots,
            shot_rate: t.shot_rate,
        }
    }
}

/// Runtime accumulators of one weapon's burst cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct BurstClock {
    burst_delay_count: f32,
    shots_fired: u32,
    shot_rate_count: f32,
}

impl BurstClock {
    /// Advance the clock by one tick. Returns true when exactly one
    /// shot should be released this tick.
    pub fn tick(&mut self, params: &BurstParams, dt: f32) -> bool {
        self.burst_delay_count += dt;
        if self.burst_delay_count < params.burst_delay {
            return false;
        }

        if self.shots_fired < params.burst_shots {
            self.shot_rate_count += dt;
            if self.shot_rate_count >= params.shot_rate {
                self.shot_rate_count = 0.0;
                self.shots_fired += 1;
                return true;
            }
        } else {
            // Burst spent: restart the cycle.
            self.shots_fired = 0;
            self.burst_delay_count = 0.0;
        }
        false
    }

    /// Reset the inter-shot accumulator (used when shooting starts).
    pub fn reset_shot_timer(&mut self) {
        self.shot_rate_count = 0.0;
    }
}
