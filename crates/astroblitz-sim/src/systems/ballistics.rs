//! Shot kinematics: acceleration toward the speed cap, movement along
//! the heading, and the sinusoidal heading wobble.

use glam::Vec2;
use hecs::World;

use astroblitz_core::components::{Position, Shot};

pub fn run(world: &mut World, dt: f32, elapsed_secs: f64) {
    for (_entity, (shot, pos)) in world.query_mut::<(&mut Shot, &mut Position)>() {
        // Speed climbs monotonically toward the cap, then clamps.
        if shot.speed < shot.speed_max {
            shot.speed = (shot.speed + shot.acceleration * dt).min(shot.speed_max);
        } else if shot.speed != shot.speed_max {
            shot.speed = shot.speed_max;
        }

        pos.0 += Vec2::from_angle(shot.heading) * shot.speed * dt;

        // Angular wobble around the spawn heading, phased off the
        // global sim clock.
        if shot.sine_range != 0.0 {
            shot.heading = shot.initial_heading
                + ((elapsed_secs as f32 + shot.sine_phase) * shot.sine_speed).sin()
                    * shot.sine_range;
        }
    }
}
