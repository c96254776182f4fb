//! Enemy movement system: chase with engage/disengage hysteresis,
//! random-waypoint wandering, straight flight along the spawn heading,
//! and the melee push-back window.

use glam::Vec2;
use hecs::{Entity, World};
use rand_chacha::ChaCha8Rng;

use astroblitz_core::components::*;

use crate::world_setup;

pub fn run(world: &mut World, rng: &mut ChaCha8Rng, player: Option<Entity>, dt: f32) {
    // Enemies steer at the player's position; without one (player
    // removed after defeat) they hold still.
    let target_pos: Option<Vec2> =
        player.and_then(|p| world.get::<&Position>(p).ok().map(|pos| pos.0));

    for (_entity, (_enemy, pos, motion, vitals)) in
        world.query_mut::<(&Enemy, &mut Position, &mut EnemyMotion, &Vitals)>()
    {
        if vitals.is_dead {
            continue;
        }

        // A pushed enemy loses control until the window expires.
        if let Some(push) = &mut motion.push {
            let t = (dt * push.speed).min(1.0);
            pos.0 = pos.0.lerp(push.target, t);
            push.time_left -= dt;
            if push.time_left <= 0.0 {
                motion.push = None;
            }
            continue;
        }

        if motion.random_waypoint {
            motion.waypoint_time_count += dt;
            if motion.waypoint_time_count > motion.waypoint_time {
                motion.waypoint_time_count = 0.0;
                motion.current_waypoint = world_setup::random_point_in(rng, &motion.waypoint_area);
            }
        }

        let Some(mut chase_pos) = target_pos else {
            continue;
        };
        if motion.random_waypoint {
            chase_pos = motion.current_waypoint;
        }

        if motion.chase_target {
            let distance = pos.0.distance(chase_pos);
            if !motion.is_chasing && distance < motion.engage_range {
                motion.is_chasing = true;
            }
            if motion.is_chasing {
                if distance > motion.disengage_range {
                    motion.is_chasing = false;
                }
                motion.heading = (chase_pos - pos.0).to_angle();
            }
        }

        // Chasers move while locked on; non-chasers always drift along
        // their heading.
        let moving = (motion.is_chasing && pos.0.distance(chase_pos) > motion.speed * dt)
            || !motion.chase_target;
        if moving {
            pos.0 += Vec2::from_angle(motion.heading) * motion.speed * dt;
        }
    }
}
