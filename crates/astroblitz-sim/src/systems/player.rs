//! Player system: steering toward the commanded position, shield
//! recharge, magnet pull, and per-tick target acquisition for the
//! player's weapon.

use glam::Vec2;
use hecs::{Entity, World};

use astroblitz_combat::damage::recharge_shield;
use astroblitz_combat::targeting::find_nearest;
use astroblitz_core::components::*;
use astroblitz_core::constants::{ARRIVE_THRESHOLD_FACTOR, SETTLE_RATE_FACTOR};
use astroblitz_core::enums::BarKind;
use astroblitz_core::events::GameEvent;
use astroblitz_core::templates::LevelConfig;

use super::weapon::WeaponMount;

pub fn run(
    world: &mut World,
    player: Entity,
    config: &LevelConfig,
    dt: f32,
    events: &mut Vec<GameEvent>,
) {
    let player_pos = match step_player(world, player, dt, events) {
        Some(pos) => pos,
        None => return, // dead or missing: no steering, targeting, or recharge
    };

    pull_magnetics(world, player, player_pos, dt);
    acquire_target(world, player, player_pos, config);
}

/// Movement, move-area clamp, and shield recharge. Returns the player's
/// position, or None when the player is dead.
fn step_player(
    world: &mut World,
    player: Entity,
    dt: f32,
    events: &mut Vec<GameEvent>,
) -> Option<Vec2> {
    let (pos, vitals, recharge, motion) = world
        .query_one_mut::<(&mut Position, &mut Vitals, &mut ShieldRecharge, &PlayerMotion)>(player)
        .ok()?;

    if vitals.is_dead {
        return None;
    }

    // Chase the commanded target position: step directly while far,
    // ease in when close.
    let to_target = motion.target_position - pos.0;
    let distance = to_target.length();
    if distance > motion.speed * dt * ARRIVE_THRESHOLD_FACTOR {
        pos.0 += Vec2::from_angle(to_target.to_angle()) * motion.speed * dt;
    } else if distance > 0.0 {
        let t = (dt * motion.speed * SETTLE_RATE_FACTOR).min(1.0);
        pos.0 = pos.0.lerp(motion.target_position, t);
    }
    pos.0 = motion.move_area.clamp(pos.0);

    if recharge_shield(vitals, recharge, dt) {
        events.push(GameEvent::BarChanged {
            id: player.to_bits().get(),
            bar: BarKind::Shield,
            fraction: vitals.shield_fraction(),
        });
    }

    Some(pos.0)
}

/// Drag active magnetic items toward the player.
fn pull_magnetics(world: &mut World, player: Entity, player_pos: Vec2, dt: f32) {
    let magnet = match world.get::<&Magnet>(player) {
        Ok(m) => *m,
        Err(_) => return,
    };
    if magnet.range <= 0.0 {
        return;
    }

    for (_entity, (_magnetic, item, pos)) in
        world.query_mut::<(&Magnetic, &Item, &mut Position)>()
    {
        if !item.active {
            continue;
        }
        let offset = player_pos - pos.0;
        if offset.length() <= magnet.range {
            pos.0 += Vec2::from_angle(offset.to_angle()) * magnet.speed * dt;
        }
    }
}

/// Acquire the nearest live enemy inside the spawn area and hand it to
/// the weapon. Recomputed from scratch every tick — the population
/// changes each frame.
fn acquire_target(world: &mut World, player: Entity, player_pos: Vec2, config: &LevelConfig) {
    let target = {
        let mut query = world.query::<(&Enemy, &Vitals, &Position)>();
        find_nearest(
            player_pos,
            &config.spawn_area,
            query
                .iter()
                .filter(|(_, (_, vitals, _))| !vitals.is_dead)
                .map(|(entity, (_, _, pos))| (entity, pos.0)),
        )
    };

    if let Ok(mut mount) = world.get::<&mut WeaponMount>(player) {
        mount.target = target;
    }
}
