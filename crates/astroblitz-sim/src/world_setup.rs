//! Entity spawn factories.
//!
//! Builds component bundles from authored templates. Runtime state
//! (counters, headings, waypoints) is initialized here; the templates
//! themselves are never mutated.

use glam::Vec2;
use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use astroblitz_core::components::*;
use astroblitz_core::enums::Faction;
use astroblitz_core::templates::{EnemyTemplate, ItemTemplate, PlayerTemplate, ShotTemplate};
use astroblitz_core::types::Rect;

use crate::systems::weapon::WeaponMount;

/// Spawn the player at the center of its move area.
pub fn spawn_player(world: &mut World, template: &PlayerTemplate, move_area: &Rect) -> Entity {
    let start = move_area.center();
    let weapon_index = template
        .weapon_index
        .min(template.weapons.len().saturating_sub(1));

    let player = world.spawn((
        Player,
        Position(start),
        Vitals::new(template.health, template.shield),
        ShieldRecharge::new(template.recharge_speed, template.recharge_delay),
        MeleeAttack {
            damage: template.melee_damage,
            one_hit: false,
            push_back: false,
        },
        PlayerMotion {
            speed: template.speed,
            move_area: *move_area,
            target_position: start,
        },
        Magnet {
            range: template.magnet_range,
            speed: template.magnet_speed,
        },
        Loadout { weapon_index },
    ));

    if let Some(weapon) = template.weapons.get(weapon_index) {
        let _ = world.insert_one(player, WeaponMount::new(weapon.clone(), Faction::Enemy));
    }

    player
}

/// Spawn one enemy from its template at a position, bound to the player
/// as its target.
pub fn spawn_enemy(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    template_index: usize,
    template: &EnemyTemplate,
    pos: Vec2,
    player: Option<Entity>,
) -> Entity {
    // Face the target at spawn so straight-movers fly toward it.
    let player_pos = player.and_then(|p| world.get::<&Position>(p).ok().map(|p| p.0));
    let heading = match (template.look_at_target, player_pos) {
        (true, Some(tp)) => (tp - pos).to_angle(),
        _ => 0.0,
    };

    let current_waypoint = if template.random_waypoint {
        random_point_in(rng, &template.waypoint_area)
    } else {
        pos
    };

    let enemy = world.spawn((
        Enemy {
            template: template_index,
        },
        Position(pos),
        Vitals::new(template.health, template.shield),
        MeleeAttack {
            damage: template.melee_damage,
            one_hit: template.one_hit_melee,
            push_back: !template.one_hit_melee,
        },
        EnemyMotion {
            speed: template.speed,
            chase_target: template.chase_target,
            look_at_target: template.look_at_target,
            engage_range: template.engage_range,
            disengage_range: template.disengage_range,
            is_chasing: false,
            heading,
            random_waypoint: template.random_waypoint,
            waypoint_time: template.waypoint_time,
            waypoint_time_count: 0.0,
            waypoint_area: template.waypoint_area,
            current_waypoint,
            push: None,
        },
    ));

    if let Some(weapon) = &template.weapon {
        let mut mount = WeaponMount::new(weapon.clone(), Faction::Player);
        mount.target = player;
        let _ = world.insert_one(enemy, mount);
    }

    enemy
}

/// Spawn a shot heading in the given direction.
pub fn spawn_shot(
    world: &mut World,
    template: &ShotTemplate,
    pos: Vec2,
    heading: f32,
    target_faction: Faction,
) -> Entity {
    world.spawn((
        Shot {
            damage: template.damage,
            speed: template.speed,
            speed_max: template.speed_max,
            acceleration: template.acceleration,
            remove_on_contact: template.remove_on_contact,
            target_faction,
            sine_range: template.sine_range,
            sine_speed: template.sine_speed,
            sine_phase: template.sine_phase,
            heading,
            initial_heading: heading,
        },
        Position(pos),
    ))
}

/// Spawn a dropped item.
pub fn spawn_item(
    world: &mut World,
    template_index: usize,
    template: &ItemTemplate,
    pos: Vec2,
) -> Entity {
    let item = world.spawn((
        Item {
            template: template_index,
            remove_after: template.remove_after,
            picked_up: false,
            active: true,
            fading: false,
        },
        Position(pos),
    ));
    if template.magnetic {
        let _ = world.insert_one(item, Magnetic);
    }
    item
}

/// Uniform random point inside a rectangle.
pub fn random_point_in(rng: &mut ChaCha8Rng, area: &Rect) -> Vec2 {
    Vec2::new(
        rng.gen_range(area.min.x..area.max.x),
        rng.gen_range(area.min.y..area.max.y),
    )
}
