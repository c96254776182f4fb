//! Weapon fire-control system.
//!
//! Each armed entity carries a `WeaponMount`. While the mount has a
//! live target it tracks (or free-spins past) it and advances its burst
//! clock; without one the weapon idles and no burst time is consumed.

use glam::Vec2;
use hecs::{Entity, World};

use astroblitz_combat::fire_control::{BurstClock, BurstParams};
use astroblitz_core::components::{Position, Vitals};
use astroblitz_core::enums::{EntityKind, Faction, SoundCue};
use astroblitz_core::events::GameEvent;
use astroblitz_core::templates::{ShotTemplate, WeaponTemplate};

use crate::actions::{ActionKind, ActionQueue};
use crate::world_setup;

/// A weapon bound to its owner entity.
#[derive(Debug, Clone)]
pub struct WeaponMount {
    pub template: WeaponTemplate,
    pub clock: BurstClock,
    /// Weapon heading in radians; muzzle offsets rotate with it.
    pub heading: f32,
    /// Next muzzle to fire in sequence mode.
    pub sequence_index: usize,
    pub is_shooting: bool,
    /// Revalidated every tick; cleared when the target dies or
    /// despawns.
    pub target: Option<Entity>,
    /// The faction this weapon's shots can hurt.
    pub target_faction: Faction,
}

impl WeaponMount {
    pub fn new(template: WeaponTemplate, target_faction: Faction) -> Self {
        let mut clock = BurstClock::default();
        clock.reset_shot_timer();
        Self {
            template,
            clock,
            heading: 0.0,
            sequence_index: 0,
            is_shooting: true,
            target: None,
            target_faction,
        }
    }
}

pub fn run(
    world: &mut World,
    dt: f32,
    now: f64,
    events: &mut Vec<GameEvent>,
    actions: &mut ActionQueue,
) {
    // Phase 1: snapshot owners and validate their targets while the
    // world is only shared-borrowed.
    let mut rows: Vec<(Entity, Vec2, bool, Option<Vec2>)> = Vec::new();
    {
        let mut query = world.query::<(&WeaponMount, &Position)>();
        for (entity, (mount, pos)) in query.iter() {
            let owner_dead = world
                .get::<&Vitals>(entity)
                .map(|v| v.is_dead)
                .unwrap_or(false);
            let target_pos = mount.target.and_then(|target| {
                let alive = world
                    .get::<&Vitals>(target)
                    .map(|v| !v.is_dead)
                    .unwrap_or(false);
                if !alive {
                    return None;
                }
                world.get::<&Position>(target).ok().map(|p| p.0)
            });
            rows.push((entity, pos.0, owner_dead, target_pos));
        }
    }

    // Phase 2: aim, advance burst clocks, release shots.
    for (entity, owner_pos, owner_dead, target_pos) in rows {
        if owner_dead {
            continue;
        }

        let mut to_spawn: Vec<(ShotTemplate, Vec2, f32)> = Vec::new();
        let faction;
        {
            let Ok(mut mount) = world.get::<&mut WeaponMount>(entity) else {
                continue;
            };
            faction = mount.target_faction;

            let Some(target) = target_pos else {
                // Lost or no target: drop the stale handle and idle.
                mount.target = None;
                continue;
            };

            if mount.template.look_at_target {
                mount.heading = (target - owner_pos).to_angle();
            } else {
                mount.heading += mount.template.rotate_speed * dt;
            }

            if !mount.is_shooting {
                continue;
            }
            let params = BurstParams::from(&mount.template);
            if !mount.clock.tick(&params, dt) {
                continue;
            }

            let heading = mount.heading;
            if mount.template.shoot_in_sequence {
                if !mount.template.muzzles.is_empty() {
                    let index = mount.sequence_index % mount.template.muzzles.len();
                    let muzzle = &mount.template.muzzles[index];
                    to_spawn.push((
                        muzzle.shot.clone(),
                        owner_pos + Vec2::from_angle(heading).rotate(muzzle.offset),
                        heading,
                    ));
                    mount.sequence_index = (index + 1) % mount.template.muzzles.len();
                }
            } else {
                for muzzle in &mount.template.muzzles {
                    to_spawn.push((
                        muzzle.shot.clone(),
                        owner_pos + Vec2::from_angle(heading).rotate(muzzle.offset),
                        heading,
                    ));
                }
            }
        }

        if to_spawn.is_empty() {
            continue;
        }
        for (template, pos, heading) in to_spawn {
            let shot = world_setup::spawn_shot(world, &template, pos, heading, faction);
            events.push(GameEvent::EntitySpawned {
                id: shot.to_bits().get(),
                kind: EntityKind::Shot,
            });
            // Shots expire on their own; cancelled implicitly if the
            // shot is removed on contact first.
            actions.schedule(
                now + template.lifetime_secs as f64,
                Some(shot),
                ActionKind::RemoveEntity,
            );
        }
        events.push(GameEvent::SoundRequested {
            sound: SoundCue::Shot,
        });
    }
}
