//! Contact resolution.
//!
//! The host's physics reports "A touched B" pairs; this system turns
//! them into damage. Shots apply the two-tier shield/health pipeline;
//! melee bypasses the shield and lands on health directly. A sustained
//! overlap re-applies shot damage every tick it is reported, so a
//! non-removing shot parked inside a target deals damage per frame.

use glam::Vec2;
use hecs::{Entity, World};
use rand_chacha::ChaCha8Rng;

use astroblitz_combat::damage::{absorb_damage, change_health, DamageOutcome, HealthChange};
use astroblitz_core::components::*;
use astroblitz_core::constants::{
    END_SCREEN_DELAY, PUSH_BACK_DISTANCE, PUSH_BACK_DURATION, PUSH_BACK_SPEED,
};
use astroblitz_core::enums::{BarKind, EffectKind, Faction, SoundCue};
use astroblitz_core::events::GameEvent;
use astroblitz_core::templates::LevelConfig;

use crate::actions::{ActionKind, ActionQueue};
use crate::engine::ScoreState;

use super::items;

/// A host-reported contact pair. `sustained` marks an ongoing overlap
/// rather than a fresh touch.
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    pub a: Entity,
    pub b: Entity,
    pub sustained: bool,
}

#[allow(clippy::too_many_arguments)]
pub fn run(
    world: &mut World,
    contacts: &mut Vec<Contact>,
    config: &LevelConfig,
    pools: &[Vec<usize>],
    rng: &mut ChaCha8Rng,
    events: &mut Vec<GameEvent>,
    actions: &mut ActionQueue,
    score: &mut ScoreState,
    now: f64,
) {
    let queued: Vec<Contact> = contacts.drain(..).collect();
    for contact in queued {
        resolve(
            world,
            contact,
            config,
            pools,
            rng,
            events,
            actions,
            score,
            now,
        );
    }
}

#[allow(clippy::too_many_arguments)]
fn resolve(
    world: &mut World,
    contact: Contact,
    config: &LevelConfig,
    pools: &[Vec<usize>],
    rng: &mut ChaCha8Rng,
    events: &mut Vec<GameEvent>,
    actions: &mut ActionQueue,
    score: &mut ScoreState,
    now: f64,
) {
    let Contact { a, b, sustained } = contact;
    if !world.contains(a) || !world.contains(b) {
        return;
    }
    // Ghosted entities have no collision presence at all.
    if world.get::<&Ghosted>(a).is_ok() || world.get::<&Ghosted>(b).is_ok() {
        return;
    }

    shot_hit(world, a, b, config, pools, rng, events, actions, score, now);
    shot_hit(world, b, a, config, pools, rng, events, actions, score, now);

    // Melee triggers on fresh touches only; both sides strike.
    if !sustained {
        melee(world, a, b, config, pools, rng, events, actions, score, now);
        melee(world, b, a, config, pools, rng, events, actions, score, now);
    }
}

/// Resolve `shot_entity` striking `target_entity`, if that is what the
/// pair is.
#[allow(clippy::too_many_arguments)]
fn shot_hit(
    world: &mut World,
    shot_entity: Entity,
    target_entity: Entity,
    config: &LevelConfig,
    pools: &[Vec<usize>],
    rng: &mut ChaCha8Rng,
    events: &mut Vec<GameEvent>,
    actions: &mut ActionQueue,
    score: &mut ScoreState,
    now: f64,
) {
    if !world.contains(shot_entity) || !world.contains(target_entity) {
        return;
    }
    let Some(shot) = world.get::<&Shot>(shot_entity).ok().map(|s| *s) else {
        return;
    };
    if !has_faction(world, target_entity, shot.target_faction) {
        return;
    }
    let Some(shot_pos) = world.get::<&Position>(shot_entity).ok().map(|p| p.0) else {
        return;
    };
    let target_pos = world
        .get::<&Position>(target_entity)
        .map(|p| p.0)
        .unwrap_or(shot_pos);

    let state = {
        let Ok(mut vitals) = world.get::<&mut Vitals>(target_entity) else {
            return;
        };
        let outcome = absorb_damage(&mut vitals, shot.damage);
        (outcome, vitals.shield_fraction(), vitals.health_fraction())
    };
    let (outcome, shield_fraction, health_fraction) = state;
    let target_id = target_entity.to_bits().get();

    match outcome {
        DamageOutcome::ShieldAbsorbed => {
            // Shield damage restarts the recharge delay too.
            if let Ok(mut recharge) = world.get::<&mut ShieldRecharge>(target_entity) {
                recharge.delay_count = 0.0;
            }
            events.push(GameEvent::BarChanged {
                id: target_id,
                bar: BarKind::Shield,
                fraction: shield_fraction,
            });
            events.push(GameEvent::EffectRequested {
                effect: EffectKind::ShieldHit,
                x: shot_pos.x,
                y: shot_pos.y,
                heading: (target_pos - shot_pos).to_angle(),
            });
        }
        DamageOutcome::HealthApplied(change) => {
            events.push(GameEvent::EffectRequested {
                effect: EffectKind::Hit,
                x: shot_pos.x,
                y: shot_pos.y,
                heading: shot.heading,
            });
            after_health_change(
                world,
                target_entity,
                change,
                health_fraction,
                config,
                pools,
                rng,
                events,
                actions,
                score,
                now,
            );
        }
    }

    if shot.remove_on_contact {
        events.push(GameEvent::EntityRemoved {
            id: shot_entity.to_bits().get(),
        });
        let _ = world.despawn(shot_entity);
    }
}

/// Resolve `attacker` landing a melee hit on `victim`, if the pair is a
/// cross-faction touch between combatants.
#[allow(clippy::too_many_arguments)]
fn melee(
    world: &mut World,
    attacker: Entity,
    victim: Entity,
    config: &LevelConfig,
    pools: &[Vec<usize>],
    rng: &mut ChaCha8Rng,
    events: &mut Vec<GameEvent>,
    actions: &mut ActionQueue,
    score: &mut ScoreState,
    now: f64,
) {
    if !world.contains(attacker) || !world.contains(victim) {
        return;
    }
    let Some(attack) = world.get::<&MeleeAttack>(attacker).ok().map(|m| *m) else {
        return;
    };
    let Some(attacker_faction) = faction_of(world, attacker) else {
        return;
    };
    if !has_faction(world, victim, attacker_faction.opponent()) {
        return;
    }
    let attacker_dead = world
        .get::<&Vitals>(attacker)
        .map(|v| v.is_dead)
        .unwrap_or(false);
    let victim_dead = world
        .get::<&Vitals>(victim)
        .map(|v| v.is_dead)
        .unwrap_or(true);
    if attacker_dead || victim_dead {
        return;
    }
    let Some(attacker_pos) = world.get::<&Position>(attacker).ok().map(|p| p.0) else {
        return;
    };
    let Some(victim_pos) = world.get::<&Position>(victim).ok().map(|p| p.0) else {
        return;
    };

    // Melee circumvents the shield.
    let (change, health_fraction) = {
        let Ok(mut vitals) = world.get::<&mut Vitals>(victim) else {
            return;
        };
        let change = change_health(&mut vitals, -attack.damage);
        (change, vitals.health_fraction())
    };

    let mid = (attacker_pos + victim_pos) * 0.5;
    events.push(GameEvent::EffectRequested {
        effect: EffectKind::Melee,
        x: mid.x,
        y: mid.y,
        heading: 0.0,
    });
    events.push(GameEvent::SoundRequested {
        sound: SoundCue::Melee,
    });
    after_health_change(
        world,
        victim,
        change,
        health_fraction,
        config,
        pools,
        rng,
        events,
        actions,
        score,
        now,
    );

    if attack.one_hit {
        // One-hit attackers (meteors) die on contact.
        let state = {
            let Ok(mut vitals) = world.get::<&mut Vitals>(attacker) else {
                return;
            };
            let lethal = vitals.health_max;
            let change = change_health(&mut vitals, -lethal);
            (change, vitals.health_fraction())
        };
        after_health_change(
            world, attacker, state.0, state.1, config, pools, rng, events, actions, score, now,
        );
    } else if attack.push_back {
        if let Ok(mut motion) = world.get::<&mut EnemyMotion>(attacker) {
            motion.push = Some(PushState {
                target: attacker_pos
                    - Vec2::from_angle(motion.heading) * PUSH_BACK_DISTANCE,
                speed: PUSH_BACK_SPEED,
                time_left: PUSH_BACK_DURATION,
            });
        }
    }
}

/// Shared tail of every health change: recharge-delay reset, hit
/// reaction, bar update, low-health toggle, and one-shot death side
/// effects. Also used by the engine for item heals and damage.
#[allow(clippy::too_many_arguments)]
pub fn after_health_change(
    world: &mut World,
    entity: Entity,
    change: HealthChange,
    health_fraction: f32,
    config: &LevelConfig,
    pools: &[Vec<usize>],
    rng: &mut ChaCha8Rng,
    events: &mut Vec<GameEvent>,
    actions: &mut ActionQueue,
    score: &mut ScoreState,
    now: f64,
) {
    let id = entity.to_bits().get();
    if change.damaged {
        if let Ok(mut recharge) = world.get::<&mut ShieldRecharge>(entity) {
            recharge.delay_count = 0.0;
        }
        events.push(GameEvent::HitReaction { id });
    }
    events.push(GameEvent::BarChanged {
        id,
        bar: BarKind::Health,
        fraction: health_fraction,
    });
    if let Some(active) = change.low_health_toggled {
        events.push(GameEvent::LowHealth { id, active });
    }
    if change.died {
        on_death(world, entity, config, pools, rng, events, actions, score, now);
    }
}

/// Apply a signed health delta (item heals, scripted damage) through
/// the full pipeline.
#[allow(clippy::too_many_arguments)]
pub fn apply_health_change(
    world: &mut World,
    entity: Entity,
    delta: f32,
    config: &LevelConfig,
    pools: &[Vec<usize>],
    rng: &mut ChaCha8Rng,
    events: &mut Vec<GameEvent>,
    actions: &mut ActionQueue,
    score: &mut ScoreState,
    now: f64,
) {
    let state = {
        let Ok(mut vitals) = world.get::<&mut Vitals>(entity) else {
            return;
        };
        let change = change_health(&mut vitals, delta);
        (change, vitals.health_fraction())
    };
    after_health_change(
        world, entity, state.0, state.1, config, pools, rng, events, actions, score, now,
    );
}

/// Death side effects, reached exactly once per entity through the
/// `is_dead` latch: death effect, score award and loot for enemies,
/// corpse-removal scheduling, and the defeat transition for the player.
#[allow(clippy::too_many_arguments)]
fn on_death(
    world: &mut World,
    entity: Entity,
    config: &LevelConfig,
    pools: &[Vec<usize>],
    rng: &mut ChaCha8Rng,
    events: &mut Vec<GameEvent>,
    actions: &mut ActionQueue,
    score: &mut ScoreState,
    now: f64,
) {
    let pos = world
        .get::<&Position>(entity)
        .map(|p| p.0)
        .unwrap_or_default();
    events.push(GameEvent::EffectRequested {
        effect: EffectKind::Death,
        x: pos.x,
        y: pos.y,
        heading: 0.0,
    });

    let enemy_template = world.get::<&Enemy>(entity).ok().map(|e| e.template);
    if let Some(template_index) = enemy_template {
        if let Some(template) = config.enemies.get(template_index) {
            if template.score != 0 {
                let applied = score.add(template.score);
                events.push(GameEvent::ScoreChanged {
                    score: score.score,
                    delta: applied,
                });
            }
            items::drop_loot(world, rng, config, pools, template_index, pos, events);
            actions.schedule(
                now + template.remove_dead_secs as f64,
                Some(entity),
                ActionKind::RemoveEntity,
            );
        }
    } else if world.get::<&Player>(entity).is_ok() {
        let delay = config.player.remove_dead_secs as f64;
        actions.schedule(now + delay, Some(entity), ActionKind::RemoveEntity);
        actions.schedule(
            now + delay + END_SCREEN_DELAY as f64,
            None,
            ActionKind::EndMission { victory: false },
        );
    }
}

fn has_faction(world: &World, entity: Entity, faction: Faction) -> bool {
    match faction {
        Faction::Player => world.get::<&Player>(entity).is_ok(),
        Faction::Enemy => world.get::<&Enemy>(entity).is_ok(),
    }
}

fn faction_of(world: &World, entity: Entity) -> Option<Faction> {
    if world.get::<&Player>(entity).is_ok() {
        Some(Faction::Player)
    } else if world.get::<&Enemy>(entity).is_ok() {
        Some(Faction::Enemy)
    } else {
        None
    }
}
