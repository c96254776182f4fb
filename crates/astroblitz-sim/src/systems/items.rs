//! Item system: aging and fade-out, pickup, effect scheduling, loot
//! drops, and the ambient item spawner.

use glam::Vec2;
use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use astroblitz_core::components::{Item, Position, Vitals};
use astroblitz_core::constants::ITEM_EFFECT_GRACE;
use astroblitz_core::enums::{EffectKind, EntityKind, SoundCue};
use astroblitz_core::events::GameEvent;
use astroblitz_core::templates::LevelConfig;

use crate::actions::{ActionKind, ActionQueue};
use crate::engine::ScoreState;
use crate::inventory::Inventory;
use crate::world_setup;

/// Runtime state of the ambient item spawner.
#[derive(Debug, Clone, Default)]
pub struct ItemSpawnerState {
    /// Round-robin position in the spawner's item list.
    pub index: usize,
    pub rate_count: f32,
}

/// Flatten each enemy's weighted drop table into a pool of item
/// indices, done once at level load. An entry with drop_rate N
/// contributes N slots, so a uniform pick over the pool weights items
/// by their rate.
pub fn flatten_drop_tables(config: &LevelConfig) -> Vec<Vec<usize>> {
    config
        .enemies
        .iter()
        .map(|enemy| {
            let mut pool = Vec::new();
            for drop in &enemy.drops {
                for _ in 0..drop.drop_rate {
                    pool.push(drop.item);
                }
            }
            pool
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
pub fn run(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    config: &LevelConfig,
    dt: f32,
    now: f64,
    events: &mut Vec<GameEvent>,
    actions: &mut ActionQueue,
    score: &mut ScoreState,
    inventory: &mut Inventory,
    spawner: &mut Option<ItemSpawnerState>,
    player: Option<Entity>,
) {
    run_spawner(world, rng, config, dt, events, spawner);
    age_items(world, config, dt, now, events, actions);

    // Pickup requires a living player.
    let Some(player) = player else {
        return;
    };
    let alive = world
        .get::<&Vitals>(player)
        .map(|v| !v.is_dead)
        .unwrap_or(false);
    if !alive {
        return;
    }
    let Some(player_pos) = world.get::<&Position>(player).ok().map(|p| p.0) else {
        return;
    };

    let mut picked: Vec<(Entity, usize)> = Vec::new();
    for (entity, (item, pos)) in world.query_mut::<(&mut Item, &Position)>() {
        if !item.active || item.picked_up {
            continue;
        }
        let Some(template) = config.items.get(item.template) else {
            continue;
        };
        if pos.0.distance(player_pos) < template.pickup_range {
            item.picked_up = true;
            picked.push((entity, item.template));
        }
    }
    for (entity, template_index) in picked {
        pickup(
            world,
            entity,
            template_index,
            config,
            now,
            events,
            actions,
            score,
            inventory,
        );
    }
}

/// Periodic ambient spawner: one item every `drop_rate` seconds,
/// cycling round-robin through the configured list.
fn run_spawner(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    config: &LevelConfig,
    dt: f32,
    events: &mut Vec<GameEvent>,
    spawner: &mut Option<ItemSpawnerState>,
) {
    let (Some(state), Some(def)) = (spawner.as_mut(), config.item_spawner.as_ref()) else {
        return;
    };
    if def.items.is_empty() {
        return;
    }
    state.rate_count += dt;
    if state.rate_count < def.drop_rate {
        return;
    }
    state.rate_count = 0.0;

    let item_index = def.items[state.index % def.items.len()];
    state.index = (state.index + 1) % def.items.len();
    let Some(template) = config.items.get(item_index) else {
        return;
    };
    let pos = world_setup::random_point_in(rng, &def.drop_area);
    let item = world_setup::spawn_item(world, item_index, template, pos);
    events.push(GameEvent::EntitySpawned {
        id: item.to_bits().get(),
        kind: EntityKind::Item,
    });
}

/// Count down item lifetimes; expired items fade out and get their
/// removal scheduled after the fade animation.
fn age_items(
    world: &mut World,
    config: &LevelConfig,
    dt: f32,
    now: f64,
    events: &mut Vec<GameEvent>,
    actions: &mut ActionQueue,
) {
    for (entity, (item, pos)) in world.query_mut::<(&mut Item, &Position)>() {
        item.remove_after -= dt;
        if item.remove_after <= 0.0 && !item.fading {
            item.fading = true;
            item.active = false;
            let fade_secs = config
                .items
                .get(item.template)
                .map(|t| t.fade_secs)
                .unwrap_or(0.0);
            events.push(GameEvent::EffectRequested {
                effect: EffectKind::ItemFade,
                x: pos.0.x,
                y: pos.0.y,
                heading: 0.0,
            });
            actions.schedule(now + fade_secs as f64, Some(entity), ActionKind::RemoveEntity);
        }
    }
}

/// Handle a pickup: store it, or use it on the spot.
#[allow(clippy::too_many_arguments)]
fn pickup(
    world: &mut World,
    item_entity: Entity,
    template_index: usize,
    config: &LevelConfig,
    now: f64,
    events: &mut Vec<GameEvent>,
    actions: &mut ActionQueue,
    score: &mut ScoreState,
    inventory: &mut Inventory,
) {
    let Some(template) = config.items.get(template_index) else {
        return;
    };
    let id = item_entity.to_bits().get();

    // A full inventory falls through to immediate use.
    if template.add_to_inventory && inventory.store(template_index) {
        events.push(GameEvent::ItemPickedUp {
            id,
            template: template_index,
            stored: true,
        });
        events.push(GameEvent::EntityRemoved { id });
        let _ = world.despawn(item_entity);
        return;
    }

    apply_item(template_index, config, now, events, actions, score);
    events.push(GameEvent::ItemPickedUp {
        id,
        template: template_index,
        stored: false,
    });

    // Disable the item but keep it around long enough for its slowest
    // effect to fire.
    if let Ok(mut item) = world.get::<&mut Item>(item_entity) {
        item.active = false;
        for effect in &template.effects {
            if effect.delay_secs > item.remove_after {
                item.remove_after = effect.delay_secs + ITEM_EFFECT_GRACE;
            }
        }
    }
}

/// Use an item: schedule its effects, award its score, play the pickup
/// sound. Shared by field pickups and inventory use.
pub fn apply_item(
    template_index: usize,
    config: &LevelConfig,
    now: f64,
    events: &mut Vec<GameEvent>,
    actions: &mut ActionQueue,
    score: &mut ScoreState,
) {
    let Some(template) = config.items.get(template_index) else {
        return;
    };
    for effect in &template.effects {
        actions.schedule(
            now + effect.delay_secs as f64,
            None,
            ActionKind::ItemEffect {
                target: effect.target,
                action: effect.action,
            },
        );
    }
    if template.score != 0 {
        let applied = score.add(template.score);
        events.push(GameEvent::ScoreChanged {
            score: score.score,
            delta: applied,
        });
    }
    events.push(GameEvent::SoundRequested {
        sound: SoundCue::Pickup,
    });
}

/// Drop loot at a death position: a uniform roll of how many items,
/// each picked independently from the flattened pool and scattered
/// along a random heading.
pub fn drop_loot(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    config: &LevelConfig,
    pools: &[Vec<usize>],
    enemy_template: usize,
    pos: Vec2,
    events: &mut Vec<GameEvent>,
) {
    let Some(template) = config.enemies.get(enemy_template) else {
        return;
    };
    let Some(pool) = pools.get(enemy_template) else {
        return;
    };
    if pool.is_empty() {
        return;
    }

    let lo = template.drop_count_min.min(template.drop_count_max);
    let hi = template.drop_count_min.max(template.drop_count_max);
    let count = rng.gen_range(lo..=hi).round() as i64;
    for _ in 0..count {
        let item_index = pool[rng.gen_range(0..pool.len())];
        let Some(item_template) = config.items.get(item_index) else {
            continue;
        };
        let heading = rng.gen::<f32>() * std::f32::consts::TAU;
        let drop_pos = pos + Vec2::from_angle(heading) * template.drop_spread;
        let item = world_setup::spawn_item(world, item_index, item_template, drop_pos);
        events.push(GameEvent::EntitySpawned {
            id: item.to_bits().get(),
            kind: EntityKind::Item,
        });
    }
}
