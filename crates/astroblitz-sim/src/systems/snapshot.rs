//! Snapshot system: queries the ECS world and builds a complete
//! GameStateSnapshot.
//!
//! This system is read-only — it never modifies the world.

use hecs::World;

use astroblitz_core::components::*;
use astroblitz_core::enums::{EntityKind, GamePhase};
use astroblitz_core::events::GameEvent;
use astroblitz_core::state::*;
use astroblitz_core::templates::LevelConfig;
use astroblitz_core::types::SimTime;

use super::wave_scheduler::LevelState;
use crate::engine::ScoreState;

/// Build a complete GameStateSnapshot from the current world state.
#[allow(clippy::too_many_arguments)]
pub fn build(
    world: &World,
    time: &SimTime,
    phase: GamePhase,
    score: &ScoreState,
    level: &LevelState,
    config: &LevelConfig,
    inventory: &[Option<usize>],
    events: Vec<GameEvent>,
) -> GameStateSnapshot {
    GameStateSnapshot {
        time: *time,
        phase,
        score: ScoreView {
            score: score.score,
            multiplier: score.multiplier,
        },
        wave: WaveView {
            current_wave: level.current_wave,
            wave_count: config.waves.len(),
            repeat_count: level.repeat_count,
            spawning: !level.done && !level.wave_cleared,
            enemies_alive: LevelState::live_enemy_count(world),
        },
        player: build_player(world),
        entities: build_entities(world),
        inventory: inventory.to_vec(),
        events,
    }
}

fn build_player(world: &World) -> Option<PlayerView> {
    let mut query = world.query::<(&Player, &Position, &Vitals, &PlayerMotion, &Loadout)>();
    query
        .iter()
        .next()
        .map(|(entity, (_, pos, vitals, motion, loadout))| PlayerView {
            id: entity.to_bits().get(),
            x: pos.0.x,
            y: pos.0.y,
            health: vitals.health,
            health_max: vitals.health_max,
            shield: vitals.shield,
            shield_max: vitals.shield_max,
            is_dead: vitals.is_dead,
            speed: motion.speed,
            weapon_index: loadout.weapon_index,
        })
}

fn build_entities(world: &World) -> Vec<EntityView> {
    let mut entities = Vec::new();

    let mut enemies = world.query::<(&Enemy, &Position, &EnemyMotion)>();
    for (entity, (enemy, pos, motion)) in enemies.iter() {
        entities.push(EntityView {
            id: entity.to_bits().get(),
            kind: EntityKind::Enemy,
            template: Some(enemy.template),
            x: pos.0.x,
            y: pos.0.y,
            heading: motion.heading,
        });
    }

    let mut shots = world.query::<(&Shot, &Position)>();
    for (entity, (shot, pos)) in shots.iter() {
        entities.push(EntityView {
            id: entity.to_bits().get(),
            kind: EntityKind::Shot,
            template: None,
            x: pos.0.x,
            y: pos.0.y,
            heading: shot.heading,
        });
    }

    let mut items = world.query::<(&Item, &Position)>();
    for (entity, (item, pos)) in items.iter() {
        entities.push(EntityView {
            id: entity.to_bits().get(),
            kind: EntityKind::Item,
            template: Some(item.template),
            x: pos.0.x,
            y: pos.0.y,
            heading: 0.0,
        });
    }

    entities
}
