//! Wave scheduling system — allocates spawn timing per wave, releases
//! enemies over the wave's spawn window, detects wave clear, and drives
//! Endless Mode progression.

use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use astroblitz_core::components::{Enemy, Vitals};
use astroblitz_core::constants::{SPAWN_EDGE_MARGIN, WAVE_START_DELAY};
use astroblitz_core::enums::{EntityKind, SoundCue};
use astroblitz_core::events::GameEvent;
use astroblitz_core::templates::LevelConfig;
use astroblitz_core::types::Rect;

use crate::world_setup;

/// Signals the engine acts on after a wave transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveSignal {
    /// A wave is starting: a progress-save checkpoint.
    Checkpoint,
    /// The wave list is exhausted and Endless Mode does not (or may no
    /// longer) repeat.
    Victory,
}

/// Runtime spawn row, derived from an authored `SpawnDef` at wave start.
#[derive(Debug, Clone)]
pub struct SpawnState {
    pub enemy: usize,
    pub remaining: u32,
    /// Seconds between units.
    pub rate: f32,
    /// Seconds until this row starts releasing units.
    pub delay: f32,
    pub rate_count: f32,
    pub spawn_inside: bool,
}

/// Wave progression state for one level run.
#[derive(Debug, Clone, Default)]
pub struct LevelState {
    pub current_wave: usize,
    pub repeat_count: u32,
    /// Between waves: spawn timers are not running.
    pub wave_cleared: bool,
    /// Presentation delay before the next wave's timers start.
    pub start_countdown: f32,
    pub spawn_states: Vec<SpawnState>,
    pub spawn_time_left: f32,
    /// Terminal: victory reached, nothing left to schedule.
    pub done: bool,
}

impl LevelState {
    /// Enter the wave `current_wave` points at, or repeat/finish when
    /// the list is exhausted. Mirrors the wave-cleared decision tree.
    pub fn advance(&mut self, config: &LevelConfig, events: &mut Vec<GameEvent>) -> WaveSignal {
        if self.current_wave < config.waves.len() {
            self.begin_wave(config, events);
            return WaveSignal::Checkpoint;
        }

        let endless = &config.endless;
        if endless.repeat_after_end
            && !config.waves.is_empty()
            && (endless.repeat_limit == 0 || self.repeat_count < endless.repeat_limit)
        {
            self.repeat_count += 1;
            self.current_wave = endless.repeat_from_wave.min(config.waves.len() - 1);
            self.begin_wave(config, events);
            return WaveSignal::Checkpoint;
        }

        self.done = true;
        WaveSignal::Victory
    }

    /// Derive spawn timing for the current wave from its immutable
    /// definition and the Endless Mode repeat count.
    fn begin_wave(&mut self, config: &LevelConfig, events: &mut Vec<GameEvent>) {
        let wave = &config.waves[self.current_wave];
        // Difficulty ramp: every repeat adds spawn_increase units to
        // each spawn. Applied before timing so the sequential total
        // accounts for the extra units.
        let bonus = config.endless.spawn_increase * self.repeat_count;

        self.spawn_states.clear();
        if wave.spawn_in_sequence {
            // Groups release one after another: each row waits out the
            // cumulative time of all rows before it.
            let mut elapsed = 0.0;
            for spawn in &wave.spawns {
                let count = spawn.count + bonus;
                self.spawn_states.push(SpawnState {
                    enemy: spawn.enemy,
                    remaining: count,
                    rate: spawn.spawn_rate,
                    delay: elapsed,
                    rate_count: 0.0,
                    spawn_inside: spawn.spawn_inside,
                });
                elapsed += spawn.spawn_rate * count as f32;
            }
            self.spawn_time_left = elapsed;
        } else {
            // Groups release concurrently, each spread evenly across
            // the wave's fixed spawn time.
            for spawn in &wave.spawns {
                let count = spawn.count + bonus;
                let rate = if count > 0 {
                    wave.spawn_time / count as f32
                } else {
                    wave.spawn_time
                };
                self.spawn_states.push(SpawnState {
                    enemy: spawn.enemy,
                    remaining: count,
                    rate,
                    delay: 0.0,
                    rate_count: 0.0,
                    spawn_inside: spawn.spawn_inside,
                });
            }
            self.spawn_time_left = wave.spawn_time;
        }

        self.wave_cleared = true;
        self.start_countdown = WAVE_START_DELAY;

        let absolute_wave = config.waves.len() * self.repeat_count as usize + self.current_wave;
        let message = if config.endless.repeat_after_end && self.repeat_count > 0 {
            format!("{}{}", config.endless.wave_message_prefix, absolute_wave)
        } else {
            wave.message.clone()
        };
        events.push(GameEvent::WaveStarted {
            wave: self.current_wave,
            absolute_wave,
            message,
        });
        events.push(GameEvent::SoundRequested {
            sound: SoundCue::WaveStart,
        });
    }

    /// Live enemies: spawned and not yet dead. Corpses awaiting removal
    /// do not hold a wave open.
    pub fn live_enemy_count(world: &World) -> u32 {
        world
            .query::<(&Enemy, &Vitals)>()
            .iter()
            .filter(|(_, (_, vitals))| !vitals.is_dead)
            .count() as u32
    }
}

/// Advance wave spawning by one tick. Returns a signal when the wave
/// was cleared and progression moved on.
pub fn run(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    level: &mut LevelState,
    config: &LevelConfig,
    events: &mut Vec<GameEvent>,
    dt: f32,
    player: Option<Entity>,
) -> Option<WaveSignal> {
    if level.done {
        return None;
    }

    if level.wave_cleared {
        level.start_countdown -= dt;
        if level.start_countdown <= 0.0 {
            level.wave_cleared = false;
        }
        return None;
    }

    for spawn in &mut level.spawn_states {
        if spawn.delay > 0.0 {
            spawn.delay -= dt;
            continue;
        }
        spawn.rate_count += dt;
        if spawn.remaining > 0 && spawn.rate_count >= spawn.rate {
            spawn.rate_count = 0.0;
            let Some(template) = config.enemies.get(spawn.enemy) else {
                // Misconfigured template index: drop the row.
                spawn.remaining = 0;
                continue;
            };
            let pos = spawn_position(rng, &config.spawn_area, spawn.spawn_inside);
            let enemy =
                world_setup::spawn_enemy(world, rng, spawn.enemy, template, pos, player);
            events.push(GameEvent::EntitySpawned {
                id: enemy.to_bits().get(),
                kind: EntityKind::Enemy,
            });
            spawn.remaining -= 1;
        }
    }

    level.spawn_time_left -= dt;
    if level.spawn_time_left <= 0.0 && LevelState::live_enemy_count(world) == 0 {
        events.push(GameEvent::WaveCleared {
            wave: level.current_wave,
        });
        level.current_wave += 1;
        return Some(level.advance(config, events));
    }

    None
}

/// Pick a spawn point: inside the area, or just beyond one of its four
/// edges.
fn spawn_position(rng: &mut ChaCha8Rng, area: &Rect, inside: bool) -> glam::Vec2 {
    if inside {
        return world_setup::random_point_in(rng, area);
    }
    if rng.gen_bool(0.5) {
        let x = if rng.gen_bool(0.5) {
            area.max.x + SPAWN_EDGE_MARGIN
        } else {
            area.min.x - SPAWN_EDGE_MARGIN
        };
        glam::Vec2::new(x, rng.gen_range(area.min.y..area.max.y))
    } else {
        let y = if rng.gen_bool(0.5) {
            area.max.y + SPAWN_EDGE_MARGIN
        } else {
            area.min.y - SPAWN_EDGE_MARGIN
        };
        glam::Vec2::new(rng.gen_range(area.min.x..area.max.x), y)
    }
}
