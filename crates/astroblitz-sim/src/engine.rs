//! Simulation engine — the core of the game.
//!
//! `SimulationEngine` owns the hecs ECS world, processes player
//! commands and host-reported contacts, runs all systems, and produces
//! `GameStateSnapshot`s. Completely headless, enabling deterministic
//! testing: the same seed and inputs always produce the same run.

use std::collections::VecDeque;

use glam::Vec2;
use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use astroblitz_core::commands::PlayerCommand;
use astroblitz_core::components::{Ghosted, Loadout, Magnet, MeleeAttack, PlayerMotion, Vitals};
use astroblitz_core::constants::{DT, END_SCREEN_DELAY, MAX_TIME_SCALE};
use astroblitz_core::enums::{ActionTarget, EntityKind, Faction, GamePhase};
use astroblitz_core::events::GameEvent;
use astroblitz_core::state::GameStateSnapshot;
use astroblitz_core::templates::{ItemAction, LevelConfig, ProgressState};
use astroblitz_core::types::SimTime;

use crate::actions::{ActionKind, ActionQueue};
use crate::inventory::Inventory;
use crate::systems;
use crate::systems::contacts::Contact;
use crate::systems::items::ItemSpawnerState;
use crate::systems::wave_scheduler::{LevelState, WaveSignal};
use crate::systems::weapon::WeaponMount;
use crate::world_setup;

/// Configuration for starting a new simulation.
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    /// Initial time scale (1.0 = normal).
    pub time_scale: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            time_scale: 1.0,
        }
    }
}

/// Running score, with a multiplier applied to every award.
#[derive(Debug, Clone)]
pub struct ScoreState {
    pub score: i64,
    pub multiplier: f32,
}

impl Default for ScoreState {
    fn default() -> Self {
        Self {
            score: 0,
            multiplier: 1.0,
        }
    }
}

impl ScoreState {
    /// Add a score award, scaled by the multiplier. Returns the applied
    /// delta.
    pub fn add(&mut self, value: i64) -> i64 {
        let applied = (value as f32 * self.multiplier) as i64;
        self.score += applied;
        applied
    }
}

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    world: World,
    config: LevelConfig,
    time: SimTime,
    phase: GamePhase,
    time_scale: f32,
    rng: ChaCha8Rng,
    command_queue: VecDeque<PlayerCommand>,
    contacts: Vec<Contact>,
    events: Vec<GameEvent>,
    actions: ActionQueue,
    level: LevelState,
    /// Flattened drop pools, one per enemy template, built at load.
    drop_pools: Vec<Vec<usize>>,
    inventory: Inventory,
    item_spawner: Option<ItemSpawnerState>,
    score: ScoreState,
    player: Option<Entity>,
    /// Progress handed in via ApplyProgress, applied at StartMission.
    loaded_progress: Option<ProgressState>,
}

impl SimulationEngine {
    /// Create a new simulation engine for one authored level.
    pub fn new(config: SimConfig, level_config: LevelConfig) -> Self {
        let drop_pools = systems::items::flatten_drop_tables(&level_config);
        let inventory = Inventory::new(level_config.inventory_slots);
        Self {
            world: World::new(),
            config: level_config,
            time: SimTime::default(),
            phase: GamePhase::default(),
            time_scale: config.time_scale,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            command_queue: VecDeque::new(),
            contacts: Vec::new(),
            events: Vec::new(),
            actions: ActionQueue::default(),
            level: LevelState::default(),
            drop_pools,
            inventory,
            item_spawner: None,
            score: ScoreState::default(),
            player: None,
            loaded_progress: None,
        }
    }

    /// Queue a player command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Report a fresh touch between two entities (ids as carried by
    /// spawn events). Resolved at the next tick.
    pub fn report_contact(&mut self, a: u64, b: u64) {
        if let (Some(a), Some(b)) = (Entity::from_bits(a), Entity::from_bits(b)) {
            self.contacts.push(Contact {
                a,
                b,
                sustained: false,
            });
        }
    }

    /// Report a sustained overlap between two entities. Shot damage
    /// re-applies on every reported overlap tick.
    pub fn report_overlap(&mut self, a: u64, b: u64) {
        if let (Some(a), Some(b)) = (Entity::from_bits(a), Entity::from_bits(b)) {
            self.contacts.push(Contact {
                a,
                b,
                sustained: true,
            });
        }
    }

    /// Advance the simulation by one tick and return the resulting
    /// snapshot.
    pub fn tick(&mut self) -> GameStateSnapshot {
        self.process_commands();

        if self.phase == GamePhase::Active {
            self.run_systems();
            self.time.advance(DT * self.time_scale);
        } else {
            // Contacts reported while inactive are stale by the time
            // the sim resumes.
            self.contacts.clear();
        }

        let events = std::mem::take(&mut self.events);
        systems::snapshot::build(
            &self.world,
            &self.time,
            self.phase,
            &self.score,
            &self.level,
            &self.config,
            self.inventory.slots(),
            events,
        )
    }

    /// Get the current game phase.
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Get the current simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Get the current time scale.
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The player's entity id, while it exists.
    pub fn player_id(&self) -> Option<u64> {
        self.player.map(|p| p.to_bits().get())
    }

    /// Current progression state, as persisted at wave checkpoints.
    pub fn progress(&self) -> ProgressState {
        let (player_speed, weapon_index) = self
            .player
            .map(|p| {
                let speed = self
                    .world
                    .get::<&PlayerMotion>(p)
                    .map(|m| m.speed)
                    .unwrap_or(self.config.player.speed);
                let weapon = self
                    .world
                    .get::<&Loadout>(p)
                    .map(|l| l.weapon_index)
                    .unwrap_or(0);
                (speed, weapon)
            })
            .unwrap_or((self.config.player.speed, self.config.player.weapon_index));

        ProgressState {
            current_wave: self.level.current_wave,
            repeat_count: self.level.repeat_count,
            score: self.score.score,
            player_speed,
            weapon_index,
            item_index: self.item_spawner.as_ref().map(|s| s.index).unwrap_or(0),
        }
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    /// Handle a single player command.
    fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::StartMission => {
                if matches!(
                    self.phase,
                    GamePhase::MainMenu | GamePhase::Victory | GamePhase::Defeat
                ) {
                    self.start_mission();
                }
            }
            PlayerCommand::Pause => {
                if self.phase == GamePhase::Active {
                    self.phase = GamePhase::Paused;
                }
            }
            PlayerCommand::Resume => {
                if self.phase == GamePhase::Paused {
                    self.phase = GamePhase::Active;
                }
            }
            PlayerCommand::SetTimeScale { scale } => {
                self.time_scale = scale.clamp(0.0, MAX_TIME_SCALE);
            }
            PlayerCommand::SetMoveTarget { x, y } => {
                if let Some(player) = self.player {
                    if let Ok(mut motion) = self.world.get::<&mut PlayerMotion>(player) {
                        motion.target_position = Vec2::new(x, y);
                    }
                }
            }
            PlayerCommand::SetScoreMultiplier { value } => {
                self.score.multiplier = value;
            }
            PlayerCommand::UseInventorySlot { slot } => {
                if self.phase == GamePhase::Active {
                    if let Some(template) = self.inventory.take(slot) {
                        systems::items::apply_item(
                            template,
                            &self.config,
                            self.time.elapsed_secs,
                            &mut self.events,
                            &mut self.actions,
                            &mut self.score,
                        );
                    }
                }
            }
            PlayerCommand::ApplyProgress { state } => {
                self.loaded_progress = Some(state);
            }
        }
    }

    /// Reset all per-run state and start the level from its first wave
    /// (or the loaded checkpoint).
    fn start_mission(&mut self) {
        self.world = World::new();
        self.time = SimTime::default();
        self.actions.clear();
        self.contacts.clear();
        self.score = ScoreState::default();
        self.inventory = Inventory::new(self.config.inventory_slots);
        self.item_spawner = self
            .config
            .item_spawner
            .as_ref()
            .map(|_| ItemSpawnerState::default());
        self.level = LevelState::default();

        let player =
            world_setup::spawn_player(&mut self.world, &self.config.player, &self.config.move_area);
        self.player = Some(player);
        self.events.push(GameEvent::EntitySpawned {
            id: player.to_bits().get(),
            kind: EntityKind::Player,
        });

        if let Some(progress) = self.loaded_progress.clone() {
            self.apply_progress(progress);
        }

        self.phase = GamePhase::Active;
        let signal = self.level.advance(&self.config, &mut self.events);
        self.handle_wave_signal(signal, self.time.elapsed_secs);
    }

    /// Restore a saved checkpoint. A saved wave index past the end of
    /// the wave list (saved mid-repeat without a repeat count) derives
    /// the repeat state from it.
    fn apply_progress(&mut self, progress: ProgressState) {
        self.score.score = progress.score;

        let wave_count = self.config.waves.len();
        if wave_count > 0 && progress.current_wave >= wave_count && progress.repeat_count == 0 {
            self.level.repeat_count = (progress.current_wave / wave_count) as u32;
            self.level.current_wave =
                self.config.endless.repeat_from_wave + progress.current_wave % wave_count;
        } else {
            self.level.current_wave = progress.current_wave;
            self.level.repeat_count = progress.repeat_count;
        }

        if let Some(player) = self.player {
            if let Ok(mut motion) = self.world.get::<&mut PlayerMotion>(player) {
                motion.speed = progress.player_speed;
            }
        }
        self.set_weapon(progress.weapon_index);

        if let Some(spawner) = &mut self.item_spawner {
            spawner.index = progress.item_index;
        }
    }

    /// Run all systems in order.
    fn run_systems(&mut self) {
        let dt = DT * self.time_scale;
        let now = self.time.elapsed_secs;

        // 1. Wave scheduling and enemy spawning
        if let Some(signal) = systems::wave_scheduler::run(
            &mut self.world,
            &mut self.rng,
            &mut self.level,
            &self.config,
            &mut self.events,
            dt,
            self.player,
        ) {
            self.handle_wave_signal(signal, now);
        }
        // 2. Player steering, shield recharge, magnet, targeting
        if let Some(player) = self.player {
            systems::player::run(&mut self.world, player, &self.config, dt, &mut self.events);
        }
        // 3. Enemy steering
        systems::enemy_ai::run(&mut self.world, &mut self.rng, self.player, dt);
        // 4. Weapon fire control and shot release
        systems::weapon::run(&mut self.world, dt, now, &mut self.events, &mut self.actions);
        // 5. Shot kinematics
        systems::ballistics::run(&mut self.world, dt, self.time.elapsed_secs);
        // 6. Contact resolution (damage, melee, death)
        systems::contacts::run(
            &mut self.world,
            &mut self.contacts,
            &self.config,
            &self.drop_pools,
            &mut self.rng,
            &mut self.events,
            &mut self.actions,
            &mut self.score,
            now,
        );
        // 7. Items: spawner, aging, pickup
        systems::items::run(
            &mut self.world,
            &mut self.rng,
            &self.config,
            dt,
            now,
            &mut self.events,
            &mut self.actions,
            &mut self.score,
            &mut self.inventory,
            &mut self.item_spawner,
            self.player,
        );
        // 8. Scheduled actions due this tick
        self.run_actions(now);
    }

    fn handle_wave_signal(&mut self, signal: WaveSignal, now: f64) {
        match signal {
            WaveSignal::Checkpoint => {
                if self.config.save_progress && self.player_alive() {
                    let state = self.progress();
                    self.events.push(GameEvent::ProgressSaved { state });
                }
            }
            WaveSignal::Victory => {
                self.actions.schedule(
                    now + END_SCREEN_DELAY as f64,
                    None,
                    ActionKind::EndMission { victory: true },
                );
            }
        }
    }

    fn player_alive(&self) -> bool {
        self.player
            .map(|p| {
                self.world
                    .get::<&Vitals>(p)
                    .map(|v| v.health > 0.0)
                    .unwrap_or(false)
            })
            .unwrap_or(false)
    }

    /// Fire every scheduled action that is due. Actions whose owning
    /// entity is gone are dropped, not delivered.
    fn run_actions(&mut self, now: f64) {
        while let Some(action) = self.actions.pop_due(now) {
            if let Some(owner) = action.owner {
                if !self.world.contains(owner) {
                    continue;
                }
            }
            match action.kind {
                ActionKind::RemoveEntity => {
                    let Some(owner) = action.owner else { continue };
                    self.events.push(GameEvent::EntityRemoved {
                        id: owner.to_bits().get(),
                    });
                    let _ = self.world.despawn(owner);
                    if self.player == Some(owner) {
                        self.player = None;
                    }
                }
                ActionKind::ItemEffect { target, action } => {
                    self.dispatch_item_action(target, action);
                }
                ActionKind::EndMission { victory } => {
                    if victory {
                        self.phase = GamePhase::Victory;
                        self.events.push(GameEvent::Victory);
                        if self.config.save_progress {
                            self.events.push(GameEvent::ProgressCleared);
                        }
                    } else {
                        self.phase = GamePhase::Defeat;
                        self.events.push(GameEvent::Defeat);
                    }
                }
            }
        }
    }

    /// Execute one typed item action against its configured recipient.
    /// Missing recipients (player already gone) skip silently.
    fn dispatch_item_action(&mut self, target: ActionTarget, action: ItemAction) {
        match target {
            ActionTarget::GameController => match action {
                ItemAction::AddScore(value) => {
                    let applied = self.score.add(value);
                    self.events.push(GameEvent::ScoreChanged {
                        score: self.score.score,
                        delta: applied,
                    });
                }
                ItemAction::SetScoreMultiplier(value) => self.score.multiplier = value,
                ItemAction::SetTimeScale(scale) => {
                    self.time_scale = scale.clamp(0.0, MAX_TIME_SCALE);
                }
                _ => {}
            },
            ActionTarget::Player => {
                let Some(player) = self.player else { return };
                match action {
                    ItemAction::ChangeHealth(delta) => {
                        systems::contacts::apply_health_change(
                            &mut self.world,
                            player,
                            delta,
                            &self.config,
                            &self.drop_pools,
                            &mut self.rng,
                            &mut self.events,
                            &mut self.actions,
                            &mut self.score,
                            self.time.elapsed_secs,
                        );
                    }
                    ItemAction::ChangeSpeed(delta) => {
                        if let Ok(mut motion) = self.world.get::<&mut PlayerMotion>(player) {
                            motion.speed += delta;
                        }
                    }
                    ItemAction::ChangeMeleeDamage(delta) => {
                        if let Ok(mut melee) = self.world.get::<&mut MeleeAttack>(player) {
                            melee.damage += delta;
                        }
                    }
                    ItemAction::ChangeMagnetRange(delta) => {
                        if let Ok(mut magnet) = self.world.get::<&mut Magnet>(player) {
                            magnet.range += delta;
                        }
                    }
                    ItemAction::ChangeMagnetSpeed(delta) => {
                        if let Ok(mut magnet) = self.world.get::<&mut Magnet>(player) {
                            magnet.speed += delta;
                        }
                    }
                    ItemAction::UpgradeWeapon(step) => self.upgrade_weapon(step),
                    ItemAction::SetGhost(active) => {
                        if active {
                            let _ = self.world.insert_one(player, Ghosted);
                        } else {
                            let _ = self.world.remove_one::<Ghosted>(player);
                        }
                        self.events.push(GameEvent::GhostChanged {
                            id: player.to_bits().get(),
                            active,
                        });
                    }
                    _ => {}
                }
            }
        }
    }

    /// Step the weapon index within the upgrade list.
    fn upgrade_weapon(&mut self, step: i32) {
        let Some(player) = self.player else { return };
        let current = self
            .world
            .get::<&Loadout>(player)
            .map(|l| l.weapon_index)
            .unwrap_or(0);
        let next = current as i64 + step as i64;
        if next >= 0 && (next as usize) < self.config.player.weapons.len() {
            self.set_weapon(next as usize);
        }
    }

    /// Rebind the player's weapon mount to the given list entry.
    fn set_weapon(&mut self, index: usize) {
        let Some(player) = self.player else { return };
        let Some(template) = self.config.player.weapons.get(index) else {
            return;
        };
        if let Ok(mut loadout) = self.world.get::<&mut Loadout>(player) {
            loadout.weapon_index = index;
        }
        let _ = self
            .world
            .insert_one(player, WeaponMount::new(template.clone(), Faction::Enemy));
    }

    // --- Test support ---

    /// Spawn an enemy directly (bypassing the wave scheduler).
    #[cfg(test)]
    pub fn spawn_test_enemy(&mut self, template: usize, x: f32, y: f32) -> Entity {
        let enemy_template = self.config.enemies[template].clone();
        world_setup::spawn_enemy(
            &mut self.world,
            &mut self.rng,
            template,
            &enemy_template,
            Vec2::new(x, y),
            self.player,
        )
    }

    /// Spawn a shot directly (bypassing weapons).
    #[cfg(test)]
    pub fn spawn_test_shot(
        &mut self,
        template: &astroblitz_core::templates::ShotTemplate,
        x: f32,
        y: f32,
        heading: f32,
        target_faction: Faction,
    ) -> Entity {
        world_setup::spawn_shot(
            &mut self.world,
            template,
            Vec2::new(x, y),
            heading,
            target_faction,
        )
    }

    /// Spawn an item directly (bypassing loot drops).
    #[cfg(test)]
    pub fn spawn_test_item(&mut self, template: usize, x: f32, y: f32) -> Entity {
        let item_template = self.config.items[template].clone();
        world_setup::spawn_item(&mut self.world, template, &item_template, Vec2::new(x, y))
    }

    /// Get a read-only reference to the level/wave state.
    #[cfg(test)]
    pub fn level(&self) -> &LevelState {
        &self.level
    }

    /// Get a read-only reference to the score state.
    #[cfg(test)]
    pub fn score(&self) -> &ScoreState {
        &self.score
    }

    /// Get a read-only reference to the inventory.
    #[cfg(test)]
    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }
}
