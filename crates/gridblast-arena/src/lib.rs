pub mod bomb;
pub mod bot;
pub mod config;
pub mod enemy;
pub mod explosion;
pub mod grid;
pub mod level;
pub mod physics;
pub mod player;
pub mod powerups;
pub mod scoring;

use std::collections::VecDeque;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use gridblast_core::actor::Actor;
use gridblast_core::arcade_game_boilerplate;
use gridblast_core::game_trait::{ArcadeGame, GameConfig, GameEvent, GameMetadata, RoundResult};
use gridblast_core::geometry::{Direction, GridPos};

use bomb::Bomb;
use bot::{drive_enemy, pseudo_random};
use config::ArenaConfig;
use enemy::Enemy;
use explosion::Explosion;
use grid::{BombId, Grid, Terrain};
use physics::{MoveOutcome, PassRules, step_actor};
use player::Player;
use powerups::{Pickup, PickupKind, apply_pickup};

/// Level seed used when the host doesn't supply one.
const DEFAULT_SEED: u64 = 0x6772_6964;

/// Normalized per-tick input from the host shell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ArenaInput {
    pub direction: Direction,
    pub place_bomb: bool,
    pub detonate: bool,
}

/// Serializable simulation state: the single source of truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArenaState {
    pub grid: Grid,
    pub player: Player,
    pub player_spawn: GridPos,
    pub enemies: Vec<Enemy>,
    pub bombs: Vec<Bomb>,
    pub explosions: Vec<Explosion>,
    pub pickups: Vec<Pickup>,
    pub level: u32,
    pub seed: u64,
    pub round_timer: f32,
    pub round_complete: bool,
    pub cleared: bool,
    pub next_bomb_id: BombId,
}

/// The arena game: a player and AI enemies over a shared grid, bombs with
/// timed fuses, and chain-reacting directional explosions.
///
/// `update` runs a fixed pass order every tick: actor timers, movement,
/// bomb intents, fuse/chain resolution, blast damage, explosion cleanup,
/// and the removal sweep. All mutation is synchronous and tick-scoped.
pub struct BlastArena {
    state: ArenaState,
    pending_input: ArenaInput,
    paused: bool,
    game_config: ArenaConfig,
}

impl BlastArena {
    pub fn new() -> Self {
        Self::with_config(ArenaConfig::load())
    }

    pub fn with_config(config: ArenaConfig) -> Self {
        Self {
            state: build_state(&config, 1, DEFAULT_SEED, GameConfig::default().starting_lives),
            pending_input: ArenaInput::default(),
            paused: false,
            game_config: config,
        }
    }

    pub fn state(&self) -> &ArenaState {
        &self.state
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.game_config
    }

    /// Pass 1: advance every actor's timers and animation.
    fn advance_actors(&mut self, dt: f32) {
        let ArenaState {
            player,
            enemies,
            bombs,
            explosions,
            pickups,
            ..
        } = &mut self.state;
        player.update(dt);
        for enemy in enemies.iter_mut() {
            enemy.update(dt);
        }
        for bomb in bombs.iter_mut() {
            bomb.update(dt);
        }
        for explosion in explosions.iter_mut() {
            explosion.update(dt);
        }
        for pickup in pickups.iter_mut() {
            pickup.update(dt);
        }
    }

    /// Pass 2a: apply the buffered direction to the player and move it.
    fn move_player(&mut self, direction: Direction, dt: f32) {
        let config = &self.game_config;
        let ArenaState {
            grid,
            player,
            bombs,
            ..
        } = &mut self.state;
        if !player.is_active() || player.dying {
            return;
        }
        player.move_dir = direction;
        if direction != Direction::None {
            player.facing = direction;
        }

        // Bombs the player is still standing on stay passable to them. A
        // second bomb placed before fully stepping off the first puts both
        // in this grace, so neither cell can wedge the player.
        let allowed: SmallVec<[BombId; 2]> = bombs
            .iter()
            .filter(|b| b.owner_standing && b.is_armed() && b.owner == player.id)
            .map(|b| b.id)
            .collect();
        let rules = PassRules {
            wall_pass: player.wall_pass,
            bomb_pass: player.bomb_pass,
            allowed_bombs: &allowed,
        };
        let speed = player.speed(config);
        let mut x = player.core.x;
        let mut y = player.core.y;
        step_actor(
            grid,
            &mut x,
            &mut y,
            player.core.half_extent,
            player.move_dir,
            speed,
            dt,
            rules,
            Some(config.corner_slide_assist),
        );
        player.core.set_position(x, y);

        // Collision re-engages once the owner has fully stepped off.
        let bbox = player.bounding_box();
        for bomb in bombs.iter_mut().filter(|b| b.owner_standing) {
            if !bbox.overlaps_cell(bomb.cell, grid.cell_size()) {
                bomb.owner_standing = false;
            }
        }
    }

    /// Pass 2b: drive and move every live enemy. A fully blocked move
    /// clears the enemy's direction, which forces a fresh AI decision.
    fn move_enemies(&mut self, dt: f32) {
        let config = &self.game_config;
        let ArenaState {
            grid,
            player,
            enemies,
            round_timer,
            ..
        } = &mut self.state;
        let player_cell = (player.is_active() && !player.dying)
            .then(|| grid.pos_at(player.core.x, player.core.y));

        for (i, enemy) in enemies.iter_mut().enumerate() {
            if !enemy.is_active() || enemy.dying {
                continue;
            }
            drive_enemy(enemy, grid, player_cell, i as u32 + 1, *round_timer, config);

            let rules = PassRules::enemy(enemy.kind.passes_blocks());
            let mut x = enemy.core.x;
            let mut y = enemy.core.y;
            let outcome = step_actor(
                grid,
                &mut x,
                &mut y,
                enemy.core.half_extent,
                enemy.move_dir,
                enemy.kind.speed(),
                dt,
                rules,
                None,
            );
            enemy.core.set_position(x, y);
            if outcome == MoveOutcome::Blocked {
                enemy.set_direction(Direction::None);
            }
            enemy.note_cell(grid.pos_at(x, y), dt);
        }
    }

    /// Collect any pickup the player's box overlaps.
    fn collect_pickups(&mut self, events: &mut Vec<GameEvent>) {
        let config = &self.game_config;
        let ArenaState {
            grid,
            player,
            pickups,
            ..
        } = &mut self.state;
        if !player.is_active() || player.dying {
            return;
        }
        let bbox = player.bounding_box();
        for pickup in pickups.iter_mut().filter(|p| p.is_active()) {
            if bbox.overlaps_cell(pickup.cell, grid.cell_size()) {
                let points = apply_pickup(pickup.kind, player, config);
                player.score += points;
                pickup.mark_removed();
                events.push(GameEvent::PowerUpCollected { points });
                events.push(GameEvent::ScoreUpdate {
                    score: player.score,
                });
            }
        }
    }

    /// Pass 3: bomb placement and remote-detonation intents.
    fn handle_bomb_intents(&mut self, input: &ArenaInput) {
        let config = &self.game_config;
        let ArenaState {
            grid,
            player,
            bombs,
            next_bomb_id,
            ..
        } = &mut self.state;
        if !player.is_active() || player.dying {
            return;
        }

        if input.place_bomb && player.can_place_bomb() {
            let cell = grid.pos_at(player.core.x, player.core.y);
            let placeable = grid
                .cell(cell)
                .is_some_and(|c| c.terrain == Terrain::Floor && c.bomb.is_none());
            if placeable {
                let id = *next_bomb_id;
                *next_bomb_id += 1;
                let (x, y) = grid.center_of(cell);
                bombs.push(Bomb::new(
                    id,
                    cell,
                    x,
                    y,
                    grid.cell_size() / 2.0,
                    player.id,
                    player.fire_range,
                    config.bomb_fuse_secs,
                    player.remote_trigger,
                ));
                if let Some(c) = grid.cell_mut(cell) {
                    c.bomb = Some(id);
                }
                player.active_bombs += 1;
            }
        }

        if input.detonate
            && player.remote_trigger
            && let Some(bomb) = bombs
                .iter_mut()
                .find(|b| b.remote && b.is_armed() && b.owner == player.id)
        {
            // Oldest armed remote bomb first; one per detonate intent.
            bomb.should_explode = true;
        }
    }

    /// Pass 4: drain the worklist of bombs pending explosion until
    /// quiescent, so multi-bomb chains fully resolve within one tick.
    /// `explode` is idempotent, which makes cyclic chains terminate.
    fn resolve_detonations(&mut self, events: &mut Vec<GameEvent>) {
        let mut pending: VecDeque<BombId> = self
            .state
            .bombs
            .iter()
            .filter(|b| b.should_explode && b.is_armed())
            .map(|b| b.id)
            .collect();

        while let Some(id) = pending.pop_front() {
            let Some(idx) = self.state.bombs.iter().position(|b| b.id == id) else {
                continue;
            };
            if !self.state.bombs[idx].explode() {
                continue;
            }
            let bomb = self.state.bombs[idx].clone();

            // Free the cell before the spread so the blast covers it.
            if let Some(cell) = self.state.grid.cell_mut(bomb.cell) {
                cell.bomb = None;
            }
            if bomb.owner == self.state.player.id {
                self.state.player.active_bombs = self.state.player.active_bombs.saturating_sub(1);
            }

            let explosion = Explosion::from_bomb(
                &bomb,
                self.game_config.explosion_duration_secs,
                &mut self.state.grid,
            );
            for hit in explosion.bombs_hit(&self.state.grid) {
                if let Some(other) = self.state.bombs.iter_mut().find(|b| b.id == hit)
                    && other.is_armed()
                    && !other.should_explode
                {
                    other.trigger_chain_reaction();
                    pending.push_back(hit);
                }
            }
            events.push(GameEvent::BombExploded { owner: bomb.owner });
            self.state.explosions.push(explosion);
        }
    }

    /// Pass 5: blast damage against overlapping actor boxes, plus enemy
    /// contact damage. Exposed pickups burn up.
    fn damage_pass(&mut self) {
        let config = &self.game_config;
        let ArenaState {
            grid,
            player,
            enemies,
            explosions,
            pickups,
            ..
        } = &mut self.state;
        let cell_size = grid.cell_size();

        for explosion in explosions.iter().filter(|e| e.is_active()) {
            for ec in &explosion.cells {
                if player.is_active()
                    && !player.dying
                    && player.bounding_box().overlaps_cell(ec.pos, cell_size)
                {
                    player.kill(config);
                }
                for enemy in enemies.iter_mut().filter(|e| e.is_active() && !e.dying) {
                    if enemy.bounding_box().overlaps_cell(ec.pos, cell_size) {
                        enemy.kill(config);
                    }
                }
                for pickup in pickups.iter_mut().filter(|p| p.is_active()) {
                    if pickup.cell == ec.pos {
                        pickup.mark_removed();
                    }
                }
            }
        }

        // Touching a live enemy is lethal too.
        if player.is_active() && !player.dying {
            let bbox = player.bounding_box();
            for enemy in enemies.iter().filter(|e| e.is_active() && !e.dying) {
                if bbox.intersects(&enemy.bounding_box()) {
                    player.kill(config);
                    break;
                }
            }
        }
    }

    /// Pass 6: clear decayed explosions from the grid. Destroyed blocks
    /// may reveal a pickup (deterministic roll, so snapshots replay).
    fn clear_explosions(&mut self) {
        let config = &self.game_config;
        let ArenaState {
            grid,
            explosions,
            pickups,
            seed,
            ..
        } = &mut self.state;
        for explosion in explosions.iter().filter(|e| e.is_marked_for_removal()) {
            for pos in explosion.clear_from_grid(grid) {
                let salt = (*seed as u32).wrapping_add(pos.col as u32).wrapping_mul(31);
                let roll = pseudo_random(salt, pos.row as u32);
                if roll < config.powerup_reveal_chance {
                    let kind = PickupKind::roll(pseudo_random(pos.row as u32, salt));
                    pickups.push(Pickup::new(kind, pos, grid));
                }
            }
        }
    }

    /// Pass 7: sweep actors marked for removal, emitting the discrete
    /// events the shell observes, and settle round completion.
    fn sweep_removed(&mut self, events: &mut Vec<GameEvent>) {
        let mut kills = 0u32;
        let mut kill_points = 0i32;
        self.state.enemies.retain(|enemy| {
            if enemy.is_marked_for_removal() {
                kills += 1;
                kill_points += enemy.kind.points();
                events.push(GameEvent::EnemyEliminated {
                    points: enemy.kind.points(),
                });
                false
            } else {
                true
            }
        });
        if kills > 0 {
            self.state.player.score += kill_points + scoring::multi_kill_bonus(kills);
            events.push(GameEvent::ScoreUpdate {
                score: self.state.player.score,
            });
        }

        self.state.bombs.retain(|b| !b.is_marked_for_removal());
        self.state.explosions.retain(|e| !e.is_marked_for_removal());
        self.state.pickups.retain(|p| !p.is_marked_for_removal());

        if self.state.player.is_marked_for_removal() {
            self.state.player.lives = self.state.player.lives.saturating_sub(1);
            events.push(GameEvent::PlayerEliminated {
                lives_left: self.state.player.lives,
            });
            if self.state.player.lives > 0 {
                let (x, y) = self.state.grid.center_of(self.state.player_spawn);
                self.state.player.respawn(x, y, &self.game_config);
            } else {
                self.state.round_complete = true;
                self.state.cleared = false;
                events.push(GameEvent::RoundComplete);
            }
        }

        if self.state.enemies.is_empty() && !self.state.round_complete {
            self.state.cleared = true;
            self.state.round_complete = true;
            self.state.player.score += scoring::LEVEL_CLEAR_POINTS;
            events.push(GameEvent::ScoreUpdate {
                score: self.state.player.score,
            });
            events.push(GameEvent::LevelCleared {
                level: self.state.level,
            });
            events.push(GameEvent::RoundComplete);
        }
    }
}

impl Default for BlastArena {
    fn default() -> Self {
        Self::with_config(ArenaConfig::default())
    }
}

/// Build a fresh level state.
fn build_state(config: &ArenaConfig, level_number: u32, seed: u64, lives: u32) -> ArenaState {
    let level = level::load_level(level_number, seed, config);
    let (px, py) = level.grid.center_of(level.player_spawn);
    let enemies = level
        .enemies
        .iter()
        .map(|&(kind, cell)| {
            let (x, y) = level.grid.center_of(cell);
            Enemy::new(kind, x, y, cell, config)
        })
        .collect();
    ArenaState {
        player: Player::new(0, px, py, lives, config),
        player_spawn: level.player_spawn,
        grid: level.grid,
        enemies,
        bombs: Vec::new(),
        explosions: Vec::new(),
        pickups: Vec::new(),
        level: level_number,
        seed,
        round_timer: 0.0,
        round_complete: false,
        cleared: false,
        next_bomb_id: 1,
    }
}

impl ArcadeGame for BlastArena {
    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            name: "Grid Blast".to_string(),
            description: "Drop bombs, chain the blasts, clear the arena!".to_string(),
            estimated_round_duration: Duration::from_secs(180),
        }
    }

    fn tick_rate(&self) -> f32 {
        30.0
    }

    fn init(&mut self, config: &GameConfig) {
        let seed = config
            .custom
            .get("seed")
            .and_then(|v| v.as_u64())
            .unwrap_or(DEFAULT_SEED);
        self.state = build_state(
            &self.game_config,
            config.level.max(1),
            seed,
            config.starting_lives,
        );
        self.pending_input = ArenaInput::default();
        self.paused = false;
    }

    fn update(&mut self, dt: f32) -> Vec<GameEvent> {
        if self.paused || self.state.round_complete {
            return Vec::new();
        }
        let input = std::mem::take(&mut self.pending_input);
        self.state.round_timer += dt;
        let mut events = Vec::new();

        self.advance_actors(dt);
        self.move_player(input.direction, dt);
        self.move_enemies(dt);
        self.collect_pickups(&mut events);
        self.handle_bomb_intents(&input);
        self.resolve_detonations(&mut events);
        self.damage_pass();
        self.clear_explosions();
        self.sweep_removed(&mut events);

        events
    }

    arcade_game_boilerplate!(state_type: ArenaState);

    fn apply_input(&mut self, input: &[u8]) {
        match rmp_serde::from_slice::<ArenaInput>(input) {
            Err(e) => {
                tracing::debug!(error = %e, "Dropped malformed arena input");
            }
            Ok(frame) => {
                // Direction is last-writer-wins; button intents stick until
                // the next tick consumes them.
                self.pending_input.direction = frame.direction;
                self.pending_input.place_bomb |= frame.place_bomb;
                self.pending_input.detonate |= frame.detonate;
            }
        }
    }

    fn round_results(&self) -> RoundResult {
        RoundResult {
            score: self.state.player.score,
            lives_left: self.state.player.lives,
            level: self.state.level,
            cleared: self.state.cleared,
        }
    }
}
