use serde::{Deserialize, Serialize};

use gridblast_core::actor::{Actor, ActorCore};
use gridblast_core::game_trait::PlayerId;
use gridblast_core::geometry::Direction;

use crate::config::ArenaConfig;

/// The player-controlled bomber.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub core: ActorCore,
    pub id: PlayerId,
    pub facing: Direction,
    pub move_dir: Direction,

    // Permanent upgrades: survive in-run deaths, reset only by a new game.
    pub max_bombs: u32,
    pub fire_range: u32,

    // Transient power-ups: stripped on death.
    pub speed_boost: bool,
    pub wall_pass: bool,
    pub bomb_pass: bool,
    pub flame_pass: bool,
    pub remote_trigger: bool,

    /// Power-up invincibility window (seconds remaining).
    pub invincible_timer: f32,
    /// Post-respawn protection window. Additive with the power-up window
    /// for damage immunity.
    pub spawn_protection: f32,

    pub active_bombs: u32,
    pub lives: u32,
    pub score: i32,

    pub dying: bool,
    pub death_timer: f32,
}

impl Player {
    pub fn new(id: PlayerId, x: f32, y: f32, lives: u32, config: &ArenaConfig) -> Self {
        Self {
            core: ActorCore::new(x, y, config.player_half()),
            id,
            facing: Direction::Down,
            move_dir: Direction::None,
            max_bombs: config.base_max_bombs,
            fire_range: config.base_fire_range,
            speed_boost: false,
            wall_pass: false,
            bomb_pass: false,
            flame_pass: false,
            remote_trigger: false,
            invincible_timer: 0.0,
            spawn_protection: config.spawn_protection_secs,
            active_bombs: 0,
            lives,
            score: 0,
            dying: false,
            death_timer: 0.0,
        }
    }

    /// Current movement speed. The boost amount applies doubled while the
    /// speed power-up is held.
    pub fn speed(&self, config: &ArenaConfig) -> f32 {
        if self.speed_boost {
            config.player_base_speed + config.player_speed_boost * 2.0
        } else {
            config.player_base_speed
        }
    }

    /// Damage immunity from any source: either timed window, or flame-pass.
    pub fn is_immune(&self) -> bool {
        self.invincible_timer > 0.0 || self.spawn_protection > 0.0 || self.flame_pass
    }

    pub fn can_place_bomb(&self) -> bool {
        !self.dying && self.active_bombs < self.max_bombs
    }

    /// Start the death sequence. Returns `false` (no-op) while already
    /// dying or immune.
    pub fn kill(&mut self, config: &ArenaConfig) -> bool {
        if self.dying || self.is_immune() {
            return false;
        }
        self.dying = true;
        self.death_timer = config.player_death_secs;
        self.move_dir = Direction::None;
        true
    }

    /// Reset for a fresh life. Transient power-ups are stripped and spawn
    /// protection granted; permanent upgrades stay, and the lives/score
    /// bookkeeping belongs to the caller.
    pub fn respawn(&mut self, x: f32, y: f32, config: &ArenaConfig) {
        self.core.set_position(x, y);
        self.core.active = true;
        self.core.marked_for_removal = false;
        self.core.anim_clock = 0.0;
        self.facing = Direction::Down;
        self.move_dir = Direction::None;
        self.dying = false;
        self.death_timer = 0.0;
        self.active_bombs = 0;
        self.speed_boost = false;
        self.wall_pass = false;
        self.bomb_pass = false;
        self.flame_pass = false;
        self.remote_trigger = false;
        self.invincible_timer = 0.0;
        self.spawn_protection = config.spawn_protection_secs;
    }
}

impl Actor for Player {
    fn core(&self) -> &ActorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActorCore {
        &mut self.core
    }

    fn update(&mut self, dt: f32) {
        self.core.tick(dt);
        self.invincible_timer = (self.invincible_timer - dt).max(0.0);
        self.spawn_protection = (self.spawn_protection - dt).max(0.0);
        if self.dying {
            self.death_timer -= dt;
            if self.death_timer <= 0.0 {
                self.mark_removed();
            }
        }
    }

    fn frame_count(&self) -> u32 {
        4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> (Player, ArenaConfig) {
        let config = ArenaConfig::default();
        let mut p = Player::new(0, 96.0, 96.0, 3, &config);
        p.spawn_protection = 0.0; // most tests want a vulnerable player
        (p, config)
    }

    #[test]
    fn kill_starts_death_animation() {
        let (mut p, config) = player();
        assert!(p.kill(&config));
        assert!(p.dying);
        assert!(p.is_active(), "dying is animated before removal");
        p.update(config.player_death_secs + 0.1);
        assert!(p.is_marked_for_removal());
    }

    #[test]
    fn kill_is_noop_while_dying() {
        let (mut p, config) = player();
        assert!(p.kill(&config));
        assert!(!p.kill(&config));
    }

    #[test]
    fn kill_is_noop_under_every_immunity() {
        let (mut p, config) = player();
        p.invincible_timer = 1.0;
        assert!(!p.kill(&config));
        p.invincible_timer = 0.0;

        p.spawn_protection = 1.0;
        assert!(!p.kill(&config));
        p.spawn_protection = 0.0;

        p.flame_pass = true;
        assert!(!p.kill(&config));
        p.flame_pass = false;

        assert!(p.kill(&config));
    }

    #[test]
    fn respawn_preserves_permanent_stats() {
        let (mut p, config) = player();
        p.max_bombs = 5;
        p.fire_range = 4;
        p.score = 12_300;
        p.speed_boost = true;
        p.wall_pass = true;
        p.bomb_pass = true;
        p.flame_pass = true;
        p.remote_trigger = true;
        p.active_bombs = 3;
        p.kill(&config);
        p.update(config.player_death_secs + 0.1);
        assert!(p.is_marked_for_removal());

        p.respawn(32.0, 32.0, &config);
        assert_eq!(p.max_bombs, 5);
        assert_eq!(p.fire_range, 4);
        assert_eq!(p.score, 12_300);
        assert_eq!(p.active_bombs, 0);
        assert!(!p.speed_boost && !p.wall_pass && !p.bomb_pass);
        assert!(!p.flame_pass && !p.remote_trigger);
        assert!(!p.dying);
        assert!(p.is_active());
        assert!(p.spawn_protection > 0.0, "respawn grants protection");
    }

    #[test]
    fn speed_boost_doubles_the_bonus() {
        let (mut p, config) = player();
        let base = p.speed(&config);
        p.speed_boost = true;
        let boosted = p.speed(&config);
        assert!(
            (boosted - base - config.player_speed_boost * 2.0).abs() < f32::EPSILON
        );
    }

    #[test]
    fn immunity_timers_count_down_and_expire() {
        let (mut p, config) = player();
        p.invincible_timer = 1.0;
        p.spawn_protection = 0.5;
        assert!(p.is_immune());
        p.update(0.6);
        assert!(p.is_immune(), "invincibility still running");
        p.update(0.5);
        assert!(!p.is_immune());
        assert!(p.kill(&config));
    }

    #[test]
    fn bomb_budget_limits_placement() {
        let (mut p, _config) = player();
        assert!(p.can_place_bomb());
        p.active_bombs = p.max_bombs;
        assert!(!p.can_place_bomb());
    }
}
