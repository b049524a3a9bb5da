use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use gridblast_core::actor::{Actor, ActorCore};
use gridblast_core::geometry::{Direction, GridPos};

use crate::config::ArenaConfig;

/// The eight enemy archetypes, roughly in ascending threat order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Blob,
    Drifter,
    Hopper,
    Stalker,
    Wisp,
    Charger,
    Phantom,
    Revenant,
}

/// How often (and how well) an enemy re-decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intelligence {
    Low,
    Normal,
    High,
}

impl Intelligence {
    /// Seconds between allowed AI decisions. Smarter enemies decide more
    /// often.
    pub fn decision_interval(self) -> f32 {
        match self {
            Intelligence::Low => 1.5,
            Intelligence::Normal => 1.0,
            Intelligence::High => 0.5,
        }
    }

    /// Chance that a line-of-sight sighting is acted on.
    pub fn chase_chance(self) -> f32 {
        match self {
            Intelligence::Low => 0.3,
            Intelligence::Normal => 0.6,
            Intelligence::High => 0.9,
        }
    }
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 8] = [
        EnemyKind::Blob,
        EnemyKind::Drifter,
        EnemyKind::Hopper,
        EnemyKind::Stalker,
        EnemyKind::Wisp,
        EnemyKind::Charger,
        EnemyKind::Phantom,
        EnemyKind::Revenant,
    ];

    /// Movement speed (units/s).
    pub fn speed(self) -> f32 {
        match self {
            EnemyKind::Blob => 60.0,
            EnemyKind::Drifter => 75.0,
            EnemyKind::Hopper => 95.0,
            EnemyKind::Stalker => 110.0,
            EnemyKind::Wisp => 70.0,
            EnemyKind::Charger => 140.0,
            EnemyKind::Phantom => 90.0,
            EnemyKind::Revenant => 125.0,
        }
    }

    pub fn intelligence(self) -> Intelligence {
        match self {
            EnemyKind::Blob | EnemyKind::Drifter | EnemyKind::Wisp => Intelligence::Low,
            EnemyKind::Hopper | EnemyKind::Phantom => Intelligence::Normal,
            EnemyKind::Stalker | EnemyKind::Charger | EnemyKind::Revenant => Intelligence::High,
        }
    }

    /// Whether this kind drifts through destructible blocks.
    pub fn passes_blocks(self) -> bool {
        matches!(
            self,
            EnemyKind::Wisp | EnemyKind::Phantom | EnemyKind::Revenant
        )
    }

    /// Score awarded for the kill.
    pub fn points(self) -> i32 {
        match self {
            EnemyKind::Blob => 100,
            EnemyKind::Drifter => 200,
            EnemyKind::Hopper => 400,
            EnemyKind::Stalker => 800,
            EnemyKind::Wisp => 1000,
            EnemyKind::Charger => 2000,
            EnemyKind::Phantom => 4000,
            EnemyKind::Revenant => 8000,
        }
    }

    pub fn frames(self) -> u32 {
        match self {
            EnemyKind::Blob | EnemyKind::Drifter => 4,
            _ => 6,
        }
    }
}

/// AI behavior state. There is no idle state: a stuck enemy keeps its state
/// and gets a forced redirect instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyAi {
    Wandering,
    Chasing,
}

/// An AI-driven enemy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub core: ActorCore,
    pub kind: EnemyKind,
    pub facing: Direction,
    pub move_dir: Direction,
    pub ai: EnemyAi,
    /// Countdown to the next allowed decision window.
    pub decision_timer: f32,
    /// Time spent on the same grid cell; the deadlock-breaking redirect
    /// trigger.
    pub stuck_timer: f32,
    pub last_cell: GridPos,
    pub dying: bool,
    pub death_timer: f32,
}

impl Enemy {
    pub fn new(kind: EnemyKind, x: f32, y: f32, cell: GridPos, config: &ArenaConfig) -> Self {
        Self {
            core: ActorCore::new(x, y, config.enemy_half()),
            kind,
            facing: Direction::Down,
            move_dir: Direction::None,
            ai: EnemyAi::Wandering,
            decision_timer: 0.0,
            stuck_timer: 0.0,
            last_cell: cell,
            dying: false,
            death_timer: 0.0,
        }
    }

    /// Start the death sequence. Ignored while already dying.
    pub fn kill(&mut self, config: &ArenaConfig) -> bool {
        if self.dying {
            return false;
        }
        self.dying = true;
        self.death_timer = config.enemy_death_secs;
        self.move_dir = Direction::None;
        true
    }

    pub fn set_direction(&mut self, dir: Direction) {
        self.move_dir = dir;
        if dir != Direction::None {
            self.facing = dir;
        }
    }

    /// Track cell residency for the stuck detector.
    pub fn note_cell(&mut self, cell: GridPos, dt: f32) {
        if cell == self.last_cell {
            self.stuck_timer += dt;
        } else {
            self.last_cell = cell;
            self.stuck_timer = 0.0;
        }
    }

    /// A new decision is allowed when the window elapsed, when the enemy
    /// lost its direction to a failed move, or when the stuck timer fires.
    pub fn decision_due(&self, config: &ArenaConfig) -> bool {
        self.decision_timer <= 0.0
            || self.move_dir == Direction::None
            || self.stuck_timer >= config.stuck_redirect_secs
    }
}

impl Actor for Enemy {
    fn core(&self) -> &ActorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActorCore {
        &mut self.core
    }

    fn update(&mut self, dt: f32) {
        self.core.tick(dt);
        self.decision_timer = (self.decision_timer - dt).max(0.0);
        if self.dying {
            self.death_timer -= dt;
            if self.death_timer <= 0.0 {
                self.mark_removed();
            }
        }
    }

    fn frame_count(&self) -> u32 {
        self.kind.frames()
    }
}

/// Pure AI transition: current state plus sensed conditions in, next state
/// plus direction out. No timers, no grid access — callers own every side
/// effect, which keeps this independently testable.
///
/// `chase_dir` is the direction toward a sensed player, already vetted by
/// the intelligence gate and open along the first step. `open` lists the
/// walkable neighbor directions. `noise` is a deterministic 0..1 roll used
/// for tie-breaking.
pub fn decide(
    state: EnemyAi,
    dir: Direction,
    decision_due: bool,
    stuck: bool,
    chase_dir: Option<Direction>,
    open: &[Direction],
    noise: f32,
) -> (EnemyAi, Direction) {
    // Hysteresis: between decision windows nothing changes.
    if !decision_due {
        return (state, dir);
    }
    if let Some(cd) = chase_dir {
        return (EnemyAi::Chasing, cd);
    }
    if open.is_empty() {
        // Fully boxed in: stop and wait for the next window.
        return (EnemyAi::Wandering, Direction::None);
    }
    // Prefer continuing straight; a stuck enemy must try something new.
    if !stuck && dir != Direction::None && open.contains(&dir) && noise < 0.8 {
        return (EnemyAi::Wandering, dir);
    }
    let choices: SmallVec<[Direction; 4]> = if stuck && open.len() > 1 {
        open.iter().copied().filter(|&d| d != dir).collect()
    } else {
        open.iter().copied().collect()
    };
    let idx = ((noise * choices.len() as f32) as usize).min(choices.len() - 1);
    (EnemyAi::Wandering, choices[idx])
}
