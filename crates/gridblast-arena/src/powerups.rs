use serde::{Deserialize, Serialize};

use gridblast_core::actor::{Actor, ActorCore};
use gridblast_core::geometry::GridPos;

use crate::config::ArenaConfig;
use crate::grid::Grid;
use crate::player::Player;

/// Collectible upgrades revealed from destroyed blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    ExtraBomb,
    FireUp,
    SpeedBoost,
    WallPass,
    BombPass,
    FlamePass,
    RemoteTrigger,
    ExtraLife,
    Invincibility,
}

impl PickupKind {
    pub const ALL: [PickupKind; 9] = [
        PickupKind::ExtraBomb,
        PickupKind::FireUp,
        PickupKind::SpeedBoost,
        PickupKind::WallPass,
        PickupKind::BombPass,
        PickupKind::FlamePass,
        PickupKind::RemoteTrigger,
        PickupKind::ExtraLife,
        PickupKind::Invincibility,
    ];

    /// Score awarded on collection.
    pub fn points(self) -> i32 {
        match self {
            PickupKind::ExtraBomb | PickupKind::FireUp => 50,
            PickupKind::SpeedBoost => 100,
            PickupKind::WallPass | PickupKind::BombPass => 200,
            PickupKind::RemoteTrigger => 300,
            PickupKind::FlamePass | PickupKind::Invincibility => 400,
            PickupKind::ExtraLife => 500,
        }
    }

    /// Relative reveal weight when a destroyed block drops a pickup.
    /// Bread-and-butter upgrades dominate; run-changers stay rare.
    fn weight(self) -> u32 {
        match self {
            PickupKind::ExtraBomb | PickupKind::FireUp => 30,
            PickupKind::SpeedBoost => 15,
            PickupKind::WallPass | PickupKind::BombPass => 8,
            PickupKind::RemoteTrigger => 6,
            PickupKind::FlamePass => 4,
            PickupKind::ExtraLife | PickupKind::Invincibility => 3,
        }
    }

    /// Pick a kind from a 0..1 roll over the cumulative weights.
    pub fn roll(r: f32) -> PickupKind {
        let total: u32 = Self::ALL.iter().map(|k| k.weight()).sum();
        let mut target = (r.clamp(0.0, 0.999_9) * total as f32) as u32;
        for kind in Self::ALL {
            let w = kind.weight();
            if target < w {
                return kind;
            }
            target -= w;
        }
        PickupKind::ExtraBomb
    }
}

/// A pickup sitting exposed on a floor cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub core: ActorCore,
    pub kind: PickupKind,
    pub cell: GridPos,
}

impl Pickup {
    pub fn new(kind: PickupKind, cell: GridPos, grid: &Grid) -> Self {
        let (x, y) = grid.center_of(cell);
        Self {
            core: ActorCore::new(x, y, grid.cell_size() / 2.0),
            kind,
            cell,
        }
    }
}

impl Actor for Pickup {
    fn core(&self) -> &ActorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActorCore {
        &mut self.core
    }

    fn update(&mut self, dt: f32) {
        self.core.tick(dt);
    }

    fn frame_count(&self) -> u32 {
        2
    }
}

/// Apply a collected pickup to the player. Returns the score value.
pub fn apply_pickup(kind: PickupKind, player: &mut Player, config: &ArenaConfig) -> i32 {
    match kind {
        PickupKind::ExtraBomb => {
            player.max_bombs = (player.max_bombs + 1).min(config.max_bombs_cap);
        }
        PickupKind::FireUp => {
            player.fire_range = (player.fire_range + 1).min(config.fire_range_cap);
        }
        PickupKind::SpeedBoost => player.speed_boost = true,
        PickupKind::WallPass => player.wall_pass = true,
        PickupKind::BombPass => player.bomb_pass = true,
        PickupKind::FlamePass => player.flame_pass = true,
        PickupKind::RemoteTrigger => player.remote_trigger = true,
        PickupKind::ExtraLife => player.lives += 1,
        PickupKind::Invincibility => player.invincible_timer = config.invincibility_secs,
    }
    kind.points()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roll_covers_the_whole_range() {
        assert_eq!(PickupKind::roll(0.0), PickupKind::ExtraBomb);
        // The top of the range lands on the last (rarest) kind.
        assert_eq!(PickupKind::roll(0.999_9), PickupKind::Invincibility);
        // Every roll maps to a valid kind.
        for i in 0..100 {
            let _ = PickupKind::roll(i as f32 / 100.0);
        }
    }

    #[test]
    fn permanent_upgrades_respect_caps() {
        let config = ArenaConfig::default();
        let mut player = Player::new(0, 96.0, 96.0, 3, &config);
        for _ in 0..20 {
            apply_pickup(PickupKind::ExtraBomb, &mut player, &config);
            apply_pickup(PickupKind::FireUp, &mut player, &config);
        }
        assert_eq!(player.max_bombs, config.max_bombs_cap);
        assert_eq!(player.fire_range, config.fire_range_cap);
    }

    #[test]
    fn transient_flags_set_and_score() {
        let config = ArenaConfig::default();
        let mut player = Player::new(0, 96.0, 96.0, 3, &config);
        let pts = apply_pickup(PickupKind::FlamePass, &mut player, &config);
        assert!(player.flame_pass);
        assert_eq!(pts, PickupKind::FlamePass.points());
    }

    #[test]
    fn invincibility_arms_the_timer() {
        let config = ArenaConfig::default();
        let mut player = Player::new(0, 96.0, 96.0, 3, &config);
        player.spawn_protection = 0.0;
        apply_pickup(PickupKind::Invincibility, &mut player, &config);
        assert!(player.is_immune());
    }

    #[test]
    fn extra_life_increments_lives() {
        let config = ArenaConfig::default();
        let mut player = Player::new(0, 96.0, 96.0, 3, &config);
        apply_pickup(PickupKind::ExtraLife, &mut player, &config);
        assert_eq!(player.lives, 4);
    }
}
