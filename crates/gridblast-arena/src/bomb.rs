use serde::{Deserialize, Serialize};

use gridblast_core::actor::{Actor, ActorCore};
use gridblast_core::game_trait::PlayerId;
use gridblast_core::geometry::GridPos;

use crate::grid::BombId;

/// A placed bomb: an actor pinned to the grid cell it was dropped on.
///
/// State machine: armed → exploding → exploded (terminal). The fuse only
/// sets `should_explode`; the owning loop's chain-resolution pass performs
/// the actual transition so that bombs detonating each other never mutate
/// the collection mid-iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bomb {
    pub core: ActorCore,
    pub id: BombId,
    pub cell: GridPos,
    pub owner: PlayerId,
    /// Blast range in cells, copied from the owner's upgrade level at
    /// placement time.
    pub range: u32,
    /// Seconds until automatic detonation. Ignored for remote bombs.
    pub fuse: f32,
    /// Remote bombs only explode on an explicit detonate intent or a chain
    /// reaction.
    pub remote: bool,
    /// The owner has not stepped off this bomb yet, so its cell stays
    /// passable to them.
    pub owner_standing: bool,
    pub has_exploded: bool,
    pub should_explode: bool,
}

impl Bomb {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: BombId,
        cell: GridPos,
        x: f32,
        y: f32,
        half: f32,
        owner: PlayerId,
        range: u32,
        fuse: f32,
        remote: bool,
    ) -> Self {
        Self {
            core: ActorCore::new(x, y, half),
            id,
            cell,
            owner,
            range,
            fuse,
            remote,
            owner_standing: true,
            has_exploded: false,
            should_explode: false,
        }
    }

    pub fn is_armed(&self) -> bool {
        !self.has_exploded
    }

    /// Flag this bomb for the next chain-resolution pass. The explosion
    /// itself happens when the worklist is drained.
    pub fn trigger_chain_reaction(&mut self) {
        if !self.has_exploded {
            self.should_explode = true;
        }
    }

    /// Transition into the terminal exploded state.
    ///
    /// Idempotent: only the first call returns `true`, and only then does
    /// the owning loop decrement the owner's bomb counter and spawn the
    /// explosion.
    pub fn explode(&mut self) -> bool {
        if self.has_exploded {
            return false;
        }
        self.has_exploded = true;
        self.should_explode = false;
        self.mark_removed();
        true
    }
}

impl Actor for Bomb {
    fn core(&self) -> &ActorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActorCore {
        &mut self.core
    }

    fn update(&mut self, dt: f32) {
        self.core.tick(dt);
        if self.has_exploded || self.remote {
            return;
        }
        self.fuse -= dt;
        if self.fuse <= 0.0 {
            self.fuse = 0.0;
            self.should_explode = true;
        }
    }

    fn frame_count(&self) -> u32 {
        3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bomb(remote: bool) -> Bomb {
        Bomb::new(1, GridPos::new(3, 3), 224.0, 224.0, 32.0, 0, 2, 2.5, remote)
    }

    #[test]
    fn fuse_expiry_flags_detonation() {
        let mut b = bomb(false);
        b.update(2.0);
        assert!(!b.should_explode);
        b.update(0.6);
        assert!(b.should_explode);
        assert!(b.is_armed(), "flagged but not yet exploded");
    }

    #[test]
    fn remote_bomb_never_counts_down() {
        let mut b = bomb(true);
        b.update(100.0);
        assert!(!b.should_explode);
        assert!((b.fuse - 2.5).abs() < f32::EPSILON);
    }

    #[test]
    fn explode_is_idempotent() {
        let mut b = bomb(false);
        assert!(b.explode());
        assert!(b.has_exploded);
        assert!(b.is_marked_for_removal());
        assert!(!b.explode(), "second call must be a no-op");
    }

    #[test]
    fn chain_trigger_after_explosion_is_ignored() {
        let mut b = bomb(false);
        b.explode();
        b.trigger_chain_reaction();
        assert!(!b.should_explode);
    }

    #[test]
    fn chain_trigger_on_remote_bomb_works() {
        let mut b = bomb(true);
        b.trigger_chain_reaction();
        assert!(b.should_explode);
    }

    #[test]
    fn fuse_stops_after_explosion() {
        let mut b = bomb(false);
        b.explode();
        b.update(10.0);
        assert!(!b.should_explode);
    }
}
