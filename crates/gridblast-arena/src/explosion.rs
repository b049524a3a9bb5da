use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use gridblast_core::actor::{Actor, ActorCore};
use gridblast_core::geometry::{Direction, GridPos};

use crate::bomb::Bomb;
use crate::grid::{BlastSprite, BombId, Grid, Terrain};

/// One cell covered by a blast, with its sprite classification and burn
/// progress (0 at ignition, 1 when fully decayed).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExplosionCell {
    pub pos: GridPos,
    pub sprite: BlastSprite,
    pub progress: f32,
}

/// A detonated bomb's blast: the marked cells plus a shared decay timer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explosion {
    pub core: ActorCore,
    /// Bomb this blast came from. Lookup-only; not needed after spawn.
    pub source: Option<BombId>,
    pub duration: f32,
    pub age: f32,
    pub cells: SmallVec<[ExplosionCell; 9]>,
}

impl Explosion {
    /// Build the blast from a detonating bomb, marking every affected cell
    /// on the grid.
    pub fn from_bomb(bomb: &Bomb, duration: f32, grid: &mut Grid) -> Self {
        let mut explosion = Self {
            core: ActorCore::new(bomb.core.x, bomb.core.y, grid.cell_size() / 2.0),
            source: Some(bomb.id),
            duration,
            age: 0.0,
            cells: SmallVec::new(),
        };
        explosion.spread(bomb.cell, bomb.range, grid);
        explosion
    }

    /// Directional spread: always the center, then outward per cardinal.
    /// A missing cell or a wall ends the arm unmarked; a destructible
    /// block absorbs the blast — it is marked with the end cap and ends
    /// the arm.
    fn spread(&mut self, origin: GridPos, range: u32, grid: &mut Grid) {
        self.mark(grid, origin, BlastSprite::Center);
        for dir in Direction::CARDINALS {
            let (mid, cap) = arm_sprites(dir);
            let mut pos = origin;
            for step in 1..=range {
                pos = pos.offset(dir);
                let Some(cell) = grid.cell(pos) else {
                    break;
                };
                match cell.terrain {
                    Terrain::Wall => break,
                    Terrain::Block => {
                        self.mark(grid, pos, cap);
                        break;
                    }
                    Terrain::Floor => {
                        let sprite = if step == range { cap } else { mid };
                        self.mark(grid, pos, sprite);
                    }
                }
            }
        }
    }

    fn mark(&mut self, grid: &mut Grid, pos: GridPos, sprite: BlastSprite) {
        if let Some(cell) = grid.cell_mut(pos) {
            cell.exploding = true;
            cell.blast = Some(sprite);
        }
        self.cells.push(ExplosionCell {
            pos,
            sprite,
            progress: 0.0,
        });
    }

    /// Whether the blast covers the given cell.
    pub fn covers(&self, pos: GridPos) -> bool {
        self.cells.iter().any(|c| c.pos == pos)
    }

    /// Bombs sitting under this blast, for chain-reaction triggering.
    pub fn bombs_hit(&self, grid: &Grid) -> SmallVec<[BombId; 4]> {
        let mut hit = SmallVec::new();
        for ec in &self.cells {
            if let Some(id) = grid.cell(ec.pos).and_then(|c| c.bomb)
                && Some(id) != self.source
            {
                hit.push(id);
            }
        }
        hit
    }

    /// Un-mark every affected cell and apply the block destruction the
    /// spread pass promised. Must run before the explosion is discarded or
    /// stale exploding flags leak into later ticks. Returns the destroyed
    /// block cells so the caller can roll power-up reveals.
    pub fn clear_from_grid(&self, grid: &mut Grid) -> Vec<GridPos> {
        let mut destroyed = Vec::new();
        for ec in &self.cells {
            if let Some(cell) = grid.cell_mut(ec.pos) {
                cell.exploding = false;
                cell.blast = None;
                if cell.terrain == Terrain::Block {
                    cell.terrain = Terrain::Floor;
                    destroyed.push(ec.pos);
                }
            }
        }
        destroyed
    }
}

impl Actor for Explosion {
    fn core(&self) -> &ActorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActorCore {
        &mut self.core
    }

    fn update(&mut self, dt: f32) {
        self.core.tick(dt);
        self.age += dt;
        // All affected cells burn in lockstep.
        let progress = (self.age / self.duration).min(1.0);
        for cell in &mut self.cells {
            cell.progress = progress;
        }
        if self.age >= self.duration {
            self.mark_removed();
        }
    }

    fn frame_count(&self) -> u32 {
        4
    }
}

fn arm_sprites(dir: Direction) -> (BlastSprite, BlastSprite) {
    match dir {
        Direction::Up => (BlastSprite::MidV, BlastSprite::CapUp),
        Direction::Down => (BlastSprite::MidV, BlastSprite::CapDown),
        Direction::Left => (BlastSprite::MidH, BlastSprite::CapLeft),
        Direction::Right => (BlastSprite::MidH, BlastSprite::CapRight),
        Direction::None => (BlastSprite::Center, BlastSprite::Center),
    }
}
