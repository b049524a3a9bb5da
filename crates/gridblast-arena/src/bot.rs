use smallvec::SmallVec;

use gridblast_core::geometry::{Direction, GridPos};

use crate::config::ArenaConfig;
use crate::enemy::{Enemy, decide};
use crate::grid::{Grid, Terrain};

/// Walkable neighbor directions from `cell` for an enemy of the given
/// block-passing ability. Bombs always block enemies.
pub fn open_directions(
    grid: &Grid,
    cell: GridPos,
    passes_blocks: bool,
) -> SmallVec<[Direction; 4]> {
    Direction::CARDINALS
        .into_iter()
        .filter(|&dir| {
            grid.cell(cell.offset(dir))
                .is_some_and(|c| c.is_walkable(passes_blocks, false))
        })
        .collect()
}

/// Straight-line sight toward the player: aligned on a row or column within
/// `range` cells, with nothing but floor in between. Bombs do not block
/// sight; walls and blocks do.
pub fn sees_player(grid: &Grid, from: GridPos, to: GridPos, range: i32) -> Option<Direction> {
    let dir = if from.row == to.row && from.col != to.col {
        if (from.col - to.col).abs() > range {
            return None;
        }
        if to.col < from.col {
            Direction::Left
        } else {
            Direction::Right
        }
    } else if from.col == to.col && from.row != to.row {
        if (from.row - to.row).abs() > range {
            return None;
        }
        if to.row < from.row {
            Direction::Up
        } else {
            Direction::Down
        }
    } else {
        return None;
    };

    let mut pos = from.offset(dir);
    while pos != to {
        match grid.cell(pos) {
            Some(cell) if cell.terrain == Terrain::Floor => pos = pos.offset(dir),
            _ => return None,
        }
    }
    Some(dir)
}

/// Per-tick AI driver: senses the player, applies the intelligence gate,
/// and runs the pure transition. Mutates only the enemy's AI fields; the
/// movement pass consumes the chosen direction.
pub fn drive_enemy(
    enemy: &mut Enemy,
    grid: &Grid,
    player_cell: Option<GridPos>,
    salt: u32,
    clock: f32,
    config: &ArenaConfig,
) {
    if enemy.dying || !enemy.decision_due(config) {
        return;
    }

    let cell = grid.pos_at(enemy.core.x, enemy.core.y);
    let open = open_directions(grid, cell, enemy.kind.passes_blocks());
    let noise = pseudo_random(salt, (clock * 1000.0) as u32);
    let gate = pseudo_random(salt ^ 0x9E37_79B9, (clock * 1000.0) as u32);

    let chase_dir = player_cell
        .filter(|_| gate < enemy.kind.intelligence().chase_chance())
        .and_then(|pc| sees_player(grid, cell, pc, config.chase_range_cells as i32))
        .filter(|d| open.contains(d));

    let stuck = enemy.stuck_timer >= config.stuck_redirect_secs;
    let (ai, dir) = decide(
        enemy.ai,
        enemy.move_dir,
        true,
        stuck,
        chase_dir,
        &open,
        noise,
    );
    enemy.ai = ai;
    enemy.set_direction(dir);
    enemy.decision_timer = enemy.kind.intelligence().decision_interval();
    if stuck {
        enemy.stuck_timer = 0.0;
    }
}

/// Deterministic pseudo-random float in [0, 1). Keeps the serialized state
/// the single source of truth — no RNG state to snapshot.
pub fn pseudo_random(a: u32, b: u32) -> f32 {
    let bits = a.wrapping_mul(2_654_435_761) ^ b.wrapping_mul(0x85EB_CA6B);
    let bits = (bits ^ (bits >> 13)).wrapping_mul(0xC2B2_AE35);
    (bits % 10_000) as f32 / 10_000.0
}
