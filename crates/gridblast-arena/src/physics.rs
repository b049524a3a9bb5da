use gridblast_core::geometry::Direction;

use crate::grid::{BombId, Grid};

/// Which terrain/occupancy an actor may pass through.
///
/// Player rules carry the wall-pass and bomb-pass power-ups plus the bombs
/// the player is still standing on; enemy rules reduce to a single
/// block-passing flag and never consider bomb-pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassRules<'a> {
    pub wall_pass: bool,
    pub bomb_pass: bool,
    /// Bombs whose cells stay passable regardless of `bomb_pass`: the owner
    /// has not stepped off them yet. A quickly placed second bomb can put
    /// two cells in this grace at once.
    pub allowed_bombs: &'a [BombId],
}

impl PassRules<'_> {
    /// Rules for an enemy of the given block-passing ability.
    pub fn enemy(passes_blocks: bool) -> Self {
        Self {
            wall_pass: passes_blocks,
            bomb_pass: false,
            allowed_bombs: &[],
        }
    }
}

/// Outcome of a movement attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// No movement direction; nothing attempted.
    Idle,
    /// The full displacement or a slide was applied.
    Moved,
    /// Every candidate position was rejected; the actor did not move.
    Blocked,
}

/// Whether a box of the given half size may occupy `(x, y)`.
///
/// All four corners must resolve to an existing, walkable cell; a missing
/// cell at the map edge counts as blocked.
pub fn can_occupy(grid: &Grid, x: f32, y: f32, half: f32, rules: PassRules<'_>) -> bool {
    let corners = [
        (x - half, y - half),
        (x + half, y - half),
        (x - half, y + half),
        (x + half, y + half),
    ];
    corners.iter().all(|&(cx, cy)| {
        let Some(cell) = grid.cell(grid.pos_at(cx, cy)) else {
            return false;
        };
        if cell.is_walkable(rules.wall_pass, rules.bomb_pass) {
            return true;
        }
        // The owner may keep overlapping the bombs they just placed.
        cell.bomb
            .is_some_and(|id| rules.allowed_bombs.contains(&id))
            && cell.is_walkable(rules.wall_pass, true)
    })
}

/// Per-tick movement with wall sliding and optional corner-slide
/// assistance.
///
/// Tries the full displacement first, then each axis independently. When
/// both fail and `corner_assist` is set, a perpendicular nudge is combined
/// with the forward step (negative side before positive) so an actor
/// slightly off a corridor's center line slides into alignment instead of
/// sticking on the corner. The nudge scales with `speed * dt * assist` and
/// is clamped at the corridor center line, which keeps the feel consistent
/// across tick rates. The final position is clamped to the arena bounds
/// inset by `half`.
#[allow(clippy::too_many_arguments)]
pub fn step_actor(
    grid: &Grid,
    x: &mut f32,
    y: &mut f32,
    half: f32,
    dir: Direction,
    speed: f32,
    dt: f32,
    rules: PassRules<'_>,
    corner_assist: Option<f32>,
) -> MoveOutcome {
    if dir == Direction::None {
        *x = x.clamp(half, grid.width() - half);
        *y = y.clamp(half, grid.height() - half);
        return MoveOutcome::Idle;
    }

    let (dx, dy) = dir.delta();
    let step_x = dx * speed * dt;
    let step_y = dy * speed * dt;
    let mut outcome = MoveOutcome::Blocked;

    if can_occupy(grid, *x + step_x, *y + step_y, half, rules) {
        *x += step_x;
        *y += step_y;
        outcome = MoveOutcome::Moved;
    } else if step_x != 0.0 && can_occupy(grid, *x + step_x, *y, half, rules) {
        *x += step_x;
        outcome = MoveOutcome::Moved;
    } else if step_y != 0.0 && can_occupy(grid, *x, *y + step_y, half, rules) {
        *y += step_y;
        outcome = MoveOutcome::Moved;
    } else if let Some(assist) = corner_assist {
        let nudge = speed * dt * assist;
        let (ccx, ccy) = grid.center_of(grid.pos_at(*x, *y));
        // Signed offset from the actor to its corridor's center line.
        let align = if dir.is_horizontal() {
            ccy - *y
        } else {
            ccx - *x
        };
        for sign in [-1.0f32, 1.0] {
            // Sliding toward the center line never overshoots it.
            let slide = if align.signum() == sign && align != 0.0 {
                sign * nudge.min(align.abs())
            } else {
                sign * nudge
            };
            let (nx, ny) = if dir.is_horizontal() {
                (0.0, slide)
            } else {
                (slide, 0.0)
            };
            if slide != 0.0 && can_occupy(grid, *x + step_x + nx, *y + step_y + ny, half, rules) {
                *x += step_x + nx;
                *y += step_y + ny;
                outcome = MoveOutcome::Moved;
                break;
            }
        }
    }

    *x = x.clamp(half, grid.width() - half);
    *y = y.clamp(half, grid.height() - half);
    outcome
}
