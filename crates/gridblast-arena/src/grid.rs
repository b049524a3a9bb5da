use serde::{Deserialize, Serialize};

use gridblast_core::geometry::{GridPos, cell_center, world_to_cell};

/// Stable handle to a placed bomb, resolved against the live bomb list.
pub type BombId = u32;

/// Terrain of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Terrain {
    Floor,
    Wall,
    /// Destructible block; becomes floor when an explosion clears it.
    Block,
}

/// Which piece of the explosion graphic overlays a cell. Rendering-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlastSprite {
    Center,
    MidH,
    MidV,
    CapUp,
    CapDown,
    CapLeft,
    CapRight,
}

/// One grid tile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    pub terrain: Terrain,
    /// Bomb currently sitting on this cell, if any. A wall never holds one.
    pub bomb: Option<BombId>,
    /// Transient "covered by flames" marker. A damage/rendering concern,
    /// never a walkability input.
    pub exploding: bool,
    pub blast: Option<BlastSprite>,
}

impl Cell {
    pub fn new(terrain: Terrain) -> Self {
        Self {
            terrain,
            bomb: None,
            exploding: false,
            blast: None,
        }
    }

    /// Walkability under the given pass-through flags: floor is walkable, a
    /// block only with `wall_pass`, and an occupied cell only with
    /// `bomb_pass`. A wall is never walkable.
    pub fn is_walkable(&self, wall_pass: bool, bomb_pass: bool) -> bool {
        let terrain_ok = match self.terrain {
            Terrain::Floor => true,
            Terrain::Block => wall_pass,
            Terrain::Wall => return false,
        };
        terrain_ok && (self.bomb.is_none() || bomb_pass)
    }
}

/// The rectangular tile arena. Size is fixed after construction; individual
/// cells mutate over the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    cols: i32,
    rows: i32,
    cell_size: f32,
    cells: Vec<Cell>,
}

impl Grid {
    /// All-floor grid of the given dimensions.
    pub fn new(cols: i32, rows: i32, cell_size: f32) -> Self {
        Self {
            cols,
            rows,
            cell_size,
            cells: vec![Cell::new(Terrain::Floor); (cols * rows) as usize],
        }
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Arena width in world units.
    pub fn width(&self) -> f32 {
        self.cols as f32 * self.cell_size
    }

    /// Arena height in world units.
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.cell_size
    }

    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.col >= 0 && pos.col < self.cols && pos.row >= 0 && pos.row < self.rows
    }

    /// Bounds-checked lookup. Out-of-range coordinates are a normal outcome
    /// at map edges, not an error.
    pub fn cell(&self, pos: GridPos) -> Option<&Cell> {
        if self.in_bounds(pos) {
            self.cells.get((pos.row * self.cols + pos.col) as usize)
        } else {
            None
        }
    }

    pub fn cell_mut(&mut self, pos: GridPos) -> Option<&mut Cell> {
        if self.in_bounds(pos) {
            self.cells.get_mut((pos.row * self.cols + pos.col) as usize)
        } else {
            None
        }
    }

    pub fn set_terrain(&mut self, pos: GridPos, terrain: Terrain) {
        if let Some(cell) = self.cell_mut(pos) {
            cell.terrain = terrain;
        }
    }

    /// Grid cell containing the world point.
    pub fn pos_at(&self, x: f32, y: f32) -> GridPos {
        GridPos::new(
            world_to_cell(x, self.cell_size),
            world_to_cell(y, self.cell_size),
        )
    }

    /// World coordinates of a cell's center.
    pub fn center_of(&self, pos: GridPos) -> (f32, f32) {
        (
            cell_center(pos.col, self.cell_size),
            cell_center(pos.row, self.cell_size),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid {
        Grid::new(5, 4, 64.0)
    }

    #[test]
    fn out_of_range_lookup_is_none() {
        let g = grid();
        assert!(g.cell(GridPos::new(-1, 0)).is_none());
        assert!(g.cell(GridPos::new(0, -1)).is_none());
        assert!(g.cell(GridPos::new(5, 0)).is_none());
        assert!(g.cell(GridPos::new(0, 4)).is_none());
        assert!(g.cell(GridPos::new(4, 3)).is_some());
    }

    #[test]
    fn wall_is_never_walkable() {
        let cell = Cell::new(Terrain::Wall);
        assert!(!cell.is_walkable(false, false));
        assert!(!cell.is_walkable(true, true));
    }

    #[test]
    fn block_needs_wall_pass() {
        let cell = Cell::new(Terrain::Block);
        assert!(!cell.is_walkable(false, false));
        assert!(cell.is_walkable(true, false));
    }

    #[test]
    fn bomb_needs_bomb_pass() {
        let mut cell = Cell::new(Terrain::Floor);
        cell.bomb = Some(7);
        assert!(!cell.is_walkable(false, false));
        assert!(!cell.is_walkable(true, false));
        assert!(cell.is_walkable(false, true));
    }

    #[test]
    fn pos_at_floors_negative_coordinates() {
        let g = grid();
        assert_eq!(g.pos_at(10.0, 10.0), GridPos::new(0, 0));
        assert_eq!(g.pos_at(-1.0, 10.0), GridPos::new(-1, 0));
        assert_eq!(g.pos_at(130.0, 70.0), GridPos::new(2, 1));
    }

    #[test]
    fn center_of_roundtrips_through_pos_at() {
        let g = grid();
        for col in 0..5 {
            for row in 0..4 {
                let pos = GridPos::new(col, row);
                let (x, y) = g.center_of(pos);
                assert_eq!(g.pos_at(x, y), pos);
            }
        }
    }

    #[test]
    fn pixel_dimensions_follow_cell_size() {
        let g = grid();
        assert!((g.width() - 320.0).abs() < f32::EPSILON);
        assert!((g.height() - 256.0).abs() < f32::EPSILON);
    }
}
