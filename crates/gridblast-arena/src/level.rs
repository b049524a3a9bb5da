use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use gridblast_core::geometry::GridPos;

use crate::config::ArenaConfig;
use crate::enemy::EnemyKind;
use crate::grid::{Grid, Terrain};

/// A playable arena layout: terrain plus spawn assignments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    pub grid: Grid,
    pub player_spawn: GridPos,
    pub enemies: Vec<(EnemyKind, GridPos)>,
}

/// Load a level from a JSON file, returning `None` if the file is missing
/// or invalid.
pub fn load_level_from_file(path: &str) -> Option<Level> {
    match std::fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<Level>(&content) {
            Ok(level) => Some(level),
            Err(e) => {
                tracing::warn!("Failed to parse {path}: {e}");
                None
            }
        },
        Err(_) => None,
    }
}

/// Load the given level number, preferring a JSON file from the levels
/// directory.
///
/// Checks env var `GRIDBLAST_LEVELS_DIR` (default `config/levels`) for a
/// file named `level{n}.json`. Falls back to `generate_level` if the file
/// is missing or unparseable.
pub fn load_level(number: u32, seed: u64, config: &ArenaConfig) -> Level {
    let dir = std::env::var("GRIDBLAST_LEVELS_DIR").unwrap_or_else(|_| "config/levels".to_string());
    let path = format!("{dir}/level{number}.json");
    load_level_from_file(&path).unwrap_or_else(|| generate_level(number, seed, config))
}

/// Procedurally generate a level: border walls, pillars on the even/even
/// lattice, seeded destructible-block scatter with the player's corner kept
/// clear, and an enemy roster that scales with the level number.
pub fn generate_level(number: u32, seed: u64, config: &ArenaConfig) -> Level {
    let cols = config.grid_cols as i32;
    let rows = config.grid_rows as i32;
    let mut rng = StdRng::seed_from_u64(seed ^ (u64::from(number) << 32));
    let mut grid = Grid::new(cols, rows, config.cell_size);

    for col in 0..cols {
        for row in 0..rows {
            let pos = GridPos::new(col, row);
            let border = col == 0 || row == 0 || col == cols - 1 || row == rows - 1;
            let pillar = col % 2 == 0 && row % 2 == 0;
            if border || pillar {
                grid.set_terrain(pos, Terrain::Wall);
            }
        }
    }

    let player_spawn = GridPos::new(1, 1);
    for col in 1..cols - 1 {
        for row in 1..rows - 1 {
            let pos = GridPos::new(col, row);
            if grid.cell(pos).is_some_and(|c| c.terrain == Terrain::Floor)
                && !spawn_safe(pos, player_spawn)
                && rng.random_bool(f64::from(config.block_density))
            {
                grid.set_terrain(pos, Terrain::Block);
            }
        }
    }

    // Enemy roster: tougher kinds join as levels climb.
    let count = (config.enemy_base_count + config.enemy_per_level * (number.saturating_sub(1)))
        .min(config.enemy_count_cap) as usize;
    let pool_size = (2 + number as usize).min(EnemyKind::ALL.len());
    let pool = &EnemyKind::ALL[..pool_size];

    let mut floor_cells: Vec<GridPos> = (1..cols - 1)
        .flat_map(|col| (1..rows - 1).map(move |row| GridPos::new(col, row)))
        .filter(|&pos| {
            grid.cell(pos).is_some_and(|c| c.terrain == Terrain::Floor)
                && pos.distance(player_spawn) >= 5
        })
        .collect();

    let mut enemies = Vec::with_capacity(count);
    for _ in 0..count {
        if floor_cells.is_empty() {
            break;
        }
        let cell = floor_cells.swap_remove(rng.random_range(0..floor_cells.len()));
        let kind = pool[rng.random_range(0..pool.len())];
        enemies.push((kind, cell));
    }

    Level {
        grid,
        player_spawn,
        enemies,
    }
}

/// The player's corner stays clear of blocks so the first bomb is
/// survivable.
fn spawn_safe(pos: GridPos, spawn: GridPos) -> bool {
    pos.distance(spawn) <= 2
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ArenaConfig {
        ArenaConfig::default()
    }

    #[test]
    fn layout_has_borders_and_pillars() {
        let level = generate_level(1, 42, &config());
        let grid = &level.grid;
        for col in 0..grid.cols() {
            assert_eq!(
                grid.cell(GridPos::new(col, 0)).unwrap().terrain,
                Terrain::Wall
            );
            assert_eq!(
                grid.cell(GridPos::new(col, grid.rows() - 1)).unwrap().terrain,
                Terrain::Wall
            );
        }
        assert_eq!(
            grid.cell(GridPos::new(2, 2)).unwrap().terrain,
            Terrain::Wall,
            "even/even lattice cell should be a pillar"
        );
        assert_eq!(
            grid.cell(GridPos::new(3, 3)).unwrap().terrain,
            Terrain::Floor,
            "odd/odd cells are never pillars"
        );
    }

    #[test]
    fn player_corner_is_kept_clear() {
        for seed in 0..10u64 {
            let level = generate_level(1, seed, &config());
            for pos in [
                GridPos::new(1, 1),
                GridPos::new(2, 1),
                GridPos::new(1, 2),
                GridPos::new(3, 1),
                GridPos::new(1, 3),
            ] {
                assert_eq!(
                    level.grid.cell(pos).unwrap().terrain,
                    Terrain::Floor,
                    "seed {seed}: {pos:?} must stay open"
                );
            }
        }
    }

    #[test]
    fn generation_is_deterministic_per_seed() {
        let a = generate_level(3, 1234, &config());
        let b = generate_level(3, 1234, &config());
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
        let c = generate_level(3, 1235, &config());
        assert_ne!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&c).unwrap()
        );
    }

    #[test]
    fn enemies_spawn_on_open_floor_away_from_the_player() {
        let level = generate_level(2, 7, &config());
        assert!(!level.enemies.is_empty());
        for (_, cell) in &level.enemies {
            assert_eq!(level.grid.cell(*cell).unwrap().terrain, Terrain::Floor);
            assert!(cell.distance(level.player_spawn) >= 5);
        }
    }

    #[test]
    fn roster_grows_with_level_number_until_capped() {
        let cfg = config();
        let l1 = generate_level(1, 9, &cfg);
        let l5 = generate_level(5, 9, &cfg);
        assert!(l5.enemies.len() >= l1.enemies.len());
        let l99 = generate_level(99, 9, &cfg);
        assert!(l99.enemies.len() <= cfg.enemy_count_cap as usize);
    }

    #[test]
    fn missing_level_file_returns_none() {
        assert!(load_level_from_file("/nonexistent/levels/level1.json").is_none());
    }

    #[test]
    fn level_roundtrips_through_json() {
        let level = generate_level(1, 42, &config());
        let json = serde_json::to_string(&level).unwrap();
        let back: Level = serde_json::from_str(&json).unwrap();
        assert_eq!(back.player_spawn, level.player_spawn);
        assert_eq!(back.enemies.len(), level.enemies.len());
        assert_eq!(back.grid.cols(), level.grid.cols());
    }
}
