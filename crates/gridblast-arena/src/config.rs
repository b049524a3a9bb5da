use serde::{Deserialize, Serialize};

/// Data-driven tuning for the arena simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Side length of one grid cell in world units.
    pub cell_size: f32,
    /// Default arena width in cells (odd, so pillar rows line up).
    pub grid_cols: u32,
    /// Default arena height in cells.
    pub grid_rows: u32,
    /// Player movement speed (units/s).
    pub player_base_speed: f32,
    /// Speed bonus amount; applied doubled while the boost power-up is held.
    pub player_speed_boost: f32,
    /// Player hitbox half size as a fraction of the cell size. Smaller than
    /// half a cell so near-misses feel fair.
    pub player_half_extent_frac: f32,
    /// Enemy hitbox half size as a fraction of the cell size.
    pub enemy_half_extent_frac: f32,
    /// Seconds from bomb placement to automatic detonation.
    pub bomb_fuse_secs: f32,
    /// Seconds a blast stays on the grid.
    pub explosion_duration_secs: f32,
    /// Player death animation length (seconds).
    pub player_death_secs: f32,
    /// Enemy death animation length (seconds).
    pub enemy_death_secs: f32,
    /// Invincibility power-up window (seconds).
    pub invincibility_secs: f32,
    /// Damage-immunity window granted on respawn (seconds).
    pub spawn_protection_secs: f32,
    /// Corner-slide nudge as a multiple of the per-tick step distance.
    /// The slide is clamped at the corridor center line, so values large
    /// enough to cover the hitbox slack in one tick are safe.
    pub corner_slide_assist: f32,
    /// Seconds on the same cell before an enemy is forced to re-decide.
    /// Must exceed the slowest enemy's cell-crossing time, or free-running
    /// enemies trip the redirect mid-cell.
    pub stuck_redirect_secs: f32,
    /// Straight-line distance (cells) at which enemies can sense the player.
    pub chase_range_cells: u32,
    /// Fraction of eligible floor cells filled with destructible blocks.
    pub block_density: f32,
    /// Chance a destroyed block reveals a pickup.
    pub powerup_reveal_chance: f32,
    /// Starting and maximum upgrade levels.
    pub base_max_bombs: u32,
    pub base_fire_range: u32,
    pub max_bombs_cap: u32,
    pub fire_range_cap: u32,
    /// Enemy roster scaling per level.
    pub enemy_base_count: u32,
    pub enemy_per_level: u32,
    pub enemy_count_cap: u32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            cell_size: 64.0,
            grid_cols: 15,
            grid_rows: 13,
            player_base_speed: 150.0,
            player_speed_boost: 40.0,
            player_half_extent_frac: 0.35,
            enemy_half_extent_frac: 0.4,
            bomb_fuse_secs: 2.5,
            explosion_duration_secs: 0.6,
            player_death_secs: 1.2,
            enemy_death_secs: 0.9,
            invincibility_secs: 8.0,
            spawn_protection_secs: 3.0,
            corner_slide_assist: 4.0,
            stuck_redirect_secs: 1.25,
            chase_range_cells: 6,
            block_density: 0.45,
            powerup_reveal_chance: 0.25,
            base_max_bombs: 1,
            base_fire_range: 1,
            max_bombs_cap: 8,
            fire_range_cap: 10,
            enemy_base_count: 4,
            enemy_per_level: 1,
            enemy_count_cap: 10,
        }
    }
}

impl ArenaConfig {
    /// Load config from environment or TOML file, falling back to defaults.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("GRIDBLAST_CONFIG")
            && let Ok(contents) = std::fs::read_to_string(&path)
            && let Ok(config) = toml::from_str::<Self>(&contents)
        {
            return config;
        }
        if let Ok(contents) = std::fs::read_to_string("config/arena.toml")
            && let Ok(config) = toml::from_str::<Self>(&contents)
        {
            return config;
        }
        Self::default()
    }

    /// Player hitbox half size in world units.
    pub fn player_half(&self) -> f32 {
        self.cell_size * self.player_half_extent_frac
    }

    /// Enemy hitbox half size in world units.
    pub fn enemy_half(&self) -> f32 {
        self.cell_size * self.enemy_half_extent_frac
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse_from_empty_toml() {
        let config: ArenaConfig = toml::from_str("").unwrap();
        assert_eq!(config.grid_cols, 15);
        assert!((config.cell_size - 64.0).abs() < f32::EPSILON);
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let config: ArenaConfig = toml::from_str("bomb_fuse_secs = 1.0\ngrid_cols = 21").unwrap();
        assert!((config.bomb_fuse_secs - 1.0).abs() < f32::EPSILON);
        assert_eq!(config.grid_cols, 21);
        assert_eq!(config.grid_rows, 13);
    }

    #[test]
    fn hitbox_fractions_stay_inside_a_cell() {
        let config = ArenaConfig::default();
        assert!(config.player_half() < config.cell_size / 2.0);
        assert!(config.enemy_half() < config.cell_size / 2.0);
    }

    #[test]
    fn stuck_threshold_exceeds_the_slowest_cell_crossing() {
        let config = ArenaConfig::default();
        let slowest = crate::enemy::EnemyKind::ALL
            .iter()
            .map(|k| k.speed())
            .fold(f32::INFINITY, f32::min);
        assert!(
            config.stuck_redirect_secs > config.cell_size / slowest,
            "a free-running enemy would trip the stuck redirect mid-cell"
        );
    }
}
