use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Identifies the player who owns a bomb or scored an elimination.
pub type PlayerId = u32;

/// Core trait implemented by a gridblast game.
///
/// The host shell owns input devices, rendering, audio, and persistence;
/// the game only advances the simulation once per tick and reports what
/// happened as [`GameEvent`]s.
pub trait ArcadeGame: Send + Sync {
    /// Metadata for the shell's game-selection screen.
    fn metadata(&self) -> GameMetadata;

    /// Called once before the first tick.
    fn init(&mut self, config: &GameConfig);

    /// Advance one simulation tick. Returns the discrete events the shell
    /// derives scoring/achievement bookkeeping from.
    fn update(&mut self, dt: f32) -> Vec<GameEvent>;

    /// Serialize the full simulation state (MessagePack).
    fn serialize_state(&self) -> Vec<u8>;

    /// Replace the simulation state with a previously serialized snapshot.
    fn apply_state(&mut self, state: &[u8]);

    /// Buffer a normalized input frame; consumed by the next `update`.
    fn apply_input(&mut self, input: &[u8]);

    /// Simulation tick rate in Hz.
    fn tick_rate(&self) -> f32 {
        30.0
    }

    /// Called when the shell needs gameplay frozen (menu, focus loss).
    fn pause(&mut self);

    /// Resume after a pause.
    fn resume(&mut self);

    /// Whether the current round is over (cleared or out of lives).
    fn is_round_complete(&self) -> bool;

    /// Result summary for the round so far.
    fn round_results(&self) -> RoundResult;
}

/// Game metadata for the shell's selection screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMetadata {
    pub name: String,
    pub description: String,
    pub estimated_round_duration: Duration,
}

/// Configuration for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub starting_lives: u32,
    pub level: u32,
    /// Game-specific extras (e.g. a level seed) without widening this type.
    pub custom: HashMap<String, serde_json::Value>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_lives: 3,
            level: 1,
            custom: HashMap::new(),
        }
    }
}

/// Discrete events emitted during `update` for the shell's scoring,
/// achievement, and persistence bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ScoreUpdate { score: i32 },
    BombExploded { owner: PlayerId },
    EnemyEliminated { points: i32 },
    PlayerEliminated { lives_left: u32 },
    PowerUpCollected { points: i32 },
    LevelCleared { level: u32 },
    RoundComplete,
}

/// Summary of a round for the shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    pub score: i32,
    pub lives_left: u32,
    pub level: u32,
    pub cleared: bool,
}

/// Generates the boilerplate `ArcadeGame` methods that are identical across
/// games: `serialize_state`, `apply_state`, `pause`, `resume`,
/// `is_round_complete`.
///
/// Requires the implementing struct to have `state: $StateType` and
/// `paused: bool` fields, and `$StateType` to have a `round_complete: bool`
/// field.
#[macro_export]
macro_rules! arcade_game_boilerplate {
    (state_type: $StateType:ty) => {
        fn serialize_state(&self) -> Vec<u8> {
            rmp_serde::to_vec(&self.state).expect("game state serialization must succeed")
        }

        fn apply_state(&mut self, state: &[u8]) {
            if let Ok(s) = rmp_serde::from_slice::<$StateType>(state) {
                self.state = s;
            }
        }

        fn pause(&mut self) {
            self.paused = true;
        }

        fn resume(&mut self) {
            self.paused = false;
        }

        fn is_round_complete(&self) -> bool {
            self.state.round_complete
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.starting_lives, 3);
        assert_eq!(cfg.level, 1);
        assert!(cfg.custom.is_empty());
    }

    #[test]
    fn events_roundtrip_through_messagepack() {
        let events = vec![
            GameEvent::BombExploded { owner: 1 },
            GameEvent::EnemyEliminated { points: 400 },
            GameEvent::RoundComplete,
        ];
        let bytes = rmp_serde::to_vec(&events).unwrap();
        let back: Vec<GameEvent> = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(events, back);
    }
}
