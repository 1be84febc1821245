use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cells along each side of the square board
pub const BOARD_SIZE: usize = 20;
/// Milliseconds between two game steps
pub const TICK_PERIOD_MS: u64 = 150;
/// Points awarded for each piece of food
pub const FOOD_REWARD: u32 = 10;

/// Configuration for the game
///
/// The defaults are the fixed game constants. Other values are only used by
/// tests that need a smaller board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Width and height of the game grid
    pub board_size: usize,
    /// Period of the game loop, in milliseconds
    pub tick_period_ms: u64,
    /// Score added for eating food
    pub food_reward: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_size: BOARD_SIZE,
            tick_period_ms: TICK_PERIOD_MS,
            food_reward: FOOD_REWARD,
        }
    }
}

impl GameConfig {
    /// Create a configuration with a custom board size
    pub fn with_board_size(board_size: usize) -> Self {
        Self {
            board_size,
            ..Default::default()
        }
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    /// Number of cells on the board
    pub fn cell_count(&self) -> usize {
        self.board_size * self.board_size
    }
}
