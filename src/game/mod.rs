//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! The engine owns the whole game state; everything else reads it through
//! [`GameEngine::state`] and changes it only through the engine's operations.

pub mod config;
pub mod direction;
pub mod engine;
pub mod state;

// Re-export commonly used types
pub use config::{BOARD_SIZE, FOOD_REWARD, GameConfig, TICK_PERIOD_MS};
pub use direction::Direction;
pub use engine::{GameEngine, Outcome};
pub use state::{GameState, GameStatus, Position, Snake};
