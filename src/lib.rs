//! Grid Snake - a single-player snake game for the terminal
//!
//! This library provides:
//! - Core game logic (game module)
//! - The fixed-period game-loop timer (scheduler module)
//! - Key translation (input module)
//! - TUI rendering (render module)
//! - Score/message sink and session metrics (hud, metrics modules)
//! - The interactive session that ties them together (modes module)

pub mod game;
pub mod hud;
pub mod input;
pub mod logging;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod scheduler;
