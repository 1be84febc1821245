//! Score and lifecycle-message sink shown under the board

use std::collections::VecDeque;
use tracing::{debug, info};

/// How many recent messages are kept for display
const MESSAGE_HISTORY: usize = 4;

#[derive(Debug, Default)]
pub struct Hud {
    score: u32,
    messages: VecDeque<String>,
}

impl Hud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score_changed(&mut self, score: u32) {
        if self.score != score {
            debug!(score, "score updated");
        }
        self.score = score;
    }

    /// Record a human-readable status message
    pub fn message(&mut self, text: impl Into<String>) {
        let text = text.into();
        info!(target: "grid_snake::events", "{text}");

        if self.messages.len() == MESSAGE_HISTORY {
            self.messages.pop_front();
        }
        self.messages.push_back(text);
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn latest(&self) -> Option<&str> {
        self.messages.back().map(String::as_str)
    }

    /// Oldest first
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.score = 0;
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_is_bounded() {
        let mut hud = Hud::new();
        for i in 0..10 {
            hud.message(format!("message {i}"));
        }

        let kept: Vec<_> = hud.messages().collect();
        assert_eq!(kept.len(), MESSAGE_HISTORY);
        assert_eq!(kept[0], "message 6");
        assert_eq!(hud.latest(), Some("message 9"));
    }

    #[test]
    fn test_clear() {
        let mut hud = Hud::new();
        hud.score_changed(40);
        hud.message("Game paused");
        hud.clear();

        assert_eq!(hud.score(), 0);
        assert_eq!(hud.latest(), None);
    }
}
