use anyhow::{Context, Result};
use ratatui::{Terminal, backend::Backend};

use super::renderer::Renderer;
use crate::game::GameState;
use crate::hud::Hud;
use crate::metrics::GameMetrics;

/// Everything a frame is drawn from, borrowed after a committed update
#[derive(Clone, Copy)]
pub struct View<'a> {
    pub state: &'a GameState,
    pub hud: &'a Hud,
    pub metrics: &'a GameMetrics,
}

/// Something the game can be drawn onto
pub trait Surface {
    fn present(&mut self, view: View<'_>) -> Result<()>;
}

impl<B: Backend> Surface for Terminal<B> {
    fn present(&mut self, view: View<'_>) -> Result<()> {
        let renderer = Renderer::new();
        self.draw(|frame| renderer.render(frame, &view))
            .context("Failed to draw frame")?;
        Ok(())
    }
}
