use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use tracing::{debug, warn};

use crate::game::{GameEngine, GameStatus, Outcome};
use crate::hud::Hud;
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::{Surface, View};
use crate::scheduler::Ticker;

/// The surface used for real play
pub type TerminalSurface = Terminal<CrosstermBackend<Stderr>>;

/// One interactive session: routes keys to the engine, drives it from the
/// ticker and redraws the surface after every committed change.
pub struct HumanMode<S: Surface> {
    engine: GameEngine,
    ticker: Ticker,
    hud: Hud,
    metrics: GameMetrics,
    input_handler: InputHandler,
    surface: S,
    should_quit: bool,
}

impl HumanMode<TerminalSurface> {
    /// Play on the real terminal until the player quits
    pub async fn run(engine: GameEngine) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        let mut mode = HumanMode::new(engine, terminal);

        // Run game loop with cleanup
        let result = mode.run_game_loop().await;

        mode.cleanup_terminal()?;

        result
    }

    fn cleanup_terminal(&mut self) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(self.surface.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        self.surface.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

impl<S: Surface> HumanMode<S> {
    pub fn new(engine: GameEngine, surface: S) -> Self {
        let ticker = Ticker::new(engine.config().tick_period());

        Self {
            engine,
            ticker,
            hud: Hud::new(),
            metrics: GameMetrics::new(),
            input_handler: InputHandler::new(),
            surface,
            should_quit: false,
        }
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    pub fn hud(&self) -> &Hud {
        &self.hud
    }

    pub fn metrics(&self) -> &GameMetrics {
        &self.metrics
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_running()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    async fn run_game_loop(&mut self) -> Result<()> {
        let mut event_stream = EventStream::new();
        self.present()?;

        loop {
            tokio::select! {
                // Input first, so a turn pressed before a tick is seen by that tick
                biased;

                // Handle terminal events
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event)?,
                        Some(Err(err)) => warn!(%err, "failed to read terminal event"),
                        None => self.should_quit = true,
                    }
                }

                // Game logic tick
                _ = self.ticker.tick() => {
                    self.on_tick()?;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Key(key) => {
                if !self.handle_key(key)? {
                    debug!(code = ?key.code, "ignored key");
                }
            }
            Event::Resize(..) => self.present()?,
            _ => {}
        }

        Ok(())
    }

    /// Apply a key press. Returns whether the key was consumed.
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        // Only process key press events, not release
        if key.kind != KeyEventKind::Press {
            return Ok(false);
        }

        let status = self.engine.status();
        match self.input_handler.handle_key_event(key) {
            KeyAction::Quit => {
                self.should_quit = true;
            }
            KeyAction::Reset => {
                self.reset()?;
            }
            KeyAction::Toggle => {
                if status == GameStatus::Over {
                    return Ok(false);
                }
                self.toggle()?;
            }
            KeyAction::Move(direction) => {
                if status != GameStatus::Running {
                    return Ok(false);
                }
                // A reversal is swallowed but still counts as handled
                self.engine.set_direction(direction);
            }
            KeyAction::None => return Ok(false),
        }

        Ok(true)
    }

    /// Start when idle, otherwise flip between running and paused
    pub fn toggle(&mut self) -> Result<()> {
        match self.engine.status() {
            GameStatus::NotStarted => self.start(),
            GameStatus::Running => self.pause(),
            GameStatus::Paused => self.resume(),
            GameStatus::Over => Ok(()),
        }
    }

    pub fn start(&mut self) -> Result<()> {
        if !self.engine.start() {
            return Ok(());
        }
        self.ticker.start();
        self.metrics.on_game_start();
        self.hud.message("Game started! Use the arrow keys to move");
        self.present()
    }

    pub fn pause(&mut self) -> Result<()> {
        if !self.engine.pause() {
            return Ok(());
        }
        self.ticker.stop();
        self.metrics.on_pause();
        self.hud.message("Game paused");
        self.present()
    }

    pub fn resume(&mut self) -> Result<()> {
        if !self.engine.resume() {
            return Ok(());
        }
        self.ticker.start();
        self.metrics.on_resume();
        self.hud.message("Game resumed");
        self.present()
    }

    /// Back to the start screen from any state
    pub fn reset(&mut self) -> Result<()> {
        self.ticker.stop();
        self.engine.reset();
        self.metrics.on_reset();
        self.hud.clear();
        self.hud.score_changed(self.engine.state().score);
        self.present()
    }

    /// Run one game step and publish its effects
    pub fn on_tick(&mut self) -> Result<Outcome> {
        let outcome = self.engine.step();
        debug!(?outcome, steps = self.engine.state().steps, "tick");

        match outcome {
            Outcome::Idle => return Ok(outcome),
            Outcome::Moved => {}
            Outcome::Ate => {
                let score = self.engine.state().score;
                self.hud.score_changed(score);
                self.hud.message(format!("Score: {score}!"));
            }
            Outcome::WallCollision | Outcome::SelfCollision | Outcome::BoardFilled => {
                let score = self.engine.state().score;
                self.ticker.stop();
                self.hud.score_changed(score);
                self.metrics.on_game_over(score);
                self.hud.message(game_over_message(outcome));
            }
        }

        self.present()?;
        Ok(outcome)
    }

    fn present(&mut self) -> Result<()> {
        self.metrics.update();
        let view = View {
            state: self.engine.state(),
            hud: &self.hud,
            metrics: &self.metrics,
        };
        self.surface.present(view)
    }
}

fn game_over_message(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::WallCollision => "You hit the wall!",
        Outcome::SelfCollision => "You hit yourself!",
        Outcome::BoardFilled => "You filled the board!",
        _ => "Game over",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Direction, GameConfig, GameState, Position, Snake};
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers};
    use rand::{SeedableRng, rngs::StdRng};

    /// Remembers what each presented frame showed
    #[derive(Default)]
    struct RecordingSurface {
        frames: Vec<(GameStatus, u32, usize)>,
    }

    impl Surface for RecordingSurface {
        fn present(&mut self, view: View<'_>) -> Result<()> {
            self.frames.push((
                view.state.status,
                view.hud.score(),
                view.state.snake.len(),
            ));
            Ok(())
        }
    }

    fn new_mode() -> HumanMode<RecordingSurface> {
        HumanMode::new(
            GameEngine::seeded(GameConfig::default(), 11),
            RecordingSurface::default(),
        )
    }

    /// A running game with the snake at (10,10) heading up and food right above it
    fn mode_about_to_eat() -> HumanMode<RecordingSurface> {
        let snake = Snake::new(Position::new(10, 10), Direction::Up);
        let state = GameState::new(snake, Position::new(10, 9), 20);
        let engine = GameEngine::with_state(GameConfig::default(), state, StdRng::seed_from_u64(5));
        let mut mode = HumanMode::new(engine, RecordingSurface::default());
        mode.start().unwrap();
        mode
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn frames(mode: &HumanMode<RecordingSurface>) -> usize {
        mode.surface().frames.len()
    }

    #[test]
    fn test_game_initialization() {
        let mode = new_mode();
        assert_eq!(mode.engine().status(), GameStatus::NotStarted);
        assert_eq!(mode.hud().score(), 0);
        assert!(!mode.is_ticking());
        assert!(!mode.should_quit());
    }

    #[tokio::test]
    async fn test_start() {
        let mut mode = new_mode();
        mode.start().unwrap();

        assert_eq!(mode.engine().status(), GameStatus::Running);
        assert!(mode.is_ticking());
        assert!(mode.metrics().is_clock_running());
        assert_eq!(mode.hud().latest(), Some("Game started! Use the arrow keys to move"));
        assert_eq!(frames(&mode), 1);

        // Starting again does nothing
        mode.start().unwrap();
        assert_eq!(frames(&mode), 1);
    }

    #[tokio::test]
    async fn test_pause_twice_is_pause_once() {
        let mut mode = new_mode();
        mode.start().unwrap();

        mode.pause().unwrap();
        let after_first = frames(&mode);
        assert_eq!(mode.engine().status(), GameStatus::Paused);
        assert!(!mode.is_ticking());

        mode.pause().unwrap();
        assert_eq!(mode.engine().status(), GameStatus::Paused);
        assert!(!mode.is_ticking());
        assert_eq!(frames(&mode), after_first);
        assert_eq!(mode.hud().latest(), Some("Game paused"));
    }

    #[tokio::test]
    async fn test_resume_restarts_ticker() {
        let mut mode = new_mode();
        mode.start().unwrap();
        mode.pause().unwrap();
        mode.resume().unwrap();

        assert_eq!(mode.engine().status(), GameStatus::Running);
        assert!(mode.is_ticking());
        assert_eq!(mode.hud().latest(), Some("Game resumed"));
    }

    #[test]
    fn test_pause_and_resume_ignored_before_start() {
        let mut mode = new_mode();
        mode.pause().unwrap();
        mode.resume().unwrap();

        assert_eq!(mode.engine().status(), GameStatus::NotStarted);
        assert_eq!(frames(&mode), 0);
    }

    #[tokio::test]
    async fn test_space_toggles_through_states() {
        let mut mode = new_mode();

        assert!(mode.handle_key(press(KeyCode::Char(' '))).unwrap());
        assert_eq!(mode.engine().status(), GameStatus::Running);

        assert!(mode.handle_key(press(KeyCode::Char(' '))).unwrap());
        assert_eq!(mode.engine().status(), GameStatus::Paused);

        assert!(mode.handle_key(press(KeyCode::Char(' '))).unwrap());
        assert_eq!(mode.engine().status(), GameStatus::Running);
    }

    #[test]
    fn test_moves_ignored_before_start() {
        let mut mode = new_mode();

        assert!(!mode.handle_key(press(KeyCode::Left)).unwrap());
        assert_eq!(mode.engine().state().pending_direction, Direction::Up);
    }

    #[tokio::test]
    async fn test_arrow_sets_pending_direction() {
        let mut mode = new_mode();
        mode.start().unwrap();

        assert!(mode.handle_key(press(KeyCode::Left)).unwrap());
        assert_eq!(mode.engine().state().pending_direction, Direction::Left);

        // Reversal is consumed but has no effect
        assert!(mode.handle_key(press(KeyCode::Down)).unwrap());
        assert_eq!(mode.engine().state().pending_direction, Direction::Left);
    }

    #[tokio::test]
    async fn test_key_release_ignored() {
        let mut mode = new_mode();
        let release = KeyEvent::new_with_kind_and_state(
            KeyCode::Char(' '),
            KeyModifiers::NONE,
            KeyEventKind::Release,
            KeyEventState::NONE,
        );

        assert!(!mode.handle_key(release).unwrap());
        assert_eq!(mode.engine().status(), GameStatus::NotStarted);
    }

    #[test]
    fn test_unknown_key_not_consumed() {
        let mut mode = new_mode();
        assert!(!mode.handle_key(press(KeyCode::Char('x'))).unwrap());
    }

    #[tokio::test]
    async fn test_tick_eats_food() {
        let mut mode = mode_about_to_eat();

        let outcome = mode.on_tick().unwrap();

        assert_eq!(outcome, Outcome::Ate);
        assert_eq!(mode.hud().score(), 10);
        assert_eq!(mode.hud().latest(), Some("Score: 10!"));
        assert_eq!(
            mode.surface().frames.last(),
            Some(&(GameStatus::Running, 10, 2))
        );
    }

    #[tokio::test]
    async fn test_wall_collision_ends_game() {
        let mut mode = new_mode();
        mode.start().unwrap();

        // Centre of a 20 board: ten free cells above the head
        let mut outcome = Outcome::Moved;
        for _ in 0..11 {
            outcome = mode.on_tick().unwrap();
            if outcome.is_terminal() {
                break;
            }
        }

        assert_eq!(outcome, Outcome::WallCollision);
        assert_eq!(mode.engine().status(), GameStatus::Over);
        assert!(!mode.is_ticking());
        assert_eq!(mode.metrics().games_played, 1);
        assert_eq!(mode.hud().latest(), Some("You hit the wall!"));

        // Space does nothing once the game is over
        assert!(!mode.handle_key(press(KeyCode::Char(' '))).unwrap());
        assert_eq!(mode.engine().status(), GameStatus::Over);
    }

    #[tokio::test]
    async fn test_idle_tick_does_not_render() {
        let mut mode = new_mode();
        mode.start().unwrap();
        mode.pause().unwrap();
        let before = frames(&mode);

        assert_eq!(mode.on_tick().unwrap(), Outcome::Idle);
        assert_eq!(frames(&mode), before);
    }

    #[tokio::test]
    async fn test_reset_from_any_state() {
        let mut mode = mode_about_to_eat();
        mode.on_tick().unwrap();
        assert_eq!(mode.hud().score(), 10);

        assert!(mode.handle_key(press(KeyCode::Char('r'))).unwrap());

        let state = mode.engine().state();
        assert_eq!(state.status, GameStatus::NotStarted);
        assert_eq!(state.score, 0);
        assert_eq!(state.snake.len(), 1);
        assert!(!mode.is_ticking());
        assert_eq!(mode.hud().score(), 0);
        assert_eq!(mode.hud().latest(), None);
        assert_eq!(
            mode.surface().frames.last(),
            Some(&(GameStatus::NotStarted, 0, 1))
        );

        // Reset while paused and while not started
        mode.start().unwrap();
        mode.pause().unwrap();
        mode.reset().unwrap();
        assert_eq!(mode.engine().status(), GameStatus::NotStarted);
        mode.reset().unwrap();
        assert_eq!(mode.engine().status(), GameStatus::NotStarted);
    }

    #[test]
    fn test_quit_key() {
        let mut mode = new_mode();
        assert!(mode.handle_key(press(KeyCode::Char('q'))).unwrap());
        assert!(mode.should_quit());
    }

    #[test]
    fn test_game_over_messages() {
        assert_eq!(game_over_message(Outcome::WallCollision), "You hit the wall!");
        assert_eq!(game_over_message(Outcome::SelfCollision), "You hit yourself!");
        assert_eq!(game_over_message(Outcome::BoardFilled), "You filled the board!");
    }
}
