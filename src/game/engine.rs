use super::{
    config::GameConfig,
    direction::Direction,
    state::{GameState, GameStatus, Position, Snake},
};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Result of a single call to [`GameEngine::step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The game is not running, nothing changed
    Idle,
    /// The snake moved one cell
    Moved,
    /// The snake moved onto the food and grew
    Ate,
    /// The new head left the board; the game is over
    WallCollision,
    /// The new head hit the snake's own body; the game is over
    SelfCollision,
    /// The snake ate and now covers every cell; the game is over
    BoardFilled,
}

impl Outcome {
    /// Whether this outcome ended the game
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Outcome::WallCollision | Outcome::SelfCollision | Outcome::BoardFilled
        )
    }

    /// Whether the board changed and should be redrawn
    pub fn changed_board(&self) -> bool {
        !matches!(self, Outcome::Idle)
    }
}

/// The game engine that owns the game state and handles all game logic
pub struct GameEngine<R = StdRng> {
    config: GameConfig,
    state: GameState,
    rng: R,
}

impl GameEngine<StdRng> {
    /// Create a new game engine with an entropy-seeded generator
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create an engine whose food placement is reproducible
    pub fn seeded(config: GameConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> GameEngine<R> {
    pub fn with_rng(config: GameConfig, mut rng: R) -> Self {
        let state = initial_state(&config, &mut rng);
        Self { config, state, rng }
    }

    /// Resume from an existing state, e.g. a hand-built board
    pub fn with_state(config: GameConfig, state: GameState, rng: R) -> Self {
        Self { config, state, rng }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn status(&self) -> GameStatus {
        self.state.status
    }

    /// Reset the game to initial state
    pub fn reset(&mut self) {
        self.state = initial_state(&self.config, &mut self.rng);
    }

    /// `NotStarted -> Running`. Returns whether the transition happened.
    pub fn start(&mut self) -> bool {
        self.transition(GameStatus::NotStarted, GameStatus::Running)
    }

    /// `Running -> Paused`. Returns whether the transition happened.
    pub fn pause(&mut self) -> bool {
        self.transition(GameStatus::Running, GameStatus::Paused)
    }

    /// `Paused -> Running`. Returns whether the transition happened.
    pub fn resume(&mut self) -> bool {
        self.transition(GameStatus::Paused, GameStatus::Running)
    }

    fn transition(&mut self, from: GameStatus, to: GameStatus) -> bool {
        if self.state.status != from {
            return false;
        }
        self.state.status = to;
        true
    }

    /// Queue a direction for the next step.
    ///
    /// Ignored unless the game is running, and ignored if it would reverse the
    /// direction the snake last moved in. Returns whether it was accepted.
    pub fn set_direction(&mut self, direction: Direction) -> bool {
        if !self.state.is_running() || self.state.snake.direction.is_opposite(direction) {
            return false;
        }
        self.state.pending_direction = direction;
        true
    }

    /// Advance the game by one cell
    pub fn step(&mut self) -> Outcome {
        if !self.state.is_running() {
            return Outcome::Idle;
        }

        let state = &mut self.state;
        let direction = state.pending_direction;
        let new_head = state.snake.head().moved_in_direction(direction);

        // Collisions end the game before the body is touched
        if !state.is_in_bounds(new_head) {
            state.status = GameStatus::Over;
            return Outcome::WallCollision;
        }
        if state.snake.occupies(new_head) {
            state.status = GameStatus::Over;
            return Outcome::SelfCollision;
        }

        let ate_food = new_head == state.food;
        state.snake.direction = direction;
        state.snake.advance_to(new_head, ate_food);
        state.steps += 1;

        if !ate_food {
            return Outcome::Moved;
        }

        state.score += self.config.food_reward;
        if state.snake.len() >= self.config.cell_count() {
            state.status = GameStatus::Over;
            return Outcome::BoardFilled;
        }
        state.food = spawn_food_avoid_snake(&mut self.rng, state.board_size, &state.snake);
        Outcome::Ate
    }
}

fn initial_state<R: Rng>(config: &GameConfig, rng: &mut R) -> GameState {
    let center = (config.board_size / 2) as i32;
    let snake = Snake::new(Position::new(center, center), Direction::Up);
    let food = spawn_food_avoid_snake(rng, config.board_size, &snake);
    GameState::new(snake, food, config.board_size)
}

/// Spawn food at a random empty position.
///
/// Terminates only while the snake leaves at least one cell free.
fn spawn_food_avoid_snake<R: Rng>(rng: &mut R, board_size: usize, snake: &Snake) -> Position {
    loop {
        let x = rng.gen_range(0..board_size) as i32;
        let y = rng.gen_range(0..board_size) as i32;
        let pos = Position::new(x, y);

        if !snake.occupies(pos) {
            return pos;
        }
    }
}
