use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::{
    action::{Direction, RelativeAction},
    config::GameConfig,
    state::{Position, Snake},
};

/// Why an episode ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationCause {
    /// Head left the grid
    Wall,
    /// Head ran into its own body
    SelfCollision,
    /// Too many frames without the episode ending otherwise
    Starvation,
}

/// Information about a step
#[derive(Debug, Clone, PartialEq)]
pub struct StepInfo {
    /// Whether the snake ate food this step
    pub ate_food: bool,
    /// Set when the step ended the episode
    pub cause: Option<TerminationCause>,
}

/// Result of a single [`GridWorld::step`]
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub reward: f64,
    pub done: bool,
    /// Score after the step (unchanged on a terminal step)
    pub score: u32,
    pub info: StepInfo,
}

/// One snake environment
///
/// Owns the snake, its heading, the food cell and the episode counters.
/// Mutated only through [`reset`](Self::reset) and [`step`](Self::step);
/// after a terminal step the board is left as it was at the moment of
/// death and the world must be reset before it is stepped again.
#[derive(Debug, Clone)]
pub struct GridWorld {
    config: GameConfig,
    snake: Snake,
    direction: Direction,
    food: Position,
    score: u32,
    frame_count: u32,
    finished: bool,
    rng: StdRng,
}

impl GridWorld {
    /// Create a world seeded from OS entropy
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create a world whose food placement is reproducible
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, rng: StdRng) -> Self {
        let snake = Snake::new(Position::new(0, 0), Direction::Right, 1);
        let mut world = Self {
            config,
            snake,
            direction: Direction::Right,
            food: Position::new(0, 0),
            score: 0,
            frame_count: 0,
            finished: false,
            rng,
        };
        world.reset();
        world
    }

    /// Build a world in an arbitrary position
    ///
    /// Counters start at zero. Used to set up specific board layouts.
    pub fn from_parts(
        config: GameConfig,
        snake: Snake,
        direction: Direction,
        food: Position,
        seed: u64,
    ) -> Self {
        Self {
            config,
            snake,
            direction,
            food,
            score: 0,
            frame_count: 0,
            finished: false,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Respawn a centered snake heading right and place new food
    pub fn reset(&mut self) {
        let center = Position::new(
            (self.config.grid_width / 2) as i32,
            (self.config.grid_height / 2) as i32,
        );

        self.direction = Direction::Right;
        self.snake = Snake::new(center, self.direction, self.config.initial_snake_length);
        self.score = 0;
        self.frame_count = 0;
        self.finished = false;
        self.place_food();
    }

    /// Turn, advance the head one cell and resolve the outcome
    pub fn step(&mut self, action: RelativeAction) -> StepResult {
        if self.finished {
            return StepResult {
                reward: 0.0,
                done: true,
                score: self.score,
                info: StepInfo {
                    ate_food: false,
                    cause: None,
                },
            };
        }

        self.frame_count += 1;
        let old_distance = self.snake.head().manhattan_distance(self.food);

        self.direction = self.direction.turned(action);
        let new_head = self.snake.head().moved_in_direction(self.direction);
        self.snake.push_head(new_head);

        if let Some(cause) = self.termination_cause() {
            self.finished = true;
            return StepResult {
                reward: self.config.rewards.death,
                done: true,
                score: self.score,
                info: StepInfo {
                    ate_food: false,
                    cause: Some(cause),
                },
            };
        }

        let rewards = self.config.rewards;
        if new_head == self.food {
            self.score += 1;
            self.place_food();

            return StepResult {
                reward: rewards.food,
                done: false,
                score: self.score,
                info: StepInfo {
                    ate_food: true,
                    cause: None,
                },
            };
        }

        let reward = if new_head.manhattan_distance(self.food) < old_distance {
            rewards.approach
        } else {
            rewards.retreat
        };
        self.snake.pop_tail();

        StepResult {
            reward,
            done: false,
            score: self.score,
            info: StepInfo {
                ate_food: false,
                cause: None,
            },
        }
    }

    /// Check if `point` is outside the grid or on any snake segment
    pub fn is_collision(&self, point: Position) -> bool {
        !self.is_in_bounds(point) || self.snake.contains(point)
    }

    /// Check the already placed head against the walls and the rest of the body
    pub fn head_collides(&self) -> bool {
        let head = self.snake.head();
        !self.is_in_bounds(head) || self.snake.collides_with_body(head)
    }

    /// Check if a position is within the grid bounds
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0
            && pos.x < self.config.grid_width as i32
            && pos.y >= 0
            && pos.y < self.config.grid_height as i32
    }

    fn termination_cause(&self) -> Option<TerminationCause> {
        let head = self.snake.head();
        if !self.is_in_bounds(head) {
            return Some(TerminationCause::Wall);
        }
        if self.snake.collides_with_body(head) {
            return Some(TerminationCause::SelfCollision);
        }

        let frame_limit = self.config.starvation_factor as usize * self.snake.len();
        if self.frame_count as usize > frame_limit {
            return Some(TerminationCause::Starvation);
        }

        None
    }

    /// Sample the food cell uniformly among cells the snake does not occupy
    ///
    /// A completely filled board keeps the previous food cell.
    fn place_food(&mut self) {
        let width = self.config.grid_width as i32;
        let height = self.config.grid_height as i32;
        let free: Vec<Position> = (0..height)
            .flat_map(|y| (0..width).map(move |x| Position::new(x, y)))
            .filter(|&pos| !self.snake.contains(pos))
            .collect();

        if let Some(&food) = free.choose(&mut self.rng) {
            self.food = food;
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn head(&self) -> Position {
        self.snake.head()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn food(&self) -> Position {
        self.food
    }

    /// Move the food cell, used to stage specific situations
    pub fn set_food(&mut self, food: Position) {
        self.food = food;
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// True once a terminal step happened and before the next reset
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn width(&self) -> usize {
        self.config.grid_width
    }

    pub fn height(&self) -> usize {
        self.config.grid_height
    }
}
