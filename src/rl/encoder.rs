use serde::{Deserialize, Serialize};

use crate::game::{is_trap, Direction, GridWorld};

/// Number of flags in an [`EncodedState`]
pub const STATE_FLAGS: usize = 11;

/// Compact observation of a [`GridWorld`] used as the Q-table key
///
/// Flag order:
/// - 0..3: danger straight, right, left (relative to heading)
/// - 3..7: moving left, right, up, down
/// - 7..11: food left, right, up, down (relative to the head)
///
/// Every flag is 0 or 1. Worlds that encode to the same flags are the same
/// state as far as learning is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EncodedState([u8; STATE_FLAGS]);

impl EncodedState {
    pub fn new(flags: [bool; STATE_FLAGS]) -> Self {
        Self(flags.map(u8::from))
    }

    pub fn flags(&self) -> &[u8; STATE_FLAGS] {
        &self.0
    }

    /// Flags packed into an 11-bit mask, flag 0 in the highest bit
    pub fn bits(&self) -> u16 {
        self.0
            .iter()
            .fold(0u16, |acc, &flag| (acc << 1) | u16::from(flag))
    }

    pub fn danger_straight(&self) -> bool {
        self.0[0] == 1
    }

    pub fn danger_right(&self) -> bool {
        self.0[1] == 1
    }

    pub fn danger_left(&self) -> bool {
        self.0[2] == 1
    }

    /// The heading encoded in the one-hot direction flags
    pub fn heading(&self) -> Option<Direction> {
        match &self.0[3..7] {
            [1, 0, 0, 0] => Some(Direction::Left),
            [0, 1, 0, 0] => Some(Direction::Right),
            [0, 0, 1, 0] => Some(Direction::Up),
            [0, 0, 0, 1] => Some(Direction::Down),
            _ => None,
        }
    }

    /// Food flags in the order left, right, up, down
    pub fn food_relation(&self) -> [bool; 4] {
        [self.0[7] == 1, self.0[8] == 1, self.0[9] == 1, self.0[10] == 1]
    }
}

/// Encode the current observation of `world`
///
/// Danger in a relative direction is the trap check on the neighbouring
/// cell in the corresponding absolute direction.
pub fn encode(world: &GridWorld) -> EncodedState {
    let head = world.head();
    let heading = world.direction();
    let food = world.food();

    let danger = |dir: Direction| is_trap(world, head.moved_in_direction(dir));

    EncodedState::new([
        danger(heading),
        danger(heading.clockwise()),
        danger(heading.counter_clockwise()),
        heading == Direction::Left,
        heading == Direction::Right,
        heading == Direction::Up,
        heading == Direction::Down,
        food.x < head.x,
        food.x > head.x,
        food.y < head.y,
        food.y > head.y,
    ])
}
