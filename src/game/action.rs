/// Absolute heading of the snake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Clockwise cycle: Right -> Down -> Left -> Up -> Right
const CLOCKWISE: [Direction; 4] = [
    Direction::Right,
    Direction::Down,
    Direction::Left,
    Direction::Up,
];

impl Direction {
    /// Position of this heading in the clockwise cycle
    fn cycle_index(self) -> usize {
        match self {
            Direction::Right => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Up => 3,
        }
    }

    /// Heading after a quarter turn to the right
    pub fn clockwise(self) -> Direction {
        CLOCKWISE[(self.cycle_index() + 1) % 4]
    }

    /// Heading after a quarter turn to the left
    pub fn counter_clockwise(self) -> Direction {
        CLOCKWISE[(self.cycle_index() + 3) % 4]
    }

    /// Absolute heading produced by applying a relative action to `self`
    pub fn turned(self, action: RelativeAction) -> Direction {
        match action {
            RelativeAction::Straight => self,
            RelativeAction::TurnRight => self.clockwise(),
            RelativeAction::TurnLeft => self.counter_clockwise(),
        }
    }

    /// Returns the delta (dx, dy) for moving in this direction
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Action relative to the current heading
///
/// The discriminant is the column of the action in a Q-table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelativeAction {
    Straight = 0,
    TurnRight = 1,
    TurnLeft = 2,
}

impl RelativeAction {
    pub const ALL: [RelativeAction; 3] = [
        RelativeAction::Straight,
        RelativeAction::TurnRight,
        RelativeAction::TurnLeft,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Map a Q-table column back to an action, `None` outside 0..3
    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }
}
