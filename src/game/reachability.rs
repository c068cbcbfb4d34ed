//! Bounded flood fill used to flag moves that lead into dead ends
//!
//! A move is a "trap" when the region of free cells reachable from its
//! destination is smaller than the snake plus a small margin. The search
//! stops as soon as enough room has been found, so its cost is bounded by
//! [`MAX_TRAP_THRESHOLD`] regardless of board size. This estimates local
//! room only; it does not prove the snake can survive in that room.

use std::collections::{HashSet, VecDeque};

use super::{state::Position, world::GridWorld};

/// Free cells required beyond the snake length for a region to count as safe
pub const TRAP_MARGIN: usize = 5;

/// Upper bound on the number of cells a single search visits
pub const MAX_TRAP_THRESHOLD: usize = 100;

/// Number of reachable cells above which a region is considered open
pub fn trap_threshold(snake_len: usize) -> usize {
    (snake_len + TRAP_MARGIN).min(MAX_TRAP_THRESHOLD)
}

/// Returns true if moving the head to `point` is unsafe
///
/// Unsafe means either an immediate collision or a pocket of free cells no
/// larger than [`trap_threshold`] for the current snake.
pub fn is_trap(world: &GridWorld, point: Position) -> bool {
    if world.is_collision(point) {
        return true;
    }

    let threshold = trap_threshold(world.snake().len());
    free_space(world, point, threshold) <= threshold
}

/// Count free cells reachable from `start`, stopping once the count exceeds `limit`
///
/// Returns at most `limit + 1`. Cells on the snake or outside the grid are
/// never entered; `start` itself is counted if it is free.
pub fn free_space(world: &GridWorld, start: Position, limit: usize) -> usize {
    if world.is_collision(start) {
        return 0;
    }

    let occupied: HashSet<Position> = world.snake().segments().copied().collect();
    let is_free = |pos: Position| world.is_in_bounds(pos) && !occupied.contains(&pos);

    let mut queue = VecDeque::from([start]);
    let mut visited = HashSet::from([start]);
    let mut count = 0;

    while let Some(current) = queue.pop_front() {
        count += 1;
        if count > limit {
            break;
        }

        for next in current.neighbours() {
            if is_free(next) && visited.insert(next) {
                queue.push_back(next);
            }
        }
    }

    count
}
