//! Grid-world simulation for a single snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! Each [`GridWorld`] is an independent environment stepped by relative actions.

pub mod action;
pub mod config;
pub mod reachability;
pub mod state;
pub mod world;

// Re-export commonly used types
pub use action::{Direction, RelativeAction};
pub use config::{GameConfig, RewardSchedule};
pub use reachability::{free_space, is_trap, trap_threshold};
pub use state::{Position, Snake};
pub use world::{GridWorld, StepInfo, StepResult, TerminationCause};
