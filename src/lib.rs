//! Snake Q-Table - a batched snake grid-world trained with tabular Q-learning
//!
//! This library provides:
//! - Core game logic and the free-space trap check (game module)
//! - State encoding, Q-table, lockstep batch trainer and persistence (rl module)
//! - TUI rendering and key handling (render and input modules)
//! - Episode statistics (metrics module)
//! - Train, demo and reset modes (modes module)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod rl;
