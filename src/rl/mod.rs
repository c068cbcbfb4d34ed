//! Tabular Q-learning over batched snake environments
//!
//! Provides:
//! - 11-flag state encoding used as the table key
//! - Lazily initialised Q-table and epsilon-greedy policy
//! - Lockstep batch runner and trainer with record checkpoints
//! - JSON persistence of the table and episode count

pub mod agent;
pub mod batch;
pub mod config;
pub mod encoder;
pub mod persistence;
pub mod policy;
pub mod q_table;
pub mod trainer;

pub use agent::{QAgent, Transition};
pub use batch::{BatchRunner, EnvStep, EpisodeSummary};
pub use config::QLearningConfig;
pub use encoder::{encode, EncodedState};
pub use persistence::{
    restore_or_cold_start, JsonFileStore, MemoryStore, TableSnapshot, TableStore,
};
pub use policy::{EpsilonGreedy, PolicyMode};
pub use q_table::{ActionValues, QTable};
pub use trainer::{FinishedEpisode, StopSignal, TickReport, Trainer};
