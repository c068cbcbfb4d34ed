pub mod demo;
pub mod reset;
pub mod train;

pub use demo::{DemoMode, PlaybackSpeed};
pub use reset::clear_table;
pub use train::{TrainConfig, TrainMode};
