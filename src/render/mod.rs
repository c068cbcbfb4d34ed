//! Terminal rendering of grid worlds
//!
//! Renderers only read simulation state; they never mutate it.

pub mod renderer;
pub mod theme;

pub use renderer::{BatchView, DemoView, Renderer};
pub use theme::Theme;
