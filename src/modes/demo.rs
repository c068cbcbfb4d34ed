//! Demo mode for watching the trained table play
//!
//! Loads the saved Q-table and plays a single board greedily. Nothing is
//! learned or saved while the demo runs.
//!
//! # Controls
//!
//! - Space: Pause/unpause
//! - 1-4: Speed control (1=slow, 2=normal, 3=fast, 4=very fast)
//! - Q/Esc: Quit

use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use log::{info, warn};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    io::{stderr, Stderr},
    time::Duration,
};
use tokio::time::{interval, Interval};

use crate::game::{GameConfig, GridWorld, StepResult};
use crate::input::{InputHandler, KeyAction};
use crate::render::{DemoView, Renderer, Theme};
use crate::rl::{encode, restore_or_cold_start, PolicyMode, QAgent, QLearningConfig, TableStore};

/// Playback speed settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackSpeed {
    /// 2 Hz
    Slow,
    /// 8 Hz
    Normal,
    /// 20 Hz
    Fast,
    /// 60 Hz
    VeryFast,
}

impl PlaybackSpeed {
    /// Speed for a number key, 1 (slowest) to 4 (fastest)
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(Self::Slow),
            2 => Some(Self::Normal),
            3 => Some(Self::Fast),
            4 => Some(Self::VeryFast),
            _ => None,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        match self {
            Self::Slow => Duration::from_millis(500),
            Self::Normal => Duration::from_millis(125),
            Self::Fast => Duration::from_millis(50),
            Self::VeryFast => Duration::from_millis(16),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Slow => "Slow",
            Self::Normal => "Normal",
            Self::Fast => "Fast",
            Self::VeryFast => "Very Fast",
        }
    }
}

pub struct DemoMode {
    world: GridWorld,
    agent: QAgent,
    renderer: Renderer,
    input: InputHandler,
    should_quit: bool,
    paused: bool,
    speed: PlaybackSpeed,

    /// Episodes finished since the demo started
    episode_count: u64,

    best_score: u32,
}

impl DemoMode {
    /// Create a demo playing the table held by `store`
    ///
    /// A missing or unreadable table still starts the demo with an empty
    /// table, which always goes straight.
    pub fn new<S: TableStore + ?Sized>(config: GameConfig, store: &S, seed: Option<u64>) -> Self {
        let mut agent = QAgent::new(QLearningConfig::default(), seed);
        match restore_or_cold_start(store) {
            Some(snapshot) => agent.restore(snapshot),
            None => warn!("Demo is running without a trained table"),
        }

        let world = match seed {
            Some(seed) => GridWorld::with_seed(config, seed),
            None => GridWorld::new(config),
        };

        Self::from_parts(world, agent)
    }

    pub fn from_parts(world: GridWorld, agent: QAgent) -> Self {
        Self {
            world,
            agent,
            renderer: Renderer::new(Theme::default()),
            input: InputHandler::new(),
            should_quit: false,
            paused: false,
            speed: PlaybackSpeed::Normal,
            episode_count: 0,
            best_score: 0,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        println!("{}", "=".repeat(60));
        println!("Q-Table Demo");
        println!("{}", "=".repeat(60));
        println!("States in table: {}", self.agent.table().len());
        println!("Episodes trained: {}", self.agent.episodes_completed());
        println!("{}", "=".repeat(60));
        println!();

        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        let result = self.run_demo_loop(&mut terminal).await;

        self.cleanup_terminal(&mut terminal)?;

        info!(
            "Demo finished after {} episodes, best score {}",
            self.episode_count, self.best_score
        );

        result
    }

    async fn run_demo_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        let mut tick_timer = interval(self.speed.tick_interval());

        // Render at 30 FPS
        let mut render_timer = interval(Duration::from_millis(33));

        loop {
            tokio::select! {
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event, &mut tick_timer);
                    }
                }

                _ = tick_timer.tick() => {
                    if !self.paused {
                        self.step_agent();
                    }
                }

                _ = render_timer.tick() => {
                    let view = DemoView {
                        world: &self.world,
                        episodes: self.episode_count,
                        best_score: self.best_score,
                        paused: self.paused,
                        speed: self.speed.as_str(),
                    };
                    terminal
                        .draw(|frame| self.renderer.render_demo(frame, &view))
                        .context("Failed to draw frame")?;
                }

                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Play one greedy step, starting a new episode when this one ends
    pub fn step_agent(&mut self) -> StepResult {
        let state = encode(&self.world);
        let action = self.agent.select_action(state, PolicyMode::Evaluation);
        let result = self.world.step(action);

        if result.done {
            self.best_score = self.best_score.max(result.score);
            self.episode_count += 1;
            self.world.reset();
        }

        result
    }

    fn handle_event(&mut self, event: Event, tick_timer: &mut Interval) {
        let Event::Key(key) = event else {
            return;
        };
        if key.kind != KeyEventKind::Press {
            return;
        }

        match self.input.handle_key_event(key) {
            KeyAction::Stop => self.should_quit = true,
            KeyAction::Pause => self.paused = !self.paused,
            KeyAction::Speed(level) => {
                if let Some(speed) = PlaybackSpeed::from_level(level) {
                    self.speed = speed;
                    *tick_timer = interval(speed.tick_interval());
                }
            }
            KeyAction::None => {}
        }
    }

    fn cleanup_terminal(&mut self, terminal: &mut Terminal<CrosstermBackend<Stderr>>) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }

    pub fn world(&self) -> &GridWorld {
        &self.world
    }

    pub fn agent(&self) -> &QAgent {
        &self.agent
    }

    pub fn episode_count(&self) -> u64 {
        self.episode_count
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Direction, Position, Snake};
    use crate::rl::{MemoryStore, QTable, TableSnapshot};

    fn world_heading_right() -> GridWorld {
        let snake = Snake::new(Position::new(5, 5), Direction::Right, 3);
        GridWorld::from_parts(
            GameConfig::small(),
            snake,
            Direction::Right,
            Position::new(0, 9),
            1,
        )
    }

    #[test]
    fn test_playback_speed() {
        assert_eq!(PlaybackSpeed::Slow.tick_interval(), Duration::from_millis(500));
        assert_eq!(PlaybackSpeed::Normal.tick_interval(), Duration::from_millis(125));
        assert_eq!(PlaybackSpeed::Fast.tick_interval(), Duration::from_millis(50));
        assert_eq!(PlaybackSpeed::VeryFast.tick_interval(), Duration::from_millis(16));
        assert_eq!(PlaybackSpeed::from_level(3), Some(PlaybackSpeed::Fast));
        assert_eq!(PlaybackSpeed::from_level(0), None);
    }

    #[test]
    fn test_demo_follows_table_greedily() {
        let world = world_heading_right();
        let state = encode(&world);

        let mut agent = QAgent::new(QLearningConfig::default(), Some(0));
        *agent.table_mut().get(state) = [0.0, 5.0, 1.0];

        let mut demo = DemoMode::from_parts(world, agent);
        let result = demo.step_agent();

        // Turning right while heading right means moving down
        assert!(!result.done);
        assert_eq!(demo.world().direction(), Direction::Down);
        assert_eq!(demo.world().head(), Position::new(5, 6));
    }

    #[test]
    fn test_demo_does_not_learn() {
        let world = world_heading_right();
        let state = encode(&world);

        let mut agent = QAgent::new(QLearningConfig::default(), Some(0));
        *agent.table_mut().get(state) = [2.0, 0.0, 0.0];
        let before = agent.table().clone();

        let mut demo = DemoMode::from_parts(world, agent);
        demo.step_agent();

        assert_eq!(demo.agent().table().peek(&state), before.peek(&state));
        assert_eq!(demo.agent().episodes_completed(), 0);
    }

    #[test]
    fn test_demo_resets_after_episode() {
        // Straight into the right wall from the board edge
        let snake = Snake::new(Position::new(9, 5), Direction::Right, 3);
        let world = GridWorld::from_parts(
            GameConfig::small(),
            snake,
            Direction::Right,
            Position::new(0, 0),
            1,
        );
        let agent = QAgent::new(QLearningConfig::default(), Some(0));

        let mut demo = DemoMode::from_parts(world, agent);
        let result = demo.step_agent();

        assert!(result.done);
        assert_eq!(demo.episode_count(), 1);
        assert!(!demo.world().is_finished());
        assert_eq!(demo.world().snake().len(), 3);
    }

    #[test]
    fn test_demo_restores_saved_table() {
        let table = QTable::from_entries([(encode(&world_heading_right()), [1.0, 0.0, 0.0])]);
        let store = MemoryStore::with_snapshot(TableSnapshot::from_table(&table, 42));

        let demo = DemoMode::new(GameConfig::small(), &store, Some(1));

        assert_eq!(demo.agent().episodes_completed(), 42);
        assert_eq!(demo.agent().table().len(), 1);
    }
}
