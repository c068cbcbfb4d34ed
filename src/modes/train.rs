//! Training mode for the Q-learning agent
//!
//! Runs the lockstep batch trainer either headless (progress goes to the
//! log) or inside a TUI that draws every environment. Both drivers stop on
//! Ctrl+C or a stop key and always finish with a save of the table.
//!
//! # Example
//!
//! ```rust,ignore
//! use snake_qtable::modes::{TrainConfig, TrainMode};
//! use std::path::PathBuf;
//!
//! let config = TrainConfig::new(PathBuf::from("q_table.json"));
//! let mut train_mode = TrainMode::new(config);
//! train_mode.run(true).await?;
//! ```

use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use log::info;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    io::{stderr, Stderr},
    path::PathBuf,
    time::Duration,
};
use tokio::time::interval;

use crate::game::GameConfig;
use crate::input::{InputHandler, KeyAction};
use crate::metrics::TrainingStats;
use crate::render::{BatchView, Renderer, Theme};
use crate::rl::{JsonFileStore, PolicyMode, QLearningConfig, StopSignal, TableStore, TickReport, Trainer};

/// Configuration for training mode
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Number of environments stepped in lockstep
    pub num_envs: usize,

    /// Where the Q-table is loaded from and saved to
    pub table_path: PathBuf,

    /// Base seed; environment `i` uses `seed + i`
    pub seed: Option<u64>,

    /// Stop after this many ticks
    pub max_ticks: Option<u64>,

    /// Log training progress every N finished episodes
    pub log_frequency: usize,

    /// Delay between ticks in the TUI
    pub tick_interval: Duration,

    pub game_config: GameConfig,

    pub q_config: QLearningConfig,
}

impl TrainConfig {
    /// Create a new training configuration with defaults
    ///
    /// ```rust
    /// use snake_qtable::modes::TrainConfig;
    /// use std::path::PathBuf;
    ///
    /// let config = TrainConfig::new(PathBuf::from("q_table.json"));
    /// assert_eq!(config.num_envs, 16);
    /// ```
    pub fn new(table_path: PathBuf) -> Self {
        Self {
            num_envs: 16,
            table_path,
            seed: None,
            max_ticks: None,
            log_frequency: 100,
            tick_interval: Duration::from_millis(1),
            game_config: GameConfig::default(),
            q_config: QLearningConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.num_envs == 0 {
            return Err("num_envs must be at least 1".to_string());
        }
        if self.log_frequency == 0 {
            return Err("log_frequency must be at least 1".to_string());
        }
        if self.tick_interval.is_zero() {
            return Err("tick_interval must be non-zero".to_string());
        }
        self.game_config.validate()?;
        self.q_config.validate()
    }
}

/// Training mode for the tabular agent
pub struct TrainMode<S: TableStore> {
    trainer: Trainer<S>,

    /// Rolling statistics over finished episodes of this run
    stats: TrainingStats,

    config: TrainConfig,
}

impl TrainMode<JsonFileStore> {
    /// Create a training mode backed by the JSON table at `config.table_path`
    pub fn new(config: TrainConfig) -> Self {
        let store = JsonFileStore::new(config.table_path.clone());
        Self::with_store(config, store)
    }
}

impl<S: TableStore> TrainMode<S> {
    pub fn with_store(config: TrainConfig, store: S) -> Self {
        let trainer = Trainer::new(
            &config.game_config,
            config.q_config.clone(),
            config.num_envs,
            config.seed,
            store,
        );

        Self {
            trainer,
            stats: TrainingStats::new(100),
            config,
        }
    }

    /// Train until Ctrl+C, a stop key, or `max_ticks`, then save
    pub async fn run(&mut self, headless: bool) -> Result<()> {
        self.print_header(headless);

        let stop = StopSignal::new();
        if headless {
            let watcher = stop.clone();
            let ctrl_c = tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    watcher.request();
                }
            });
            let result = tokio::task::block_in_place(|| self.run_headless(&stop));
            ctrl_c.abort();
            result?;
        } else {
            self.run_tui(&stop).await?;
            self.trainer.finish()?;
        }

        println!("\nTraining stopped after {} ticks.", self.trainer.ticks());
        println!("Q-table saved to: {:?}", self.config.table_path);
        println!("States learned: {}", self.trainer.agent().table().len());
        println!("Total episodes: {}", self.trainer.agent().episodes_completed());
        println!("\nRun Statistics:");
        println!("{}", self.stats.format_summary());

        Ok(())
    }

    /// Tick without a terminal until stopped, then perform the final save
    pub fn run_headless(&mut self, stop: &StopSignal) -> Result<()> {
        while !stop.is_requested() && !self.reached_max_ticks() {
            let report = self.trainer.tick();
            self.observe(&report);
        }

        self.trainer.finish()
    }

    async fn run_tui(&mut self, stop: &StopSignal) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        let result = self.run_tui_loop(&mut terminal, stop).await;

        cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_tui_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
        stop: &StopSignal,
    ) -> Result<()> {
        let renderer = Renderer::new(Theme::default());
        let input = InputHandler::new();
        let mut event_stream = EventStream::new();

        let mut tick_timer = interval(self.config.tick_interval);

        // Render at 30 FPS
        let mut render_timer = interval(Duration::from_millis(33));

        loop {
            tokio::select! {
                maybe_event = event_stream.next() => {
                    if let Some(Ok(Event::Key(key))) = maybe_event {
                        if key.kind == KeyEventKind::Press
                            && input.handle_key_event(key) == KeyAction::Stop
                        {
                            stop.request();
                        }
                    }
                }

                _ = tick_timer.tick() => {
                    let report = self.trainer.tick();
                    self.observe(&report);
                }

                _ = render_timer.tick() => {
                    let runner = self.trainer.runner();
                    let view = BatchView {
                        worlds: runner.worlds(),
                        high_scores: runner.high_scores(),
                        record: self.trainer.record(),
                        episodes: self.trainer.agent().episodes_completed(),
                        epsilon: self.trainer.agent().epsilon(PolicyMode::Training),
                        states: self.trainer.agent().table().len(),
                    };
                    terminal
                        .draw(|frame| renderer.render_batch(frame, &view))
                        .context("Failed to draw frame")?;
                }

                _ = tokio::signal::ctrl_c() => {
                    stop.request();
                }
            }

            if stop.is_requested() || self.reached_max_ticks() {
                break;
            }
        }

        Ok(())
    }

    fn reached_max_ticks(&self) -> bool {
        self.config
            .max_ticks
            .is_some_and(|max| self.trainer.ticks() >= max)
    }

    fn observe(&mut self, report: &TickReport) {
        for finished in &report.finished {
            let summary = finished.summary;
            self.stats
                .record_episode(summary.total_reward, summary.steps, summary.score);

            if self.stats.total_episodes() % self.config.log_frequency == 0 {
                info!(
                    "[Episode {}] epsilon {:.2} | states {} | record {} | {}",
                    self.trainer.agent().episodes_completed(),
                    self.trainer.agent().epsilon(PolicyMode::Training),
                    self.trainer.agent().table().len(),
                    self.trainer.record(),
                    self.stats.format_summary()
                );
            }
        }
    }

    pub fn trainer(&self) -> &Trainer<S> {
        &self.trainer
    }

    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    fn print_header(&self, headless: bool) {
        let q = &self.config.q_config;
        println!("{}", "=".repeat(70));
        println!("Q-Learning Training - Snake");
        println!("{}", "=".repeat(70));
        println!(
            "Game Config: {}x{} grid, {} environments",
            self.config.game_config.grid_width,
            self.config.game_config.grid_height,
            self.config.num_envs
        );
        println!("Q-Learning Config:");
        println!("  Learning rate: {}", q.learning_rate);
        println!("  Gamma: {}", q.gamma);
        println!(
            "  Exploration: {} - {} per episode, floor {} (out of {})",
            q.epsilon_start, q.epsilon_decay, q.epsilon_floor, q.exploration_range
        );
        println!(
            "Resuming from episode {} with {} states",
            self.trainer.agent().episodes_completed(),
            self.trainer.agent().table().len()
        );
        match self.config.max_ticks {
            Some(max) => println!("Stops after {max} ticks"),
            None if headless => println!("Press Ctrl+C to stop and save"),
            None => println!("Press Q or S to stop and save"),
        }
        println!("Table path: {:?}", self.config.table_path);
        println!("{}", "=".repeat(70));
        println!();
    }
}

fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<Stderr>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::MemoryStore;
    use tempfile::TempDir;

    fn small_config(table_path: PathBuf) -> TrainConfig {
        let mut config = TrainConfig::new(table_path);
        config.num_envs = 4;
        config.seed = Some(3);
        config.game_config = GameConfig::small();
        config
    }

    #[test]
    fn test_train_config_creation() {
        let config = TrainConfig::new(PathBuf::from("test.json"));
        assert_eq!(config.num_envs, 16);
        assert_eq!(config.table_path, PathBuf::from("test.json"));
        assert_eq!(config.game_config.grid_width, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_train_config_rejects_zero_envs() {
        let mut config = TrainConfig::new(PathBuf::from("test.json"));
        config.num_envs = 0;
        assert!(config.validate().is_err());

        config.num_envs = 1;
        config.log_frequency = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_headless_run_saves_table() {
        let temp_dir = TempDir::new().unwrap();
        let table_path = temp_dir.path().join("tables").join("q_table.json");

        let mut config = small_config(table_path.clone());
        config.max_ticks = Some(300);

        let mut train_mode = TrainMode::new(config);
        train_mode.run_headless(&StopSignal::new()).unwrap();

        assert_eq!(train_mode.trainer().ticks(), 300);
        assert!(table_path.exists());

        let saved = JsonFileStore::new(&table_path).load().unwrap().unwrap();
        assert_eq!(
            saved.episode_count,
            train_mode.trainer().agent().episodes_completed()
        );
        assert_eq!(saved.len(), train_mode.trainer().agent().table().len());
    }

    #[test]
    fn test_stats_follow_finished_episodes() {
        let mut config = small_config(PathBuf::from("unused.json"));
        config.max_ticks = Some(500);

        let mut train_mode = TrainMode::with_store(config, MemoryStore::new());
        train_mode.run_headless(&StopSignal::new()).unwrap();

        let episodes = train_mode.trainer().agent().episodes_completed();
        assert!(episodes > 0);
        assert_eq!(train_mode.stats().total_episodes() as u64, episodes);
        assert_eq!(train_mode.stats().best_score(), train_mode.trainer().record());
    }

    #[test]
    fn test_requested_stop_still_saves() {
        let config = small_config(PathBuf::from("unused.json"));
        let mut train_mode = TrainMode::with_store(config, MemoryStore::new());

        let stop = StopSignal::new();
        stop.request();
        train_mode.run_headless(&stop).unwrap();

        assert_eq!(train_mode.trainer().ticks(), 0);
        assert_eq!(train_mode.trainer().store().save_count(), 1);
    }
}
