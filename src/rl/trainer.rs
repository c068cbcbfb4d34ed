//! Lockstep training over a batch of environments
//!
//! Each tick collects one action per environment, steps every environment,
//! re-encodes the results and applies one Q-learning update per
//! environment before advancing episode counters. The single Q-table is
//! only written from this sequential loop.

use anyhow::{Context, Result};
use log::{info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::agent::{QAgent, Transition};
use super::batch::{BatchRunner, EpisodeSummary};
use super::config::QLearningConfig;
use super::persistence::{restore_or_cold_start, TableStore};
use super::policy::PolicyMode;
use crate::game::GameConfig;

/// A new record score is checkpointed when it is a multiple of this
pub const CHECKPOINT_RECORD_MULTIPLE: u32 = 5;

/// Shared flag asking a training loop to stop after the current tick
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// An episode that ended during a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinishedEpisode {
    pub env: usize,
    pub summary: EpisodeSummary,
}

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub finished: Vec<FinishedEpisode>,
    /// Set when this tick raised the record score
    pub new_record: Option<u32>,
    pub checkpoint_saved: bool,
}

pub struct Trainer<S: TableStore> {
    agent: QAgent,
    runner: BatchRunner,
    store: S,
    record: u32,
    ticks: u64,
}

impl<S: TableStore> Trainer<S> {
    /// Create a trainer, resuming from `store` when it holds a saved table
    pub fn new(
        game_config: &GameConfig,
        q_config: QLearningConfig,
        num_envs: usize,
        seed: Option<u64>,
        store: S,
    ) -> Self {
        let mut agent = QAgent::new(q_config, seed.map(|s| s.wrapping_mul(31).wrapping_add(7)));
        if let Some(snapshot) = restore_or_cold_start(&store) {
            agent.restore(snapshot);
        }

        let runner = BatchRunner::new(game_config, num_envs, seed);
        Self::from_parts(agent, runner, store)
    }

    pub fn from_parts(agent: QAgent, runner: BatchRunner, store: S) -> Self {
        Self {
            agent,
            runner,
            store,
            record: 0,
            ticks: 0,
        }
    }

    /// Advance every environment by one step and learn from the results
    pub fn tick(&mut self) -> TickReport {
        let states = self.runner.encode_all();
        let actions: Vec<_> = states
            .iter()
            .map(|&state| self.agent.select_action(state, PolicyMode::Training))
            .collect();

        let steps = self.runner.step_all(&actions);
        let next_states = self.runner.encode_all();

        let mut report = TickReport::default();
        for (env, step) in steps.iter().enumerate() {
            self.agent.train_step(&Transition {
                state: states[env],
                action: actions[env],
                reward: step.reward,
                next_state: next_states[env],
                done: step.done,
            });

            let Some(summary) = step.episode else {
                continue;
            };

            self.agent.complete_episode();
            report.finished.push(FinishedEpisode { env, summary });

            if summary.score > self.record {
                self.record = summary.score;
                report.new_record = Some(self.record);
                info!(
                    "New record {} in env {} at episode {}",
                    self.record,
                    env,
                    self.agent.episodes_completed()
                );

                if self.record % CHECKPOINT_RECORD_MULTIPLE == 0 {
                    report.checkpoint_saved = self.checkpoint();
                }
            }
        }

        self.ticks += 1;
        report
    }

    /// Tick until `stop` is requested or `max_ticks` have run, then save
    pub fn run_until(&mut self, stop: &StopSignal, max_ticks: Option<u64>) -> Result<()> {
        while !stop.is_requested() && max_ticks.map_or(true, |max| self.ticks < max) {
            self.tick();
        }

        self.finish()
    }

    /// Persist the table and episode count
    pub fn finish(&mut self) -> Result<()> {
        self.store
            .save(&self.agent.snapshot())
            .context("Failed to save final Q-table")
    }

    fn checkpoint(&mut self) -> bool {
        match self.store.save(&self.agent.snapshot()) {
            Ok(()) => true,
            Err(err) => {
                warn!("Checkpoint at record {} failed: {err:#}", self.record);
                false
            }
        }
    }

    pub fn agent(&self) -> &QAgent {
        &self.agent
    }

    pub fn runner(&self) -> &BatchRunner {
        &self.runner
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Best episode score seen in this run
    pub fn record(&self) -> u32 {
        self.record
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Direction, GridWorld, Position, RelativeAction, Snake};
    use crate::rl::persistence::{MemoryStore, TableSnapshot};
    use crate::rl::QTable;

    fn trainer(num_envs: usize, store: MemoryStore) -> Trainer<MemoryStore> {
        Trainer::new(
            &GameConfig::small(),
            QLearningConfig::default(),
            num_envs,
            Some(17),
            store,
        )
    }

    #[test]
    fn test_tick_learns() {
        let mut trainer = trainer(4, MemoryStore::new());
        for _ in 0..50 {
            trainer.tick();
        }

        assert_eq!(trainer.ticks(), 50);
        assert!(!trainer.agent().table().is_empty());
    }

    #[test]
    fn test_episode_counters_advance() {
        let mut trainer = trainer(4, MemoryStore::new());
        let mut finished = 0;
        for _ in 0..2000 {
            finished += trainer.tick().finished.len();
        }

        assert!(finished > 0);
        assert_eq!(trainer.agent().episodes_completed(), finished as u64);
        let per_env: u64 = trainer.runner().episodes().iter().sum();
        assert_eq!(per_env, finished as u64);
    }

    #[test]
    fn test_resumes_from_store() {
        let mut saved = QTable::new();
        saved.get(crate::rl::EncodedState::new([true; 11]))[0] = 9.0;
        let store = MemoryStore::with_snapshot(TableSnapshot::from_table(&saved, 1600));

        let trainer = trainer(1, store);

        assert_eq!(trainer.agent().episodes_completed(), 1600);
        assert_eq!(trainer.agent().epsilon(PolicyMode::Training), 1.0);
        assert_eq!(trainer.agent().table(), &saved);
    }

    #[test]
    fn test_stop_signal_saves_without_stepping() {
        let mut trainer = trainer(2, MemoryStore::new());
        let stop = StopSignal::new();
        stop.request();

        trainer.run_until(&stop, None).unwrap();

        assert_eq!(trainer.ticks(), 0);
        assert_eq!(trainer.store().save_count(), 1);
    }

    #[test]
    fn test_run_until_max_ticks() {
        let mut trainer = trainer(2, MemoryStore::new());
        trainer.run_until(&StopSignal::new(), Some(25)).unwrap();

        assert_eq!(trainer.ticks(), 25);
        let saved = trainer.store().saved().unwrap();
        assert_eq!(saved.episode_count, trainer.agent().episodes_completed());
        assert_eq!(saved.len(), trainer.agent().table().len());
    }

    /// A one-row board exactly `score + 1` cells wide, filled by a snake that
    /// has eaten `score` times; every action ends the episode
    fn full_corridor(score: u32) -> GridWorld {
        let mut config = GameConfig::new(score as usize + 1, 1);
        config.initial_snake_length = 1;
        let mut world = GridWorld::from_parts(
            config,
            Snake::from_segments([Position::new(0, 0)]),
            Direction::Right,
            Position::new(1, 0),
            0,
        );
        for _ in 0..score {
            let head = world.head();
            world.set_food(head.moved_in_direction(Direction::Right));
            assert!(world.step(RelativeAction::Straight).info.ate_food);
        }
        world
    }

    fn corridor_trainer(score: u32) -> Trainer<MemoryStore> {
        let agent = QAgent::new(QLearningConfig::default(), Some(0));
        let runner = BatchRunner::from_worlds(vec![full_corridor(score)]);
        Trainer::from_parts(agent, runner, MemoryStore::new())
    }

    #[test]
    fn test_record_multiple_of_five_checkpoints() {
        let mut trainer = corridor_trainer(5);

        let report = trainer.tick();

        assert_eq!(report.finished.len(), 1);
        assert_eq!(report.finished[0].summary.score, 5);
        assert_eq!(report.new_record, Some(5));
        assert!(report.checkpoint_saved);
        assert_eq!(trainer.store().save_count(), 1);
        assert_eq!(trainer.store().saved().unwrap().episode_count, 1);
    }

    #[test]
    fn test_record_not_multiple_of_five_does_not_checkpoint() {
        let mut trainer = corridor_trainer(3);

        let report = trainer.tick();

        assert_eq!(report.new_record, Some(3));
        assert!(!report.checkpoint_saved);
        assert_eq!(trainer.store().save_count(), 0);
        assert_eq!(trainer.record(), 3);
    }

    #[test]
    fn test_terminal_transition_stores_death_penalty() {
        let mut trainer = corridor_trainer(2);
        let state = trainer.runner().encode_all()[0];

        trainer.tick();

        let row = trainer.agent().table().peek(&state).copied().unwrap();
        assert!(row.contains(&-20.0));
    }
}
