//! Tabular Q-learning agent
//!
//! Owns the Q-table, the exploration policy and the count of completed
//! episodes that drives exploration decay.

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::config::QLearningConfig;
use super::encoder::EncodedState;
use super::persistence::TableSnapshot;
use super::policy::{EpsilonGreedy, PolicyMode};
use super::q_table::QTable;
use crate::game::RelativeAction;

/// One environment step, consumed once by [`QAgent::train_step`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub state: EncodedState,
    pub action: RelativeAction,
    pub reward: f64,
    pub next_state: EncodedState,
    pub done: bool,
}

pub struct QAgent {
    table: QTable,
    config: QLearningConfig,
    policy: EpsilonGreedy,
    episodes_completed: u64,
    rng: StdRng,
}

impl QAgent {
    /// Create an agent with an empty table
    ///
    /// # Panics
    ///
    /// Panics if `config` fails validation.
    pub fn new(config: QLearningConfig, seed: Option<u64>) -> Self {
        if let Err(reason) = config.validate() {
            panic!("Invalid Q-learning configuration: {reason}");
        }

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            table: QTable::new(),
            policy: EpsilonGreedy::new(&config),
            config,
            episodes_completed: 0,
            rng,
        }
    }

    /// Pick an action for `state` using the epsilon-greedy policy
    pub fn select_action(&mut self, state: EncodedState, mode: PolicyMode) -> RelativeAction {
        self.policy.select(
            &mut self.table,
            state,
            self.episodes_completed,
            mode,
            &mut self.rng,
        )
    }

    /// Apply one online update for `transition`
    ///
    /// Terminal transitions store the reward directly. Otherwise the stored
    /// value becomes `cur + lr * (reward + gamma * max_next - cur)`.
    /// Returns the new value.
    pub fn train_step(&mut self, transition: &Transition) -> f64 {
        let idx = transition.action.index();
        let current = self.table.get(transition.state)[idx];

        let target = if transition.done {
            transition.reward
        } else {
            let max_next = self.table.max_value(transition.next_state);
            current
                + self.config.learning_rate
                    * (transition.reward + self.config.gamma * max_next - current)
        };

        self.table.get(transition.state)[idx] = target;
        target
    }

    /// Count a finished episode towards exploration decay
    pub fn complete_episode(&mut self) {
        self.episodes_completed += 1;
    }

    pub fn epsilon(&self, mode: PolicyMode) -> f64 {
        self.policy.epsilon(self.episodes_completed, mode)
    }

    pub fn episodes_completed(&self) -> u64 {
        self.episodes_completed
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut QTable {
        &mut self.table
    }

    pub fn config(&self) -> &QLearningConfig {
        &self.config
    }

    /// Capture the table and episode count for persistence
    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot::from_table(&self.table, self.episodes_completed)
    }

    /// Replace the table and episode count with saved ones
    pub fn restore(&mut self, snapshot: TableSnapshot) {
        self.episodes_completed = snapshot.episode_count;
        self.table = snapshot.into_table();
    }
}
