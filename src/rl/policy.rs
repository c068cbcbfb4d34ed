use rand::Rng;

use super::config::QLearningConfig;
use super::encoder::EncodedState;
use super::q_table::QTable;
use crate::game::RelativeAction;

/// Whether the policy is learning or being shown off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyMode {
    /// Decaying exploration
    Training,
    /// Always greedy
    Evaluation,
}

/// Epsilon-greedy action selection with a linear, floored decay
///
/// Epsilon is expressed out of `exploration_range`: a uniform draw in
/// `0..exploration_range` below epsilon triggers a random action.
#[derive(Debug, Clone)]
pub struct EpsilonGreedy {
    start: f64,
    decay: f64,
    floor: f64,
    range: u32,
}

impl EpsilonGreedy {
    pub fn new(config: &QLearningConfig) -> Self {
        Self {
            start: config.epsilon_start,
            decay: config.epsilon_decay,
            floor: config.epsilon_floor,
            range: config.exploration_range,
        }
    }

    /// Exploration rate after `episodes` completed episodes
    pub fn epsilon(&self, episodes: u64, mode: PolicyMode) -> f64 {
        match mode {
            PolicyMode::Training => (self.start - episodes as f64 * self.decay).max(self.floor),
            PolicyMode::Evaluation => 0.0,
        }
    }

    /// Probability of picking a random action
    pub fn exploration_probability(&self, episodes: u64, mode: PolicyMode) -> f64 {
        (self.epsilon(episodes, mode) / self.range as f64).min(1.0)
    }

    /// Pick an action for `state`
    ///
    /// Greedy lookups go through [`QTable::best_action`], so an unseen state
    /// gets its zero row created here.
    pub fn select<R: Rng + ?Sized>(
        &self,
        table: &mut QTable,
        state: EncodedState,
        episodes: u64,
        mode: PolicyMode,
        rng: &mut R,
    ) -> RelativeAction {
        let epsilon = self.epsilon(episodes, mode);
        let draw = rng.gen_range(0..self.range);

        if (draw as f64) < epsilon {
            RelativeAction::ALL[rng.gen_range(0..RelativeAction::ALL.len())]
        } else {
            table.best_action(state)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn policy() -> EpsilonGreedy {
        EpsilonGreedy::new(&QLearningConfig::default())
    }

    #[test]
    fn test_epsilon_decays_linearly() {
        let policy = policy();
        assert_eq!(policy.epsilon(0, PolicyMode::Training), 80.0);
        assert!((policy.epsilon(100, PolicyMode::Training) - 75.0).abs() < 1e-9);
        assert!(policy.epsilon(101, PolicyMode::Training) < policy.epsilon(100, PolicyMode::Training));
    }

    #[test]
    fn test_epsilon_floors_at_one() {
        let policy = policy();
        assert_eq!(policy.epsilon(1580, PolicyMode::Training), 1.0);
        assert_eq!(policy.epsilon(1600, PolicyMode::Training), 1.0);
        assert_eq!(policy.epsilon(1_000_000, PolicyMode::Training), 1.0);
        assert!((policy.exploration_probability(1600, PolicyMode::Training) - 1.0 / 200.0).abs() < 1e-12);
    }

    #[test]
    fn test_evaluation_is_greedy() {
        let policy = policy();
        assert_eq!(policy.epsilon(0, PolicyMode::Evaluation), 0.0);

        let mut table = QTable::new();
        let state = EncodedState::new([false; 11]);
        *table.get(state) = [0.0, 0.0, 5.0];

        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..500 {
            let action = policy.select(&mut table, state, 0, PolicyMode::Evaluation, &mut rng);
            assert_eq!(action, RelativeAction::TurnLeft);
        }
    }

    #[test]
    fn test_early_training_explores() {
        let policy = policy();
        let mut table = QTable::new();
        let state = EncodedState::new([false; 11]);
        *table.get(state) = [5.0, 0.0, 0.0];

        let mut rng = StdRng::seed_from_u64(42);
        let non_greedy = (0..2000)
            .map(|_| policy.select(&mut table, state, 0, PolicyMode::Training, &mut rng))
            .filter(|&action| action != RelativeAction::Straight)
            .count();

        // P(explore) = 0.4 and two of three random picks are non-greedy
        assert!(non_greedy > 350 && non_greedy < 700, "got {non_greedy}");
    }

    #[test]
    fn test_greedy_lookup_creates_row() {
        let policy = policy();
        let mut table = QTable::new();
        let state = EncodedState::new([true; 11]);
        let mut rng = StdRng::seed_from_u64(1);

        policy.select(&mut table, state, 0, PolicyMode::Evaluation, &mut rng);
        assert!(table.contains(&state));
    }
}
