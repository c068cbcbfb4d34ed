use super::encoder::{encode, EncodedState};
use crate::game::{GameConfig, GridWorld, RelativeAction};

/// Totals for an episode that just ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeSummary {
    pub score: u32,
    pub total_reward: f64,
    pub steps: usize,
}

/// Outcome of stepping one environment
#[derive(Debug, Clone, PartialEq)]
pub struct EnvStep {
    pub reward: f64,
    pub done: bool,
    pub score: u32,
    /// Set when `done`; the environment has already been reset
    pub episode: Option<EpisodeSummary>,
}

/// A fixed set of independent grid worlds stepped in lockstep
///
/// Environments share no state. Each one resets on its own as soon as its
/// episode ends, so episodes are not aligned across the batch.
pub struct BatchRunner {
    worlds: Vec<GridWorld>,
    episodes: Vec<u64>,
    last_scores: Vec<u32>,
    high_scores: Vec<u32>,
    episode_rewards: Vec<f64>,
    episode_steps: Vec<usize>,
}

impl BatchRunner {
    /// Create `num_envs` worlds
    ///
    /// With a base seed, environment `i` is seeded with `base_seed + i`.
    pub fn new(config: &GameConfig, num_envs: usize, base_seed: Option<u64>) -> Self {
        let worlds = (0..num_envs)
            .map(|i| match base_seed {
                Some(seed) => GridWorld::with_seed(config.clone(), seed.wrapping_add(i as u64)),
                None => GridWorld::new(config.clone()),
            })
            .collect();

        Self::from_worlds(worlds)
    }

    pub fn from_worlds(worlds: Vec<GridWorld>) -> Self {
        let n = worlds.len();
        Self {
            worlds,
            episodes: vec![0; n],
            last_scores: vec![0; n],
            high_scores: vec![0; n],
            episode_rewards: vec![0.0; n],
            episode_steps: vec![0; n],
        }
    }

    /// Encode every environment's current observation
    pub fn encode_all(&self) -> Vec<EncodedState> {
        self.worlds.iter().map(encode).collect()
    }

    /// Step environment `i` with `actions[i]`, in order
    ///
    /// # Panics
    ///
    /// Panics if `actions` does not hold exactly one action per environment.
    pub fn step_all(&mut self, actions: &[RelativeAction]) -> Vec<EnvStep> {
        assert_eq!(
            actions.len(),
            self.worlds.len(),
            "one action per environment"
        );

        actions
            .iter()
            .enumerate()
            .map(|(i, &action)| self.step_env(i, action))
            .collect()
    }

    fn step_env(&mut self, i: usize, action: RelativeAction) -> EnvStep {
        let result = self.worlds[i].step(action);

        self.episode_rewards[i] += result.reward;
        self.episode_steps[i] += 1;
        if result.score > self.high_scores[i] {
            self.high_scores[i] = result.score;
        }

        let episode = result.done.then(|| {
            let summary = EpisodeSummary {
                score: result.score,
                total_reward: self.episode_rewards[i],
                steps: self.episode_steps[i],
            };

            self.worlds[i].reset();
            self.episodes[i] += 1;
            self.last_scores[i] = result.score;
            self.episode_rewards[i] = 0.0;
            self.episode_steps[i] = 0;
            summary
        });

        EnvStep {
            reward: result.reward,
            done: result.done,
            score: result.score,
            episode,
        }
    }

    pub fn len(&self) -> usize {
        self.worlds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.worlds.is_empty()
    }

    pub fn worlds(&self) -> &[GridWorld] {
        &self.worlds
    }

    /// Completed episodes per environment
    pub fn episodes(&self) -> &[u64] {
        &self.episodes
    }

    /// Final score of the previous episode per environment
    pub fn last_scores(&self) -> &[u32] {
        &self.last_scores
    }

    /// Best score seen per environment
    pub fn high_scores(&self) -> &[u32] {
        &self.high_scores
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Position;

    #[test]
    fn test_creation() {
        let runner = BatchRunner::new(&GameConfig::small(), 4, Some(10));
        assert_eq!(runner.len(), 4);
        assert_eq!(runner.encode_all().len(), 4);
        assert!(runner.episodes().iter().all(|&e| e == 0));
    }

    #[test]
    fn test_seeded_batches_match() {
        let a = BatchRunner::new(&GameConfig::default(), 3, Some(5));
        let b = BatchRunner::new(&GameConfig::default(), 3, Some(5));
        let foods_a: Vec<Position> = a.worlds().iter().map(|w| w.food()).collect();
        let foods_b: Vec<Position> = b.worlds().iter().map(|w| w.food()).collect();
        assert_eq!(foods_a, foods_b);
    }

    #[test]
    fn test_finished_environment_resets_alone() {
        let mut runner = BatchRunner::new(&GameConfig::small(), 2, Some(1));
        // Env 0 drives straight into the right wall, env 1 circles in place
        for world in runner.worlds.iter_mut() {
            world.set_food(Position::new(0, 0));
        }
        let mut ended = None;
        for tick in 0..10 {
            let steps = runner.step_all(&[RelativeAction::Straight, RelativeAction::TurnRight]);
            assert!(!steps[1].done);
            if steps[0].done {
                ended = Some((tick, steps[0].clone()));
                break;
            }
        }

        let (tick, step) = ended.expect("env 0 should hit the wall");
        assert_eq!(tick, 4);
        assert_eq!(step.reward, -20.0);
        let summary = step.episode.expect("summary on done");
        assert_eq!(summary.steps, 5);

        assert_eq!(runner.episodes(), &[1, 0]);
        assert_eq!(runner.worlds()[0].head(), Position::new(5, 5));
        assert!(!runner.worlds()[0].is_finished());
        assert_eq!(runner.worlds()[1].frame_count(), 5);
    }

    #[test]
    fn test_high_score_tracking() {
        let mut runner = BatchRunner::new(&GameConfig::default(), 1, Some(3));
        let head = runner.worlds()[0].head();
        runner.worlds[0].set_food(head.moved_by(1, 0));

        let steps = runner.step_all(&[RelativeAction::Straight]);

        assert_eq!(steps[0].score, 1);
        assert_eq!(runner.high_scores(), &[1]);
    }

    #[test]
    #[should_panic(expected = "one action per environment")]
    fn test_action_count_mismatch() {
        let mut runner = BatchRunner::new(&GameConfig::small(), 2, Some(0));
        runner.step_all(&[RelativeAction::Straight]);
    }
}
