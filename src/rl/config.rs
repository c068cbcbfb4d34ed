//! Q-learning hyperparameter configuration

use serde::{Deserialize, Serialize};

/// Configuration for the tabular Q-learning agent
///
/// # Example
///
/// ```rust
/// use snake_qtable::rl::QLearningConfig;
///
/// let config = QLearningConfig {
///     gamma: 0.9,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QLearningConfig {
    /// Step size of the value update
    ///
    /// Default: 0.001
    pub learning_rate: f64,

    /// Discount factor for the bootstrapped next-state value
    ///
    /// Default: 0.95
    pub gamma: f64,

    /// Exploration rate before any episode has completed, out of `exploration_range`
    ///
    /// Default: 80
    pub epsilon_start: f64,

    /// Exploration rate lost per completed episode
    ///
    /// Default: 0.05
    pub epsilon_decay: f64,

    /// Lowest exploration rate reached during training
    ///
    /// Default: 1
    pub epsilon_floor: f64,

    /// Size of the uniform draw compared against epsilon
    ///
    /// The chance of a random action is `epsilon / exploration_range`.
    ///
    /// Default: 200
    pub exploration_range: u32,
}

impl QLearningConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration parameters
    ///
    /// # Returns
    ///
    /// `Ok(())` if all parameters are valid, `Err(String)` with an error message otherwise.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(format!(
                "learning_rate must be in (0, 1], got {}",
                self.learning_rate
            ));
        }

        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(format!("gamma must be in [0, 1], got {}", self.gamma));
        }

        if self.epsilon_decay < 0.0 {
            return Err(format!(
                "epsilon_decay must be non-negative, got {}",
                self.epsilon_decay
            ));
        }

        if self.epsilon_floor < 0.0 || self.epsilon_floor > self.epsilon_start {
            return Err(format!(
                "epsilon_floor must be in [0, epsilon_start], got {}",
                self.epsilon_floor
            ));
        }

        if self.exploration_range == 0 {
            return Err("exploration_range must be at least 1".to_string());
        }

        Ok(())
    }
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.001,
            gamma: 0.95,
            epsilon_start: 80.0,
            epsilon_decay: 0.05,
            epsilon_floor: 1.0,
            exploration_range: 200,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = QLearningConfig::default();
        assert_eq!(config.learning_rate, 0.001);
        assert_eq!(config.gamma, 0.95);
        assert_eq!(config.epsilon_start, 80.0);
        assert_eq!(config.epsilon_decay, 0.05);
        assert_eq!(config.epsilon_floor, 1.0);
        assert_eq!(config.exploration_range, 200);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_learning_rate() {
        let mut config = QLearningConfig::default();
        config.learning_rate = 0.0;
        assert!(config.validate().is_err());

        config.learning_rate = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_gamma_out_of_range() {
        let mut config = QLearningConfig::default();
        config.gamma = 1.5;
        assert!(config.validate().is_err());

        config.gamma = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_epsilon_schedule() {
        let mut config = QLearningConfig::default();
        config.epsilon_decay = -1.0;
        assert!(config.validate().is_err());

        let mut config = QLearningConfig::default();
        config.epsilon_floor = 90.0;
        assert!(config.validate().is_err());

        let mut config = QLearningConfig::default();
        config.exploration_range = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = QLearningConfig {
            gamma: 0.9,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: QLearningConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.gamma, 0.9);
        assert_eq!(back.exploration_range, 200);
    }
}
