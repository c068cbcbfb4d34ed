use serde::{Deserialize, Serialize};

/// Reward shaping applied by [`GridWorld::step`](super::GridWorld::step)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardSchedule {
    /// Reward for eating food
    pub food: f64,
    /// Penalty for hitting a wall, the body, or starving
    pub death: f64,
    /// Reward for a step that strictly reduced the distance to food
    pub approach: f64,
    /// Penalty for any other non-terminal step
    pub retreat: f64,
}

impl Default for RewardSchedule {
    fn default() -> Self {
        Self {
            food: 20.0,
            death: -20.0,
            approach: 1.0,
            retreat: -2.0,
        }
    }
}

/// Configuration for a single grid world
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Width of the game grid in cells
    pub grid_width: usize,
    /// Height of the game grid in cells
    pub grid_height: usize,
    /// Length of the snake at spawn
    pub initial_snake_length: usize,
    /// An episode ends once frames exceed this factor times the snake length
    pub starvation_factor: u32,
    /// Reward shaping
    pub rewards: RewardSchedule,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 20,
            grid_height: 20,
            initial_snake_length: 3,
            starvation_factor: 100,
            rewards: RewardSchedule::default(),
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10, 10)
    }

    /// Check that a snake can be spawned centered and heading right
    pub fn validate(&self) -> Result<(), String> {
        if self.initial_snake_length == 0 {
            return Err("initial_snake_length must be at least 1".to_string());
        }

        if self.grid_height == 0 {
            return Err("grid_height must be at least 1".to_string());
        }

        // The tail extends to the left of the centered head
        if self.grid_width / 2 + 1 < self.initial_snake_length {
            return Err(format!(
                "grid_width {} is too narrow for a snake of length {}",
                self.grid_width, self.initial_snake_length
            ));
        }

        if self.starvation_factor == 0 {
            return Err("starvation_factor must be at least 1".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.grid_width, 20);
        assert_eq!(config.grid_height, 20);
        assert_eq!(config.initial_snake_length, 3);
        assert_eq!(config.starvation_factor, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_rewards() {
        let rewards = RewardSchedule::default();
        assert_eq!(rewards.food, 20.0);
        assert_eq!(rewards.death, -20.0);
        assert!(rewards.approach > 0.0);
        assert!(rewards.retreat < 0.0);
    }

    #[test]
    fn test_custom_config() {
        let config = GameConfig::new(15, 12);
        assert_eq!(config.grid_width, 15);
        assert_eq!(config.grid_height, 12);
    }

    #[test]
    fn test_validation_rejects_narrow_grid() {
        assert!(GameConfig::new(3, 10).validate().is_err());
        assert!(GameConfig::new(4, 10).validate().is_ok());
        assert!(GameConfig::new(10, 0).validate().is_err());
    }
}
