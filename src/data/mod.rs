pub mod items;
pub mod monsters;

use crate::config::GameConfig;

/// Per-level knobs derived from the level number and the run config.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelRules {
    pub level: u32,
    pub maze_width: i32,
    pub maze_height: i32,
    pub time_limit: f32,
    pub zombie_attempts: usize,
    pub boss_level: bool,
}

impl LevelRules {
    pub fn for_level(level: u32, config: &GameConfig) -> Self {
        // every third level opens up a larger maze
        let (maze_width, maze_height) = if level % 3 == 0 {
            (
                (config.maze_width + 2).min(config.max_maze_width),
                (config.maze_height + 2).min(config.max_maze_height),
            )
        } else {
            (config.maze_width, config.maze_height)
        };
        let time_limit = if level <= 1 {
            config.level_time_secs
        } else {
            (config.level_time_secs - level as f32 * 5.0).max(config.min_level_time_secs)
        };
        Self {
            level,
            maze_width,
            maze_height,
            time_limit,
            zombie_attempts: (3 + level as usize).min(config.max_zombies),
            boss_level: monsters::ZombieTemplate::is_boss_level(level),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_shrinks_to_a_floor() {
        let config = GameConfig::default();
        assert_eq!(LevelRules::for_level(1, &config).time_limit, 120.0);
        assert_eq!(LevelRules::for_level(2, &config).time_limit, 110.0);
        assert_eq!(LevelRules::for_level(30, &config).time_limit, 30.0);
    }

    #[test]
    fn every_third_level_is_larger() {
        let config = GameConfig::default();
        let normal = LevelRules::for_level(2, &config);
        let large = LevelRules::for_level(3, &config);
        assert_eq!(large.maze_width, normal.maze_width + 2);
        assert_eq!(large.maze_height, normal.maze_height + 2);
    }

    #[test]
    fn zombie_count_is_capped() {
        let config = GameConfig::default();
        assert_eq!(LevelRules::for_level(1, &config).zombie_attempts, 4);
        assert_eq!(LevelRules::for_level(50, &config).zombie_attempts, 10);
        assert!(LevelRules::for_level(5, &config).boss_level);
    }
}
