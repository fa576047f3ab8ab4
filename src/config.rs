use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{data::items::DEFAULT_INVENTORY_CAPACITY, error::GameError, fog::VISION_RADIUS};

const MAX_MAZE_SIDE: i32 = 255;
const MAX_VISION_RADIUS: f32 = 64.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    pub dice_min: i32,
    pub dice_max: i32,
    pub defend_bonus: i32,
    pub log_capacity: usize,
    /// Player turns the special skill stays locked after use.
    pub special_cooldown: u32,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            dice_min: 1,
            dice_max: 6,
            defend_bonus: 5,
            log_capacity: 8,
            special_cooldown: 2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub seed: Option<u64>,
    pub maze_width: i32,
    pub maze_height: i32,
    pub max_maze_width: i32,
    pub max_maze_height: i32,
    pub vision_radius: f32,
    pub level_time_secs: f32,
    pub min_level_time_secs: f32,
    pub zombie_move_interval: f32,
    pub max_zombies: usize,
    pub player_max_hp: i32,
    pub player_base_attack: i32,
    pub player_starting_gold: i32,
    pub inventory_capacity: usize,
    pub battle: BattleConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: None,
            maze_width: 21,
            maze_height: 15,
            max_maze_width: 31,
            max_maze_height: 21,
            vision_radius: VISION_RADIUS,
            level_time_secs: 120.0,
            min_level_time_secs: 30.0,
            zombie_move_interval: 0.5,
            max_zombies: 10,
            player_max_hp: 100,
            player_base_attack: 10,
            player_starting_gold: 50,
            inventory_capacity: DEFAULT_INVENTORY_CAPACITY,
            battle: BattleConfig::default(),
        }
    }
}

impl GameConfig {
    pub fn load(path: &Path) -> Result<Self, GameError> {
        let raw = fs::read_to_string(path).map_err(|err| GameError::io(path, err))?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GameError> {
        let invalid = |msg: String| Err(GameError::InvalidConfig(msg));
        if self.maze_width < 3 || self.maze_height < 3 {
            return invalid(format!(
                "maze must be at least 3x3, got {}x{}",
                self.maze_width, self.maze_height
            ));
        }
        if self.max_maze_width < self.maze_width || self.max_maze_height < self.maze_height {
            return invalid("max maze size is smaller than the base size".to_string());
        }
        if self.max_maze_width > MAX_MAZE_SIDE || self.max_maze_height > MAX_MAZE_SIDE {
            return invalid(format!("maze sides are limited to {MAX_MAZE_SIDE}"));
        }
        if self.vision_radius <= 0.0 || self.vision_radius > MAX_VISION_RADIUS {
            return invalid(format!(
                "vision radius must be in (0, {MAX_VISION_RADIUS}], got {}",
                self.vision_radius
            ));
        }
        if self.zombie_move_interval <= 0.0 {
            return invalid("zombie move interval must be positive".to_string());
        }
        if self.level_time_secs <= 0.0 || self.min_level_time_secs > self.level_time_secs {
            return invalid("level timer bounds are inconsistent".to_string());
        }
        if self.player_max_hp <= 0 || self.inventory_capacity == 0 {
            return invalid("player needs hp and inventory space".to_string());
        }
        if self.battle.dice_min > self.battle.dice_max || self.battle.dice_min < 0 {
            return invalid(format!(
                "empty dice range {}..={}",
                self.battle.dice_min, self.battle.dice_max
            ));
        }
        if self.battle.log_capacity == 0 {
            return invalid("battle log capacity must be non-zero".to_string());
        }
        Ok(())
    }
}
