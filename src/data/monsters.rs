use bracket_terminal::prelude::RGB;

pub const ZOMBIE_BASE_HP: i32 = 30;
pub const ZOMBIE_BASE_ATTACK: i32 = 8;
pub const ZOMBIE_BASE_SPEED: f32 = 0.8;
pub const ZOMBIE_MAX_SPEED: f32 = 2.0;
pub const BOSS_HP: i32 = 80;
pub const BOSS_LEVEL_INTERVAL: u32 = 5;

#[derive(Clone, Debug)]
pub struct ZombieTemplate {
    pub name: String,
    pub glyph: char,
    pub color: RGB,
    pub hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub speed: f32,
    pub boss: bool,
}

impl ZombieTemplate {
    pub fn for_level(level: u32, boss: bool) -> Self {
        let lvl = level as i32;
        let speed = (ZOMBIE_BASE_SPEED + level as f32 * 0.1).min(ZOMBIE_MAX_SPEED);
        let defense = (lvl - 1).max(0);
        if boss {
            let tier = (level / BOSS_LEVEL_INTERVAL) as i32;
            Self {
                name: format!("Boss Zombie (Lv.{level})"),
                glyph: 'Z',
                color: RGB::from_u8(200, 40, 200),
                hp: BOSS_HP + tier * 20,
                attack: ZOMBIE_BASE_ATTACK + tier * 2,
                defense,
                speed,
                boss,
            }
        } else {
            Self {
                name: format!("Zombie (Lv.{level})"),
                glyph: 'z',
                color: RGB::from_u8(255, 60, 60),
                hp: ZOMBIE_BASE_HP + lvl * 2,
                attack: ZOMBIE_BASE_ATTACK + lvl / 2,
                defense,
                speed,
                boss,
            }
        }
    }

    pub fn is_boss_level(level: u32) -> bool {
        level > 0 && level % BOSS_LEVEL_INTERVAL == 0
    }

    /// Seconds between chase steps; faster zombies step more often.
    pub fn move_interval(&self, base_interval: f32) -> f32 {
        base_interval * ZOMBIE_BASE_SPEED / self.speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_zombies_scale_with_level() {
        let first = ZombieTemplate::for_level(1, false);
        assert_eq!((first.hp, first.attack, first.defense), (32, 8, 0));
        let fourth = ZombieTemplate::for_level(4, false);
        assert_eq!((fourth.hp, fourth.attack, fourth.defense), (38, 10, 3));
        assert!(fourth.speed > first.speed);
    }

    #[test]
    fn bosses_arrive_every_fifth_level() {
        assert!(!ZombieTemplate::is_boss_level(4));
        assert!(ZombieTemplate::is_boss_level(5));
        assert!(ZombieTemplate::is_boss_level(10));
        let boss = ZombieTemplate::for_level(10, true);
        assert_eq!((boss.hp, boss.attack), (120, 12));
        assert!(boss.name.starts_with("Boss"));
    }

    #[test]
    fn speed_is_capped() {
        let late = ZombieTemplate::for_level(40, false);
        assert_eq!(late.speed, ZOMBIE_MAX_SPEED);
        assert!((late.move_interval(0.5) - 0.2).abs() < 1e-6);
    }
}
