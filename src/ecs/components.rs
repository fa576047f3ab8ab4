use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use bracket_terminal::prelude::RGB;
use specs::prelude::{Component, NullStorage, VecStorage};

use crate::{
    ai::ChaseAgent,
    data::items::{Inventory, Item, random_item, zombie_loot},
};

#[derive(Clone, Debug)]
pub struct Position {
    pub point: Point,
}

impl Component for Position {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct Renderable {
    pub glyph: u16,
    pub color: RGB,
    pub order: i32,
}

impl Component for Renderable {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct IntentStep {
    pub delta: Point,
}

impl Default for IntentStep {
    fn default() -> Self {
        Self {
            delta: Point::new(0, 0),
        }
    }
}

impl Component for IntentStep {
    type Storage = VecStorage<Self>;
}

#[derive(Default)]
pub struct PlayerTag;

impl Component for PlayerTag {
    type Storage = NullStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub name: String,
    pub boss: bool,
    can_drop_loot: bool,
}

impl Enemy {
    pub fn new(name: impl Into<String>, boss: bool) -> Self {
        Self {
            name: name.into(),
            boss,
            can_drop_loot: true,
        }
    }

    /// Rolls the loot table on the first call only. Bosses always drop.
    pub fn drop_loot(&mut self, rng: &mut RandomNumberGenerator) -> Option<Item> {
        if !self.can_drop_loot {
            return None;
        }
        self.can_drop_loot = false;
        if self.boss {
            Some(random_item(rng))
        } else {
            zombie_loot(rng)
        }
    }
}

impl Component for Enemy {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct CombatStats {
    pub max_hp: i32,
    pub hp: i32,
    pub power: i32,
    pub defense: i32,
}

impl Component for CombatStats {
    type Storage = VecStorage<Self>;
}

impl Component for ChaseAgent {
    type Storage = VecStorage<Self>;
}

impl Component for Inventory {
    type Storage = VecStorage<Self>;
}
