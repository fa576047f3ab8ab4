use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;

use crate::data::items::{Item, chest_contents};

#[derive(Clone, Debug)]
pub struct Chest {
    pub point: Point,
    contents: Vec<Item>,
    opened: bool,
}

impl Chest {
    pub fn new(point: Point, rng: &mut RandomNumberGenerator) -> Self {
        Self::with_contents(point, chest_contents(rng))
    }

    pub fn with_contents(point: Point, contents: Vec<Item>) -> Self {
        Self {
            point,
            contents,
            opened: false,
        }
    }

    /// Hands out the contents the first time only; an opened chest is empty.
    pub fn open(&mut self) -> Vec<Item> {
        if self.opened {
            return Vec::new();
        }
        self.opened = true;
        self.contents.clone()
    }

    pub fn is_open(&self) -> bool {
        self.opened
    }
}

/// An item lying on the floor, left by a zombie or an overfull chest.
#[derive(Clone, Debug)]
pub struct LootDrop {
    pub point: Point,
    pub item: Item,
}

impl LootDrop {
    pub fn new(point: Point, item: Item) -> Self {
        Self { point, item }
    }
}
