use bracket_geometry::prelude::Point;
use specs::prelude::Entity;

use crate::map::Grid;

/// Read-only view of the current level shared by the movement, chase and
/// fog systems. Replaced wholesale when a new level loads.
#[derive(Clone)]
pub struct MazeContext {
    pub grid: Grid,
}

impl MazeContext {
    pub fn new(grid: Grid) -> Self {
        Self { grid }
    }

    pub fn is_walkable(&self, point: Point) -> bool {
        self.grid.is_walkable(point)
    }
}

/// Seconds elapsed since the previous dispatch.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeltaTime(pub f32);

/// The first enemy found sharing the player's tile, waiting for the session
/// to turn it into a battle.
#[derive(Clone, Copy, Debug, Default)]
pub struct Encounter {
    pub enemy: Option<Entity>,
}
