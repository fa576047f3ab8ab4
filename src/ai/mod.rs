use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;

use crate::map::Grid;

const CARDINALS: [Point; 4] = [
    Point { x: 0, y: 1 },
    Point { x: 0, y: -1 },
    Point { x: 1, y: 0 },
    Point { x: -1, y: 0 },
];

/// Greedy pursuer that takes at most one grid step per cooldown period.
///
/// The heuristic closes the larger gap first and falls back to a random
/// shuffle of the four directions. It is not a path search, so it can stall
/// or pace back and forth in dead ends.
#[derive(Clone, Debug)]
pub struct ChaseAgent {
    pub position: Point,
    interval: f32,
    timer: f32,
}

impl ChaseAgent {
    pub fn new(position: Point, interval: f32) -> Self {
        Self {
            position,
            interval,
            timer: 0.0,
        }
    }

    /// Returns true when the agent moved. Leftover time is dropped, so a long
    /// frame can never buy more than one step.
    pub fn update(
        &mut self,
        target: Point,
        grid: &Grid,
        dt: f32,
        rng: &mut RandomNumberGenerator,
    ) -> bool {
        self.timer += dt;
        if self.timer < self.interval {
            return false;
        }
        self.timer = 0.0;
        match self.choose_step(target, grid, rng) {
            Some(step) => {
                self.position = self.position + step;
                true
            }
            None => false,
        }
    }

    fn choose_step(
        &self,
        target: Point,
        grid: &Grid,
        rng: &mut RandomNumberGenerator,
    ) -> Option<Point> {
        let preferred = preferred_steps(self.position, target);
        if let Some(step) = preferred.into_iter().find(|step| self.can_take(*step, grid)) {
            return Some(step);
        }
        let mut fallback = CARDINALS;
        shuffle(&mut fallback, rng);
        fallback.into_iter().find(|step| self.can_take(*step, grid))
    }

    fn can_take(&self, step: Point, grid: &Grid) -> bool {
        grid.is_walkable(self.position + step)
    }
}

/// Larger gap first; a tie goes to the vertical axis. A zero delta still
/// yields a unit step (towards negative) so the list always has two entries.
fn preferred_steps(from: Point, to: Point) -> [Point; 2] {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let horizontal = Point::new(if dx > 0 { 1 } else { -1 }, 0);
    let vertical = Point::new(0, if dy > 0 { 1 } else { -1 });
    if dx.abs() > dy.abs() {
        [horizontal, vertical]
    } else {
        [vertical, horizontal]
    }
}

fn shuffle<T>(items: &mut [T], rng: &mut RandomNumberGenerator) {
    for i in (1..items.len()).rev() {
        let j = rng.range(0, i + 1);
        items.swap(i, j);
    }
}
