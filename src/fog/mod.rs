//! Fog of war: what the player sees now and what they have seen before.
//!
//! Sight is an approximate segment test, not shadow casting. The segment from
//! the viewer to a tile is sampled once per unit of its longer axis and each
//! sample is truncated to a cell. The first wall sample ends the test, and it
//! only counts as seen when it is the last sample, so wall faces show up but
//! nothing behind them does. Corners that a true raycast would hide can leak
//! through at shallow angles; that is accepted.

use bracket_geometry::prelude::Point;

use crate::map::{Cell, Grid};

pub const VISION_RADIUS: f32 = 5.0;

#[derive(Clone, Debug)]
pub struct VisibilityField {
    width: i32,
    height: i32,
    radius: f32,
    explored: Vec<bool>,
    visible: Vec<bool>,
}

impl VisibilityField {
    pub fn new(width: i32, height: i32) -> Self {
        Self::with_radius(width, height, VISION_RADIUS)
    }

    pub fn with_radius(width: i32, height: i32, radius: f32) -> Self {
        let size = (width.max(0) * height.max(0)) as usize;
        Self {
            width,
            height,
            radius,
            explored: vec![false; size],
            visible: vec![false; size],
        }
    }

    /// Reallocates for a new level; everything is forgotten.
    pub fn reset(&mut self, width: i32, height: i32) {
        *self = Self::with_radius(width, height, self.radius);
    }

    pub fn dimensions(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    fn idx(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && x < self.width && y >= 0 && y < self.height {
            Some((y * self.width + x) as usize)
        } else {
            None
        }
    }

    pub fn is_visible(&self, x: i32, y: i32) -> bool {
        self.idx(x, y).map_or(false, |idx| self.visible[idx])
    }

    pub fn is_explored(&self, x: i32, y: i32) -> bool {
        self.idx(x, y).map_or(false, |idx| self.explored[idx])
    }

    /// Entities are drawn only inside current sight, never from memory.
    pub fn should_show_entity(&self, x: i32, y: i32) -> bool {
        self.is_visible(x, y)
    }

    pub fn visible_count(&self) -> usize {
        self.visible.iter().filter(|seen| **seen).count()
    }

    pub fn explored_count(&self) -> usize {
        self.explored.iter().filter(|seen| **seen).count()
    }

    pub fn update_from(&mut self, origin: Point, grid: &Grid) {
        self.update(origin.x as f32, origin.y as f32, grid);
    }

    pub fn update(&mut self, origin_x: f32, origin_y: f32, grid: &Grid) {
        if (grid.width(), grid.height()) != (self.width, self.height) {
            log::warn!(
                "Visibility {}x{} out of step with grid {}x{}; resetting",
                self.width,
                self.height,
                grid.width(),
                grid.height()
            );
            self.reset(grid.width(), grid.height());
        }

        self.visible.iter_mut().for_each(|seen| *seen = false);

        // nothing past the grid edge matters, however large the radius
        let reach = self.radius.min(self.width.max(self.height) as f32) as i32;
        let tile_x = origin_x as i32;
        let tile_y = origin_y as i32;
        let min_x = (tile_x - reach).max(0);
        let max_x = (tile_x + reach + 1).min(self.width);
        let min_y = (tile_y - reach).max(0);
        let max_y = (tile_y + reach + 1).min(self.height);

        for y in min_y..max_y {
            for x in min_x..max_x {
                let dx = x as f32 - origin_x;
                let dy = y as f32 - origin_y;
                if (dx * dx + dy * dy).sqrt() > self.radius {
                    continue;
                }
                if !has_line_of_sight(origin_x, origin_y, x as f32, y as f32, grid) {
                    continue;
                }
                if let Some(idx) = self.idx(x, y) {
                    self.visible[idx] = true;
                    self.explored[idx] = true;
                }
            }
        }
    }
}

pub fn has_line_of_sight(x1: f32, y1: f32, x2: f32, y2: f32, grid: &Grid) -> bool {
    let dx = x2 - x1;
    let dy = y2 - y1;
    let steps = dx.abs().max(dy.abs());
    if steps == 0.0 {
        return true;
    }
    let x_step = dx / steps;
    let y_step = dy / steps;

    for i in 0..=(steps as i32) {
        let check_x = (x1 + x_step * i as f32) as i32;
        let check_y = (y1 + y_step * i as f32) as i32;
        if !grid.in_bounds(Point::new(check_x, check_y)) {
            return false;
        }
        if grid.cell(check_x, check_y) == Cell::Wall {
            return i as f32 == steps;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::maze;
    use bracket_random::prelude::RandomNumberGenerator;
    use proptest::prelude::*;

    fn open_room(width: i32, height: i32) -> Grid {
        let mut grid = Grid::filled(width, height);
        for y in 1..height - 1 {
            for x in 1..width - 1 {
                grid.set_cell(Point::new(x, y), Cell::Floor);
            }
        }
        grid
    }

    #[test]
    fn out_of_bounds_queries_are_false() {
        let field = VisibilityField::new(5, 5);
        assert!(!field.is_visible(-1, 0));
        assert!(!field.is_explored(0, 9));
        assert!(!field.should_show_entity(7, 7));
    }

    #[test]
    fn walls_block_what_lies_behind_them() {
        let mut grid = open_room(15, 5);
        grid.set_cell(Point::new(4, 2), Cell::Wall);
        let mut field = VisibilityField::new(15, 5);
        field.update_from(Point::new(2, 2), &grid);
        assert!(field.is_visible(3, 2));
        assert!(field.is_visible(4, 2), "the wall face itself is seen");
        assert!(!field.is_visible(5, 2));
        assert!(!field.is_visible(6, 2));
    }

    #[test]
    fn radius_boundary_is_inclusive() {
        let grid = open_room(21, 21);
        let mut field = VisibilityField::new(21, 21);
        field.update_from(Point::new(10, 10), &grid);
        // exactly R away along an open axis
        assert!(field.is_visible(15, 10));
        assert!(field.is_visible(10, 5));
        // (3,4) triangle: distance exactly 5
        assert!(field.is_visible(13, 14));
        // just beyond R
        assert!(!field.is_visible(14, 14));
        assert!(!field.is_visible(16, 10));
    }

    #[test]
    fn blocked_sight_at_exactly_r_stays_hidden() {
        let mut grid = open_room(21, 21);
        grid.set_cell(Point::new(12, 10), Cell::Wall);
        let mut field = VisibilityField::new(21, 21);
        field.update_from(Point::new(10, 10), &grid);
        assert!(field.is_visible(12, 10), "the blocking wall itself is seen");
        assert!(!field.is_visible(15, 10));
        assert!(!field.is_explored(15, 10));
    }

    #[test]
    fn wall_face_at_exactly_r_is_visible() {
        let mut grid = open_room(21, 21);
        grid.set_cell(Point::new(10, 15), Cell::Wall);
        let mut field = VisibilityField::new(21, 21);
        field.update_from(Point::new(10, 10), &grid);
        assert!(field.is_visible(10, 15));
        assert!(!field.is_visible(10, 16));
    }

    #[test]
    fn huge_radius_is_bounded_by_the_grid() {
        let grid = open_room(9, 9);
        let mut field = VisibilityField::with_radius(9, 9, 1.0e12);
        field.update_from(Point::new(1, 1), &grid);
        for y in 1..8 {
            for x in 1..8 {
                assert!(field.is_visible(x, y), "{x},{y}");
            }
        }
    }

    #[test]
    fn fractional_origin_shifts_the_boundary() {
        let grid = open_room(21, 21);
        let mut field = VisibilityField::new(21, 21);
        field.update(10.5, 10.0, &grid);
        assert!(field.is_visible(15, 10));
        assert!(!field.is_visible(5, 10), "5.5 tiles away");
    }

    #[test]
    fn explored_survives_moving_away() {
        let grid = open_room(30, 5);
        let mut field = VisibilityField::new(30, 5);
        field.update_from(Point::new(2, 2), &grid);
        assert!(field.is_visible(5, 2));
        field.update_from(Point::new(25, 2), &grid);
        assert!(!field.is_visible(5, 2));
        assert!(field.is_explored(5, 2));
    }

    #[test]
    fn reset_matches_new_dimensions_and_forgets() {
        let grid = open_room(9, 9);
        let mut field = VisibilityField::new(9, 9);
        field.update_from(Point::new(4, 4), &grid);
        assert!(field.explored_count() > 0);
        field.reset(13, 11);
        assert_eq!(field.dimensions(), (13, 11));
        assert_eq!(field.explored_count(), 0);
        assert_eq!(field.visible_count(), 0);
    }

    #[test]
    fn mismatched_grid_triggers_a_reset() {
        let grid = open_room(11, 11);
        let mut field = VisibilityField::new(5, 5);
        field.update_from(Point::new(5, 5), &grid);
        assert_eq!(field.dimensions(), (11, 11));
        assert!(field.is_visible(5, 5));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn explored_only_grows_and_covers_visible(
            seed in any::<u64>(),
            walk in proptest::collection::vec(0usize..4, 1..40),
        ) {
            let mut rng = RandomNumberGenerator::seeded(seed);
            let grid = maze::generate(21, 15, &mut rng);
            let mut field = VisibilityField::new(21, 15);
            let mut at = Point::new(1, 1);
            let dirs = [Point::new(0, -1), Point::new(1, 0), Point::new(0, 1), Point::new(-1, 0)];
            let mut before = vec![false; 21 * 15];
            for step in walk {
                let next = at + dirs[step];
                if grid.is_walkable(next) {
                    at = next;
                }
                field.update_from(at, &grid);
                for y in 0..15 {
                    for x in 0..21 {
                        let idx = (y * 21 + x) as usize;
                        prop_assert!(!before[idx] || field.is_explored(x, y));
                        prop_assert!(!field.is_visible(x, y) || field.is_explored(x, y));
                        let dx = (x - at.x) as f32;
                        let dy = (y - at.y) as f32;
                        if (dx * dx + dy * dy).sqrt() > VISION_RADIUS {
                            prop_assert!(!field.is_visible(x, y));
                        }
                        before[idx] = field.is_explored(x, y);
                    }
                }
            }
        }
    }
}
