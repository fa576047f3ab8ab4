//! Recursive-backtracking maze carving and chest placement.
//!
//! Passages are carved on the odd-coordinate lattice with a step of two, so
//! every lattice cell becomes a node of a spanning tree rooted at the start
//! cell and the walls between nodes sit on even coordinates. The outer ring
//! is never carved.

use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;

use super::{Cell, Grid, START_POINT, chest::Chest};

pub const MIN_DIMENSION: i32 = 3;
const CHEST_ATTEMPTS: usize = 100;
const CHEST_SPACING: i32 = 3;

const LATTICE_STEPS: [Point; 4] = [
    Point { x: 0, y: -2 },
    Point { x: 2, y: 0 },
    Point { x: 0, y: 2 },
    Point { x: -2, y: 0 },
];

pub fn generate(width: i32, height: i32, rng: &mut RandomNumberGenerator) -> Grid {
    if width < MIN_DIMENSION || height < MIN_DIMENSION {
        log::warn!("Maze {width}x{height} is below the {MIN_DIMENSION}x{MIN_DIMENSION} minimum; clamping");
    }
    let width = width.max(MIN_DIMENSION);
    let height = height.max(MIN_DIMENSION);

    let mut grid = Grid::filled(width, height);
    grid.set_cell(START_POINT, Cell::Floor);
    let mut stack = vec![START_POINT];

    while let Some(&current) = stack.last() {
        let neighbors = unvisited_neighbors(&grid, current);
        if neighbors.is_empty() {
            stack.pop();
            continue;
        }
        let next = neighbors[rng.range(0, neighbors.len())];
        let wall = Point::new((current.x + next.x) / 2, (current.y + next.y) / 2);
        grid.set_cell(wall, Cell::Floor);
        grid.set_cell(next, Cell::Floor);
        stack.push(next);
    }

    grid.force_exit_floor();
    grid
}

fn unvisited_neighbors(grid: &Grid, from: Point) -> Vec<Point> {
    LATTICE_STEPS
        .iter()
        .map(|step| from + *step)
        .filter(|point| grid.is_interior(*point) && grid.is_wall(*point))
        .collect()
}

/// Scatters chests over floor cells away from the start corner, the exit and
/// each other. Gives up after a fixed number of draws.
pub fn place_chests(grid: &Grid, rng: &mut RandomNumberGenerator) -> Vec<Chest> {
    let width = grid.width();
    let height = grid.height();
    let target = ((width * height) / 50).max(2) as usize;
    let mut chests: Vec<Chest> = Vec::with_capacity(target);

    // candidate range is [2, dim - 3]
    if width - 3 < 2 || height - 3 < 2 {
        return chests;
    }

    let mut attempts = 0;
    while chests.len() < target && attempts < CHEST_ATTEMPTS {
        attempts += 1;
        let point = Point::new(rng.range(2, width - 2), rng.range(2, height - 2));
        if !grid.is_walkable(point) || point == grid.exit() {
            continue;
        }
        if point.x <= 3 && point.y <= 3 {
            continue;
        }
        let crowded = chests.iter().any(|chest| {
            (chest.point.x - point.x).abs() < CHEST_SPACING
                && (chest.point.y - point.y).abs() < CHEST_SPACING
        });
        if crowded {
            continue;
        }
        chests.push(Chest::new(point, rng));
    }

    if chests.len() < target {
        log::debug!(
            "Placed {} of {target} chests after {attempts} attempts",
            chests.len()
        );
    }
    chests
}
