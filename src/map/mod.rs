pub mod chest;
pub mod maze;

use bracket_geometry::prelude::Point;
use bracket_pathfinding::prelude::{Algorithm2D, BaseMap, DijkstraMap, DistanceAlg};
use bracket_random::prelude::RandomNumberGenerator;
use bracket_terminal::prelude::{RGB, WHITE};
use smallvec::SmallVec;

use self::chest::Chest;

pub const START_POINT: Point = Point { x: 1, y: 1 };

const CARDINALS: [Point; 4] = [
    Point { x: 0, y: -1 },
    Point { x: 1, y: 0 },
    Point { x: 0, y: 1 },
    Point { x: -1, y: 0 },
];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Cell {
    Wall,
    Floor,
}

impl Cell {
    pub fn glyph(self) -> u16 {
        match self {
            Cell::Wall => b'#' as u16,
            Cell::Floor => b'.' as u16,
        }
    }

    pub fn color(self) -> RGB {
        match self {
            Cell::Wall => RGB::from_u8(139, 69, 19),
            Cell::Floor => RGB::named(WHITE),
        }
    }
}

/// Row-major maze grid. Out-of-bounds reads behave as walls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
    exit: Point,
}

impl Grid {
    pub fn filled(width: i32, height: i32) -> Self {
        let size = (width.max(0) * height.max(0)) as usize;
        Self {
            width,
            height,
            cells: vec![Cell::Wall; size],
            exit: Point::new(width - 2, height - 2),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn exit(&self) -> Point {
        self.exit
    }

    fn idx(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_bounds(Point::new(x, y)) {
            Some((y * self.width + x) as usize)
        } else {
            None
        }
    }

    pub fn in_bounds(&self, point: Point) -> bool {
        point.x >= 0 && point.x < self.width && point.y >= 0 && point.y < self.height
    }

    pub fn cell(&self, x: i32, y: i32) -> Cell {
        self.idx(x, y).map_or(Cell::Wall, |idx| self.cells[idx])
    }

    pub fn cell_at(&self, point: Point) -> Cell {
        self.cell(point.x, point.y)
    }

    pub fn set_cell(&mut self, point: Point, cell: Cell) {
        if let Some(idx) = self.idx(point.x, point.y) {
            self.cells[idx] = cell;
        }
    }

    pub fn is_wall(&self, point: Point) -> bool {
        self.cell_at(point) == Cell::Wall
    }

    pub fn is_walkable(&self, point: Point) -> bool {
        self.in_bounds(point) && self.cell_at(point) == Cell::Floor
    }

    pub fn floor_points(&self) -> Vec<Point> {
        let mut points = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let point = Point::new(x, y);
                if self.is_walkable(point) {
                    points.push(point);
                }
            }
        }
        points
    }

    /// Flood fill over walkable cells; entry `i` is true when cell `i` can be
    /// reached from `start`.
    pub fn reachable_from(&self, start: Point) -> Vec<bool> {
        if !self.is_walkable(start) {
            return vec![false; self.cells.len()];
        }
        let starts = [self.point2d_to_index(start)];
        // no path in a w*h grid is longer than w*h steps
        let max_depth = (self.width * self.height) as f32;
        let flood = DijkstraMap::new(self.width, self.height, &starts, self, max_depth);
        flood.map.iter().map(|depth| *depth < f32::MAX).collect()
    }

    pub fn is_reachable(&self, from: Point, to: Point) -> bool {
        if !self.in_bounds(to) {
            return false;
        }
        let idx = self.point2d_to_index(to);
        self.reachable_from(from).get(idx).copied().unwrap_or(false)
    }

    fn force_exit_floor(&mut self) {
        let exit = self.exit;
        self.set_cell(exit, Cell::Floor);
    }

    /// Opens one wall next to the exit when even dimensions leave it cut off
    /// from the lattice.
    fn repair_exit_connection(&mut self) {
        if self.is_reachable(START_POINT, self.exit) {
            return;
        }
        let reachable = self.reachable_from(START_POINT);
        let exit = self.exit;
        for dir in CARDINALS {
            let bridge = exit + dir;
            if !self.is_interior(bridge) || !self.is_wall(bridge) {
                continue;
            }
            let joins = CARDINALS.iter().any(|step| {
                let beyond = bridge + *step;
                beyond != exit
                    && self.is_walkable(beyond)
                    && reachable[self.point2d_to_index(beyond)]
            });
            if joins {
                self.set_cell(bridge, Cell::Floor);
                log::debug!(
                    "Opened {},{} to join exit {},{} to the maze",
                    bridge.x,
                    bridge.y,
                    exit.x,
                    exit.y
                );
                return;
            }
        }
        log::warn!("Exit {},{} left unreachable", exit.x, exit.y);
    }

    pub fn is_interior(&self, point: Point) -> bool {
        point.x > 0 && point.x < self.width - 1 && point.y > 0 && point.y < self.height - 1
    }
}

impl BaseMap for Grid {
    fn is_opaque(&self, idx: usize) -> bool {
        self.cells.get(idx).map_or(true, |cell| *cell == Cell::Wall)
    }

    fn get_available_exits(&self, idx: usize) -> SmallVec<[(usize, f32); 10]> {
        let mut exits = SmallVec::new();
        let point = self.index_to_point2d(idx);
        for dir in CARDINALS {
            let dest = point + dir;
            if self.is_walkable(dest) {
                exits.push((self.point2d_to_index(dest), 1.0));
            }
        }
        exits
    }

    fn get_pathing_distance(&self, idx1: usize, idx2: usize) -> f32 {
        let p1 = self.index_to_point2d(idx1);
        let p2 = self.index_to_point2d(idx2);
        DistanceAlg::Pythagoras.distance2d(p1, p2)
    }
}

impl Algorithm2D for Grid {
    fn dimensions(&self) -> Point {
        Point::new(self.width, self.height)
    }

    fn in_bounds(&self, point: Point) -> bool {
        Grid::in_bounds(self, point)
    }
}

/// One generated floor of the dungeon: the maze plus its chests.
#[derive(Clone, Debug)]
pub struct Level {
    pub number: u32,
    pub grid: Grid,
    pub chests: Vec<Chest>,
}

impl Level {
    pub fn generate(number: u32, width: i32, height: i32, rng: &mut RandomNumberGenerator) -> Self {
        let mut grid = maze::generate(width, height, rng);
        grid.repair_exit_connection();
        let chests = maze::place_chests(&grid, rng);
        log::info!(
            "Generated level {number} ({}x{}, {} open cells) with {} chests",
            grid.width(),
            grid.height(),
            grid.floor_points().len(),
            chests.len()
        );
        Self {
            number,
            grid,
            chests,
        }
    }

    pub fn chest_at_mut(&mut self, point: Point) -> Option<&mut Chest> {
        self.chests.iter_mut().find(|chest| chest.point == point)
    }

    pub fn is_exit(&self, point: Point) -> bool {
        point == self.grid.exit()
    }

    /// Random interior cell on one of the four edges, as zombies climb in from
    /// the walls. Returns `None` when the draw lands on a wall.
    pub fn edge_spawn(&self, rng: &mut RandomNumberGenerator) -> Option<Point> {
        let width = self.grid.width();
        let height = self.grid.height();
        let point = match rng.range(0, 4) {
            0 => Point::new(rng.range(1, width - 1), 1),
            1 => Point::new(rng.range(1, width - 1), height - 2),
            2 => Point::new(1, rng.range(1, height - 1)),
            _ => Point::new(width - 2, rng.range(1, height - 1)),
        };
        self.grid.is_walkable(point).then_some(point)
    }
}
