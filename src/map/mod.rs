use bracket_geometry::prelude::{DistanceAlg, Point};

pub const GRID_DIM: i32 = 10;

/// The four cardinal headings, stored in save files as their index
/// (0 = up, 1 = right, 2 = down, 3 = left).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Facing {
    Up,
    Right,
    Down,
    Left,
}

pub const HEADINGS: [Facing; 4] = [Facing::Up, Facing::Right, Facing::Down, Facing::Left];

impl Facing {
    pub fn index(self) -> i32 {
        match self {
            Facing::Up => 0,
            Facing::Right => 1,
            Facing::Down => 2,
            Facing::Left => 3,
        }
    }

    pub fn from_index(idx: i32) -> Option<Self> {
        match idx {
            0 => Some(Facing::Up),
            1 => Some(Facing::Right),
            2 => Some(Facing::Down),
            3 => Some(Facing::Left),
            _ => None,
        }
    }

    pub fn delta(self) -> Point {
        match self {
            Facing::Up => Point::new(0, -1),
            Facing::Right => Point::new(1, 0),
            Facing::Down => Point::new(0, 1),
            Facing::Left => Point::new(-1, 0),
        }
    }
}

/// Level-specific collectible that unlocks the exit door.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ObjectiveKind {
    Crystal,
    AltarSeal,
    SpireSocket,
}

impl ObjectiveKind {
    pub fn item_name(self) -> &'static str {
        match self {
            ObjectiveKind::Crystal => "Crystal of Eternity",
            ObjectiveKind::AltarSeal => "Ancient Altar Seal",
            ObjectiveKind::SpireSocket => "Celestial Spire Placement",
        }
    }
}

/// Static terrain only. Player and monster occupancy lives in the ECS, so a
/// cell never has to choose between showing terrain and showing a body.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Terrain {
    Wall,
    Hedge,
    Floor,
    Decoration,
    Objective(ObjectiveKind),
    Exit,
    Gate,
}

impl Terrain {
    /// Save-file character for this terrain. The inverse of `from_save_char`
    /// except for the entity markers `P`/`M`, which decode to `Floor`.
    pub fn save_char(self) -> char {
        match self {
            Terrain::Wall => '#',
            Terrain::Hedge => 'W',
            Terrain::Floor => '.',
            Terrain::Decoration => 'T',
            Terrain::Objective(ObjectiveKind::Crystal) => 'A',
            Terrain::Objective(ObjectiveKind::AltarSeal) => 'S',
            Terrain::Objective(ObjectiveKind::SpireSocket) => 'C',
            Terrain::Exit => 'E',
            Terrain::Gate => 'G',
        }
    }

    pub fn from_save_char(c: char) -> Option<Self> {
        match c {
            '#' => Some(Terrain::Wall),
            'W' => Some(Terrain::Hedge),
            '.' | 'P' | 'M' => Some(Terrain::Floor),
            'T' => Some(Terrain::Decoration),
            'A' => Some(Terrain::Objective(ObjectiveKind::Crystal)),
            'S' => Some(Terrain::Objective(ObjectiveKind::AltarSeal)),
            'C' => Some(Terrain::Objective(ObjectiveKind::SpireSocket)),
            'E' => Some(Terrain::Exit),
            'G' => Some(Terrain::Gate),
            _ => None,
        }
    }

    /// Impassable for everyone.
    pub fn blocks(self) -> bool {
        matches!(self, Terrain::Wall | Terrain::Hedge | Terrain::Gate)
    }

    /// Cells a monster may never stand on, over and above `blocks`.
    pub fn bars_monsters(self) -> bool {
        self.blocks() || matches!(self, Terrain::Objective(_) | Terrain::Exit)
    }
}

/// 10x10 row-major terrain snapshot for the current level.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    cells: Vec<Terrain>,
}

impl Grid {
    pub fn from_template(rows: &[&str; GRID_DIM as usize]) -> Self {
        let cells = rows
            .iter()
            .flat_map(|row| row.chars())
            .map(|c| Terrain::from_save_char(c).unwrap_or(Terrain::Wall))
            .collect();
        Self { cells }
    }

    pub fn from_cells(cells: Vec<Terrain>) -> Option<Self> {
        if cells.len() == (GRID_DIM * GRID_DIM) as usize {
            Some(Self { cells })
        } else {
            None
        }
    }

    fn idx(&self, point: Point) -> Option<usize> {
        if in_bounds(point) {
            Some((point.y * GRID_DIM + point.x) as usize)
        } else {
            None
        }
    }

    pub fn terrain_at(&self, point: Point) -> Option<Terrain> {
        self.idx(point).map(|idx| self.cells[idx])
    }

    pub fn set_terrain(&mut self, point: Point, terrain: Terrain) {
        if let Some(idx) = self.idx(point) {
            self.cells[idx] = terrain;
        }
    }

    pub fn is_passable(&self, point: Point) -> bool {
        self.terrain_at(point).is_some_and(|t| !t.blocks())
    }

    /// First cell matching `pred`, scanning row-major.
    pub fn find(&self, pred: impl Fn(Terrain) -> bool) -> Option<Point> {
        self.cells
            .iter()
            .position(|&t| pred(t))
            .map(|idx| Point::new(idx as i32 % GRID_DIM, idx as i32 / GRID_DIM))
    }

    pub fn cells(&self) -> &[Terrain] {
        &self.cells
    }
}

pub fn in_bounds(point: Point) -> bool {
    point.x >= 0 && point.x < GRID_DIM && point.y >= 0 && point.y < GRID_DIM
}

pub fn chebyshev(a: Point, b: Point) -> i32 {
    DistanceAlg::Chebyshev.distance2d(a, b) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facing_round_trips_through_index() {
        for facing in HEADINGS {
            assert_eq!(Facing::from_index(facing.index()), Some(facing));
        }
        assert_eq!(Facing::from_index(4), None);
        assert_eq!(Facing::from_index(-1), None);
    }

    #[test]
    fn entity_markers_decode_to_floor() {
        assert_eq!(Terrain::from_save_char('P'), Some(Terrain::Floor));
        assert_eq!(Terrain::from_save_char('M'), Some(Terrain::Floor));
        assert_eq!(Terrain::from_save_char('?'), None);
    }

    #[test]
    fn terrain_chars_round_trip() {
        for c in ['#', 'W', '.', 'T', 'A', 'S', 'C', 'E', 'G'] {
            let terrain = Terrain::from_save_char(c).unwrap();
            assert_eq!(terrain.save_char(), c);
        }
    }

    #[test]
    fn passability_excludes_walls_gate_and_out_of_bounds() {
        let rows = [
            "##########",
            "#P..#....#",
            "#.#..M##.#",
            "#.###.#..#",
            "#.AG#.#.##",
            "##..#....#",
            "#.#####.##",
            "#.....#..#",
            "#####.#ME#",
            "##########",
        ];
        let grid = Grid::from_template(&rows);
        assert!(!grid.is_passable(Point::new(0, 0)));
        assert!(grid.is_passable(Point::new(1, 1)));
        assert!(grid.is_passable(Point::new(2, 4))); // objective item is walkable
        assert!(grid.is_passable(Point::new(8, 8))); // so is the exit
        assert!(!grid.is_passable(Point::new(3, 4))); // gate blocks
        assert!(!grid.is_passable(Point::new(-1, 5)));
        assert!(!grid.is_passable(Point::new(5, 10)));
    }

    #[test]
    fn monsters_barred_from_special_cells() {
        assert!(Terrain::Exit.bars_monsters());
        assert!(Terrain::Objective(ObjectiveKind::Crystal).bars_monsters());
        assert!(Terrain::Gate.bars_monsters());
        assert!(!Terrain::Decoration.bars_monsters());
    }

    #[test]
    fn chebyshev_distance_is_max_axis() {
        assert_eq!(chebyshev(Point::new(1, 1), Point::new(3, 2)), 2);
        assert_eq!(chebyshev(Point::new(4, 4), Point::new(4, 4)), 0);
    }
}
