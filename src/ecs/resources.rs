use bracket_geometry::prelude::Point;

use crate::map::{GRID_DIM, Grid, in_bounds};

/// Per-tick snapshot of everything the monster tick may consult: terrain
/// passability, the cells monsters are barred from, and the single serialized
/// player position. Rebuilt before every dispatch so systems never touch the
/// live grid.
pub struct TickContext {
    pub player_point: Point,
    passable: Vec<bool>,
    barred: Vec<bool>,
}

impl TickContext {
    pub fn from_grid(grid: &Grid, player_point: Point) -> Self {
        let passable = grid.cells().iter().map(|t| !t.blocks()).collect();
        let barred = grid.cells().iter().map(|t| t.bars_monsters()).collect();
        Self {
            player_point,
            passable,
            barred,
        }
    }

    fn idx(point: Point) -> usize {
        (point.y * GRID_DIM + point.x) as usize
    }

    pub fn is_passable(&self, point: Point) -> bool {
        in_bounds(point) && self.passable[Self::idx(point)]
    }

    /// True when terrain alone permits a monster to stand here. Occupancy by
    /// the player or another monster is the movement system's business.
    pub fn open_for_monster(&self, point: Point) -> bool {
        in_bounds(point) && !self.barred[Self::idx(point)]
    }
}

/// Narrative lines produced during a tick, drained by the shell each frame.
#[derive(Default)]
pub struct StoryLog {
    pub entries: Vec<String>,
}

impl StoryLog {
    pub fn push<S: Into<String>>(&mut self, entry: S) {
        self.entries.push(entry.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data;

    #[test]
    fn context_bars_monsters_from_item_exit_and_gate() {
        let def = data::level(1).unwrap();
        let grid = Grid::from_template(&def.template);
        let ctx = TickContext::from_grid(&grid, Point::new(1, 1));
        assert!(ctx.is_passable(Point::new(2, 4))); // relic cell walkable for the player
        assert!(!ctx.open_for_monster(Point::new(2, 4)));
        assert!(!ctx.open_for_monster(Point::new(8, 8))); // exit
        assert!(!ctx.open_for_monster(Point::new(3, 4))); // gate
        assert!(ctx.open_for_monster(Point::new(1, 2)));
        assert!(!ctx.open_for_monster(Point::new(-1, 0)));
    }
}
