//! Flat-text save format, written and read in fixed line order:
//! level, player `row,col,facing`, item flag, sage stage, monster count,
//! one `row,col,facing` line per monster, ten rows of grid characters, then
//! the objective text as the remainder of the file.

use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use bracket_geometry::prelude::Point;
use thiserror::Error;

use crate::data;
use crate::map::{Facing, GRID_DIM, Grid, Terrain, in_bounds};

pub const SAVE_FILE: &str = "labyrinth_save.txt";

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("i/o failure: {0}")]
    Io(#[from] io::Error),
    #[error("save file truncated: missing {0}")]
    Truncated(&'static str),
    #[error("malformed {field}: {value:?}")]
    Malformed { field: &'static str, value: String },
}

/// Fully-parsed save snapshot. `read` builds the whole struct before the
/// caller touches any session state, so a bad file can never leave a
/// half-applied load behind.
#[derive(Clone, Debug, PartialEq)]
pub struct SavedGame {
    pub level: i32,
    pub player_point: Point,
    pub player_facing: Facing,
    pub has_objective_item: bool,
    pub sage_stage: u8,
    pub monsters: Vec<(Point, Facing)>,
    pub grid: Grid,
    pub objective_text: String,
}

pub fn write(path: &Path, saved: &SavedGame) -> io::Result<()> {
    let mut out = String::new();
    out.push_str(&format!("{}\n", saved.level));
    out.push_str(&format!(
        "{},{},{}\n",
        saved.player_point.y,
        saved.player_point.x,
        saved.player_facing.index()
    ));
    out.push_str(&format!("{}\n", saved.has_objective_item));
    out.push_str(&format!("{}\n", saved.sage_stage));
    out.push_str(&format!("{}\n", saved.monsters.len()));
    for &(point, facing) in &saved.monsters {
        out.push_str(&format!("{},{},{}\n", point.y, point.x, facing.index()));
    }
    for row in grid_rows(saved) {
        out.push_str(&row);
        out.push('\n');
    }
    out.push_str(&saved.objective_text);
    out.push('\n');
    fs::write(path, out)
}

/// Terrain characters with the player and monster markers overlaid; the file
/// stores one grid carrying both terrain and occupancy.
fn grid_rows(saved: &SavedGame) -> Vec<String> {
    (0..GRID_DIM)
        .map(|y| {
            (0..GRID_DIM)
                .map(|x| {
                    let point = Point::new(x, y);
                    if point == saved.player_point {
                        'P'
                    } else if saved.monsters.iter().any(|&(m, _)| m == point) {
                        'M'
                    } else {
                        saved
                            .grid
                            .terrain_at(point)
                            .map(Terrain::save_char)
                            .unwrap_or('#')
                    }
                })
                .collect()
        })
        .collect()
}

pub fn read(path: &Path) -> Result<SavedGame, SaveError> {
    let file = fs::File::open(path)?;
    let mut lines = BufReader::new(file).lines();

    let level = parse_int("level", &next_line(&mut lines, "level")?)?;
    if data::level(level).is_none() {
        return Err(SaveError::Malformed {
            field: "level",
            value: level.to_string(),
        });
    }

    let (player_point, player_facing) =
        parse_pose("player", &next_line(&mut lines, "player")?)?;

    let item_line = next_line(&mut lines, "objective item flag")?;
    let has_objective_item = match item_line.trim() {
        "true" => true,
        "false" => false,
        other => {
            return Err(SaveError::Malformed {
                field: "objective item flag",
                value: other.to_string(),
            });
        }
    };

    let sage_stage = parse_int("sage stage", &next_line(&mut lines, "sage stage")?)?;
    if !(0..4).contains(&sage_stage) {
        return Err(SaveError::Malformed {
            field: "sage stage",
            value: sage_stage.to_string(),
        });
    }

    // More monsters than grid cells can never be a real save; rejecting here
    // also keeps a hostile count from driving the allocation below.
    let count = parse_int("monster count", &next_line(&mut lines, "monster count")?)?;
    if !(0..=GRID_DIM * GRID_DIM).contains(&count) {
        return Err(SaveError::Malformed {
            field: "monster count",
            value: count.to_string(),
        });
    }
    let mut monsters = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let line = next_line(&mut lines, "monster entry")?;
        monsters.push(parse_pose("monster", &line)?);
    }

    let mut cells = Vec::with_capacity((GRID_DIM * GRID_DIM) as usize);
    for _ in 0..GRID_DIM {
        let row = next_line(&mut lines, "grid row")?;
        if row.chars().count() != GRID_DIM as usize {
            return Err(SaveError::Malformed {
                field: "grid row",
                value: row,
            });
        }
        for c in row.chars() {
            cells.push(Terrain::from_save_char(c).ok_or(SaveError::Malformed {
                field: "grid cell",
                value: c.to_string(),
            })?);
        }
    }
    let grid = Grid::from_cells(cells).ok_or(SaveError::Truncated("grid"))?;

    let mut tail = Vec::new();
    for line in lines {
        tail.push(line?);
    }
    if tail.is_empty() {
        return Err(SaveError::Truncated("objective text"));
    }
    let objective_text = tail.join("\n");

    Ok(SavedGame {
        level,
        player_point,
        player_facing,
        has_objective_item,
        sage_stage: sage_stage as u8,
        monsters,
        grid,
        objective_text,
    })
}

fn next_line(
    lines: &mut std::io::Lines<BufReader<fs::File>>,
    field: &'static str,
) -> Result<String, SaveError> {
    match lines.next() {
        Some(line) => Ok(line?),
        None => Err(SaveError::Truncated(field)),
    }
}

fn parse_int(field: &'static str, raw: &str) -> Result<i32, SaveError> {
    raw.trim().parse().map_err(|_| SaveError::Malformed {
        field,
        value: raw.to_string(),
    })
}

/// Parses a `row,col,facing` triple into an in-bounds point and a facing.
fn parse_pose(field: &'static str, raw: &str) -> Result<(Point, Facing), SaveError> {
    let malformed = || SaveError::Malformed {
        field,
        value: raw.to_string(),
    };
    let mut parts = raw.trim().split(',');
    let mut next_int = || -> Result<i32, SaveError> {
        parts
            .next()
            .and_then(|p| p.trim().parse().ok())
            .ok_or_else(|| malformed())
    };
    let row = next_int()?;
    let col = next_int()?;
    let facing_idx = next_int()?;
    let point = Point::new(col, row);
    if !in_bounds(point) {
        return Err(malformed());
    }
    let facing = Facing::from_index(facing_idx).ok_or_else(|| malformed())?;
    Ok((point, facing))
}
