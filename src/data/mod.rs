use bracket_terminal::prelude::RGB;

use crate::map::{Facing, ObjectiveKind};

pub const MAX_LEVEL: i32 = 3;

/// (row, col) cells the decoration scatter must never overwrite: the level-1
/// relic alcove and the far corner cells that hold the item and exit door on
/// the later levels.
pub const RESERVED_CELLS: [(i32, i32); 3] = [(4, 2), (8, 8), (8, 7)];

#[derive(Clone)]
pub struct LevelTheme {
    pub wall: RGB,
    pub floor: RGB,
    pub decoration: RGB,
}

#[derive(Clone)]
pub struct LevelDefinition {
    pub number: i32,
    pub name: &'static str,
    pub template: [&'static str; 10],
    /// Monster spawn table as (row, col, facing). Authoritative; the `M`
    /// characters in the templates are shorthand and parse to floor.
    pub spawns: &'static [(i32, i32, Facing)],
    /// The sage stands on the gate cell.
    pub sage: (i32, i32),
    pub objective_kind: ObjectiveKind,
    pub objective_text: &'static str,
    pub intro: &'static [&'static str],
    pub decoration_count: usize,
    pub monster_name: &'static str,
    pub monster_glyph: char,
    pub monster_color: RGB,
    pub theme: LevelTheme,
}

pub fn level(number: i32) -> Option<LevelDefinition> {
    match number {
        1 => Some(LevelDefinition {
            number: 1,
            name: "The Cursed Labyrinth",
            template: [
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
            ],
            spawns: &[(2, 5, Facing::Down), (8, 7, Facing::Down)],
            sage: (4, 3),
            objective_kind: ObjectiveKind::Crystal,
            objective_text: "Find the Sage for guidance on the curse.",
            intro: &[
                "Level 1: The Cursed Labyrinth",
                "Journal Entry: I am Elara, seeking the Crystal of Eternity in the \
                 Cursed Labyrinth, where cursed guardians roam. A Sage may guide me.",
                "Controls: WASD/Arrows to move, SPACE to interact, H for help, \
                 V to save, L to load.",
            ],
            decoration_count: 5,
            monster_name: "cursed guardian",
            monster_glyph: 'g',
            monster_color: RGB::from_u8(220, 60, 60),
            theme: LevelTheme {
                wall: RGB::from_u8(139, 69, 19),
                floor: RGB::from_u8(120, 200, 120),
                decoration: RGB::from_u8(90, 190, 90),
            },
        }),
        2 => Some(LevelDefinition {
            number: 2,
            name: "The Enchanted Forest",
            template: [
                "WWWWWWWWWW",
                "WPT.W.T..W",
                "W.W..MWWTW",
                "WTWWW.W..W",
                "W..GWTW.WW",
                "WW..W..T.W",
                "W.WWWWW.WW",
                "W.T...WM.W",
                "WWWWW.WESW",
                "WWWWWWWWWW",
            ],
            spawns: &[(2, 5, Facing::Down), (7, 7, Facing::Down), (5, 3, Facing::Right)],
            sage: (4, 3),
            objective_kind: ObjectiveKind::AltarSeal,
            objective_text: "Find the Ancient Altar ('S') to seal the curse.",
            intro: &[
                "Level 2: The Enchanted Forest",
                "The Crystal reveals the curse's source: an Ancient Altar in the \
                 Enchanted Forest. Seal it and find the exit door to proceed, but \
                 beware agile forest spirits and treacherous waters.",
            ],
            decoration_count: 10,
            monster_name: "forest spirit",
            monster_glyph: 's',
            monster_color: RGB::from_u8(0, 130, 0),
            theme: LevelTheme {
                wall: RGB::from_u8(60, 160, 60),
                floor: RGB::from_u8(50, 150, 50),
                decoration: RGB::from_u8(150, 110, 60),
            },
        }),
        3 => Some(LevelDefinition {
            number: 3,
            name: "The Celestial Ruins",
            template: [
                "##########",
                "#P.T#....#",
                "#.#..M#T.#",
                "#T###.#..#",
                "#..G#T#.##",
                "##..#..T.#",
                "#.#####.##",
                "#.T...#M.#",
                "#####.#EC#",
                "##########",
            ],
            spawns: &[
                (2, 5, Facing::Down),
                (7, 7, Facing::Down),
                (5, 3, Facing::Right),
                (3, 8, Facing::Left),
            ],
            sage: (4, 3),
            objective_kind: ObjectiveKind::SpireSocket,
            objective_text: "Place the Crystal at the Celestial Spire ('C').",
            intro: &[
                "Level 3: The Celestial Ruins",
                "The Crystal unveils the curse's true origin: a corrupted Celestial \
                 Spire in ancient ruins. Place the Crystal there to end the curse and \
                 restore cosmic balance, but beware the swift Celestial Wraiths.",
            ],
            decoration_count: 8,
            monster_name: "celestial wraith",
            monster_glyph: 'w',
            monster_color: RGB::from_u8(0, 150, 255),
            theme: LevelTheme {
                wall: RGB::from_u8(120, 120, 180),
                floor: RGB::from_u8(40, 80, 140),
                decoration: RGB::from_u8(0, 200, 255),
            },
        }),
        _ => None,
    }
}

pub const FIND_EXIT_OBJECTIVE: &str = "Find the exit door.";

pub const SEALED_EXIT: &str =
    "The exit door is sealed without the required item. Find it first!";

pub const OBJECTIVE_NEAR: &str =
    "A radiant glow pulses nearby... the objective is close.";

pub const EXIT_NEAR: &str =
    "The air hums near the exit door. Cosmic whispers urge you forward.";

pub const WIN_EPILOGUE: &str =
    "Final Epilogue: The Crystal ignites the Celestial Spire, shattering the \
     curse. Light floods the ruins, and the stars align in harmony. Elara, now a \
     cosmic guardian, sees visions of new realms to explore. Her legend will echo \
     through the ages.";

pub const LOSS_NARRATION: &str =
    "Tragic End: A wraith's grasp consumes you. The curse claims another soul, \
     and Elara fades into the cosmic void.";

pub const WIN_BANNER: &str = "You ended the curse and restored balance.";
pub const LOSS_BANNER: &str = "Game Over: You have been cursed.";

/// Staged sage dialogue. Returns the line for the given pre-advance stage and,
/// for the opening exchange, the objective text it sets.
pub fn sage_line(level: i32, stage: u8) -> (&'static str, Option<&'static str>) {
    match (stage, level) {
        (0, 1) => (
            "Sage: 'Greetings, Elara. I survived the curse. Kings sealed the \
             Crystal here, cursing seekers. Avoid the guardians.'",
            Some("Collect the Crystal of Eternity."),
        ),
        (0, 2) => (
            "Sage's Spirit: 'Elara, the Crystal led you here. Seal the Altar and \
             find the exit door to proceed.'",
            Some("Find the Ancient Altar ('S')."),
        ),
        (0, _) => (
            "Celestial Sage: 'Elara, the Crystal has brought you to the Celestial \
             Ruins. Place it in the Spire to end the curse.'",
            Some("Place the Crystal at the Celestial Spire ('C')."),
        ),
        (1, 1) => (
            "Sage: 'The Crystal weakens the curse. Reach the exit door.'",
            None,
        ),
        (1, 2) => (
            "Sage's Spirit: 'The Altar is near. Seal it and find the exit door.'",
            None,
        ),
        (1, _) => (
            "Celestial Sage: 'The Spire awaits. Place the Crystal and end this.'",
            None,
        ),
        (2, _) => (
            "Sage: 'You're close, Elara. With the item, find the exit door.'",
            None,
        ),
        _ => ("Sage: 'Go now, your destiny awaits.'", None),
    }
}

pub fn help_text(level: i32, objective: &str) -> Vec<String> {
    vec![
        "Help: WASD/Arrows to move. SPACE: interact with Sage. V: save. \
         L: load. H: this help."
            .to_string(),
        "Story: Elara seeks to end a cosmic curse. Level 1: Find Crystal. \
         Level 2: Seal Altar, find exit. Level 3: Place Crystal in Spire."
            .to_string(),
        format!("Current Level: {level}"),
        format!("Current Objective: {objective}"),
    ]
}
