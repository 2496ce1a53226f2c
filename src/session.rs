//! The per-tick game state: level loading, player movement resolution,
//! sage interaction, ambient story triggers, outcome latching, and the
//! save/load entry points. The terminal shell owns timers and key mapping;
//! everything with a rule in it lives here.

use std::path::PathBuf;

use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use log::{info, warn};

use crate::{
    data::{self, LevelDefinition},
    ecs::{EcsWorld, components::Renderable},
    map::{Facing, GRID_DIM, Grid, Terrain, chebyshev},
    save::{self, SavedGame},
};

/// Everything the input surface can ask of the session.
pub enum Intent {
    Move(Facing),
    Interact,
    Save,
    Load,
    Help,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
}

pub struct GameSession {
    def: LevelDefinition,
    grid: Grid,
    objective_text: String,
    has_objective_item: bool,
    sage_stage: u8,
    outcome: Option<Outcome>,
    /// Where the item and exit sit (or sat; the item coordinate survives
    /// pickup so the proximity trigger geometry stays fixed).
    objective_point: Point,
    exit_point: Point,
    save_path: PathBuf,
    ecs: EcsWorld,
}

impl GameSession {
    pub fn new(save_path: impl Into<PathBuf>) -> Self {
        Self::with_rng(RandomNumberGenerator::new(), save_path)
    }

    pub fn with_rng(rng: RandomNumberGenerator, save_path: impl Into<PathBuf>) -> Self {
        let def = data::level(1).expect("level catalog includes level 1");
        let mut session = Self {
            grid: Grid::from_template(&def.template),
            objective_text: def.objective_text.to_string(),
            has_objective_item: false,
            sage_stage: 0,
            outcome: None,
            objective_point: Point::new(2, 4),
            exit_point: Point::new(8, 8),
            save_path: save_path.into(),
            ecs: EcsWorld::new(rng),
            def,
        };
        session.load_level(1);
        session
    }

    /// Switches to level `n`, resetting the item flag, sage stage, monsters,
    /// and player start, and scattering fresh decorations. Unknown levels are
    /// reported and ignored; normal play never requests one.
    pub fn load_level(&mut self, n: i32) {
        let Some(def) = data::level(n) else {
            warn!("ignoring request to load unknown level {n}");
            self.ecs
                .push_story(format!("Error loading level: {n} is not a known level."));
            return;
        };
        info!("loading level {n}: {}", def.name);

        self.grid = Grid::from_template(&def.template);
        self.has_objective_item = false;
        self.sage_stage = 0;
        self.objective_text = def.objective_text.to_string();

        let roster: Vec<(Point, Facing)> = def
            .spawns
            .iter()
            .map(|&(row, col, facing)| (Point::new(col, row), facing))
            .collect();
        self.ecs
            .reset_actors(Point::new(1, 1), Facing::Down, &roster, &def);

        self.scatter_decorations(&def);
        self.objective_point = self
            .grid
            .find(|t| matches!(t, Terrain::Objective(_)))
            .unwrap_or_else(|| Point::new(8, 8));
        self.exit_point = self
            .grid
            .find(|t| t == Terrain::Exit)
            .unwrap_or_else(|| Point::new(8, 8));

        for line in def.intro {
            self.ecs.push_story(*line);
        }
        self.ecs
            .push_story(format!("Current Objective: {}", self.objective_text));
        self.def = def;
    }

    /// `count` blind placement rolls; a roll only lands on a plain floor cell
    /// that is neither reserved nor under an actor, so fewer than `count`
    /// decorations may appear.
    fn scatter_decorations(&mut self, def: &LevelDefinition) {
        for _ in 0..def.decoration_count {
            let row = self.ecs.roll(GRID_DIM);
            let col = self.ecs.roll(GRID_DIM);
            if data::RESERVED_CELLS.contains(&(row, col)) {
                continue;
            }
            let point = Point::new(col, row);
            if point == self.ecs.player_point() || self.ecs.monster_at(point) {
                continue;
            }
            if self.grid.terrain_at(point) == Some(Terrain::Floor) {
                self.grid.set_terrain(point, Terrain::Decoration);
            }
        }
    }

    pub fn apply(&mut self, intent: Intent) {
        if self.outcome.is_some() {
            return;
        }
        match intent {
            Intent::Move(facing) => self.step(facing),
            Intent::Interact => self.interact_with_sage(),
            Intent::Save => self.save_game(),
            Intent::Load => self.load_game(),
            Intent::Help => {
                for line in data::help_text(self.def.number, &self.objective_text) {
                    self.ecs.push_story(line);
                }
            }
        }
    }

    fn step(&mut self, facing: Facing) {
        let origin = self.ecs.player_point();
        let delta = facing.delta();
        let target = Point::new(origin.x + delta.x, origin.y + delta.y);

        // The player turns to face the attempt even when the step is rejected.
        self.ecs.set_player(origin, facing);
        if !self.grid.is_passable(target) {
            return;
        }

        match self.grid.terrain_at(target) {
            // Walking over a decoration flattens it. Keeps the save grid
            // honest: the cell under any actor is always plain floor.
            Some(Terrain::Decoration) => {
                self.grid.set_terrain(target, Terrain::Floor);
            }
            Some(Terrain::Objective(kind)) => {
                self.has_objective_item = true;
                self.grid.set_terrain(target, Terrain::Floor);
                self.ecs.push_story(format!(
                    "You acquired the {}! Power surges through you.",
                    kind.item_name()
                ));
                self.ecs
                    .push_story(format!("New Objective: {}", data::FIND_EXIT_OBJECTIVE));
                self.objective_text = data::FIND_EXIT_OBJECTIVE.to_string();
            }
            Some(Terrain::Exit) => {
                if self.has_objective_item {
                    if self.def.number < data::MAX_LEVEL {
                        self.load_level(self.def.number + 1);
                    } else {
                        self.win();
                    }
                } else {
                    self.ecs.push_story(data::SEALED_EXIT);
                }
                return;
            }
            _ => {}
        }

        if self.ecs.monster_at(target) {
            self.lose();
            return;
        }
        self.ecs.set_player(target, facing);
        if self.ecs.monster_at(target) {
            self.lose();
        }
    }

    /// One fixed-interval monster tick: wander/movement dispatch, ambient
    /// story triggers, then the collision check against the settled board.
    pub fn monster_tick(&mut self) {
        if self.outcome.is_some() {
            return;
        }
        self.ecs.advance(&self.grid);
        for (point, _) in self.ecs.monsters() {
            if self.grid.terrain_at(point) == Some(Terrain::Decoration) {
                self.grid.set_terrain(point, Terrain::Floor);
            }
        }
        self.ambient_story_triggers();
        if self.ecs.monster_at(self.ecs.player_point()) {
            self.lose();
        }
    }

    fn ambient_story_triggers(&mut self) {
        let player = self.ecs.player_point();
        if !self.has_objective_item
            && chebyshev(player, self.objective_point) <= 2
            && self.ecs.roll(10) == 0
        {
            self.ecs.push_story(data::OBJECTIVE_NEAR);
        }
        if chebyshev(player, self.exit_point) <= 2 && self.ecs.roll(10) == 0 {
            self.ecs.push_story(data::EXIT_NEAR);
        }
    }

    /// Adjacent (Chebyshev 1, never same-cell) interaction advances the
    /// staged dialogue, capped at the final stage.
    fn interact_with_sage(&mut self) {
        let sage = Point::new(self.def.sage.1, self.def.sage.0);
        let dist = chebyshev(self.ecs.player_point(), sage);
        if dist == 0 || dist > 1 {
            return;
        }
        let (line, new_objective) = data::sage_line(self.def.number, self.sage_stage);
        self.ecs.push_story(line);
        if let Some(text) = new_objective {
            self.ecs.push_story(format!("New Objective: {text}"));
            self.objective_text = text.to_string();
        }
        self.sage_stage = (self.sage_stage + 1).min(3);
    }

    fn win(&mut self) {
        if self.outcome.is_some() {
            return;
        }
        self.outcome = Some(Outcome::Won);
        self.ecs.push_story(data::WIN_EPILOGUE);
        info!("session ended in victory");
    }

    fn lose(&mut self) {
        if self.outcome.is_some() {
            return;
        }
        self.outcome = Some(Outcome::Lost);
        self.ecs.push_story(data::LOSS_NARRATION);
        info!("session ended in defeat");
    }

    fn save_game(&mut self) {
        let snapshot = self.snapshot();
        match save::write(&self.save_path, &snapshot) {
            Ok(()) => self.ecs.push_story("Game saved successfully!"),
            Err(err) => {
                warn!("save failed: {err}");
                self.ecs.push_story(format!("Error saving game: {err}"));
            }
        }
    }

    fn load_game(&mut self) {
        match save::read(&self.save_path) {
            Ok(saved) => {
                self.restore(saved);
                self.ecs.push_story(format!(
                    "Game loaded. Current Level: {}. Objective: {}",
                    self.def.number, self.objective_text
                ));
            }
            Err(err) => {
                warn!("load failed: {err}");
                self.ecs.push_story(format!("Error loading game: {err}"));
            }
        }
    }

    pub fn snapshot(&self) -> SavedGame {
        SavedGame {
            level: self.def.number,
            player_point: self.ecs.player_point(),
            player_facing: self.ecs.player_facing(),
            has_objective_item: self.has_objective_item,
            sage_stage: self.sage_stage,
            monsters: self.ecs.monsters(),
            grid: self.grid.clone(),
            objective_text: self.objective_text.clone(),
        }
    }

    fn restore(&mut self, saved: SavedGame) {
        // `save::read` validated the level number, but stay defensive here
        // since the snapshot type is constructible elsewhere.
        let Some(def) = data::level(saved.level) else {
            warn!("snapshot names unknown level {}", saved.level);
            return;
        };
        // Proximity geometry comes from the pristine template: the item cell
        // in a mid-level save may already be floor.
        let template = Grid::from_template(&def.template);
        self.objective_point = template
            .find(|t| matches!(t, Terrain::Objective(_)))
            .unwrap_or_else(|| Point::new(8, 8));
        self.exit_point = template
            .find(|t| t == Terrain::Exit)
            .unwrap_or_else(|| Point::new(8, 8));

        self.grid = saved.grid;
        self.has_objective_item = saved.has_objective_item;
        self.sage_stage = saved.sage_stage;
        self.objective_text = saved.objective_text;
        self.ecs
            .reset_actors(saved.player_point, saved.player_facing, &saved.monsters, &def);
        self.def = def;
    }

    pub fn level(&self) -> i32 {
        self.def.number
    }

    pub fn def(&self) -> &LevelDefinition {
        &self.def
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn objective_text(&self) -> &str {
        &self.objective_text
    }

    pub fn has_objective_item(&self) -> bool {
        self.has_objective_item
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn player_point(&self) -> Point {
        self.ecs.player_point()
    }

    pub fn each_renderable<F>(&self, f: F)
    where
        F: FnMut(Point, &Renderable),
    {
        self.ecs.each_renderable(f)
    }

    pub fn drain_story(&mut self) -> Vec<String> {
        self.ecs.drain_story()
    }

    #[cfg(test)]
    pub(crate) fn teleport(&mut self, point: Point) {
        let facing = self.ecs.player_facing();
        if self.grid.terrain_at(point) == Some(Terrain::Decoration) {
            self.grid.set_terrain(point, Terrain::Floor);
        }
        self.ecs.set_player(point, facing);
    }

    #[cfg(test)]
    pub(crate) fn grant_item(&mut self) {
        self.has_objective_item = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::ObjectiveKind;
    use tempfile::tempdir;

    fn session_with_seed(seed: u64) -> GameSession {
        let dir = tempdir().unwrap();
        GameSession::with_rng(
            RandomNumberGenerator::seeded(seed),
            dir.path().join(save::SAVE_FILE),
        )
    }

    fn spawn_roster(def: &LevelDefinition) -> Vec<(Point, Facing)> {
        def.spawns
            .iter()
            .map(|&(row, col, facing)| (Point::new(col, row), facing))
            .collect()
    }

    #[test]
    fn fresh_session_opens_level_one() {
        let mut session = session_with_seed(1);
        assert_eq!(session.level(), 1);
        assert_eq!(session.player_point(), Point::new(1, 1));
        assert_eq!(session.snapshot().player_facing, Facing::Down);
        assert!(!session.has_objective_item());
        assert_eq!(session.snapshot().monsters, spawn_roster(session.def()));
        assert!(
            session
                .drain_story()
                .iter()
                .any(|line| line.contains("Current Objective"))
        );
    }

    #[test]
    fn reloading_a_level_differs_only_in_decorations() {
        let mut session = session_with_seed(2);
        session.load_level(2);
        let first = session.snapshot();
        session.load_level(2);
        let second = session.snapshot();

        assert_eq!(first.monsters, second.monsters);
        assert_eq!(first.player_point, second.player_point);
        assert_eq!(first.objective_text, second.objective_text);
        for (a, b) in first.grid.cells().iter().zip(second.grid.cells()) {
            let decorative =
                |t: &Terrain| matches!(t, Terrain::Floor | Terrain::Decoration);
            assert!(a == b || (decorative(a) && decorative(b)));
        }
    }

    #[test]
    fn decorations_never_land_on_reserved_cells() {
        for seed in 0..30 {
            let mut session = session_with_seed(seed);
            for n in 1..=data::MAX_LEVEL {
                session.load_level(n);
                let template = Grid::from_template(&session.def().template);
                for &(row, col) in &data::RESERVED_CELLS {
                    let point = Point::new(col, row);
                    assert_ne!(
                        session.grid().terrain_at(point),
                        Some(Terrain::Decoration),
                        "seed {seed} level {n}"
                    );
                }
                // Scatter only ever converts plain floor.
                for (idx, cell) in session.grid().cells().iter().enumerate() {
                    if *cell == Terrain::Decoration
                        && template.cells()[idx] != Terrain::Decoration
                    {
                        assert_eq!(template.cells()[idx], Terrain::Floor);
                    }
                }
            }
        }
    }

    #[test]
    fn blocked_step_turns_the_player_in_place() {
        let mut session = session_with_seed(3);
        session.apply(Intent::Move(Facing::Up)); // (1,0) is wall
        assert_eq!(session.player_point(), Point::new(1, 1));
        assert_eq!(session.snapshot().player_facing, Facing::Up);
    }

    #[test]
    fn objective_pickup_is_one_way() {
        let mut session = session_with_seed(4);
        session.teleport(Point::new(2, 5));
        session.apply(Intent::Move(Facing::Up));

        assert!(session.has_objective_item());
        assert_eq!(session.player_point(), Point::new(2, 4));
        assert_eq!(
            session.grid().terrain_at(Point::new(2, 4)),
            Some(Terrain::Floor)
        );
        assert_eq!(session.objective_text(), data::FIND_EXIT_OBJECTIVE);
        let story = session.drain_story();
        assert!(
            story
                .iter()
                .any(|l| l.contains(ObjectiveKind::Crystal.item_name()))
        );

        // Walking off and back never resurrects the item.
        session.apply(Intent::Move(Facing::Down));
        session.apply(Intent::Move(Facing::Up));
        assert!(session.has_objective_item());
        assert_eq!(
            session.grid().terrain_at(Point::new(2, 4)),
            Some(Terrain::Floor)
        );
    }

    #[test]
    fn walking_over_a_decoration_flattens_it() {
        let mut session = session_with_seed(20);
        session.load_level(2); // (2,1) is a decoration fixed by the template
        assert_eq!(
            session.grid().terrain_at(Point::new(2, 1)),
            Some(Terrain::Decoration)
        );
        session.apply(Intent::Move(Facing::Right));
        assert_eq!(session.player_point(), Point::new(2, 1));
        assert_eq!(
            session.grid().terrain_at(Point::new(2, 1)),
            Some(Terrain::Floor)
        );
    }

    #[test]
    fn sealed_exit_rejects_until_item_is_held() {
        let mut session = session_with_seed(5);
        session.teleport(Point::new(8, 7));
        session.apply(Intent::Move(Facing::Down));
        assert_eq!(session.level(), 1);
        assert_eq!(session.player_point(), Point::new(8, 7));
        assert!(session.drain_story().iter().any(|l| l.contains("sealed")));

        session.grant_item();
        session.apply(Intent::Move(Facing::Down));
        assert_eq!(session.level(), 2);
        assert_eq!(session.player_point(), Point::new(1, 1));
        assert!(!session.has_objective_item());
        assert_eq!(session.snapshot().monsters, spawn_roster(session.def()));
        assert_eq!(session.outcome(), None);
    }

    #[test]
    fn exit_on_final_level_wins() {
        let mut session = session_with_seed(6);
        session.load_level(3);
        session.grant_item();
        session.teleport(Point::new(8, 8));
        session.apply(Intent::Move(Facing::Left));
        assert_eq!(session.outcome(), Some(Outcome::Won));
        assert!(
            session
                .drain_story()
                .iter()
                .any(|l| l.contains("Final Epilogue"))
        );
    }

    #[test]
    fn stepping_onto_a_monster_loses_once_and_freezes_the_session() {
        let mut session = session_with_seed(7);
        session.teleport(Point::new(5, 1));
        session.apply(Intent::Move(Facing::Down)); // (5,2) holds a guardian
        assert_eq!(session.outcome(), Some(Outcome::Lost));
        let lamentations = session
            .drain_story()
            .iter()
            .filter(|l| l.contains("Tragic End"))
            .count();
        assert_eq!(lamentations, 1);

        // Terminal state: no further movement, no further ticks.
        let frozen = session.snapshot();
        session.apply(Intent::Move(Facing::Up));
        session.monster_tick();
        assert_eq!(session.snapshot(), frozen);
    }

    #[test]
    fn sage_requires_adjacency_and_caps_at_final_stage() {
        let mut session = session_with_seed(8);
        let _ = session.drain_story();

        // Same cell as the sage: excluded by the distance check.
        session.teleport(Point::new(3, 4));
        session.apply(Intent::Interact);
        assert_eq!(session.snapshot().sage_stage, 0);
        assert!(session.drain_story().is_empty());

        // Far away: nothing either.
        session.teleport(Point::new(8, 7));
        session.apply(Intent::Interact);
        assert_eq!(session.snapshot().sage_stage, 0);

        // Diagonal neighbor counts as adjacent.
        session.teleport(Point::new(2, 5));
        session.apply(Intent::Interact);
        assert_eq!(session.snapshot().sage_stage, 1);
        assert_eq!(session.objective_text(), "Collect the Crystal of Eternity.");

        for _ in 0..5 {
            session.apply(Intent::Interact);
        }
        assert_eq!(session.snapshot().sage_stage, 3);
    }

    #[test]
    fn save_then_load_round_trips_session_state() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(save::SAVE_FILE);
        let mut session =
            GameSession::with_rng(RandomNumberGenerator::seeded(9), path);

        session.apply(Intent::Move(Facing::Right));
        session.teleport(Point::new(2, 5));
        session.apply(Intent::Interact);
        session.apply(Intent::Save);
        let saved = session.snapshot();

        session.apply(Intent::Move(Facing::Down));
        session.monster_tick();
        session.apply(Intent::Load);
        assert_eq!(session.snapshot(), saved);
        assert!(
            session
                .drain_story()
                .iter()
                .any(|l| l.contains("Game loaded"))
        );
    }

    #[test]
    fn failed_load_leaves_state_untouched() {
        let mut session = session_with_seed(10);
        let before = session.snapshot();
        session.apply(Intent::Load); // nothing was ever saved at this path
        assert_eq!(session.snapshot(), before);
        assert!(
            session
                .drain_story()
                .iter()
                .any(|l| l.contains("Error loading game"))
        );
    }

    #[test]
    fn unknown_level_request_is_reported_and_ignored() {
        let mut session = session_with_seed(11);
        let before = session.snapshot();
        session.load_level(9);
        assert_eq!(session.snapshot(), before);
        assert!(
            session
                .drain_story()
                .iter()
                .any(|l| l.contains("Error loading level"))
        );
    }

    #[test]
    fn help_reports_level_and_objective() {
        let mut session = session_with_seed(12);
        let _ = session.drain_story();
        session.apply(Intent::Help);
        let story = session.drain_story();
        assert!(story.iter().any(|l| l.contains("Current Level: 1")));
        assert!(story.iter().any(|l| l.contains("Current Objective")));
    }
}
