pub mod components;
pub mod resources;
pub mod systems;

use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use specs::prelude::{
    Builder, Dispatcher, DispatcherBuilder, Entity, Join, World as SpecsWorld, WorldExt,
};

use crate::{
    data::LevelDefinition,
    map::{Facing, Grid},
};

use self::{
    components::{Heading, MonsterTag, PlayerTag, Position, Renderable, StepIntent},
    resources::{StoryLog, TickContext},
    systems::{MovementSystem, WanderSystem},
};

const PLAYER_GLYPH: char = '@';

/// Specs world wrapper owning the player entity and the monster list.
/// Monster entities are tracked in spawn order so saves and ticks resolve in
/// a stable, deterministic order.
pub struct EcsWorld {
    world: SpecsWorld,
    dispatcher: Dispatcher<'static, 'static>,
    player: Entity,
    monsters: Vec<Entity>,
}

impl EcsWorld {
    pub fn new(rng: RandomNumberGenerator) -> Self {
        let mut world = SpecsWorld::new();
        world.register::<Position>();
        world.register::<Heading>();
        world.register::<Renderable>();
        world.register::<StepIntent>();
        world.register::<PlayerTag>();
        world.register::<MonsterTag>();
        world.insert(rng);
        world.insert(StoryLog::default());

        let player = world
            .create_entity()
            .with(Position {
                point: Point::new(1, 1),
            })
            .with(Heading {
                facing: Facing::Down,
            })
            .with(Renderable {
                glyph: PLAYER_GLYPH as u16,
                color: bracket_terminal::prelude::RGB::from_u8(90, 140, 255),
                order: 2,
            })
            .with(PlayerTag)
            .build();

        let dispatcher = DispatcherBuilder::new()
            .with(WanderSystem::default(), "wander", &[])
            .with(MovementSystem::default(), "movement", &["wander"])
            .build();

        Self {
            world,
            dispatcher,
            player,
            monsters: Vec::new(),
        }
    }

    /// Despawns every monster, repositions the player, and spawns the given
    /// monster roster in order. Used both for fresh level loads (spawn table)
    /// and for restores (saved list).
    pub fn reset_actors(
        &mut self,
        player_point: Point,
        player_facing: Facing,
        roster: &[(Point, Facing)],
        def: &LevelDefinition,
    ) {
        for entity in self.monsters.drain(..) {
            let _ = self.world.delete_entity(entity);
        }
        self.world.maintain();

        self.set_player(player_point, player_facing);

        for &(point, facing) in roster {
            let entity = self
                .world
                .create_entity()
                .with(Position { point })
                .with(Heading { facing })
                .with(Renderable {
                    glyph: def.monster_glyph as u16,
                    color: def.monster_color,
                    order: 1,
                })
                .with(MonsterTag)
                .build();
            self.monsters.push(entity);
        }
    }

    /// Runs one monster tick against the given terrain.
    pub fn advance(&mut self, grid: &Grid) {
        let ctx = TickContext::from_grid(grid, self.player_point());
        self.world.insert(ctx);
        self.dispatcher.dispatch(&self.world);
        self.world.maintain();
    }

    pub fn player_point(&self) -> Point {
        let positions = self.world.read_component::<Position>();
        positions
            .get(self.player)
            .map(|pos| pos.point)
            .unwrap_or_else(|| Point::new(1, 1))
    }

    pub fn player_facing(&self) -> Facing {
        let headings = self.world.read_component::<Heading>();
        headings
            .get(self.player)
            .map(|h| h.facing)
            .unwrap_or(Facing::Down)
    }

    pub fn set_player(&mut self, point: Point, facing: Facing) {
        let mut positions = self.world.write_component::<Position>();
        if let Some(pos) = positions.get_mut(self.player) {
            pos.point = point;
        }
        let mut headings = self.world.write_component::<Heading>();
        if let Some(heading) = headings.get_mut(self.player) {
            heading.facing = facing;
        }
    }

    pub fn monster_at(&self, point: Point) -> bool {
        let positions = self.world.read_component::<Position>();
        let monsters = self.world.read_component::<MonsterTag>();
        (&positions, &monsters)
            .join()
            .any(|(pos, _)| pos.point == point)
    }

    /// Monster positions and facings in spawn order.
    pub fn monsters(&self) -> Vec<(Point, Facing)> {
        let positions = self.world.read_component::<Position>();
        let headings = self.world.read_component::<Heading>();
        self.monsters
            .iter()
            .filter_map(|&entity| {
                let pos = positions.get(entity)?;
                let heading = headings.get(entity)?;
                Some((pos.point, heading.facing))
            })
            .collect()
    }

    pub fn roll(&mut self, max: i32) -> i32 {
        let mut rng = self.world.write_resource::<RandomNumberGenerator>();
        rng.range(0, max)
    }

    pub fn push_story<S: Into<String>>(&mut self, entry: S) {
        self.world.write_resource::<StoryLog>().push(entry);
    }

    pub fn drain_story(&mut self) -> Vec<String> {
        let mut log = self.world.write_resource::<StoryLog>();
        std::mem::take(&mut log.entries)
    }

    pub fn each_renderable<F>(&self, mut f: F)
    where
        F: FnMut(Point, &Renderable),
    {
        let positions = self.world.read_component::<Position>();
        let renderables = self.world.read_component::<Renderable>();
        let mut drawn: Vec<(Point, &Renderable)> =
            (&positions, &renderables).join().map(|(pos, r)| (pos.point, r)).collect();
        drawn.sort_by_key(|(_, r)| r.order);
        for (point, renderable) in drawn {
            f(point, renderable);
        }
    }
}
