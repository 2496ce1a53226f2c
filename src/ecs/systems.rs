use std::collections::HashSet;

use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use specs::prelude::*;

use super::{
    components::{Heading, MonsterTag, Position, StepIntent},
    resources::TickContext,
};
use crate::map::HEADINGS;

/// Rolls one uniformly random direction per monster. No validity check here;
/// a rejected direction simply means the monster stands still this tick.
#[derive(Default)]
pub struct WanderSystem;

impl<'a> System<'a> for WanderSystem {
    type SystemData = (
        Entities<'a>,
        ReadStorage<'a, MonsterTag>,
        WriteStorage<'a, StepIntent>,
        WriteExpect<'a, RandomNumberGenerator>,
    );

    fn run(&mut self, (entities, monsters, mut intents, mut rng): Self::SystemData) {
        for (entity, _) in (&entities, &monsters).join() {
            let facing = HEADINGS[rng.range(0, HEADINGS.len() as i32) as usize];
            let _ = intents.insert(entity, StepIntent { facing });
        }
    }
}

/// Commits monster step intents in entity order against a progressively
/// updated occupancy set: monsters resolved earlier in the tick already hold
/// their new cells when later ones are validated. The player position is the
/// pre-tick snapshot from the context; player input never interleaves with a
/// monster tick.
#[derive(Default)]
pub struct MovementSystem;

impl<'a> System<'a> for MovementSystem {
    type SystemData = (
        Entities<'a>,
        WriteStorage<'a, Position>,
        WriteStorage<'a, Heading>,
        WriteStorage<'a, StepIntent>,
        ReadStorage<'a, MonsterTag>,
        ReadExpect<'a, TickContext>,
    );

    fn run(
        &mut self,
        (entities, mut positions, mut headings, mut intents, monsters, ctx): Self::SystemData,
    ) {
        let mut occupied: HashSet<Point> = {
            let positions_ref: &WriteStorage<Position> = &positions;
            (positions_ref, &monsters)
                .join()
                .map(|(pos, _)| pos.point)
                .collect()
        };

        let mut to_clear = Vec::new();
        for (entity, pos, heading, intent, _) in (
            &entities,
            &mut positions,
            &mut headings,
            &intents,
            &monsters,
        )
            .join()
        {
            let delta = intent.facing.delta();
            let target = Point::new(pos.point.x + delta.x, pos.point.y + delta.y);
            if ctx.open_for_monster(target)
                && target != ctx.player_point
                && !occupied.contains(&target)
            {
                let _ = occupied.remove(&pos.point);
                pos.point = target;
                heading.facing = intent.facing;
                let _ = occupied.insert(target);
            }
            to_clear.push(entity);
        }

        for entity in to_clear {
            intents.remove(entity);
        }
    }
}
