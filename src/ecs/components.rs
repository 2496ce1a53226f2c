use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::RGB;
use specs::prelude::{Component, NullStorage, VecStorage};

use crate::map::Facing;

#[derive(Clone, Debug)]
pub struct Position {
    pub point: Point,
}

impl Component for Position {
    type Storage = VecStorage<Self>;
}

/// Cosmetic orientation; persisted in saves, never consulted by movement.
#[derive(Clone, Debug)]
pub struct Heading {
    pub facing: Facing,
}

impl Component for Heading {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct Renderable {
    pub glyph: u16,
    pub color: RGB,
    pub order: i32,
}

impl Component for Renderable {
    type Storage = VecStorage<Self>;
}

/// Direction a monster will attempt this tick. Inserted by the wander system,
/// consumed and removed by the movement system.
#[derive(Clone, Debug)]
pub struct StepIntent {
    pub facing: Facing,
}

impl Component for StepIntent {
    type Storage = VecStorage<Self>;
}

#[derive(Default)]
pub struct PlayerTag;

impl Component for PlayerTag {
    type Storage = NullStorage<Self>;
}

#[derive(Default)]
pub struct MonsterTag;

impl Component for MonsterTag {
    type Storage = NullStorage<Self>;
}
