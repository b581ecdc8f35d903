use cgmath::Point2;
use serde::{Deserialize, Serialize};

use crate::{
    barrier::Barrier,
    body::MobileBody,
    geom::Rect,
    vitals::{HitOutcome, Vitals},
};

pub type EntityId = u32;
pub type BoxId = u32;

// ---------------------------------------------------------------------------------------------------------------------

/// IdVendor vends a new unique id, starting from 1000, for each entity and projectile box.
pub struct IdVendor {
    current_id: u32,
}

impl Default for IdVendor {
    fn default() -> Self {
        IdVendor {
            current_id: 1000u32,
        }
    }
}

impl IdVendor {
    pub fn next_id(&mut self) -> u32 {
        let r = self.current_id;
        self.current_id += 1;
        r
    }
}

// ---------------------------------------------------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityClass {
    Player,
    Baddie,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    East,
    West,
}

impl Direction {
    pub fn invert(&self) -> Direction {
        match self {
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gaze {
    Up,
    Straight,
    Down,
}

/// Opaque selector the renderer maps to an image. `cycle` is one of the entity's
/// CYCLE_* names, `frame` counts up while the cycle plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pose {
    pub cycle: &'static str,
    pub facing: Direction,
    pub gaze: Gaze,
    pub frame: u32,
}

impl Pose {
    pub fn new(cycle: &'static str, frame: u32) -> Self {
        Self {
            cycle,
            facing: Direction::East,
            gaze: Gaze::Straight,
            frame,
        }
    }
}

// ---------------------------------------------------------------------------------------------------------------------

/// A read-only snapshot of a character, taken once per projectile pass so projectiles can
/// test hits without borrowing the character itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetInfo {
    pub id: EntityId,
    pub class: EntityClass,
    pub center: Point2<i32>,
    pub radius: f64,
    pub targetable: bool,
    pub hp: i32,
    pub points: u32,
}

impl TargetInfo {
    pub fn of(entity: &dyn Entity) -> Self {
        Self {
            id: entity.entity_id(),
            class: entity.entity_class(),
            center: entity.body().center(),
            radius: entity.radius(),
            targetable: entity.is_targetable(),
            hp: entity.vitals().hp(),
            points: entity.points(),
        }
    }
}

/// What one of an entity's projectiles ran into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Struck {
    Barrier(Barrier),
    Character(TargetInfo),
}

// ---------------------------------------------------------------------------------------------------------------------

/// The capabilities the level relies on from every character.
pub trait Entity {
    /// The unique id for this Entity
    fn entity_id(&self) -> EntityId;

    /// The class represented by this Entity
    fn entity_class(&self) -> EntityClass;

    fn body(&self) -> &MobileBody;

    fn vitals(&self) -> &Vitals;

    /// Radius used for projectile hit tests.
    fn radius(&self) -> f64 {
        let size = self.body().rect().size();
        (size.x + size.y) as f64 / 4.0
    }

    /// Points awarded for killing this entity.
    fn points(&self) -> u32 {
        0
    }

    /// An entity should return true here so long as it needs to be updated and drawn.
    fn is_alive(&self) -> bool {
        !self.vitals().is_gone()
    }

    /// True if projectiles may hit this entity right now.
    fn is_targetable(&self) -> bool {
        self.vitals().is_alive()
    }

    fn rect(&self) -> &Rect {
        self.body().rect()
    }

    /// Called when a projectile fired by `attacker` hits this entity.
    fn got_hit(&mut self, damage: i32, attacker: EntityId) -> HitOutcome;

    /// Called on the shooter after one of its projectiles hit something and was returned
    /// to its box.
    fn hit_a_target(&mut self, _struck: &Struck) {}

    /// The name identifying the entity's images, e.g. "fred" or "xor".
    fn sprite_name(&self) -> &str {
        ""
    }

    fn pose(&self) -> Pose;
}

// ---------------------------------------------------------------------------------------------------------------------
