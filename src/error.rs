use thiserror::Error;

use crate::{
    barrier::BarrierKind,
    entity::{BoxId, EntityId},
};

/// Invalid tuning or layout data. These are raised while building entities and levels and
/// indicate a data error rather than something a player can trigger.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{what} must be positive, got {value}")]
    NotPositive { what: &'static str, value: f64 },

    #[error("initial_jump_velocity must be negative (upward), got {0}")]
    JumpVelocityNotUpward(f64),

    #[error("multi_shot must be at least 1")]
    ZeroMultiShot,

    #[error("a box of capacity {capacity} cannot hold a single volley of {multi_shot}")]
    CapacityTooSmall { capacity: usize, multi_shot: usize },

    #[error("{kind:?} barrier has non-positive length {length}")]
    DegenerateBarrier { kind: BarrierKind, length: i32 },

    #[error("{kind:?} is not a {expected}")]
    BarrierOrientation {
        kind: BarrierKind,
        expected: &'static str,
    },

    #[error("{what} must be between 0 and 1, got {value}")]
    NotAProbability { what: &'static str, value: f64 },

    #[error("unrecognized {what} \"{name}\"")]
    UnknownPreset { what: &'static str, name: String },
}

/// Errors surfaced by the simulation while a level is running.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("player {player} has no weapon box left to pop")]
    EmptyBoxStack { player: EntityId },

    #[error("player {player} was told box {popped} emptied, but its active box is {active}")]
    WrongBoxPopped {
        player: EntityId,
        popped: BoxId,
        active: BoxId,
    },

    #[error("box {box_id} owned by {owner} ran out of ammo and the owner has no fallback")]
    UnexpectedEmptyBox { owner: EntityId, box_id: BoxId },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) fn ensure_positive(what: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { what, value })
    }
}
