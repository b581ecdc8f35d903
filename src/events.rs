use crate::entity::{BoxId, EntityId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerUpKind {
    Heart,
    Weapon,
    Character,
}

/// An Event payload for Message
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A new baddie entered the level
    BaddieSpawned { class_name: String },

    /// Sent when a baddie's hit points reach zero. Its death animation is still to play.
    BaddieKilled { points: u32 },

    /// Sent when a baddie's death animation ends and it leaves the level
    BaddieRemoved,

    /// Sent when the player in play took damage
    PlayerHurt { hp: i32 },

    /// Sent when the player in play finished dying
    PlayerDied,

    /// Sent when a stacked player takes over after the active one died
    PlayerRestored,

    /// Sent by a shooter when its active box ran out of ammo
    BoxEmpty { box_id: BoxId },

    /// A shot blew up in the shooter's face
    ProjectileBackfired,

    PowerUpAppeared { kind: PowerUpKind },

    PowerUpCollected { kind: PowerUpKind, by: EntityId },

    /// The last player died; the level is over
    GameOver { score: u32 },
}
