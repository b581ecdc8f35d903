use cgmath::Point2;

use crate::{
    constants::sizes,
    entity::Entity,
    events::PowerUpKind,
    geom::Rect,
    projectile_box::ProjectileBox,
};

use super::player::Player;

/// What a power-up gives the player who touches it.
#[derive(Debug)]
pub enum Contents {
    Heart { hp: i32 },
    /// A box of projectiles that goes on top of the player's weapon stack
    Weapon(ProjectileBox),
    /// A whole character that takes over from the player in play
    Character(Box<Player>),
}

/// A collectible waiting at the level's power-up spawn point. At most one is in play at a
/// time.
#[derive(Debug)]
pub struct PowerUp {
    rect: Rect,
    contents: Contents,
}

impl PowerUp {
    pub fn heart(center: Point2<i32>, hp: i32) -> Self {
        Self {
            rect: Rect::from_center(center, sizes::heart()),
            contents: Contents::Heart { hp },
        }
    }

    pub fn weapon(center: Point2<i32>, weapon: ProjectileBox) -> Self {
        Self {
            rect: Rect::from_center(center, sizes::box_icon()),
            contents: Contents::Weapon(weapon),
        }
    }

    /// The character waits, inactive, where it will be picked up.
    pub fn character(mut character: Player) -> Self {
        character.deactivate();
        Self {
            rect: *character.rect(),
            contents: Contents::Character(Box::new(character)),
        }
    }

    pub fn rect(&self) -> &Rect {
        &self.rect
    }

    pub fn kind(&self) -> PowerUpKind {
        match self.contents {
            Contents::Heart { .. } => PowerUpKind::Heart,
            Contents::Weapon(_) => PowerUpKind::Weapon,
            Contents::Character(_) => PowerUpKind::Character,
        }
    }

    /// Name for the renderer: "heart", the projectile type, or the character's name.
    pub fn sprite_name(&self) -> &str {
        match &self.contents {
            Contents::Heart { .. } => "heart",
            Contents::Weapon(b) => b.projectile_name(),
            Contents::Character(p) => p.name(),
        }
    }

    pub fn touches(&self, rect: &Rect) -> bool {
        self.rect.overlaps(rect)
    }

    pub fn into_contents(self) -> Contents {
        self.contents
    }
}

// ---------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod power_up_tests {
    use super::*;
    use crate::{
        entities::player::PlayerConfig,
        entity::{EntityClass, IdVendor},
        projectile::ProjectileConfig,
        projectile_box::BoxConfig,
    };
    use cgmath::point2;

    #[test]
    fn kinds_and_names() {
        let heart = PowerUp::heart(point2(87, 60), 1);
        assert_eq!(heart.kind(), PowerUpKind::Heart);
        assert_eq!(heart.rect().size(), sizes::heart());

        let mut ids = IdVendor::default();
        let blaster = ProjectileBox::new(
            ids.next_id(),
            0,
            EntityClass::Baddie,
            &BoxConfig::of(ProjectileConfig::blaster()),
        )
        .unwrap();
        let weapon = PowerUp::weapon(point2(87, 60), blaster);
        assert_eq!(weapon.kind(), PowerUpKind::Weapon);
        assert_eq!(weapon.sprite_name(), "Blaster");
    }

    #[test]
    fn character_waits_inactive() {
        let mut ids = IdVendor::default();
        let ilmar = Player::new(&PlayerConfig::ilmar(), point2(87, 60), &mut ids).unwrap();
        let pu = PowerUp::character(ilmar);
        assert_eq!(pu.kind(), PowerUpKind::Character);
        assert!(pu.touches(&Rect::new(80, 50, 10, 10)));
        assert!(!pu.touches(&Rect::new(0, 0, 10, 10)));
        match pu.into_contents() {
            Contents::Character(p) => assert!(!p.is_active()),
            other => panic!("unexpected {:?}", other),
        }
    }
}
