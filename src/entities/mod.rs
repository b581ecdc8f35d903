use anyhow::Result;
use cgmath::Point2;
use rand::Rng;

use crate::entity::IdVendor;

pub mod baddie;
pub mod player;
pub mod power_up;

pub use baddie::{Baddie, BaddieConfig};
pub use player::{Player, PlayerConfig};
pub use power_up::PowerUp;

/// Builds a baddie of the class named `classname`, looking its configuration up in
/// `classes`.
pub fn instantiate<R: Rng + ?Sized>(
    classname: &str,
    center: Point2<i32>,
    classes: &[BaddieConfig],
    ids: &mut IdVendor,
    rng: &mut R,
) -> Result<Baddie> {
    if let Some(config) = classes.iter().find(|c| c.name == classname) {
        Ok(Baddie::new(config, center, ids, rng)?)
    } else {
        anyhow::bail!("Unrecognized entity class \"{}\"", classname)
    }
}

// ---------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod instantiate_tests {
    use super::*;
    use crate::entity::Entity;
    use cgmath::point2;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn known_and_unknown_classes() {
        let classes = vec![BaddieConfig::xor(), BaddieConfig::kreutzwald()];
        let mut ids = IdVendor::default();
        let mut rng = StdRng::seed_from_u64(0);

        let b = instantiate("Kreutzwald", point2(490, 130), &classes, &mut ids, &mut rng).unwrap();
        assert_eq!(b.name(), "Kreutzwald");
        assert_eq!(b.body().center(), point2(490, 130));

        let err = instantiate("Gorgon", point2(0, 0), &classes, &mut ids, &mut rng).unwrap_err();
        assert_eq!(err.to_string(), "Unrecognized entity class \"Gorgon\"");
    }

    #[test]
    fn bad_config_is_reported() {
        let mut broken = BaddieConfig::kreutzwald();
        broken.speed = 0.0;
        let mut ids = IdVendor::default();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(instantiate("Kreutzwald", point2(0, 0), &[broken], &mut ids, &mut rng).is_err());
    }
}
