use std::rc::Rc;

use cgmath::{point2, vec2, Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::{
    barrier::{Barrier, Barriers},
    body::MobileBody,
    collision::{self, round_px},
    entity::{BoxId, EntityClass, EntityId, TargetInfo},
    error::{ensure_positive, ConfigError},
    geom::Rect,
};

// ---------------------------------------------------------------------------------------------------------------------

/// Gives each member of a pool a slightly different speed so a volley spreads out in flight.
/// Speeds count up from the projectile's base speed by `step`, wrapping back to the base speed
/// once they reach `wrap_at`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeedSpread {
    pub step: f64,
    pub wrap_at: f64,
}

impl SpeedSpread {
    pub fn speeds(&self, base: f64, count: usize) -> Vec<f64> {
        let mut speed = base;
        let mut speeds = Vec::with_capacity(count);
        for _ in 0..count {
            speeds.push(speed);
            speed += self.step;
            if speed >= self.wrap_at {
                speed = base;
            }
        }
        speeds
    }
}

/// Describes a projectile type and the defaults for boxes holding it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectileConfig {
    pub name: String,
    pub speed: f64,
    pub damage: i32,
    /// Hit radius; when absent it is derived from the image size
    pub radius: Option<f64>,
    pub width: i32,
    pub height: i32,
    /// Headings are rounded to a multiple of this many degrees
    pub snap_degrees: Option<f64>,
    /// Default number of volleys a box keeps in flight at once
    pub max_in_flight: usize,
    /// Default number of shots a picked-up box holds
    pub number_shots: u32,
    /// Projectiles consumed per fire
    pub multi_shot: usize,
    pub speed_spread: Option<SpeedSpread>,
}

impl ProjectileConfig {
    pub fn bb() -> Self {
        Self {
            name: "BB".to_string(),
            speed: 6.0,
            damage: 1,
            radius: Some(2.0),
            width: 4,
            height: 4,
            snap_degrees: Some(90.0),
            max_in_flight: 10,
            number_shots: 30,
            multi_shot: 1,
            speed_spread: None,
        }
    }

    pub fn slug() -> Self {
        Self {
            name: "Slug".to_string(),
            speed: 4.0,
            damage: 5,
            radius: None,
            width: 8,
            height: 8,
            snap_degrees: Some(90.0),
            max_in_flight: 5,
            number_shots: 10,
            multi_shot: 1,
            speed_spread: None,
        }
    }

    pub fn blaster() -> Self {
        Self {
            name: "Blaster".to_string(),
            speed: 15.0,
            damage: 10,
            radius: Some(8.0),
            width: 16,
            height: 6,
            snap_degrees: Some(90.0),
            max_in_flight: 1,
            number_shots: 3,
            multi_shot: 5,
            speed_spread: Some(SpeedSpread {
                step: 0.3,
                wrap_at: 16.5,
            }),
        }
    }

    pub fn by_name(name: &str) -> Result<Self, ConfigError> {
        match name {
            "BB" => Ok(Self::bb()),
            "Slug" => Ok(Self::slug()),
            "Blaster" => Ok(Self::blaster()),
            _ => Err(ConfigError::UnknownPreset {
                what: "projectile",
                name: name.to_string(),
            }),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("projectile speed", self.speed)?;
        ensure_positive("projectile width", self.width as f64)?;
        ensure_positive("projectile height", self.height as f64)?;
        ensure_positive("max_in_flight", self.max_in_flight as f64)?;
        if let Some(r) = self.radius {
            ensure_positive("projectile radius", r)?;
        }
        if let Some(snap) = self.snap_degrees {
            ensure_positive("snap_degrees", snap)?;
        }
        if let Some(spread) = self.speed_spread {
            ensure_positive("speed spread step", spread.step)?;
        }
        if self.multi_shot == 0 {
            return Err(ConfigError::ZeroMultiShot);
        }
        Ok(())
    }

    pub fn hit_radius(&self) -> f64 {
        self.radius
            .unwrap_or((self.width + self.height) as f64 / 4.0)
    }

    pub fn size(&self) -> Vector2<i32> {
        vec2(self.width, self.height)
    }
}

// ---------------------------------------------------------------------------------------------------------------------

/// Lookup-only back reference from a projectile to the box it belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BoxHandle {
    pub shooter: EntityId,
    pub box_id: BoxId,
}

/// Outcome of advancing a projectile one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Flight {
    InFlight,
    HitBarrier(Barrier),
    /// Index into the target slice passed to `update`
    HitTarget(usize),
}

/// A pooled projectile. Built once when its box is created and reused for every shot.
#[derive(Clone, Debug)]
pub struct Projectile {
    config: Rc<ProjectileConfig>,
    owner: BoxHandle,
    targets: EntityClass,
    speed: f64,
    direction: f64,
    body: MobileBody,
    has_collided: bool,
}

impl Projectile {
    pub(crate) fn new(
        config: Rc<ProjectileConfig>,
        owner: BoxHandle,
        targets: EntityClass,
        speed: f64,
    ) -> Self {
        let body = MobileBody::new(point2(0, 0), config.size(), vec2(0, 0));
        Self {
            config,
            owner,
            targets,
            speed,
            direction: 0.0,
            body,
            has_collided: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn owner(&self) -> BoxHandle {
        self.owner
    }

    pub(crate) fn set_shooter(&mut self, shooter: EntityId) {
        self.owner.shooter = shooter;
    }

    pub fn targets(&self) -> EntityClass {
        self.targets
    }

    pub fn damage(&self) -> i32 {
        self.config.damage
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn radius(&self) -> f64 {
        self.config.hit_radius()
    }

    /// Heading in degrees clockwise from +x (y points down), in [0, 360).
    pub fn direction_degrees(&self) -> f64 {
        self.direction.to_degrees()
    }

    pub fn rect(&self) -> &Rect {
        self.body.rect()
    }

    pub fn center(&self) -> Point2<i32> {
        self.body.center()
    }

    pub fn has_collided(&self) -> bool {
        self.has_collided
    }

    /// Launches the projectile from `center` heading `degrees` clockwise from +x. The rect
    /// becomes the bounding box of the image rotated to that heading.
    pub fn reset(&mut self, center: Point2<i32>, degrees: f64) {
        let degrees = match self.config.snap_degrees {
            Some(step) => (degrees / step).round() * step,
            None => degrees,
        };
        self.direction = degrees.rem_euclid(360.0).to_radians();

        let (sin, cos) = self.direction.sin_cos();
        let (w, h) = (self.config.width as f64, self.config.height as f64);
        let size = vec2(
            round_px((w * cos).abs() + (h * sin).abs()),
            round_px((w * sin).abs() + (h * cos).abs()),
        );
        self.body.reshape(center, size);
        self.has_collided = false;
    }

    /// Moves one tick. Barriers are tested first; if none is hit the projectile moves and is
    /// tested against `targets`, hitting the first one that is targetable and of the class
    /// this projectile is aimed at.
    pub fn update(&mut self, barriers: &Barriers, targets: &[TargetInfo]) -> Flight {
        let (sin, cos) = self.direction.sin_cos();
        let d = vec2(round_px(cos * self.speed), round_px(sin * self.speed));

        let r = self.body.probe(d.x as f64, d.y as f64, barriers);
        if let Some(barrier) = r.hit_x.or(r.hit_y) {
            self.has_collided = true;
            return Flight::HitBarrier(barrier);
        }

        self.body.translate(d);

        let center = self.body.center();
        let radius = self.radius();
        let hit = targets.iter().position(|t| {
            t.targetable
                && t.class == self.targets
                && collision::circles_touch(center, radius, t.center, t.radius)
        });
        match hit {
            Some(i) => {
                self.has_collided = true;
                Flight::HitTarget(i)
            }
            None => Flight::InFlight,
        }
    }
}

// ---------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod projectile_tests {
    use super::*;

    fn handle() -> BoxHandle {
        BoxHandle {
            shooter: 1000,
            box_id: 1001,
        }
    }

    fn target(id: EntityId, center: Point2<i32>, targetable: bool) -> TargetInfo {
        TargetInfo {
            id,
            class: EntityClass::Baddie,
            center,
            radius: 15.0,
            targetable,
            hp: 3,
            points: 20,
        }
    }

    #[test]
    fn presets_validate() {
        for name in &["BB", "Slug", "Blaster"] {
            let c = ProjectileConfig::by_name(name).unwrap();
            assert!(c.validate().is_ok(), "{} should validate", name);
        }
        assert!(ProjectileConfig::by_name("Rock").is_err());
        assert_eq!(ProjectileConfig::slug().hit_radius(), 4.0);
    }

    #[test]
    fn spread_wraps_back_to_base() {
        let speeds = ProjectileConfig::blaster()
            .speed_spread
            .unwrap()
            .speeds(15.0, 7);
        let expected = [15.0, 15.3, 15.6, 15.9, 16.2, 15.0, 15.3];
        for (s, e) in speeds.iter().zip(expected.iter()) {
            assert!((s - e).abs() < 1e-9, "{} != {}", s, e);
        }
    }

    #[test]
    fn reset_snaps_heading_and_rotates_bounds() {
        let mut p = Projectile::new(
            Rc::new(ProjectileConfig::blaster()),
            handle(),
            EntityClass::Baddie,
            15.0,
        );
        p.reset(point2(100, 100), 80.0);
        assert!((p.direction_degrees() - 90.0).abs() < 1e-9);
        assert_eq!(p.rect().size(), vec2(6, 16));
        assert_eq!(p.center(), point2(100, 100));

        p.reset(point2(100, 100), -90.0);
        assert!((p.direction_degrees() - 270.0).abs() < 1e-9);
        p.reset(point2(100, 100), 180.0);
        assert_eq!(p.rect().size(), vec2(16, 6));
    }

    #[test]
    fn barrier_stops_flight() {
        let barriers = Barriers::framed(100, 100).unwrap().for_projectiles();
        let mut p = Projectile::new(Rc::new(ProjectileConfig::bb()), handle(), EntityClass::Baddie, 6.0);
        p.reset(point2(50, 50), 0.0);

        let mut ticks = 0;
        let hit = loop {
            ticks += 1;
            match p.update(&barriers, &[]) {
                Flight::InFlight => assert!(ticks < 20),
                other => break other,
            }
        };
        assert!(matches!(hit, Flight::HitBarrier(b) if b.rect.left == 99));
        assert!(p.has_collided());
        assert!(p.rect().right() <= 99);
    }

    #[test]
    fn hits_first_targetable_in_reach() {
        let barriers = Barriers::framed(640, 480).unwrap().for_projectiles();
        let mut p = Projectile::new(Rc::new(ProjectileConfig::bb()), handle(), EntityClass::Baddie, 6.0);
        p.reset(point2(100, 100), 0.0);

        let targets = [
            target(1, point2(110, 100), false),
            target(2, point2(115, 100), true),
        ];
        assert_eq!(p.update(&barriers, &targets), Flight::HitTarget(1));
        assert!(p.has_collided());

        let mut player_class = targets;
        player_class[1].class = EntityClass::Player;
        p.reset(point2(100, 100), 0.0);
        assert_eq!(p.update(&barriers, &player_class), Flight::InFlight);
    }
}
