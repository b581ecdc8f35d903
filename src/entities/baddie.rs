use cgmath::{vec2, Point2, Vector2};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    barrier::Barriers,
    body::MobileBody,
    constants::{baddie, sizes},
    entity::{Entity, EntityClass, EntityId, IdVendor, Pose},
    error::{ensure_positive, ConfigError, Error, Result},
    event_dispatch::Dispatcher,
    events::Event,
    motion::{Wander, WanderPolicy},
    projectile::{Projectile, ProjectileConfig},
    projectile_box::{BoxConfig, ProjectileBox},
    vitals::{HitOutcome, Vitals, VitalsTimings},
};

pub const CYCLE_MOVE: &str = "move";
pub const CYCLE_DEAD: &str = "dead";

// ---------------------------------------------------------------------------------------------------------------------

/// When an armed baddie shoots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FirePattern {
    Never,
    /// Starts firing once `start_at` shots are available, then fires a ring of `volley`
    /// projectiles every tick until fewer than `stop_below` remain.
    Burst {
        volley: usize,
        start_at: usize,
        stop_below: usize,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaddieConfig {
    pub name: String,
    pub width: i32,
    pub height: i32,
    /// Shrinks the collision rect relative to the image on each axis
    pub collision_inset: i32,
    /// Hit radius; when absent it is derived from the image size
    pub radius: Option<f64>,
    pub hp: i32,
    pub points: u32,
    pub speed: f64,
    pub policy: WanderPolicy,
    pub weapon: Option<BoxConfig>,
    pub fire_pattern: FirePattern,
    pub timings: VitalsTimings,
}

impl BaddieConfig {
    /// Slow and sturdy. Moves along the axes only and sprays BBs in all four directions.
    pub fn xor() -> Self {
        let size = sizes::xor();
        Self {
            name: "XOR".to_string(),
            width: size.x,
            height: size.y,
            collision_inset: 18,
            radius: Some(15.0),
            hp: 3,
            points: 20,
            speed: 1.0,
            policy: WanderPolicy::Cardinal {
                pause_ticks: baddie::COLLISION_PAUSE_TICKS,
            },
            weapon: Some(BoxConfig::infinite(ProjectileConfig::bb(), 12)),
            fire_pattern: FirePattern::Burst {
                volley: 4,
                start_at: 12,
                stop_below: 4,
            },
            timings: VitalsTimings {
                invincibility_ticks: 0,
                hit_flash_ticks: baddie::HIT_FLASH_TICKS,
                death_ticks: 4 * baddie::TICKS_PER_FRAME,
            },
        }
    }

    /// Harmless; drifts at any angle.
    pub fn kreutzwald() -> Self {
        let size = sizes::kreutzwald();
        Self {
            name: "Kreutzwald".to_string(),
            width: size.x,
            height: size.y,
            collision_inset: 0,
            radius: None,
            hp: 1,
            points: 5,
            speed: 1.0,
            policy: WanderPolicy::FreeAngle,
            weapon: None,
            fire_pattern: FirePattern::Never,
            timings: VitalsTimings {
                invincibility_ticks: 0,
                hit_flash_ticks: baddie::HIT_FLASH_TICKS,
                death_ticks: 2 * baddie::TICKS_PER_FRAME,
            },
        }
    }

    pub fn by_name(name: &str) -> Result<Self, ConfigError> {
        match name {
            "XOR" => Ok(Self::xor()),
            "Kreutzwald" => Ok(Self::kreutzwald()),
            _ => Err(ConfigError::UnknownPreset {
                what: "baddie",
                name: name.to_string(),
            }),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("baddie width", self.width as f64)?;
        ensure_positive("baddie height", self.height as f64)?;
        ensure_positive("baddie hp", self.hp as f64)?;
        ensure_positive("baddie speed", self.speed)?;
        if let Some(r) = self.radius {
            ensure_positive("baddie radius", r)?;
        }
        if let Some(weapon) = &self.weapon {
            weapon.validate()?;
        }
        if let FirePattern::Burst { volley, .. } = self.fire_pattern {
            if volley == 0 {
                return Err(ConfigError::ZeroMultiShot);
            }
        }
        Ok(())
    }

    pub fn size(&self) -> Vector2<i32> {
        vec2(self.width, self.height)
    }
}

// ---------------------------------------------------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BaddieTick {
    /// Moved, and possibly fired
    Active,
    /// Sat out a collision pause
    Paused,
    Dying,
    /// The death animation ended this tick; the level should drop this baddie
    Removed,
    /// Already gone
    Gone,
}

/// A computer-controlled enemy that wanders the level and, if armed, shoots at the player.
#[derive(Debug)]
pub struct Baddie {
    entity_id: EntityId,
    name: String,
    body: MobileBody,
    vitals: Vitals,
    wander: Wander,
    radius: Option<f64>,
    points: u32,
    weapon: Option<ProjectileBox>,
    fire_pattern: FirePattern,
    firing: bool,
    anim_ticks: u32,
}

impl Baddie {
    pub fn new<R: Rng + ?Sized>(
        config: &BaddieConfig,
        center: Point2<i32>,
        ids: &mut IdVendor,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let entity_id = ids.next_id();
        let weapon = match &config.weapon {
            Some(box_config) => Some(ProjectileBox::new(
                ids.next_id(),
                entity_id,
                EntityClass::Player,
                box_config,
            )?),
            None => None,
        };
        let inset = config.collision_inset;

        Ok(Self {
            entity_id,
            name: config.name.clone(),
            body: MobileBody::new(center, config.size(), vec2(inset, inset)),
            vitals: Vitals::new(config.hp, config.timings),
            wander: Wander::new(config.policy, config.speed, rng),
            radius: config.radius,
            points: config.points,
            weapon,
            fire_pattern: config.fire_pattern,
            firing: false,
            anim_ticks: 0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn wander(&self) -> &Wander {
        &self.wander
    }

    pub fn is_firing(&self) -> bool {
        self.firing
    }

    pub fn weapon(&self) -> Option<&ProjectileBox> {
        self.weapon.as_ref()
    }

    pub fn weapon_mut(&mut self) -> Option<&mut ProjectileBox> {
        self.weapon.as_mut()
    }

    /// Runs one tick: vitals, then (if alive and not paused) firing, then motion. Fired
    /// projectiles are appended to `fired`, the level's collection of baddie projectiles.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        barriers: &Barriers,
        rng: &mut R,
        fired: &mut Vec<Projectile>,
        message_dispatcher: &mut Dispatcher,
    ) -> Result<BaddieTick> {
        if self.vitals.is_gone() {
            return Ok(BaddieTick::Gone);
        }
        self.anim_ticks += 1;

        if self.vitals.tick() {
            message_dispatcher.entity_to_global(self.entity_id, Event::BaddieRemoved);
            return Ok(BaddieTick::Removed);
        }
        if !self.vitals.is_alive() {
            return Ok(BaddieTick::Dying);
        }
        if self.wander.hold() {
            return Ok(BaddieTick::Paused);
        }

        self.fire(fired)?;
        self.wander.advance(&mut self.body, barriers, rng);
        Ok(BaddieTick::Active)
    }

    fn fire(&mut self, fired: &mut Vec<Projectile>) -> Result<()> {
        let (volley, start_at, stop_below) = match self.fire_pattern {
            FirePattern::Never => return Ok(()),
            FirePattern::Burst {
                volley,
                start_at,
                stop_below,
            } => (volley, start_at, stop_below),
        };
        let weapon = match self.weapon.as_mut() {
            Some(w) => w,
            None => return Ok(()),
        };

        let avail = weapon.avail_projectiles();
        if !self.firing && avail >= start_at {
            self.firing = true;
        }

        if self.firing && avail >= volley {
            let report = weapon.fire(volley, fired);
            if report.exhausted {
                return Err(Error::UnexpectedEmptyBox {
                    owner: self.entity_id,
                    box_id: weapon.id(),
                });
            }
            let center = self.body.center();
            let step = 360.0 / report.count.max(1) as f64;
            for (i, p) in fired[report.first..].iter_mut().enumerate() {
                p.reset(center, i as f64 * step);
            }
        }

        if self.firing && weapon.avail_projectiles() < stop_below {
            self.firing = false;
        }
        Ok(())
    }
}

impl Entity for Baddie {
    fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    fn entity_class(&self) -> EntityClass {
        EntityClass::Baddie
    }

    fn body(&self) -> &MobileBody {
        &self.body
    }

    fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    fn radius(&self) -> f64 {
        match self.radius {
            Some(r) => r,
            None => {
                let size = self.body.rect().size();
                (size.x + size.y) as f64 / 4.0
            }
        }
    }

    fn points(&self) -> u32 {
        self.points
    }

    fn got_hit(&mut self, damage: i32, attacker: EntityId) -> HitOutcome {
        let outcome = self.vitals.got_hit(damage);
        if outcome != HitOutcome::Ignored {
            debug!(
                "Baddie {} ({}) hit by {} for {}, hp {}",
                self.entity_id,
                self.name,
                attacker,
                damage,
                self.vitals.hp()
            );
        }
        outcome
    }

    fn sprite_name(&self) -> &str {
        &self.name
    }

    fn pose(&self) -> Pose {
        if self.vitals.is_dying() {
            Pose::new(CYCLE_DEAD, self.vitals.dying_ticks() / baddie::TICKS_PER_FRAME)
        } else {
            Pose::new(CYCLE_MOVE, self.anim_ticks / baddie::TICKS_PER_FRAME)
        }
    }
}

// ---------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod baddie_tests {
    use super::*;
    use cgmath::point2;
    use rand::{rngs::StdRng, SeedableRng};

    fn spawn(config: &BaddieConfig) -> (Baddie, StdRng, Barriers) {
        let mut rng = StdRng::seed_from_u64(3);
        let mut ids = IdVendor::default();
        let b = Baddie::new(config, point2(320, 240), &mut ids, &mut rng).unwrap();
        (b, rng, Barriers::framed(640, 480).unwrap())
    }

    #[test]
    fn presets_resolve_by_name() {
        assert_eq!(BaddieConfig::by_name("XOR").unwrap().points, 20);
        assert_eq!(BaddieConfig::by_name("Kreutzwald").unwrap().hp, 1);
        assert!(matches!(
            BaddieConfig::by_name("Grue"),
            Err(ConfigError::UnknownPreset { .. })
        ));
    }

    #[test]
    fn xor_has_a_small_collision_rect_and_hit_radius() {
        let (b, _, _) = spawn(&BaddieConfig::xor());
        assert_eq!(b.body().c_rect().size(), vec2(30, 30));
        assert_eq!(b.radius(), 15.0);
        assert_eq!(b.weapon().unwrap().owner(), b.entity_id());
    }

    #[test]
    fn xor_fires_rings_of_four_until_low() {
        let (mut b, mut rng, barriers) = spawn(&BaddieConfig::xor());
        let mut fired = vec![];
        let mut d = Dispatcher::default();

        assert_eq!(b.update(&barriers, &mut rng, &mut fired, &mut d).unwrap(), BaddieTick::Active);
        assert_eq!(fired.len(), 4);
        let mut headings: Vec<i32> = fired
            .iter()
            .map(|p| p.direction_degrees().round() as i32)
            .collect();
        headings.sort_unstable();
        assert_eq!(headings, vec![0, 90, 180, 270]);

        // 12 pooled: three rings, then the burst stops with nothing available
        for _ in 0..5 {
            b.update(&barriers, &mut rng, &mut fired, &mut d).unwrap();
        }
        assert_eq!(fired.len(), 12);
        assert!(!b.is_firing());
        assert_eq!(b.weapon().unwrap().avail_projectiles(), 0);
    }

    #[test]
    fn kreutzwald_never_fires() {
        let (mut b, mut rng, barriers) = spawn(&BaddieConfig::kreutzwald());
        let mut fired = vec![];
        let mut d = Dispatcher::default();
        for _ in 0..100 {
            b.update(&barriers, &mut rng, &mut fired, &mut d).unwrap();
        }
        assert!(fired.is_empty());
        assert!(b.weapon().is_none());
    }

    #[test]
    fn dies_then_is_removed_once() {
        let (mut b, mut rng, barriers) = spawn(&BaddieConfig::kreutzwald());
        let mut fired = vec![];
        let mut d = Dispatcher::default();

        assert_eq!(b.got_hit(1, 999), HitOutcome::Killed);
        assert!(!b.is_targetable());
        assert!(b.is_alive());
        let center = b.body().center();

        let mut ticks = 0;
        loop {
            ticks += 1;
            match b.update(&barriers, &mut rng, &mut fired, &mut d).unwrap() {
                BaddieTick::Dying => assert_eq!(b.pose().cycle, CYCLE_DEAD),
                BaddieTick::Removed => break,
                other => panic!("unexpected {:?}", other),
            }
        }
        assert_eq!(ticks, 2 * baddie::TICKS_PER_FRAME);
        assert_eq!(b.body().center(), center);
        assert!(!b.is_alive());
        assert_eq!(
            b.update(&barriers, &mut rng, &mut fired, &mut d).unwrap(),
            BaddieTick::Gone
        );

        let messages = d.drain();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].event, Event::BaddieRemoved);
        assert_eq!(messages[0].sender_entity_id, Some(b.entity_id()));
    }
}
