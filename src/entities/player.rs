use cgmath::{vec2, Point2, Vector2};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    barrier::Barriers,
    body::MobileBody,
    character_controller::{CharacterController, MotionConfig},
    constants::{player, sizes},
    entity::{BoxId, Direction, Entity, EntityClass, EntityId, Gaze, IdVendor, Pose, Struck},
    error::{ensure_positive, ConfigError, Error, Result},
    event_dispatch::Dispatcher,
    events::Event,
    input::{ButtonState, InputSnapshot},
    projectile::{Projectile, ProjectileConfig},
    projectile_box::{BoxConfig, ProjectileBox},
    vitals::{HitOutcome, Vitals, VitalsTimings},
};

pub const CYCLE_STAND: &str = "stand";
pub const CYCLE_WALK: &str = "walk";
pub const CYCLE_FLY: &str = "fly";
pub const CYCLE_DEAD: &str = "dead";

// ---------------------------------------------------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub name: String,
    pub width: i32,
    pub height: i32,
    /// The collision rect is this much narrower than the image
    pub collision_width_inset: i32,
    pub hp: i32,
    pub motion: MotionConfig,
    /// The default weapon, at the bottom of the weapon stack
    pub weapon: BoxConfig,
    pub immune_to_projectiles: bool,
    pub can_aim_down: bool,
    /// One shot in this many blows up in the player's face
    pub backfire_one_in: Option<u32>,
    pub timings: VitalsTimings,
    pub respawn_invincibility_ticks: u32,
}

impl PlayerConfig {
    pub fn fred() -> Self {
        let size = sizes::fred();
        Self {
            name: "Fred".to_string(),
            width: size.x,
            height: size.y,
            collision_width_inset: 8,
            hp: 20,
            motion: MotionConfig {
                horizontal_speed: 4.0,
                horizontal_inertia: 20.0,
                multi_jump_limit: 2,
                vertical_acceleration: 0.2,
                initial_jump_velocity: -5.0,
            },
            weapon: BoxConfig::infinite(ProjectileConfig::bb(), 10),
            immune_to_projectiles: false,
            can_aim_down: true,
            backfire_one_in: None,
            timings: VitalsTimings {
                invincibility_ticks: player::INVINCIBILITY_TICKS,
                hit_flash_ticks: player::HIT_FLASH_TICKS,
                death_ticks: player::DEATH_TICKS,
            },
            respawn_invincibility_ticks: player::RESPAWN_INVINCIBILITY_TICKS,
        }
    }

    /// A slow tank that projectiles can't hurt, but whose slugs sometimes go off in the
    /// barrel.
    pub fn ilmar() -> Self {
        let size = sizes::ilmar();
        Self {
            name: "Ilmar".to_string(),
            width: size.x,
            height: size.y,
            collision_width_inset: 0,
            hp: 1,
            motion: MotionConfig {
                horizontal_speed: 3.0,
                horizontal_inertia: 40.0,
                multi_jump_limit: 1,
                vertical_acceleration: 0.1,
                initial_jump_velocity: -5.0,
            },
            weapon: BoxConfig::infinite(ProjectileConfig::slug(), 5),
            immune_to_projectiles: true,
            can_aim_down: false,
            backfire_one_in: Some(10),
            timings: VitalsTimings {
                invincibility_ticks: player::INVINCIBILITY_TICKS,
                hit_flash_ticks: player::HIT_FLASH_TICKS,
                death_ticks: player::DEATH_TICKS,
            },
            respawn_invincibility_ticks: 0,
        }
    }

    pub fn by_name(name: &str) -> Result<Self, ConfigError> {
        match name {
            "Fred" => Ok(Self::fred()),
            "Ilmar" => Ok(Self::ilmar()),
            _ => Err(ConfigError::UnknownPreset {
                what: "player",
                name: name.to_string(),
            }),
        }
    }

    /// Names of the built-in players, in a stable order.
    pub fn preset_names() -> &'static [&'static str] {
        &["Fred", "Ilmar"]
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("player width", self.width as f64)?;
        ensure_positive("player height", self.height as f64)?;
        ensure_positive("player hp", self.hp as f64)?;
        if let Some(n) = self.backfire_one_in {
            ensure_positive("backfire_one_in", n as f64)?;
        }
        self.motion.validate()?;
        self.weapon.validate()
    }

    pub fn size(&self) -> Vector2<i32> {
        vec2(self.width, self.height)
    }
}

// ---------------------------------------------------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerTick {
    /// Not in play, e.g. waiting on the player stack
    Inactive,
    Active,
    Dying,
    /// The death animation ended this tick
    Died,
    /// Already dead
    Dead,
}

/// The user-controlled character. Owns its weapon stack: the active box plus the boxes
/// waiting underneath it, the bottom one being the character's infinite default weapon.
#[derive(Debug)]
pub struct Player {
    entity_id: EntityId,
    name: String,
    body: MobileBody,
    vitals: Vitals,
    controller: CharacterController,
    weapon: ProjectileBox,
    box_stack: Vec<ProjectileBox>,
    fire_button: ButtonState,
    immune_to_projectiles: bool,
    can_aim_down: bool,
    backfire_one_in: Option<u32>,
    respawn_invincibility_ticks: u32,
    points: u32,
    anim_ticks: u32,
}

impl Player {
    pub fn new(
        config: &PlayerConfig,
        center: Point2<i32>,
        ids: &mut IdVendor,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let entity_id = ids.next_id();
        let weapon = ProjectileBox::new(
            ids.next_id(),
            entity_id,
            EntityClass::Baddie,
            &config.weapon,
        )?;

        Ok(Self {
            entity_id,
            name: config.name.clone(),
            body: MobileBody::new(center, config.size(), vec2(config.collision_width_inset, 0)),
            vitals: Vitals::new(config.hp, config.timings),
            controller: CharacterController::new(config.motion)?,
            weapon,
            box_stack: vec![],
            // a fire key held at spawn must be released first
            fire_button: ButtonState::Down,
            immune_to_projectiles: config.immune_to_projectiles,
            can_aim_down: config.can_aim_down,
            backfire_one_in: config.backfire_one_in,
            respawn_invincibility_ticks: config.respawn_invincibility_ticks,
            points: 0,
            anim_ticks: 0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn controller(&self) -> &CharacterController {
        &self.controller
    }

    pub fn set_points(&mut self, points: u32) {
        self.points = points;
    }

    /// The box the next shot comes from.
    pub fn weapon(&self) -> &ProjectileBox {
        &self.weapon
    }

    /// Number of boxes waiting under the active one.
    pub fn stacked_boxes(&self) -> usize {
        self.box_stack.len()
    }

    /// Finds one of this player's boxes, active or stacked.
    pub fn box_mut(&mut self, box_id: BoxId) -> Option<&mut ProjectileBox> {
        if self.weapon.id() == box_id {
            return Some(&mut self.weapon);
        }
        self.box_stack.iter_mut().find(|b| b.id() == box_id)
    }

    pub fn is_active(&self) -> bool {
        self.vitals.is_active()
    }

    pub fn activate(&mut self) {
        self.vitals.activate();
    }

    pub fn deactivate(&mut self) {
        self.vitals.deactivate();
    }

    /// True once the death animation has finished.
    pub fn is_dead(&self) -> bool {
        self.vitals.is_gone()
    }

    /// Moves the player to `center` and stops it, granting the respawn invincibility.
    pub fn reset(&mut self, center: Point2<i32>) {
        self.body.set_center(center);
        self.controller.reset();
        self.vitals.set_invincible(self.respawn_invincibility_ticks);
    }

    /// Damage from something other than a projectile. Lands even on a player immune to
    /// projectiles.
    pub fn hurt(&mut self, damage: i32) -> HitOutcome {
        let outcome = self.vitals.hurt(damage);
        if outcome != HitOutcome::Ignored {
            info!("Player {} hurt, hp {}", self.name, self.vitals.hp());
        }
        outcome
    }

    pub fn add_hp(&mut self, hp: i32) {
        self.vitals.add_hp(hp);
    }

    /// Makes `weapon` the active box, stacking the current one underneath it.
    pub fn push_box(&mut self, weapon: ProjectileBox) {
        let previous = std::mem::replace(&mut self.weapon, weapon);
        self.box_stack.push(previous);
    }

    /// Called when `box_id` ran out of ammo. The next box down the stack becomes active.
    pub fn box_empty(&mut self, box_id: BoxId) -> Result<()> {
        if self.weapon.id() != box_id {
            return Err(Error::WrongBoxPopped {
                player: self.entity_id,
                popped: box_id,
                active: self.weapon.id(),
            });
        }
        match self.box_stack.pop() {
            Some(next) => {
                debug!(
                    "Player {} dropped empty {} box {}",
                    self.entity_id,
                    self.weapon.projectile_name(),
                    box_id
                );
                // the empty box may still have projectiles in flight; they are dropped
                // when they come back
                self.weapon = next;
                Ok(())
            }
            None => Err(Error::EmptyBoxStack {
                player: self.entity_id,
            }),
        }
    }

    /// Runs one tick. Fired projectiles are appended to `fired`, the level's collection of
    /// player projectiles.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        input: &InputSnapshot,
        barriers: &Barriers,
        rng: &mut R,
        fired: &mut Vec<Projectile>,
        message_dispatcher: &mut Dispatcher,
    ) -> Result<PlayerTick> {
        if !self.vitals.is_active() {
            return Ok(PlayerTick::Inactive);
        }
        if self.vitals.is_gone() {
            return Ok(PlayerTick::Dead);
        }
        if self.vitals.is_dying() {
            if self.vitals.tick() {
                message_dispatcher.entity_to_global(self.entity_id, Event::PlayerDied);
                return Ok(PlayerTick::Died);
            }
            return Ok(PlayerTick::Dying);
        }

        self.fire_button = self.fire_button.transition(input.fire);
        if self.fire_button.was_pressed() {
            self.fire(rng, fired, message_dispatcher)?;
        }

        // a backfire kills without moving
        if !self.vitals.is_alive() {
            return Ok(PlayerTick::Dying);
        }

        let moved = self.controller.update(input, &mut self.body, barriers);
        if moved.x != 0 {
            self.anim_ticks += 1;
        } else {
            self.anim_ticks = 0;
        }
        self.vitals.tick();
        Ok(PlayerTick::Active)
    }

    fn fire<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        fired: &mut Vec<Projectile>,
        message_dispatcher: &mut Dispatcher,
    ) -> Result<()> {
        if self.weapon.avail_projectiles() == 0 || !self.vitals.is_alive() {
            return Ok(());
        }

        let report = self.weapon.fire(1, fired);

        let backfired = match self.backfire_one_in {
            Some(n) => rng.gen_range(0..n) == 0,
            None => false,
        };
        if backfired {
            warn!("Projectile backfired");
            for p in fired.drain(report.first..report.first + report.count) {
                self.weapon.recycle(p);
            }
            self.vitals.kill();
            message_dispatcher.entity_to_global(self.entity_id, Event::ProjectileBackfired);
        } else {
            let direction = self.aim_degrees();
            let center = self.body.center();
            for p in fired[report.first..].iter_mut() {
                p.reset(center, direction);
            }
        }

        if report.exhausted {
            let box_id = self.weapon.id();
            message_dispatcher.entity_to_global(self.entity_id, Event::BoxEmpty { box_id });
            self.box_empty(box_id)?;
        }
        Ok(())
    }

    /// Firing heading in degrees clockwise from +x.
    pub fn aim_degrees(&self) -> f64 {
        match self.controller.gaze() {
            Gaze::Up => 270.0,
            Gaze::Down if self.can_aim_down => 90.0,
            _ => match self.controller.facing() {
                Direction::West => 180.0,
                Direction::East => 0.0,
            },
        }
    }
}

impl Entity for Player {
    fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    fn entity_class(&self) -> EntityClass {
        EntityClass::Player
    }

    fn body(&self) -> &MobileBody {
        &self.body
    }

    fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    fn points(&self) -> u32 {
        self.points
    }

    fn got_hit(&mut self, damage: i32, attacker: EntityId) -> HitOutcome {
        if self.immune_to_projectiles {
            return HitOutcome::Ignored;
        }
        let outcome = self.vitals.got_hit(damage);
        if outcome != HitOutcome::Ignored {
            info!(
                "Character hit by {}, {} hp left",
                attacker,
                self.vitals.hp()
            );
        }
        outcome
    }

    fn hit_a_target(&mut self, struck: &Struck) {
        if let Struck::Character(target) = struck {
            if target.class == EntityClass::Baddie && target.hp <= 0 {
                self.points += target.points;
            }
        }
    }

    fn sprite_name(&self) -> &str {
        &self.name
    }

    fn pose(&self) -> Pose {
        let (cycle, frame) = if self.vitals.is_dying() || self.vitals.is_gone() {
            (CYCLE_DEAD, self.vitals.dying_ticks() / player::TICKS_PER_FRAME)
        } else if !self.controller.is_grounded() {
            (CYCLE_FLY, 0)
        } else if self.controller.momentum() != 0.0 {
            (CYCLE_WALK, self.anim_ticks / player::TICKS_PER_FRAME)
        } else {
            (CYCLE_STAND, 0)
        };
        let gaze = match self.controller.gaze() {
            Gaze::Down if !self.can_aim_down => Gaze::Straight,
            g => g,
        };
        Pose {
            cycle,
            facing: self.controller.facing(),
            gaze,
            frame,
        }
    }
}

// ---------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod player_tests {
    use super::*;
    use crate::{entity::TargetInfo, projectile_box::Ammo};
    use cgmath::point2;
    use rand::{rngs::StdRng, SeedableRng};

    fn spawn(config: &PlayerConfig) -> (Player, IdVendor, Barriers, StdRng) {
        let mut ids = IdVendor::default();
        // bottom of the collision rect rests on the frame floor
        let p = Player::new(config, point2(320, 463), &mut ids).unwrap();
        (p, ids, Barriers::framed(640, 480).unwrap(), StdRng::seed_from_u64(5))
    }

    fn tap_fire(
        p: &mut Player,
        barriers: &Barriers,
        rng: &mut StdRng,
        fired: &mut Vec<Projectile>,
        d: &mut Dispatcher,
    ) {
        let idle = InputSnapshot::none();
        let fire = InputSnapshot {
            fire: true,
            ..InputSnapshot::none()
        };
        p.update(&idle, barriers, rng, fired, d).unwrap();
        p.update(&fire, barriers, rng, fired, d).unwrap();
    }

    fn limited_box(ids: &mut IdVendor, owner: EntityId, shots: u32) -> ProjectileBox {
        let config = BoxConfig {
            projectile: ProjectileConfig::slug(),
            capacity: Some(5),
            ammo: Some(Ammo::Limited(shots)),
            multi_shot: None,
        };
        ProjectileBox::new(ids.next_id(), owner, EntityClass::Baddie, &config).unwrap()
    }

    #[test]
    fn presets_validate() {
        for name in PlayerConfig::preset_names() {
            assert!(PlayerConfig::by_name(name).unwrap().validate().is_ok());
        }
        assert!(PlayerConfig::by_name("Zed").is_err());
        let (p, _, _, _) = spawn(&PlayerConfig::fred());
        assert_eq!(p.body().c_rect().size(), vec2(16, 32));
    }

    #[test]
    fn fire_is_edge_triggered_and_aimed() {
        let (mut p, _, barriers, mut rng) = spawn(&PlayerConfig::fred());
        let mut fired = vec![];
        let mut d = Dispatcher::default();

        let held = InputSnapshot {
            fire: true,
            ..InputSnapshot::none()
        };
        // held since spawn: nothing happens until released
        p.update(&held, &barriers, &mut rng, &mut fired, &mut d).unwrap();
        assert!(fired.is_empty());

        tap_fire(&mut p, &barriers, &mut rng, &mut fired, &mut d);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].direction_degrees().round() as i32, 0);
        p.update(&held, &barriers, &mut rng, &mut fired, &mut d).unwrap();
        assert_eq!(fired.len(), 1);

        // aim is taken from the previous tick's keys
        let up = InputSnapshot {
            up: true,
            ..InputSnapshot::none()
        };
        let up_fire = InputSnapshot { fire: true, ..up };
        p.update(&up, &barriers, &mut rng, &mut fired, &mut d).unwrap();
        p.update(&up_fire, &barriers, &mut rng, &mut fired, &mut d).unwrap();
        assert_eq!(fired[1].direction_degrees().round() as i32, 270);
        assert_eq!(p.weapon().in_flight(), 2);
    }

    #[test]
    fn ilmar_cannot_aim_down() {
        let (mut p, _, barriers, mut rng) = spawn(&PlayerConfig::ilmar());
        let mut fired = vec![];
        let mut d = Dispatcher::default();
        let down_left = InputSnapshot {
            down: true,
            left: true,
            ..InputSnapshot::none()
        };
        p.update(&down_left, &barriers, &mut rng, &mut fired, &mut d).unwrap();
        assert_eq!(p.aim_degrees(), 180.0);
        assert_eq!(p.pose().gaze, Gaze::Straight);
    }

    #[test]
    fn backfire_recycles_and_kills() {
        let mut config = PlayerConfig::ilmar();
        config.backfire_one_in = Some(1);
        let (mut p, _, barriers, mut rng) = spawn(&config);
        let mut fired = vec![];
        let mut d = Dispatcher::default();

        tap_fire(&mut p, &barriers, &mut rng, &mut fired, &mut d);
        assert!(fired.is_empty());
        assert_eq!(p.weapon().unused_count(), p.weapon().capacity());
        assert!(p.vitals().is_dying());
        assert!(d
            .drain()
            .iter()
            .any(|m| m.event == Event::ProjectileBackfired));
    }

    #[test]
    fn ilmar_shrugs_off_projectiles_but_not_hurt() {
        let (mut p, _, _, _) = spawn(&PlayerConfig::ilmar());
        assert_eq!(p.got_hit(50, 1), HitOutcome::Ignored);
        assert_eq!(p.hurt(1), HitOutcome::Killed);
    }

    #[test]
    fn exhausted_box_pops_to_default() {
        let (mut p, mut ids, barriers, mut rng) = spawn(&PlayerConfig::fred());
        let mut fired = vec![];
        let mut d = Dispatcher::default();
        let default_id = p.weapon().id();

        let slugs = limited_box(&mut ids, p.entity_id(), 2);
        let slug_id = slugs.id();
        p.push_box(slugs);
        assert_eq!(p.weapon().projectile_name(), "Slug");
        assert_eq!(p.stacked_boxes(), 1);

        tap_fire(&mut p, &barriers, &mut rng, &mut fired, &mut d);
        assert_eq!(p.weapon().id(), slug_id);
        tap_fire(&mut p, &barriers, &mut rng, &mut fired, &mut d);
        assert_eq!(p.weapon().id(), default_id);
        assert_eq!(fired.len(), 2);
        assert!(d
            .drain()
            .iter()
            .any(|m| m.event == Event::BoxEmpty { box_id: slug_id }));

        // the retired box can't be found any more
        assert!(p.box_mut(slug_id).is_none());
        assert!(p.box_mut(default_id).is_some());
    }

    #[test]
    fn weapon_stack_errors() {
        let (mut p, mut ids, _, _) = spawn(&PlayerConfig::fred());
        let default_id = p.weapon().id();
        assert!(matches!(
            p.box_empty(default_id),
            Err(Error::EmptyBoxStack { .. })
        ));
        p.push_box(limited_box(&mut ids, p.entity_id(), 3));
        assert!(matches!(
            p.box_empty(default_id),
            Err(Error::WrongBoxPopped { .. })
        ));
    }

    #[test]
    fn kill_attribution_needs_a_dead_baddie() {
        let (mut p, _, _, _) = spawn(&PlayerConfig::fred());
        let mut t = TargetInfo {
            id: 2000,
            class: EntityClass::Baddie,
            center: point2(0, 0),
            radius: 15.0,
            targetable: false,
            hp: 1,
            points: 20,
        };
        p.hit_a_target(&Struck::Character(t));
        assert_eq!(p.points(), 0);
        t.hp = 0;
        p.hit_a_target(&Struck::Character(t));
        assert_eq!(p.points(), 20);
        t.class = EntityClass::Player;
        p.hit_a_target(&Struck::Character(t));
        assert_eq!(p.points(), 20);
    }

    #[test]
    fn dies_after_animation() {
        let (mut p, _, barriers, mut rng) = spawn(&PlayerConfig::fred());
        let mut fired = vec![];
        let mut d = Dispatcher::default();
        assert_eq!(p.hurt(20), HitOutcome::Killed);

        let mut ticks = 0;
        while p.update(&InputSnapshot::none(), &barriers, &mut rng, &mut fired, &mut d).unwrap()
            == PlayerTick::Dying
        {
            ticks += 1;
            assert_eq!(p.pose().cycle, CYCLE_DEAD);
        }
        assert_eq!(ticks, player::DEATH_TICKS - 1);
        assert!(p.is_dead());
        assert_eq!(d.drain()[0].event, Event::PlayerDied);
    }

    #[test]
    fn reset_grants_respawn_invincibility() {
        let (mut p, _, _, _) = spawn(&PlayerConfig::fred());
        p.reset(point2(100, 100));
        assert_eq!(p.body().center(), point2(100, 100));
        assert_eq!(p.got_hit(1, 7), HitOutcome::Ignored);
        assert!(p.vitals().is_invincible());
    }
}
