use cgmath::{point2, Point2};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    barrier::{Barrier, Barriers},
    constants::{countdown as countdown_constants, frame},
    countdown::{CountdownConfig, CountdownRules},
    entities::{
        self, baddie::BaddieTick, power_up::Contents, Baddie, BaddieConfig, Player, PlayerConfig,
        PowerUp,
    },
    entity::{Entity, EntityClass, EntityId, IdVendor, Struck, TargetInfo},
    error::{ensure_positive, ConfigError, Result},
    event_dispatch::{Dispatcher, Message, MessageHandler},
    events::{Event, PowerUpKind},
    input::InputSnapshot,
    projectile::{Flight, Projectile, ProjectileConfig},
    projectile_box::{BoxConfig, ProjectileBox},
    vitals::HitOutcome,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub x: i32,
    pub y: i32,
}

impl SpawnPoint {
    pub fn center(&self) -> Point2<i32> {
        point2(self.x, self.y)
    }
}

impl Default for SpawnPoint {
    fn default() -> Self {
        Self {
            x: frame::WIDTH / 2,
            y: frame::HEIGHT / 2,
        }
    }
}

/// Everything needed to set up a countdown level. Loadable from RON; missing fields take
/// their defaults, which describe an empty framed play area.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub width: i32,
    pub height: i32,
    /// Barriers in addition to the frame around the play area
    pub barriers: Vec<Barrier>,
    pub player_spawn: SpawnPoint,
    pub baddie_spawn: SpawnPoint,
    pub power_up_spawn: SpawnPoint,
    pub baddie_classes: Vec<BaddieConfig>,
    /// Characters offered as power-ups. When absent, every built-in character other than the
    /// one starting the level.
    pub power_up_players: Option<Vec<String>>,
    /// Projectile types offered as weapon power-ups, with their default box settings
    pub power_up_weapons: Vec<ProjectileConfig>,
    pub heart_hp: i32,
    pub countdown: CountdownConfig,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            width: frame::WIDTH,
            height: frame::HEIGHT,
            barriers: vec![],
            player_spawn: SpawnPoint::default(),
            baddie_spawn: SpawnPoint::default(),
            power_up_spawn: SpawnPoint::default(),
            baddie_classes: vec![BaddieConfig::kreutzwald(), BaddieConfig::xor()],
            power_up_players: None,
            power_up_weapons: vec![
                ProjectileConfig::bb(),
                ProjectileConfig::slug(),
                ProjectileConfig::blaster(),
            ],
            heart_hp: countdown_constants::HEART_HP,
            countdown: CountdownConfig::default(),
        }
    }
}

impl LevelConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("level width", self.width as f64)?;
        ensure_positive("level height", self.height as f64)?;
        ensure_positive("heart hp", self.heart_hp as f64)?;
        for b in &self.barriers {
            b.validate()?;
        }
        for c in &self.baddie_classes {
            c.validate()?;
        }
        for w in &self.power_up_weapons {
            w.validate()?;
        }
        self.countdown.validate()
    }
}

// ---------------------------------------------------------------------------------------------------------------------

/// A countdown level: the player in play, the players waiting on the stack, the baddies, every
/// fired projectile, and the rules tying them together. Driven one tick at a time by
/// `update`.
pub struct Level {
    barriers: Barriers,
    projectile_barriers: Barriers,
    baddie_spawn: Point2<i32>,
    power_up_spawn: Point2<i32>,
    baddie_classes: Vec<BaddieConfig>,
    power_up_players: Vec<PlayerConfig>,
    power_up_weapons: Vec<ProjectileConfig>,
    heart_hp: i32,

    ids: IdVendor,
    rng: StdRng,
    player: Player,
    player_stack: Vec<Player>,
    baddies: Vec<Baddie>,
    baddie_projectiles: Vec<Projectile>,
    player_projectiles: Vec<Projectile>,
    power_up: Option<PowerUp>,
    countdown: CountdownRules,

    message_dispatcher: Dispatcher,
    events: Vec<Message>,
    // scratch, rebuilt for each projectile pass
    targets: Vec<TargetInfo>,
    dead: bool,
    ticks: u64,
}

impl Level {
    pub fn new(config: LevelConfig, player: &PlayerConfig, seed: u64) -> Result<Self> {
        config.validate()?;

        let mut barriers = Barriers::framed(config.width, config.height)?;
        barriers.extend(config.barriers.iter().copied());
        let projectile_barriers = barriers.for_projectiles();

        let power_up_players = match &config.power_up_players {
            Some(names) => names
                .iter()
                .map(|n| PlayerConfig::by_name(n))
                .collect::<std::result::Result<Vec<_>, _>>()?,
            None => PlayerConfig::preset_names()
                .iter()
                .filter(|n| **n != player.name)
                .map(|n| PlayerConfig::by_name(n))
                .collect::<std::result::Result<Vec<_>, _>>()?,
        };

        let mut ids = IdVendor::default();
        let player = Player::new(player, config.player_spawn.center(), &mut ids)?;
        info!(
            "Level {}x{} with {} barriers, {} plays",
            config.width,
            config.height,
            barriers.len(),
            player.name()
        );

        Ok(Self {
            barriers,
            projectile_barriers,
            baddie_spawn: config.baddie_spawn.center(),
            power_up_spawn: config.power_up_spawn.center(),
            baddie_classes: config.baddie_classes,
            power_up_players,
            power_up_weapons: config.power_up_weapons,
            heart_hp: config.heart_hp,
            ids,
            rng: StdRng::seed_from_u64(seed),
            player,
            player_stack: vec![],
            baddies: vec![],
            baddie_projectiles: vec![],
            player_projectiles: vec![],
            power_up: None,
            countdown: CountdownRules::new(config.countdown)?,
            message_dispatcher: Dispatcher::default(),
            events: vec![],
            targets: vec![],
            dead: false,
            ticks: 0,
        })
    }

    //
    // Accessors for the renderer and HUD
    //

    pub fn barriers(&self) -> &Barriers {
        &self.barriers
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Players waiting to take over when the one in play dies.
    pub fn player_stack(&self) -> &[Player] {
        &self.player_stack
    }

    pub fn baddies(&self) -> &[Baddie] {
        &self.baddies
    }

    pub fn baddie_projectiles(&self) -> &[Projectile] {
        &self.baddie_projectiles
    }

    pub fn player_projectiles(&self) -> &[Projectile] {
        &self.player_projectiles
    }

    pub fn power_up(&self) -> Option<&PowerUp> {
        self.power_up.as_ref()
    }

    pub fn countdown(&self) -> &CountdownRules {
        &self.countdown
    }

    pub fn score(&self) -> u32 {
        self.player.points()
    }

    /// The active weapon's projectile name and how many more times it can fire right now.
    pub fn ammo(&self) -> (&str, usize) {
        let weapon = self.player.weapon();
        (weapon.projectile_name(), weapon.avail_projectiles())
    }

    pub fn hurt_countdown_seconds(&self) -> Option<u32> {
        self.countdown.hurt_countdown_seconds()
    }

    /// True once the last player has died.
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Returns the notifications raised since the last call, oldest first.
    pub fn drain_events(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.events)
    }

    //
    // Simulation
    //

    /// Advances the level by one tick.
    pub fn update(&mut self, input: &InputSnapshot) -> Result<()> {
        if self.dead {
            return Ok(());
        }
        self.ticks += 1;

        self.update_baddies()?;
        self.update_baddie_projectiles();
        self.update_player(input)?;
        self.update_player_projectiles();
        self.process_messages();

        self.resolve_player_death();
        if !self.dead {
            self.update_countdown()?;
        }
        self.process_messages();
        Ok(())
    }

    /// Spawns a baddie of the named class at the baddie spawn point.
    pub fn spawn_baddie(&mut self, classname: &str) -> anyhow::Result<EntityId> {
        let baddie = entities::instantiate(
            classname,
            self.baddie_spawn,
            &self.baddie_classes,
            &mut self.ids,
            &mut self.rng,
        )?;
        Ok(self.add_baddie(baddie))
    }

    /// Puts a power-up of the given kind at the power-up spawn point, replacing any waiting
    /// one. Does nothing if the level offers nothing of that kind.
    pub fn add_power_up(&mut self, kind: PowerUpKind) -> Result<()> {
        let power_up = match kind {
            PowerUpKind::Heart => PowerUp::heart(self.power_up_spawn, self.heart_hp),
            PowerUpKind::Character => {
                let config = match self.power_up_players.choose(&mut self.rng) {
                    Some(c) => c,
                    None => return Ok(()),
                };
                PowerUp::character(Player::new(config, self.power_up_spawn, &mut self.ids)?)
            }
            PowerUpKind::Weapon => {
                let projectile = match self.power_up_weapons.choose(&mut self.rng) {
                    Some(p) => p.clone(),
                    None => return Ok(()),
                };
                // owner is updated on pickup
                let weapon = ProjectileBox::new(
                    self.ids.next_id(),
                    self.player.entity_id(),
                    EntityClass::Baddie,
                    &BoxConfig::of(projectile),
                )?;
                PowerUp::weapon(self.power_up_spawn, weapon)
            }
        };

        info!("Power-up appeared: {}", power_up.sprite_name());
        self.message_dispatcher
            .global(Event::PowerUpAppeared { kind: power_up.kind() });
        self.power_up = Some(power_up);
        Ok(())
    }

    /// Makes `player` the one in play, stacking the current one. Points carry over.
    pub fn push_player(&mut self, mut player: Player) {
        player.set_points(self.player.points());
        player.activate();
        let mut previous = std::mem::replace(&mut self.player, player);
        previous.deactivate();
        debug!(
            "{} takes over from {}",
            self.player.name(),
            previous.name()
        );
        self.player_stack.push(previous);
    }

    fn add_baddie(&mut self, baddie: Baddie) -> EntityId {
        let id = baddie.entity_id();
        debug!("Spawned {} {} at {:?}", baddie.name(), id, baddie.body().center());
        self.message_dispatcher.entity_to_global(
            id,
            Event::BaddieSpawned {
                class_name: baddie.name().to_string(),
            },
        );
        self.baddies.push(baddie);
        id
    }

    fn update_baddies(&mut self) -> Result<()> {
        let Self {
            baddies,
            barriers,
            rng,
            baddie_projectiles,
            message_dispatcher,
            ..
        } = self;

        let mut removed = false;
        for b in baddies.iter_mut() {
            if b.update(barriers, rng, baddie_projectiles, message_dispatcher)? == BaddieTick::Removed
            {
                removed = true;
            }
        }
        if removed {
            baddies.retain(|b| b.is_alive());
        }
        Ok(())
    }

    fn update_player(&mut self, input: &InputSnapshot) -> Result<()> {
        let Self {
            player,
            barriers,
            rng,
            player_projectiles,
            message_dispatcher,
            ..
        } = self;
        player.update(input, barriers, rng, player_projectiles, message_dispatcher)?;
        Ok(())
    }

    fn update_baddie_projectiles(&mut self) {
        self.targets.clear();
        if self.player.is_active() {
            self.targets.push(TargetInfo::of(&self.player));
        }

        let mut i = 0;
        while i < self.baddie_projectiles.len() {
            let flight = self.baddie_projectiles[i].update(&self.projectile_barriers, &self.targets);
            let struck = match flight {
                Flight::InFlight => {
                    i += 1;
                    continue;
                }
                Flight::HitBarrier(barrier) => Struck::Barrier(barrier),
                Flight::HitTarget(_) => {
                    let p = &self.baddie_projectiles[i];
                    let outcome = self.player.got_hit(p.damage(), p.owner().shooter);
                    if outcome != HitOutcome::Ignored {
                        self.message_dispatcher.entity_to_global(
                            self.player.entity_id(),
                            Event::PlayerHurt {
                                hp: self.player.vitals().hp(),
                            },
                        );
                    }
                    let info = TargetInfo::of(&self.player);
                    self.targets[0] = info;
                    Struck::Character(info)
                }
            };
            let p = self.baddie_projectiles.swap_remove(i);
            self.return_to_baddie(p, &struck);
        }
    }

    fn update_player_projectiles(&mut self) {
        self.targets.clear();
        self.targets
            .extend(self.baddies.iter().map(|b| TargetInfo::of(b)));

        let mut i = 0;
        while i < self.player_projectiles.len() {
            let flight = self.player_projectiles[i].update(&self.projectile_barriers, &self.targets);
            let struck = match flight {
                Flight::InFlight => {
                    i += 1;
                    continue;
                }
                Flight::HitBarrier(barrier) => Struck::Barrier(barrier),
                Flight::HitTarget(t) => {
                    let p = &self.player_projectiles[i];
                    let (damage, shooter) = (p.damage(), p.owner().shooter);
                    let baddie = &mut self.baddies[t];
                    if baddie.got_hit(damage, shooter) == HitOutcome::Killed {
                        self.message_dispatcher.entity_to_global(
                            baddie.entity_id(),
                            Event::BaddieKilled {
                                points: baddie.points(),
                            },
                        );
                    }
                    // later projectiles this pass see the hit
                    let info = TargetInfo::of(&*baddie);
                    self.targets[t] = info;
                    Struck::Character(info)
                }
            };
            let p = self.player_projectiles.swap_remove(i);
            self.return_to_player(p, &struck);
        }
    }

    /// Gives a spent projectile back to the baddie box it came from, then tells the baddie.
    fn return_to_baddie(&mut self, projectile: Projectile, struck: &Struck) {
        let handle = projectile.owner();
        match self
            .baddies
            .iter_mut()
            .find(|b| b.entity_id() == handle.shooter)
        {
            Some(b) => {
                match b.weapon_mut().filter(|w| w.id() == handle.box_id) {
                    Some(w) => w.hit_a_target(projectile),
                    None => debug!("Dropping projectile of unknown box {}", handle.box_id),
                }
                b.hit_a_target(struck);
            }
            None => debug!(
                "Dropping projectile of departed baddie {}",
                handle.shooter
            ),
        }
    }

    /// Gives a spent projectile back to the player box it came from, then tells the shooter,
    /// which may be waiting on the player stack by now.
    fn return_to_player(&mut self, projectile: Projectile, struck: &Struck) {
        let handle = projectile.owner();
        let shooter = if self.player.entity_id() == handle.shooter {
            Some(&mut self.player)
        } else {
            self.player_stack
                .iter_mut()
                .find(|p| p.entity_id() == handle.shooter)
        };
        match shooter {
            Some(shooter) => {
                match shooter.box_mut(handle.box_id) {
                    Some(b) => b.hit_a_target(projectile),
                    None => debug!("Dropping projectile of retired box {}", handle.box_id),
                }
                shooter.hit_a_target(struck);
            }
            None => debug!("Dropping projectile of departed player {}", handle.shooter),
        }
    }

    fn resolve_player_death(&mut self) {
        if !self.player.is_dead() {
            return;
        }
        match self.player_stack.pop() {
            Some(mut next) => {
                let center = self.player.body().center();
                next.set_points(self.player.points());
                next.activate();
                next.reset(center);
                let mut fallen = std::mem::replace(&mut self.player, next);
                fallen.deactivate();
                info!("{} died, {} takes over", fallen.name(), self.player.name());
                self.message_dispatcher
                    .entity_to_global(self.player.entity_id(), Event::PlayerRestored);
            }
            None => {
                self.dead = true;
                let score = self.player.points();
                info!("Game over after {} ticks, score {}", self.ticks, score);
                self.message_dispatcher.global(Event::GameOver { score });
            }
        }
    }

    fn update_countdown(&mut self) -> Result<()> {
        let waiting = self.power_up.is_some();
        if self.countdown.tick_power_up(waiting, &mut self.rng) {
            let kind = match self.rng.gen_range(0..3) {
                0 => PowerUpKind::Heart,
                1 => PowerUpKind::Character,
                _ => PowerUpKind::Weapon,
            };
            self.add_power_up(kind)?;
        }

        if self.countdown.tick_baddie_timer() {
            self.spawn_random_baddie()?;
        }
        // dying baddies don't count against the limit
        let live = self.baddies.iter().filter(|b| b.is_targetable()).count();
        self.countdown.schedule_baddie(live, &mut self.rng);

        self.collect_power_up();

        if !self.player.vitals().is_alive() {
            return Ok(());
        }
        if let Some(damage) = self.countdown.tick_hurt() {
            if self.player.hurt(damage) != HitOutcome::Ignored {
                self.message_dispatcher.entity_to_global(
                    self.player.entity_id(),
                    Event::PlayerHurt {
                        hp: self.player.vitals().hp(),
                    },
                );
            }
        }
        Ok(())
    }

    fn spawn_random_baddie(&mut self) -> Result<()> {
        let baddie = match self.baddie_classes.choose(&mut self.rng) {
            Some(config) => Baddie::new(config, self.baddie_spawn, &mut self.ids, &mut self.rng)?,
            None => return Ok(()),
        };
        self.add_baddie(baddie);
        Ok(())
    }

    fn collect_power_up(&mut self) {
        if !self.player.vitals().is_alive() {
            return;
        }
        let touching = match &self.power_up {
            Some(pu) => pu.touches(self.player.rect()),
            None => false,
        };
        if !touching {
            return;
        }
        let power_up = match self.power_up.take() {
            Some(pu) => pu,
            None => return,
        };

        let kind = power_up.kind();
        info!("Power-up caught: {}", power_up.sprite_name());
        match power_up.into_contents() {
            Contents::Heart { hp } => self.player.add_hp(hp),
            Contents::Weapon(mut weapon) => {
                // the player may have changed since the box was made
                weapon.set_owner(self.player.entity_id());
                self.player.push_box(weapon);
            }
            Contents::Character(player) => self.push_player(*player),
        }
        self.message_dispatcher.entity_to_global(
            self.player.entity_id(),
            Event::PowerUpCollected {
                kind,
                by: self.player.entity_id(),
            },
        );
    }

    fn process_messages(&mut self) {
        let messages = self.message_dispatcher.drain();
        Dispatcher::dispatch(&messages, self);
        self.events.extend(messages);
    }
}

impl MessageHandler for Level {
    fn handle_message(&mut self, message: &Message) {
        match &message.event {
            Event::BaddieKilled { points } => {
                debug!(
                    "Baddie {:?} killed, worth {}",
                    message.sender_entity_id, points
                );
                self.countdown.baddie_killed();
            }
            Event::BoxEmpty { box_id } => {
                debug!("Box {} empty", box_id);
            }
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------------------------------------------------
