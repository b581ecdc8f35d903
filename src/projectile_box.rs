use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    entity::{BoxId, EntityClass, EntityId},
    error::ConfigError,
    projectile::{BoxHandle, Projectile, ProjectileConfig},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ammo {
    Infinite,
    Limited(u32),
}

/// Everything needed to build a ProjectileBox. Fields left as `None` fall back to the
/// projectile type's defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoxConfig {
    pub projectile: ProjectileConfig,
    /// Pooled projectiles, i.e. how many may be in flight at once
    #[serde(default)]
    pub capacity: Option<usize>,
    #[serde(default)]
    pub ammo: Option<Ammo>,
    #[serde(default)]
    pub multi_shot: Option<usize>,
}

impl BoxConfig {
    /// A box using all of the projectile's defaults, as found in weapon power-ups.
    pub fn of(projectile: ProjectileConfig) -> Self {
        Self {
            projectile,
            capacity: None,
            ammo: None,
            multi_shot: None,
        }
    }

    /// A box that never runs out, as carried by characters as their default weapon.
    pub fn infinite(projectile: ProjectileConfig, capacity: usize) -> Self {
        Self {
            projectile,
            capacity: Some(capacity),
            ammo: Some(Ammo::Infinite),
            multi_shot: None,
        }
    }

    pub fn multi_shot(&self) -> usize {
        self.multi_shot.unwrap_or(self.projectile.multi_shot)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
            .unwrap_or(self.projectile.max_in_flight * self.multi_shot())
    }

    pub fn ammo(&self) -> Ammo {
        self.ammo
            .unwrap_or(Ammo::Limited(self.projectile.number_shots))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.projectile.validate()?;
        let multi_shot = self.multi_shot();
        if multi_shot == 0 {
            return Err(ConfigError::ZeroMultiShot);
        }
        let capacity = self.capacity();
        if capacity < multi_shot {
            return Err(ConfigError::CapacityTooSmall {
                capacity,
                multi_shot,
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------------------------------------------------

/// Result of `ProjectileBox::fire`. The fired projectiles were appended to the sink starting
/// at `first`; the caller is expected to `reset` them into position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FireReport {
    pub first: usize,
    pub count: usize,
    /// True exactly once, on the fire that used up the last shot of a limited box.
    pub exhausted: bool,
}

/// A fixed-capacity pool of projectiles owned by one shooter. Projectiles are built once, leave
/// the pool for the level's shared fired collection when shot, and come back after a hit.
///
/// Invariant: `unused_count() + in_flight() == capacity()`.
#[derive(Debug)]
pub struct ProjectileBox {
    id: BoxId,
    owner: EntityId,
    config: Rc<ProjectileConfig>,
    unused: Vec<Projectile>,
    in_flight: usize,
    capacity: usize,
    max_shots: Ammo,
    shots_fired: u32,
    multi_shot: usize,
}

impl ProjectileBox {
    /// # Arguments
    /// * `id` unique id of this box
    /// * `owner` the entity firing from this box
    /// * `targets` which class of character the projectiles can hit
    /// * `config` the weapon description
    pub fn new(
        id: BoxId,
        owner: EntityId,
        targets: EntityClass,
        config: &BoxConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let capacity = config.capacity();
        let projectile = Rc::new(config.projectile.clone());
        let handle = BoxHandle {
            shooter: owner,
            box_id: id,
        };

        let base = projectile.speed;
        let speeds = match projectile.speed_spread {
            Some(spread) => spread.speeds(base, capacity),
            None => vec![base; capacity],
        };
        let unused = speeds
            .into_iter()
            .map(|speed| Projectile::new(projectile.clone(), handle, targets, speed))
            .collect();

        Ok(Self {
            id,
            owner,
            config: projectile,
            unused,
            in_flight: 0,
            capacity,
            max_shots: config.ammo(),
            shots_fired: 0,
            multi_shot: config.multi_shot(),
        })
    }

    pub fn id(&self) -> BoxId {
        self.id
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    /// Hands the box to a new shooter, e.g. when a weapon power-up is picked up.
    pub fn set_owner(&mut self, owner: EntityId) {
        self.owner = owner;
        for p in self.unused.iter_mut() {
            p.set_shooter(owner);
        }
    }

    pub fn projectile_name(&self) -> &str {
        &self.config.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn unused_count(&self) -> usize {
        self.unused.len()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn shots_fired(&self) -> u32 {
        self.shots_fired
    }

    pub fn max_shots(&self) -> Ammo {
        self.max_shots
    }

    pub fn multi_shot(&self) -> usize {
        self.multi_shot
    }

    pub fn is_exhausted(&self) -> bool {
        match self.max_shots {
            Ammo::Infinite => false,
            Ammo::Limited(max) => self.shots_fired >= max,
        }
    }

    /// Number of times `fire(1)` may be called right now.
    pub fn avail_projectiles(&self) -> usize {
        let volleys = self.unused.len() / self.multi_shot;
        match self.max_shots {
            Ammo::Infinite => volleys,
            Ammo::Limited(max) => volleys.min(max.saturating_sub(self.shots_fired) as usize),
        }
    }

    /// Moves `n * multi_shot` projectiles into `sink`, the level's shared collection of fired
    /// projectiles. Callers must check `avail_projectiles()` first; over-drawing is a contract
    /// violation and only fires what the pool holds.
    pub fn fire(&mut self, n: usize, sink: &mut Vec<Projectile>) -> FireReport {
        debug_assert!(
            n <= self.avail_projectiles(),
            "box {} over-drawn: asked for {} with {} available",
            self.id,
            n,
            self.avail_projectiles()
        );

        let was_exhausted = self.is_exhausted();
        self.shots_fired = self.shots_fired.saturating_add(n as u32);

        let count = (n * self.multi_shot).min(self.unused.len());
        let first = sink.len();
        let split = self.unused.len() - count;
        sink.extend(self.unused.drain(split..));
        self.in_flight += count;

        let exhausted = !was_exhausted && self.is_exhausted();
        if exhausted {
            debug!("ProjectileBox {} empty", self.id);
        }

        FireReport {
            first,
            count,
            exhausted,
        }
    }

    /// Returns a fired projectile without it having hit anything.
    pub fn recycle(&mut self, projectile: Projectile) {
        self.take_back(projectile);
    }

    /// Returns a projectile that hit something. The caller forwards the hit to the owner.
    pub fn hit_a_target(&mut self, projectile: Projectile) {
        self.take_back(projectile);
    }

    fn take_back(&mut self, projectile: Projectile) {
        debug_assert_eq!(projectile.owner().box_id, self.id);
        debug_assert!(self.in_flight > 0);
        self.in_flight = self.in_flight.saturating_sub(1);
        self.unused.push(projectile);
    }
}

// ---------------------------------------------------------------------------------------------------------------------
