use serde::{Deserialize, Serialize};
use tracing::debug;

/// Tick counts driving a character's damage state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VitalsTimings {
    /// After a non-lethal hit, further hits are ignored for this long
    pub invincibility_ticks: u32,
    /// Purely visual; shorter than the invincibility window
    pub hit_flash_ticks: u32,
    /// Length of the death animation
    pub death_ticks: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifeStage {
    Alive,
    Dying { ticks_remaining: u32 },
    Gone,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitOutcome {
    Ignored,
    Hurt,
    Killed,
}

/// Hit points, invincibility and the Alive -> Dying -> Gone lifecycle of a character.
#[derive(Clone, Debug, PartialEq)]
pub struct Vitals {
    hp: i32,
    max_hp: i32,
    stage: LifeStage,
    active: bool,
    invincible: u32,
    hit_flash: u32,
    timings: VitalsTimings,
}

impl Vitals {
    pub fn new(hp: i32, timings: VitalsTimings) -> Self {
        Self {
            hp,
            max_hp: hp,
            stage: LifeStage::Alive,
            active: true,
            invincible: 0,
            hit_flash: 0,
            timings,
        }
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn max_hp(&self) -> i32 {
        self.max_hp
    }

    pub fn stage(&self) -> LifeStage {
        self.stage
    }

    pub fn timings(&self) -> &VitalsTimings {
        &self.timings
    }

    /// Active and not dying: can move, shoot, and be hit.
    pub fn is_alive(&self) -> bool {
        self.active && self.stage == LifeStage::Alive
    }

    pub fn is_dying(&self) -> bool {
        matches!(self.stage, LifeStage::Dying { .. })
    }

    pub fn is_gone(&self) -> bool {
        self.stage == LifeStage::Gone
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible > 0
    }

    pub fn is_flashing(&self) -> bool {
        self.hit_flash > 0
    }

    pub fn set_invincible(&mut self, ticks: u32) {
        self.invincible = ticks;
    }

    /// Number of ticks spent in the death animation so far.
    pub fn dying_ticks(&self) -> u32 {
        match self.stage {
            LifeStage::Dying { ticks_remaining } => {
                self.timings.death_ticks.saturating_sub(ticks_remaining)
            }
            _ => 0,
        }
    }

    /// Damage from a projectile. Ignored while inactive, dying, or invincible.
    pub fn got_hit(&mut self, damage: i32) -> HitOutcome {
        if !self.is_alive() || self.is_invincible() {
            return HitOutcome::Ignored;
        }
        self.apply_damage(damage)
    }

    /// Damage from something other than a projectile (e.g. a countdown running out). This
    /// lands even while invincible.
    pub fn hurt(&mut self, damage: i32) -> HitOutcome {
        if !self.is_alive() {
            return HitOutcome::Ignored;
        }
        self.apply_damage(damage)
    }

    /// Skips straight to the death animation.
    pub fn kill(&mut self) {
        if self.stage == LifeStage::Alive {
            self.hp = self.hp.min(0);
            self.start_dying();
        }
    }

    pub fn add_hp(&mut self, hp: i32) {
        if self.stage == LifeStage::Alive {
            self.hp = (self.hp + hp).min(self.max_hp);
        }
    }

    /// Advances the counters by one tick. Returns true on the tick the death animation ends.
    pub fn tick(&mut self) -> bool {
        match self.stage {
            LifeStage::Alive => {
                self.invincible = self.invincible.saturating_sub(1);
                self.hit_flash = self.hit_flash.saturating_sub(1);
                false
            }
            LifeStage::Dying { ticks_remaining } => {
                if ticks_remaining <= 1 {
                    self.stage = LifeStage::Gone;
                    true
                } else {
                    self.stage = LifeStage::Dying {
                        ticks_remaining: ticks_remaining - 1,
                    };
                    false
                }
            }
            LifeStage::Gone => false,
        }
    }

    fn apply_damage(&mut self, damage: i32) -> HitOutcome {
        self.hp -= damage;
        if self.hp <= 0 {
            self.start_dying();
            HitOutcome::Killed
        } else {
            self.invincible = self.timings.invincibility_ticks;
            self.hit_flash = self.timings.hit_flash_ticks;
            HitOutcome::Hurt
        }
    }

    fn start_dying(&mut self) {
        debug!("Character died");
        self.invincible = 0;
        self.hit_flash = 0;
        self.stage = LifeStage::Dying {
            ticks_remaining: self.timings.death_ticks,
        };
    }
}

// ---------------------------------------------------------------------------------------------------------------------
