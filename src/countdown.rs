use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{countdown, TICKS_PER_SECOND},
    error::{ensure_positive, ConfigError},
};

/// Timers of a countdown level. All values are in ticks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountdownConfig {
    /// A power-up may appear this often
    pub power_up_interval: u32,
    /// Chance that one does appear when the interval elapses and none is waiting
    pub power_up_chance: f64,
    pub initial_baddie_delay: u32,
    /// While below `max_baddies`, the next spawn is rescheduled every tick to a random
    /// delay in `1..=max_baddie_delay`
    pub max_baddie_delay: u32,
    pub max_baddies: usize,
    /// Time the player has to kill a baddie before getting hurt
    pub hurt_interval: u32,
    /// `hurt_interval` shrinks over time, but never below this
    pub hurt_interval_floor: u32,
    /// The hurt interval shrinks by one tick every this many ticks
    pub hurt_shrink_period: u32,
    pub hurt_warning_ticks: u32,
    pub hurt_damage: i32,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            power_up_interval: countdown::POWER_UP_INTERVAL,
            power_up_chance: 0.5,
            initial_baddie_delay: countdown::INITIAL_BADDIE_DELAY,
            max_baddie_delay: countdown::MAX_BADDIE_DELAY,
            max_baddies: countdown::MAX_BADDIES,
            hurt_interval: countdown::HURT_INTERVAL,
            hurt_interval_floor: countdown::HURT_INTERVAL_FLOOR,
            hurt_shrink_period: countdown::HURT_SHRINK_PERIOD,
            hurt_warning_ticks: countdown::HURT_WARNING_TICKS,
            hurt_damage: 1,
        }
    }
}

impl CountdownConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.power_up_chance) {
            return Err(ConfigError::NotAProbability {
                what: "power_up_chance",
                value: self.power_up_chance,
            });
        }
        ensure_positive("max_baddie_delay", self.max_baddie_delay as f64)?;
        ensure_positive("hurt_interval_floor", self.hurt_interval_floor as f64)?;
        ensure_positive("hurt_shrink_period", self.hurt_shrink_period as f64)?;
        ensure_positive(
            "hurt_interval above its floor",
            (self.hurt_interval + 1).saturating_sub(self.hurt_interval_floor) as f64,
        )?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------------------------------------------------

/// The pressure a countdown level puts on the player: power-ups now and then, a steady trickle
/// of baddies, and a hurt timer that only a kill resets and that gets shorter as time passes.
#[derive(Clone, Debug)]
pub struct CountdownRules {
    config: CountdownConfig,
    power_up_timer: u32,
    baddie_timer: u32,
    hurt_timer: u32,
    max_hurt_timer: u32,
    hurt_shrink_timer: u32,
}

impl CountdownRules {
    pub fn new(config: CountdownConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            power_up_timer: config.power_up_interval,
            baddie_timer: config.initial_baddie_delay,
            hurt_timer: config.hurt_interval,
            max_hurt_timer: config.hurt_interval,
            hurt_shrink_timer: config.hurt_shrink_period,
            config,
        })
    }

    pub fn config(&self) -> &CountdownConfig {
        &self.config
    }

    /// Advances the power-up timer. Returns true when a power-up should appear. A chance
    /// that comes up while the last power-up is still waiting is wasted.
    pub fn tick_power_up<R: Rng + ?Sized>(&mut self, waiting: bool, rng: &mut R) -> bool {
        if self.power_up_timer == 0 {
            self.power_up_timer = self.config.power_up_interval;
            !waiting && rng.gen_bool(self.config.power_up_chance)
        } else {
            self.power_up_timer -= 1;
            false
        }
    }

    /// Advances the baddie timer. Returns true when a baddie should be spawned.
    pub fn tick_baddie_timer(&mut self) -> bool {
        if self.baddie_timer != 0 {
            self.baddie_timer -= 1;
            return self.baddie_timer == 0;
        }
        false
    }

    /// Reschedules the next spawn while the level has room for more baddies. Called every
    /// tick after any spawn, so in effect each tick below the limit has a
    /// `1 / max_baddie_delay` chance of a spawn on the following tick.
    pub fn schedule_baddie<R: Rng + ?Sized>(&mut self, live_baddies: usize, rng: &mut R) {
        if live_baddies < self.config.max_baddies {
            self.baddie_timer = rng.gen_range(1..=self.config.max_baddie_delay);
        }
    }

    /// Advances the hurt timers. Returns the damage to deal to the player, if any.
    pub fn tick_hurt(&mut self) -> Option<i32> {
        self.hurt_timer = self.hurt_timer.saturating_sub(1);
        let hurt = if self.hurt_timer == 0 {
            self.hurt_timer = self.max_hurt_timer;
            Some(self.config.hurt_damage)
        } else {
            None
        };

        self.hurt_shrink_timer -= 1;
        if self.hurt_shrink_timer == 0 {
            self.hurt_shrink_timer = self.config.hurt_shrink_period;
            if self.max_hurt_timer > self.config.hurt_interval_floor {
                self.max_hurt_timer -= 1;
            }
            self.hurt_timer = self.hurt_timer.min(self.max_hurt_timer);
        }
        hurt
    }

    pub fn baddie_killed(&mut self) {
        self.hurt_timer = self.max_hurt_timer;
    }

    pub fn hurt_timer(&self) -> u32 {
        self.hurt_timer
    }

    pub fn max_hurt_timer(&self) -> u32 {
        self.max_hurt_timer
    }

    pub fn baddie_timer(&self) -> u32 {
        self.baddie_timer
    }

    /// Whole seconds left before the player gets hurt, once the warning period has begun.
    pub fn hurt_countdown_seconds(&self) -> Option<u32> {
        if self.hurt_timer < self.config.hurt_warning_ticks {
            Some(self.hurt_timer / TICKS_PER_SECOND)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod countdown_tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn hurt_fires_on_schedule_and_interval_shrinks() {
        let mut rules = CountdownRules::new(CountdownConfig::default()).unwrap();
        let mut first_hurt = None;
        for tick in 1..=2000 {
            if rules.tick_hurt().is_some() && first_hurt.is_none() {
                first_hurt = Some(tick);
            }
        }
        // the shrinking maximum never overtakes a running timer
        assert_eq!(first_hurt, Some(1800));
        assert_eq!(rules.max_hurt_timer(), 1800 - 200);
        assert!(rules.hurt_timer() <= rules.max_hurt_timer());
    }

    #[test]
    fn interval_bottoms_out() {
        let mut rules = CountdownRules::new(CountdownConfig::default()).unwrap();
        for _ in 0..100_000 {
            rules.tick_hurt();
        }
        assert_eq!(rules.max_hurt_timer(), countdown::HURT_INTERVAL_FLOOR);
        assert!(rules.hurt_timer() <= countdown::HURT_INTERVAL_FLOOR);
    }

    #[test]
    fn kill_resets_hurt_timer() {
        let mut rules = CountdownRules::new(CountdownConfig::default()).unwrap();
        for _ in 0..1500 {
            assert!(rules.tick_hurt().is_none());
        }
        assert!(rules.hurt_countdown_seconds().is_some());
        rules.baddie_killed();
        assert_eq!(rules.hurt_timer(), rules.max_hurt_timer());
        assert!(rules.hurt_countdown_seconds().is_none());
    }

    #[test]
    fn countdown_seconds_in_warning_window() {
        let config = CountdownConfig {
            hurt_interval: 700,
            hurt_interval_floor: 300,
            ..Default::default()
        };
        let mut rules = CountdownRules::new(config).unwrap();
        assert_eq!(rules.hurt_countdown_seconds(), None);
        for _ in 0..101 {
            rules.tick_hurt();
        }
        assert_eq!(rules.hurt_timer(), 599);
        assert_eq!(rules.hurt_countdown_seconds(), Some(9));
    }

    #[test]
    fn power_up_chance_is_wasted_while_one_waits() {
        let config = CountdownConfig {
            power_up_interval: 3,
            power_up_chance: 1.0,
            ..Default::default()
        };
        let mut rules = CountdownRules::new(config).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let fired: Vec<bool> = (0..8).map(|_| rules.tick_power_up(true, &mut rng)).collect();
        assert!(fired.iter().all(|f| !f));
        let fired: Vec<bool> = (0..8).map(|_| rules.tick_power_up(false, &mut rng)).collect();
        assert_eq!(fired.iter().filter(|f| **f).count(), 2);
    }

    #[test]
    fn first_baddie_after_initial_delay() {
        let mut rules = CountdownRules::new(CountdownConfig::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..119 {
            assert!(!rules.tick_baddie_timer());
        }
        assert!(rules.tick_baddie_timer());

        // a full level never reschedules, so nothing else spawns
        rules.schedule_baddie(5, &mut rng);
        assert_eq!(rules.baddie_timer(), 0);
        assert!(!rules.tick_baddie_timer());

        rules.schedule_baddie(0, &mut rng);
        assert!((1..=100).contains(&rules.baddie_timer()));
    }

    #[test]
    fn invalid_configs() {
        let bad = CountdownConfig {
            power_up_chance: 1.5,
            ..Default::default()
        };
        assert!(CountdownRules::new(bad).is_err());
        let bad = CountdownConfig {
            hurt_interval: 100,
            ..Default::default()
        };
        assert!(CountdownRules::new(bad).is_err());
    }
}
