//! Simulation core of a 2D projectile platformer: rectangle collision against one-way barriers,
//! player and baddie motion, pooled projectiles with ammo accounting, and the countdown level
//! rules tying them together. Everything advances on a fixed tick; rendering, audio and
//! keyboard polling belong to the host.

pub mod barrier;
pub mod body;
pub mod character_controller;
pub mod collision;
pub mod constants;
pub mod countdown;
pub mod entities;
pub mod entity;
pub mod error;
pub mod event_dispatch;
pub mod events;
pub mod geom;
pub mod input;
pub mod level;
pub mod motion;
pub mod projectile;
pub mod projectile_box;
pub mod vitals;

pub use error::{ConfigError, Error, Result};
pub use level::{Level, LevelConfig};
