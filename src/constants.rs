// Tuned at 60 ticks per second.
// Units are pixels and ticks unless otherwise specified.

pub const TICKS_PER_SECOND: u32 = 60;

pub mod frame {
    pub const WIDTH: i32 = 640;
    pub const HEIGHT: i32 = 480;
}

pub mod player {
    pub const MOMENTUM_STEP_RIGHT: f64 = 1.0004;
    pub const MOMENTUM_STEP_LEFT: f64 = 1.0005;
    pub const MOMENTUM_DECAY: f64 = 1.0;
    // Left after running into a wall, so the walk cycle keeps playing in place
    pub const WALL_HIT_MOMENTUM: f64 = 0.1;

    pub const INVINCIBILITY_TICKS: u32 = 45;
    pub const RESPAWN_INVINCIBILITY_TICKS: u32 = 60;
    pub const HIT_FLASH_TICKS: u32 = 10;
    pub const DEATH_TICKS: u32 = 60;
    pub const TICKS_PER_FRAME: u32 = 4;
}

pub mod baddie {
    pub const HIT_FLASH_TICKS: u32 = 6;
    pub const COLLISION_PAUSE_TICKS: u32 = 60;
    pub const TICKS_PER_FRAME: u32 = 4;
}

pub mod countdown {
    pub const POWER_UP_INTERVAL: u32 = 600;
    pub const INITIAL_BADDIE_DELAY: u32 = 120;
    pub const MAX_BADDIE_DELAY: u32 = 100;
    pub const MAX_BADDIES: usize = 5;
    pub const HURT_INTERVAL: u32 = 1800;
    pub const HURT_INTERVAL_FLOOR: u32 = 300;
    pub const HURT_SHRINK_PERIOD: u32 = 10;
    // The HUD starts showing the hurt countdown when fewer than this many ticks remain
    pub const HURT_WARNING_TICKS: u32 = 600;
    pub const HEART_HP: i32 = 1;
}

pub mod sizes {
    use cgmath::{vec2, Vector2};

    pub fn fred() -> Vector2<i32> {
        vec2(24, 32)
    }
    pub fn ilmar() -> Vector2<i32> {
        vec2(24, 32)
    }
    pub fn xor() -> Vector2<i32> {
        vec2(48, 48)
    }
    pub fn kreutzwald() -> Vector2<i32> {
        vec2(32, 32)
    }
    pub fn heart() -> Vector2<i32> {
        vec2(16, 16)
    }
    pub fn box_icon() -> Vector2<i32> {
        vec2(22, 16)
    }
}
