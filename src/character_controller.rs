use cgmath::{vec2, Vector2};
use serde::{Deserialize, Serialize};

use crate::{
    barrier::{Barrier, Barriers},
    body::MobileBody,
    constants::player::{
        MOMENTUM_DECAY, MOMENTUM_STEP_LEFT, MOMENTUM_STEP_RIGHT, WALL_HIT_MOMENTUM,
    },
    entity::{Direction, Gaze},
    error::{ensure_positive, ConfigError},
    input::{ButtonState, InputSnapshot},
};

// ---------------------------------------------------------------------------------------------------------------------

/// Tuning for the player's run and jump.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Top running speed, pixels per tick
    pub horizontal_speed: f64,
    /// Momentum needed to reach top speed; larger values feel heavier
    pub horizontal_inertia: f64,
    /// Jumps allowed before landing again
    pub multi_jump_limit: u32,
    /// Downward acceleration while airborne, pixels per tick squared
    pub vertical_acceleration: f64,
    /// Vertical velocity at the start of a jump; negative is up
    pub initial_jump_velocity: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            horizontal_speed: 4.0,
            horizontal_inertia: 8.0,
            multi_jump_limit: 2,
            vertical_acceleration: 0.4,
            initial_jump_velocity: -10.0,
        }
    }
}

impl MotionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("horizontal_speed", self.horizontal_speed)?;
        ensure_positive("horizontal_inertia", self.horizontal_inertia)?;
        ensure_positive("multi_jump_limit", self.multi_jump_limit as f64)?;
        ensure_positive("vertical_acceleration", self.vertical_acceleration)?;
        if self.initial_jump_velocity >= 0.0 {
            return Err(ConfigError::JumpVelocityNotUpward(
                self.initial_jump_velocity,
            ));
        }
        Ok(())
    }

    /// Jump progress at which the jump parabola peaks, counted from progress zero.
    pub fn apogee_offset(&self) -> f64 {
        -self.initial_jump_velocity / self.vertical_acceleration
    }
}

// ---------------------------------------------------------------------------------------------------------------------

/// Turns the player's input into motion: momentum-based running and a parabolic jump with a
/// limited number of mid-air jumps.
///
/// Grounded while `floor` is set and `jump_progress` is None. Airborne otherwise, with
/// `jump_progress` counting ticks along the jump curve; progress zero is the apex.
#[derive(Clone, Debug)]
pub struct CharacterController {
    config: MotionConfig,
    apogee_offset: f64,
    momentum: f64,
    floor: Option<Barrier>,
    jump_progress: Option<f64>,
    jumps_used: u32,
    facing: Direction,
    gaze: Gaze,
    jump_button: ButtonState,
}

impl CharacterController {
    pub fn new(config: MotionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            apogee_offset: config.apogee_offset(),
            config,
            momentum: 0.0,
            floor: None,
            jump_progress: None,
            jumps_used: 0,
            facing: Direction::East,
            gaze: Gaze::Straight,
            // a jump key held at spawn must be released before it counts
            jump_button: ButtonState::Down,
        })
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn apogee_offset(&self) -> f64 {
        self.apogee_offset
    }

    pub fn momentum(&self) -> f64 {
        self.momentum
    }

    pub fn floor(&self) -> Option<&Barrier> {
        self.floor.as_ref()
    }

    pub fn jump_progress(&self) -> Option<f64> {
        self.jump_progress
    }

    pub fn jumps_used(&self) -> u32 {
        self.jumps_used
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn gaze(&self) -> Gaze {
        self.gaze
    }

    pub fn is_grounded(&self) -> bool {
        self.floor.is_some() && self.jump_progress.is_none()
    }

    /// Vertical velocity at a given jump progress.
    pub fn vertical_velocity(&self, progress: f64) -> f64 {
        self.config.vertical_acceleration * (progress + self.apogee_offset)
            + self.config.initial_jump_velocity
    }

    /// Stops the player dead, e.g. after a respawn. The next update finds no floor and
    /// starts a fall.
    pub fn reset(&mut self) {
        self.momentum = 0.0;
        self.jump_progress = None;
    }

    /// Runs one tick of motion, moving `body` and returning the committed displacement.
    pub fn update(
        &mut self,
        input: &InputSnapshot,
        body: &mut MobileBody,
        barriers: &Barriers,
    ) -> Vector2<i32> {
        let dx = self.apply_input(input);

        //
        // Walls first: walking off a ledge is tested with the clamped horizontal motion
        //

        let rx = body.probe(dx, 0.0, barriers);
        if rx.hit_x.is_some() {
            self.momentum = WALL_HIT_MOMENTUM;
        }
        body.translate(vec2(rx.dx, 0));

        if let Some(floor) = self.floor {
            let c = body.c_rect();
            if floor.rect.right() <= c.left || floor.rect.left >= c.right() {
                // falling doesn't spend a jump beyond the first
                self.jumps_used = 1;
                self.jump_progress = Some(0.0);
                self.floor = None;
            }
        }

        //
        // Jump curve
        //

        let mut dy = 0.0;
        if let Some(progress) = self.jump_progress {
            dy = self.vertical_velocity(progress);
            self.jump_progress = Some(progress + 1.0);
        }

        // In mid-air without a jump, e.g. freshly spawned: start falling from the apex
        if self.jump_progress.is_none() && self.floor.is_none() {
            self.jump_progress = Some(0.0);
            self.jumps_used = 1;
        }

        let ry = body.probe(0.0, dy, barriers);
        if let Some(hit) = ry.hit_y {
            if ry.requested.y < 0 {
                // head bump: continue as if from the apex
                self.jump_progress = Some(0.0);
            } else {
                self.floor = Some(hit);
                self.jumps_used = 0;
                self.jump_progress = None;
            }
        }
        body.translate(vec2(0, ry.dy));

        vec2(rx.dx, ry.dy)
    }

    fn apply_input(&mut self, input: &InputSnapshot) -> f64 {
        let mut mx = self.momentum;

        // The steps are not exactly 1.0 so that holding a key never leaves momentum at
        // exactly zero, which would read as standing.
        if input.right {
            mx += MOMENTUM_STEP_RIGHT;
            self.facing = Direction::East;
        }
        if input.left {
            mx -= MOMENTUM_STEP_LEFT;
            self.facing = Direction::West;
        }
        if !input.right && !input.left {
            if mx >= MOMENTUM_DECAY {
                mx -= MOMENTUM_DECAY;
            } else if mx <= -MOMENTUM_DECAY {
                mx += MOMENTUM_DECAY;
            } else {
                mx = 0.0;
            }
        }

        self.gaze = if input.up {
            Gaze::Up
        } else if input.down {
            Gaze::Down
        } else {
            Gaze::Straight
        };

        self.jump_button = self.jump_button.transition(input.jump);
        if self.jump_button.was_pressed() && self.jumps_used < self.config.multi_jump_limit {
            self.jumps_used += 1;
            self.jump_progress = Some(-self.apogee_offset);
            self.floor = None;
        }

        let ix = self.config.horizontal_inertia;
        self.momentum = mx.max(-ix).min(ix);
        self.config.horizontal_speed * self.momentum / ix
    }
}

// ---------------------------------------------------------------------------------------------------------------------
