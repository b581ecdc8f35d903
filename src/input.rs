use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonState {
    Pressed,
    Down,
    Released,
    Up,
}

impl Default for ButtonState {
    fn default() -> Self {
        ButtonState::Up
    }
}

impl ButtonState {
    pub fn transition(&self, key_down: bool) -> ButtonState {
        if key_down {
            match self {
                ButtonState::Pressed => ButtonState::Down,
                ButtonState::Down => ButtonState::Down,
                ButtonState::Released => ButtonState::Pressed,
                ButtonState::Up => ButtonState::Pressed,
            }
        } else {
            match self {
                ButtonState::Pressed => ButtonState::Released,
                ButtonState::Down => ButtonState::Released,
                ButtonState::Released => ButtonState::Up,
                ButtonState::Up => ButtonState::Up,
            }
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, ButtonState::Pressed | ButtonState::Down)
    }

    /// True only on the tick the button went from not-pressed to pressed.
    pub fn was_pressed(&self) -> bool {
        *self == ButtonState::Pressed
    }
}

// ---------------------------------------------------------------------------------------------------------------------

/// Which keys are held this tick. Sampled once per tick by the host. Up and down only
/// change the aim, never the motion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSnapshot {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub jump: bool,
    pub fire: bool,
}

impl InputSnapshot {
    pub fn none() -> Self {
        Default::default()
    }
}

// ---------------------------------------------------------------------------------------------------------------------
