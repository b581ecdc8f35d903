use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, geom::Rect};

/// Which side a barrier blocks. A `LeftWall` stops rightward motion into it, a `RightWall`
/// stops leftward motion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BarrierKind {
    Floor,
    Ceiling,
    LeftWall,
    RightWall,
}

impl BarrierKind {
    pub fn is_platform(&self) -> bool {
        matches!(self, BarrierKind::Floor | BarrierKind::Ceiling)
    }
}

/// A one pixel thick, one-directional collision edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Barrier {
    pub rect: Rect,
    pub kind: BarrierKind,
}

impl Barrier {
    /// A horizontal floor or ceiling, one pixel high.
    pub fn platform(
        kind: BarrierKind,
        left: i32,
        top: i32,
        width: i32,
    ) -> Result<Self, ConfigError> {
        if !kind.is_platform() {
            return Err(ConfigError::BarrierOrientation {
                kind,
                expected: "platform",
            });
        }
        if width <= 0 {
            return Err(ConfigError::DegenerateBarrier {
                kind,
                length: width,
            });
        }
        Ok(Self {
            rect: Rect::new(left, top, width, 1),
            kind,
        })
    }

    /// A vertical wall, one pixel wide.
    pub fn wall(kind: BarrierKind, left: i32, top: i32, height: i32) -> Result<Self, ConfigError> {
        if kind.is_platform() {
            return Err(ConfigError::BarrierOrientation {
                kind,
                expected: "wall",
            });
        }
        if height <= 0 {
            return Err(ConfigError::DegenerateBarrier {
                kind,
                length: height,
            });
        }
        Ok(Self {
            rect: Rect::new(left, top, 1, height),
            kind,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let length = if self.kind.is_platform() {
            self.rect.width
        } else {
            self.rect.height
        };
        if length <= 0 || self.rect.width <= 0 || self.rect.height <= 0 {
            Err(ConfigError::DegenerateBarrier {
                kind: self.kind,
                length,
            })
        } else {
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------------------------------------------------

/// The barrier supply for one level, grouped by the direction each collection blocks.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Barriers {
    pub floors: Vec<Barrier>,
    pub ceilings: Vec<Barrier>,
    pub left_walls: Vec<Barrier>,
    pub right_walls: Vec<Barrier>,
}

impl Barriers {
    pub fn new() -> Self {
        Default::default()
    }

    /// Builds the four edges enclosing a `width` x `height` play area.
    pub fn framed(width: i32, height: i32) -> Result<Self, ConfigError> {
        let mut b = Barriers::new();
        b.add(Barrier::platform(BarrierKind::Floor, 0, height - 1, width)?);
        b.add(Barrier::platform(BarrierKind::Ceiling, 0, 0, width)?);
        b.add(Barrier::wall(BarrierKind::LeftWall, width - 1, 0, height)?);
        b.add(Barrier::wall(BarrierKind::RightWall, 0, 0, height)?);
        Ok(b)
    }

    pub fn add(&mut self, barrier: Barrier) {
        match barrier.kind {
            BarrierKind::Floor => self.floors.push(barrier),
            BarrierKind::Ceiling => self.ceilings.push(barrier),
            BarrierKind::LeftWall => self.left_walls.push(barrier),
            BarrierKind::RightWall => self.right_walls.push(barrier),
        }
    }

    pub fn extend<I: IntoIterator<Item = Barrier>>(&mut self, barriers: I) {
        for b in barriers {
            self.add(b);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Barrier> {
        self.floors
            .iter()
            .chain(self.ceilings.iter())
            .chain(self.left_walls.iter())
            .chain(self.right_walls.iter())
    }

    pub fn len(&self) -> usize {
        self.floors.len() + self.ceilings.len() + self.left_walls.len() + self.right_walls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.iter().try_for_each(|b| b.validate())
    }

    /// Projectiles are stopped by a platform from either side, and by a wall from either side.
    pub fn for_projectiles(&self) -> Barriers {
        let platforms: Vec<Barrier> = self
            .floors
            .iter()
            .chain(self.ceilings.iter())
            .copied()
            .collect();
        let walls: Vec<Barrier> = self
            .left_walls
            .iter()
            .chain(self.right_walls.iter())
            .copied()
            .collect();
        Barriers {
            floors: platforms.clone(),
            ceilings: platforms,
            left_walls: walls.clone(),
            right_walls: walls,
        }
    }
}

// ---------------------------------------------------------------------------------------------------------------------
