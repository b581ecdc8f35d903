use cgmath::{vec2, Vector2};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{barrier::Barriers, body::MobileBody, collision::Resolution};

/// How a wandering baddie picks a new heading after running into something.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WanderPolicy {
    /// Right, down, left or up only. After a collision the baddie stands still, and holds
    /// fire, for `pause_ticks`.
    Cardinal { pause_ticks: u32 },
    /// Any whole degree in [0, 360), no pause.
    FreeAngle,
}

impl WanderPolicy {
    /// A random heading from the allowed set, in radians clockwise from +x.
    pub fn sample_direction<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let degrees = match self {
            WanderPolicy::Cardinal { .. } => rng.gen_range(0..4) * 90,
            WanderPolicy::FreeAngle => rng.gen_range(0..360),
        };
        (degrees as f64).to_radians()
    }

    fn pause_ticks(&self) -> u32 {
        match self {
            WanderPolicy::Cardinal { pause_ticks } => *pause_ticks,
            WanderPolicy::FreeAngle => 0,
        }
    }
}

// ---------------------------------------------------------------------------------------------------------------------

/// Straight-line wandering at a fixed speed, turning to a new random heading on collision.
#[derive(Clone, Debug, PartialEq)]
pub struct Wander {
    policy: WanderPolicy,
    speed: f64,
    direction: f64,
    pause_remaining: u32,
}

impl Wander {
    pub fn new<R: Rng + ?Sized>(policy: WanderPolicy, speed: f64, rng: &mut R) -> Self {
        Self {
            policy,
            speed,
            direction: policy.sample_direction(rng),
            pause_remaining: 0,
        }
    }

    pub fn policy(&self) -> WanderPolicy {
        self.policy
    }

    pub fn direction(&self) -> f64 {
        self.direction
    }

    pub fn is_paused(&self) -> bool {
        self.pause_remaining > 0
    }

    /// The desired displacement for this tick.
    pub fn tick(&self) -> Vector2<f64> {
        let (sin, cos) = self.direction.sin_cos();
        vec2(cos * self.speed, sin * self.speed)
    }

    /// Counts down a collision pause. Returns true if the baddie should sit this tick out.
    pub fn hold(&mut self) -> bool {
        if self.pause_remaining > 0 {
            self.pause_remaining -= 1;
            true
        } else {
            false
        }
    }

    /// Moves `body` one tick along the current heading with drift correction. On collision a
    /// new heading is drawn and any pause begins.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        body: &mut MobileBody,
        barriers: &Barriers,
        rng: &mut R,
    ) -> Resolution {
        let d = self.tick();
        let r = body.glide(d.x, d.y, barriers);
        if r.collided() {
            self.direction = self.policy.sample_direction(rng);
            self.pause_remaining = self.policy.pause_ticks();
        }
        r
    }
}

// ---------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod wander_tests {
    use super::*;
    use cgmath::point2;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn cardinal_headings_only() {
        let mut rng = StdRng::seed_from_u64(7);
        let policy = WanderPolicy::Cardinal { pause_ticks: 60 };
        for _ in 0..100 {
            let deg = policy.sample_direction(&mut rng).to_degrees().round() as i32;
            assert!([0, 90, 180, 270].contains(&deg), "{} is not cardinal", deg);
        }
    }

    #[test]
    fn collision_pauses_cardinal_wanderer() {
        let mut rng = StdRng::seed_from_u64(1);
        let barriers = Barriers::framed(200, 200).unwrap();
        let mut body = MobileBody::new(point2(100, 100), vec2(48, 48), vec2(18, 18));
        let mut w = Wander::new(WanderPolicy::Cardinal { pause_ticks: 60 }, 1.0, &mut rng);

        let mut ticks = 0;
        loop {
            ticks += 1;
            assert!(ticks < 200);
            if w.advance(&mut body, &barriers, &mut rng).collided() {
                break;
            }
        }
        assert!(w.is_paused());
        let held_at = body.center();
        let mut held = 0;
        while w.hold() {
            held += 1;
        }
        assert_eq!(held, 60);
        assert_eq!(body.center(), held_at);
    }

    #[test]
    fn free_angle_wanderer_stays_inside() {
        let mut rng = StdRng::seed_from_u64(99);
        let barriers = Barriers::framed(160, 120).unwrap();
        let mut body = MobileBody::new(point2(80, 60), vec2(32, 32), vec2(0, 0));
        let mut w = Wander::new(WanderPolicy::FreeAngle, 1.0, &mut rng);

        let mut turns = 0;
        for _ in 0..2000 {
            assert!(!w.hold());
            if w.advance(&mut body, &barriers, &mut rng).collided() {
                turns += 1;
            }
            let c = body.c_rect();
            assert!(c.left >= 1 && c.right() <= 159);
            assert!(c.top >= 1 && c.bottom() <= 119);
        }
        assert!(turns > 0);
    }
}
