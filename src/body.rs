use cgmath::{point2, Point2, Vector2};

use crate::{
    barrier::Barriers,
    collision::{self, Resolution},
    geom::Rect,
};

/// Position state shared by everything that moves: a drawing rect, a (possibly smaller)
/// collision rect, and the true fractional center. After every committed move the two rects
/// share a center, which is the fractional center rounded to the nearest pixel.
#[derive(Clone, Debug, PartialEq)]
pub struct MobileBody {
    rect: Rect,
    c_rect: Rect,
    position: Point2<f64>,
}

impl MobileBody {
    /// # Arguments
    /// * `center` the initial center in pixels
    /// * `size` the drawing rect size
    /// * `collision_inset` how much narrower and shorter the collision rect is than the drawing rect
    pub fn new(center: Point2<i32>, size: Vector2<i32>, collision_inset: Vector2<i32>) -> Self {
        let rect = Rect::from_center(center, size);
        let mut c_rect = rect.inflate(-collision_inset.x, -collision_inset.y);
        c_rect.set_center(center);
        Self {
            rect,
            c_rect,
            position: point2(center.x as f64, center.y as f64),
        }
    }

    pub fn rect(&self) -> &Rect {
        &self.rect
    }

    pub fn c_rect(&self) -> &Rect {
        &self.c_rect
    }

    pub fn position(&self) -> Point2<f64> {
        self.position
    }

    pub fn center(&self) -> Point2<i32> {
        self.rect.center()
    }

    pub fn set_center(&mut self, center: Point2<i32>) {
        self.rect.set_center(center);
        self.c_rect.set_center(center);
        self.position = point2(center.x as f64, center.y as f64);
    }

    /// Replaces both rects with `size`, centered on `center`. Used by projectiles, whose
    /// bounding box follows their heading.
    pub fn reshape(&mut self, center: Point2<i32>, size: Vector2<i32>) {
        self.rect = Rect::from_center(center, size);
        self.c_rect = self.rect;
        self.position = point2(center.x as f64, center.y as f64);
    }

    pub fn translate(&mut self, by: Vector2<i32>) {
        self.rect.translate(by);
        self.c_rect.translate(by);
        self.position.x += by.x as f64;
        self.position.y += by.y as f64;
    }

    /// Asks the resolver about a move of the collision rect without committing it.
    pub fn probe(&self, dx: f64, dy: f64, barriers: &Barriers) -> Resolution {
        collision::resolve(&self.c_rect, dx, dy, barriers)
    }

    /// Moves by a fractional displacement with drift correction. The gap between the true
    /// position and the integer center is folded into the collision test, so that rounding
    /// can never carry the collision rect across a barrier.
    ///
    /// On an unblocked axis the fractional position advances by the raw delta. On a blocked
    /// axis it snaps to the clamped pixel position.
    pub fn glide(&mut self, dx: f64, dy: f64, barriers: &Barriers) -> Resolution {
        let c = self.c_rect.center();
        let r = collision::resolve(
            &self.c_rect,
            dx + self.position.x - c.x as f64,
            dy + self.position.y - c.y as f64,
            barriers,
        );

        let x = if r.hit_x.is_some() {
            (c.x + r.dx) as f64
        } else {
            self.position.x + dx
        };
        let y = if r.hit_y.is_some() {
            (c.y + r.dy) as f64
        } else {
            self.position.y + dy
        };
        self.place(point2(x, y));
        r
    }

    fn place(&mut self, position: Point2<f64>) {
        self.position = position;
        let center = point2(
            collision::round_px(position.x),
            collision::round_px(position.y),
        );
        self.rect.set_center(center);
        self.c_rect.set_center(center);
    }
}

// ---------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod body_tests {
    use super::*;
    use cgmath::vec2;

    fn overlaps_frame(c: &Rect, width: i32, height: i32) -> bool {
        c.left < 1 || c.right() - 1 > width - 2 || c.top < 1 || c.bottom() - 1 > height - 2
    }

    #[test]
    fn rects_share_center_after_moves() {
        let mut body = MobileBody::new(point2(100, 100), vec2(48, 48), vec2(18, 18));
        assert_eq!(body.c_rect().size(), vec2(30, 30));
        assert_eq!(body.rect().center(), body.c_rect().center());

        let barriers = Barriers::framed(640, 480).unwrap();
        body.glide(0.4, 0.4, &barriers);
        body.glide(0.4, 0.4, &barriers);
        assert_eq!(body.center(), point2(101, 101));
        assert_eq!(body.rect().center(), body.c_rect().center());
        assert!((body.position().x - 100.8).abs() < 1e-9);
    }

    #[test]
    fn drift_correction_prevents_tunneling() {
        let (width, height) = (300, 200);
        let barriers = Barriers::framed(width, height).unwrap();
        let mut body = MobileBody::new(point2(150, 100), vec2(10, 10), vec2(0, 0));

        let mut dir = 33.0f64.to_radians();
        let mut hits = 0;
        for _ in 0..1000 {
            let r = body.glide(dir.cos(), dir.sin(), &barriers);
            if r.hit_x.is_some() {
                dir = std::f64::consts::PI - dir;
                hits += 1;
            }
            if r.hit_y.is_some() {
                dir = -dir;
                hits += 1;
            }
            assert!(
                !overlaps_frame(body.c_rect(), width, height),
                "tunneled into frame at {:?}",
                body.c_rect()
            );
            assert_eq!(body.center().x, body.position().x.round() as i32);
            assert_eq!(body.center().y, body.position().y.round() as i32);
        }
        assert!(hits > 2);
    }

    #[test]
    fn pushing_into_a_wall_holds_position() {
        let barriers = Barriers::framed(100, 100).unwrap();
        let mut body = MobileBody::new(point2(50, 50), vec2(10, 10), vec2(0, 0));
        for _ in 0..300 {
            body.glide(0.7, 0.0, &barriers);
        }
        assert_eq!(body.c_rect().right(), 99);
        assert_eq!(body.position().x, body.center().x as f64);
    }
}
