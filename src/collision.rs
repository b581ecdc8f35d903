use cgmath::{vec2, MetricSpace, Point2, Vector2};

use crate::{
    barrier::{Barrier, Barriers},
    geom::Rect,
};

/// Rounds a requested displacement to whole pixels.
pub fn round_px(v: f64) -> i32 {
    v.round() as i32
}

// ---------------------------------------------------------------------------------------------------------------------

/// Result of resolving a requested displacement against a barrier supply.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolution {
    /// Displacement after rounding and clamping.
    pub dx: i32,
    pub dy: i32,
    /// The rounded displacement that was asked for.
    pub requested: Vector2<i32>,
    pub hit_x: Option<Barrier>,
    pub hit_y: Option<Barrier>,
}

impl Resolution {
    pub fn displacement(&self) -> Vector2<i32> {
        vec2(self.dx, self.dy)
    }

    /// How far the clamp moved the actor back from the rounded request.
    pub fn correction(&self) -> Vector2<i32> {
        self.displacement() - self.requested
    }

    pub fn collided(&self) -> bool {
        self.hit_x.is_some() || self.hit_y.is_some()
    }
}

/// Clamps the displacement `(dx, dy)` of a collision rect so that it does not cross any barrier
/// blocking that direction. The axes are resolved independently against the rect's current
/// position, so a fast diagonal move may clip a corner.
///
/// At most one barrier is reported per axis, the first in collection order. This is a pure
/// function; callers commit the move.
pub fn resolve(c_rect: &Rect, dx: f64, dy: f64, barriers: &Barriers) -> Resolution {
    let requested = vec2(round_px(dx), round_px(dy));
    let (dx, hit_x) = resolve_horizontal(c_rect, requested.x, barriers);
    let (dy, hit_y) = resolve_vertical(c_rect, requested.y, barriers);
    Resolution {
        dx,
        dy,
        requested,
        hit_x,
        hit_y,
    }
}

fn spans_vertically(c: &Rect, b: &Rect) -> bool {
    c.bottom() > b.top && c.top < b.bottom()
}

fn spans_horizontally(c: &Rect, b: &Rect) -> bool {
    c.right() > b.left && c.left < b.right()
}

fn resolve_horizontal(c: &Rect, dx: i32, barriers: &Barriers) -> (i32, Option<Barrier>) {
    if dx > 0 {
        let edge = c.right() - 1;
        barriers
            .left_walls
            .iter()
            .find(|w| edge < w.rect.left && edge + dx >= w.rect.left && spans_vertically(c, &w.rect))
            .map_or((dx, None), |w| (w.rect.left - 1 - edge, Some(*w)))
    } else if dx < 0 {
        barriers
            .right_walls
            .iter()
            .find(|w| c.left > w.rect.left && c.left + dx <= w.rect.left && spans_vertically(c, &w.rect))
            .map_or((dx, None), |w| (w.rect.left + 1 - c.left, Some(*w)))
    } else {
        (0, None)
    }
}

fn resolve_vertical(c: &Rect, dy: i32, barriers: &Barriers) -> (i32, Option<Barrier>) {
    if dy < 0 {
        barriers
            .ceilings
            .iter()
            .find(|p| c.top > p.rect.top && c.top + dy <= p.rect.top && spans_horizontally(c, &p.rect))
            .map_or((dy, None), |p| (p.rect.top + 1 - c.top, Some(*p)))
    } else if dy > 0 {
        let edge = c.bottom() - 1;
        barriers
            .floors
            .iter()
            .find(|p| edge < p.rect.top && edge + dy >= p.rect.top && spans_horizontally(c, &p.rect))
            .map_or((dy, None), |p| (p.rect.top - 1 - edge, Some(*p)))
    } else {
        (0, None)
    }
}

/// True if two circles touch or overlap. Used for projectile versus character hits.
pub fn circles_touch(a: Point2<i32>, a_radius: f64, b: Point2<i32>, b_radius: f64) -> bool {
    let a = Point2::new(a.x as f64, a.y as f64);
    let b = Point2::new(b.x as f64, b.y as f64);
    let reach = a_radius + b_radius;
    a.distance2(b) <= reach * reach
}

// ---------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod resolver_tests {
    use super::*;
    use crate::barrier::BarrierKind;
    use cgmath::point2;

    /// A 10x10 rect centered at (150, 150) inside a 100px box.
    fn boxed() -> (Rect, Barriers) {
        let mut b = Barriers::new();
        b.add(Barrier::platform(BarrierKind::Floor, 100, 200, 101).unwrap());
        b.add(Barrier::platform(BarrierKind::Ceiling, 100, 100, 101).unwrap());
        b.add(Barrier::wall(BarrierKind::LeftWall, 200, 100, 101).unwrap());
        b.add(Barrier::wall(BarrierKind::RightWall, 100, 100, 101).unwrap());
        (Rect::new(145, 145, 10, 10), b)
    }

    #[test]
    fn short_moves_pass_untouched() {
        let (c, b) = boxed();
        for (dx, dy) in &[(0.0, -44.0), (0.0, 45.0), (-44.0, 0.0), (45.0, 0.0)] {
            let r = resolve(&c, *dx, *dy, &b);
            assert!(!r.collided(), "{:?} should not collide", (dx, dy));
            assert_eq!(r.correction(), vec2(0, 0));
            assert_eq!(r.displacement(), vec2(*dx as i32, *dy as i32));
        }
    }

    #[test]
    fn moves_onto_a_barrier_are_clamped() {
        let (c, b) = boxed();

        let up = resolve(&c, 0.0, -45.0, &b);
        assert_eq!(up.correction(), vec2(0, 1));
        assert_eq!(up.hit_y, Some(b.ceilings[0]));

        let down = resolve(&c, 0.0, 46.0, &b);
        assert_eq!(down.correction(), vec2(0, -1));
        assert_eq!(down.hit_y, Some(b.floors[0]));

        let left = resolve(&c, -45.0, 0.0, &b);
        assert_eq!(left.correction(), vec2(1, 0));
        assert_eq!(left.hit_x, Some(b.right_walls[0]));

        let right = resolve(&c, 46.0, 0.0, &b);
        assert_eq!(right.correction(), vec2(-1, 0));
        assert_eq!(right.hit_x, Some(b.left_walls[0]));
    }

    #[test]
    fn clamp_leaves_zero_gap() {
        let (_, b) = boxed();
        // right edge one pixel short of the left wall at x=200
        let c = Rect::new(189, 145, 10, 10);
        assert_eq!(c.right() - 1, 198);

        let r = resolve(&c, 5.0, 0.0, &b);
        assert_eq!(r.dx, 1);
        assert_eq!(r.hit_x, Some(b.left_walls[0]));
        assert_eq!(c.translated(r.displacement()).right(), b.left_walls[0].rect.left);

        // already touching: the wall holds
        let touching = c.translated(vec2(1, 0));
        let r = resolve(&touching, 3.0, 0.0, &b);
        assert_eq!(r.dx, 0);
        assert!(r.hit_x.is_some());

        // wall far away: nothing to clamp
        let free = Rect::new(150, 145, 10, 10);
        let r = resolve(&free, 5.0, 0.0, &b);
        assert_eq!(r.dx, 5);
        assert_eq!(r.hit_x, None);
    }

    #[test]
    fn rounding_happens_before_testing() {
        let (c, b) = boxed();
        let r = resolve(&c, 45.4, 0.0, &b);
        assert_eq!(r.requested, vec2(45, 0));
        assert!(!r.collided());
        let r = resolve(&c, 45.6, 0.0, &b);
        assert_eq!(r.dx, 45);
        assert!(r.hit_x.is_some());
    }

    #[test]
    fn corner_only_blocks_overlapping_span() {
        let mut b = Barriers::new();
        b.add(Barrier::platform(BarrierKind::Ceiling, 190, 110, 11).unwrap());

        // right edge exactly at the ceiling's left edge: no overlap, no hit
        let beside = Rect::new(180, 130, 10, 10);
        assert!(!resolve(&beside, 0.0, -20.0, &b).collided());

        // one pixel of overlap is enough to bump
        let under = Rect::new(181, 130, 10, 10);
        let r = resolve(&under, 0.0, -20.0, &b);
        assert_eq!(r.dy, -19);
        assert_eq!(under.translated(r.displacement()).top, 111);
    }

    #[test]
    fn axes_resolve_independently() {
        let (c, b) = boxed();
        let r = resolve(&c, 46.0, 46.0, &b);
        assert_eq!(r.correction(), vec2(-1, -1));
        assert!(r.hit_x.is_some() && r.hit_y.is_some());
    }

    #[test]
    fn circle_contact_is_inclusive() {
        assert!(circles_touch(point2(0, 0), 2.0, point2(5, 0), 3.0));
        assert!(!circles_touch(point2(0, 0), 2.0, point2(6, 0), 3.0));
        assert!(circles_touch(point2(3, 4), 1.0, point2(0, 0), 4.0));
    }
}
