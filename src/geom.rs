use cgmath::{point2, vec2, Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Integer pixel rectangle, y grows downward. Right and bottom edges are exclusive, so the
/// last column covered is `right() - 1`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn from_center(center: Point2<i32>, size: Vector2<i32>) -> Self {
        let mut r = Self::new(0, 0, size.x, size.y);
        r.set_center(center);
        r
    }

    pub fn right(&self) -> i32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.top + self.height
    }

    pub fn size(&self) -> Vector2<i32> {
        vec2(self.width, self.height)
    }

    pub fn center(&self) -> Point2<i32> {
        point2(
            self.left + self.width.div_euclid(2),
            self.top + self.height.div_euclid(2),
        )
    }

    pub fn set_center(&mut self, center: Point2<i32>) {
        self.left = center.x - self.width.div_euclid(2);
        self.top = center.y - self.height.div_euclid(2);
    }

    pub fn translate(&mut self, by: Vector2<i32>) {
        self.left += by.x;
        self.top += by.y;
    }

    pub fn translated(&self, by: Vector2<i32>) -> Rect {
        let mut r = *self;
        r.translate(by);
        r
    }

    /// Grows (or with negative values, shrinks) the rect around its center.
    pub fn inflate(&self, dw: i32, dh: i32) -> Rect {
        Rect::new(
            self.left - dw.div_euclid(2),
            self.top - dh.div_euclid(2),
            self.width + dw,
            self.height + dh,
        )
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left < other.right()
            && other.left < self.right()
            && self.top < other.bottom()
            && other.top < self.bottom()
    }
}

// ---------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod rect_tests {
    use super::*;

    #[test]
    fn edges_are_exclusive() {
        let r = Rect::new(145, 145, 10, 10);
        assert_eq!(r.right(), 155);
        assert_eq!(r.bottom(), 155);
        assert_eq!(r.center(), point2(150, 150));

        let touching = Rect::new(155, 145, 10, 10);
        assert!(!r.overlaps(&touching));
        assert!(r.overlaps(&touching.translated(vec2(-1, 0))));
    }

    #[test]
    fn inflate_keeps_center() {
        let r = Rect::from_center(point2(100, 80), vec2(48, 48));
        let shrunk = r.inflate(-18, -18);
        assert_eq!(shrunk.size(), vec2(30, 30));
        assert_eq!(shrunk.center(), r.center());

        let narrower = Rect::from_center(point2(100, 80), vec2(24, 32)).inflate(-8, 0);
        assert_eq!(narrower.size(), vec2(16, 32));
        assert_eq!(narrower.center(), point2(100, 80));
    }
}
