//! Integer geometry in the global logical coordinate space.

use std::fmt;
use std::ops::{Add, Sub};

use serde::Serialize;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Size {
    pub w: i32,
    pub h: i32,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rectangle {
    pub loc: Point,
    pub size: Size,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Size {
    pub const fn new(w: i32, h: i32) -> Self {
        Self { w, h }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Size {
    fn from((w, h): (i32, i32)) -> Self {
        Self { w, h }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Self) -> Self::Output {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Self) -> Self::Output {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Rectangle {
    pub fn new(loc: impl Into<Point>, size: impl Into<Size>) -> Self {
        Self {
            loc: loc.into(),
            size: size.into(),
        }
    }

    pub fn from_size(size: impl Into<Size>) -> Self {
        Self::new(Point::default(), size)
    }

    pub fn is_empty(&self) -> bool {
        self.size.w <= 0 || self.size.h <= 0
    }

    pub fn right(&self) -> i32 {
        self.loc.x + self.size.w
    }

    pub fn bottom(&self) -> i32 {
        self.loc.y + self.size.h
    }

    /// Checks whether the point lies inside, counting the top-left edges but not the bottom-right.
    pub fn contains(&self, point: impl Into<Point>) -> bool {
        let p = point.into();
        self.loc.x <= p.x && p.x < self.right() && self.loc.y <= p.y && p.y < self.bottom()
    }

    /// Checks whether the two rectangles share any area.
    ///
    /// Rectangles that only touch along an edge do not overlap.
    pub fn overlaps(&self, other: Rectangle) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }

        self.loc.x < other.right()
            && other.loc.x < self.right()
            && self.loc.y < other.bottom()
            && other.loc.y < self.bottom()
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} at x={} y={}",
            self.size.w, self.size.h, self.loc.x, self.loc.y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_rectangles_dont_overlap() {
        let a = Rectangle::from_size((1920, 1080));
        let b = Rectangle::new((1920, 0), (1280, 720));
        assert!(!a.overlaps(b));
        assert!(!b.overlaps(a));

        let c = Rectangle::new((1919, 1079), (10, 10));
        assert!(a.overlaps(c));
    }

    #[test]
    fn empty_rectangles_dont_overlap() {
        let a = Rectangle::from_size((1920, 1080));
        let b = Rectangle::new((10, 10), (0, 100));
        assert!(b.is_empty());
        assert!(!a.overlaps(b));
    }

    #[test]
    fn contains_is_half_open() {
        let rect = Rectangle::new((100, 100), (50, 50));
        assert!(rect.contains((100, 100)));
        assert!(rect.contains((149, 149)));
        assert!(!rect.contains((150, 120)));
        assert!(!rect.contains((120, 150)));
        assert!(!rect.contains((99, 120)));
    }
}
