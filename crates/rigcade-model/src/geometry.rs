//! 2D geometry primitives shared by layers, bones, and attachments.
//!
//! Layer bounds arrive in image space (y grows downward). Bones and
//! attachments live in rig space (y grows upward), which is what the
//! exported project document expects. [`image_to_rig`] is the single
//! place where the flip happens.

use serde::{Deserialize, Serialize};

/// A point or vector in 2D.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The origin.
    pub const ORIGIN: Point = Point::new(0.0, 0.0);

    /// Euclidean distance to another point.
    pub fn distance(&self, other: Point) -> f64 {
        (other - *self).length()
    }

    /// Length of this point treated as a vector.
    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Rotates this vector counter-clockwise by `degrees`.
    pub fn rotated(&self, degrees: f64) -> Point {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Point::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// Angle of this vector in degrees, counter-clockwise from +X.
    pub fn angle_degrees(&self) -> f64 {
        self.y.atan2(self.x).to_degrees()
    }

    /// Linear interpolation towards `other`.
    pub fn lerp(&self, other: Point, t: f64) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Axis-aligned rectangle in image space (`y` is the top edge).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width (non-negative).
    pub width: f64,
    /// Height (non-negative).
    pub height: f64,
}

impl Rect {
    /// Creates a new rectangle.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Center point.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Area; zero for degenerate rectangles.
    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Returns true if the rectangle covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }

    /// Length of the longer side.
    pub fn long_extent(&self) -> f64 {
        self.width.max(self.height)
    }

    /// Endpoints of the long axis through the center, in image space.
    ///
    /// Horizontal when `width >= height`, otherwise vertical. The order of
    /// the returned pair carries no meaning; callers pick the proximal end.
    pub fn long_axis(&self) -> (Point, Point) {
        let c = self.center();
        if self.width >= self.height {
            (Point::new(self.x, c.y), Point::new(self.right(), c.y))
        } else {
            (Point::new(c.x, self.y), Point::new(c.x, self.bottom()))
        }
    }
}

/// A static 2D transform: translation, rotation (degrees), and scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform2D {
    /// Translation X.
    pub x: f64,
    /// Translation Y.
    pub y: f64,
    /// Rotation in degrees, counter-clockwise.
    pub rotation: f64,
    /// Scale along X.
    pub scale_x: f64,
    /// Scale along Y.
    pub scale_y: f64,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

impl Transform2D {
    /// Unscaled transform from a position and rotation.
    pub fn new(position: Point, rotation: f64) -> Self {
        Self {
            x: position.x,
            y: position.y,
            rotation,
            ..Self::default()
        }
    }

    /// Translation component.
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Converts an image-space point (y down) to rig space (y up).
pub fn image_to_rig(p: Point) -> Point {
    Point::new(p.x, -p.y)
}

/// Wraps an angle into `(-180, 180]` degrees.
pub fn normalize_degrees(angle: f64) -> f64 {
    let mut a = angle % 360.0;
    if a <= -180.0 {
        a += 360.0;
    } else if a > 180.0 {
        a -= 360.0;
    }
    a
}

/// Rounds to a fixed number of decimals so emitted numbers stay stable.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let rounded = (value * factor).round() / factor;
    // Avoid "-0" in output.
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotated_quarter_turn() {
        let p = Point::new(1.0, 0.0).rotated(90.0);
        assert!((p.x - 0.0).abs() < 1e-12);
        assert!((p.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rect_union_and_center() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 5.0, 10.0, 20.0);
        let u = a.union(&b);
        assert_eq!(u, Rect::new(0.0, 0.0, 30.0, 25.0));
        assert_eq!(u.center(), Point::new(15.0, 12.5));
    }

    #[test]
    fn test_long_axis_orientation() {
        let wide = Rect::new(0.0, 0.0, 40.0, 10.0);
        assert_eq!(
            wide.long_axis(),
            (Point::new(0.0, 5.0), Point::new(40.0, 5.0))
        );

        let tall = Rect::new(0.0, 0.0, 10.0, 40.0);
        assert_eq!(
            tall.long_axis(),
            (Point::new(5.0, 0.0), Point::new(5.0, 40.0))
        );
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(270.0), -90.0);
        assert_eq!(normalize_degrees(-270.0), 90.0);
        assert_eq!(normalize_degrees(180.0), 180.0);
        assert_eq!(normalize_degrees(-180.0), 180.0);
    }

    #[test]
    fn test_round_to_strips_negative_zero() {
        assert_eq!(round_to(-0.00001, 3).to_bits(), 0.0f64.to_bits());
        assert_eq!(round_to(1.23456, 2), 1.23);
    }
}
