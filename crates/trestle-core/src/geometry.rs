//! Geometric value types used by layout and rendering.
//!
//! All coordinates are in diagram units with the origin at the top-left
//! corner and `y` growing downwards.

use serde::Deserialize;

/// A point in diagram space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Moves the point by the given offsets
    pub fn translate(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Returns true when both coordinates are finite numbers
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Represents the dimensions of an element with width and height
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f32 {
        self.height
    }

    /// Grows both dimensions by the given amounts
    pub fn grow(self, width: f32, height: f32) -> Self {
        Self {
            width: self.width + width,
            height: self.height + height,
        }
    }

    /// Returns a new Size with the maximum width and height between this size and another
    pub fn max(self, other: Size) -> Self {
        Self {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
        }
    }

    /// Returns a new Size with padding added to both width and height
    pub fn add_padding(self, insets: Insets) -> Self {
        Self {
            width: self.width + insets.horizontal_sum(),
            height: self.height + insets.vertical_sum(),
        }
    }

    /// Returns true if both width and height are zero
    pub fn is_zero(self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }

    /// Returns true when both dimensions are finite and not negative
    pub fn is_valid(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width >= 0.0 && self.height >= 0.0
    }
}

/// Spacing around the four sides of a rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Insets {
    top: f32,
    right: f32,
    bottom: f32,
    left: f32,
}

impl Insets {
    /// Creates insets with explicit values for each side, clockwise from the top
    pub fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Creates insets with the same value on every side
    pub fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn top(self) -> f32 {
        self.top
    }

    pub fn right(self) -> f32 {
        self.right
    }

    pub fn bottom(self) -> f32 {
        self.bottom
    }

    pub fn left(self) -> f32 {
        self.left
    }

    /// Sum of left and right insets
    pub fn horizontal_sum(self) -> f32 {
        self.left + self.right
    }

    /// Sum of top and bottom insets
    pub fn vertical_sum(self) -> f32 {
        self.top + self.bottom
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_point_translate() {
        let point = Point::new(1.0, 2.0).translate(3.0, -1.0);
        assert_approx_eq!(f32, point.x(), 4.0);
        assert_approx_eq!(f32, point.y(), 1.0);
    }

    #[test]
    fn test_size_grow_and_max() {
        let size = Size::new(10.0, 5.0).grow(2.0, 3.0);
        assert_approx_eq!(f32, size.width(), 12.0);
        assert_approx_eq!(f32, size.height(), 8.0);

        let max = size.max(Size::new(4.0, 20.0));
        assert_approx_eq!(f32, max.width(), 12.0);
        assert_approx_eq!(f32, max.height(), 20.0);
    }

    #[test]
    fn test_size_is_valid() {
        assert!(Size::new(0.0, 0.0).is_valid());
        assert!(!Size::new(-1.0, 0.0).is_valid());
        assert!(!Size::new(f32::NAN, 1.0).is_valid());
        assert!(!Size::new(1.0, f32::INFINITY).is_valid());
    }

    #[test]
    fn test_size_add_padding() {
        let size = Size::new(10.0, 10.0).add_padding(Insets::new(1.0, 2.0, 3.0, 4.0));
        assert_approx_eq!(f32, size.width(), 16.0);
        assert_approx_eq!(f32, size.height(), 14.0);
    }

    #[test]
    fn test_insets_uniform() {
        let insets = Insets::uniform(4.0);
        assert_approx_eq!(f32, insets.horizontal_sum(), 8.0);
        assert_approx_eq!(f32, insets.vertical_sum(), 8.0);
    }
}
