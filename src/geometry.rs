//! Geometry value types used for window and monitor placement
//!
//! All three types carry an explicit validity flag so that "never observed"
//! can be told apart from "zero-sized at the origin". A default-constructed
//! value is invalid; any value built through a constructor is valid. The
//! types are immutable once built and are always passed around by value.

/// A position in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point<T> {
    valid: bool,
    x: T,
    y: T,
}

impl<T: Copy> Point<T> {
    /// Create a valid point from its coordinates.
    pub fn new(x: T, y: T) -> Self {
        Self { valid: true, x, y }
    }

    /// Whether this point holds real data.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// X coordinate.
    pub fn x(&self) -> T {
        self.x
    }

    /// Y coordinate.
    pub fn y(&self) -> T {
        self.y
    }
}

/// A two-dimensional extent. Width and height are never negative in a
/// valid instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size<T> {
    valid: bool,
    width: T,
    height: T,
}

impl<T: Copy> Size<T> {
    /// Create a valid size from its extents.
    pub fn new(width: T, height: T) -> Self {
        Self {
            valid: true,
            width,
            height,
        }
    }

    /// Whether this size holds real data.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Horizontal extent.
    pub fn width(&self) -> T {
        self.width
    }

    /// Vertical extent.
    pub fn height(&self) -> T {
        self.height
    }
}

/// A rectangle in screen coordinates: position plus extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect<T> {
    valid: bool,
    x: T,
    y: T,
    width: T,
    height: T,
}

impl<T: Copy> Rect<T> {
    /// Create a valid rectangle from position and extent components.
    pub fn new(x: T, y: T, width: T, height: T) -> Self {
        Self {
            valid: true,
            x,
            y,
            width,
            height,
        }
    }

    /// Create a valid rectangle from a point and a size.
    pub fn from_parts(pos: Point<T>, size: Size<T>) -> Self {
        Self {
            valid: true,
            x: pos.x(),
            y: pos.y(),
            width: size.width(),
            height: size.height(),
        }
    }

    /// Whether this rectangle holds real data.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// X coordinate of the top-left corner.
    pub fn x(&self) -> T {
        self.x
    }

    /// Y coordinate of the top-left corner.
    pub fn y(&self) -> T {
        self.y
    }

    /// Horizontal extent.
    pub fn width(&self) -> T {
        self.width
    }

    /// Vertical extent.
    pub fn height(&self) -> T {
        self.height
    }

    /// Position of the top-left corner.
    pub fn pos(&self) -> Point<T> {
        Point::new(self.x, self.y)
    }

    /// Extent of the rectangle.
    pub fn size(&self) -> Size<T> {
        Size::new(self.width, self.height)
    }
}

impl<T: Copy + std::ops::Add<Output = T>> Rect<T> {
    /// Left edge (same as `x`).
    pub fn left(&self) -> T {
        self.x
    }

    /// Right edge, computed as `x + width`.
    pub fn right(&self) -> T {
        self.x + self.width
    }

    /// Top edge (same as `y`).
    pub fn top(&self) -> T {
        self.y
    }

    /// Bottom edge, computed as `y + height`.
    pub fn bottom(&self) -> T {
        self.y + self.height
    }
}

impl Rect<i32> {
    /// Area of the overlap between two rectangles, zero when disjoint.
    pub(crate) fn intersection_area(&self, other: &Rect<i32>) -> i64 {
        let dx = i64::from(self.right().min(other.right())) - i64::from(self.left().max(other.left()));
        let dy = i64::from(self.bottom().min(other.bottom())) - i64::from(self.top().max(other.top()));
        if dx > 0 && dy > 0 {
            dx * dy
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values_are_invalid() {
        assert!(!Point::<i32>::default().is_valid());
        assert!(!Size::<i32>::default().is_valid());
        assert!(!Rect::<i32>::default().is_valid());
    }

    #[test]
    fn constructed_values_are_valid() {
        let r = Rect::new(10, 20, 300, 400);
        assert!(r.is_valid());
        assert_eq!(r.pos(), Point::new(10, 20));
        assert_eq!(r.size(), Size::new(300, 400));
    }

    #[test]
    fn zero_sized_rect_is_still_valid() {
        // "unset" and "zero-sized at origin" are different states
        assert!(Rect::new(0, 0, 0, 0).is_valid());
    }

    #[test]
    fn derived_edges() {
        let r = Rect::new(10, 20, 300, 400);
        assert_eq!(r.left(), 10);
        assert_eq!(r.right(), 310);
        assert_eq!(r.top(), 20);
        assert_eq!(r.bottom(), 420);
    }

    #[test]
    fn from_parts_round_trip() {
        let r = Rect::from_parts(Point::new(1, 2), Size::new(3, 4));
        assert_eq!(r, Rect::new(1, 2, 3, 4));
    }

    #[test]
    fn intersection_area_overlapping() {
        let a = Rect::new(0, 0, 100, 100);
        let b = Rect::new(50, 50, 100, 100);
        assert_eq!(a.intersection_area(&b), 50 * 50);
    }

    #[test]
    fn intersection_area_disjoint_is_zero() {
        let a = Rect::new(0, 0, 100, 100);
        let b = Rect::new(200, 0, 100, 100);
        assert_eq!(a.intersection_area(&b), 0);
        // touching edges do not count as overlap
        let c = Rect::new(100, 0, 50, 50);
        assert_eq!(a.intersection_area(&c), 0);
    }
}
