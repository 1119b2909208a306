//! Axis-aligned bounding boxes and axis selection.

use std::fmt;

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A coordinate axis.
///
/// Used to pick the split direction when partitioning solids and to read
/// a single component out of points and boxes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Axis {
    /// The X axis.
    #[default]
    X,
    /// The Y axis.
    Y,
    /// The Z axis.
    Z,
}

impl Axis {
    /// The component of `point` along this axis.
    #[must_use]
    pub fn component(self, point: &Point3<f64>) -> f64 {
        match self {
            Self::X => point.x,
            Self::Y => point.y,
            Self::Z => point.z,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => write!(f, "x"),
            Self::Y => write!(f, "y"),
            Self::Z => write!(f, "z"),
        }
    }
}

/// An axis-aligned bounding box.
///
/// The empty box uses an inverted sentinel (`min = +inf`, `max = -inf`)
/// so that expanding it with any point produces a valid box.
///
/// # Example
///
/// ```
/// use sf_mesh::{Aabb, Point3};
///
/// let mut aabb = Aabb::empty();
/// aabb.expand_to_include(&Point3::new(1.0, 2.0, 3.0));
/// aabb.expand_to_include(&Point3::new(-1.0, 0.0, 5.0));
///
/// assert!((aabb.center().x - 0.0).abs() < 1e-12);
/// assert!((aabb.size().z - 2.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point3<f64>,
    /// Maximum corner.
    pub max: Point3<f64>,
}

impl Aabb {
    /// Create a box from explicit corners.
    #[must_use]
    pub const fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// The empty box. Absorbs any point via [`expand_to_include`].
    ///
    /// [`expand_to_include`]: Self::expand_to_include
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Bounding box of a set of points.
    ///
    /// Returns [`Aabb::empty`] for an empty set.
    #[must_use]
    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a Point3<f64>>,
    {
        let mut aabb = Self::empty();
        for point in points {
            aabb.expand_to_include(point);
        }
        aabb
    }

    /// Grow the box to contain `point`.
    pub fn expand_to_include(&mut self, point: &Point3<f64>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    /// The smallest box containing both boxes.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut result = *self;
        result.expand_to_include(&other.min);
        result.expand_to_include(&other.max);
        result
    }

    /// Whether the box contains nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Center point. Unspecified for an empty box.
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Extent along each axis.
    #[must_use]
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Length of the box diagonal.
    #[must_use]
    pub fn diameter(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.size().norm()
        }
    }

    /// Midpoint coordinate along one axis, `(min + max) / 2`.
    #[must_use]
    pub fn center_along(&self, axis: Axis) -> f64 {
        (axis.component(&self.min) + axis.component(&self.max)) / 2.0
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_box_is_empty() {
        let aabb = Aabb::empty();
        assert!(aabb.is_empty());
        assert!((aabb.diameter() - 0.0).abs() < 1e-12);
    }

    #[test]
    fn expand_from_empty() {
        let mut aabb = Aabb::empty();
        aabb.expand_to_include(&Point3::new(1.0, -2.0, 3.0));
        assert!(!aabb.is_empty());
        assert_eq!(aabb.min, aabb.max);
    }

    #[test]
    fn from_points_covers_extremes() {
        let points = [
            Point3::new(-1.0, 0.0, 2.0),
            Point3::new(4.0, -3.0, 0.5),
            Point3::new(0.0, 1.0, 1.0),
        ];
        let aabb = Aabb::from_points(&points);
        assert!((aabb.min.x - -1.0).abs() < 1e-12);
        assert!((aabb.min.y - -3.0).abs() < 1e-12);
        assert!((aabb.max.x - 4.0).abs() < 1e-12);
        assert!((aabb.max.z - 2.0).abs() < 1e-12);
    }

    #[test]
    fn union_of_disjoint_boxes() {
        let a = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Point3::new(5.0, 5.0, 5.0), Point3::new(6.0, 6.0, 6.0));
        let u = a.union(&b);
        assert!((u.min.x - 0.0).abs() < 1e-12);
        assert!((u.max.x - 6.0).abs() < 1e-12);
    }

    #[test]
    fn center_along_each_axis() {
        let aabb = Aabb::new(Point3::new(0.0, -2.0, 10.0), Point3::new(4.0, 2.0, 20.0));
        assert!((aabb.center_along(Axis::X) - 2.0).abs() < 1e-12);
        assert!((aabb.center_along(Axis::Y) - 0.0).abs() < 1e-12);
        assert!((aabb.center_along(Axis::Z) - 15.0).abs() < 1e-12);
    }

    #[test]
    fn axis_component_and_display() {
        let p = Point3::new(1.0, 2.0, 3.0);
        assert!((Axis::X.component(&p) - 1.0).abs() < 1e-12);
        assert!((Axis::Y.component(&p) - 2.0).abs() < 1e-12);
        assert!((Axis::Z.component(&p) - 3.0).abs() < 1e-12);
        assert_eq!(Axis::Z.to_string(), "z");
    }

    #[test]
    fn default_axis_is_x() {
        assert_eq!(Axis::default(), Axis::X);
    }
}
