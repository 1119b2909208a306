//! Concrete-position triangle.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A triangle with explicit vertex positions.
///
/// Used for local calculations (normals, areas) where index lookups
/// would get in the way. Winding is counter-clockwise viewed from the
/// front, so [`normal`](Self::normal) follows the right-hand rule.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Triangle {
    /// First vertex.
    pub v0: Point3<f64>,
    /// Second vertex.
    pub v1: Point3<f64>,
    /// Third vertex.
    pub v2: Point3<f64>,
}

impl Triangle {
    /// Create a triangle from three points.
    #[inline]
    #[must_use]
    pub const fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    /// The unnormalized cross-product normal.
    ///
    /// Its magnitude is twice the triangle area; its direction follows
    /// the right-hand rule over the winding.
    #[inline]
    #[must_use]
    pub fn raw_normal(&self) -> Vector3<f64> {
        let e1 = self.v1 - self.v0;
        let e2 = self.v2 - self.v0;
        e1.cross(&e2)
    }

    /// The unit normal, or `None` for a degenerate triangle.
    ///
    /// # Example
    ///
    /// ```
    /// use sf_mesh::{Point3, Triangle};
    ///
    /// let tri = Triangle::new(
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 0.0, 0.0),
    ///     Point3::new(0.0, 1.0, 0.0),
    /// );
    /// let normal = tri.normal().unwrap();
    /// assert!((normal.z - 1.0).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn normal(&self) -> Option<Vector3<f64>> {
        let raw = self.raw_normal();
        let len = raw.norm();
        if len > f64::EPSILON {
            Some(raw / len)
        } else {
            None
        }
    }

    /// Triangle area.
    #[inline]
    #[must_use]
    pub fn area(&self) -> f64 {
        self.raw_normal().norm() * 0.5
    }
}
