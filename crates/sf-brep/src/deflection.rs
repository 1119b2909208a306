//! Tessellation fidelity parameters.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{BrepError, BrepResult};

/// How finely a B-rep surface is approximated by triangles.
///
/// `linear` bounds the chord-to-surface distance, `angular` the angle
/// between adjacent facet normals, both in the source units (typically
/// millimeters and radians). Smaller values mean more triangles.
///
/// The truck kernel consumes the linear bound as its chordal tolerance;
/// the angular bound is validated and logged so configurations stay
/// portable to kernels that honor both.
///
/// # Example
///
/// ```
/// use sf_brep::Deflection;
///
/// let fine = Deflection::new(0.0005, 0.02)?;
/// assert!(fine.linear < Deflection::default().linear);
/// # Ok::<(), sf_brep::BrepError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Deflection {
    /// Maximum chord-to-surface distance.
    pub linear: f64,
    /// Maximum angle between adjacent surface normals, in radians.
    pub angular: f64,
}

impl Deflection {
    /// Create a validated deflection.
    ///
    /// # Errors
    ///
    /// Returns [`BrepError::InvalidDeflection`] unless both bounds are
    /// strictly positive.
    pub fn new(linear: f64, angular: f64) -> BrepResult<Self> {
        let deflection = Self { linear, angular };
        deflection.validate()?;
        Ok(deflection)
    }

    /// Check both bounds are strictly positive and finite.
    ///
    /// Deserialized configurations bypass [`Deflection::new`], so they
    /// run this before first use.
    ///
    /// # Errors
    ///
    /// Returns [`BrepError::InvalidDeflection`] for a bad bound.
    pub fn validate(&self) -> BrepResult<()> {
        let good = |v: f64| v.is_finite() && v > 0.0;
        if good(self.linear) && good(self.angular) {
            Ok(())
        } else {
            Err(BrepError::InvalidDeflection {
                linear: self.linear,
                angular: self.angular,
            })
        }
    }
}

impl Default for Deflection {
    /// High-precision default used by the conversion jobs: 1 micron of
    /// chordal error per millimeter-scale part, ~2.9 degrees angular.
    fn default() -> Self {
        Self {
            linear: 0.001,
            angular: 0.05,
        }
    }
}
