//! Error types for the CAD kernel boundary.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading, cataloging and tessellating B-rep geometry.
#[derive(Debug, Error)]
pub enum BrepError {
    /// The input file does not exist.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
    },

    /// The file content is not a STEP document the kernel understands.
    #[error("invalid STEP content: {message}")]
    InvalidStep {
        /// What was wrong with it.
        message: String,
    },

    /// An operation that needs at least one solid got none.
    #[error("assembly contains no solids")]
    EmptyAssembly,

    /// A solid ordinal fell outside the catalog.
    #[error("solid index {index} out of range for {count} solids")]
    SolidIndex {
        /// The requested ordinal.
        index: usize,
        /// How many solids the catalog holds.
        count: usize,
    },

    /// The kernel's discretization produced no triangles for a solid.
    ///
    /// Retrying with the same deflection is pointless; callers escalate
    /// or abort the group.
    #[error("tessellation produced no triangles for solid {solid}")]
    Meshing {
        /// Ordinal of the solid that failed.
        solid: usize,
    },

    /// A deflection bound was zero or negative.
    #[error("deflection must be strictly positive, got linear {linear}, angular {angular}")]
    InvalidDeflection {
        /// Requested linear deflection.
        linear: f64,
        /// Requested angular deflection.
        angular: f64,
    },

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BrepError {
    /// Shorthand for [`BrepError::InvalidStep`].
    pub(crate) fn invalid_step(message: impl Into<String>) -> Self {
        Self::InvalidStep {
            message: message.into(),
        }
    }
}

/// Result alias for B-rep operations.
pub type BrepResult<T> = Result<T, BrepError>;
