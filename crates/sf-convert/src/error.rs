//! Error types for conversion jobs.

use thiserror::Error;

use sf_brep::BrepError;
use sf_repair::RepairError;
use sf_stl::StlError;

/// Errors that abort a group's conversion.
///
/// Everything here is structural: the group's output file was not (or
/// could not be) produced. Advisory conditions like subprocess timeouts
/// or unfilled holes never become a `ConvertError`; they end up in the
/// repair report instead.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Malformed, unreadable or empty input geometry.
    #[error(transparent)]
    Geometry(#[from] BrepError),

    /// All geometry was lost during in-process repair.
    #[error(transparent)]
    Repair(#[from] RepairError),

    /// Mesh file reading or export failed.
    #[error(transparent)]
    Stl(#[from] StlError),

    /// An ordinal from the configuration fell outside the catalog.
    #[error("solid index {index} out of range for {count} solids")]
    SolidIndex {
        /// The configured ordinal.
        index: usize,
        /// How many solids the assembly enumerated.
        count: usize,
    },

    /// The job configuration is unusable.
    #[error("invalid configuration: {message}")]
    Config {
        /// What was wrong with it.
        message: String,
    },

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConvertError {
    /// Shorthand for [`ConvertError::Config`].
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Result alias for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;
