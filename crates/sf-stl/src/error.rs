//! Error types for STL reading and writing.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the STL codec.
#[derive(Debug, Error)]
pub enum StlError {
    /// The input file does not exist.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
    },

    /// The file content is not valid STL.
    #[error("invalid STL content: {message}")]
    InvalidContent {
        /// What was wrong with it.
        message: String,
    },

    /// A binary file ended before the declared triangle count.
    #[error("unexpected end of file: got {got} of {expected} triangles")]
    UnexpectedEof {
        /// Triangle count declared in the header.
        expected: u32,
        /// Triangles actually present.
        got: u32,
    },

    /// Refused to export a mesh with zero faces.
    #[error("refusing to write empty mesh to {path}")]
    EmptyMesh {
        /// Destination that was requested.
        path: PathBuf,
    },

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A number in an ASCII file failed to parse.
    #[error("invalid number in ASCII STL: {0}")]
    ParseFloat(#[from] std::num::ParseFloatError),
}

impl StlError {
    /// Shorthand for [`StlError::InvalidContent`].
    pub(crate) fn invalid_content(message: impl Into<String>) -> Self {
        Self::InvalidContent {
            message: message.into(),
        }
    }
}

/// Result alias for STL operations.
pub type StlResult<T> = Result<T, StlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = StlError::UnexpectedEof {
            expected: 100,
            got: 42,
        };
        let text = err.to_string();
        assert!(text.contains("42"));
        assert!(text.contains("100"));
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: StlError = io.into();
        assert!(matches!(err, StlError::Io(_)));
    }
}
