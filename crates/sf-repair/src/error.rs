//! Error types for mesh repair.

use thiserror::Error;

/// Fatal repair failures.
///
/// Repair is deliberately forgiving: stages log and count what they
/// cannot fix. The only unrecoverable outcomes are the ones below.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepairError {
    /// The mesh had no faces before repair began.
    #[error("cannot repair a mesh with no faces")]
    EmptyInput,

    /// Every face was removed while repairing.
    #[error("mesh lost all geometry during {stage}")]
    GeometryLost {
        /// The stage after which no faces remained.
        stage: &'static str,
    },
}

/// Result alias for repair operations.
pub type RepairResult<T> = Result<T, RepairError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_stage() {
        let err = RepairError::GeometryLost {
            stage: "loose geometry removal",
        };
        assert!(err.to_string().contains("loose geometry removal"));
    }
}
