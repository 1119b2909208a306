//! Advisory counters describing what a repair pass did.

use std::fmt;

/// Counters accumulated across the repair stages.
///
/// All fields are advisory: a nonzero `holes_left_open` means the mesh
/// still has gaps the pipeline chose not to close, not that repair
/// failed. The same type carries the transcript of the external repair
/// tool, which fills whichever counters it reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Edges closed or resolved: vertex merges, splits, collapses.
    pub edges_fixed: usize,
    /// Faces whose winding was flipped.
    pub normals_fixed: usize,
    /// Faces removed (degenerate after welding, duplicates, slivers).
    pub facets_removed: usize,
    /// Faces added by hole filling.
    pub facets_added: usize,
    /// Boundary loops that were closed.
    pub holes_filled: usize,
    /// Boundary loops left open because they exceeded the size limit.
    pub holes_left_open: usize,
    /// Unreferenced vertices dropped.
    pub loose_removed: usize,
}

impl RepairReport {
    /// Whether any stage changed or skipped anything.
    #[must_use]
    pub fn had_changes(&self) -> bool {
        *self != Self::default()
    }
}

impl fmt::Display for RepairReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} edges fixed, {} normals fixed, {} facets removed, {} added, \
             {} holes filled ({} left open), {} loose vertices removed",
            self.edges_fixed,
            self.normals_fixed,
            self.facets_removed,
            self.facets_added,
            self.holes_filled,
            self.holes_left_open,
            self.loose_removed
        )
    }
}
