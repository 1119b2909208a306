//! The staged repair pipeline.

use sf_mesh::TriMesh;
use tracing::{debug, info, warn};

use crate::error::{RepairError, RepairResult};
use crate::holes::fill_holes;
use crate::manifold::{dissolve_degenerate, repair_non_manifold};
use crate::report::RepairReport;
use crate::weld::{remove_loose_vertices, weld_vertices};
use crate::winding::fix_winding;

/// Whether the preferred non-manifold operator may be used.
///
/// The probe is explicit so the fallback decision is visible at the
/// call site instead of hiding behind a caught error. `Disabled` models
/// hosting environments that ship without the operator; the pipeline
/// then runs the degraded dissolve path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ManifoldCapability {
    /// Probe at call time; use the preferred operator when present.
    #[default]
    Auto,
    /// Pretend the operator is missing and take the degraded path.
    Disabled,
}

impl ManifoldCapability {
    /// Whether the preferred operator is available right now.
    #[must_use]
    pub fn preferred_available(&self) -> bool {
        // The in-process operator is compiled into this crate, so the
        // probe only fails when a host explicitly disables it.
        matches!(self, Self::Auto)
    }
}

/// Tuning knobs for [`RepairPipeline`].
///
/// All distances are in mesh units (typically millimeters).
///
/// # Example
///
/// ```
/// use sf_repair::RepairOptions;
///
/// let options = RepairOptions::default()
///     .with_merge_distance(1e-3)
///     .with_max_hole_edges(50);
/// assert!((options.merge_distance - 1e-3).abs() < 1e-15);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepairOptions {
    /// Distance below which vertices are welded together.
    ///
    /// Also the dissolve tolerance on the degraded manifold path.
    /// Default: `1e-4`
    pub merge_distance: f64,

    /// Largest boundary loop, in edges, that hole filling will close.
    ///
    /// Default: `100`
    pub max_hole_edges: usize,

    /// Availability of the preferred non-manifold operator.
    pub manifold_capability: ManifoldCapability,
}

impl Default for RepairOptions {
    fn default() -> Self {
        Self {
            merge_distance: 1e-4,
            max_hole_edges: 100,
            manifold_capability: ManifoldCapability::Auto,
        }
    }
}

impl RepairOptions {
    /// Set the vertex welding distance.
    #[must_use]
    pub fn with_merge_distance(mut self, distance: f64) -> Self {
        self.merge_distance = distance;
        self
    }

    /// Set the hole-filling loop size limit.
    #[must_use]
    pub fn with_max_hole_edges(mut self, edges: usize) -> Self {
        self.max_hole_edges = edges;
        self
    }

    /// Set the manifold-operator capability.
    #[must_use]
    pub fn with_manifold_capability(mut self, capability: ManifoldCapability) -> Self {
        self.manifold_capability = capability;
        self
    }
}

/// The six-stage in-place repair sequence.
///
/// Stage order is part of the contract and never changes:
///
/// 1. weld vertices within `merge_distance`
/// 2. make windings consistent
/// 3. fill boundary holes up to `max_hole_edges`
/// 4. drop loose vertices (fatal if no faces remain)
/// 5. resolve non-manifold edges, degraded path if the preferred
///    operator is unavailable
/// 6. winding pass again, because stages 3 and 5 add and detach faces
///
/// Stages never retry and never abort on partial results; everything
/// they could not fix lands in the [`RepairReport`].
#[derive(Debug, Clone, Default)]
pub struct RepairPipeline {
    options: RepairOptions,
}

impl RepairPipeline {
    /// Pipeline with explicit options.
    #[must_use]
    pub const fn new(options: RepairOptions) -> Self {
        Self { options }
    }

    /// Pipeline with default options.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// The configured options.
    #[must_use]
    pub const fn options(&self) -> &RepairOptions {
        &self.options
    }

    /// Run every stage in order, mutating `mesh` in place.
    ///
    /// # Errors
    ///
    /// - [`RepairError::EmptyInput`] when the mesh has no faces to
    ///   begin with.
    /// - [`RepairError::GeometryLost`] when no face survives the
    ///   first four stages.
    pub fn run(&self, mesh: &mut TriMesh) -> RepairResult<RepairReport> {
        if mesh.is_empty() {
            return Err(RepairError::EmptyInput);
        }

        let mut report = RepairReport::default();
        let mut emptied_by = None;

        // Stage 1: merge by distance.
        let faces_before = mesh.face_count();
        let merged = weld_vertices(mesh, self.options.merge_distance);
        report.edges_fixed += merged;
        report.facets_removed += faces_before - mesh.face_count();
        debug!(merged, "weld pass");
        if mesh.is_empty() {
            emptied_by = Some("merge by distance");
        }

        // Stage 2: normal consistency.
        report.normals_fixed += fix_winding(mesh);

        // Stage 3: hole filling.
        let holes = fill_holes(mesh, self.options.max_hole_edges);
        report.holes_filled += holes.filled;
        report.holes_left_open += holes.skipped;
        report.facets_added += holes.faces_added;

        // Stage 4: loose geometry removal, then the only fatal check.
        report.loose_removed += remove_loose_vertices(mesh);
        if mesh.is_empty() {
            return Err(RepairError::GeometryLost {
                stage: emptied_by.unwrap_or("loose geometry removal"),
            });
        }

        // Stage 5: manifold repair, preferred or degraded.
        let residual = if self.options.manifold_capability.preferred_available() {
            let stats = repair_non_manifold(mesh);
            report.edges_fixed += stats.edges_split;
            report.facets_removed += stats.duplicates_removed;
            stats.remaining
        } else {
            debug!("preferred manifold operator unavailable, dissolving instead");
            let stats = dissolve_degenerate(mesh, self.options.merge_distance);
            report.edges_fixed += stats.edges_collapsed;
            report.facets_removed += stats.faces_removed;
            stats.remaining
        };
        if residual > 0 {
            warn!(edges = residual, "non-manifold edges remain after repair");
        }

        // Stage 6: later stages may have flipped or detached faces.
        report.normals_fixed += fix_winding(mesh);

        info!(
            vertices = mesh.vertex_count(),
            faces = mesh.face_count(),
            %report,
            "repair finished"
        );
        Ok(report)
    }
}
