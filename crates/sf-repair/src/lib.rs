//! Mesh repair for 3D printing.
//!
//! Raw tessellation output is rarely printable: every face carries its
//! own vertex copies, windings disagree between patches, small gaps and
//! non-manifold junctions survive from the B-rep. This crate turns such
//! a mesh into a watertight, consistently oriented one.
//!
//! The centerpiece is [`RepairPipeline`], which runs a fixed sequence of
//! in-place stages:
//!
//! 1. weld vertices closer than a tolerance ([`weld_vertices`])
//! 2. make windings consistent, outward for closed parts ([`fix_winding`])
//! 3. fill small boundary holes ([`fill_holes`])
//! 4. drop unreferenced vertices ([`remove_loose_vertices`])
//! 5. resolve non-manifold edges ([`repair_non_manifold`], or
//!    [`dissolve_degenerate`] when the preferred operator is unavailable)
//! 6. a final winding pass over whatever the later stages changed
//!
//! Imperfections a stage cannot fix are logged and counted in the
//! [`RepairReport`], never escalated; the single fatal condition is a
//! mesh that ends up with no faces at all.
//!
//! # Example
//!
//! ```
//! use sf_mesh::TriMesh;
//! use sf_repair::RepairPipeline;
//!
//! let mut mesh = TriMesh::unit_cube();
//! let report = RepairPipeline::default().run(&mut mesh)?;
//! assert!(!report.had_changes());
//! # Ok::<(), sf_repair::RepairError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![allow(clippy::module_name_repetitions)]

mod adjacency;
mod error;
mod holes;
mod manifold;
mod pipeline;
mod report;
mod weld;
mod winding;

pub use adjacency::MeshAdjacency;
pub use error::{RepairError, RepairResult};
pub use holes::{fill_holes, HoleFillStats};
pub use manifold::{
    dissolve_degenerate, remove_duplicate_faces, repair_non_manifold, DissolveStats, ManifoldStats,
};
pub use pipeline::{ManifoldCapability, RepairOptions, RepairPipeline};
pub use report::RepairReport;
pub use weld::{remove_loose_vertices, weld_vertices};
pub use winding::fix_winding;
