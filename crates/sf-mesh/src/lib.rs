//! Core mesh types for the stepforge pipeline.
//!
//! This crate defines the indexed triangle mesh that flows through
//! tessellation, repair and export, together with the small geometric
//! helpers the rest of the workspace shares:
//!
//! - [`TriMesh`] - indexed triangle mesh with `f64` positions
//! - [`Triangle`] - concrete-position triangle for local calculations
//! - [`Aabb`] - axis-aligned bounding box
//! - [`Axis`] - coordinate axis selector
//!
//! # Example
//!
//! ```
//! use sf_mesh::{Point3, TriMesh};
//!
//! let mesh = TriMesh::from_parts(
//!     vec![
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(0.0, 1.0, 0.0),
//!     ],
//!     vec![[0, 1, 2]],
//! );
//!
//! assert_eq!(mesh.face_count(), 1);
//! assert!(!mesh.bounds().is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![allow(clippy::module_name_repetitions)]

mod bounds;
mod mesh;
mod triangle;

pub use bounds::{Aabb, Axis};
pub use mesh::TriMesh;
pub use triangle::Triangle;

// Re-export the nalgebra types used in our public API.
pub use nalgebra::{Point3, Vector3};
