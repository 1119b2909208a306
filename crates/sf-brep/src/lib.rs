//! The CAD kernel boundary for the stepforge pipeline.
//!
//! Wraps the truck kernel behind three small types so the rest of the
//! workspace never touches kernel types directly:
//!
//! - [`Assembly`] - a loaded STEP document with its solids cataloged in
//!   stable, ascending entity-id order
//! - [`Compound`] - a validated group of solids awaiting tessellation
//! - [`Deflection`] - tessellation fidelity bounds
//!
//! Loading computes each solid's bounding box from a coarse
//! triangulation pass, which is what spatial partitioning reads.
//! Tessellation proper happens per group, at the caller's deflection,
//! and hands the raw (seam-duplicated) mesh to the repair pipeline.
//!
//! # Example
//!
//! ```no_run
//! use sf_brep::{Assembly, Deflection};
//!
//! let assembly = Assembly::load("part.step")?;
//! println!("{} solids", assembly.solid_count());
//!
//! let everything: Vec<usize> = (0..assembly.solid_count()).collect();
//! let mesh = assembly.compound(&everything)?.tessellate(&Deflection::default())?;
//! # Ok::<(), sf_brep::BrepError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![allow(clippy::module_name_repetitions)]

mod assembly;
mod deflection;
mod error;

pub use assembly::{Assembly, Compound, SolidRecord};
pub use deflection::Deflection;
pub use error::{BrepError, BrepResult};
