//! STL (stereolithography) file support.
//!
//! Reads and writes both STL encodings and provides the export entry
//! point the conversion pipeline hands finished meshes to.
//!
//! # Format detection
//!
//! [`load_stl`] sniffs the encoding: ASCII files start with `solid`,
//! but some binary exporters also write `solid` into their 80-byte
//! header, so a null byte anywhere in the header forces binary.
//!
//! # Binary layout
//!
//! ```text
//! UINT8[80]    - header, ignored on read
//! UINT32       - triangle count
//! per triangle
//!     REAL32[3] - normal (recomputed on write)
//!     REAL32[3] - vertex 1
//!     REAL32[3] - vertex 2
//!     REAL32[3] - vertex 3
//!     UINT16    - attribute byte count (zero)
//! ```
//!
//! Loaded meshes keep one vertex per triangle corner; deduplication is
//! the repair pipeline's job, not the codec's.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![allow(clippy::module_name_repetitions)]

mod error;
mod read;
mod write;

pub use error::{StlError, StlResult};
pub use read::load_stl;
pub use write::{export_stl, save_stl, StlFormat};
