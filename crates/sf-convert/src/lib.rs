//! STEP-to-STL conversion jobs.
//!
//! Ties the workspace together: a JSON job file names the assemblies to
//! convert, how each one's solids are partitioned into output groups,
//! the tessellation fidelity and the repair backend. For every group
//! the runner tessellates a compound of the member solids, routes the
//! raw mesh through the configured [`Repairer`](repair::Repairer) and
//! exports a binary STL named `<id>_<label>.stl`.
//!
//! Structural failures abort only the group (or assembly) they occur
//! in; everything else in the job keeps going, and the summary records
//! who produced what.
//!
//! The `stepforge` binary in this crate is the command-line front end.
//!
//! # Example
//!
//! ```no_run
//! use sf_convert::{run_job, JobConfig};
//!
//! let config = JobConfig::from_path("job.json")?;
//! config.validate()?;
//! let summary = run_job(&config)?;
//! assert!(summary.all_succeeded());
//! # Ok::<(), sf_convert::ConvertError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![allow(clippy::module_name_repetitions)]

mod config;
mod error;
mod job;
mod partition;
pub mod repair;

pub use config::{AssemblyJob, JobConfig, RepairSettings, SUPPORTED_VERSION};
pub use error::{ConvertError, ConvertResult};
pub use job::{run_job, AssemblyReport, GroupReport, GroupStats, JobSummary};
pub use partition::{PartitionRule, SolidGroup};
