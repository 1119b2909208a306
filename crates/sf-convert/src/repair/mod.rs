//! Interchangeable mesh repair backends.
//!
//! Both backends work at the file level - STL in, STL out - so the job
//! runner can route every group through either one without caring how
//! the repair happens. [`NativeRepairer`] runs the in-process staged
//! pipeline; [`AdmeshRepairer`] shells out to the external `admesh`
//! tool in a single invocation.

mod admesh;
mod native;

use std::path::Path;

use sf_repair::RepairReport;

use crate::config::RepairSettings;
use crate::error::ConvertResult;

pub use admesh::AdmeshRepairer;
pub use native::NativeRepairer;

/// What a repair attempt produced.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepairOutcome {
    /// Advisory counters; best-effort when the backend is external.
    pub report: RepairReport,
    /// Whether the output file actually carries a repaired mesh.
    ///
    /// `false` means the attempt was skipped or failed in a
    /// non-structural way (timeout, missing tool, non-zero exit); the
    /// caller then exports the pre-repair mesh instead.
    pub applied: bool,
}

/// The common file-level repair contract.
pub trait Repairer {
    /// Repair the mesh in `input`, writing the result to `output`.
    ///
    /// # Errors
    ///
    /// Only structural failures surface here: unreadable input, total
    /// geometry loss, unwritable output. Advisory conditions are
    /// reported through [`RepairOutcome::applied`] instead.
    fn repair(&self, input: &Path, output: &Path) -> ConvertResult<RepairOutcome>;
}

/// Build the configured backend.
#[must_use]
pub fn build_repairer(settings: &RepairSettings) -> Box<dyn Repairer> {
    match settings {
        RepairSettings::Native {
            merge_distance,
            max_hole_edges,
        } => {
            let options = sf_repair::RepairOptions::default()
                .with_merge_distance(*merge_distance)
                .with_max_hole_edges(*max_hole_edges);
            Box::new(NativeRepairer::new(options))
        }
        RepairSettings::Admesh {
            program,
            timeout_secs,
        } => Box::new(AdmeshRepairer::new(
            program.clone(),
            std::time::Duration::from_secs(*timeout_secs),
        )),
    }
}
