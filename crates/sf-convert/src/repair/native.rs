//! The in-process repair backend.

use std::path::Path;

use sf_repair::{RepairOptions, RepairPipeline};
use sf_stl::{export_stl, load_stl};

use crate::error::ConvertResult;
use crate::repair::{RepairOutcome, Repairer};

/// Runs the staged [`RepairPipeline`] on an STL file.
#[derive(Debug, Clone, Default)]
pub struct NativeRepairer {
    pipeline: RepairPipeline,
}

impl NativeRepairer {
    /// Backend with explicit pipeline options.
    #[must_use]
    pub const fn new(options: RepairOptions) -> Self {
        Self {
            pipeline: RepairPipeline::new(options),
        }
    }

    /// Backend with default pipeline options.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }
}

impl Repairer for NativeRepairer {
    /// Load, repair in place, export.
    ///
    /// Unlike the subprocess backend there is no advisory skip here:
    /// either the repaired mesh reaches `output` or a structural error
    /// ([`sf_repair::RepairError::GeometryLost`], an unreadable input,
    /// an unwritable destination) propagates.
    fn repair(&self, input: &Path, output: &Path) -> ConvertResult<RepairOutcome> {
        let mut mesh = load_stl(input)?;
        let report = self.pipeline.run(&mut mesh)?;
        export_stl(&mesh, output)?;
        Ok(RepairOutcome {
            report,
            applied: true,
        })
    }
}
