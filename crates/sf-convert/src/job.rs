//! The job runner: load, partition, tessellate, repair, export.

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use sf_brep::{Assembly, Deflection};
use sf_mesh::TriMesh;
use sf_repair::RepairReport;
use sf_stl::export_stl;

use crate::config::{AssemblyJob, JobConfig};
use crate::error::{ConvertError, ConvertResult};
use crate::partition::SolidGroup;
use crate::repair::{build_repairer, Repairer};

/// What one successfully exported group looks like.
#[derive(Debug, Clone, Copy)]
pub struct GroupStats {
    /// Size of the written file in bytes.
    pub bytes: u64,
    /// Advisory repair counters.
    pub repair: RepairReport,
    /// Whether the repaired mesh (rather than the pre-repair fallback)
    /// was exported.
    pub repair_applied: bool,
}

/// Outcome for one group of one assembly.
#[derive(Debug)]
pub struct GroupReport {
    /// Group label from the partition rule.
    pub label: String,
    /// Destination the group was written to (or should have been).
    pub path: PathBuf,
    /// Stats on success, the structural error otherwise.
    pub outcome: ConvertResult<GroupStats>,
}

/// Outcome for one assembly.
#[derive(Debug)]
pub struct AssemblyReport {
    /// Assembly identifier from the configuration.
    pub id: String,
    /// Per-group outcomes; empty when the assembly itself failed.
    pub groups: Vec<GroupReport>,
    /// Set when loading or partitioning failed before any group ran.
    pub error: Option<ConvertError>,
}

/// Everything a finished job did.
#[derive(Debug, Default)]
pub struct JobSummary {
    /// One report per configured assembly, in configuration order.
    pub assemblies: Vec<AssemblyReport>,
}

impl JobSummary {
    /// Whether every group of every assembly exported successfully.
    ///
    /// Advisory conditions (skipped repairs, open holes) do not count
    /// as failure; only structural errors do.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.assemblies.iter().all(|assembly| {
            assembly.error.is_none()
                && assembly.groups.iter().all(|group| group.outcome.is_ok())
        })
    }
}

/// Run a validated job configuration to completion.
///
/// Assemblies are processed in order, each owning its own freshly
/// loaded geometry; a structural failure in one group or assembly is
/// recorded and the rest continue independently.
///
/// # Errors
///
/// Only an uncreatable output directory aborts the whole job; every
/// other failure lands in the returned [`JobSummary`].
pub fn run_job(config: &JobConfig) -> ConvertResult<JobSummary> {
    std::fs::create_dir_all(&config.output_dir)?;
    let repairer = build_repairer(&config.repair);

    let mut summary = JobSummary::default();
    for job in &config.assemblies {
        summary
            .assemblies
            .push(convert_assembly(config, job, repairer.as_ref()));
    }

    let produced = summary
        .assemblies
        .iter()
        .flat_map(|a| &a.groups)
        .filter(|g| g.outcome.is_ok())
        .count();
    info!(produced, ok = summary.all_succeeded(), "job finished");
    Ok(summary)
}

fn convert_assembly(
    config: &JobConfig,
    job: &AssemblyJob,
    repairer: &dyn Repairer,
) -> AssemblyReport {
    let (assembly, groups) = match load_and_partition(job) {
        Ok(pair) => pair,
        Err(e) => {
            error!(id = %job.id, error = %e, "assembly failed before any group ran");
            return AssemblyReport {
                id: job.id.clone(),
                groups: Vec::new(),
                error: Some(e),
            };
        }
    };

    let mut reports = Vec::with_capacity(groups.len());
    for group in groups {
        if group.members.is_empty() {
            info!(id = %job.id, label = %group.label, "skipping empty group");
            continue;
        }
        let path = config.output_path(&job.id, &group.label);
        let outcome = convert_group(&assembly, &group, &config.deflection, &path, repairer);
        if let Err(e) = &outcome {
            error!(id = %job.id, label = %group.label, error = %e, "group failed");
        }
        reports.push(GroupReport {
            label: group.label,
            path,
            outcome,
        });
    }

    AssemblyReport {
        id: job.id.clone(),
        groups: reports,
        error: None,
    }
}

fn load_and_partition(job: &AssemblyJob) -> ConvertResult<(Assembly, Vec<SolidGroup>)> {
    let assembly = Assembly::load(&job.source)?;
    info!(id = %job.id, solids = assembly.solid_count(), "enumerated solids");
    let groups = job.rule.partition(assembly.solids())?;
    Ok((assembly, groups))
}

fn convert_group(
    assembly: &Assembly,
    group: &SolidGroup,
    deflection: &Deflection,
    destination: &Path,
    repairer: &dyn Repairer,
) -> ConvertResult<GroupStats> {
    let mesh = assembly.compound(&group.members)?.tessellate(deflection)?;
    export_with_repair(&mesh, destination, repairer)
}

/// Export `mesh` to `destination` via the repair backend.
///
/// The raw mesh goes through a temporary STL file into the repairer;
/// when the repair is skipped (subprocess timeout, missing tool) the
/// pre-repair mesh is exported instead, so a repairable defect never
/// costs the output file.
pub(crate) fn export_with_repair(
    mesh: &TriMesh,
    destination: &Path,
    repairer: &dyn Repairer,
) -> ConvertResult<GroupStats> {
    let raw = tempfile::Builder::new().suffix(".stl").tempfile()?;
    export_stl(mesh, raw.path())?;

    let outcome = repairer.repair(raw.path(), destination)?;
    if !outcome.applied {
        warn!(path = %destination.display(), "repair skipped, exporting pre-repair mesh");
        export_stl(mesh, destination)?;
    }

    let bytes = std::fs::metadata(destination)?.len();
    Ok(GroupStats {
        bytes,
        repair: outcome.report,
        repair_applied: outcome.applied,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RepairSettings;
    use crate::partition::PartitionRule;
    use crate::repair::RepairOutcome;

    /// Backend that pretends the external tool was unavailable.
    struct SkippingRepairer;

    impl Repairer for SkippingRepairer {
        fn repair(&self, _input: &Path, _output: &Path) -> ConvertResult<RepairOutcome> {
            Ok(RepairOutcome::default())
        }
    }

    /// Backend that "repairs" by copying the input through.
    struct CopyingRepairer;

    impl Repairer for CopyingRepairer {
        fn repair(&self, input: &Path, output: &Path) -> ConvertResult<RepairOutcome> {
            std::fs::copy(input, output)?;
            Ok(RepairOutcome {
                report: RepairReport {
                    edges_fixed: 1,
                    ..Default::default()
                },
                applied: true,
            })
        }
    }

    #[test]
    fn skipped_repair_falls_back_to_the_raw_mesh() {
        let dir = tempfile::tempdir().expect("temp dir");
        let destination = dir.path().join("part_left.stl");

        let stats = export_with_repair(&TriMesh::unit_cube(), &destination, &SkippingRepairer)
            .expect("fallback export succeeds");

        assert!(!stats.repair_applied);
        assert!(stats.bytes > 0);
        let exported = sf_stl::load_stl(&destination).expect("readable output");
        assert_eq!(exported.face_count(), 12, "pre-repair mesh was exported");
    }

    #[test]
    fn applied_repair_keeps_the_backend_output() {
        let dir = tempfile::tempdir().expect("temp dir");
        let destination = dir.path().join("part_right.stl");

        let stats = export_with_repair(&TriMesh::unit_cube(), &destination, &CopyingRepairer)
            .expect("export succeeds");

        assert!(stats.repair_applied);
        assert_eq!(stats.repair.edges_fixed, 1);
        assert!(destination.exists());
    }

    #[test]
    fn empty_mesh_never_reaches_the_repairer() {
        let dir = tempfile::tempdir().expect("temp dir");
        let destination = dir.path().join("empty.stl");
        let err = export_with_repair(&TriMesh::new(), &destination, &SkippingRepairer)
            .expect_err("zero faces is structural");
        assert!(matches!(
            err,
            ConvertError::Stl(sf_stl::StlError::EmptyMesh { .. })
        ));
    }

    #[test]
    fn failed_assemblies_do_not_stop_their_siblings() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = JobConfig {
            version: 1,
            output_dir: dir.path().join("out"),
            deflection: Deflection::default(),
            repair: RepairSettings::native_defaults(),
            assemblies: vec![
                AssemblyJob {
                    id: "first".to_owned(),
                    source: dir.path().join("missing_a.step"),
                    rule: PartitionRule::MergeAll {
                        label: "all".to_owned(),
                    },
                },
                AssemblyJob {
                    id: "second".to_owned(),
                    source: dir.path().join("missing_b.step"),
                    rule: PartitionRule::MergeAll {
                        label: "all".to_owned(),
                    },
                },
            ],
        };

        let summary = run_job(&config).expect("job itself runs");
        assert_eq!(summary.assemblies.len(), 2, "both assemblies were attempted");
        assert!(!summary.all_succeeded());
        for assembly in &summary.assemblies {
            assert!(matches!(
                assembly.error,
                Some(ConvertError::Geometry(sf_brep::BrepError::FileNotFound { .. }))
            ));
        }
    }

    #[test]
    fn empty_summary_counts_as_success() {
        assert!(JobSummary::default().all_succeeded());
    }
}
