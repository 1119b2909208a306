//! End-to-end jobs over kernel-generated STEP fixtures.
//!
//! The fixture is the same shape the tessellation tests use: a unit
//! tetrahedron of planar faces written through the kernel's STEP
//! writer, optionally with the data section duplicated (renumbered) to
//! yield a two-shell assembly.

use truck_modeling::{builder, Face, Point3 as CadPoint, Shell, Wire};
use truck_stepio::out::{CompleteStepDisplay, StepHeaderDescriptor, StepModel};

use sf_brep::Deflection;
use sf_convert::{run_job, AssemblyJob, JobConfig, PartitionRule, RepairSettings};
use sf_mesh::Axis;

fn triangle_face(p0: CadPoint, p1: CadPoint, p2: CadPoint) -> Face {
    let v0 = builder::vertex(p0);
    let v1 = builder::vertex(p1);
    let v2 = builder::vertex(p2);
    let e0 = builder::line(&v0, &v1);
    let e1 = builder::line(&v1, &v2);
    let e2 = builder::line(&v2, &v0);
    let wire = Wire::from(vec![e0, e1, e2]);
    builder::try_attach_plane(&[wire]).expect("planar triangle attaches")
}

fn tetrahedron_step() -> String {
    let a = CadPoint::new(0.0, 0.0, 0.0);
    let b = CadPoint::new(1.0, 0.0, 0.0);
    let c = CadPoint::new(0.0, 1.0, 0.0);
    let d = CadPoint::new(0.0, 0.0, 1.0);
    let shell: Shell = vec![
        triangle_face(a, c, b),
        triangle_face(a, b, d),
        triangle_face(a, d, c),
        triangle_face(b, c, d),
    ]
    .into();
    CompleteStepDisplay::new(
        StepModel::from(&shell.compress()),
        StepHeaderDescriptor {
            organization_system: "stepforge".to_owned(),
            ..Default::default()
        },
    )
    .to_string()
}

fn shift_entity_ids(body: &str, offset: u64) -> (String, u64) {
    let mut out = String::with_capacity(body.len() + 64);
    let mut max = 0;
    let bytes = body.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'#' {
            let start = i + 1;
            let mut end = start;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            if end > start {
                let id: u64 = body[start..end].parse().expect("entity id digits");
                max = max.max(id);
                out.push('#');
                out.push_str(&(id + offset).to_string());
                i = end;
                continue;
            }
        }
        out.push(bytes[i] as char);
        i += 1;
    }
    (out, max)
}

/// Repeat the data section with renumbered entities: two identical
/// shells in one file.
fn doubled_step(step: &str) -> String {
    let data_start = step.find("DATA;").expect("data section") + "DATA;".len();
    let data_end = data_start + step[data_start..].find("ENDSEC;").expect("data section end");
    let body = &step[data_start..data_end];
    let (_, max) = shift_entity_ids(body, 0);
    let (copy, _) = shift_entity_ids(body, max);
    format!("{}\n{}{}", &step[..data_end], copy, &step[data_end..])
}

fn job_config(output_dir: std::path::PathBuf, source: std::path::PathBuf, rule: PartitionRule) -> JobConfig {
    JobConfig {
        version: 1,
        output_dir,
        deflection: Deflection::default(),
        repair: RepairSettings::native_defaults(),
        assemblies: vec![AssemblyJob {
            id: "tet".to_owned(),
            source,
            rule,
        }],
    }
}

#[test]
fn spatial_split_job_exports_the_populated_group() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = dir.path().join("tet.step");
    std::fs::write(&source, doubled_step(&tetrahedron_step())).expect("write fixture");

    let config = job_config(
        dir.path().join("out"),
        source,
        PartitionRule::SpatialSplit {
            axis: Axis::X,
            low_label: "left".to_owned(),
            high_label: "right".to_owned(),
        },
    );
    config.validate().expect("valid config");

    let summary = run_job(&config).expect("job runs");
    assert!(summary.all_succeeded());

    // Identical centroids all tie into the high group; the empty low
    // group is skipped rather than written.
    assert!(!config.output_path("tet", "left").exists());
    let right = sf_stl::load_stl(config.output_path("tet", "right")).expect("readable output");
    assert!(right.face_count() > 0);
}

#[test]
fn ordinal_extract_job_exports_both_groups() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = dir.path().join("tet.step");
    std::fs::write(&source, doubled_step(&tetrahedron_step())).expect("write fixture");

    let config = job_config(
        dir.path().join("out"),
        source,
        PartitionRule::OrdinalExtract {
            index: 0,
            label: "main".to_owned(),
            rest_label: "rest".to_owned(),
        },
    );
    config.validate().expect("valid config");

    let summary = run_job(&config).expect("job runs");
    assert!(summary.all_succeeded());
    assert_eq!(summary.assemblies.len(), 1);
    assert_eq!(summary.assemblies[0].groups.len(), 2);

    let main = sf_stl::load_stl(config.output_path("tet", "main")).expect("readable output");
    let rest = sf_stl::load_stl(config.output_path("tet", "rest")).expect("readable output");
    assert!(main.face_count() > 0);
    // One identical shell per group repairs to the same mesh.
    assert_eq!(main.face_count(), rest.face_count());
}
