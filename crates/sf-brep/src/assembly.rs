//! STEP loading, the solid catalog and compound tessellation.

use std::path::Path;

use sf_mesh::{Aabb, Axis, Point3, TriMesh};
use tracing::{debug, info, warn};
use truck_meshalgo::prelude::*;
use truck_polymesh::PolygonMesh;
use truck_stepio::r#in::Table;

use crate::deflection::Deflection;
use crate::error::{BrepError, BrepResult};

/// Tolerance for the coarse pre-pass that only computes bounding boxes.
const COARSE_TOLERANCE: f64 = 0.01;

/// One entry in the solid catalog.
///
/// The `entity_id` is the STEP file's own identifier for the shell; the
/// catalog position (the "ordinal") is what partition rules and index
/// tables refer to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolidRecord {
    /// STEP entity identifier of the shell.
    pub entity_id: u64,
    /// Axis-aligned bounds from a coarse triangulation pass.
    pub bounds: Aabb,
}

impl SolidRecord {
    /// Centroid coordinate along one axis, derived from the bounds.
    #[must_use]
    pub fn center_along(&self, axis: Axis) -> f64 {
        self.bounds.center_along(axis)
    }
}

/// A loaded STEP document with its solids cataloged in stable order.
///
/// Each conversion job owns its own `Assembly`; nothing is shared or
/// cached across jobs, so loading twice always starts from a clean
/// slate.
///
/// # Enumeration order
///
/// Solids are enumerated in ascending STEP entity-id order, which is
/// the order entities appear in the file. The order is stable across
/// runs of the same file, so positional indices in external
/// configuration stay meaningful.
pub struct Assembly {
    table: Table,
    records: Vec<SolidRecord>,
}

impl std::fmt::Debug for Assembly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assembly")
            .field("solids", &self.records.len())
            .finish_non_exhaustive()
    }
}

impl Assembly {
    /// Load a STEP file and catalog its solids.
    ///
    /// Shells the kernel cannot convert, and shells that produce no
    /// geometry at the coarse pass, are skipped with a warning rather
    /// than failing the load. Zero cataloged solids is a valid result;
    /// the operations that need at least one report
    /// [`BrepError::EmptyAssembly`] themselves.
    ///
    /// # Errors
    ///
    /// Returns [`BrepError::FileNotFound`] or [`BrepError::Io`] when
    /// the file cannot be read, and [`BrepError::InvalidStep`] when it
    /// does not parse as STEP.
    pub fn load<P: AsRef<Path>>(path: P) -> BrepResult<Self> {
        let path = path.as_ref();
        let step_string = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BrepError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                BrepError::Io(e)
            }
        })?;

        let exchange = truck_stepio::r#in::ruststep::parser::parse(&step_string)
            .map_err(|e| BrepError::invalid_step(format!("failed to parse STEP file: {e}")))?;
        if exchange.data.is_empty() {
            return Err(BrepError::invalid_step(
                "STEP file contains no data sections",
            ));
        }
        let table = Table::from_data_section(&exchange.data[0]);

        // Catalog in ascending entity-id order: the stable native order
        // that positional indices refer to.
        let mut ids: Vec<u64> = table.shell.keys().copied().collect();
        ids.sort_unstable();

        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(holder) = table.shell.get(&id) else {
                continue;
            };
            let Ok(shell) = table.to_compressed_shell(holder) else {
                warn!(entity = id, "skipping shell the kernel cannot convert");
                continue;
            };
            let poly = shell.robust_triangulation(COARSE_TOLERANCE).to_polygon();
            let bounds = polymesh_bounds(&poly);
            if bounds.is_empty() {
                warn!(entity = id, "skipping shell with no coarse geometry");
                continue;
            }
            records.push(SolidRecord {
                entity_id: id,
                bounds,
            });
        }

        info!(path = %path.display(), solids = records.len(), "loaded STEP assembly");
        Ok(Self { table, records })
    }

    /// The cataloged solids, in enumeration order.
    #[must_use]
    pub fn solids(&self) -> &[SolidRecord] {
        &self.records
    }

    /// Number of cataloged solids.
    #[must_use]
    pub fn solid_count(&self) -> usize {
        self.records.len()
    }

    /// Group the solids at `members` into a compound for tessellation.
    ///
    /// No boolean union happens; overlapping members stay independent
    /// volumes. A single-member group is the degenerate compound of one
    /// solid and costs nothing extra.
    ///
    /// # Errors
    ///
    /// Returns [`BrepError::EmptyAssembly`] for an empty member list
    /// (callers skip empty groups before assembling) and
    /// [`BrepError::SolidIndex`] for any out-of-range ordinal.
    pub fn compound(&self, members: &[usize]) -> BrepResult<Compound<'_>> {
        if members.is_empty() {
            return Err(BrepError::EmptyAssembly);
        }
        for &index in members {
            if index >= self.records.len() {
                return Err(BrepError::SolidIndex {
                    index,
                    count: self.records.len(),
                });
            }
        }
        Ok(Compound {
            assembly: self,
            members: members.to_vec(),
        })
    }

    /// Tessellate one cataloged solid into `mesh`.
    fn append_solid(&self, ordinal: usize, linear: f64, mesh: &mut TriMesh) -> BrepResult<()> {
        let record = &self.records[ordinal];
        let faces_before = mesh.face_count();

        let poly = self
            .table
            .shell
            .get(&record.entity_id)
            .and_then(|holder| self.table.to_compressed_shell(holder).ok())
            .map(|shell| shell.robust_triangulation(linear).to_polygon())
            .ok_or(BrepError::Meshing { solid: ordinal })?;
        append_polymesh(&poly, mesh);

        if mesh.face_count() == faces_before {
            return Err(BrepError::Meshing { solid: ordinal });
        }
        debug!(
            solid = ordinal,
            entity = record.entity_id,
            faces = mesh.face_count() - faces_before,
            "tessellated solid"
        );
        Ok(())
    }
}

/// A validated group of assembly solids awaiting tessellation.
///
/// Borrowing keeps the compound zero-cost: the B-rep data stays inside
/// the assembly and only the ordinals are carried.
#[derive(Debug)]
pub struct Compound<'a> {
    assembly: &'a Assembly,
    members: Vec<usize>,
}

impl Compound<'_> {
    /// Ordinals of the member solids.
    #[must_use]
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    /// Tessellate every member at the given deflection into one mesh.
    ///
    /// Blocking and CPU-bound. Deterministic: the same assembly and
    /// deflection reproduce the same vertex and face counts within a
    /// run. The raw output keeps duplicate vertices at shared edges and
    /// unmerged seams; welding is the repair pipeline's job.
    ///
    /// # Errors
    ///
    /// Returns [`BrepError::InvalidDeflection`] for bad bounds and
    /// [`BrepError::Meshing`] when a member yields no triangles. There
    /// is no retry path here; callers choose a different deflection or
    /// abort the group.
    pub fn tessellate(&self, deflection: &Deflection) -> BrepResult<TriMesh> {
        deflection.validate()?;
        // The kernel's triangulator takes a single chordal tolerance;
        // the angular bound is recorded for kernels that honor it.
        debug!(
            linear = deflection.linear,
            angular = deflection.angular,
            members = self.members.len(),
            "tessellating compound"
        );

        let mut mesh = TriMesh::new();
        for &ordinal in &self.members {
            self.assembly
                .append_solid(ordinal, deflection.linear, &mut mesh)?;
        }
        Ok(mesh)
    }
}

/// Bounding box of a kernel polygon mesh.
fn polymesh_bounds(poly: &PolygonMesh) -> Aabb {
    let mut bounds = Aabb::empty();
    for position in poly.positions() {
        bounds.expand_to_include(&Point3::new(position.x, position.y, position.z));
    }
    bounds
}

/// Append a kernel polygon mesh to our triangle mesh, triangulating
/// quads on the way.
#[allow(clippy::cast_possible_truncation)]
// Mesh indices are u32; meshes beyond 4B vertices are unsupported.
fn append_polymesh(poly: &PolygonMesh, mesh: &mut TriMesh) {
    let offset = mesh.vertices.len() as u32;

    for position in poly.positions() {
        mesh.vertices
            .push(Point3::new(position.x, position.y, position.z));
    }
    for face in poly.tri_faces() {
        mesh.faces.push([
            face[0].pos as u32 + offset,
            face[1].pos as u32 + offset,
            face[2].pos as u32 + offset,
        ]);
    }
    for quad in poly.quad_faces() {
        mesh.faces.push([
            quad[0].pos as u32 + offset,
            quad[1].pos as u32 + offset,
            quad[2].pos as u32 + offset,
        ]);
        mesh.faces.push([
            quad[0].pos as u32 + offset,
            quad[2].pos as u32 + offset,
            quad[3].pos as u32 + offset,
        ]);
    }
}
