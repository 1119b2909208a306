//! Vertex welding and loose-vertex removal.

use hashbrown::HashMap;
use sf_mesh::{Point3, TriMesh};

/// Merge vertices closer than `distance` and drop the faces that
/// collapse in the process.
///
/// Each cluster keeps its lowest-index vertex; merged-away vertices are
/// removed from the array and face indices are rewritten. Loose vertices
/// that were not merged stay where they are.
///
/// After a pass, every surviving pair of vertices is at least `distance`
/// apart, so running the weld again with the same tolerance changes
/// nothing and returns zero.
///
/// Returns the number of vertices merged away.
///
/// # Example
///
/// ```
/// use sf_mesh::{Point3, TriMesh};
/// use sf_repair::weld_vertices;
///
/// let mut mesh = TriMesh::from_parts(
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///         Point3::new(1.00001, 0.0, 0.0), // near-duplicate of vertex 1
///     ],
///     vec![[0, 1, 2], [2, 3, 0]],
/// );
///
/// assert_eq!(weld_vertices(&mut mesh, 1e-4), 1);
/// assert_eq!(mesh.vertex_count(), 3);
/// assert_eq!(weld_vertices(&mut mesh, 1e-4), 0);
/// ```
pub fn weld_vertices(mesh: &mut TriMesh, distance: f64) -> usize {
    if mesh.vertices.is_empty() {
        return 0;
    }

    #[allow(clippy::cast_possible_truncation)]
    // Mesh indices are u32; meshes beyond 4B vertices are unsupported.
    let vertex_count = mesh.vertices.len() as u32;

    // Cells are two tolerances wide, so any pair within `distance` lands
    // in the same or an adjacent cell.
    let cell_size = distance * 2.0;
    let mut cells: HashMap<(i64, i64, i64), Vec<u32>> = HashMap::new();
    for (idx, position) in mesh.vertices.iter().enumerate() {
        #[allow(clippy::cast_possible_truncation)]
        // Bounded by vertex_count above.
        let idx = idx as u32;
        cells
            .entry(position_cell(position, cell_size))
            .or_default()
            .push(idx);
    }

    let mut remap: Vec<u32> = (0..vertex_count).collect();
    let mut merged = 0usize;

    for idx in 0..vertex_count {
        if remap[idx as usize] != idx {
            continue;
        }
        let position = mesh.vertices[idx as usize];
        let cell = position_cell(&position, cell_size);

        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let neighbor = (cell.0 + dx, cell.1 + dy, cell.2 + dz);
                    let Some(candidates) = cells.get(&neighbor) else {
                        continue;
                    };
                    for &other in candidates {
                        if other <= idx || remap[other as usize] != other {
                            continue;
                        }
                        let gap = (position - mesh.vertices[other as usize]).norm();
                        if gap < distance {
                            remap[other as usize] = idx;
                            merged += 1;
                        }
                    }
                }
            }
        }
    }

    if merged == 0 {
        return 0;
    }

    // Chase chains down to their final representative.
    for i in 0..remap.len() {
        let mut target = remap[i];
        while remap[target as usize] != target {
            target = remap[target as usize];
        }
        remap[i] = target;
    }

    // Compact out exactly the merged-away vertices.
    let mut compact: Vec<u32> = vec![0; remap.len()];
    let mut kept: Vec<Point3<f64>> = Vec::with_capacity(mesh.vertices.len() - merged);
    for (i, position) in mesh.vertices.iter().enumerate() {
        #[allow(clippy::cast_possible_truncation)]
        // Bounded by vertex_count above.
        let i = i as u32;
        if remap[i as usize] == i {
            #[allow(clippy::cast_possible_truncation)]
            // Kept count never exceeds the original vertex count.
            let new_idx = kept.len() as u32;
            compact[i as usize] = new_idx;
            kept.push(*position);
        }
    }

    for face in &mut mesh.faces {
        for slot in face {
            *slot = compact[remap[*slot as usize] as usize];
        }
    }
    mesh.vertices = kept;

    // Welding can collapse a triangle onto an edge or a point.
    mesh.faces.retain(|&[a, b, c]| a != b && b != c && a != c);

    merged
}

/// Remove vertices no face references and compact the vertex array.
///
/// Returns the number of vertices removed. Faces are never touched.
pub fn remove_loose_vertices(mesh: &mut TriMesh) -> usize {
    let mut referenced = vec![false; mesh.vertices.len()];
    for face in &mesh.faces {
        for &idx in face {
            referenced[idx as usize] = true;
        }
    }

    let loose = referenced.iter().filter(|&&r| !r).count();
    if loose == 0 {
        return 0;
    }

    let mut compact: Vec<u32> = vec![0; mesh.vertices.len()];
    let mut kept: Vec<Point3<f64>> = Vec::with_capacity(mesh.vertices.len() - loose);
    for (i, position) in mesh.vertices.iter().enumerate() {
        if referenced[i] {
            #[allow(clippy::cast_possible_truncation)]
            // Mesh indices are u32; meshes beyond 4B vertices are unsupported.
            let new_idx = kept.len() as u32;
            compact[i] = new_idx;
            kept.push(*position);
        }
    }

    for face in &mut mesh.faces {
        for slot in face {
            *slot = compact[*slot as usize];
        }
    }
    mesh.vertices = kept;

    loose
}

/// Spatial hash cell for a position.
fn position_cell(position: &Point3<f64>, cell_size: f64) -> (i64, i64, i64) {
    #[allow(clippy::cast_possible_truncation)]
    // Cell coordinates saturate long before i64 overflows for any real mesh.
    (
        (position.x / cell_size).floor() as i64,
        (position.y / cell_size).floor() as i64,
        (position.z / cell_size).floor() as i64,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seam_mesh() -> TriMesh {
        // Two triangles that should share an edge but carry duplicated
        // corner vertices, the way tessellators emit them.
        TriMesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(1.0, 0.0, 0.000_05),
                Point3::new(0.0, 1.0, 0.000_05),
                Point3::new(1.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [3, 5, 4]],
        )
    }

    #[test]
    fn weld_closes_a_seam() {
        let mut mesh = seam_mesh();
        let merged = weld_vertices(&mut mesh, 1e-4);
        assert_eq!(merged, 2);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 2);

        // The shared edge now references the same vertex indices.
        assert_eq!(mesh.faces[1][0], 1);
        assert_eq!(mesh.faces[1][2], 2);
    }

    #[test]
    fn weld_is_idempotent() {
        let mut mesh = seam_mesh();
        weld_vertices(&mut mesh, 1e-4);
        let before = mesh.clone();
        assert_eq!(weld_vertices(&mut mesh, 1e-4), 0);
        assert_eq!(mesh, before);
    }

    #[test]
    fn weld_drops_collapsed_faces() {
        let mut mesh = TriMesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(0.000_01, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        );
        let merged = weld_vertices(&mut mesh, 1e-4);
        assert_eq!(merged, 1);
        assert_eq!(mesh.face_count(), 0, "sliver collapses to an edge");
    }

    #[test]
    fn weld_keeps_untouched_loose_vertices() {
        let mut mesh = TriMesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(50.0, 50.0, 50.0), // loose, nowhere near anything
            ],
            vec![[0, 1, 2]],
        );
        // Nothing merges, so the pass must leave the mesh alone.
        assert_eq!(weld_vertices(&mut mesh, 1e-4), 0);
        assert_eq!(mesh.vertex_count(), 4);
    }

    #[test]
    fn weld_empty_mesh() {
        let mut mesh = TriMesh::new();
        assert_eq!(weld_vertices(&mut mesh, 1e-4), 0);
    }

    #[test]
    fn loose_removal_compacts_and_remaps() {
        let mut mesh = TriMesh::from_parts(
            vec![
                Point3::new(9.0, 9.0, 9.0), // loose
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[1, 2, 3]],
        );
        assert_eq!(remove_loose_vertices(&mut mesh), 1);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.faces[0], [0, 1, 2]);
    }

    #[test]
    fn loose_removal_noop_when_all_referenced() {
        let mut mesh = TriMesh::unit_cube();
        assert_eq!(remove_loose_vertices(&mut mesh), 0);
        assert_eq!(mesh.vertex_count(), 8);
    }
}
