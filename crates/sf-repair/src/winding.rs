//! Winding consistency across connected components.

use std::collections::VecDeque;

use sf_mesh::TriMesh;
use tracing::debug;

use crate::adjacency::MeshAdjacency;

/// Make face windings agree across each connected component and point
/// closed components outward.
///
/// Consensus spreads by flood fill from the lowest-index face of each
/// component, crossing only edges with exactly two incident faces. A
/// face whose traversal direction matches its neighbor's (instead of
/// opposing it) is flipped. Boundary and non-manifold edges stop the
/// propagation, so non-orientable regions keep whatever they had.
///
/// A component whose edges all carry two faces is closed; if its signed
/// volume comes out negative the whole component is turned outward.
///
/// Returns the number of faces flipped.
///
/// # Example
///
/// ```
/// use sf_mesh::TriMesh;
/// use sf_repair::fix_winding;
///
/// let mut cube = TriMesh::unit_cube();
/// cube.faces[3].swap(1, 2); // sabotage one face
///
/// assert_eq!(fix_winding(&mut cube), 1);
/// assert!((cube.signed_volume() - 1.0).abs() < 1e-12);
/// ```
pub fn fix_winding(mesh: &mut TriMesh) -> usize {
    if mesh.faces.is_empty() {
        return 0;
    }

    let adjacency = MeshAdjacency::build(&mesh.faces);
    let mut visited = vec![false; mesh.faces.len()];
    let mut flipped = 0usize;

    for seed in 0..mesh.faces.len() {
        if visited[seed] {
            continue;
        }

        let mut component = Vec::new();
        let mut closed = true;
        let mut queue = VecDeque::new();
        visited[seed] = true;
        queue.push_back(seed);

        while let Some(face_idx) = queue.pop_front() {
            component.push(face_idx);
            let face = mesh.faces[face_idx];

            for (a, b) in [(face[0], face[1]), (face[1], face[2]), (face[2], face[0])] {
                let incident = adjacency.edge_faces(a, b);
                if incident.len() != 2 {
                    // Boundary or non-manifold: no propagation, and the
                    // component cannot be a closed volume.
                    closed = false;
                    continue;
                }
                for &neighbor in incident {
                    if neighbor == face_idx || visited[neighbor] {
                        continue;
                    }
                    // A consistent neighbor traverses the shared edge in
                    // the opposite direction.
                    if traverses_directed(mesh.faces[neighbor], a, b) {
                        mesh.faces[neighbor].swap(1, 2);
                        flipped += 1;
                    }
                    visited[neighbor] = true;
                    queue.push_back(neighbor);
                }
            }
        }

        if closed && subset_signed_volume(mesh, &component) < 0.0 {
            debug!(
                faces = component.len(),
                "turning inside-out component outward"
            );
            for &face_idx in &component {
                mesh.faces[face_idx].swap(1, 2);
            }
            flipped += component.len();
        }
    }

    flipped
}

/// Whether `face` walks the directed edge `a -> b`.
fn traverses_directed(face: [u32; 3], a: u32, b: u32) -> bool {
    (face[0] == a && face[1] == b)
        || (face[1] == a && face[2] == b)
        || (face[2] == a && face[0] == b)
}

/// Signed volume contribution of a subset of faces.
fn subset_signed_volume(mesh: &TriMesh, faces: &[usize]) -> f64 {
    let mut six_volumes = 0.0;
    for &face_idx in faces {
        let [i0, i1, i2] = mesh.faces[face_idx];
        let v0 = mesh.vertices[i0 as usize].coords;
        let v1 = mesh.vertices[i1 as usize].coords;
        let v2 = mesh.vertices[i2 as usize].coords;
        six_volumes += v0.dot(&v1.cross(&v2));
    }
    six_volumes / 6.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_mesh::Point3;

    #[test]
    fn clean_cube_untouched() {
        let mut cube = TriMesh::unit_cube();
        let before = cube.clone();
        assert_eq!(fix_winding(&mut cube), 0);
        assert_eq!(cube, before);
    }

    #[test]
    fn single_bad_face_gets_flipped() {
        let mut cube = TriMesh::unit_cube();
        cube.faces[7].swap(1, 2);
        assert_eq!(fix_winding(&mut cube), 1);
        assert!((cube.signed_volume() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn inside_out_cube_gets_turned() {
        let mut cube = TriMesh::unit_cube();
        cube.flip_faces();
        assert_eq!(fix_winding(&mut cube), 12);
        assert!((cube.signed_volume() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn open_sheet_is_made_consistent_but_not_reoriented() {
        // Two triangles of a quad, second one wound backwards.
        let mut mesh = TriMesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 3, 2]],
        );
        assert_eq!(fix_winding(&mut mesh), 1);
        assert_eq!(mesh.faces[1], [0, 2, 3]);

        // A second pass has nothing left to do.
        assert_eq!(fix_winding(&mut mesh), 0);
    }

    #[test]
    fn components_are_handled_independently() {
        // Two separated cubes, the second inverted.
        let mut mesh = TriMesh::unit_cube();
        let mut second = TriMesh::unit_cube();
        for v in &mut second.vertices {
            v.x += 10.0;
        }
        second.flip_faces();
        mesh.merge(&second);

        assert_eq!(fix_winding(&mut mesh), 12);
        assert!((mesh.signed_volume() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn propagation_stops_at_non_manifold_edges() {
        // Two proper faces on edge (1,2) plus a fin with reversed winding.
        // The fin disagrees but sits across a 3-face edge, so it stays.
        let mut mesh = TriMesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(1.0, 0.5, 1.0),
            ],
            vec![[0, 1, 2], [1, 3, 2], [1, 2, 4]],
        );
        let before = mesh.faces.clone();
        assert_eq!(fix_winding(&mut mesh), 0);
        assert_eq!(mesh.faces, before);
    }

    #[test]
    fn empty_mesh_is_a_noop() {
        let mut mesh = TriMesh::new();
        assert_eq!(fix_winding(&mut mesh), 0);
    }
}
