//! Edge adjacency for triangle meshes.

use hashbrown::HashMap;

/// Face adjacency indexed by undirected edge.
///
/// Edges are keyed as `(low, high)` vertex-index pairs. An edge with one
/// incident face lies on a boundary; an edge with more than two is
/// non-manifold. Built once per query pass; mutating the mesh
/// invalidates it.
#[derive(Debug)]
pub struct MeshAdjacency {
    edge_to_faces: HashMap<(u32, u32), Vec<usize>>,
}

/// Normalize an edge so the smaller index comes first.
#[inline]
pub(crate) fn edge_key(a: u32, b: u32) -> (u32, u32) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

impl MeshAdjacency {
    /// Build adjacency from a face list.
    #[must_use]
    pub fn build(faces: &[[u32; 3]]) -> Self {
        let mut edge_to_faces: HashMap<(u32, u32), Vec<usize>> = HashMap::new();
        for (face_idx, &[a, b, c]) in faces.iter().enumerate() {
            for (u, v) in [(a, b), (b, c), (c, a)] {
                edge_to_faces.entry(edge_key(u, v)).or_default().push(face_idx);
            }
        }
        Self { edge_to_faces }
    }

    /// Faces incident to the undirected edge `{a, b}`.
    #[must_use]
    pub fn edge_faces(&self, a: u32, b: u32) -> &[usize] {
        self.edge_to_faces
            .get(&edge_key(a, b))
            .map_or(&[], Vec::as_slice)
    }

    /// Number of distinct edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_to_faces.len()
    }

    /// Edges with exactly one incident face, sorted for determinism.
    #[must_use]
    pub fn boundary_edges(&self) -> Vec<(u32, u32)> {
        let mut edges: Vec<(u32, u32)> = self
            .edge_to_faces
            .iter()
            .filter(|(_, faces)| faces.len() == 1)
            .map(|(&edge, _)| edge)
            .collect();
        edges.sort_unstable();
        edges
    }

    /// Edges with more than two incident faces, sorted for determinism.
    #[must_use]
    pub fn non_manifold_edges(&self) -> Vec<(u32, u32)> {
        let mut edges: Vec<(u32, u32)> = self
            .edge_to_faces
            .iter()
            .filter(|(_, faces)| faces.len() > 2)
            .map(|(&edge, _)| edge)
            .collect();
        edges.sort_unstable();
        edges
    }

    /// Whether every edge has at least two incident faces.
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        self.edge_to_faces.values().all(|faces| faces.len() >= 2)
    }

    /// Whether every edge has at most two incident faces.
    #[must_use]
    pub fn is_manifold(&self) -> bool {
        self.edge_to_faces.values().all(|faces| faces.len() <= 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_mesh::TriMesh;

    #[test]
    fn cube_is_watertight_and_manifold() {
        let cube = TriMesh::unit_cube();
        let adjacency = MeshAdjacency::build(&cube.faces);
        assert!(adjacency.is_watertight());
        assert!(adjacency.is_manifold());
        assert_eq!(adjacency.edge_count(), 18);
        assert!(adjacency.boundary_edges().is_empty());
        assert!(adjacency.non_manifold_edges().is_empty());
    }

    #[test]
    fn single_triangle_has_three_boundary_edges() {
        let faces = [[0u32, 1, 2]];
        let adjacency = MeshAdjacency::build(&faces);
        assert!(!adjacency.is_watertight());
        assert!(adjacency.is_manifold());
        assert_eq!(adjacency.boundary_edges(), vec![(0, 1), (0, 2), (1, 2)]);
    }

    #[test]
    fn fin_makes_an_edge_non_manifold() {
        // Two triangles sharing edge (0,1) plus a third "fin" on the same edge.
        let faces = [[0u32, 1, 2], [1, 0, 3], [0, 1, 4]];
        let adjacency = MeshAdjacency::build(&faces);
        assert!(!adjacency.is_manifold());
        assert_eq!(adjacency.non_manifold_edges(), vec![(0, 1)]);
        assert_eq!(adjacency.edge_faces(1, 0), &[0, 1, 2]);
    }

    #[test]
    fn missing_edge_has_no_faces() {
        let faces = [[0u32, 1, 2]];
        let adjacency = MeshAdjacency::build(&faces);
        assert!(adjacency.edge_faces(5, 9).is_empty());
    }
}
