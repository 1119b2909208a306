//! Indexed triangle mesh.

use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Aabb;

/// An indexed triangle mesh with `f64` vertex positions.
///
/// Faces store indices into the vertex array. Winding is
/// **counter-clockwise viewed from outside**, so face normals computed
/// with the right-hand rule point out of the solid.
///
/// # Example
///
/// ```
/// use sf_mesh::{Point3, TriMesh};
///
/// let mut mesh = TriMesh::new();
/// mesh.vertices.push(Point3::new(0.0, 0.0, 0.0));
/// mesh.vertices.push(Point3::new(1.0, 0.0, 0.0));
/// mesh.vertices.push(Point3::new(0.0, 1.0, 0.0));
/// mesh.faces.push([0, 1, 2]);
///
/// assert_eq!(mesh.vertex_count(), 3);
/// assert_eq!(mesh.face_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TriMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3<f64>>,
    /// Triangles as index triples into `vertices`.
    pub faces: Vec<[u32; 3]>,
}

impl TriMesh {
    /// Create an empty mesh.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create an empty mesh with preallocated capacity.
    #[must_use]
    pub fn with_capacity(vertices: usize, faces: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            faces: Vec::with_capacity(faces),
        }
    }

    /// Create a mesh from existing vertex and face arrays.
    #[must_use]
    pub const fn from_parts(vertices: Vec<Point3<f64>>, faces: Vec<[u32; 3]>) -> Self {
        Self { vertices, faces }
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangle faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Whether the mesh has no faces.
    ///
    /// A mesh may still carry loose vertices while `is_empty` is true.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Axis-aligned bounding box over all vertices.
    ///
    /// Returns [`Aabb::empty`] for a mesh without vertices.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(&self.vertices)
    }

    /// Signed volume of the mesh via the divergence theorem.
    ///
    /// Positive for a closed mesh whose faces wind counter-clockwise
    /// viewed from outside. Meaningless for open meshes, near zero for
    /// flat ones.
    ///
    /// # Example
    ///
    /// ```
    /// use sf_mesh::TriMesh;
    ///
    /// let cube = TriMesh::unit_cube();
    /// assert!((cube.signed_volume() - 1.0).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        let mut six_volumes = 0.0;
        for &[i0, i1, i2] in &self.faces {
            let v0 = self.vertices[i0 as usize].coords;
            let v1 = self.vertices[i1 as usize].coords;
            let v2 = self.vertices[i2 as usize].coords;
            six_volumes += v0.dot(&v1.cross(&v2));
        }
        six_volumes / 6.0
    }

    /// Append another mesh, remapping its face indices.
    ///
    /// Vertices are copied as-is; no welding happens here.
    ///
    /// # Example
    ///
    /// ```
    /// use sf_mesh::TriMesh;
    ///
    /// let mut a = TriMesh::unit_cube();
    /// let b = TriMesh::unit_cube();
    /// a.merge(&b);
    ///
    /// assert_eq!(a.vertex_count(), 16);
    /// assert_eq!(a.face_count(), 24);
    /// ```
    pub fn merge(&mut self, other: &Self) {
        #[allow(clippy::cast_possible_truncation)]
        // Mesh indices are u32; meshes beyond 4B vertices are unsupported.
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.faces.extend(
            other
                .faces
                .iter()
                .map(|&[a, b, c]| [a + offset, b + offset, c + offset]),
        );
    }

    /// Reverse the winding of every face.
    pub fn flip_faces(&mut self) {
        for face in &mut self.faces {
            face.swap(1, 2);
        }
    }

    /// A unit cube spanning `[0, 1]^3` with outward-facing windings.
    ///
    /// Handy as a known-good closed mesh in tests and examples.
    #[must_use]
    pub fn unit_cube() -> Self {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        let faces = vec![
            // bottom (z = 0, normal -z)
            [0, 2, 1],
            [0, 3, 2],
            // top (z = 1, normal +z)
            [4, 5, 6],
            [4, 6, 7],
            // front (y = 0, normal -y)
            [0, 1, 5],
            [0, 5, 4],
            // back (y = 1, normal +y)
            [2, 3, 7],
            [2, 7, 6],
            // left (x = 0, normal -x)
            [0, 4, 7],
            [0, 7, 3],
            // right (x = 1, normal +x)
            [1, 2, 6],
            [1, 6, 5],
        ];
        Self { vertices, faces }
    }
}
