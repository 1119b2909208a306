//! Boundary hole detection and filling.

use hashbrown::{HashMap, HashSet};
use sf_mesh::{TriMesh, Vector3};
use tracing::{debug, warn};

use crate::adjacency::MeshAdjacency;

/// What a hole-filling pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoleFillStats {
    /// Boundary loops that were closed.
    pub filled: usize,
    /// Boundary loops left open because they exceeded the edge limit.
    pub skipped: usize,
    /// Triangles appended to the mesh.
    pub faces_added: usize,
}

/// Close boundary holes of up to `max_hole_edges` edges.
///
/// Boundary edges are traced into closed loops following the direction
/// their owning faces walk them, so each patch comes out wound
/// consistently with the surrounding surface. Loops are triangulated by
/// ear clipping with a fan fallback for geometry the clipper cannot
/// digest.
///
/// Loops above the limit are deliberate openings more often than
/// defects, so they are counted, warned about and left alone. Never
/// fails; a mesh without boundaries returns all-zero stats.
pub fn fill_holes(mesh: &mut TriMesh, max_hole_edges: usize) -> HoleFillStats {
    let mut stats = HoleFillStats::default();
    if mesh.faces.is_empty() {
        return stats;
    }

    let adjacency = MeshAdjacency::build(&mesh.faces);

    // Boundary edges, directed the way their single face traverses them.
    let mut directed: Vec<(u32, u32)> = Vec::new();
    for &[a, b, c] in &mesh.faces {
        for (u, v) in [(a, b), (b, c), (c, a)] {
            if adjacency.edge_faces(u, v).len() == 1 {
                directed.push((u, v));
            }
        }
    }
    if directed.is_empty() {
        return stats;
    }
    directed.sort_unstable();

    let mut outgoing: HashMap<u32, Vec<u32>> = HashMap::new();
    for &(u, v) in &directed {
        outgoing.entry(u).or_default().push(v);
    }

    let mut used: HashSet<(u32, u32)> = HashSet::new();
    for &start in &directed {
        if used.contains(&start) {
            continue;
        }
        match trace_loop(start, &outgoing, &mut used) {
            Some(ring) => {
                if ring.len() > max_hole_edges {
                    warn!(
                        edges = ring.len(),
                        limit = max_hole_edges,
                        "leaving oversized hole open"
                    );
                    stats.skipped += 1;
                } else if ring.len() >= 3 {
                    let added = fill_ring(mesh, &ring);
                    debug!(edges = ring.len(), triangles = added, "filled hole");
                    stats.filled += 1;
                    stats.faces_added += added;
                }
            }
            None => {
                warn!(
                    from = start.0,
                    to = start.1,
                    "open boundary does not close into a loop"
                );
            }
        }
    }

    stats
}

/// Follow directed boundary edges from `start` until the walk returns to
/// its origin. Returns the loop's vertices in traversal order, or `None`
/// when the boundary dead-ends.
fn trace_loop(
    start: (u32, u32),
    outgoing: &HashMap<u32, Vec<u32>>,
    used: &mut HashSet<(u32, u32)>,
) -> Option<Vec<u32>> {
    let mut ring = vec![start.0];
    let mut current = start.1;
    used.insert(start);

    // Each directed edge is consumed at most once, which bounds the walk.
    while current != start.0 {
        ring.push(current);
        let candidates = outgoing.get(&current)?;
        let next = candidates
            .iter()
            .copied()
            .find(|&next| !used.contains(&(current, next)))?;
        used.insert((current, next));
        current = next;
    }

    Some(ring)
}

/// Triangulate the ring and append the patch to the mesh. The ring
/// arrives in boundary-traversal order; the patch is built against the
/// reversed ring so its triangles oppose the surrounding faces across
/// the boundary edges.
fn fill_ring(mesh: &mut TriMesh, ring: &[u32]) -> usize {
    let mut rim: Vec<u32> = ring.to_vec();
    rim.reverse();

    let flat = project_to_plane(mesh, &rim);
    let triangles = ear_clip(&rim, &flat);
    let added = triangles.len();
    mesh.faces.extend(triangles);
    added
}

/// Project ring vertices onto the plane that loses the least area, then
/// mirror if needed so the polygon winds counter-clockwise in 2D.
fn project_to_plane(mesh: &TriMesh, rim: &[u32]) -> Vec<(f64, f64)> {
    // Newell normal tolerates non-planar rings.
    let mut normal: Vector3<f64> = Vector3::zeros();
    for i in 0..rim.len() {
        let p = mesh.vertices[rim[i] as usize];
        let q = mesh.vertices[rim[(i + 1) % rim.len()] as usize];
        normal.x += (p.y - q.y) * (p.z + q.z);
        normal.y += (p.z - q.z) * (p.x + q.x);
        normal.z += (p.x - q.x) * (p.y + q.y);
    }

    let (ax, ay, az) = (normal.x.abs(), normal.y.abs(), normal.z.abs());
    let mut flat: Vec<(f64, f64)> = rim
        .iter()
        .map(|&idx| {
            let v = mesh.vertices[idx as usize];
            if ax >= ay && ax >= az {
                (v.y, v.z)
            } else if ay >= az {
                (v.z, v.x)
            } else {
                (v.x, v.y)
            }
        })
        .collect();

    if signed_area(&flat) < 0.0 {
        for point in &mut flat {
            *point = (point.1, point.0);
        }
    }
    flat
}

fn signed_area(flat: &[(f64, f64)]) -> f64 {
    let mut doubled = 0.0;
    for i in 0..flat.len() {
        let (ux, uy) = flat[i];
        let (vx, vy) = flat[(i + 1) % flat.len()];
        doubled += ux * vy - vx * uy;
    }
    doubled / 2.0
}

/// Ear-clip a counter-clockwise 2D polygon, emitting mesh triangles in
/// ring order. Falls back to a fan when no ear can be found, which keeps
/// the triangle count at `n - 2` even for ugly rings.
fn ear_clip(rim: &[u32], flat: &[(f64, f64)]) -> Vec<[u32; 3]> {
    let mut triangles = Vec::with_capacity(rim.len().saturating_sub(2));
    let mut remaining: Vec<usize> = (0..rim.len()).collect();

    while remaining.len() > 3 {
        let Some(ear) = find_ear(&remaining, flat) else {
            // Degenerate or self-intersecting ring: fan out what is left.
            for window in 1..remaining.len() - 1 {
                triangles.push([
                    rim[remaining[0]],
                    rim[remaining[window]],
                    rim[remaining[window + 1]],
                ]);
            }
            return triangles;
        };

        let prev = remaining[(ear + remaining.len() - 1) % remaining.len()];
        let cur = remaining[ear];
        let next = remaining[(ear + 1) % remaining.len()];
        triangles.push([rim[prev], rim[cur], rim[next]]);
        remaining.remove(ear);
    }

    triangles.push([rim[remaining[0]], rim[remaining[1]], rim[remaining[2]]]);
    triangles
}

/// Position (within `remaining`) of a clippable ear, if any.
fn find_ear(remaining: &[usize], flat: &[(f64, f64)]) -> Option<usize> {
    let n = remaining.len();
    for k in 0..n {
        let prev = flat[remaining[(k + n - 1) % n]];
        let cur = flat[remaining[k]];
        let next = flat[remaining[(k + 1) % n]];

        if cross2(prev, cur, next) <= 1e-12 {
            continue; // reflex or collinear corner
        }

        let blocked = remaining.iter().enumerate().any(|(j, &idx)| {
            j != k && j != (k + n - 1) % n && j != (k + 1) % n
                && point_in_triangle(flat[idx], prev, cur, next)
        });
        if !blocked {
            return Some(k);
        }
    }
    None
}

/// Z component of the cross product of `b - a` and `c - b`.
fn cross2(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    (b.0 - a.0) * (c.1 - b.1) - (b.1 - a.1) * (c.0 - b.0)
}

/// Inclusive point-in-triangle test for a counter-clockwise triangle.
fn point_in_triangle(p: (f64, f64), a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> bool {
    cross2(a, b, p) >= -1e-12 && cross2(b, c, p) >= -1e-12 && cross2(c, a, p) >= -1e-12
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_mesh::Point3;

    /// Unit cube with its bottom removed: one square hole of 4 edges.
    fn open_box() -> TriMesh {
        let mut cube = TriMesh::unit_cube();
        cube.faces.drain(0..2);
        cube
    }

    #[test]
    fn closed_mesh_needs_nothing() {
        let mut cube = TriMesh::unit_cube();
        let stats = fill_holes(&mut cube, 100);
        assert_eq!(stats, HoleFillStats::default());
        assert_eq!(cube.face_count(), 12);
    }

    #[test]
    fn square_hole_gets_two_triangles() {
        let mut mesh = open_box();
        let stats = fill_holes(&mut mesh, 100);

        assert_eq!(stats.filled, 1);
        assert_eq!(stats.skipped, 0);
        assert_eq!(stats.faces_added, 2);
        assert_eq!(mesh.face_count(), 12);

        let adjacency = MeshAdjacency::build(&mesh.faces);
        assert!(adjacency.is_watertight());
        assert!(adjacency.is_manifold());
        // Consistently wound patch restores the enclosed volume.
        assert!((mesh.signed_volume() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn triangular_hole_restores_the_missing_face() {
        let mut mesh = TriMesh::unit_cube();
        mesh.faces.remove(5);
        let stats = fill_holes(&mut mesh, 100);

        assert_eq!(stats.filled, 1);
        assert_eq!(stats.faces_added, 1);
        assert!((mesh.signed_volume() - 1.0).abs() < 1e-12);
        assert!(MeshAdjacency::build(&mesh.faces).is_watertight());
    }

    #[test]
    fn oversized_hole_is_left_open() {
        let mut mesh = open_box();
        let before = mesh.face_count();
        let stats = fill_holes(&mut mesh, 3);

        assert_eq!(stats.filled, 0);
        assert_eq!(stats.skipped, 1);
        assert_eq!(mesh.face_count(), before);
    }

    #[test]
    fn two_separate_holes_both_close() {
        let mut mesh = TriMesh::unit_cube();
        // Bottom square hole and one triangular hole on top.
        mesh.faces.drain(0..2);
        mesh.faces.remove(0); // was face 2, a top triangle
        let stats = fill_holes(&mut mesh, 100);

        assert_eq!(stats.filled, 2);
        assert_eq!(stats.faces_added, 3);
        assert!(MeshAdjacency::build(&mesh.faces).is_watertight());
        assert!((mesh.signed_volume() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn hexagonal_hole_in_a_plate() {
        // A hexagon ring around vertex 6, with the center faces missing.
        let mut vertices = vec![
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(1.0, 1.8, 0.0),
            Point3::new(-1.0, 1.8, 0.0),
            Point3::new(-2.0, 0.0, 0.0),
            Point3::new(-1.0, -1.8, 0.0),
            Point3::new(1.0, -1.8, 0.0),
        ];
        // Outer ring at double radius.
        for i in 0..6 {
            let inner = vertices[i];
            vertices.push(Point3::new(inner.x * 2.0, inner.y * 2.0, 0.0));
        }
        let mut faces = Vec::new();
        for i in 0..6u32 {
            let j = (i + 1) % 6;
            faces.push([i, 6 + i, j]);
            faces.push([j, 6 + i, 6 + j]);
        }
        let mut mesh = TriMesh::from_parts(vertices, faces);

        let stats = fill_holes(&mut mesh, 100);
        // The inner hexagon closes with 4 triangles; the outer rim stays
        // open because 6 edges exceed nothing here, it is also a loop,
        // so both get filled.
        assert_eq!(stats.filled, 2);
        assert_eq!(stats.faces_added, 8);
        assert!(MeshAdjacency::build(&mesh.faces).is_watertight());
    }
}
