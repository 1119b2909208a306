//! Non-manifold edge resolution.
//!
//! Two paths live here. [`repair_non_manifold`] is the preferred
//! operator: it removes duplicate faces and detaches the extra faces of
//! over-shared edges so every edge ends up with at most two. When that
//! operator is unavailable in the hosting environment the pipeline runs
//! [`dissolve_degenerate`] instead, which only collapses the degenerate
//! geometry around non-manifold edges and accepts whatever is left.

use hashbrown::HashSet;
use sf_mesh::{TriMesh, Triangle};
use tracing::debug;

use crate::adjacency::MeshAdjacency;

/// What the preferred non-manifold repair did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManifoldStats {
    /// Exact duplicate faces removed (either winding).
    pub duplicates_removed: usize,
    /// Non-manifold edges that had their extra faces detached.
    pub edges_split: usize,
    /// Vertices duplicated while detaching.
    pub vertices_added: usize,
    /// Non-manifold edges still present afterwards.
    pub remaining: usize,
}

/// What the degraded dissolve path did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DissolveStats {
    /// Short edges collapsed inside the non-manifold selection.
    pub edges_collapsed: usize,
    /// Faces dropped because they became degenerate or had no area.
    pub faces_removed: usize,
    /// Non-manifold edges still present afterwards.
    pub remaining: usize,
}

/// Remove faces that reference the same three vertices as an earlier
/// face, regardless of winding.
///
/// The first occurrence survives. Coincident faces with opposite
/// windings are the classic source of non-manifold edges in compound
/// tessellations, so this runs before edge splitting.
///
/// Returns the number of faces removed.
pub fn remove_duplicate_faces(mesh: &mut TriMesh) -> usize {
    let before = mesh.faces.len();
    let mut seen: HashSet<[u32; 3]> = HashSet::with_capacity(before);
    mesh.faces.retain(|&[a, b, c]| {
        let mut key = [a, b, c];
        key.sort_unstable();
        seen.insert(key)
    });
    before - mesh.faces.len()
}

/// Resolve non-manifold edges by detaching their surplus faces.
///
/// Duplicate faces go first. For every edge still carrying more than
/// two faces, the first two keep the edge and each further face gets
/// its own copies of the edge's vertices, turning a fin or T-junction
/// into separate sheets that touch but no longer share topology. The
/// geometry does not move.
///
/// Best effort: a face rewritten for one edge may drop out of another
/// over-shared edge as a side effect, so `remaining` is recounted from
/// scratch at the end.
pub fn repair_non_manifold(mesh: &mut TriMesh) -> ManifoldStats {
    let mut stats = ManifoldStats {
        duplicates_removed: remove_duplicate_faces(mesh),
        ..Default::default()
    };
    if mesh.faces.is_empty() {
        return stats;
    }

    let adjacency = MeshAdjacency::build(&mesh.faces);
    for (a, b) in adjacency.non_manifold_edges() {
        let incident = adjacency.edge_faces(a, b);
        let mut split_any = false;

        for &face_idx in &incident[2..] {
            // The face may have been detached already while processing
            // another edge; only rewrite slots that still match.
            let mut replaced = false;
            for original in [a, b] {
                let face = mesh.faces[face_idx];
                if !face.contains(&original) {
                    continue;
                }
                #[allow(clippy::cast_possible_truncation)]
                // Mesh indices are u32; meshes beyond 4B vertices are unsupported.
                let fresh = mesh.vertices.len() as u32;
                mesh.vertices.push(mesh.vertices[original as usize]);
                stats.vertices_added += 1;
                replaced = true;
                for slot in &mut mesh.faces[face_idx] {
                    if *slot == original {
                        *slot = fresh;
                    }
                }
            }
            split_any = split_any || replaced;
        }

        if split_any {
            stats.edges_split += 1;
        }
    }

    stats.remaining = MeshAdjacency::build(&mesh.faces).non_manifold_edges().len();
    debug!(
        duplicates = stats.duplicates_removed,
        split = stats.edges_split,
        remaining = stats.remaining,
        "non-manifold repair"
    );
    stats
}

/// Degraded manifold cleanup: dissolve degenerate geometry around
/// non-manifold edges.
///
/// Only vertices that sit on a non-manifold edge are touched. Edges
/// between two selected vertices shorter than `tolerance` collapse to
/// their lower-index endpoint; faces that lose a corner or end up with
/// no area are dropped. Anything the collapse does not reach stays
/// non-manifold, which is acceptable for this path.
pub fn dissolve_degenerate(mesh: &mut TriMesh, tolerance: f64) -> DissolveStats {
    let mut stats = DissolveStats::default();
    if mesh.faces.is_empty() {
        return stats;
    }

    let adjacency = MeshAdjacency::build(&mesh.faces);
    let mut selected: HashSet<u32> = HashSet::new();
    for (a, b) in adjacency.non_manifold_edges() {
        selected.insert(a);
        selected.insert(b);
    }
    if selected.is_empty() {
        return stats;
    }

    #[allow(clippy::cast_possible_truncation)]
    // Mesh indices are u32; meshes beyond 4B vertices are unsupported.
    let mut remap: Vec<u32> = (0..mesh.vertices.len() as u32).collect();
    let mut collapsed: HashSet<(u32, u32)> = HashSet::new();

    for &[a, b, c] in &mesh.faces {
        for (u, v) in [(a, b), (b, c), (c, a)] {
            let (lo, hi) = crate::adjacency::edge_key(u, v);
            if !selected.contains(&lo) || !selected.contains(&hi) {
                continue;
            }
            if collapsed.contains(&(lo, hi)) || remap[hi as usize] != hi {
                continue;
            }
            let gap = (mesh.vertices[lo as usize] - mesh.vertices[hi as usize]).norm();
            if gap < tolerance {
                remap[hi as usize] = lo;
                collapsed.insert((lo, hi));
                stats.edges_collapsed += 1;
            }
        }
    }

    if stats.edges_collapsed > 0 {
        // Chase chains down to their final representative.
        for i in 0..remap.len() {
            let mut target = remap[i];
            while remap[target as usize] != target {
                target = remap[target as usize];
            }
            remap[i] = target;
        }
        for face in &mut mesh.faces {
            for slot in face {
                *slot = remap[*slot as usize];
            }
        }
    }

    let before = mesh.faces.len();
    let vertices = &mesh.vertices;
    mesh.faces.retain(|&[a, b, c]| {
        if a == b || b == c || a == c {
            return false;
        }
        let tri = Triangle::new(
            vertices[a as usize],
            vertices[b as usize],
            vertices[c as usize],
        );
        tri.area() > f64::EPSILON
    });
    stats.faces_removed = before - mesh.faces.len();

    stats.remaining = MeshAdjacency::build(&mesh.faces).non_manifold_edges().len();
    debug!(
        collapsed = stats.edges_collapsed,
        removed = stats.faces_removed,
        remaining = stats.remaining,
        "degraded manifold cleanup"
    );
    stats
}
