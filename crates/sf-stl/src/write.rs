//! STL writing and the pipeline export entry point.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use sf_mesh::{TriMesh, Triangle, Vector3};

use crate::error::{StlError, StlResult};
use crate::read::HEADER_SIZE;

/// STL encoding to write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StlFormat {
    /// Compact binary encoding. The default; what printers and slicers want.
    #[default]
    Binary,
    /// Human-readable text encoding.
    Ascii,
}

/// Save a mesh to an STL file in the requested encoding.
///
/// Facet normals are recomputed from vertex positions; degenerate
/// triangles get a zero normal rather than NaN.
///
/// # Errors
///
/// Returns [`StlError::Io`] when the destination cannot be written.
pub fn save_stl<P: AsRef<Path>>(mesh: &TriMesh, path: P, format: StlFormat) -> StlResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    match format {
        StlFormat::Binary => write_binary(mesh, &mut writer)?,
        StlFormat::Ascii => write_ascii(mesh, &mut writer)?,
    }
    writer.flush()?;
    Ok(())
}

/// Export a finished mesh as binary STL and report the bytes written.
///
/// This is the pipeline's final step for a group: it refuses zero-face
/// meshes so an upstream bug cannot silently produce an unprintable
/// empty file.
///
/// # Errors
///
/// Returns [`StlError::EmptyMesh`] for a mesh with no faces and
/// [`StlError::Io`] for an unwritable destination.
pub fn export_stl<P: AsRef<Path>>(mesh: &TriMesh, path: P) -> StlResult<u64> {
    let path = path.as_ref();
    if mesh.is_empty() {
        return Err(StlError::EmptyMesh {
            path: path.to_path_buf(),
        });
    }

    save_stl(mesh, path, StlFormat::Binary)?;
    let bytes = std::fs::metadata(path)?.len();

    #[allow(clippy::cast_precision_loss)]
    // Only used for a human-readable size log.
    let mib = bytes as f64 / (1024.0 * 1024.0);
    info!(path = %path.display(), faces = mesh.face_count(), "wrote {mib:.2} MiB");

    Ok(bytes)
}

fn facet_normal(mesh: &TriMesh, face: [u32; 3]) -> Vector3<f64> {
    let tri = Triangle::new(
        mesh.vertices[face[0] as usize],
        mesh.vertices[face[1] as usize],
        mesh.vertices[face[2] as usize],
    );
    tri.normal().unwrap_or_else(Vector3::zeros)
}

fn write_binary<W: Write>(mesh: &TriMesh, writer: &mut W) -> StlResult<()> {
    let mut header = [b' '; HEADER_SIZE];
    let text: &[u8] = b"Binary STL written by stepforge";
    header[..text.len()].copy_from_slice(text);
    writer.write_all(&header)?;

    #[allow(clippy::cast_possible_truncation)]
    // Face counts are bounded by the u32 index space.
    let face_count = mesh.faces.len() as u32;
    writer.write_all(&face_count.to_le_bytes())?;

    for &face in &mesh.faces {
        let normal = facet_normal(mesh, face);
        write_f32_triple(writer, normal.x, normal.y, normal.z)?;
        for &idx in &face {
            let v = &mesh.vertices[idx as usize];
            write_f32_triple(writer, v.x, v.y, v.z)?;
        }
        writer.write_all(&0u16.to_le_bytes())?;
    }

    Ok(())
}

fn write_f32_triple<W: Write>(writer: &mut W, x: f64, y: f64, z: f64) -> StlResult<()> {
    #[allow(clippy::cast_possible_truncation)]
    // STL stores f32; the narrowing is the format, not an accident.
    {
        writer.write_all(&(x as f32).to_le_bytes())?;
        writer.write_all(&(y as f32).to_le_bytes())?;
        writer.write_all(&(z as f32).to_le_bytes())?;
    }
    Ok(())
}

fn write_ascii<W: Write>(mesh: &TriMesh, writer: &mut W) -> StlResult<()> {
    writeln!(writer, "solid stepforge")?;

    for &face in &mesh.faces {
        let n = facet_normal(mesh, face);
        writeln!(writer, "  facet normal {:.6e} {:.6e} {:.6e}", n.x, n.y, n.z)?;
        writeln!(writer, "    outer loop")?;
        for &idx in &face {
            let v = &mesh.vertices[idx as usize];
            writeln!(writer, "      vertex {:.6e} {:.6e} {:.6e}", v.x, v.y, v.z)?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }

    writeln!(writer, "endsolid stepforge")?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::load_stl;

    #[test]
    fn roundtrip_binary() {
        let original = TriMesh::unit_cube();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.stl");

        save_stl(&original, &path, StlFormat::Binary).unwrap();
        let loaded = load_stl(&path).unwrap();

        assert_eq!(loaded.face_count(), original.face_count());
        // The codec does not weld, so every corner is its own vertex.
        assert_eq!(loaded.vertex_count(), original.face_count() * 3);
    }

    #[test]
    fn roundtrip_ascii() {
        let original = TriMesh::unit_cube();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube_ascii.stl");

        save_stl(&original, &path, StlFormat::Ascii).unwrap();
        let loaded = load_stl(&path).unwrap();

        assert_eq!(loaded.face_count(), 12);
        let first = &loaded.vertices[0];
        let expected = &original.vertices[original.faces[0][0] as usize];
        assert!((first.x - expected.x).abs() < 1e-5);
        assert!((first.y - expected.y).abs() < 1e-5);
        assert!((first.z - expected.z).abs() < 1e-5);
    }

    #[test]
    fn export_reports_exact_size() {
        let mesh = TriMesh::unit_cube();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sized.stl");

        let bytes = export_stl(&mesh, &path).unwrap();
        // 84-byte preamble plus 50 bytes per triangle.
        assert_eq!(bytes, 84 + 50 * 12);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), bytes);
    }

    #[test]
    fn export_refuses_empty_mesh() {
        let mesh = TriMesh::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.stl");

        let result = export_stl(&mesh, &path);
        assert!(matches!(result, Err(StlError::EmptyMesh { .. })));
        assert!(!path.exists(), "no file may appear on refusal");
    }

    #[test]
    fn export_surfaces_unwritable_destination() {
        let mesh = TriMesh::unit_cube();
        let result = export_stl(&mesh, "/definitely/not/a/dir/out.stl");
        assert!(matches!(result, Err(StlError::Io(_))));
    }

    #[test]
    fn degenerate_face_writes_zero_normal() {
        let mesh = TriMesh::from_parts(
            vec![
                sf_mesh::Point3::new(0.0, 0.0, 0.0),
                sf_mesh::Point3::new(1.0, 0.0, 0.0),
                sf_mesh::Point3::new(2.0, 0.0, 0.0),
            ],
            vec![[0, 1, 2]],
        );
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("degenerate.stl");

        save_stl(&mesh, &path, StlFormat::Binary).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        let normal_bytes = &bytes[84..96];
        assert!(normal_bytes.iter().all(|&b| b == 0));
    }
}
