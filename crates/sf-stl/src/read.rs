//! STL loading with automatic format detection.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use sf_mesh::{Point3, TriMesh};

use crate::error::{StlError, StlResult};

/// Binary STL header size in bytes.
pub(crate) const HEADER_SIZE: usize = 80;

/// Size of one binary triangle record (normal + 3 vertices + attribute).
pub(crate) const TRIANGLE_SIZE: usize = 50;

/// Load a mesh from an STL file, autodetecting the encoding.
///
/// Every triangle contributes three fresh vertices; shared corners are
/// not deduplicated here.
///
/// # Errors
///
/// Returns [`StlError::FileNotFound`] for a missing file,
/// [`StlError::UnexpectedEof`] for a truncated binary file and
/// [`StlError::InvalidContent`] / [`StlError::ParseFloat`] for malformed
/// content.
///
/// # Example
///
/// ```no_run
/// use sf_stl::load_stl;
///
/// let mesh = load_stl("part.stl")?;
/// println!("{} triangles", mesh.face_count());
/// # Ok::<(), sf_stl::StlError>(())
/// ```
pub fn load_stl<P: AsRef<Path>>(path: P) -> StlResult<TriMesh> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StlError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            StlError::Io(e)
        }
    })?;
    let mut reader = BufReader::new(file);

    let mut probe = [0u8; HEADER_SIZE + 4];
    let filled = read_up_to(&mut reader, &mut probe)?;
    if filled < 6 {
        return Err(StlError::invalid_content("file too small to be STL"));
    }

    if looks_ascii(&probe[..filled]) {
        // Re-open so the line reader sees the file from the start.
        drop(reader);
        let reader = BufReader::new(File::open(path)?);
        read_ascii(reader)
    } else {
        read_binary(&probe[..filled], reader)
    }
}

/// ASCII files start with `solid`, but binary exporters sometimes put
/// `solid` in their header too. A null byte in the header block means
/// binary.
fn looks_ascii(probe: &[u8]) -> bool {
    let head = &probe[..probe.len().min(HEADER_SIZE)];
    let text = String::from_utf8_lossy(head);
    text.trim_start().starts_with("solid") && !head.contains(&0)
}

/// Fill `buf` as far as the reader allows; short only at end of input.
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

/// Decode a binary STL whose first bytes were already consumed into `probe`.
fn read_binary<R: Read>(probe: &[u8], mut reader: R) -> StlResult<TriMesh> {
    if probe.len() < HEADER_SIZE + 4 {
        return Err(StlError::invalid_content(
            "binary STL shorter than its 84-byte preamble",
        ));
    }

    let count_bytes = [
        probe[HEADER_SIZE],
        probe[HEADER_SIZE + 1],
        probe[HEADER_SIZE + 2],
        probe[HEADER_SIZE + 3],
    ];
    let face_count = u32::from_le_bytes(count_bytes);

    let mut mesh = TriMesh::with_capacity(face_count as usize * 3, face_count as usize);
    let mut record = [0u8; TRIANGLE_SIZE];

    for done in 0..face_count {
        if read_up_to(&mut reader, &mut record)? < TRIANGLE_SIZE {
            return Err(StlError::UnexpectedEof {
                expected: face_count,
                got: done,
            });
        }
        // Bytes 0..12 hold the stored normal; it is recomputed on write
        // and untrusted on read.
        push_triangle(
            &mut mesh,
            read_point(&record[12..24]),
            read_point(&record[24..36]),
            read_point(&record[36..48]),
        );
    }

    Ok(mesh)
}

/// Decode 12 bytes (three little-endian f32s) into a point.
fn read_point(buf: &[u8]) -> Point3<f64> {
    let x = f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    let y = f32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
    let z = f32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]);
    Point3::new(f64::from(x), f64::from(y), f64::from(z))
}

fn push_triangle(mesh: &mut TriMesh, v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) {
    #[allow(clippy::cast_possible_truncation)]
    // Mesh indices are u32; meshes beyond 4B vertices are unsupported.
    let base = mesh.vertices.len() as u32;
    mesh.vertices.push(v0);
    mesh.vertices.push(v1);
    mesh.vertices.push(v2);
    mesh.faces.push([base, base + 1, base + 2]);
}

/// Decode an ASCII STL with a small keyword state machine.
///
/// Unknown lines are skipped; facets without exactly three vertices are
/// dropped rather than guessed at.
pub(crate) fn read_ascii<R: BufRead>(reader: R) -> StlResult<TriMesh> {
    let mut mesh = TriMesh::new();
    let mut in_loop = false;
    let mut corners: Vec<Point3<f64>> = Vec::with_capacity(3);

    for line in reader.lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };

        match keyword.to_ascii_lowercase().as_str() {
            "outer" => {
                in_loop = true;
                corners.clear();
            }
            "vertex" => {
                if in_loop {
                    let (Some(x), Some(y), Some(z)) = (parts.next(), parts.next(), parts.next())
                    else {
                        return Err(StlError::invalid_content("vertex line with missing fields"));
                    };
                    corners.push(Point3::new(x.parse()?, y.parse()?, z.parse()?));
                }
            }
            "endloop" => {
                in_loop = false;
            }
            "endfacet" => {
                if corners.len() == 3 {
                    push_triangle(&mut mesh, corners[0], corners[1], corners[2]);
                }
                corners.clear();
            }
            "endsolid" => break,
            // "solid", "facet" and anything nonstandard carry nothing we need.
            _ => {}
        }
    }

    Ok(mesh)
}
