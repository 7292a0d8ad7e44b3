//! Triangle-mesh file IO: STL (binary + ASCII) and OBJ.
//!
//! Binary STL layout:
//! - 80 bytes: header
//! - 4 bytes: u32 LE triangle count
//! - Per triangle (50 bytes each):
//!   - 12 bytes: normal vector (3 × f32 LE)
//!   - 36 bytes: 3 vertices (3 × 3 × f32 LE)
//!   - 2 bytes: attribute byte count (0u16)

use std::fmt::Write as _;
use std::io::BufReader;

use crate::types::{KernelError, TriangleMesh};

const STL_HEADER: &[u8] = b"geode STL export";

/// Serialize a mesh to STL, binary or ASCII.
pub fn mesh_to_stl(mesh: &TriangleMesh, binary: bool) -> Vec<u8> {
    if binary {
        mesh_to_stl_binary(mesh)
    } else {
        mesh_to_stl_ascii(mesh)
    }
}

fn mesh_to_stl_binary(mesh: &TriangleMesh) -> Vec<u8> {
    let tri_count = mesh.triangle_count();
    let size = 84 + tri_count * 50;
    let mut buf = Vec::with_capacity(size);

    buf.extend_from_slice(STL_HEADER);
    buf.extend_from_slice(&vec![0u8; 80 - STL_HEADER.len()]);
    buf.extend_from_slice(&(tri_count as u32).to_le_bytes());

    for t in 0..tri_count {
        let [v0, v1, v2] = triangle_corners(mesh, t);
        let normal = facet_normal(v0, v1, v2);

        for c in &normal {
            buf.extend_from_slice(&(*c as f32).to_le_bytes());
        }
        for v in &[v0, v1, v2] {
            for c in v {
                buf.extend_from_slice(&(*c as f32).to_le_bytes());
            }
        }
        buf.extend_from_slice(&0u16.to_le_bytes());
    }

    buf
}

fn mesh_to_stl_ascii(mesh: &TriangleMesh) -> Vec<u8> {
    let mut out = String::from("solid geode\n");
    for t in 0..mesh.triangle_count() {
        let [v0, v1, v2] = triangle_corners(mesh, t);
        let n = facet_normal(v0, v1, v2);
        let _ = writeln!(out, "  facet normal {} {} {}", n[0], n[1], n[2]);
        out.push_str("    outer loop\n");
        for v in &[v0, v1, v2] {
            let _ = writeln!(out, "      vertex {} {} {}", v[0], v[1], v[2]);
        }
        out.push_str("    endloop\n  endfacet\n");
    }
    out.push_str("endsolid geode\n");
    out.into_bytes()
}

/// Parse STL, auto-detecting binary vs. ASCII.
pub fn stl_to_mesh(bytes: &[u8]) -> Result<TriangleMesh, KernelError> {
    if looks_like_ascii_stl(bytes) {
        stl_ascii_to_mesh(bytes)
    } else {
        stl_binary_to_mesh(bytes)
    }
}

fn looks_like_ascii_stl(bytes: &[u8]) -> bool {
    // "solid " prefix is necessary but not sufficient — some binary files
    // abuse the header. Require an ASCII body token as well.
    bytes.starts_with(b"solid")
        && std::str::from_utf8(&bytes[..bytes.len().min(1024)])
            .map(|s| s.contains("facet") || s.contains("endsolid"))
            .unwrap_or(false)
}

fn stl_binary_to_mesh(bytes: &[u8]) -> Result<TriangleMesh, KernelError> {
    if bytes.len() < 84 {
        return Err(KernelError::ImportFailed {
            reason: format!("binary STL truncated: {} bytes", bytes.len()),
        });
    }
    let tri_count = u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]) as usize;
    let expected = 84 + tri_count * 50;
    if bytes.len() < expected {
        return Err(KernelError::ImportFailed {
            reason: format!(
                "binary STL declares {tri_count} triangles but holds {} bytes, expected {expected}",
                bytes.len()
            ),
        });
    }

    let mut mesh = TriangleMesh::new();
    for t in 0..tri_count {
        let rec = &bytes[84 + t * 50..84 + (t + 1) * 50];
        let normal: Vec<f64> = (0..3).map(|i| read_f32(rec, i * 4) as f64).collect();
        let base = mesh.vertex_count() as u32;
        for v in 0..3 {
            for c in 0..3 {
                mesh.vertices.push(read_f32(rec, 12 + v * 12 + c * 4) as f64);
            }
            mesh.normals.extend_from_slice(&normal);
        }
        mesh.indices.extend_from_slice(&[base, base + 1, base + 2]);
    }
    Ok(mesh)
}

fn read_f32(bytes: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn stl_ascii_to_mesh(bytes: &[u8]) -> Result<TriangleMesh, KernelError> {
    let text = std::str::from_utf8(bytes).map_err(|_| KernelError::ImportFailed {
        reason: "ASCII STL is not valid UTF-8".to_string(),
    })?;

    let mut mesh = TriangleMesh::new();
    let mut facet_normal = [0.0f64; 3];
    let mut pending: Vec<[f64; 3]> = Vec::new();

    for (lineno, line) in text.lines().enumerate() {
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("facet") => {
                // "facet normal nx ny nz"
                let _ = tokens.next();
                facet_normal = parse_triple(&mut tokens, lineno)?;
            }
            Some("vertex") => {
                pending.push(parse_triple(&mut tokens, lineno)?);
            }
            Some("endfacet") => {
                if pending.len() != 3 {
                    return Err(KernelError::ImportFailed {
                        reason: format!(
                            "facet ending at line {} has {} vertices",
                            lineno + 1,
                            pending.len()
                        ),
                    });
                }
                let base = mesh.vertex_count() as u32;
                for v in pending.drain(..) {
                    mesh.vertices.extend_from_slice(&v);
                    mesh.normals.extend_from_slice(&facet_normal);
                }
                mesh.indices.extend_from_slice(&[base, base + 1, base + 2]);
            }
            _ => {}
        }
    }

    if mesh.is_empty() {
        return Err(KernelError::ImportFailed {
            reason: "ASCII STL contains no facets".to_string(),
        });
    }
    Ok(mesh)
}

fn parse_triple<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    lineno: usize,
) -> Result<[f64; 3], KernelError> {
    let mut out = [0.0f64; 3];
    for slot in &mut out {
        *slot = tokens
            .next()
            .and_then(|t| t.parse::<f64>().ok())
            .ok_or_else(|| KernelError::ImportFailed {
                reason: format!("malformed STL coordinate at line {}", lineno + 1),
            })?;
    }
    Ok(out)
}

/// Serialize a mesh to Wavefront OBJ (positions, normals, 1-based faces).
pub fn mesh_to_obj(mesh: &TriangleMesh) -> Vec<u8> {
    let mut out = String::from("# geode OBJ export\n");
    for i in 0..mesh.vertex_count() {
        let v = mesh.vertex(i);
        let _ = writeln!(out, "v {} {} {}", v[0], v[1], v[2]);
    }
    let has_normals = !mesh.normals.is_empty();
    if has_normals {
        for n in mesh.normals.chunks(3) {
            let _ = writeln!(out, "vn {} {} {}", n[0], n[1], n[2]);
        }
    }
    for tri in mesh.indices.chunks(3) {
        let (a, b, c) = (tri[0] + 1, tri[1] + 1, tri[2] + 1);
        if has_normals {
            let _ = writeln!(out, "f {a}//{a} {b}//{b} {c}//{c}");
        } else {
            let _ = writeln!(out, "f {a} {b} {c}");
        }
    }
    out.into_bytes()
}

/// Parse Wavefront OBJ via tobj, one mesh per model in the file.
pub fn obj_to_meshes(bytes: &[u8]) -> Result<Vec<TriangleMesh>, KernelError> {
    let mut reader = BufReader::new(bytes);
    let load_options = tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    };
    let (models, _materials) = tobj::load_obj_buf(&mut reader, &load_options, |_| {
        // Materials live in side files we never resolve for in-memory input.
        Ok((Vec::new(), Default::default()))
    })
    .map_err(|e| KernelError::ImportFailed {
        reason: format!("OBJ parse: {e}"),
    })?;

    let mut out = Vec::new();
    for model in &models {
        let m = &model.mesh;
        let mut part = TriangleMesh {
            vertices: m.positions.iter().map(|&p| p as f64).collect(),
            normals: m.normals.iter().map(|&n| n as f64).collect(),
            indices: m.indices.clone(),
        };
        if part.normals.len() != part.vertices.len() {
            part.normals.clear();
        }
        if !part.is_empty() {
            out.push(part);
        }
    }

    if out.is_empty() {
        return Err(KernelError::ImportFailed {
            reason: "OBJ contains no geometry".to_string(),
        });
    }
    Ok(out)
}

/// Parse Wavefront OBJ, merging all models into one mesh.
pub fn obj_to_mesh(bytes: &[u8]) -> Result<TriangleMesh, KernelError> {
    let mut out = TriangleMesh::new();
    for part in obj_to_meshes(bytes)? {
        out.merge(&part);
    }
    Ok(out)
}

fn triangle_corners(mesh: &TriangleMesh, t: usize) -> [[f64; 3]; 3] {
    [
        mesh.vertex(mesh.indices[t * 3] as usize),
        mesh.vertex(mesh.indices[t * 3 + 1] as usize),
        mesh.vertex(mesh.indices[t * 3 + 2] as usize),
    ]
}

/// Facet normal via the cross product of two edges.
fn facet_normal(v0: [f64; 3], v1: [f64; 3], v2: [f64; 3]) -> [f64; 3] {
    let e1 = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
    let e2 = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];
    let nx = e1[1] * e2[2] - e1[2] * e2[1];
    let ny = e1[2] * e2[0] - e1[0] * e2[2];
    let nz = e1[0] * e2[1] - e1[1] * e2[0];
    let len = (nx * nx + ny * ny + nz * nz).sqrt();
    if len > 1e-12 {
        [nx / len, ny / len, nz / len]
    } else {
        [0.0, 0.0, 0.0]
    }
}
