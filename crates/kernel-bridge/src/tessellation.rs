//! B-rep tessellation.
//!
//! Wraps truck-meshalgo's triangulation, walking the meshed solid face by
//! face so each face's triangles land in one flat buffer with a running
//! index offset, and so reversed faces get their winding corrected for
//! downstream backface culling.

use truck_meshalgo::prelude::*;
use truck_meshalgo::tessellation::{MeshableShape, MeshedShape};

use crate::types::{KernelError, TessellationSpec, TriangleMesh};

type TruckSolid = truck_modeling::Solid;

/// Tessellate a truck solid into a single flat triangle mesh.
///
/// A solid whose triangulation produces no faces yields an empty mesh; only
/// engine-level failures are errors.
pub fn tessellate_solid(
    solid: &TruckSolid,
    spec: &TessellationSpec,
) -> Result<TriangleMesh, KernelError> {
    let meshed_solid = solid.triangulation(spec.linear_tolerance);

    let mut out = TriangleMesh::new();

    for shell in meshed_solid.boundaries().iter() {
        for face in shell.face_iter() {
            // Each meshed face's surface is Option<PolygonMesh>.
            let maybe_mesh: Option<PolygonMesh> = face.surface();
            let Some(face_mesh) = maybe_mesh else {
                continue;
            };

            // A face whose topological orientation is reversed needs its
            // triangle winding flipped too.
            let face_mesh = if !face.orientation() {
                let mut m = face_mesh;
                m.invert();
                m
            } else {
                face_mesh
            };

            append_face(&mut out, &face_mesh);
        }
    }

    // Merged fallback when the per-face walk produced nothing.
    if out.is_empty() {
        let merged = meshed_solid.to_polygon();
        append_face(&mut out, &merged);
    }

    Ok(out)
}

/// Append one polygon mesh's triangles to the flat buffers, re-basing
/// indices past the vertices already emitted.
fn append_face(out: &mut TriangleMesh, face_mesh: &PolygonMesh) {
    let base_vertex = out.vertex_count() as u32;

    let positions = face_mesh.positions();
    let normals = face_mesh.normals();
    let tri_faces = face_mesh.tri_faces();

    for pos in positions {
        out.vertices.push(pos[0]);
        out.vertices.push(pos[1]);
        out.vertices.push(pos[2]);
    }

    if normals.is_empty() {
        for _ in 0..positions.len() {
            out.normals.push(0.0);
            out.normals.push(0.0);
            out.normals.push(1.0);
        }
    } else {
        for norm in normals {
            out.normals.push(norm[0]);
            out.normals.push(norm[1]);
            out.normals.push(norm[2]);
        }
    }

    for tri in tri_faces {
        for v in tri.iter() {
            out.indices.push(v.pos as u32 + base_vertex);
        }
    }
}
