use serde::{Deserialize, Serialize};

use crate::geometry::{BoundingBox, Color, Point3D, Vector3D};

/// A tessellated shape as it crosses the wire.
///
/// Extracted fresh on every request — never cached — so a client always sees
/// the shape as it currently is. `normals` is either empty or parallel to
/// `vertices`; `indices` holds flat 0-based triangle triples into `vertices`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshData {
    pub shape_id: String,
    /// Mutation counter of the source shape at extraction time.
    pub version: u64,
    pub vertices: Vec<Point3D>,
    pub normals: Vec<Vector3D>,
    pub indices: Vec<u32>,
    pub color: Color,
    /// Absent for an empty mesh.
    pub bounding_box: Option<BoundingBox>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}
