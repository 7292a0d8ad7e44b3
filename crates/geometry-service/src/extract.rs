//! Mesh extraction: kernel triangulation → wire `MeshData`.
//!
//! Meshes are produced fresh on every call. Source shapes can be mutated
//! between calls, so caching here would trade a correctness bug for a
//! performance win nobody asked for.

use geode_types::{BoundingBox, MeshData, Point3D, Vector3D};
use kernel_bridge::{Kernel, KernelError, TessellationSpec, TriangleMesh};

use crate::registry::ShapeRecord;

/// Tessellate one shape record into its wire form.
pub fn extract_mesh<K: Kernel>(
    kernel: &mut K,
    record: &ShapeRecord,
    spec: &TessellationSpec,
) -> Result<MeshData, KernelError> {
    let mesh = kernel.tessellate(&record.handle, spec)?;
    Ok(mesh_data_from(record, &mesh))
}

/// Convert a kernel mesh into `MeshData`, computing the bounding box as the
/// running min/max over the emitted vertices. An empty mesh has no box.
pub(crate) fn mesh_data_from(record: &ShapeRecord, mesh: &TriangleMesh) -> MeshData {
    let mut vertices = Vec::with_capacity(mesh.vertex_count());
    let mut bounding_box: Option<BoundingBox> = None;

    for chunk in mesh.vertices.chunks(3) {
        let p = Point3D::new(chunk[0], chunk[1], chunk[2]);
        match &mut bounding_box {
            Some(bb) => bb.expand(p),
            None => bounding_box = Some(BoundingBox::at(p)),
        }
        vertices.push(p);
    }

    let normals = mesh
        .normals
        .chunks(3)
        .map(|chunk| Vector3D::new(chunk[0], chunk[1], chunk[2]))
        .collect();

    MeshData {
        shape_id: record.shape_id.clone(),
        version: record.version,
        vertices,
        normals,
        indices: mesh.indices.clone(),
        color: record.color,
        bounding_box,
    }
}
