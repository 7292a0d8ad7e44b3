use serde::{Deserialize, Serialize};

/// Opaque handle to a solid owned by the geometry kernel.
///
/// Valid only within the kernel instance that issued it. A handle is held by
/// exactly one shape record at a time and must be released back to the kernel
/// exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SolidHandle(pub(crate) u64);

impl SolidHandle {
    pub(crate) fn id(&self) -> u64 {
        self.0
    }
}

/// Errors from kernel operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum KernelError {
    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: String },

    #[error("construction failed: {reason}")]
    ConstructionFailed { reason: String },

    #[error("transform failed: {reason}")]
    TransformFailed { reason: String },

    #[error("tessellation failed: {reason}")]
    TessellationFailed { reason: String },

    #[error("import failed: {reason}")]
    ImportFailed { reason: String },

    #[error("export failed: {reason}")]
    ExportFailed { reason: String },

    #[error("unknown solid handle: {id}")]
    HandleNotFound { id: u64 },

    #[error("operation not supported by this kernel: {operation}")]
    Unsupported { operation: String },
}

/// Tessellation quality parameters.
///
/// `linear_tolerance` is the maximum deviation between the true surface and
/// its triangulation; `angular_tolerance` bounds the normal deviation across
/// a facet. Both are tunables, not part of the wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TessellationSpec {
    pub linear_tolerance: f64,
    pub angular_tolerance: f64,
}

impl Default for TessellationSpec {
    fn default() -> Self {
        Self {
            linear_tolerance: 0.1,
            angular_tolerance: 0.5,
        }
    }
}

/// Import knobs the kernel itself cares about; the rest of
/// `ModelImportOptions` is handled at the codec layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImportSettings {
    pub precision: f64,
    pub merge_shapes: bool,
    pub heal_shapes: bool,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            precision: 0.001,
            merge_shapes: false,
            heal_shapes: false,
        }
    }
}

/// Export knobs the kernel itself cares about.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    pub binary_mode: bool,
    pub export_as_compound: bool,
    /// Used when a B-rep solid must be triangulated for a mesh format.
    pub tessellation: TessellationSpec,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            binary_mode: true,
            export_as_compound: false,
            tessellation: TessellationSpec::default(),
        }
    }
}

/// A triangle mesh in kernel space: flat arrays, f64 coordinates.
///
/// `vertices` holds x,y,z triples; `normals` is empty or parallel to
/// `vertices`; `indices` holds 0-based triangle triples.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<f64>,
    pub normals: Vec<f64>,
    pub indices: Vec<u32>,
}

impl TriangleMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertex(&self, i: usize) -> [f64; 3] {
        [
            self.vertices[i * 3],
            self.vertices[i * 3 + 1],
            self.vertices[i * 3 + 2],
        ]
    }

    /// Append another mesh, re-basing its indices past our vertices.
    pub fn merge(&mut self, other: &TriangleMesh) {
        let offset = self.vertex_count() as u32;
        // A merged mesh either has normals for every vertex or none at all.
        if !self.vertices.is_empty() && (self.normals.is_empty() != other.normals.is_empty()) {
            self.normals.clear();
        } else {
            self.normals.extend_from_slice(&other.normals);
        }
        self.vertices.extend_from_slice(&other.vertices);
        for &idx in &other.indices {
            self.indices.push(idx + offset);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri(z: f64) -> TriangleMesh {
        TriangleMesh {
            vertices: vec![0.0, 0.0, z, 1.0, 0.0, z, 0.0, 1.0, z],
            normals: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            indices: vec![0, 1, 2],
        }
    }

    #[test]
    fn merge_rebases_indices() {
        let mut a = tri(0.0);
        a.merge(&tri(1.0));
        assert_eq!(a.vertex_count(), 6);
        assert_eq!(a.triangle_count(), 2);
        assert_eq!(&a.indices[3..], &[3, 4, 5]);
        assert_eq!(a.normals.len(), a.vertices.len());
    }

    #[test]
    fn merge_drops_normals_on_mismatch() {
        let mut a = tri(0.0);
        let mut b = tri(1.0);
        b.normals.clear();
        a.merge(&b);
        assert!(a.normals.is_empty());
        assert_eq!(a.vertex_count(), 6);
    }
}
