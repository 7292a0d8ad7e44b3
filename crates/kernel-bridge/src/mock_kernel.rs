//! MockKernel — deterministic test double implementing Kernel.
//!
//! Every solid is modeled as its axis-aligned extent, so construction,
//! transform and tessellation results are exactly predictable. STL and OBJ
//! go through the real mesh IO; STEP, IGES and BREP use a synthetic
//! self-describing encoding that survives an export/import round trip with
//! the same shape count.

use std::collections::HashMap;
use std::fmt::Write as _;

use geode_types::{ModelFormat, Point3D, Transform, Vector3D};

use crate::mesh_io;
use crate::traits::{check_axis, check_non_negative, check_positive, Kernel};
use crate::types::*;

/// A synthetic solid: its axis-aligned extent.
#[derive(Debug, Clone)]
struct MockSolid {
    min: [f64; 3],
    max: [f64; 3],
}

impl MockSolid {
    fn corners(&self) -> [[f64; 3]; 8] {
        let (n, x) = (self.min, self.max);
        [
            [n[0], n[1], n[2]],
            [x[0], n[1], n[2]],
            [x[0], x[1], n[2]],
            [n[0], x[1], n[2]],
            [n[0], n[1], x[2]],
            [x[0], n[1], x[2]],
            [x[0], x[1], x[2]],
            [n[0], x[1], x[2]],
        ]
    }

    fn from_points(points: impl IntoIterator<Item = [f64; 3]>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut solid = MockSolid {
            min: first,
            max: first,
        };
        for p in iter {
            for i in 0..3 {
                solid.min[i] = solid.min[i].min(p[i]);
                solid.max[i] = solid.max[i].max(p[i]);
            }
        }
        Some(solid)
    }
}

/// Deterministic test double for the geometry kernel.
pub struct MockKernel {
    next_handle: u64,
    solids: HashMap<u64, MockSolid>,
}

impl MockKernel {
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            solids: HashMap::new(),
        }
    }

    fn alloc_handle(&mut self) -> SolidHandle {
        let h = SolidHandle(self.next_handle);
        self.next_handle += 1;
        h
    }

    fn store(&mut self, solid: MockSolid) -> SolidHandle {
        let handle = self.alloc_handle();
        self.solids.insert(handle.id(), solid);
        handle
    }

    fn get(&self, handle: &SolidHandle) -> Result<&MockSolid, KernelError> {
        self.solids
            .get(&handle.id())
            .ok_or(KernelError::HandleNotFound { id: handle.id() })
    }

    fn unit_boxes(&mut self, count: usize) -> Vec<SolidHandle> {
        (0..count)
            .map(|i| {
                let off = i as f64 * 2.0;
                self.store(MockSolid {
                    min: [off, 0.0, 0.0],
                    max: [off + 1.0, 1.0, 1.0],
                })
            })
            .collect()
    }

    /// Deterministic box mesh: 2 triangles per face, 6 faces, per-face
    /// normals. A degenerate extent yields an empty mesh.
    fn tessellate_box(solid: &MockSolid) -> TriangleMesh {
        let size = [
            solid.max[0] - solid.min[0],
            solid.max[1] - solid.min[1],
            solid.max[2] - solid.min[2],
        ];
        if size.iter().all(|&s| s == 0.0) {
            return TriangleMesh::new();
        }

        let c = solid.corners();
        // Each face: 4 corner indices (CCW seen from outside) + outward normal.
        let faces: [([usize; 4], [f64; 3]); 6] = [
            ([0, 3, 2, 1], [0.0, 0.0, -1.0]), // bottom
            ([4, 5, 6, 7], [0.0, 0.0, 1.0]),  // top
            ([0, 1, 5, 4], [0.0, -1.0, 0.0]), // front
            ([2, 3, 7, 6], [0.0, 1.0, 0.0]),  // back
            ([0, 4, 7, 3], [-1.0, 0.0, 0.0]), // left
            ([1, 2, 6, 5], [1.0, 0.0, 0.0]),  // right
        ];

        let mut mesh = TriangleMesh::new();
        for (quad, normal) in &faces {
            let base = mesh.vertex_count() as u32;
            for &ci in quad {
                mesh.vertices.extend_from_slice(&c[ci]);
                mesh.normals.extend_from_slice(normal);
            }
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        mesh
    }
}

impl Default for MockKernel {
    fn default() -> Self {
        Self::new()
    }
}

fn rotate_point(v: [f64; 3], k: [f64; 3], sin: f64, cos: f64) -> [f64; 3] {
    let cross = [
        k[1] * v[2] - k[2] * v[1],
        k[2] * v[0] - k[0] * v[2],
        k[0] * v[1] - k[1] * v[0],
    ];
    let dot = k[0] * v[0] + k[1] * v[1] + k[2] * v[2];
    [
        v[0] * cos + cross[0] * sin + k[0] * dot * (1.0 - cos),
        v[1] * cos + cross[1] * sin + k[1] * dot * (1.0 - cos),
        v[2] * cos + cross[2] * sin + k[2] * dot * (1.0 - cos),
    ]
}

impl Kernel for MockKernel {
    fn backend(&self) -> &'static str {
        "mock"
    }

    fn make_box(
        &mut self,
        position: Point3D,
        width: f64,
        height: f64,
        depth: f64,
    ) -> Result<SolidHandle, KernelError> {
        check_positive("width", width)?;
        check_positive("height", height)?;
        check_positive("depth", depth)?;

        Ok(self.store(MockSolid {
            min: [position.x, position.y, position.z],
            max: [position.x + width, position.y + height, position.z + depth],
        }))
    }

    fn make_cone(
        &mut self,
        position: Point3D,
        axis: Vector3D,
        base_radius: f64,
        top_radius: f64,
        height: f64,
    ) -> Result<SolidHandle, KernelError> {
        check_positive("base_radius", base_radius)?;
        check_non_negative("top_radius", top_radius)?;
        check_positive("height", height)?;
        check_axis(&axis)?;
        if top_radius >= base_radius {
            return Err(KernelError::InvalidParameter {
                reason: format!(
                    "top_radius ({top_radius}) must be smaller than base_radius ({base_radius})"
                ),
            });
        }

        let len = axis.length();
        let tip = [
            position.x + axis.x / len * height,
            position.y + axis.y / len * height,
            position.z + axis.z / len * height,
        ];
        let base = [position.x, position.y, position.z];
        // Conservative extent: both circle centers padded by the base radius.
        let solid = MockSolid::from_points([
            [base[0] - base_radius, base[1] - base_radius, base[2] - base_radius],
            [base[0] + base_radius, base[1] + base_radius, base[2] + base_radius],
            [tip[0] - base_radius, tip[1] - base_radius, tip[2] - base_radius],
            [tip[0] + base_radius, tip[1] + base_radius, tip[2] + base_radius],
        ])
        .expect("non-empty corner set");
        Ok(self.store(solid))
    }

    fn make_sphere(&mut self, position: Point3D, radius: f64) -> Result<SolidHandle, KernelError> {
        check_positive("radius", radius)?;
        Ok(self.store(MockSolid {
            min: [position.x - radius, position.y - radius, position.z - radius],
            max: [position.x + radius, position.y + radius, position.z + radius],
        }))
    }

    fn make_cylinder(
        &mut self,
        position: Point3D,
        axis: Vector3D,
        radius: f64,
        height: f64,
    ) -> Result<SolidHandle, KernelError> {
        check_positive("radius", radius)?;
        check_positive("height", height)?;
        check_axis(&axis)?;

        let len = axis.length();
        let top = [
            position.x + axis.x / len * height,
            position.y + axis.y / len * height,
            position.z + axis.z / len * height,
        ];
        let base = [position.x, position.y, position.z];
        let solid = MockSolid::from_points([
            [base[0] - radius, base[1] - radius, base[2] - radius],
            [base[0] + radius, base[1] + radius, base[2] + radius],
            [top[0] - radius, top[1] - radius, top[2] - radius],
            [top[0] + radius, top[1] + radius, top[2] + radius],
        ])
        .expect("non-empty corner set");
        Ok(self.store(solid))
    }

    fn transform_solid(
        &mut self,
        handle: &SolidHandle,
        transform: &Transform,
    ) -> Result<SolidHandle, KernelError> {
        transform
            .validate()
            .map_err(|reason| KernelError::InvalidParameter { reason })?;

        let source = self.get(handle)?.clone();

        let k = {
            let len = transform.rotation_axis.length();
            if len > 1e-12 {
                [
                    transform.rotation_axis.x / len,
                    transform.rotation_axis.y / len,
                    transform.rotation_axis.z / len,
                ]
            } else {
                [0.0, 0.0, 1.0]
            }
        };
        let (sin, cos) = transform.rotation_angle.sin_cos();
        let ro = [
            transform.rotation_origin.x,
            transform.rotation_origin.y,
            transform.rotation_origin.z,
        ];

        let transformed = source.corners().into_iter().map(|corner| {
            let mut p = [
                corner[0] * transform.scale,
                corner[1] * transform.scale,
                corner[2] * transform.scale,
            ];
            if transform.rotation_angle != 0.0 {
                let rel = [p[0] - ro[0], p[1] - ro[1], p[2] - ro[2]];
                let rot = rotate_point(rel, k, sin, cos);
                p = [rot[0] + ro[0], rot[1] + ro[1], rot[2] + ro[2]];
            }
            [
                p[0] + transform.translation.x,
                p[1] + transform.translation.y,
                p[2] + transform.translation.z,
            ]
        });

        let solid = MockSolid::from_points(transformed).expect("non-empty corner set");
        Ok(self.store(solid))
    }

    fn tessellate(
        &mut self,
        handle: &SolidHandle,
        _spec: &TessellationSpec,
    ) -> Result<TriangleMesh, KernelError> {
        let solid = self.get(handle)?;
        Ok(Self::tessellate_box(solid))
    }

    fn import_model(
        &mut self,
        bytes: &[u8],
        format: ModelFormat,
        settings: &ImportSettings,
    ) -> Result<Vec<SolidHandle>, KernelError> {
        match format {
            ModelFormat::Stl => {
                let mesh = mesh_io::stl_to_mesh(bytes)?;
                let solid = MockSolid::from_points(
                    (0..mesh.vertex_count()).map(|i| mesh.vertex(i)),
                )
                .ok_or(KernelError::ImportFailed {
                    reason: "STL contains no vertices".to_string(),
                })?;
                Ok(vec![self.store(solid)])
            }
            ModelFormat::Obj => {
                let meshes = if settings.merge_shapes {
                    vec![mesh_io::obj_to_mesh(bytes)?]
                } else {
                    mesh_io::obj_to_meshes(bytes)?
                };
                Ok(meshes
                    .into_iter()
                    .filter_map(|m| {
                        MockSolid::from_points((0..m.vertex_count()).map(|i| m.vertex(i)))
                    })
                    .map(|s| self.store(s))
                    .collect())
            }
            ModelFormat::Step => {
                let text = String::from_utf8_lossy(bytes);
                if !text.starts_with("ISO-10303-21") {
                    return Err(KernelError::ImportFailed {
                        reason: "missing ISO-10303-21 header".to_string(),
                    });
                }
                let count = text.matches("MANIFOLD_SOLID_BREP").count().max(1);
                Ok(self.unit_boxes(count))
            }
            ModelFormat::Iges => {
                let text = String::from_utf8_lossy(bytes);
                if text.trim().is_empty() {
                    return Err(KernelError::ImportFailed {
                        reason: "empty IGES file".to_string(),
                    });
                }
                let count = text
                    .lines()
                    .filter(|l| l.starts_with("SOLID"))
                    .count()
                    .max(1);
                Ok(self.unit_boxes(count))
            }
            ModelFormat::Brep => {
                let text = String::from_utf8_lossy(bytes);
                if !text.starts_with("DBRep_DrawableShape") {
                    return Err(KernelError::ImportFailed {
                        reason: "missing DBRep_DrawableShape header".to_string(),
                    });
                }
                let count = text
                    .lines()
                    .filter(|l| l.starts_with("Solid"))
                    .count()
                    .max(1);
                Ok(self.unit_boxes(count))
            }
        }
    }

    fn export_model(
        &mut self,
        handles: &[SolidHandle],
        format: ModelFormat,
        settings: &ExportSettings,
    ) -> Result<Vec<u8>, KernelError> {
        match format {
            ModelFormat::Stl => {
                let mut merged = TriangleMesh::new();
                for handle in handles {
                    let solid = self.get(handle)?;
                    merged.merge(&Self::tessellate_box(solid));
                }
                Ok(mesh_io::mesh_to_stl(&merged, settings.binary_mode))
            }
            ModelFormat::Obj => {
                // One `o` group per solid so a re-import sees the same count.
                let mut out = String::from("# geode mock OBJ export\n");
                let mut offset = 1u32;
                for (i, handle) in handles.iter().enumerate() {
                    let solid = self.get(handle)?;
                    let mesh = Self::tessellate_box(solid);
                    let _ = writeln!(out, "o solid_{i}");
                    for vi in 0..mesh.vertex_count() {
                        let v = mesh.vertex(vi);
                        let _ = writeln!(out, "v {} {} {}", v[0], v[1], v[2]);
                    }
                    for tri in mesh.indices.chunks(3) {
                        let _ = writeln!(
                            out,
                            "f {} {} {}",
                            tri[0] + offset,
                            tri[1] + offset,
                            tri[2] + offset
                        );
                    }
                    offset += mesh.vertex_count() as u32;
                }
                Ok(out.into_bytes())
            }
            ModelFormat::Step => {
                let mut out = String::new();
                out.push_str("ISO-10303-21;\nHEADER;\nFILE_SCHEMA(('GEODE_MOCK'));\nENDSEC;\nDATA;\n");
                for (i, handle) in handles.iter().enumerate() {
                    self.get(handle)?;
                    let _ = writeln!(out, "#{} = MANIFOLD_SOLID_BREP('solid_{i}');", i + 1);
                }
                out.push_str("ENDSEC;\nEND-ISO-10303-21;\n");
                Ok(out.into_bytes())
            }
            ModelFormat::Iges => {
                // Start-section record: 72 data columns, section letter in
                // column 73.
                let mut out = format!("{:<72}S0000001\n", "geode mock IGES model");
                for (i, handle) in handles.iter().enumerate() {
                    self.get(handle)?;
                    let _ = writeln!(out, "SOLID {i}");
                }
                Ok(out.into_bytes())
            }
            ModelFormat::Brep => {
                let mut out = String::from("DBRep_DrawableShape\n");
                for (i, handle) in handles.iter().enumerate() {
                    self.get(handle)?;
                    let _ = writeln!(out, "Solid {i}");
                }
                Ok(out.into_bytes())
            }
        }
    }

    fn release(&mut self, handle: &SolidHandle) {
        self.solids.remove(&handle.id());
    }

    fn live_solids(&self) -> usize {
        self.solids.len()
    }
}
