//! TruckKernel — real geometry kernel wrapping the truck B-rep stack.

use std::collections::HashMap;

use geode_types::{ModelFormat, Point3D, Transform, Vector3D};
use tracing::debug;

// Import truck types selectively to avoid shadowing std::result::Result.
use truck_modeling::builder;
use truck_modeling::topology::Solid;
use truck_modeling::{EuclideanSpace, InnerSpace, Point3, Rad, Vector3};

use crate::traits::{check_axis, check_non_negative, check_positive, Kernel};
use crate::types::*;
use crate::{mesh_io, primitives, tessellation};

/// A shape stored by the truck kernel: either an exact B-rep solid or an
/// imported triangle mesh (STL/OBJ have no B-rep to recover).
enum TruckShape {
    Brep(Solid),
    Mesh(TriangleMesh),
}

/// Real geometry kernel backed by the truck B-rep crates.
pub struct TruckKernel {
    next_handle: u64,
    solids: HashMap<u64, TruckShape>,
}

impl TruckKernel {
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

    fn store(&mut self, shape: TruckShape) -> SolidHandle {
        let handle = self.alloc_handle();
        self.solids.insert(handle.id(), shape);
        handle
    }

    fn get(&self, handle: &SolidHandle) -> Result<&TruckShape, KernelError> {
        self.solids
            .get(&handle.id())
            .ok_or(KernelError::HandleNotFound { id: handle.id() })
    }

    /// Position a solid built at the origin along +Z: rotate +Z onto `axis`,
    /// then translate to `position`.
    fn place(solid: Solid, position: Point3D, axis: Option<&Vector3D>) -> Solid {
        let mut solid = solid;
        if let Some(axis) = axis {
            let target = Vector3::new(axis.x, axis.y, axis.z).normalize();
            let z = Vector3::unit_z();
            let dot = z.dot(target).clamp(-1.0, 1.0);
            if dot < 1.0 - 1e-12 {
                let (rot_axis, angle) = if dot > -1.0 + 1e-12 {
                    (z.cross(target).normalize(), dot.acos())
                } else {
                    // Antiparallel: any axis orthogonal to Z works.
                    (Vector3::unit_x(), std::f64::consts::PI)
                };
                solid = builder::rotated(&solid, Point3::origin(), rot_axis, Rad(angle));
            }
        }
        if position != Point3D::ORIGIN {
            solid = builder::translated(&solid, Vector3::new(position.x, position.y, position.z));
        }
        solid
    }

    fn transform_brep(solid: &Solid, t: &Transform) -> Solid {
        let mut shape = solid.clone();
        if (t.scale - 1.0).abs() > 1e-12 {
            shape = builder::scaled(
                &shape,
                Point3::origin(),
                Vector3::new(t.scale, t.scale, t.scale),
            );
        }
        if t.rotation_angle != 0.0 {
            let axis = Vector3::new(t.rotation_axis.x, t.rotation_axis.y, t.rotation_axis.z);
            shape = builder::rotated(
                &shape,
                Point3::new(t.rotation_origin.x, t.rotation_origin.y, t.rotation_origin.z),
                axis.normalize(),
                Rad(t.rotation_angle),
            );
        }
        if !t.translation.is_zero() {
            shape = builder::translated(
                &shape,
                Vector3::new(t.translation.x, t.translation.y, t.translation.z),
            );
        }
        shape
    }

    fn transform_mesh(mesh: &TriangleMesh, t: &Transform) -> TriangleMesh {
        let mut out = mesh.clone();

        let k = {
            let len = t.rotation_axis.length();
            if len > 1e-12 {
                [
                    t.rotation_axis.x / len,
                    t.rotation_axis.y / len,
                    t.rotation_axis.z / len,
                ]
            } else {
                [0.0, 0.0, 1.0]
            }
        };
        let (sin, cos) = t.rotation_angle.sin_cos();
        let ro = [t.rotation_origin.x, t.rotation_origin.y, t.rotation_origin.z];

        for chunk in out.vertices.chunks_mut(3) {
            let mut p = [chunk[0] * t.scale, chunk[1] * t.scale, chunk[2] * t.scale];
            if t.rotation_angle != 0.0 {
                let rel = [p[0] - ro[0], p[1] - ro[1], p[2] - ro[2]];
                let rot = rodrigues(rel, k, sin, cos);
                p = [rot[0] + ro[0], rot[1] + ro[1], rot[2] + ro[2]];
            }
            chunk[0] = p[0] + t.translation.x;
            chunk[1] = p[1] + t.translation.y;
            chunk[2] = p[2] + t.translation.z;
        }

        if t.rotation_angle != 0.0 {
            for chunk in out.normals.chunks_mut(3) {
                let rot = rodrigues([chunk[0], chunk[1], chunk[2]], k, sin, cos);
                chunk.copy_from_slice(&rot);
            }
        }

        out
    }
}

/// Rodrigues rotation of `v` around unit axis `k`.
fn rodrigues(v: [f64; 3], k: [f64; 3], sin: f64, cos: f64) -> [f64; 3] {
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

impl Default for TruckKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel for TruckKernel {
    fn backend(&self) -> &'static str {
        "truck-0.6"
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

        let solid = primitives::make_box(width, height, depth);
        let solid = Self::place(solid, position, None);
        Ok(self.store(TruckShape::Brep(solid)))
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

        let solid = primitives::make_cone(base_radius, top_radius, height)?;
        let solid = Self::place(solid, position, Some(&axis));
        Ok(self.store(TruckShape::Brep(solid)))
    }

    fn make_sphere(&mut self, position: Point3D, radius: f64) -> Result<SolidHandle, KernelError> {
        check_positive("radius", radius)?;

        let solid = primitives::make_sphere(radius)?;
        let solid = Self::place(solid, position, None);
        Ok(self.store(TruckShape::Brep(solid)))
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

        let solid = primitives::make_cylinder(radius, height)?;
        let solid = Self::place(solid, position, Some(&axis));
        Ok(self.store(TruckShape::Brep(solid)))
    }

    fn transform_solid(
        &mut self,
        handle: &SolidHandle,
        transform: &Transform,
    ) -> Result<SolidHandle, KernelError> {
        transform
            .validate()
            .map_err(|reason| KernelError::InvalidParameter { reason })?;

        let transformed = match self.get(handle)? {
            TruckShape::Brep(solid) => TruckShape::Brep(Self::transform_brep(solid, transform)),
            TruckShape::Mesh(mesh) => TruckShape::Mesh(Self::transform_mesh(mesh, transform)),
        };
        Ok(self.store(transformed))
    }

    fn tessellate(
        &mut self,
        handle: &SolidHandle,
        spec: &TessellationSpec,
    ) -> Result<TriangleMesh, KernelError> {
        match self.get(handle)? {
            TruckShape::Brep(solid) => tessellation::tessellate_solid(solid, spec),
            // Imported meshes are already triangles.
            TruckShape::Mesh(mesh) => Ok(mesh.clone()),
        }
    }

    fn import_model(
        &mut self,
        bytes: &[u8],
        format: ModelFormat,
        settings: &ImportSettings,
    ) -> Result<Vec<SolidHandle>, KernelError> {
        let meshes = match format {
            ModelFormat::Stl => vec![mesh_io::stl_to_mesh(bytes)?],
            ModelFormat::Obj => {
                if settings.merge_shapes {
                    vec![mesh_io::obj_to_mesh(bytes)?]
                } else {
                    mesh_io::obj_to_meshes(bytes)?
                }
            }
            other => {
                return Err(KernelError::Unsupported {
                    operation: format!("{other} import"),
                })
            }
        };

        debug!(format = %format, shapes = meshes.len(), "imported model");
        Ok(meshes
            .into_iter()
            .map(|m| self.store(TruckShape::Mesh(m)))
            .collect())
    }

    fn export_model(
        &mut self,
        handles: &[SolidHandle],
        format: ModelFormat,
        settings: &ExportSettings,
    ) -> Result<Vec<u8>, KernelError> {
        match format {
            ModelFormat::Stl | ModelFormat::Obj => {
                let mut merged = TriangleMesh::new();
                for handle in handles {
                    let mesh = match self.get(handle)? {
                        TruckShape::Brep(solid) => {
                            tessellation::tessellate_solid(solid, &settings.tessellation)?
                        }
                        TruckShape::Mesh(mesh) => mesh.clone(),
                    };
                    merged.merge(&mesh);
                }
                Ok(match format {
                    ModelFormat::Stl => mesh_io::mesh_to_stl(&merged, settings.binary_mode),
                    _ => mesh_io::mesh_to_obj(&merged),
                })
            }
            ModelFormat::Step => {
                // truck's STEP writer takes exactly one solid; compounds are
                // a kernel capability this backend does not have.
                if handles.len() != 1 {
                    return Err(KernelError::Unsupported {
                        operation: "multi-solid STEP export".to_string(),
                    });
                }
                match self.get(&handles[0])? {
                    TruckShape::Brep(solid) => {
                        use truck_stepio::out;
                        let compressed = solid.compress();
                        let step = out::CompleteStepDisplay::new(
                            out::StepModel::from(&compressed),
                            Default::default(),
                        )
                        .to_string();
                        Ok(step.into_bytes())
                    }
                    TruckShape::Mesh(_) => Err(KernelError::Unsupported {
                        operation: "STEP export of a mesh shape".to_string(),
                    }),
                }
            }
            other => Err(KernelError::Unsupported {
                operation: format!("{other} export"),
            }),
        }
    }

    fn release(&mut self, handle: &SolidHandle) {
        self.solids.remove(&handle.id());
    }

    fn live_solids(&self) -> usize {
        self.solids.len()
    }
}
