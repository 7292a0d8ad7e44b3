use geode_types::{ModelFormat, Point3D, Transform, Vector3D};

use crate::types::*;

/// Core solid-modeling kernel capability set.
///
/// Implemented by `TruckKernel` (wraps the real truck B-rep stack) and
/// `MockKernel` (deterministic test double). The kernel owns every solid it
/// creates; callers hold opaque handles and must release each exactly once.
///
/// A kernel is free to answer `KernelError::Unsupported` for capabilities it
/// does not provide (e.g. STEP import on a mesh-only backend); callers treat
/// that as a validation failure, not a crash.
pub trait Kernel: Send {
    /// Identifier of the backing implementation, e.g. `"truck-0.6"`.
    fn backend(&self) -> &'static str;

    /// Axis-aligned box with `position` at its minimum corner.
    fn make_box(
        &mut self,
        position: Point3D,
        width: f64,
        height: f64,
        depth: f64,
    ) -> Result<SolidHandle, KernelError>;

    /// Cone (or frustum when `top_radius > 0`) with its base circle centered
    /// at `position`, extending `height` along `axis`.
    fn make_cone(
        &mut self,
        position: Point3D,
        axis: Vector3D,
        base_radius: f64,
        top_radius: f64,
        height: f64,
    ) -> Result<SolidHandle, KernelError>;

    /// Sphere centered at `position`.
    fn make_sphere(&mut self, position: Point3D, radius: f64) -> Result<SolidHandle, KernelError>;

    /// Cylinder with its base circle centered at `position`, extending
    /// `height` along `axis`.
    fn make_cylinder(
        &mut self,
        position: Point3D,
        axis: Vector3D,
        radius: f64,
        height: f64,
    ) -> Result<SolidHandle, KernelError>;

    /// Apply an affine transform, producing a new solid. The input handle
    /// stays valid; the caller decides when to release it.
    fn transform_solid(
        &mut self,
        handle: &SolidHandle,
        transform: &Transform,
    ) -> Result<SolidHandle, KernelError>;

    /// Triangulate a solid. A shape with no faces yields an empty mesh, not
    /// an error — only kernel-internal failures are errors.
    fn tessellate(
        &mut self,
        handle: &SolidHandle,
        spec: &TessellationSpec,
    ) -> Result<TriangleMesh, KernelError>;

    /// Parse a model file already loaded into memory, producing one handle
    /// per solid found.
    fn import_model(
        &mut self,
        bytes: &[u8],
        format: ModelFormat,
        settings: &ImportSettings,
    ) -> Result<Vec<SolidHandle>, KernelError>;

    /// Serialize solids to an in-memory model file.
    fn export_model(
        &mut self,
        handles: &[SolidHandle],
        format: ModelFormat,
        settings: &ExportSettings,
    ) -> Result<Vec<u8>, KernelError>;

    /// Free the solid behind a handle. Releasing an unknown or already
    /// released handle is a no-op.
    fn release(&mut self, handle: &SolidHandle);

    /// Number of solids currently alive in the kernel. Used for resource
    /// accounting in tests and system info.
    fn live_solids(&self) -> usize;
}

/// Shared parameter checks used by both kernel implementations.
pub(crate) fn check_positive(name: &str, value: f64) -> Result<(), KernelError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(KernelError::InvalidParameter {
            reason: format!("{name} must be positive and finite, got {value}"),
        });
    }
    Ok(())
}

/// Non-negative check for parameters where zero is meaningful (top radius of
/// a full cone).
pub(crate) fn check_non_negative(name: &str, value: f64) -> Result<(), KernelError> {
    if !value.is_finite() || value < 0.0 {
        return Err(KernelError::InvalidParameter {
            reason: format!("{name} must be non-negative and finite, got {value}"),
        });
    }
    Ok(())
}

pub(crate) fn check_axis(axis: &Vector3D) -> Result<(), KernelError> {
    if !axis.is_finite() || axis.is_zero() {
        return Err(KernelError::InvalidParameter {
            reason: "axis must be a non-zero finite vector".to_string(),
        });
    }
    Ok(())
}
