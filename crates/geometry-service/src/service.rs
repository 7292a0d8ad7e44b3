//! GeometryService — the RPC-facing orchestration layer.
//!
//! The service itself is stateless per call; all state lives in the
//! caller's `ClientSession`. Validation failures travel as
//! `success = false` response bodies; only the bare-mesh operations and
//! deadline expiry surface transport-class `ServiceError`s.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use geode_types::{
    BoxRequest, Color, ColorRequest, ConeRequest, CylinderRequest, DemoSceneResponse, MeshData,
    ModelExportRequest, ModelFileInfo, ModelFileRequest, ModelFileResponse, ModelImportResponse,
    Point3D, ShapeListResponse, ShapeRequest, ShapeResponse, SphereRequest, StatusResponse,
    SystemInfoResponse, TransformRequest, Vector3D,
};
use kernel_bridge::{Kernel, KernelError, SolidHandle};
use model_codec::{format_features, format_version, ImportError};
use parking_lot::Mutex;
use tracing::{error, info, warn};

use crate::config::ServiceConfig;
use crate::error::ServiceError;
use crate::extract;
use crate::registry::ShapeRecord;
use crate::session::{ClientSession, RequestContext, SessionManager};

/// The geometry service: session manager, kernel, and the operation
/// catalog.
pub struct GeometryService<K: Kernel> {
    kernel: Mutex<K>,
    sessions: SessionManager,
    config: ServiceConfig,
}

impl<K: Kernel> GeometryService<K> {
    pub fn new(kernel: K) -> Self {
        Self::with_config(kernel, ServiceConfig::default())
    }

    pub fn with_config(kernel: K, config: ServiceConfig) -> Self {
        Self {
            kernel: Mutex::new(kernel),
            sessions: SessionManager::new(config.default_client_id.clone()),
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The kernel behind the service. Exposed for resource accounting in
    /// tests and tooling.
    pub fn kernel(&self) -> &Mutex<K> {
        &self.kernel
    }

    pub fn session_count(&self) -> usize {
        self.sessions.session_count()
    }

    /// Resolve the caller's session, sweeping idle ones first.
    fn session(&self, ctx: &RequestContext) -> Arc<ClientSession> {
        let reaped = self
            .sessions
            .cleanup_inactive(self.config.session_timeout(), &self.kernel);
        if reaped > 0 {
            info!(reaped, "reaped idle sessions");
        }
        let client_id = self.sessions.resolve_client_id(ctx);
        self.sessions.get_or_create(&client_id)
    }

    // ── Shape construction ──────────────────────────────────────────────

    pub fn create_box(&self, ctx: &RequestContext, req: BoxRequest) -> ShapeResponse {
        self.create_shape(ctx, req.color, |k| {
            k.make_box(req.position, req.width, req.height, req.depth)
        })
    }

    pub fn create_cone(&self, ctx: &RequestContext, req: ConeRequest) -> ShapeResponse {
        self.create_shape(ctx, req.color, |k| {
            k.make_cone(
                req.position,
                req.axis,
                req.base_radius,
                req.top_radius,
                req.height,
            )
        })
    }

    pub fn create_sphere(&self, ctx: &RequestContext, req: SphereRequest) -> ShapeResponse {
        self.create_shape(ctx, req.color, |k| k.make_sphere(req.position, req.radius))
    }

    pub fn create_cylinder(&self, ctx: &RequestContext, req: CylinderRequest) -> ShapeResponse {
        self.create_shape(ctx, req.color, |k| {
            k.make_cylinder(req.position, req.axis, req.radius, req.height)
        })
    }

    /// Shared construction path: build in the kernel first, register only
    /// on success, so a failed construction never leaves a record behind.
    fn create_shape(
        &self,
        ctx: &RequestContext,
        color: Color,
        build: impl FnOnce(&mut K) -> Result<SolidHandle, KernelError>,
    ) -> ShapeResponse {
        let session = self.session(ctx);

        let handle = {
            let mut kernel = self.kernel.lock();
            build(&mut *kernel)
        };
        let handle = match handle {
            Ok(handle) => handle,
            Err(e) => {
                warn!(client_id = session.client_id(), error = %e, "construction failed");
                return ShapeResponse::failed(e.to_string());
            }
        };

        let mut state = session.state();
        let shape_id = state.registry.generate_shape_id();
        let record = ShapeRecord::new(shape_id, handle, color.clamped());
        let properties = record.properties();
        state.registry.insert(record);
        ShapeResponse::ok(properties)
    }

    // ── Shape lifecycle ─────────────────────────────────────────────────

    pub fn delete_shape(&self, ctx: &RequestContext, req: ShapeRequest) -> StatusResponse {
        let session = self.session(ctx);
        let mut state = session.state();
        match state.registry.remove(&req.shape_id) {
            Some(record) => {
                self.kernel.lock().release(&record.handle);
                StatusResponse::ok(format!("deleted {}", req.shape_id))
            }
            None => StatusResponse::failed(format!("shape not found: {}", req.shape_id)),
        }
    }

    pub fn transform_shape(&self, ctx: &RequestContext, req: TransformRequest) -> ShapeResponse {
        if let Err(reason) = req.transform.validate() {
            return ShapeResponse::failed(format!("invalid transform: {reason}"));
        }

        let session = self.session(ctx);
        let mut state = session.state();
        let old_handle = match state.registry.get(&req.shape_id) {
            Some(record) => record.handle.clone(),
            None => return ShapeResponse::failed(format!("shape not found: {}", req.shape_id)),
        };

        let transformed = self
            .kernel
            .lock()
            .transform_solid(&old_handle, &req.transform);
        match transformed {
            Ok(new_handle) => {
                if let Some(record) = state.registry.get_mut(&req.shape_id) {
                    self.kernel.lock().release(&old_handle);
                    record.handle = new_handle;
                    record.version += 1;
                    ShapeResponse::ok(record.properties())
                } else {
                    // The record cannot vanish while we hold the session
                    // lock; keep the kernel balanced regardless.
                    self.kernel.lock().release(&new_handle);
                    ShapeResponse::failed(format!("shape not found: {}", req.shape_id))
                }
            }
            Err(e) => ShapeResponse::failed(e.to_string()),
        }
    }

    pub fn set_shape_color(&self, ctx: &RequestContext, req: ColorRequest) -> StatusResponse {
        let session = self.session(ctx);
        let mut state = session.state();
        match state.registry.get_mut(&req.shape_id) {
            Some(record) => {
                record.color = req.color.clamped();
                record.version += 1;
                StatusResponse::ok(format!("recolored {}", req.shape_id))
            }
            None => StatusResponse::failed(format!("shape not found: {}", req.shape_id)),
        }
    }

    pub fn clear_all(&self, ctx: &RequestContext) -> StatusResponse {
        let session = self.session(ctx);
        let mut state = session.state();
        let records = state.registry.clear();
        if !records.is_empty() {
            let mut kernel = self.kernel.lock();
            for record in &records {
                kernel.release(&record.handle);
            }
        }
        StatusResponse::ok(format!("cleared {} shapes", records.len()))
    }

    // ── Mesh extraction ─────────────────────────────────────────────────

    pub fn get_mesh_data(
        &self,
        ctx: &RequestContext,
        req: ShapeRequest,
    ) -> Result<MeshData, ServiceError> {
        let session = self.session(ctx);
        let state = session.state();
        let record = state
            .registry
            .get(&req.shape_id)
            .ok_or(ServiceError::NotFound {
                shape_id: req.shape_id.clone(),
            })?;

        let mut kernel = self.kernel.lock();
        extract::extract_mesh(&mut *kernel, record, &self.config.tessellation()).map_err(|e| {
            error!(shape_id = %req.shape_id, error = %e, "tessellation failed");
            ServiceError::Internal {
                reason: e.to_string(),
            }
        })
    }

    /// Extract every live shape in the caller's session, in creation
    /// order. Snapshot-at-start: the session lock is held for the whole
    /// stream. Fails fast — the first extraction failure aborts the
    /// stream with an internal error.
    pub fn get_all_meshes(&self, ctx: &RequestContext) -> Result<Vec<MeshData>, ServiceError> {
        let session = self.session(ctx);
        let state = session.state();

        let spec = self.config.tessellation();
        let mut kernel = self.kernel.lock();
        let mut meshes = Vec::with_capacity(state.registry.len());
        for record in state.registry.records() {
            match extract::extract_mesh(&mut *kernel, record, &spec) {
                Ok(mesh) => meshes.push(mesh),
                Err(e) => {
                    error!(shape_id = %record.shape_id, error = %e, "aborting mesh stream");
                    return Err(ServiceError::Internal {
                        reason: format!("extraction failed for {}: {e}", record.shape_id),
                    });
                }
            }
        }
        Ok(meshes)
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn list_shapes(&self, ctx: &RequestContext) -> ShapeListResponse {
        let session = self.session(ctx);
        let state = session.state();
        let shape_ids = state.registry.ids();
        ShapeListResponse {
            total_count: shape_ids.len(),
            shape_ids,
        }
    }

    pub fn get_system_info(&self, ctx: &RequestContext) -> SystemInfoResponse {
        let session = self.session(ctx);
        let active_shapes = session.state().registry.len();
        SystemInfoResponse {
            version: env!("CARGO_PKG_VERSION").to_string(),
            active_shapes,
            kernel_version: self.kernel.lock().backend().to_string(),
        }
    }

    // ── Demo scene ──────────────────────────────────────────────────────

    /// Build the documented demo scene: a box and a cone side by side.
    /// Partial failure reports the created count rather than rolling back.
    pub fn create_demo_scene(&self, ctx: &RequestContext) -> DemoSceneResponse {
        let attempts: Vec<(&str, ShapeResponse)> = vec![
            (
                "box",
                self.create_box(
                    ctx,
                    BoxRequest {
                        position: Point3D::ORIGIN,
                        width: 5.0,
                        height: 5.0,
                        depth: 5.0,
                        color: Color::new(0.3, 0.5, 0.8, 1.0),
                    },
                ),
            ),
            (
                "cone",
                self.create_cone(
                    ctx,
                    ConeRequest {
                        position: Point3D::new(8.0, 0.0, 0.0),
                        axis: Vector3D::UNIT_Z,
                        base_radius: 2.5,
                        top_radius: 0.0,
                        height: 5.0,
                        color: Color::new(0.8, 0.4, 0.3, 1.0),
                    },
                ),
            ),
        ];

        let total = attempts.len() as u32;
        let mut shape_ids = Vec::new();
        for (name, response) in attempts {
            if response.success {
                shape_ids.push(response.shape_id);
            } else {
                warn!(shape = name, message = %response.message, "demo shape failed");
            }
        }

        let created = shape_ids.len() as u32;
        DemoSceneResponse {
            success: created > 0,
            message: format!("created {created} of {total} demo shapes"),
            created,
            shape_ids,
        }
    }

    // ── Model files ─────────────────────────────────────────────────────

    pub fn import_model_file(
        &self,
        ctx: &RequestContext,
        req: ModelFileRequest,
    ) -> Result<ModelImportResponse, ServiceError> {
        let session = self.session(ctx);

        let outcome = {
            let mut kernel = self.kernel.lock();
            model_codec::import_model_file(
                &mut *kernel,
                Path::new(&req.file_path),
                &req.options,
                ctx.deadline,
            )
        };

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(ImportError::DeadlineExceeded) => return Err(ServiceError::DeadlineExceeded),
            Err(e) => return Ok(ModelImportResponse::failed(e.to_string())),
        };

        let mut state = session.state();
        let shape_ids: Vec<String> = outcome
            .handles
            .into_iter()
            .map(|handle| {
                let shape_id = state.registry.generate_shape_id();
                state
                    .registry
                    .insert(ShapeRecord::new(shape_id.clone(), handle, Color::default()));
                shape_id
            })
            .collect();

        let file_info = ModelFileInfo {
            filename: outcome.filename.clone(),
            file_size: outcome.file_size,
            shape_count: shape_ids.len() as u32,
            format: outcome.format,
            creation_time: Utc::now(),
            format_version: format_version(outcome.format).to_string(),
            supported_features: format_features(outcome.format),
        };

        Ok(ModelImportResponse {
            success: true,
            message: format!(
                "imported {} shapes from {}",
                shape_ids.len(),
                outcome.filename
            ),
            shape_ids,
            detected_format: Some(outcome.format),
            file_info: Some(file_info),
        })
    }

    pub fn export_model_file(
        &self,
        ctx: &RequestContext,
        req: ModelExportRequest,
    ) -> ModelFileResponse {
        if req.shape_ids.is_empty() {
            return ModelFileResponse::failed("no shapes requested for export");
        }

        let session = self.session(ctx);
        // Hold the session lock through the export so the handles cannot be
        // released by a racing delete.
        let state = session.state();

        let mut handles = Vec::with_capacity(req.shape_ids.len());
        for shape_id in &req.shape_ids {
            match state.registry.get(shape_id) {
                Some(record) => handles.push(record.handle.clone()),
                None => {
                    return ModelFileResponse::failed(format!("shape not found: {shape_id}"));
                }
            }
        }

        let outcome = {
            let mut kernel = self.kernel.lock();
            model_codec::export_model(&mut *kernel, &handles, &req.options)
        };

        match outcome {
            Ok(outcome) => {
                let file_info = ModelFileInfo {
                    filename: outcome.filename.clone(),
                    file_size: outcome.bytes.len() as u64,
                    shape_count: handles.len() as u32,
                    format: req.options.format,
                    creation_time: Utc::now(),
                    format_version: format_version(req.options.format).to_string(),
                    supported_features: format_features(req.options.format),
                };
                ModelFileResponse {
                    success: true,
                    message: format!("exported {} shapes", handles.len()),
                    model_data: outcome.bytes,
                    filename: outcome.filename,
                    file_info: Some(file_info),
                }
            }
            Err(e) => ModelFileResponse::failed(e.to_string()),
        }
    }
}
