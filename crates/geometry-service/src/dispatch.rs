//! Wire dispatch layer.
//!
//! Requests and responses are internally-tagged serde enums so any
//! connection-oriented transport (gRPC adapter, WebSocket, worker
//! postMessage) can carry them as JSON. Every handler is an error
//! boundary: transport-class failures come back as `Error` frames and a
//! panicking kernel never unwinds into the caller's dispatch loop.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::{Duration, Instant};

use geode_types::{
    BoxRequest, ColorRequest, ConeRequest, CylinderRequest, DemoSceneResponse, MeshData,
    ModelExportRequest, ModelFileRequest, ModelFileResponse, ModelImportResponse, ShapeListResponse,
    ShapeRequest, ShapeResponse, SphereRequest, StatusResponse, SystemInfoResponse,
    TransformRequest,
};
use kernel_bridge::Kernel;
use serde::{Deserialize, Serialize};
use tracing::{error, info_span};
use uuid::Uuid;

use crate::error::{ServiceError, StatusCode};
use crate::service::GeometryService;
use crate::session::RequestContext;

/// Messages from a client to the geometry service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeometryRequest {
    // -- Shape construction --
    CreateBox { request: BoxRequest },
    CreateCone { request: ConeRequest },
    CreateSphere { request: SphereRequest },
    CreateCylinder { request: CylinderRequest },

    // -- Shape lifecycle --
    DeleteShape { request: ShapeRequest },
    TransformShape { request: TransformRequest },
    SetShapeColor { request: ColorRequest },
    ClearAll,

    // -- Meshes --
    GetMeshData { request: ShapeRequest },
    /// Server-streaming: one `MeshData` per live shape, snapshot-at-start.
    GetAllMeshes,

    // -- Queries --
    ListShapes,
    GetSystemInfo,

    // -- Batch --
    CreateDemoScene,

    // -- Model files --
    ImportModelFile { request: ModelFileRequest },
    ExportModelFile { request: ModelExportRequest },
}

/// Messages from the geometry service back to a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeometryResponse {
    Shape { response: ShapeResponse },
    Status { response: StatusResponse },
    Mesh { mesh: MeshData },
    /// A transport adapter may flush one message per element.
    MeshStream { meshes: Vec<MeshData> },
    ShapeList { response: ShapeListResponse },
    SystemInfo { response: SystemInfoResponse },
    DemoScene { response: DemoSceneResponse },
    ModelImport { response: ModelImportResponse },
    ModelFile { response: ModelFileResponse },
    /// Transport-class failure; validation failures travel in the bodies
    /// above instead.
    Error { code: StatusCode, message: String },
}

/// Wire envelope around a request: correlation id, session metadata, and an
/// optional relative deadline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestEnvelope {
    #[serde(default)]
    pub request_id: Option<Uuid>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    pub request: GeometryRequest,
}

/// Wire envelope around a response, echoing the correlation id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub request_id: Uuid,
    pub response: GeometryResponse,
}

/// Dispatch one request against the service.
///
/// This is the error boundary: `ServiceError`s become `Error` frames and
/// panics are caught and reported as internal errors rather than crossing
/// back into the transport's dispatch loop.
pub fn dispatch<K: Kernel>(
    service: &GeometryService<K>,
    ctx: &RequestContext,
    request: GeometryRequest,
) -> GeometryResponse {
    match catch_unwind(AssertUnwindSafe(|| handle_request(service, ctx, request))) {
        Ok(response) => response,
        Err(panic) => {
            let message = panic_message(panic);
            error!(message, "request handler panicked");
            GeometryResponse::Error {
                code: StatusCode::Internal,
                message,
            }
        }
    }
}

/// Dispatch a full envelope, deriving the request context from its
/// metadata and deadline.
pub fn dispatch_envelope<K: Kernel>(
    service: &GeometryService<K>,
    envelope: RequestEnvelope,
) -> ResponseEnvelope {
    let request_id = envelope.request_id.unwrap_or_else(Uuid::new_v4);
    let ctx = RequestContext {
        metadata: envelope.metadata,
        deadline: envelope
            .timeout_ms
            .map(|ms| Instant::now() + Duration::from_millis(ms)),
    };

    let span = info_span!("request", %request_id);
    let _enter = span.enter();

    ResponseEnvelope {
        request_id,
        response: dispatch(service, &ctx, envelope.request),
    }
}

fn handle_request<K: Kernel>(
    service: &GeometryService<K>,
    ctx: &RequestContext,
    request: GeometryRequest,
) -> GeometryResponse {
    match request {
        GeometryRequest::CreateBox { request } => GeometryResponse::Shape {
            response: service.create_box(ctx, request),
        },
        GeometryRequest::CreateCone { request } => GeometryResponse::Shape {
            response: service.create_cone(ctx, request),
        },
        GeometryRequest::CreateSphere { request } => GeometryResponse::Shape {
            response: service.create_sphere(ctx, request),
        },
        GeometryRequest::CreateCylinder { request } => GeometryResponse::Shape {
            response: service.create_cylinder(ctx, request),
        },

        GeometryRequest::DeleteShape { request } => GeometryResponse::Status {
            response: service.delete_shape(ctx, request),
        },
        GeometryRequest::TransformShape { request } => GeometryResponse::Shape {
            response: service.transform_shape(ctx, request),
        },
        GeometryRequest::SetShapeColor { request } => GeometryResponse::Status {
            response: service.set_shape_color(ctx, request),
        },
        GeometryRequest::ClearAll => GeometryResponse::Status {
            response: service.clear_all(ctx),
        },

        GeometryRequest::GetMeshData { request } => match service.get_mesh_data(ctx, request) {
            Ok(mesh) => GeometryResponse::Mesh { mesh },
            Err(e) => error_response(e),
        },
        GeometryRequest::GetAllMeshes => match service.get_all_meshes(ctx) {
            Ok(meshes) => GeometryResponse::MeshStream { meshes },
            Err(e) => error_response(e),
        },

        GeometryRequest::ListShapes => GeometryResponse::ShapeList {
            response: service.list_shapes(ctx),
        },
        GeometryRequest::GetSystemInfo => GeometryResponse::SystemInfo {
            response: service.get_system_info(ctx),
        },

        GeometryRequest::CreateDemoScene => GeometryResponse::DemoScene {
            response: service.create_demo_scene(ctx),
        },

        GeometryRequest::ImportModelFile { request } => {
            match service.import_model_file(ctx, request) {
                Ok(response) => GeometryResponse::ModelImport { response },
                Err(e) => error_response(e),
            }
        }
        GeometryRequest::ExportModelFile { request } => GeometryResponse::ModelFile {
            response: service.export_model_file(ctx, request),
        },
    }
}

fn error_response(e: ServiceError) -> GeometryResponse {
    GeometryResponse::Error {
        code: e.code(),
        message: e.to_string(),
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
