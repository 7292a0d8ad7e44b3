//! Wire-layer tests: serde round trips for the envelopes and end-to-end
//! dispatch over a mock-backed service.

use std::collections::HashMap;

use geode_types::{BoxRequest, ModelExportOptions, ModelExportRequest, ModelFormat, Point3D};
use geometry_service::{
    dispatch, dispatch_envelope, GeometryRequest, GeometryResponse, GeometryService,
    RequestContext, RequestEnvelope, StatusCode, CLIENT_ID_METADATA_KEY,
};
use kernel_bridge::MockKernel;
use uuid::Uuid;

fn service() -> GeometryService<MockKernel> {
    GeometryService::new(MockKernel::new())
}

fn box_request() -> GeometryRequest {
    GeometryRequest::CreateBox {
        request: BoxRequest {
            position: Point3D::ORIGIN,
            width: 2.0,
            height: 2.0,
            depth: 2.0,
            color: Default::default(),
        },
    }
}

// ── Serde Round-Trip Tests ──────────────────────────────────────────────

#[test]
fn serde_roundtrip_create_box() {
    let json = serde_json::to_string(&box_request()).unwrap();
    assert!(json.contains("\"type\":\"CreateBox\""));
    let back: GeometryRequest = serde_json::from_str(&json).unwrap();
    assert!(matches!(back, GeometryRequest::CreateBox { .. }));
}

#[test]
fn serde_roundtrip_unit_variants() {
    for (request, tag) in [
        (GeometryRequest::GetAllMeshes, "GetAllMeshes"),
        (GeometryRequest::ClearAll, "ClearAll"),
        (GeometryRequest::GetSystemInfo, "GetSystemInfo"),
        (GeometryRequest::CreateDemoScene, "CreateDemoScene"),
        (GeometryRequest::ListShapes, "ListShapes"),
    ] {
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains(tag), "{json} should carry tag {tag}");
        let _back: GeometryRequest = serde_json::from_str(&json).unwrap();
    }
}

#[test]
fn serde_roundtrip_error_frame() {
    let frame = GeometryResponse::Error {
        code: StatusCode::Internal,
        message: "kernel exploded".to_string(),
    };
    let json = serde_json::to_string(&frame).unwrap();
    let back: GeometryResponse = serde_json::from_str(&json).unwrap();
    assert!(matches!(
        back,
        GeometryResponse::Error { code: StatusCode::Internal, message } if message == "kernel exploded"
    ));
}

#[test]
fn envelope_round_trips_with_metadata() {
    let envelope = RequestEnvelope {
        request_id: Some(Uuid::new_v4()),
        metadata: HashMap::from([(CLIENT_ID_METADATA_KEY.to_string(), "viewer-1".to_string())]),
        timeout_ms: Some(5000),
        request: box_request(),
    };
    let json = serde_json::to_string(&envelope).unwrap();
    let back: RequestEnvelope = serde_json::from_str(&json).unwrap();
    assert_eq!(back.request_id, envelope.request_id);
    assert_eq!(
        back.metadata.get(CLIENT_ID_METADATA_KEY).map(String::as_str),
        Some("viewer-1")
    );
    assert_eq!(back.timeout_ms, Some(5000));
}

#[test]
fn envelope_fields_are_optional_on_the_wire() {
    let json = r#"{"request":{"type":"GetSystemInfo"}}"#;
    let envelope: RequestEnvelope = serde_json::from_str(json).unwrap();
    assert!(envelope.request_id.is_none());
    assert!(envelope.metadata.is_empty());
    assert!(envelope.timeout_ms.is_none());
}

// ── End-to-end dispatch ─────────────────────────────────────────────────

#[test]
fn full_session_flow_through_dispatch() {
    let service = service();
    let ctx = RequestContext::for_client("flow");

    // Create two boxes.
    for _ in 0..2 {
        let response = dispatch(&service, &ctx, box_request());
        assert!(matches!(
            response,
            GeometryResponse::Shape { response } if response.success
        ));
    }

    // List them.
    match dispatch(&service, &ctx, GeometryRequest::ListShapes) {
        GeometryResponse::ShapeList { response } => {
            assert_eq!(response.total_count, 2);
            assert_eq!(response.shape_ids, vec!["shape_1", "shape_2"]);
        }
        other => panic!("expected ShapeList, got {other:?}"),
    }

    // Stream meshes.
    match dispatch(&service, &ctx, GeometryRequest::GetAllMeshes) {
        GeometryResponse::MeshStream { meshes } => assert_eq!(meshes.len(), 2),
        other => panic!("expected MeshStream, got {other:?}"),
    }

    // Clear and verify.
    match dispatch(&service, &ctx, GeometryRequest::ClearAll) {
        GeometryResponse::Status { response } => assert!(response.success),
        other => panic!("expected Status, got {other:?}"),
    }
    match dispatch(&service, &ctx, GeometryRequest::GetSystemInfo) {
        GeometryResponse::SystemInfo { response } => assert_eq!(response.active_shapes, 0),
        other => panic!("expected SystemInfo, got {other:?}"),
    }
}

#[test]
fn envelope_metadata_routes_to_the_right_session() {
    let service = service();

    let make = |client: &str| RequestEnvelope {
        request_id: None,
        metadata: HashMap::from([(CLIENT_ID_METADATA_KEY.to_string(), client.to_string())]),
        timeout_ms: None,
        request: box_request(),
    };

    dispatch_envelope(&service, make("alpha"));
    dispatch_envelope(&service, make("alpha"));
    dispatch_envelope(&service, make("beta"));

    let count = |client: &str| {
        let ctx = RequestContext::for_client(client);
        service.get_system_info(&ctx).active_shapes
    };
    assert_eq!(count("alpha"), 2);
    assert_eq!(count("beta"), 1);
}

#[test]
fn exported_model_data_survives_the_json_layer() {
    let service = service();
    let ctx = RequestContext::for_client("wire");

    let created = dispatch(&service, &ctx, box_request());
    let shape_id = match created {
        GeometryResponse::Shape { response } => response.shape_id,
        other => panic!("expected Shape, got {other:?}"),
    };

    let response = dispatch(
        &service,
        &ctx,
        GeometryRequest::ExportModelFile {
            request: ModelExportRequest {
                shape_ids: vec![shape_id],
                options: ModelExportOptions {
                    format: ModelFormat::Stl,
                    ..ModelExportOptions::default()
                },
            },
        },
    );

    // Serialize the whole response frame and bring it back: the binary
    // payload must be intact after the base64 hop.
    let json = serde_json::to_string(&response).unwrap();
    let back: GeometryResponse = serde_json::from_str(&json).unwrap();
    match (response, back) {
        (
            GeometryResponse::ModelFile { response: sent },
            GeometryResponse::ModelFile { response: received },
        ) => {
            assert!(sent.success, "{}", sent.message);
            assert!(!sent.model_data.is_empty());
            assert_eq!(sent.model_data, received.model_data);
            assert_eq!(received.filename, "model.stl");
        }
        other => panic!("expected ModelFile frames, got {other:?}"),
    }
}
