//! Import/export scenarios through the service: detection, failure
//! reporting, and the round-trip shape-count property.

use std::io::Write as _;

use geode_types::{
    ModelExportOptions, ModelExportRequest, ModelFileRequest, ModelFormat, ModelImportOptions,
};
use test_harness::{init_tracing, ServiceHarness};

fn step_fixture(solids: usize) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".step").tempfile().unwrap();
    let mut body = String::from("ISO-10303-21;\nHEADER;\nENDSEC;\nDATA;\n");
    for i in 0..solids {
        body.push_str(&format!("#{} = MANIFOLD_SOLID_BREP('s{i}');\n", i + 1));
    }
    body.push_str("ENDSEC;\nEND-ISO-10303-21;\n");
    file.write_all(body.as_bytes()).unwrap();
    file
}

// ── Failure reporting ───────────────────────────────────────────────────

#[test]
fn nonexistent_file_fails_in_the_body_not_the_transport() {
    init_tracing();
    let h = ServiceHarness::mock();

    let result = h.service.import_model_file(
        &h.ctx,
        ModelFileRequest {
            file_path: "nonexistent.step".to_string(),
            options: ModelImportOptions::default(),
        },
    );

    // Transport-level OK…
    let response = result.expect("missing file is a validation failure, not a transport error");
    // …validation failure in the body.
    assert!(!response.success);
    assert!(!response.message.is_empty());
    assert!(response.shape_ids.is_empty());
}

#[test]
fn undetectable_format_fails_with_a_descriptive_message() {
    let h = ServiceHarness::mock();
    let mut file = tempfile::Builder::new().suffix(".bin").tempfile().unwrap();
    file.write_all(&[0u8, 1, 2, 3, 4, 5]).unwrap();

    let response = h
        .service
        .import_model_file(
            &h.ctx,
            ModelFileRequest {
                file_path: file.path().display().to_string(),
                options: ModelImportOptions::default(),
            },
        )
        .unwrap();
    assert!(!response.success);
    assert!(response.message.contains("format"));
}

#[test]
fn export_with_no_shape_ids_fails_in_the_body() {
    let h = ServiceHarness::mock();
    let response = h.service.export_model_file(
        &h.ctx,
        ModelExportRequest {
            shape_ids: Vec::new(),
            options: ModelExportOptions::default(),
        },
    );
    assert!(!response.success);
    assert!(response.model_data.is_empty());
}

#[test]
fn export_with_unknown_shape_id_fails_in_the_body() {
    let h = ServiceHarness::mock();
    h.create_box_ok([0.0; 3], [1.0, 1.0, 1.0]);

    let response = h.service.export_model_file(
        &h.ctx,
        ModelExportRequest {
            shape_ids: vec!["shape_1".to_string(), "shape_77".to_string()],
            options: ModelExportOptions::default(),
        },
    );
    assert!(!response.success);
    assert!(response.message.contains("shape_77"));
}

// ── Import results ──────────────────────────────────────────────────────

#[test]
fn step_import_reports_format_and_file_info() {
    let h = ServiceHarness::mock();
    let file = step_fixture(2);

    let response = h
        .service
        .import_model_file(
            &h.ctx,
            ModelFileRequest {
                file_path: file.path().display().to_string(),
                options: ModelImportOptions::default(),
            },
        )
        .unwrap();

    assert!(response.success, "{}", response.message);
    assert_eq!(response.shape_ids.len(), 2);
    assert_eq!(response.detected_format, Some(ModelFormat::Step));

    let info = response.file_info.expect("successful import carries file info");
    assert_eq!(info.shape_count, 2);
    assert!(info.file_size > 0);
    assert_eq!(info.format, ModelFormat::Step);
    assert!(!info.supported_features.is_empty());

    assert_eq!(h.active_shapes(), 2);
}

#[test]
fn extensionless_step_file_is_sniffed() {
    let h = ServiceHarness::mock();
    // No suffix: detection must fall back to content sniffing.
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"ISO-10303-21;\nDATA;\n#1 = MANIFOLD_SOLID_BREP('x');\nENDSEC;\n")
        .unwrap();

    let response = h
        .service
        .import_model_file(
            &h.ctx,
            ModelFileRequest {
                file_path: file.path().display().to_string(),
                options: ModelImportOptions::default(),
            },
        )
        .unwrap();
    assert!(response.success, "{}", response.message);
    assert_eq!(response.detected_format, Some(ModelFormat::Step));
}

// ── Round trip ──────────────────────────────────────────────────────────

#[test]
fn step_export_reimports_with_the_same_shape_count() {
    let h = ServiceHarness::mock();
    let file = step_fixture(3);

    let imported = h
        .service
        .import_model_file(
            &h.ctx,
            ModelFileRequest {
                file_path: file.path().display().to_string(),
                options: ModelImportOptions::default(),
            },
        )
        .unwrap();
    assert!(imported.success);
    assert_eq!(imported.shape_ids.len(), 3);

    let exported = h.service.export_model_file(
        &h.ctx,
        ModelExportRequest {
            shape_ids: imported.shape_ids.clone(),
            options: ModelExportOptions {
                format: ModelFormat::Step,
                ..ModelExportOptions::default()
            },
        },
    );
    assert!(exported.success, "{}", exported.message);
    assert!(!exported.model_data.is_empty());

    // Write the exported bytes back out and import them again.
    let mut round = tempfile::Builder::new().suffix(".step").tempfile().unwrap();
    round.write_all(&exported.model_data).unwrap();

    let reimported = h
        .service
        .import_model_file(
            &h.ctx,
            ModelFileRequest {
                file_path: round.path().display().to_string(),
                options: ModelImportOptions::default(),
            },
        )
        .unwrap();
    assert!(reimported.success);
    assert_eq!(
        reimported.shape_ids.len(),
        3,
        "round trip must preserve the geometric shape count"
    );
}

#[test]
fn obj_export_reimports_with_the_same_shape_count() {
    let h = ServiceHarness::mock();
    let a = h.create_box_ok([0.0; 3], [1.0, 1.0, 1.0]);
    let b = h.create_box_ok([3.0, 0.0, 0.0], [1.0, 1.0, 1.0]);

    let exported = h.service.export_model_file(
        &h.ctx,
        ModelExportRequest {
            shape_ids: vec![a, b],
            options: ModelExportOptions {
                format: ModelFormat::Obj,
                ..ModelExportOptions::default()
            },
        },
    );
    assert!(exported.success, "{}", exported.message);

    let mut round = tempfile::Builder::new().suffix(".obj").tempfile().unwrap();
    round.write_all(&exported.model_data).unwrap();

    let reimported = h
        .service
        .import_model_file(
            &h.ctx,
            ModelFileRequest {
                file_path: round.path().display().to_string(),
                options: ModelImportOptions::default(),
            },
        )
        .unwrap();
    assert!(reimported.success, "{}", reimported.message);
    assert_eq!(reimported.shape_ids.len(), 2);
}

// ── Deadlines ───────────────────────────────────────────────────────────

#[test]
fn expired_deadline_surfaces_as_transport_error() {
    use geometry_service::{RequestContext, ServiceError};
    use std::time::{Duration, Instant};

    let h = ServiceHarness::mock();
    let file = step_fixture(1);

    let ctx = RequestContext::for_client("deadline")
        .with_deadline(Instant::now() - Duration::from_secs(1));
    let result = h.service.import_model_file(
        &ctx,
        ModelFileRequest {
            file_path: file.path().display().to_string(),
            options: ModelImportOptions::default(),
        },
    );
    assert!(matches!(result, Err(ServiceError::DeadlineExceeded)));
}
