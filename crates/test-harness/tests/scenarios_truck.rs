//! Scenario tests against the real truck-backed kernel.
//!
//! Slower than the mock suite; exercises real B-rep construction,
//! triangulation, and mesh-format round trips.

use std::io::Write as _;

use geode_types::{
    Color, ConeRequest, CylinderRequest, ModelExportOptions, ModelExportRequest, ModelFileRequest,
    ModelFormat, ModelImportOptions, Point3D, ShapeRequest, SphereRequest, Vector3D,
};
use test_harness::{assert_mesh_well_formed, init_tracing, mesh_volume, ServiceHarness};

// ── Box tessellation ────────────────────────────────────────────────────

#[test]
fn box_mesh_is_nonempty_with_expected_bounds() {
    init_tracing();
    let h = ServiceHarness::truck();
    let id = h.create_box_ok([0.0; 3], [5.0, 5.0, 5.0]);

    let mesh = h
        .service
        .get_mesh_data(&h.ctx, ShapeRequest { shape_id: id })
        .unwrap();

    assert!(!mesh.vertices.is_empty(), "box mesh must have vertices");
    assert_mesh_well_formed(&mesh);

    let bb = mesh.bounding_box.expect("box mesh has a bounding box");
    let tol = 0.2; // within tessellation tolerance
    for (min_c, max_c) in [(bb.min.x, bb.max.x), (bb.min.y, bb.max.y), (bb.min.z, bb.max.z)] {
        assert!(min_c.abs() < tol, "min should be ~0, got {min_c}");
        assert!((max_c - 5.0).abs() < tol, "max should be ~5, got {max_c}");
    }

    // A watertight 5×5×5 box encloses ~125 cubic units.
    let volume = mesh_volume(&mesh);
    assert!(
        (volume - 125.0).abs() < 1.0,
        "box volume should be ~125, got {volume}"
    );
}

// ── Curved primitives ───────────────────────────────────────────────────

#[test]
fn sphere_cylinder_and_cone_tessellate_cleanly() {
    let h = ServiceHarness::truck();

    let sphere = h.service.create_sphere(
        &h.ctx,
        SphereRequest {
            position: Point3D::ORIGIN,
            radius: 2.0,
            color: Color::default(),
        },
    );
    assert!(sphere.success, "{}", sphere.message);

    let cylinder = h.service.create_cylinder(
        &h.ctx,
        CylinderRequest {
            position: Point3D::new(10.0, 0.0, 0.0),
            axis: Vector3D::UNIT_Z,
            radius: 1.0,
            height: 4.0,
            color: Color::default(),
        },
    );
    assert!(cylinder.success, "{}", cylinder.message);

    let cone = h.service.create_cone(
        &h.ctx,
        ConeRequest {
            position: Point3D::new(20.0, 0.0, 0.0),
            axis: Vector3D::UNIT_Z,
            base_radius: 2.0,
            top_radius: 0.0,
            height: 3.0,
            color: Color::default(),
        },
    );
    assert!(cone.success, "{}", cone.message);

    let meshes = h.service.get_all_meshes(&h.ctx).unwrap();
    assert_eq!(meshes.len(), 3);
    for mesh in &meshes {
        assert!(mesh.triangle_count() > 0, "{} is empty", mesh.shape_id);
        assert_mesh_well_formed(mesh);
    }
}

#[test]
fn tilted_cylinder_lands_along_its_axis() {
    let h = ServiceHarness::truck();
    let cylinder = h.service.create_cylinder(
        &h.ctx,
        CylinderRequest {
            position: Point3D::ORIGIN,
            axis: Vector3D::new(1.0, 0.0, 0.0),
            radius: 1.0,
            height: 6.0,
            color: Color::default(),
        },
    );
    assert!(cylinder.success, "{}", cylinder.message);

    let mesh = h
        .service
        .get_mesh_data(
            &h.ctx,
            ShapeRequest {
                shape_id: cylinder.shape_id,
            },
        )
        .unwrap();
    let bb = mesh.bounding_box.unwrap();
    // Swept along +X: long in x, radius-bounded in y/z.
    assert!((bb.max.x - 6.0).abs() < 0.3, "max x ~6, got {}", bb.max.x);
    assert!(bb.max.y < 1.3 && bb.max.z < 1.3);
}

// ── Demo scene ──────────────────────────────────────────────────────────

#[test]
fn demo_scene_builds_on_the_real_kernel() {
    let h = ServiceHarness::truck();
    let response = h.service.create_demo_scene(&h.ctx);
    assert!(response.success, "{}", response.message);
    assert_eq!(response.created, 2);
    assert!(h.active_shapes() >= 2);
}

// ── STEP export ─────────────────────────────────────────────────────────

#[test]
fn step_export_emits_iso_10303_structure() {
    let h = ServiceHarness::truck();
    let id = h.create_box_ok([0.0; 3], [2.0, 2.0, 2.0]);

    let response = h.service.export_model_file(
        &h.ctx,
        ModelExportRequest {
            shape_ids: vec![id],
            options: ModelExportOptions {
                format: ModelFormat::Step,
                ..ModelExportOptions::default()
            },
        },
    );
    assert!(response.success, "{}", response.message);

    let step = String::from_utf8_lossy(&response.model_data);
    assert!(step.contains("ISO-10303-21"), "missing STEP header");
    assert!(step.contains("ENDSEC"), "missing STEP footer");
}

// ── STL round trip ──────────────────────────────────────────────────────

#[test]
fn stl_export_reimports_with_one_shape() {
    let h = ServiceHarness::truck();
    let id = h.create_box_ok([0.0; 3], [2.0, 2.0, 2.0]);

    let exported = h.service.export_model_file(
        &h.ctx,
        ModelExportRequest {
            shape_ids: vec![id],
            options: ModelExportOptions {
                format: ModelFormat::Stl,
                ..ModelExportOptions::default()
            },
        },
    );
    assert!(exported.success, "{}", exported.message);
    assert!(!exported.model_data.is_empty());

    let mut file = tempfile::Builder::new().suffix(".stl").tempfile().unwrap();
    file.write_all(&exported.model_data).unwrap();

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
    assert!(imported.success, "{}", imported.message);
    assert_eq!(imported.shape_ids.len(), 1);
    assert_eq!(imported.detected_format, Some(ModelFormat::Stl));

    // The re-imported mesh tessellates to the same triangles.
    let mesh = h
        .service
        .get_mesh_data(
            &h.ctx,
            ShapeRequest {
                shape_id: imported.shape_ids[0].clone(),
            },
        )
        .unwrap();
    assert!(mesh.triangle_count() > 0);
    assert_mesh_well_formed(&mesh);
}

// ── Unsupported capabilities ────────────────────────────────────────────

#[test]
fn iges_export_fails_in_the_body_on_this_kernel() {
    let h = ServiceHarness::truck();
    let id = h.create_box_ok([0.0; 3], [1.0, 1.0, 1.0]);

    let response = h.service.export_model_file(
        &h.ctx,
        ModelExportRequest {
            shape_ids: vec![id],
            options: ModelExportOptions {
                format: ModelFormat::Iges,
                ..ModelExportOptions::default()
            },
        },
    );
    assert!(!response.success);
    assert!(response.message.contains("IGES"));
}
