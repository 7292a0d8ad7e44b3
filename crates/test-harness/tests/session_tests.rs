//! Session isolation, expiry, and concurrency scenarios.

use std::time::Duration;

use geode_types::ShapeRequest;
use geometry_service::{GeometryService, RequestContext, ServiceConfig};
use kernel_bridge::{Kernel as _, MockKernel};
use test_harness::{init_tracing, ServiceHarness};

// ── Isolation ───────────────────────────────────────────────────────────

#[test]
fn shapes_are_invisible_across_sessions() {
    init_tracing();
    let h = ServiceHarness::mock();

    let id = h.create_box_ok([0.0; 3], [1.0, 1.0, 1.0]);

    // Client B cannot see client A's shape.
    let ctx_b = h.client("client-b");
    let mesh = h
        .service
        .get_mesh_data(&ctx_b, ShapeRequest { shape_id: id.clone() });
    assert!(mesh.is_err(), "cross-session lookup must fail");

    let deleted = h
        .service
        .delete_shape(&ctx_b, ShapeRequest { shape_id: id.clone() });
    assert!(!deleted.success);

    // Client A still has it.
    assert!(h
        .service
        .get_mesh_data(&h.ctx, ShapeRequest { shape_id: id })
        .is_ok());
    assert_eq!(h.service.get_system_info(&ctx_b).active_shapes, 0);
    assert_eq!(h.active_shapes(), 1);
}

#[test]
fn metadata_less_callers_share_the_default_session() {
    let h = ServiceHarness::mock();
    let anonymous_a = RequestContext::new();
    let anonymous_b = RequestContext::new();

    let response = h.service.create_box(
        &anonymous_a,
        geode_types::BoxRequest {
            position: geode_types::Point3D::ORIGIN,
            width: 1.0,
            height: 1.0,
            depth: 1.0,
            color: Default::default(),
        },
    );
    assert!(response.success);

    // A second anonymous caller lands in the same shared session.
    assert_eq!(h.service.get_system_info(&anonymous_b).active_shapes, 1);
}

// ── Expiry ──────────────────────────────────────────────────────────────

#[test]
fn idle_sessions_are_reaped_and_release_solids() {
    let config = ServiceConfig {
        session_timeout_secs: 0,
        ..ServiceConfig::default()
    };
    let service = GeometryService::with_config(MockKernel::new(), config);
    let ctx = RequestContext::for_client("short-lived");

    let response = service.create_box(
        &ctx,
        geode_types::BoxRequest {
            position: geode_types::Point3D::ORIGIN,
            width: 1.0,
            height: 1.0,
            depth: 1.0,
            color: Default::default(),
        },
    );
    assert!(response.success);
    assert_eq!(service.kernel().lock().live_solids(), 1);

    // Zero timeout: the next request's sweep reaps the idle session and a
    // fresh one is created for the caller.
    std::thread::sleep(Duration::from_millis(5));
    let info = service.get_system_info(&ctx);
    assert_eq!(info.active_shapes, 0, "expired session starts empty");
    assert_eq!(
        service.kernel().lock().live_solids(),
        0,
        "reaping releases every kernel solid"
    );
}

#[test]
fn active_sessions_survive_the_sweep() {
    let h = ServiceHarness::mock();
    h.create_box_ok([0.0; 3], [1.0, 1.0, 1.0]);

    // Default 30-minute timeout: back-to-back requests never reap.
    for _ in 0..3 {
        assert_eq!(h.active_shapes(), 1);
    }
    assert_eq!(h.service.session_count(), 1);
}

// ── Concurrency ─────────────────────────────────────────────────────────

#[test]
fn fifty_parallel_creates_yield_fifty_distinct_ids() {
    let h = ServiceHarness::mock();
    let service = &h.service;

    let mut ids: Vec<String> = Vec::new();
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..50)
            .map(|i| {
                scope.spawn(move || {
                    let ctx = RequestContext::for_client("swarm");
                    let response = service.create_box(
                        &ctx,
                        geode_types::BoxRequest {
                            position: geode_types::Point3D::new(i as f64, 0.0, 0.0),
                            width: 1.0,
                            height: 1.0,
                            depth: 1.0,
                            color: Default::default(),
                        },
                    );
                    assert!(response.success, "{}", response.message);
                    response.shape_id
                })
            })
            .collect();
        for handle in handles {
            ids.push(handle.join().expect("creator thread panicked"));
        }
    });

    let unique: std::collections::HashSet<&String> = ids.iter().collect();
    assert_eq!(unique.len(), 50, "all shape ids must be distinct");

    let ctx = RequestContext::for_client("swarm");
    assert_eq!(service.get_system_info(&ctx).active_shapes, 50);
}

#[test]
fn parallel_clients_do_not_interfere() {
    let h = ServiceHarness::mock();
    let service = &h.service;

    std::thread::scope(|scope| {
        for c in 0..8 {
            scope.spawn(move || {
                let ctx = RequestContext::for_client(format!("client-{c}"));
                for i in 0..5 {
                    let response = service.create_box(
                        &ctx,
                        geode_types::BoxRequest {
                            position: geode_types::Point3D::new(i as f64, 0.0, 0.0),
                            width: 1.0,
                            height: 1.0,
                            depth: 1.0,
                            color: Default::default(),
                        },
                    );
                    assert!(response.success);
                }
            });
        }
    });

    for c in 0..8 {
        let ctx = RequestContext::for_client(format!("client-{c}"));
        assert_eq!(service.get_system_info(&ctx).active_shapes, 5);
    }
    assert_eq!(service.kernel().lock().live_solids(), 40);
}
