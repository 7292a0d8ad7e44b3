//! Scenario-test harness: a service wrapper with shortcut constructors plus
//! mesh math oracles shared by the integration suites.

use geode_types::{BoxRequest, Color, MeshData, Point3D, ShapeResponse};
use geometry_service::{GeometryService, RequestContext};
use kernel_bridge::{Kernel, MockKernel, TruckKernel};

/// A geometry service plus a default client context.
pub struct ServiceHarness<K: Kernel> {
    pub service: GeometryService<K>,
    pub ctx: RequestContext,
}

impl ServiceHarness<MockKernel> {
    /// Harness over the deterministic mock kernel.
    pub fn mock() -> Self {
        Self::with_kernel(MockKernel::new())
    }
}

impl ServiceHarness<TruckKernel> {
    /// Harness over the real truck-backed kernel.
    pub fn truck() -> Self {
        Self::with_kernel(TruckKernel::new())
    }
}

impl<K: Kernel> ServiceHarness<K> {
    pub fn with_kernel(kernel: K) -> Self {
        Self {
            service: GeometryService::new(kernel),
            ctx: RequestContext::for_client("harness"),
        }
    }

    /// A context for a different client, for isolation scenarios.
    pub fn client(&self, client_id: &str) -> RequestContext {
        RequestContext::for_client(client_id)
    }

    /// Create a box under the default client.
    pub fn create_box(&self, position: [f64; 3], size: [f64; 3]) -> ShapeResponse {
        self.service.create_box(
            &self.ctx,
            BoxRequest {
                position: Point3D::new(position[0], position[1], position[2]),
                width: size[0],
                height: size[1],
                depth: size[2],
                color: Color::default(),
            },
        )
    }

    /// Create a box and return its id, asserting success.
    pub fn create_box_ok(&self, position: [f64; 3], size: [f64; 3]) -> String {
        let response = self.create_box(position, size);
        assert!(response.success, "box creation failed: {}", response.message);
        response.shape_id
    }

    /// Live shape count in the default client's session.
    pub fn active_shapes(&self) -> usize {
        self.service.get_system_info(&self.ctx).active_shapes
    }

    /// Solids currently alive in the kernel, across all sessions.
    pub fn live_solids(&self) -> usize {
        self.service.kernel().lock().live_solids()
    }
}

/// Install a test subscriber honoring `RUST_LOG`. Safe to call from every
/// test; only the first call wins.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ── Mesh Math Oracles ───────────────────────────────────────────────────────

/// Assert the structural mesh invariants: triple-sized index list, every
/// index addressing an emitted vertex, normals parallel to vertices.
pub fn assert_mesh_well_formed(mesh: &MeshData) {
    assert_eq!(
        mesh.indices.len() % 3,
        0,
        "index count must be a multiple of 3"
    );
    let vcount = mesh.vertex_count() as u32;
    assert!(
        mesh.indices.iter().all(|&i| i < vcount),
        "every index must be < vertex count {vcount}"
    );
    if !mesh.normals.is_empty() {
        assert_eq!(
            mesh.normals.len(),
            mesh.vertices.len(),
            "normals must be parallel to vertices"
        );
    }
}

/// Signed volume of a triangle mesh via the divergence theorem.
///
/// For a closed (watertight) mesh this returns the enclosed volume; for
/// open meshes the result may be meaningless.
pub fn mesh_volume(mesh: &MeshData) -> f64 {
    let mut volume = 0.0f64;
    for tri in mesh.indices.chunks(3) {
        if tri.len() < 3 {
            continue;
        }
        let v0 = mesh.vertices[tri[0] as usize];
        let v1 = mesh.vertices[tri[1] as usize];
        let v2 = mesh.vertices[tri[2] as usize];

        // Signed volume of the tetrahedron formed by the triangle and origin
        volume += v0.x * (v1.y * v2.z - v2.y * v1.z)
            + v1.x * (v2.y * v0.z - v0.y * v2.z)
            + v2.x * (v0.y * v1.z - v1.y * v0.z);
    }
    (volume / 6.0).abs()
}

/// Total surface area of a triangle mesh.
pub fn mesh_surface_area(mesh: &MeshData) -> f64 {
    let mut area = 0.0f64;
    for tri in mesh.indices.chunks(3) {
        if tri.len() < 3 {
            continue;
        }
        let v0 = mesh.vertices[tri[0] as usize];
        let v1 = mesh.vertices[tri[1] as usize];
        let v2 = mesh.vertices[tri[2] as usize];

        let a = [v1.x - v0.x, v1.y - v0.y, v1.z - v0.z];
        let b = [v2.x - v0.x, v2.y - v0.y, v2.z - v0.z];
        let cx = a[1] * b[2] - a[2] * b[1];
        let cy = a[2] * b[0] - a[0] * b[2];
        let cz = a[0] * b[1] - a[1] * b[0];
        area += (cx * cx + cy * cy + cz * cz).sqrt() / 2.0;
    }
    area
}
