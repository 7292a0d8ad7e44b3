//! Primitive solid builders on top of truck's sweep API.
//!
//! truck has no built-in box/cylinder/sphere/cone — everything is successive
//! sweeps. All builders construct at the origin with +Z as the main axis;
//! the kernel positions and orients the result afterwards.

use std::f64::consts::PI;

use truck_modeling::builder;
use truck_modeling::geometry::{Curve, Line};
use truck_modeling::topology::{Edge, Solid, Wire};
use truck_modeling::{EuclideanSpace, Point3, Rad, Vector3};

use crate::types::KernelError;

/// Box via successive translational sweeps. Origin at (0,0,0), extends to
/// (w,h,d).
pub fn make_box(w: f64, h: f64, d: f64) -> Solid {
    let v = builder::vertex(Point3::new(0.0, 0.0, 0.0));
    let edge = builder::tsweep(&v, Vector3::new(w, 0.0, 0.0));
    let face = builder::tsweep(&edge, Vector3::new(0.0, h, 0.0));
    builder::tsweep(&face, Vector3::new(0.0, 0.0, d))
}

/// Cylinder: circle wire → face → translational sweep. Base centered at the
/// origin in the XY plane, extending along +Z.
pub fn make_cylinder(radius: f64, height: f64) -> Result<Solid, KernelError> {
    let v = builder::vertex(Point3::new(radius, 0.0, 0.0));
    let wire = builder::rsweep(&v, Point3::origin(), Vector3::unit_z(), Rad(2.0 * PI));
    let face = builder::try_attach_plane(&[wire]).map_err(|e| KernelError::ConstructionFailed {
        reason: format!("circular face: {e}"),
    })?;
    Ok(builder::tsweep(&face, Vector3::new(0.0, 0.0, height)))
}

/// Sphere: semicircle face → rotational sweep 2π. Centered at the origin.
pub fn make_sphere(radius: f64) -> Result<Solid, KernelError> {
    // Semicircle arc in the XZ plane: rotate (r,0,0) around Y by π, giving a
    // wire from (r,0,0) through (0,0,r) to (-r,0,0).
    let v_right = builder::vertex(Point3::new(radius, 0.0, 0.0));
    let arc_wire = builder::rsweep(&v_right, Point3::origin(), Vector3::unit_y(), Rad(PI));

    // Close with a line from (-r,0,0) back to (r,0,0).
    let v_left = builder::vertex(Point3::new(-radius, 0.0, 0.0));
    let line_edge: Edge = builder::tsweep(&v_left, Vector3::new(2.0 * radius, 0.0, 0.0));

    let mut edges: Vec<Edge> = Vec::new();
    for edge in arc_wire.edge_iter() {
        edges.push(edge.clone());
    }
    edges.push(line_edge);
    let closed_wire = Wire::from_iter(edges);

    let face =
        builder::try_attach_plane(&[closed_wire]).map_err(|e| KernelError::ConstructionFailed {
            reason: format!("semicircle face: {e}"),
        })?;

    Ok(builder::rsweep(
        &face,
        Point3::origin(),
        Vector3::unit_z(),
        Rad(2.0 * PI),
    ))
}

/// Cone or frustum: planar profile in the XZ half-plane → rotational sweep
/// 2π around Z. Base circle of `base_radius` in the XY plane, top circle of
/// `top_radius` at z = height (apex when zero).
pub fn make_cone(base_radius: f64, top_radius: f64, height: f64) -> Result<Solid, KernelError> {
    let mut profile = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(base_radius, 0.0, 0.0),
    ];
    if top_radius > 0.0 {
        profile.push(Point3::new(top_radius, 0.0, height));
    }
    profile.push(Point3::new(0.0, 0.0, height));

    let face = polygon_face(&profile)?;
    Ok(builder::rsweep(
        &face,
        Point3::origin(),
        Vector3::unit_z(),
        Rad(2.0 * PI),
    ))
}

/// Planar face from a closed polygon. Consecutive edges share vertices so the
/// wire is watertight.
fn polygon_face(points: &[Point3]) -> Result<truck_modeling::topology::Face, KernelError> {
    let n = points.len();
    let vertices: Vec<_> = points.iter().map(|&p| builder::vertex(p)).collect();
    let mut wire_edges: Vec<Edge> = Vec::new();
    for i in 0..n {
        let j = (i + 1) % n;
        let edge = Edge::new(
            &vertices[i],
            &vertices[j],
            Curve::Line(Line(points[i], points[j])),
        );
        wire_edges.push(edge);
    }
    let wire = Wire::from_iter(wire_edges);
    builder::try_attach_plane(&[wire]).map_err(|e| KernelError::ConstructionFailed {
        reason: format!("profile face: {e}"),
    })
}
