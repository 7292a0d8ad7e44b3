use serde::{Deserialize, Serialize};

/// A point in 3D model space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3D {
    pub const ORIGIN: Point3D = Point3D {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// A direction or displacement in 3D model space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3D {
    pub const UNIT_Z: Vector3D = Vector3D {
        x: 0.0,
        y: 0.0,
        z: 1.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn is_zero(&self) -> bool {
        self.length() < 1e-12
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// An RGBA color with components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Clamp all components into [0, 1].
    pub fn clamped(self) -> Self {
        Self {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
            a: self.a.clamp(0.0, 1.0),
        }
    }
}

impl Default for Color {
    /// Mid-gray, fully opaque.
    fn default() -> Self {
        Self {
            r: 0.5,
            g: 0.5,
            b: 0.5,
            a: 1.0,
        }
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3D,
    pub max: Point3D,
}

impl BoundingBox {
    /// A degenerate box around a single point.
    pub fn at(p: Point3D) -> Self {
        Self { min: p, max: p }
    }

    /// Grow the box to contain the given point.
    pub fn expand(&mut self, p: Point3D) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }
}

/// An affine transform applied to a shape.
///
/// Application order: uniform scale about the global origin, then rotation
/// of `rotation_angle` radians around `rotation_axis` through
/// `rotation_origin`, then translation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vector3D,
    pub rotation_origin: Point3D,
    pub rotation_axis: Vector3D,
    /// Radians.
    pub rotation_angle: f64,
    /// Uniform scale factor, must be positive.
    pub scale: f64,
}

impl Transform {
    /// Pure translation.
    pub fn translation(v: Vector3D) -> Self {
        Self {
            translation: v,
            ..Self::default()
        }
    }

    /// Check the transform is applicable. Returns a human-readable reason
    /// when it is not.
    pub fn validate(&self) -> Result<(), String> {
        if !self.translation.is_finite()
            || !self.rotation_origin.is_finite()
            || !self.rotation_axis.is_finite()
            || !self.rotation_angle.is_finite()
            || !self.scale.is_finite()
        {
            return Err("transform contains non-finite components".to_string());
        }
        if self.scale <= 0.0 {
            return Err(format!("scale must be positive, got {}", self.scale));
        }
        if self.rotation_angle != 0.0 && self.rotation_axis.is_zero() {
            return Err("rotation axis has zero length".to_string());
        }
        Ok(())
    }

    pub fn is_identity(&self) -> bool {
        self.translation.is_zero() && self.rotation_angle == 0.0 && (self.scale - 1.0).abs() < 1e-12
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vector3D::default(),
            rotation_origin: Point3D::ORIGIN,
            rotation_axis: Vector3D::UNIT_Z,
            rotation_angle: 0.0,
            scale: 1.0,
        }
    }
}
