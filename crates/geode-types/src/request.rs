use serde::{Deserialize, Serialize};

use crate::format::ModelFormat;
use crate::geometry::{Color, Point3D, Transform, Vector3D};

/// Request to create an axis-aligned box.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxRequest {
    /// Minimum corner of the box.
    pub position: Point3D,
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    #[serde(default)]
    pub color: Color,
}

/// Request to create a (possibly truncated) cone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConeRequest {
    /// Center of the base circle.
    pub position: Point3D,
    /// Direction of the cone axis, base to apex.
    pub axis: Vector3D,
    pub base_radius: f64,
    /// Zero for a full cone, positive for a frustum.
    pub top_radius: f64,
    pub height: f64,
    #[serde(default)]
    pub color: Color,
}

/// Request to create a sphere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SphereRequest {
    /// Center of the sphere.
    pub position: Point3D,
    pub radius: f64,
    #[serde(default)]
    pub color: Color,
}

/// Request to create a cylinder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CylinderRequest {
    /// Center of the base circle.
    pub position: Point3D,
    /// Direction of the cylinder axis.
    pub axis: Vector3D,
    pub radius: f64,
    pub height: f64,
    #[serde(default)]
    pub color: Color,
}

/// Request addressing a single shape by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeRequest {
    pub shape_id: String,
}

/// Request to transform a shape in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformRequest {
    pub shape_id: String,
    pub transform: Transform,
}

/// Request to recolor a shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorRequest {
    pub shape_id: String,
    pub color: Color,
}

/// Request with no parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmptyRequest {}

/// Options controlling model-file import.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelImportOptions {
    pub auto_detect_format: bool,
    pub force_format: Option<ModelFormat>,
    pub import_colors: bool,
    pub import_names: bool,
    pub import_materials: bool,
    pub precision: f64,
    pub merge_shapes: bool,
    pub validate_shapes: bool,
    pub heal_shapes: bool,
    pub linear_tolerance: f64,
    pub angular_tolerance: f64,
}

impl Default for ModelImportOptions {
    fn default() -> Self {
        Self {
            auto_detect_format: true,
            force_format: None,
            import_colors: true,
            import_names: true,
            import_materials: false,
            precision: 0.001,
            merge_shapes: false,
            validate_shapes: true,
            heal_shapes: false,
            linear_tolerance: 0.1,
            angular_tolerance: 0.5,
        }
    }
}

/// Request to import a model file from the server filesystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFileRequest {
    pub file_path: String,
    #[serde(default)]
    pub options: ModelImportOptions,
}

/// Options controlling model-file export.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelExportOptions {
    pub format: ModelFormat,
    pub export_colors: bool,
    pub export_names: bool,
    pub export_materials: bool,
    pub schema_version: String,
    pub units: String,
    pub export_as_compound: bool,
    pub validate_before_export: bool,
    pub precision: f64,
    pub binary_mode: bool,
}

impl Default for ModelExportOptions {
    fn default() -> Self {
        Self {
            format: ModelFormat::Step,
            export_colors: true,
            export_names: true,
            export_materials: false,
            schema_version: "AP214".to_string(),
            units: "mm".to_string(),
            export_as_compound: false,
            validate_before_export: true,
            precision: 0.001,
            binary_mode: true,
        }
    }
}

/// Request to export shapes to an in-memory model file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelExportRequest {
    pub shape_ids: Vec<String>,
    #[serde(default)]
    pub options: ModelExportOptions,
}
