use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::format::ModelFormat;
use crate::geometry::Color;

/// Serde helper: raw bytes ↔ base64 string, for binary payloads crossing
/// the JSON dispatch layer.
mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(s).map_err(serde::de::Error::custom)
    }
}

/// Display state of a stored shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeProperties {
    pub shape_id: String,
    pub visible: bool,
    pub selected: bool,
    pub highlighted: bool,
    pub color: Color,
}

/// Result of a shape-creating or shape-mutating call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeResponse {
    pub shape_id: String,
    pub success: bool,
    pub message: String,
    pub properties: Option<ShapeProperties>,
}

impl ShapeResponse {
    pub fn ok(properties: ShapeProperties) -> Self {
        Self {
            shape_id: properties.shape_id.clone(),
            success: true,
            message: String::new(),
            properties: Some(properties),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            shape_id: String::new(),
            success: false,
            message: message.into(),
            properties: None,
        }
    }
}

/// Generic success/failure result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub success: bool,
    pub message: String,
}

impl StatusResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Service and kernel identification plus the caller's live shape count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfoResponse {
    pub version: String,
    pub active_shapes: usize,
    pub kernel_version: String,
}

/// Ids of every live shape in the caller's session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeListResponse {
    pub shape_ids: Vec<String>,
    pub total_count: usize,
}

/// Result of demo-scene construction. Partial failure is reported through
/// `created` rather than failing the whole call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoSceneResponse {
    pub success: bool,
    pub message: String,
    pub created: u32,
    pub shape_ids: Vec<String>,
}

/// Metadata about an imported or exported model file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFileInfo {
    pub filename: String,
    pub file_size: u64,
    pub shape_count: u32,
    pub format: ModelFormat,
    pub creation_time: DateTime<Utc>,
    pub format_version: String,
    pub supported_features: Vec<String>,
}

/// Result of a model-file import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelImportResponse {
    pub success: bool,
    pub message: String,
    pub shape_ids: Vec<String>,
    pub detected_format: Option<ModelFormat>,
    pub file_info: Option<ModelFileInfo>,
}

impl ModelImportResponse {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            shape_ids: Vec::new(),
            detected_format: None,
            file_info: None,
        }
    }
}

/// Result of a model-file export: the file content itself, in memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFileResponse {
    pub success: bool,
    pub message: String,
    #[serde(with = "base64_bytes")]
    pub model_data: Vec<u8>,
    pub filename: String,
    pub file_info: Option<ModelFileInfo>,
}

impl ModelFileResponse {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            model_data: Vec::new(),
            filename: String::new(),
            file_info: None,
        }
    }
}
