//! Model-format detection: extension table first, content sniffing second.
//!
//! Detection never guesses. A file whose format cannot be established from
//! its extension or its leading bytes fails import with a descriptive
//! message.

use std::path::Path;

use geode_types::{ModelFormat, ModelImportOptions};
use tracing::debug;

use crate::errors::ImportError;

/// Resolve the format of a model file.
///
/// Order of precedence:
/// 1. `force_format` verbatim when auto-detection is disabled.
/// 2. Case-insensitive extension lookup.
/// 3. Content sniffing on the leading bytes.
/// 4. `force_format` as a last resort when auto-detection found nothing.
pub fn detect_format(
    path: &Path,
    bytes: &[u8],
    options: &ModelImportOptions,
) -> Result<ModelFormat, ImportError> {
    if !options.auto_detect_format {
        if let Some(format) = options.force_format {
            return Ok(format);
        }
        // Auto-detection disabled with nothing forced: fall through to the
        // normal pipeline rather than failing outright.
    }

    if let Some(format) = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(ModelFormat::from_extension)
    {
        debug!(path = %path.display(), format = %format, "format detected by extension");
        return Ok(format);
    }

    if let Some(format) = sniff_content(bytes) {
        debug!(path = %path.display(), format = %format, "format detected by content");
        return Ok(format);
    }

    if let Some(format) = options.force_format {
        return Ok(format);
    }

    Err(ImportError::UndetectedFormat {
        path: path.display().to_string(),
    })
}

/// Inspect the leading bytes of a model file for a recognizable signature.
pub fn sniff_content(bytes: &[u8]) -> Option<ModelFormat> {
    if bytes.is_empty() {
        return None;
    }

    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(4096)]);
    let trimmed = head.trim_start();

    if trimmed.starts_with("ISO-10303-21") {
        return Some(ModelFormat::Step);
    }
    if trimmed.starts_with("DBRep_DrawableShape") || trimmed.starts_with("CASCADE Topology") {
        return Some(ModelFormat::Brep);
    }
    if trimmed.starts_with("solid") {
        return Some(ModelFormat::Stl);
    }
    if looks_like_iges(&head) {
        return Some(ModelFormat::Iges);
    }
    if looks_like_obj(&head) {
        return Some(ModelFormat::Obj);
    }
    if looks_like_binary_stl(bytes) {
        return Some(ModelFormat::Stl);
    }

    None
}

/// IGES is fixed-width: 80-column records with a section letter in column 73.
fn looks_like_iges(head: &str) -> bool {
    let Some(first) = head.lines().next() else {
        return false;
    };
    if first.len() < 73 {
        return false;
    }
    matches!(first.as_bytes()[72], b'S' | b'G' | b'D' | b'P' | b'T')
}

/// OBJ is line-oriented; the first meaningful line is a known directive.
fn looks_like_obj(head: &str) -> bool {
    for line in head.lines() {
        let line = line.trim_start();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        return line.starts_with("v ")
            || line.starts_with("vn ")
            || line.starts_with("vt ")
            || line.starts_with("o ")
            || line.starts_with("g ")
            || line.starts_with("mtllib ");
    }
    false
}

/// Binary STL: 80-byte header, u32 LE triangle count, 50 bytes per triangle.
fn looks_like_binary_stl(bytes: &[u8]) -> bool {
    if bytes.len() < 84 {
        return false;
    }
    let count = u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]) as usize;
    bytes.len() == 84 + count * 50
}
