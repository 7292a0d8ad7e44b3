//! Import driver: filesystem read, format detection, kernel parse.

use std::path::Path;
use std::time::Instant;

use geode_types::{ModelFormat, ModelImportOptions};
use kernel_bridge::{ImportSettings, Kernel, KernelError, SolidHandle};
use tracing::{info, warn};

use crate::detect::detect_format;
use crate::errors::ImportError;

/// What a successful import produced, before the service wraps it into a
/// wire response.
#[derive(Debug)]
pub struct ImportOutcome {
    pub handles: Vec<SolidHandle>,
    pub format: ModelFormat,
    pub filename: String,
    pub file_size: u64,
}

/// Read a model file from disk and hand it to the kernel.
///
/// The deadline is checked before the filesystem read and again before the
/// (potentially long) kernel parse, so a caller that has already given up
/// never pays for the work.
pub fn import_model_file<K: Kernel>(
    kernel: &mut K,
    path: &Path,
    options: &ModelImportOptions,
    deadline: Option<Instant>,
) -> Result<ImportOutcome, ImportError> {
    check_deadline(deadline)?;

    if !path.exists() {
        return Err(ImportError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let bytes = std::fs::read(path).map_err(|e| ImportError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let format = detect_format(path, &bytes, options)?;

    check_deadline(deadline)?;

    let settings = ImportSettings {
        precision: options.precision,
        merge_shapes: options.merge_shapes,
        heal_shapes: options.heal_shapes,
    };

    let handles = kernel
        .import_model(&bytes, format, &settings)
        .map_err(|e| match e {
            KernelError::Unsupported { .. } => {
                warn!(format = %format, "kernel cannot import this format");
                ImportError::UnsupportedFormat {
                    format: format.name().to_string(),
                }
            }
            other => ImportError::KernelRejected {
                reason: other.to_string(),
            },
        })?;

    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("model")
        .to_string();

    info!(
        file = %filename,
        format = %format,
        shapes = handles.len(),
        bytes = bytes.len(),
        "model imported"
    );

    Ok(ImportOutcome {
        handles,
        format,
        filename,
        file_size: bytes.len() as u64,
    })
}

fn check_deadline(deadline: Option<Instant>) -> Result<(), ImportError> {
    match deadline {
        Some(d) if Instant::now() >= d => Err(ImportError::DeadlineExceeded),
        _ => Ok(()),
    }
}
