//! Export driver: validation, kernel serialization, file metadata.

use geode_types::ModelExportOptions;
use kernel_bridge::{ExportSettings, Kernel, KernelError, SolidHandle, TessellationSpec};
use tracing::info;

use crate::errors::ExportError;

/// What a successful export produced.
#[derive(Debug)]
pub struct ExportOutcome {
    pub bytes: Vec<u8>,
    pub filename: String,
}

/// Serialize the given solids to an in-memory model file.
pub fn export_model<K: Kernel>(
    kernel: &mut K,
    handles: &[SolidHandle],
    options: &ModelExportOptions,
) -> Result<ExportOutcome, ExportError> {
    if handles.is_empty() {
        return Err(ExportError::NoShapes);
    }

    let settings = ExportSettings {
        binary_mode: options.binary_mode,
        export_as_compound: options.export_as_compound,
        tessellation: TessellationSpec {
            linear_tolerance: options.precision.max(1e-6),
            ..TessellationSpec::default()
        },
    };

    let bytes = kernel
        .export_model(handles, options.format, &settings)
        .map_err(|e| match e {
            KernelError::Unsupported { .. } => ExportError::UnsupportedFormat {
                format: options.format.name().to_string(),
            },
            other => ExportError::KernelRejected {
                reason: other.to_string(),
            },
        })?;

    let filename = format!("model.{}", options.format.default_extension());

    info!(
        file = %filename,
        format = %options.format,
        shapes = handles.len(),
        bytes = bytes.len(),
        "model exported"
    );

    Ok(ExportOutcome { bytes, filename })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geode_types::{ModelFormat, Point3D};
    use kernel_bridge::MockKernel;

    #[test]
    fn empty_handle_list_is_rejected() {
        let mut kernel = MockKernel::new();
        let result = export_model(&mut kernel, &[], &ModelExportOptions::default());
        assert!(matches!(result, Err(ExportError::NoShapes)));
    }

    #[test]
    fn stl_export_names_the_file() {
        let mut kernel = MockKernel::new();
        let handle = kernel.make_box(Point3D::ORIGIN, 1.0, 1.0, 1.0).unwrap();

        let options = ModelExportOptions {
            format: ModelFormat::Stl,
            ..ModelExportOptions::default()
        };
        let outcome = export_model(&mut kernel, &[handle], &options).unwrap();
        assert_eq!(outcome.filename, "model.stl");
        assert!(!outcome.bytes.is_empty());
    }
}
