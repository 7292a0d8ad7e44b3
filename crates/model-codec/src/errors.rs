/// Errors during model-file import.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ImportError {
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    #[error("failed to read {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("could not determine model format of {path}")]
    UndetectedFormat { path: String },

    #[error("format {format} is not supported by the active kernel")]
    UnsupportedFormat { format: String },

    #[error("kernel rejected the file: {reason}")]
    KernelRejected { reason: String },

    #[error("deadline exceeded during import")]
    DeadlineExceeded,
}

/// Errors during model-file export.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExportError {
    #[error("no shapes to export")]
    NoShapes,

    #[error("format {format} is not supported by the active kernel")]
    UnsupportedFormat { format: String },

    #[error("kernel rejected the export: {reason}")]
    KernelRejected { reason: String },
}
