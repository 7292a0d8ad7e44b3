pub mod capabilities;
pub mod detect;
pub mod errors;
pub mod export;
pub mod import;

pub use capabilities::{format_features, format_version};
pub use detect::{detect_format, sniff_content};
pub use errors::{ExportError, ImportError};
pub use export::{export_model, ExportOutcome};
pub use import::{import_model_file, ImportOutcome};
