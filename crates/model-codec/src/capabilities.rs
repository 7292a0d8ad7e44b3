//! Per-format metadata reported in import/export responses.

use geode_types::ModelFormat;

/// Feature set a format can carry, reported as `supported_features`.
pub fn format_features(format: ModelFormat) -> Vec<String> {
    let features: &[&str] = match format {
        ModelFormat::Step => &["solids", "assemblies", "colors", "names", "units"],
        ModelFormat::Iges => &["surfaces", "wireframe", "names"],
        ModelFormat::Stl => &["triangle_mesh"],
        ModelFormat::Obj => &["triangle_mesh", "normals", "groups"],
        ModelFormat::Brep => &["solids", "exact_geometry"],
    };
    features.iter().map(|s| s.to_string()).collect()
}

/// Version string of the format dialect we read and write.
pub fn format_version(format: ModelFormat) -> &'static str {
    match format {
        ModelFormat::Step => "AP214",
        ModelFormat::Iges => "5.3",
        ModelFormat::Stl => "1.0",
        ModelFormat::Obj => "1.0",
        ModelFormat::Brep => "OCCT",
    }
}
