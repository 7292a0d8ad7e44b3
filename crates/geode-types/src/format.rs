use std::fmt;

use serde::{Deserialize, Serialize};

/// Model-file interchange formats handled by the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ModelFormat {
    Step,
    Iges,
    Stl,
    Obj,
    Brep,
}

impl ModelFormat {
    /// All formats the codec knows about.
    pub const ALL: [ModelFormat; 5] = [
        ModelFormat::Step,
        ModelFormat::Iges,
        ModelFormat::Stl,
        ModelFormat::Obj,
        ModelFormat::Brep,
    ];

    /// Canonical display name.
    pub fn name(&self) -> &'static str {
        match self {
            ModelFormat::Step => "STEP",
            ModelFormat::Iges => "IGES",
            ModelFormat::Stl => "STL",
            ModelFormat::Obj => "OBJ",
            ModelFormat::Brep => "BREP",
        }
    }

    /// File extensions recognized for this format, lowercase, without dot.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            ModelFormat::Step => &["stp", "step"],
            ModelFormat::Iges => &["igs", "iges"],
            ModelFormat::Stl => &["stl"],
            ModelFormat::Obj => &["obj"],
            ModelFormat::Brep => &["brep"],
        }
    }

    /// Preferred extension when synthesizing a filename.
    pub fn default_extension(&self) -> &'static str {
        self.extensions()[0]
    }

    /// Look a format up by file extension, case-insensitive.
    pub fn from_extension(ext: &str) -> Option<ModelFormat> {
        let ext = ext.to_ascii_lowercase();
        ModelFormat::ALL
            .into_iter()
            .find(|f| f.extensions().contains(&ext.as_str()))
    }
}

impl fmt::Display for ModelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
