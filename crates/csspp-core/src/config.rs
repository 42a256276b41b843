use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

pub const DEFAULT_CONFIG_FILE: &str = "csspp.config.json";

/// Compiler and build-adapter settings, usually read from
/// `csspp.config.json`. Every field is optional.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct CompilerOptions {
    /// File suffix the build adapter picks up.
    pub extension: String,
    pub asset_file_name: String,
    /// Fallback output directory when the bundler does not name one.
    pub out_dir: PathBuf,
    /// Emit the generated-by comment at the top of the CSS.
    pub banner: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            extension: ".csspp".to_string(),
            asset_file_name: "csspp-assets.json".to_string(),
            out_dir: PathBuf::from("dist"),
            banner: true,
        }
    }
}

impl CompilerOptions {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        serde_json::from_str(&data).map_err(|e| Error::config(path, e.to_string()))
    }

    /// Loads `path` when given, else `csspp.config.json` in `dir` if present,
    /// else the defaults.
    pub fn discover(path: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            tracing::debug!("using config {}", candidate.display());
            Self::load(candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Whether a module id (possibly carrying a `?query`) names a CSS++ file.
    pub fn matches(&self, id: &str) -> bool {
        let path = id.split('?').next().unwrap_or(id);
        path.ends_with(&self.extension)
    }
}
