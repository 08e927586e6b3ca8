use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ComponentResult;

/// Settings for the [`ComponentLoader`](crate::loader::ComponentLoader), usually read from a
/// `components.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Prefix for relative component paths.
    pub asset_root: PathBuf,
    pub strict_shaders: bool,
    /// Deepest allowed child nesting, the root component is at depth 0.
    pub max_child_depth: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::new(),
            strict_shaders: false,
            max_child_depth: 16,
        }
    }
}

impl LoaderConfig {
    pub fn parse(path: &Path) -> ComponentResult<Self> {
        let data = std::fs::read_to_string(path)?;
        LoaderConfig::from_toml(&data)
    }

    pub fn from_toml(data: &str) -> ComponentResult<Self> {
        Ok(toml::from_str(data)?)
    }
}
