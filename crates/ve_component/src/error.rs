//! Errors returned by component loading and building.

use std::path::PathBuf;

use thiserror::Error;

pub type ComponentResult<T> = ::std::result::Result<T, ComponentError>;

#[derive(Debug, Error)]
pub enum ComponentError {
    /// A mesh entry was accessed or built before its payload was decoded.
    #[error("no mesh data present for component mesh `{0}`")]
    MissingMeshData(String),
    /// Reported through the log during a build; the node is left without a texture.
    #[error("failed to resolve texture `{0}`")]
    TextureResolutionFailure(String),
    /// Only returned when the loader runs with strict shaders.
    #[error("unknown shader `{0}`")]
    UnknownShaderName(String),
    #[error("texture index {index} out of range for mesh `{mesh}` with {len} textures")]
    OutOfRangeTextureIndex {
        mesh: String,
        index: usize,
        len: usize,
    },
    #[error("render backend error: {0}")]
    Backend(String),
    #[error("invalid component description: {0}")]
    Description(#[from] serde_json::Error),
    #[error("invalid loader config: {0}")]
    Config(#[from] toml::de::Error),
    #[error("mesh format error: {0}")]
    MeshFormat(#[from] ve_format::FormatError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("component `{}` references itself through its children", .0.display())]
    ChildCycle(PathBuf),
    #[error("child references nested deeper than {0} levels")]
    ChildDepthExceeded(usize),
}
