//! Component assets for the engine.
//!
//! A component is a named, positioned bundle of meshes, a material, references to other
//! components and collision boxes. Components are loaded from JSON descriptions by the
//! [`loader::ComponentLoader`] and turned into [`renderable::Renderable`] nodes on demand.
//! All GPU work is delegated to the [`renderable::RenderBackend`] and
//! [`renderable::TextureResolver`] passed in by the caller.

pub mod component;
pub mod config;
pub mod description;
pub mod error;
pub mod loader;
pub mod renderable;

pub mod prelude {
    pub use crate::component::{
        CollisionRef, Component, ComponentChildRef, ComponentMaterial, ComponentMesh, Shared,
    };
    pub use crate::config::LoaderConfig;
    pub use crate::description::ComponentDescription;
    pub use crate::error::{ComponentError, ComponentResult};
    pub use crate::loader::{BinMeshDecoder, ComponentLoader, MeshDecoder};
    pub use crate::renderable::{
        GeometryId, RenderBackend, Renderable, ShaderId, ShaderTable, TextureId, TextureResolver,
    };
    pub use gfx_maths::*;
}
