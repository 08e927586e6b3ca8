//! Renderable scene-graph nodes and the collaborators that own the GPU side of them.

use std::{collections::HashMap, rc::Rc};

use gfx_maths::*;
use ve_format::mesh::MeshData;

use crate::error::ComponentResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderId(pub u32);

/// Handle to the vertex/index buffers a backend created for one mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryId(pub u64);

/// Compiled shader programs by name.
pub type ShaderTable = HashMap<String, ShaderId>;

/// Looks up textures that were loaded elsewhere.
pub trait TextureResolver {
    fn get_texture(&mut self, name: &str) -> Option<TextureId>;
}

impl TextureResolver for HashMap<String, TextureId> {
    fn get_texture(&mut self, name: &str) -> Option<TextureId> {
        self.get(name).copied()
    }
}

/// Creates and destroys the GPU resources behind renderable nodes.
pub trait RenderBackend {
    fn upload_mesh(&mut self, mesh: &MeshData) -> ComponentResult<GeometryId>;
    fn release_geometry(&mut self, geometry: GeometryId);
}

#[derive(Debug)]
pub struct Renderable {
    pub is_group: bool,
    pub location: Vec3,
    pub diffuse: Vec4,
    pub shader_name: Option<String>,
    pub shader: Option<ShaderId>,
    pub texture: Option<TextureId>,
    pub geometry: Option<GeometryId>,
    pub children: Vec<Rc<Renderable>>,
}

impl Renderable {
    fn new(is_group: bool, location: Vec3, geometry: Option<GeometryId>) -> Self {
        Self {
            is_group,
            location,
            diffuse: Vec4::new(1.0, 1.0, 1.0, 1.0),
            shader_name: None,
            shader: None,
            texture: None,
            geometry,
            children: Vec::new(),
        }
    }

    pub fn group(location: Vec3) -> Self {
        Self::new(true, location, None)
    }

    /// Uploads `mesh` through the backend and wraps the resulting geometry in a node.
    pub fn from_mesh(
        backend: &mut dyn RenderBackend,
        mesh: &MeshData,
        location: Vec3,
    ) -> ComponentResult<Self> {
        let geometry = backend.upload_mesh(mesh)?;
        Ok(Self::new(false, location, Some(geometry)))
    }

    pub fn add_child(&mut self, child: Rc<Renderable>) {
        self.children.push(child);
    }

    /// Releases the geometry of this node and of every node below it.
    pub fn release(&self, backend: &mut dyn RenderBackend) {
        for node in self.iter() {
            if let Some(geometry) = node.geometry {
                backend.release_geometry(geometry);
            }
        }
    }

    /// Depth-first, pre-order traversal starting at this node.
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: vec![self] }
    }

    pub fn node_count(&self) -> usize {
        self.iter().count()
    }
}

pub struct Iter<'a> {
    stack: Vec<&'a Renderable>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Renderable;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev().map(|child| &**child));
        Some(node)
    }
}
