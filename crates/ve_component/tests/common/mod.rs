#![allow(dead_code)]

use std::collections::HashMap;

use gfx_maths::*;
use ve_component::prelude::*;
use ve_format::mesh::{Face, MeshData, Submesh, Vertex};

/// Hands out increasing geometry ids and remembers what was released.
#[derive(Default)]
pub struct RecordingBackend {
    pub next: u64,
    pub uploaded: Vec<GeometryId>,
    pub released: Vec<GeometryId>,
    /// Fail every upload after this many succeeded.
    pub fail_after: Option<usize>,
}

impl RenderBackend for RecordingBackend {
    fn upload_mesh(&mut self, _mesh: &MeshData) -> ComponentResult<GeometryId> {
        if let Some(limit) = self.fail_after {
            if self.uploaded.len() >= limit {
                return Err(ComponentError::Backend("out of device memory".to_string()));
            }
        }
        self.next += 1;
        let id = GeometryId(self.next);
        self.uploaded.push(id);
        Ok(id)
    }

    fn release_geometry(&mut self, geometry: GeometryId) {
        self.released.push(geometry);
    }
}

#[derive(Default)]
pub struct RecordingTextures {
    pub textures: HashMap<String, TextureId>,
    pub requests: Vec<String>,
}

impl RecordingTextures {
    pub fn with(name: &str, id: u32) -> Self {
        let mut textures = Self::default();
        textures.textures.insert(name.to_string(), TextureId(id));
        textures
    }
}

impl TextureResolver for RecordingTextures {
    fn get_texture(&mut self, name: &str) -> Option<TextureId> {
        self.requests.push(name.to_string());
        self.textures.get(name).copied()
    }
}

pub fn shaders() -> ShaderTable {
    let mut shaders = ShaderTable::new();
    shaders.insert("basic".to_string(), ShaderId(1));
    shaders
}

pub fn triangle() -> MeshData {
    let vertex = |x: f32, y: f32, z: f32| Vertex {
        position: Vec3::new(x, y, z),
        ..Vertex::default()
    };
    MeshData {
        vertices: vec![
            vertex(0.0, 0.0, 0.0),
            vertex(1.0, 0.0, 0.0),
            vertex(0.0, 1.0, 0.0),
        ],
        submeshes: vec![Submesh {
            faces: vec![Face { indices: [0, 1, 2] }],
        }],
    }
}
