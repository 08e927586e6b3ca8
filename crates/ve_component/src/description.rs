//! The JSON description a component is loaded from.
//!
//! ```json
//! {
//!   "name": "crate",
//!   "location": [0.0, 0.0, 0.0],
//!   "meshes": [{ "binFile": "crate.vem", "textures": ["crate.png"], "offset": [0.0, 0.5, 0.0] }],
//!   "material": { "shaderName": "basic", "diffuse": [1.0, 1.0, 1.0, 1.0] },
//!   "childReferences": [{ "file": "lid.json", "location": [0.0, 1.0, 0.0] }],
//!   "collisions": [{ "min": [-0.5, 0.0, -0.5], "max": [0.5, 1.0, 0.5], "tags": ["solid"] }],
//!   "properties": { "breakable": "true" }
//! }
//! ```

use std::{collections::BTreeMap, path::Path, rc::Rc};

use gfx_maths::*;
use serde::{Deserialize, Serialize};

use crate::{
    component::{CollisionRef, Component, ComponentChildRef, ComponentMaterial, ComponentMesh},
    error::ComponentResult,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComponentDescription {
    pub name: String,
    pub location: [f32; 3],
    pub meshes: Vec<MeshDescription>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<MaterialDescription>,
    pub child_references: Vec<ChildRefDescription>,
    pub collisions: Vec<CollisionDescription>,
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeshDescription {
    pub bin_file: String,
    pub textures: Vec<String>,
    pub offset: [f32; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialDescription {
    pub shader_name: String,
    #[serde(default = "white")]
    pub diffuse: [f32; 4],
}

fn white() -> [f32; 4] {
    [1.0, 1.0, 1.0, 1.0]
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChildRefDescription {
    pub file: String,
    pub location: [f32; 3],
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionDescription {
    pub min: [f32; 3],
    pub max: [f32; 3],
    pub tags: Vec<String>,
}

fn vec3(v: [f32; 3]) -> Vec3 {
    Vec3::new(v[0], v[1], v[2])
}

fn array3(v: Vec3) -> [f32; 3] {
    [v.x, v.y, v.z]
}

impl ComponentDescription {
    pub fn from_json(json: &str) -> ComponentResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_slice(bytes: &[u8]) -> ComponentResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn from_file(path: &Path) -> ComponentResult<Self> {
        let data = std::fs::read(path)?;
        ComponentDescription::from_slice(&data)
    }

    pub fn to_json(&self) -> ComponentResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Creates the component. Mesh payloads are left empty, decoding them is up to the caller.
    pub fn into_component(self, dir_path: impl Into<String>) -> Component {
        let mut component = Component::new(self.name, dir_path);
        component.location = vec3(self.location);
        component.material = self.material.map(|m| {
            Rc::new(ComponentMaterial {
                shader_name: m.shader_name,
                diffuse: Vec4::new(m.diffuse[0], m.diffuse[1], m.diffuse[2], m.diffuse[3]),
            })
        });

        for mesh in self.meshes {
            component.add_mesh(ComponentMesh::new(
                mesh.bin_file,
                mesh.textures,
                vec3(mesh.offset),
            ));
        }
        for child in self.child_references {
            component.add_child_reference(ComponentChildRef {
                file: child.file,
                location: vec3(child.location),
            });
        }
        for collision in self.collisions {
            component.add_collision(CollisionRef {
                min: vec3(collision.min),
                max: vec3(collision.max),
                tags: collision.tags.into_iter().collect(),
            });
        }
        component.properties.borrow_mut().extend(self.properties);

        component
    }
}

impl From<&Component> for ComponentDescription {
    fn from(component: &Component) -> Self {
        ComponentDescription {
            name: component.name.clone(),
            location: array3(component.location),
            meshes: component
                .meshes()
                .iter()
                .map(|m| MeshDescription {
                    bin_file: m.bin_file.clone(),
                    textures: m.textures.clone(),
                    offset: array3(m.offset),
                })
                .collect(),
            material: component.material.as_ref().map(|m| MaterialDescription {
                shader_name: m.shader_name.clone(),
                diffuse: [m.diffuse.x, m.diffuse.y, m.diffuse.z, m.diffuse.w],
            }),
            child_references: component
                .child_references
                .borrow()
                .iter()
                .map(|c| ChildRefDescription {
                    file: c.file.clone(),
                    location: array3(c.location),
                })
                .collect(),
            collisions: component
                .collisions
                .borrow()
                .iter()
                .map(|c| CollisionDescription {
                    min: array3(c.min),
                    max: array3(c.max),
                    tags: c.tags.iter().cloned().collect(),
                })
                .collect(),
            properties: component
                .properties
                .borrow()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}
