use std::{fmt, path::Path};

use anyhow::{Context, Result};
use ve_component::prelude::*;
use ve_format::mesh::Bounds;

use crate::utils;

/// What a single component file contains.
#[derive(Debug)]
pub(crate) struct ComponentSummary {
    pub(crate) file: String,
    pub(crate) name: String,
    pub(crate) meshes: usize,
    pub(crate) vertices: usize,
    pub(crate) indices: usize,
    pub(crate) textures: usize,
    pub(crate) collisions: usize,
    pub(crate) children: Vec<String>,
    pub(crate) bounds: Option<Bounds>,
}

impl fmt::Display for ComponentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): {} meshes, {} vertices, {} indices, {} textures, {} collisions",
            self.name,
            self.file,
            self.meshes,
            self.vertices,
            self.indices,
            self.textures,
            self.collisions
        )?;
        if let Some(bounds) = &self.bounds {
            write!(
                f,
                ", bounds [{}, {}, {}]..[{}, {}, {}]",
                bounds.min.x, bounds.min.y, bounds.min.z, bounds.max.x, bounds.max.y, bounds.max.z
            )?;
        }
        if !self.children.is_empty() {
            write!(f, ", children: {}", self.children.join(", "))?;
        }
        Ok(())
    }
}

/// Loads the component at `path` and its direct children.
pub(crate) fn inspect<D: MeshDecoder>(
    loader: &mut ComponentLoader<D>,
    path: &Path,
) -> Result<ComponentSummary> {
    let component = loader
        .load(path)
        .with_context(|| format!("Could not load component: {}", path.display()))?;
    let children = loader
        .load_children(&component)
        .with_context(|| format!("Could not load children of `{}`", component.name))?;

    let meshes = component.meshes();
    let mut summary = ComponentSummary {
        file: utils::file_name(path)?.to_string(),
        name: component.name.clone(),
        meshes: meshes.len(),
        vertices: 0,
        indices: 0,
        textures: 0,
        collisions: component.collisions.borrow().len(),
        children: children.iter().map(|(_, child)| child.name.clone()).collect(),
        bounds: None,
    };

    for mesh in meshes.iter() {
        summary.vertices += mesh.vertices()?.len();
        summary.textures += mesh.textures.len();
        if let Some(data) = &mesh.src_mesh {
            summary.indices += data.index_count();
            summary.bounds = merge(summary.bounds, data.bounds());
        }
    }

    Ok(summary)
}

fn merge(a: Option<Bounds>, b: Option<Bounds>) -> Option<Bounds> {
    match (a, b) {
        (Some(a), Some(b)) => Some(Bounds {
            min: Vec3::new(a.min.x.min(b.min.x), a.min.y.min(b.min.y), a.min.z.min(b.min.z)),
            max: Vec3::new(a.max.x.max(b.max.x), a.max.y.max(b.max.y), a.max.z.max(b.max.z)),
        }),
        (a, b) => a.or(b),
    }
}
