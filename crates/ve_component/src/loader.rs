//! Loading components from their JSON descriptions and composing them with their children.

use std::{
    collections::HashMap,
    path::{Path, PathBuf, MAIN_SEPARATOR},
    rc::Rc,
};

use gfx_maths::*;
use log::{debug, info};
use ve_format::mesh::MeshData;

use crate::{
    component::{Component, ComponentChildRef},
    config::LoaderConfig,
    description::ComponentDescription,
    error::{ComponentError, ComponentResult},
    renderable::{RenderBackend, Renderable, ShaderTable, TextureResolver},
};

/// Turns a binary mesh file into mesh data.
pub trait MeshDecoder {
    fn decode(&mut self, path: &Path) -> ComponentResult<MeshData>;
}

/// Reads `.vem` files written by the asset tool.
#[derive(Debug, Default, Clone, Copy)]
pub struct BinMeshDecoder;

impl MeshDecoder for BinMeshDecoder {
    fn decode(&mut self, path: &Path) -> ComponentResult<MeshData> {
        Ok(MeshData::from_file(path)?)
    }
}

/// Loads components and keeps one prototype per file. Every [`ComponentLoader::load`] returns
/// a duplicate of the prototype, so all components loaded from the same file share their
/// meshes and renderable.
pub struct ComponentLoader<D: MeshDecoder = BinMeshDecoder> {
    config: LoaderConfig,
    decoder: D,
    prototypes: HashMap<PathBuf, Component>,
}

impl ComponentLoader<BinMeshDecoder> {
    pub fn new(config: LoaderConfig) -> Self {
        Self::with_decoder(config, BinMeshDecoder)
    }
}

impl<D: MeshDecoder> ComponentLoader<D> {
    pub fn with_decoder(config: LoaderConfig, decoder: D) -> Self {
        Self {
            config,
            decoder,
            prototypes: HashMap::new(),
        }
    }

    pub fn loaded_count(&self) -> usize {
        self.prototypes.len()
    }

    pub fn prototype(&self, path: impl AsRef<Path>) -> Option<&Component> {
        self.prototypes.get(&self.resolve(path.as_ref()))
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.config.asset_root.join(path)
        }
    }

    /// Loads the component at `path`, relative to the configured asset root.
    pub fn load(&mut self, path: impl AsRef<Path>) -> ComponentResult<Component> {
        let path = self.resolve(path.as_ref());
        self.load_resolved(path)
    }

    fn load_resolved(&mut self, path: PathBuf) -> ComponentResult<Component> {
        if let Some(prototype) = self.prototypes.get(&path) {
            debug!("Using cached component: {}", path.display());
            return Ok(prototype.duplicate());
        }

        let component = self.load_uncached(&path)?;
        let duplicate = component.duplicate();
        self.prototypes.insert(path, component);
        Ok(duplicate)
    }

    fn load_uncached(&mut self, path: &Path) -> ComponentResult<Component> {
        info!("Loading component: {}", path.display());
        let description = ComponentDescription::from_file(path)?;

        let mut component = description.into_component(component_dir(path));
        component.set_strict_shaders(self.config.strict_shaders);

        for mesh in component.meshes_mut().iter_mut() {
            let bin_path = PathBuf::from(mesh.full_bin_file_path());
            debug!("Decoding mesh: {}", bin_path.display());
            mesh.src_mesh = Some(self.decoder.decode(&bin_path)?);
        }

        Ok(component)
    }

    /// Loads every component referenced by `component`, paired with its reference.
    pub fn load_children(
        &mut self,
        component: &Component,
    ) -> ComponentResult<Vec<(ComponentChildRef, Component)>> {
        let references = component.child_references.borrow().clone();
        references
            .into_iter()
            .map(|reference| -> ComponentResult<(ComponentChildRef, Component)> {
                let child = self.load_resolved(child_path(component, &reference))?;
                Ok((reference, child))
            })
            .collect()
    }

    /// Builds the component at `path` together with all components it references.
    ///
    /// The returned node shares the cached renderables of the loaded prototypes. Release them
    /// through [`ComponentLoader::release_all`], not through the returned node.
    pub fn build_scene(
        &mut self,
        path: impl AsRef<Path>,
        backend: &mut dyn RenderBackend,
        textures: &mut dyn TextureResolver,
        shaders: &ShaderTable,
    ) -> ComponentResult<Rc<Renderable>> {
        let path = self.resolve(path.as_ref());
        let mut stack = Vec::new();
        self.build_node(path, backend, textures, shaders, &mut stack)
    }

    fn build_node(
        &mut self,
        path: PathBuf,
        backend: &mut dyn RenderBackend,
        textures: &mut dyn TextureResolver,
        shaders: &ShaderTable,
        stack: &mut Vec<PathBuf>,
    ) -> ComponentResult<Rc<Renderable>> {
        if stack.contains(&path) {
            return Err(ComponentError::ChildCycle(path));
        }
        // the root is at depth 0
        if stack.len() > self.config.max_child_depth {
            return Err(ComponentError::ChildDepthExceeded(
                self.config.max_child_depth,
            ));
        }

        let component = self.load_resolved(path.clone())?;
        let own = component.build_or_get_renderable(backend, textures, shaders)?;

        let references = component.child_references.borrow().clone();
        if references.is_empty() {
            return Ok(own);
        }

        stack.push(path);
        let mut root = Renderable::group(Vec3::zero());
        root.add_child(own);
        for reference in references {
            let child = self.build_node(
                child_path(&component, &reference),
                backend,
                textures,
                shaders,
                stack,
            )?;
            let mut placed = Renderable::group(reference.location);
            placed.add_child(child);
            root.add_child(Rc::new(placed));
        }
        stack.pop();

        Ok(Rc::new(root))
    }

    /// Releases the renderables of all loaded prototypes and forgets them.
    pub fn release_all(&mut self, backend: &mut dyn RenderBackend) {
        for (path, component) in self.prototypes.drain() {
            debug!("Releasing component: {}", path.display());
            component.release(backend);
        }
    }
}

/// Directory of a component file, with a trailing separator so relative paths can be appended.
fn component_dir(path: &Path) -> String {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            format!("{}{}", dir.to_string_lossy(), MAIN_SEPARATOR)
        }
        _ => String::new(),
    }
}

fn child_path(component: &Component, reference: &ComponentChildRef) -> PathBuf {
    PathBuf::from(format!("{}{}", component.dir_path(), reference.file))
}
