use std::{
    cell::{Ref, RefCell, RefMut},
    collections::{BTreeSet, HashMap},
    rc::Rc,
};

use gfx_maths::*;
use log::{debug, error, warn};
use ve_format::mesh::{MeshData, Vertex};

use crate::{
    error::{ComponentError, ComponentResult},
    renderable::{RenderBackend, Renderable, ShaderId, ShaderTable, TextureResolver},
};

/// Data shared between a component and all of its duplicates.
pub type Shared<T> = Rc<RefCell<T>>;

fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

/// A mesh that is part of a component, with everything needed to draw it.
#[derive(Debug)]
pub struct ComponentMesh {
    /// Path of the binary mesh file, relative to the component file.
    pub bin_file: String,
    /// Texture files for the mesh, relative to the component file.
    pub textures: Vec<String>,
    /// Offset of the mesh inside the component.
    pub offset: Vec3,
    /// Decoded mesh data. Filled in by the loader before the component gets built.
    pub src_mesh: Option<MeshData>,
    component_dir: Rc<str>,
}

impl ComponentMesh {
    pub fn new(bin_file: impl Into<String>, textures: Vec<String>, offset: Vec3) -> Self {
        Self {
            bin_file: bin_file.into(),
            textures,
            offset,
            src_mesh: None,
            component_dir: Rc::from(""),
        }
    }

    pub fn with_mesh_data(mut self, data: MeshData) -> Self {
        self.src_mesh = Some(data);
        self
    }

    pub fn full_bin_file_path(&self) -> String {
        format!("{}{}", self.component_dir, self.bin_file)
    }

    pub fn full_texture_path(&self, index: usize) -> ComponentResult<String> {
        let texture =
            self.textures
                .get(index)
                .ok_or_else(|| ComponentError::OutOfRangeTextureIndex {
                    mesh: self.bin_file.clone(),
                    index,
                    len: self.textures.len(),
                })?;
        Ok(format!("{}{}", self.component_dir, texture))
    }

    pub fn vertices(&self) -> ComponentResult<&[Vertex]> {
        self.src_mesh
            .as_ref()
            .map(|mesh| mesh.vertices.as_slice())
            .ok_or_else(|| ComponentError::MissingMeshData(self.bin_file.clone()))
    }

    pub fn is_decoded(&self) -> bool {
        self.src_mesh.is_some()
    }
}

/// Reference to another component file that is placed inside this one.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentChildRef {
    pub file: String,
    pub location: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComponentMaterial {
    pub shader_name: String,
    pub diffuse: Vec4,
}

/// Axis aligned collision box inside a component, e.g. the walls of a house.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionRef {
    pub min: Vec3,
    pub max: Vec3,
    pub tags: BTreeSet<String>,
}

impl CollisionRef {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min,
            max,
            tags: BTreeSet::new(),
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Bounds are inclusive.
    pub fn contains_point(&self, point: Vec3) -> bool {
        (self.min.x..=self.max.x).contains(&point.x)
            && (self.min.y..=self.max.y).contains(&point.y)
            && (self.min.z..=self.max.z).contains(&point.z)
    }

    pub fn intersects(&self, other: &CollisionRef) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    pub fn translated(&self, offset: Vec3) -> CollisionRef {
        CollisionRef {
            min: self.min + offset,
            max: self.max + offset,
            tags: self.tags.clone(),
        }
    }
}

/// A named and positioned collection of meshes, child components and collision boxes.
///
/// Components are meant to be used as prototypes: [`Component::duplicate`] hands out a new
/// component that shares meshes, collisions, properties and the built renderable with the
/// original. Nothing in here is thread safe, build a component once before handing its
/// renderable to anything else.
#[derive(Debug)]
pub struct Component {
    pub name: String,
    pub location: Vec3,
    meshes: Shared<Vec<ComponentMesh>>,
    pub material: Option<Rc<ComponentMaterial>>,
    pub child_references: Shared<Vec<ComponentChildRef>>,
    pub collisions: Shared<Vec<CollisionRef>>,
    /// Custom properties for client code.
    pub properties: Shared<HashMap<String, String>>,
    dir_path: Rc<str>,
    strict_shaders: bool,
    cached_renderable: Shared<Option<Rc<Renderable>>>,
}

impl Component {
    /// `dir_path` is prepended verbatim to relative mesh and texture paths, so it usually ends
    /// with a path separator.
    pub fn new(name: impl Into<String>, dir_path: impl Into<String>) -> Self {
        let dir_path: String = dir_path.into();
        Self {
            name: name.into(),
            location: Vec3::zero(),
            meshes: shared(Vec::new()),
            material: None,
            child_references: shared(Vec::new()),
            collisions: shared(Vec::new()),
            properties: shared(HashMap::new()),
            dir_path: Rc::from(dir_path),
            strict_shaders: false,
            cached_renderable: shared(None),
        }
    }

    pub fn dir_path(&self) -> &str {
        &self.dir_path
    }

    /// Fail builds that name a shader missing from the shader table instead of leaving the
    /// shader unset.
    pub fn set_strict_shaders(&mut self, strict: bool) {
        self.strict_shaders = strict;
    }

    /// Adds a mesh and points its relative paths at this component's directory. This is the
    /// only way to add meshes, so every mesh resolves its paths against the component.
    pub fn add_mesh(&self, mut mesh: ComponentMesh) {
        mesh.component_dir = Rc::clone(&self.dir_path);
        self.meshes.borrow_mut().push(mesh);
    }

    pub fn meshes(&self) -> Ref<'_, [ComponentMesh]> {
        Ref::map(self.meshes.borrow(), |meshes| meshes.as_slice())
    }

    /// Mutable access to the existing meshes, e.g. to attach decoded mesh data.
    pub fn meshes_mut(&self) -> RefMut<'_, [ComponentMesh]> {
        RefMut::map(self.meshes.borrow_mut(), |meshes| meshes.as_mut_slice())
    }

    /// Whether `other` is a duplicate of this component (or the other way around).
    pub fn shares_meshes_with(&self, other: &Component) -> bool {
        Rc::ptr_eq(&self.meshes, &other.meshes)
    }

    pub fn add_child_reference(&self, child: ComponentChildRef) {
        self.child_references.borrow_mut().push(child);
    }

    pub fn add_collision(&self, collision: CollisionRef) {
        self.collisions.borrow_mut().push(collision);
    }

    pub fn set_property(&self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.borrow_mut().insert(key.into(), value.into());
    }

    pub fn property(&self, key: &str) -> Option<String> {
        self.properties.borrow().get(key).cloned()
    }

    /// Makes a new component sharing all collections and the cached renderable with `self`.
    pub fn duplicate(&self) -> Component {
        Component {
            name: self.name.clone(),
            location: self.location,
            meshes: Rc::clone(&self.meshes),
            material: self.material.clone(),
            child_references: Rc::clone(&self.child_references),
            collisions: Rc::clone(&self.collisions),
            properties: Rc::clone(&self.properties),
            dir_path: Rc::clone(&self.dir_path),
            strict_shaders: self.strict_shaders,
            cached_renderable: Rc::clone(&self.cached_renderable),
        }
    }

    /// Releases the cached renderable, if there is one. The cache is shared with all
    /// duplicates, so releasing through any of them empties it for all.
    pub fn release(&self, backend: &mut dyn RenderBackend) {
        if let Some(renderable) = self.cached_renderable.borrow_mut().take() {
            debug!("Releasing renderable of component `{}`", self.name);
            renderable.release(backend);
        }
    }

    pub fn is_built(&self) -> bool {
        self.cached_renderable.borrow().is_some()
    }

    pub fn cached_renderable(&self) -> Option<Rc<Renderable>> {
        self.cached_renderable.borrow().clone()
    }

    /// Returns the cached renderable or builds it.
    ///
    /// The result is a group node at the component's location with one child per mesh.
    /// Child references are not followed; see
    /// [`ComponentLoader::build_scene`](crate::loader::ComponentLoader::build_scene).
    pub fn build_or_get_renderable(
        &self,
        backend: &mut dyn RenderBackend,
        textures: &mut dyn TextureResolver,
        shaders: &ShaderTable,
    ) -> ComponentResult<Rc<Renderable>> {
        if let Some(cached) = self.cached_renderable.borrow().as_ref() {
            return Ok(Rc::clone(cached));
        }

        let meshes = self.meshes.borrow();
        if let Some(mesh) = meshes.iter().find(|mesh| !mesh.is_decoded()) {
            return Err(ComponentError::MissingMeshData(mesh.full_bin_file_path()));
        }

        let shader = match &self.material {
            Some(material) => self.lookup_shader(material, shaders)?,
            None => None,
        };

        let mut group = Renderable::group(self.location);
        for mesh in meshes.iter() {
            let mut node = match create_renderable_for_mesh(backend, textures, mesh) {
                Ok(node) => node,
                Err(err) => {
                    group.release(backend);
                    return Err(err);
                }
            };

            if let Some(material) = &self.material {
                node.diffuse = material.diffuse;
                node.shader_name = Some(material.shader_name.clone());
                node.shader = shader;
            }

            group.add_child(Rc::new(node));
        }

        debug!(
            "Built renderable for component `{}` with {} meshes",
            self.name,
            group.children.len()
        );

        let group = Rc::new(group);
        *self.cached_renderable.borrow_mut() = Some(Rc::clone(&group));
        Ok(group)
    }

    fn lookup_shader(
        &self,
        material: &ComponentMaterial,
        shaders: &ShaderTable,
    ) -> ComponentResult<Option<ShaderId>> {
        match shaders.get(&material.shader_name) {
            Some(shader) => Ok(Some(*shader)),
            None if self.strict_shaders => Err(ComponentError::UnknownShaderName(
                material.shader_name.clone(),
            )),
            None => {
                warn!(
                    "Component `{}` uses unknown shader `{}`",
                    self.name, material.shader_name
                );
                Ok(None)
            }
        }
    }

    /// Collision boxes moved to `location`.
    pub fn collisions_at(&self, location: Vec3) -> Vec<CollisionRef> {
        self.collisions
            .borrow()
            .iter()
            .map(|c| c.translated(location))
            .collect()
    }

    pub fn collisions_with_tag(&self, tag: &str) -> Vec<CollisionRef> {
        self.collisions
            .borrow()
            .iter()
            .filter(|c| c.has_tag(tag))
            .cloned()
            .collect()
    }
}

fn create_renderable_for_mesh(
    backend: &mut dyn RenderBackend,
    textures: &mut dyn TextureResolver,
    mesh: &ComponentMesh,
) -> ComponentResult<Renderable> {
    let data = mesh
        .src_mesh
        .as_ref()
        .ok_or_else(|| ComponentError::MissingMeshData(mesh.full_bin_file_path()))?;
    let mut node = Renderable::from_mesh(backend, data, mesh.offset)?;

    if let Some(texture) = mesh.textures.first() {
        node.texture = textures.get_texture(texture);
        if node.texture.is_none() {
            error!(
                "Mesh `{}`: {}",
                mesh.bin_file,
                ComponentError::TextureResolutionFailure(texture.clone())
            );
        }
    }

    Ok(node)
}

#[cfg(test)]
mod test {
    use super::*;

    fn crate_mesh() -> ComponentMesh {
        ComponentMesh::new(
            "crate.mesh",
            vec!["crate_diffuse.png".to_string(), "crate_normal.png".to_string()],
            Vec3::zero(),
        )
    }

    #[test]
    fn test_full_paths() -> ComponentResult<()> {
        let component = Component::new("crate", "assets/props/");
        component.add_mesh(crate_mesh());

        let meshes = component.meshes();
        assert_eq!(meshes[0].full_bin_file_path(), "assets/props/crate.mesh");
        assert_eq!(
            meshes[0].full_texture_path(1)?,
            "assets/props/crate_normal.png"
        );
        Ok(())
    }

    #[test]
    fn test_mesh_paths_follow_component_dir() {
        let original = Component::new("crate", "assets/props/");
        let copy = original.duplicate();
        copy.add_mesh(crate_mesh());

        for mesh in original.meshes_mut().iter_mut() {
            mesh.bin_file = "crate_lod1.mesh".to_string();
            mesh.src_mesh = Some(MeshData::default());
        }

        let meshes = original.meshes();
        assert_eq!(meshes.len(), 1);
        assert_eq!(meshes[0].full_bin_file_path(), "assets/props/crate_lod1.mesh");
        assert!(meshes[0].is_decoded());
    }

    #[test]
    fn test_texture_index_out_of_range() {
        let component = Component::new("crate", "assets/props/");
        component.add_mesh(crate_mesh());

        let meshes = component.meshes();
        match meshes[0].full_texture_path(2) {
            Err(ComponentError::OutOfRangeTextureIndex { index: 2, len: 2, .. }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_vertices_without_data() {
        let mesh = crate_mesh();
        assert!(matches!(
            mesh.vertices(),
            Err(ComponentError::MissingMeshData(_))
        ));
    }

    #[test]
    fn test_vertices_empty_mesh_is_not_missing() -> ComponentResult<()> {
        let mesh = crate_mesh().with_mesh_data(MeshData::default());
        assert!(mesh.vertices()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_duplicate_shares_collections() {
        let original = Component::new("crate", "assets/props/");
        original.set_property("breakable", "true");

        let mut copy = original.duplicate();
        copy.name = "crate copy".to_string();
        copy.location = Vec3::new(1.0, 0.0, 0.0);
        copy.add_mesh(crate_mesh());
        copy.set_property("loot", "gold");

        assert_eq!(original.name, "crate");
        assert_eq!(original.location, Vec3::zero());
        assert_eq!(original.meshes().len(), 1);
        assert_eq!(original.property("loot").as_deref(), Some("gold"));
        assert_eq!(copy.property("breakable").as_deref(), Some("true"));
        assert!(original.shares_meshes_with(&copy));
        assert_eq!(copy.dir_path(), "assets/props/");
    }

    #[test]
    fn test_collision_queries() {
        let component = Component::new("wall", "");
        let mut wall = CollisionRef::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(4.0, 2.0, 0.5));
        wall.tags.insert("wall".to_string());
        component.add_collision(wall);
        component.add_collision(CollisionRef::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
        ));

        let walls = component.collisions_with_tag("wall");
        assert_eq!(walls.len(), 1);
        assert!(walls[0].contains_point(Vec3::new(4.0, 1.0, 0.25)));
        assert!(!walls[0].contains_point(Vec3::new(4.1, 1.0, 0.25)));

        let moved = component.collisions_at(Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(moved[0].min, Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(moved[0].max, Vec3::new(14.0, 2.0, 0.5));
        assert!(moved[0].has_tag("wall"));
        assert!(!moved[0].intersects(&component.collisions.borrow()[1]));
        assert!(component.collisions.borrow()[0].intersects(&component.collisions.borrow()[1]));
    }
}
