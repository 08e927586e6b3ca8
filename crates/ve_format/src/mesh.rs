//! The binary mesh format (`.vem`): a bincode encoded [`MeshData`].

use crate::error::{FormatError, Result};
use gfx_maths::*;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Vec3,
    pub color: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Submesh {
    pub faces: Vec<Face>,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Face {
    pub indices: [u32; 3],
}

/// Axis aligned bounds of a set of vertex positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub submeshes: Vec<Submesh>,
}

impl MeshData {
    /// Decodes and validates a mesh. Every face index has to point at an existing vertex.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mesh = bincode::deserialize::<MeshData>(bytes)?;
        mesh.validate()?;
        Ok(mesh)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mesh: MeshData = bincode::deserialize_from(reader)?;
        mesh.validate()?;
        Ok(mesh)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        MeshData::from_reader(BufReader::new(File::open(path)?))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(&self)?)
    }

    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let vertex_count = self.vertices.len();
        for (submesh, sm) in self.submeshes.iter().enumerate() {
            for (face, f) in sm.faces.iter().enumerate() {
                if let Some(&index) = f.indices.iter().find(|&&i| i as usize >= vertex_count) {
                    return Err(FormatError::IndexOutOfBounds {
                        submesh,
                        face,
                        index,
                        vertex_count,
                    });
                }
            }
        }
        Ok(())
    }

    /// Total number of indices over all submeshes.
    pub fn index_count(&self) -> usize {
        self.submeshes.iter().map(|sm| sm.faces.len() * 3).sum()
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.vertices.iter().map(|v| v.position)
    }

    /// Returns `None` for a mesh without vertices.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut positions = self.positions();
        let first = positions.next()?;
        let bounds = positions.fold(
            Bounds {
                min: first,
                max: first,
            },
            |b, p| Bounds {
                min: Vec3::new(b.min.x.min(p.x), b.min.y.min(p.y), b.min.z.min(p.z)),
                max: Vec3::new(b.max.x.max(p.x), b.max.y.max(p.y), b.max.z.max(p.z)),
            },
        );
        Some(bounds)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn vertex(x: f32, y: f32, z: f32) -> Vertex {
        Vertex {
            position: Vec3::new(x, y, z),
            ..Vertex::default()
        }
    }

    fn triangle() -> MeshData {
        MeshData {
            vertices: vec![
                vertex(-1.0, 0.0, 2.0),
                vertex(1.0, 0.5, -2.0),
                vertex(0.0, 3.0, 0.0),
            ],
            submeshes: vec![Submesh {
                faces: vec![Face { indices: [0, 1, 2] }],
            }],
        }
    }

    #[test]
    fn test_decode() -> Result<()> {
        let bytes = triangle().to_bytes()?;
        let mesh = MeshData::from_bytes(&bytes)?;
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.index_count(), 3);
        Ok(())
    }

    #[test]
    fn test_decode_garbage() {
        assert!(MeshData::from_bytes(&[0xff, 0x01]).is_err());
    }

    #[test]
    fn test_decode_rejects_dangling_index() -> Result<()> {
        let mut mesh = triangle();
        mesh.submeshes[0].faces.push(Face { indices: [0, 1, 7] });
        let bytes = mesh.to_bytes()?;

        match MeshData::from_bytes(&bytes) {
            Err(FormatError::IndexOutOfBounds {
                submesh: 0,
                face: 1,
                index: 7,
                vertex_count: 3,
            }) => Ok(()),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_from_reader() -> Result<()> {
        let bytes = triangle().to_bytes()?;
        let mesh = MeshData::from_reader(bytes.as_slice())?;
        assert_eq!(mesh.positions().count(), 3);

        let mut broken = triangle();
        broken.submeshes[0].faces[0].indices[2] = 3;
        let bytes = broken.to_bytes()?;
        assert!(matches!(
            MeshData::from_reader(bytes.as_slice()),
            Err(FormatError::IndexOutOfBounds { index: 3, .. })
        ));
        Ok(())
    }

    #[test]
    fn test_bounds() {
        let bounds = triangle().bounds().unwrap();
        assert_eq!(bounds.min, Vec3::new(-1.0, 0.0, -2.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 3.0, 2.0));

        assert!(MeshData::default().bounds().is_none());
    }
}
