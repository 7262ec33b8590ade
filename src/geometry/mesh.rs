//! Scene objects and mesh vertex data.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use glam::DVec3;
use thiserror::Error;

use super::MeshExtent;
use crate::noise::NoiseSettings;

/// Errors that can occur while loading mesh data.
#[derive(Error, Debug)]
pub enum MeshError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Line {line}: missing {axis} coordinate")]
    MissingCoordinate { line: usize, axis: char },
    #[error("Line {line}: invalid number {value:?}")]
    InvalidNumber { line: usize, value: String },
    #[error("Mesh has no vertices")]
    Empty,
}

/// Vertex positions of a mesh. Faces are irrelevant to height baking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<DVec3>,
}

impl Mesh {
    pub fn new(vertices: Vec<DVec3>) -> Self {
        Self { vertices }
    }

    /// A flat, regularly subdivided plane centred at the origin.
    pub fn grid_plane(extent: &MeshExtent, subdivisions_x: u32, subdivisions_y: u32) -> Self {
        let nx = subdivisions_x.max(2);
        let ny = subdivisions_y.max(2);
        let vertices = (0..ny)
            .flat_map(|y| (0..nx).map(move |x| (x, y)))
            .map(|(x, y)| DVec3::new(extent.sample_x(x, nx), extent.sample_y(y, ny), 0.0))
            .collect();
        Self { vertices }
    }

    /// Bounding dimensions of the vertex cloud.
    pub fn extent(&self) -> Option<MeshExtent> {
        MeshExtent::from_vertices(&self.vertices)
    }

    /// Moves the footprint centre to the origin and the lowest vertex to z = 0.
    pub fn recentered(mut self) -> Self {
        let Some(first) = self.vertices.first().copied() else {
            return self;
        };
        let (min, max) = self
            .vertices
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let shift = DVec3::new((min.x + max.x) / 2.0, (min.y + max.y) / 2.0, min.z);
        for v in &mut self.vertices {
            *v -= shift;
        }
        self
    }

    /// Loads the `v` records of a Wavefront OBJ file.
    pub fn load_obj(path: &Path) -> Result<Self, MeshError> {
        let file = File::open(path)?;
        let vertices = parse_obj_vertices(file)?;
        if vertices.is_empty() {
            return Err(MeshError::Empty);
        }
        Ok(Self { vertices })
    }
}

/// Reads vertex positions from OBJ text, ignoring every other record.
///
/// Non-finite vertices are skipped.
pub fn parse_obj_vertices<R: Read>(reader: R) -> Result<Vec<DVec3>, MeshError> {
    let reader = BufReader::new(reader);
    let mut vertices = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.starts_with("v ") {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        parts.next(); // "v"

        let mut coords = [0.0f64; 3];
        for (slot, axis) in coords.iter_mut().zip(['x', 'y', 'z']) {
            let token = parts.next().ok_or(MeshError::MissingCoordinate {
                line: index + 1,
                axis,
            })?;
            *slot = token.parse().map_err(|_| MeshError::InvalidNumber {
                line: index + 1,
                value: token.to_string(),
            })?;
        }

        let v = DVec3::from_array(coords);
        if v.is_finite() {
            vertices.push(v);
        }
    }

    Ok(vertices)
}

/// Geometry carried by a scene object.
#[derive(Debug, Clone)]
pub enum ObjectKind {
    Mesh(Mesh),
    /// Any non-mesh object (curve, empty, light...), by type name.
    Other(String),
}

impl ObjectKind {
    pub fn type_name(&self) -> &str {
        match self {
            ObjectKind::Mesh(_) => "MESH",
            ObjectKind::Other(name) => name,
        }
    }
}

/// The object selected for baking.
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub name: String,
    pub kind: ObjectKind,
    /// Bounding dimensions used as the sampling domain.
    pub dimensions: MeshExtent,
    /// Noise parameters attached to the object; `None` means nothing to export.
    pub noise: Option<NoiseSettings>,
}

impl SceneObject {
    /// A mesh object whose dimensions come from its vertices.
    pub fn from_mesh(name: impl Into<String>, mesh: Mesh, noise: Option<NoiseSettings>) -> Result<Self, MeshError> {
        let dimensions = mesh.extent().ok_or(MeshError::Empty)?;
        Ok(Self {
            name: name.into(),
            kind: ObjectKind::Mesh(mesh),
            dimensions,
            noise,
        })
    }

    /// A flat plane covering `extent`, the usual landscape base object.
    pub fn plane(name: impl Into<String>, extent: MeshExtent, noise: Option<NoiseSettings>) -> Self {
        Self {
            name: name.into(),
            kind: ObjectKind::Mesh(Mesh::grid_plane(&extent, 2, 2)),
            dimensions: extent,
            noise,
        }
    }

    pub fn mesh(&self) -> Option<&Mesh> {
        match &self.kind {
            ObjectKind::Mesh(mesh) => Some(mesh),
            ObjectKind::Other(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_obj_vertices() {
        let text = "# comment\no terrain\nv 0 0 0\nv 1.5 -2 0.25\nvn 0 0 1\nf 1 2 3\nv 1 1 nan\n";
        let vertices = parse_obj_vertices(text.as_bytes()).unwrap();
        assert_eq!(vertices.len(), 2);
        assert_eq!(vertices[1], DVec3::new(1.5, -2.0, 0.25));
    }

    #[test]
    fn test_parse_obj_missing_coordinate() {
        let err = parse_obj_vertices("v 1 2\n".as_bytes()).unwrap_err();
        assert!(matches!(err, MeshError::MissingCoordinate { line: 1, axis: 'z' }));
    }

    #[test]
    fn test_parse_obj_invalid_number() {
        let err = parse_obj_vertices("v 1 two 3\n".as_bytes()).unwrap_err();
        assert!(matches!(err, MeshError::InvalidNumber { line: 1, .. }));
    }

    #[test]
    fn test_load_obj_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.obj");
        std::fs::write(&path, "o nothing\n").unwrap();
        assert!(matches!(Mesh::load_obj(&path), Err(MeshError::Empty)));
    }

    #[test]
    fn test_grid_plane_extent() {
        let extent = MeshExtent::new(4.0, 2.0, 0.0);
        let mesh = Mesh::grid_plane(&extent, 3, 3);
        assert_eq!(mesh.vertices.len(), 9);
        assert_eq!(mesh.extent().unwrap(), extent);
    }

    #[test]
    fn test_recentered() {
        let mesh = Mesh::new(vec![DVec3::new(2.0, 10.0, 5.0), DVec3::new(6.0, 14.0, 7.0)]).recentered();
        assert_eq!(mesh.vertices[0], DVec3::new(-2.0, -2.0, 0.0));
        assert_eq!(mesh.vertices[1], DVec3::new(2.0, 2.0, 2.0));
        assert!(Mesh::default().recentered().vertices.is_empty());
    }

    #[test]
    fn test_object_kind_names() {
        let plane = SceneObject::plane("Landscape", MeshExtent::default(), None);
        assert_eq!(plane.kind.type_name(), "MESH");
        assert!(plane.mesh().is_some());
        assert_eq!(ObjectKind::Other("CURVE".into()).type_name(), "CURVE");
    }
}
