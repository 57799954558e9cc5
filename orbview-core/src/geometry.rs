//! Geometry records shared by primitives, the OBJ loader and the renderer
use nalgebra::{Point3, Vector2, Vector3};

use crate::error::InconsistentGeometry;

/// Positions of one triangle, looked up through the index list
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Point3<f32>; 3],
}

impl Triangle {
    pub fn new(v0: Point3<f32>, v1: Point3<f32>, v2: Point3<f32>) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Calculate the face normal from the triangle's vertices.
    ///
    /// Returns `None` for zero-area triangles.
    pub fn calculate_normal(&self) -> Option<Vector3<f32>> {
        let [v0, v1, v2] = self.vertices;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1.cross(&edge2).try_normalize(f32::EPSILON)
    }

    pub fn centroid(&self) -> Point3<f32> {
        let [v0, v1, v2] = self.vertices;
        Point3::from((v0.coords + v1.coords + v2.coords) / 3.0)
    }
}

/// Parallel per-vertex arrays plus a triangle index list.
///
/// `positions[i]`, `normals[i]` and `uvs[i]` all describe vertex `i`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryRecord {
    pub positions: Vec<Point3<f32>>,
    pub normals: Vec<Vector3<f32>>,
    pub uvs: Vec<Vector2<f32>>,
    pub indices: Vec<u32>,
}

impl GeometryRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize, indices: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices),
            normals: Vec::with_capacity(vertices),
            uvs: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(indices),
        }
    }

    pub fn push_vertex(&mut self, position: Point3<f32>, normal: Vector3<f32>, uv: Vector2<f32>) {
        self.positions.push(position);
        self.normals.push(normal);
        self.uvs.push(uv);
    }

    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Attribute arrays agree in length and every index names a vertex
    pub fn is_consistent(&self) -> bool {
        let n = self.positions.len();
        self.normals.len() == n
            && self.uvs.len() == n
            && self.indices.len() % 3 == 0
            && self.indices.iter().all(|&i| (i as usize) < n)
    }

    /// [`is_consistent`](Self::is_consistent) as a `Result`
    pub fn validate(&self) -> Result<(), InconsistentGeometry> {
        if self.is_consistent() {
            return Ok(());
        }
        Err(InconsistentGeometry {
            positions: self.positions.len(),
            normals: self.normals.len(),
            uvs: self.uvs.len(),
            indices: self.indices.len(),
            max_index: self.indices.iter().copied().max(),
        })
    }

    /// Index triples in storage order
    pub fn faces(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|c| [c[0] as usize, c[1] as usize, c[2] as usize])
    }

    /// Triangles in storage order
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.faces().map(move |[a, b, c]| {
            Triangle::new(self.positions[a], self.positions[b], self.positions[c])
        })
    }
}

/// Smallest and largest coordinate seen on any axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneBounds {
    pub min: f32,
    pub max: f32,
}

impl SceneBounds {
    pub fn from_point(p: &Point3<f32>) -> Self {
        Self {
            min: p.coords.min(),
            max: p.coords.max(),
        }
    }

    pub fn include(&mut self, p: &Point3<f32>) {
        self.min = self.min.min(p.coords.min());
        self.max = self.max.max(p.coords.max());
    }

    pub fn union(self, other: SceneBounds) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Running bounds over an optional starting value
    pub fn extend(bounds: &mut Option<SceneBounds>, p: &Point3<f32>) {
        match bounds {
            Some(b) => b.include(p),
            None => *bounds = Some(Self::from_point(p)),
        }
    }
}
