//! Wavefront OBJ parsing with per-material grouping
//!
//! Positions, normals and UVs are indexed independently in the file. Each
//! group of faces between two `usemtl` statements is re-expressed as one
//! [`GeometryRecord`] in which the normal and UV of vertex `i` are scattered
//! into slot `i` of position-indexed arrays.
use std::fs;
use std::path::{Path, PathBuf};

use nalgebra::{Point3, Vector2, Vector3};

use crate::error::{Attribute, LoadError, Result};
use crate::geometry::{GeometryRecord, SceneBounds};
use crate::material::{Material, MaterialLibrary};
use crate::tokens::{FaceCorner, LineTokens};

/// Which `usemtl` name a finished face group is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaterialBinding {
    /// The name that was active while the faces were read
    #[default]
    ActiveDuringGroup,
    /// The name given by the `usemtl` that closes the group. At end of file
    /// the active name is used.
    TerminatingName,
}

/// One drawable sub-mesh of a model
#[derive(Debug, Clone, PartialEq)]
pub struct MeshGroup {
    pub geometry: GeometryRecord,
    pub material: Material,
}

/// Everything a model file produced
#[derive(Debug, Clone, PartialEq)]
pub struct ObjModel {
    pub groups: Vec<MeshGroup>,
    pub materials: MaterialLibrary,
    /// `None` if the file had no `v` records
    pub bounds: Option<SceneBounds>,
}

/// Parser state for one model file.
///
/// Attribute streams are global to the file; the face list is reset each
/// time a group is emitted.
#[derive(Debug)]
pub struct ObjParser {
    path: PathBuf,
    dir: PathBuf,
    binding: MaterialBinding,
    positions: Vec<Point3<f32>>,
    normals: Vec<Vector3<f32>>,
    uvs: Vec<Vector2<f32>>,
    faces: Vec<[FaceCorner; 3]>,
    active_material: String,
    materials: MaterialLibrary,
    bounds: Option<SceneBounds>,
}

impl ObjParser {
    /// `path` names the model; `mtllib` and `map_Kd` paths resolve against
    /// its directory.
    pub fn new(path: impl Into<PathBuf>, binding: MaterialBinding) -> Self {
        let path = path.into();
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self {
            path,
            dir,
            binding,
            positions: Vec::new(),
            normals: Vec::new(),
            uvs: Vec::new(),
            faces: Vec::new(),
            active_material: String::new(),
            materials: MaterialLibrary::new(),
            bounds: None,
        }
    }

    /// Read and parse a model file
    pub fn load(path: &Path, binding: MaterialBinding) -> Result<ObjModel> {
        let source = fs::read_to_string(path).map_err(|e| LoadError::not_found(path, e))?;
        log::info!("Loading model: {}", path.display());
        Self::new(path, binding).parse(&source)
    }

    /// Parse complete model text
    pub fn parse(mut self, source: &str) -> Result<ObjModel> {
        let mut groups = Vec::new();
        for (line_no, line) in source.lines().enumerate() {
            if let Some(group) = self.parse_line(line_no + 1, line)? {
                groups.push(group);
            }
        }
        groups.extend(self.close_group(None)?);

        log::info!(
            "{}: {} groups, {} positions",
            self.path.display(),
            groups.len(),
            self.positions.len()
        );

        Ok(ObjModel {
            groups,
            materials: self.materials,
            bounds: self.bounds,
        })
    }

    /// Handle one line; returns the group it closed, if any
    pub fn parse_line(&mut self, line_no: usize, line: &str) -> Result<Option<MeshGroup>> {
        let mut words = line.split_whitespace();
        let Some(keyword) = words.next() else {
            return Ok(None);
        };
        if keyword.starts_with('#') {
            return Ok(None);
        }

        let mut tokens = LineTokens::new(&self.path, line_no, keyword, words);

        match keyword {
            "v" => {
                let p = Point3::from(tokens.vector3()?);
                SceneBounds::extend(&mut self.bounds, &p);
                self.positions.push(p);
            }
            "vt" => self.uvs.push(tokens.vector2()?),
            "vn" => self.normals.push(tokens.vector3()?),
            "f" => self.faces.push(tokens.triangle()?),
            "mtllib" => {
                for lib in tokens.remaining() {
                    let library = MaterialLibrary::load(&self.dir.join(lib), &self.dir)?;
                    self.materials.merge(library);
                }
            }
            "usemtl" => {
                let name = tokens.next_token().unwrap_or_default().to_string();
                let group = self.close_group(Some(&name))?;
                self.active_material = name;
                return Ok(group);
            }
            _ => log::debug!("Ignoring keyword {:?} on line {}", keyword, line_no),
        }

        Ok(None)
    }

    pub fn positions(&self) -> &[Point3<f32>] {
        &self.positions
    }

    pub fn pending_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn active_material(&self) -> &str {
        &self.active_material
    }

    pub fn bounds(&self) -> Option<SceneBounds> {
        self.bounds
    }

    /// Emit the accumulated faces as one group and reset the face list
    fn close_group(&mut self, terminating: Option<&str>) -> Result<Option<MeshGroup>> {
        if self.faces.is_empty() {
            return Ok(None);
        }

        let name = match (self.binding, terminating) {
            (MaterialBinding::TerminatingName, Some(name)) => name,
            _ => self.active_material.as_str(),
        };
        let material = self.materials.resolve(name).clone();
        let geometry = self.reconcile()?;

        log::debug!(
            "Group with material {:?}: {} triangles",
            material.name,
            geometry.triangle_count()
        );

        self.faces.clear();
        Ok(Some(MeshGroup { geometry, material }))
    }

    /// Scatter per-corner normals and UVs into position-indexed arrays.
    /// Slots no corner writes stay zero; the last corner to name a position
    /// wins.
    fn reconcile(&self) -> Result<GeometryRecord> {
        let n = self.positions.len();
        let mut geometry = GeometryRecord {
            positions: self.positions.clone(),
            normals: vec![Vector3::zeros(); n],
            uvs: vec![Vector2::zeros(); n],
            indices: Vec::with_capacity(self.faces.len() * 3),
        };

        for corner in self.faces.iter().flatten() {
            let slot = self.check(Attribute::Position, corner.position, n)?;
            if let Some(i) = corner.normal {
                geometry.normals[slot] = self.normals[self.check(Attribute::Normal, i, self.normals.len())?];
            }
            if let Some(i) = corner.uv {
                geometry.uvs[slot] = self.uvs[self.check(Attribute::Uv, i, self.uvs.len())?];
            }
            geometry.indices.push(slot as u32);
        }

        Ok(geometry)
    }

    fn check(&self, kind: Attribute, index: usize, len: usize) -> Result<usize> {
        if index < len {
            Ok(index)
        } else {
            Err(LoadError::IndexOutOfRange {
                path: self.path.clone(),
                kind,
                index,
                len,
            })
        }
    }
}
