//! MTL material libraries
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use nalgebra::Vector3;

use crate::error::{LoadError, Result};
use crate::tokens::LineTokens;

/// Surface appearance: ambient, diffuse and specular colors plus an
/// optional diffuse texture
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
    pub shininess: f32,
    pub diffuse_texture: Option<PathBuf>,
}

impl Material {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Default for Material {
    /// White ambient and diffuse, no specular, no texture
    fn default() -> Self {
        Self {
            name: String::new(),
            ambient: Vector3::new(1.0, 1.0, 1.0),
            diffuse: Vector3::new(1.0, 1.0, 1.0),
            specular: Vector3::zeros(),
            shininess: 0.0,
            diffuse_texture: None,
        }
    }
}

/// Materials keyed by name. The unnamed material `""` is always present.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialLibrary {
    materials: HashMap<String, Material>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        let mut materials = HashMap::new();
        materials.insert(String::new(), Material::default());
        Self { materials }
    }

    pub fn get(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    /// The named material, or the default one if the name is unknown
    pub fn resolve(&self, name: &str) -> &Material {
        match self.materials.get(name) {
            Some(material) => material,
            None => {
                log::warn!("Unknown material {:?}, using default", name);
                &self.materials[""]
            }
        }
    }

    pub fn insert(&mut self, material: Material) {
        self.materials.insert(material.name.clone(), material);
    }

    /// Add every material of `other`, replacing same-named entries
    pub fn merge(&mut self, other: MaterialLibrary) {
        for (name, material) in other.materials {
            // an untouched default in `other` must not clobber ours
            if name.is_empty() && material == Material::default() {
                continue;
            }
            self.materials.insert(name, material);
        }
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.materials.keys().map(String::as_str)
    }

    /// Read an MTL file. `texture_dir` is what `map_Kd` paths resolve
    /// against.
    pub fn load(path: &Path, texture_dir: &Path) -> Result<Self> {
        let source = fs::read_to_string(path).map_err(|e| LoadError::not_found(path, e))?;
        log::info!("Loading materials: {}", path.display());
        Self::parse(&source, path, texture_dir)
    }

    /// Parse MTL text. `path` is only used in error reports.
    pub fn parse(source: &str, path: &Path, texture_dir: &Path) -> Result<Self> {
        let mut library = Self::new();
        // keywords before the first newmtl edit the default material
        let mut current = String::new();

        for (line_no, line) in source.lines().enumerate() {
            let mut words = line.split_whitespace();
            let Some(keyword) = words.next() else {
                continue;
            };
            if keyword.starts_with('#') {
                continue;
            }

            let mut tokens = LineTokens::new(path, line_no + 1, keyword, words);

            if keyword == "newmtl" {
                current = tokens.next_token().unwrap_or_default().to_string();
                library
                    .materials
                    .entry(current.clone())
                    .or_insert_with(|| Material::named(current.clone()));
                continue;
            }

            let Some(material) = library.materials.get_mut(&current) else {
                continue;
            };

            match keyword {
                "Ka" => material.ambient = tokens.vector3()?,
                "Kd" => material.diffuse = tokens.vector3()?,
                "Ks" => material.specular = tokens.vector3()?,
                "Ns" => material.shininess = tokens.next_float()?,
                "map_Kd" => {
                    // options such as `-s 1 1 1` precede the file name
                    let file = tokens
                        .remaining()
                        .last()
                        .copied()
                        .ok_or_else(|| tokens.error("map_Kd (missing value)"))?;
                    material.diffuse_texture = Some(texture_dir.join(file));
                }
                _ => log::debug!("Ignoring material keyword {:?}", keyword),
            }
        }

        Ok(library)
    }
}

impl Default for MaterialLibrary {
    fn default() -> Self {
        Self::new()
    }
}
