//! Turning model files into drawable meshes
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{LoadError, Result};
use crate::geometry::SceneBounds;
use crate::intersect::HitPolicy;
use crate::mesh::Mesh;
use crate::obj::{MaterialBinding, ObjParser};
use crate::texture::Texture;

/// Settings shared by every model in one load
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub hit_policy: HitPolicy,
    pub binding: MaterialBinding,
    /// Base directory for relative model paths
    pub data_dir: Option<PathBuf>,
}

impl LoadOptions {
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.data_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// Meshes built from one model file, one per material group
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub path: PathBuf,
    pub meshes: Vec<Mesh>,
    pub bounds: Option<SceneBounds>,
}

/// Outcome of loading several files. A failure in one file does not stop
/// the others.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub models: Vec<LoadedModel>,
    pub failures: Vec<LoadError>,
}

impl LoadReport {
    /// Combined bounds of every loaded model
    pub fn bounds(&self) -> Option<SceneBounds> {
        self.models
            .iter()
            .filter_map(|m| m.bounds)
            .reduce(SceneBounds::union)
    }

    pub fn meshes(&self) -> impl Iterator<Item = &Mesh> {
        self.models.iter().flat_map(|m| m.meshes.iter())
    }

    pub fn into_meshes(self) -> Vec<Mesh> {
        self.models.into_iter().flat_map(|m| m.meshes).collect()
    }
}

/// Textures already read in this load, keyed by path
#[derive(Debug, Default)]
struct TextureCache {
    textures: HashMap<PathBuf, Texture>,
}

impl TextureCache {
    /// A texture that cannot be read is replaced by the placeholder
    fn get(&mut self, path: Option<&Path>) -> Texture {
        let Some(path) = path else {
            return Texture::placeholder();
        };
        if let Some(texture) = self.textures.get(path) {
            return texture.clone();
        }
        let texture = Texture::load(path).unwrap_or_else(|e| {
            log::warn!("{}; using a blank texture", e);
            Texture::placeholder()
        });
        self.textures.insert(path.to_path_buf(), texture.clone());
        texture
    }
}

fn load_with_cache(path: &Path, opts: &LoadOptions, cache: &mut TextureCache) -> Result<LoadedModel> {
    let path = opts.resolve(path);
    let model = ObjParser::load(&path, opts.binding)?;

    let meshes = model
        .groups
        .into_iter()
        .map(|group| {
            let texture = cache.get(group.material.diffuse_texture.as_deref());
            Mesh::parsed(group.geometry, group.material, texture, opts.hit_policy).map_err(|source| {
                LoadError::Geometry {
                    path: path.clone(),
                    source,
                }
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(LoadedModel {
        path,
        meshes,
        bounds: model.bounds,
    })
}

/// Load one model file with its materials and textures
pub fn load_model(path: &Path, opts: &LoadOptions) -> Result<LoadedModel> {
    load_with_cache(path, opts, &mut TextureCache::default())
}

/// Load every file in `paths`, collecting failures instead of stopping
pub fn load_models<P: AsRef<Path>>(paths: &[P], opts: &LoadOptions) -> LoadReport {
    let mut cache = TextureCache::default();
    let mut report = LoadReport::default();

    for path in paths {
        match load_with_cache(path.as_ref(), opts, &mut cache) {
            Ok(model) => report.models.push(model),
            Err(e) => {
                log::error!("{}", e);
                report.failures.push(e);
            }
        }
    }

    report
}
