//! orbview core library
//!
//! Model loading (OBJ, MTL, PPM), per-triangle ray intersection and the
//! mesh and scene types shared by the renderers. Nothing here draws; drawing
//! goes through [`RenderTarget`].

pub mod error;
pub mod geometry;
pub mod intersect;
pub mod loader;
pub mod material;
pub mod mesh;
pub mod obj;
pub mod primitives;
pub mod projection;
pub mod scene;
pub mod texture;
mod tokens;
pub mod transform;

// Re-export commonly used types
pub use error::{Attribute, InconsistentGeometry, LoadError, Result};
pub use geometry::{GeometryRecord, SceneBounds, Triangle};
pub use intersect::{HitPolicy, IntersectionRecord, Intersector, FAR_BOUND, NO_INTERSECTION};
pub use loader::{load_model, load_models, LoadOptions, LoadReport, LoadedModel};
pub use material::{Material, MaterialLibrary};
pub use mesh::{Mesh, MeshKind, RenderTarget};
pub use obj::{MaterialBinding, MeshGroup, ObjModel, ObjParser};
pub use projection::Camera;
pub use scene::{Light, Scene};
pub use texture::Texture;
pub use transform::{Orbit, Transform};
