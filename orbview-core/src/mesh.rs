//! Drawable meshes
use nalgebra::{Matrix4, Point3, Vector2, Vector3};

use crate::error::InconsistentGeometry;
use crate::geometry::GeometryRecord;
use crate::intersect::{HitPolicy, Intersector, NO_INTERSECTION};
use crate::material::Material;
use crate::primitives;
use crate::scene::Scene;
use crate::texture::Texture;
use crate::transform::Transform;

/// Which constructor produced a mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshKind {
    Sphere,
    Plane,
    Triangle,
    Parsed,
}

impl std::fmt::Display for MeshKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeshKind::Sphere => write!(f, "sphere"),
            MeshKind::Plane => write!(f, "plane"),
            MeshKind::Triangle => write!(f, "triangle mesh"),
            MeshKind::Parsed => write!(f, "model"),
        }
    }
}

/// Something that can draw a mesh, such as a rasterizer or a GPU backend
pub trait RenderTarget {
    fn draw_mesh(&mut self, mesh: &Mesh, scene: &Scene);
}

/// One geometry record with its material, texture and model transform.
///
/// Geometry and intersection records are fixed at construction; only the
/// transform changes afterwards.
#[derive(Debug, Clone)]
pub struct Mesh {
    kind: MeshKind,
    geometry: GeometryRecord,
    intersector: Option<Intersector>,
    material: Material,
    texture: Texture,
    world_from_model: Matrix4<f32>,
    model_from_world: Matrix4<f32>,
}

impl Mesh {
    fn build(
        kind: MeshKind,
        geometry: GeometryRecord,
        intersector: Option<Intersector>,
        material: Material,
        texture: Texture,
    ) -> Self {
        Self {
            kind,
            geometry,
            intersector,
            material,
            texture,
            world_from_model: Matrix4::identity(),
            model_from_world: Matrix4::identity(),
        }
    }

    /// Latitude/longitude sphere that orbits the scene; no intersection
    /// support
    pub fn sphere(width: u32, height: u32, size: Vector3<f32>, texture: Texture) -> Self {
        let geometry = primitives::sphere(width, height, size);
        Self::build(MeshKind::Sphere, geometry, None, Material::default(), texture)
    }

    pub fn plane(size: Vector2<f32>, texture: Texture, policy: HitPolicy) -> Self {
        let geometry = primitives::plane(size);
        let intersector = Intersector::from_geometry(&geometry, policy);
        Self::build(
            MeshKind::Plane,
            geometry,
            Some(intersector),
            Material::default(),
            texture,
        )
    }

    /// Mesh from prepared arrays, drawn but not pickable. Fails if the arrays
    /// disagree in length or an index is out of range.
    pub fn triangle(
        geometry: GeometryRecord,
        material: Material,
        texture: Texture,
    ) -> Result<Self, InconsistentGeometry> {
        geometry.validate()?;
        Ok(Self::build(MeshKind::Triangle, geometry, None, material, texture))
    }

    /// Mesh from a parsed model group, with intersection records
    pub fn parsed(
        geometry: GeometryRecord,
        material: Material,
        texture: Texture,
        policy: HitPolicy,
    ) -> Result<Self, InconsistentGeometry> {
        geometry.validate()?;
        let intersector = Intersector::from_geometry(&geometry, policy);
        Ok(Self::build(MeshKind::Parsed, geometry, Some(intersector), material, texture))
    }

    pub fn kind(&self) -> MeshKind {
        self.kind
    }

    pub fn geometry(&self) -> &GeometryRecord {
        &self.geometry
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    pub fn intersector(&self) -> Option<&Intersector> {
        self.intersector.as_ref()
    }

    pub fn world_from_model(&self) -> &Matrix4<f32> {
        &self.world_from_model
    }

    pub fn model_from_world(&self) -> &Matrix4<f32> {
        &self.model_from_world
    }

    pub fn set_transform(&mut self, world_from_model: Matrix4<f32>) {
        self.model_from_world = Transform::inverse_or_identity(&world_from_model);
        self.world_from_model = world_from_model;
    }

    /// Per-frame state for this mesh. The sphere circles the scene at
    /// radius 100; every other kind keeps its transform.
    pub fn set_render_state(&mut self, _scene: &Scene, now: f64) {
        if self.kind == MeshKind::Sphere {
            let t = now as f32;
            self.set_transform(Transform::translation_matrix(
                100.0 * t.cos(),
                100.0 * t.sin(),
                100.0,
            ));
        }
    }

    pub fn draw<R: RenderTarget + ?Sized>(&mut self, target: &mut R, scene: &Scene, now: f64) {
        self.set_render_state(scene, now);
        target.draw_mesh(self, scene);
    }

    /// Ray parameter of the hit with a world-space ray, if any. The ray is
    /// mapped into model space, which keeps `t` unchanged for affine
    /// transforms.
    pub fn try_intersect(&self, origin: &Point3<f32>, dir: &Vector3<f32>, near: f32) -> Option<f32> {
        let intersector = self.intersector.as_ref()?;
        let local_origin = self.model_from_world.transform_point(origin);
        let local_dir = self.model_from_world.transform_vector(dir);
        intersector.try_intersect(&local_origin, &local_dir, near)
    }

    /// Hit distance, or [`NO_INTERSECTION`] for a miss or a mesh without
    /// intersection records
    pub fn intersect(&self, origin: &Point3<f32>, dir: &Vector3<f32>, near: f32) -> f32 {
        self.try_intersect(origin, dir, near)
            .unwrap_or(NO_INTERSECTION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct Recorder {
        drawn: Vec<(MeshKind, Matrix4<f32>)>,
    }

    impl RenderTarget for Recorder {
        fn draw_mesh(&mut self, mesh: &Mesh, _scene: &Scene) {
            self.drawn.push((mesh.kind(), *mesh.world_from_model()));
        }
    }

    fn down() -> Vector3<f32> {
        Vector3::new(0.0, 0.0, -1.0)
    }

    #[test]
    fn test_plane_intersects() {
        let plane = Mesh::plane(Vector2::new(2.0, 2.0), Texture::placeholder(), HitPolicy::Closest);
        assert_eq!(plane.kind(), MeshKind::Plane);
        let t = plane.intersect(&Point3::new(0.0, 0.0, 10.0), &down(), 0.0);
        assert_relative_eq!(t, 10.0, epsilon = 1e-5);
    }

    #[test]
    fn test_sphere_has_no_intersection_support() {
        let sphere = Mesh::sphere(8, 4, Vector3::new(5.0, 5.0, 5.0), Texture::placeholder());
        assert!(sphere.intersector().is_none());
        let t = sphere.intersect(&Point3::new(0.0, 0.0, 50.0), &down(), 0.0);
        assert_eq!(t, NO_INTERSECTION);
    }

    #[test]
    fn test_triangle_variant_matches_parsed_geometry() {
        let geometry = primitives::plane(Vector2::new(1.0, 1.0));
        let tri = Mesh::triangle(geometry.clone(), Material::default(), Texture::placeholder()).unwrap();
        let parsed =
            Mesh::parsed(geometry, Material::default(), Texture::placeholder(), HitPolicy::Closest).unwrap();
        assert_eq!(tri.geometry(), parsed.geometry());
        assert!(tri.intersector().is_none());
        assert_eq!(parsed.intersector().unwrap().records().len(), 2);
    }

    #[test]
    fn test_out_of_range_index_is_rejected() {
        let mut geometry = GeometryRecord::new();
        for p in [Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)] {
            geometry.push_vertex(p, Vector3::z(), Vector2::zeros());
        }
        geometry.push_triangle(0, 1, 7);

        let err = Mesh::parsed(
            geometry.clone(),
            Material::default(),
            Texture::placeholder(),
            HitPolicy::Closest,
        )
        .unwrap_err();
        assert_eq!(err.max_index, Some(7));
        assert!(Mesh::triangle(geometry, Material::default(), Texture::placeholder()).is_err());
    }

    #[test]
    fn test_intersect_follows_transform() {
        let mut plane = Mesh::plane(Vector2::new(2.0, 2.0), Texture::placeholder(), HitPolicy::Closest);
        plane.set_transform(Transform::translation_matrix(0.0, 0.0, 4.0));
        let t = plane.intersect(&Point3::new(0.0, 0.0, 10.0), &down(), 0.0);
        assert_relative_eq!(t, 6.0, epsilon = 1e-5);

        // moved out from under the ray
        plane.set_transform(Transform::translation_matrix(5.0, 0.0, 0.0));
        let t = plane.intersect(&Point3::new(0.0, 0.0, 10.0), &down(), 0.0);
        assert_eq!(t, NO_INTERSECTION);
    }

    #[test]
    fn test_sphere_orbits_when_drawn() {
        let scene = Scene::default();
        let mut sphere = Mesh::sphere(4, 2, Vector3::new(1.0, 1.0, 1.0), Texture::placeholder());
        let mut plane = Mesh::plane(Vector2::new(1.0, 1.0), Texture::placeholder(), HitPolicy::Closest);
        let mut target = Recorder { drawn: Vec::new() };

        sphere.draw(&mut target, &scene, 0.0);
        plane.draw(&mut target, &scene, 0.0);
        sphere.draw(&mut target, &scene, std::f64::consts::FRAC_PI_2);

        assert_eq!(target.drawn.len(), 3);
        let at = |m: &Matrix4<f32>| m.transform_point(&Point3::origin());
        assert_relative_eq!(at(&target.drawn[0].1), Point3::new(100.0, 0.0, 100.0), epsilon = 1e-3);
        assert_eq!(target.drawn[1].1, Matrix4::identity());
        assert_relative_eq!(at(&target.drawn[2].1), Point3::new(0.0, 100.0, 100.0), epsilon = 1e-3);
    }
}
