//! Per-frame scene state: orbit camera, light, and the matrices derived
//! from them
use nalgebra::{Matrix4, Point3, Vector3, Vector4};

use crate::geometry::SceneBounds;
use crate::projection::Camera;
use crate::transform::{Orbit, Transform};

/// Directional light plus ambient intensity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    /// Direction towards the light, not normalized
    pub direction: Vector3<f32>,
    pub ambient: f32,
}

impl Light {
    /// Step ambient intensity by 0.2, wrapping to 0 past 1
    pub fn cycle_ambient(&mut self) {
        self.ambient += 0.2;
        if self.ambient > 1.0 + 1e-4 {
            self.ambient = 0.0;
        }
    }
}

impl Default for Light {
    fn default() -> Self {
        Self {
            direction: Vector3::new(-1.0, -2.0, 2.0),
            ambient: 0.0,
        }
    }
}

/// Camera, light and viewport shared by every mesh drawn in a frame
#[derive(Debug, Clone)]
pub struct Scene {
    pub camera: Camera,
    pub orbit: Orbit,
    pub light: Light,
    /// Height over width of one viewport cell; 2 for terminal characters
    pub cell_aspect: f32,
    width: u32,
    height: u32,
    proj_from_world: Matrix4<f32>,
    world_from_proj: Matrix4<f32>,
}

impl Scene {
    pub fn new(width: u32, height: u32) -> Self {
        let mut scene = Self {
            camera: Camera::new(width, height),
            orbit: Orbit::default(),
            light: Light::default(),
            cell_aspect: 1.0,
            width,
            height,
            proj_from_world: Matrix4::identity(),
            world_from_proj: Matrix4::identity(),
        };
        scene.update_matrices();
        scene
    }

    /// Viewport measured in character cells
    pub fn for_terminal(columns: u32, rows: u32) -> Self {
        let mut scene = Self::new(columns, rows);
        scene.cell_aspect = 2.0;
        scene.resize(columns, rows);
        scene
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        let scaled = (height.max(1) as f32 * self.cell_aspect).round() as u32;
        self.camera.resize(width, scaled);
        self.update_matrices();
    }

    pub fn viewport(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn fit_to_bounds(&mut self, bounds: SceneBounds) {
        self.camera.fit_to_bounds(bounds);
        self.update_matrices();
    }

    /// Advance the orbit by `dt` seconds and rebuild the matrices
    pub fn update(&mut self, dt: f32) {
        self.orbit.advance(dt);
        self.update_matrices();
    }

    pub fn update_matrices(&mut self) {
        self.proj_from_world = self.camera.projection_matrix() * self.view_matrix();
        self.world_from_proj = Transform::inverse_or_identity(&self.proj_from_world);
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Transform::translation_matrix(0.0, 0.0, -self.camera.distance) * self.orbit.rotation_matrix()
    }

    pub fn proj_from_world(&self) -> &Matrix4<f32> {
        &self.proj_from_world
    }

    pub fn world_from_proj(&self) -> &Matrix4<f32> {
        &self.world_from_proj
    }

    /// Camera position in world space
    pub fn eye(&self) -> Point3<f32> {
        Transform::inverse_or_identity(&self.view_matrix()).transform_point(&Point3::origin())
    }

    /// World-space ray through normalized device coordinates, starting on
    /// the near plane. The direction is unit length.
    pub fn ray_through(&self, ndc_x: f32, ndc_y: f32) -> Option<(Point3<f32>, Vector3<f32>)> {
        let unproject = |z: f32| {
            Point3::from_homogeneous(self.world_from_proj * Vector4::new(ndc_x, ndc_y, z, 1.0))
        };
        let near = unproject(-1.0)?;
        let far = unproject(1.0)?;
        let dir = (far - near).try_normalize(f32::EPSILON)?;
        Some((near, dir))
    }

    /// Project a model-space point to screen coordinates and NDC depth.
    ///
    /// Points behind the eye or outside the depth range give `None`;
    /// points off the sides of the screen are still returned.
    pub fn project(&self, point: &Point3<f32>, world_from_model: &Matrix4<f32>) -> Option<(f32, f32, f32)> {
        let clip = self.proj_from_world * world_from_model * point.to_homogeneous();

        // Prevent division by near-zero depth values
        if clip.w < 1e-6 {
            return None;
        }

        let ndc = clip.xyz() / clip.w;
        if ndc.z < -1.0 || ndc.z > 1.0 {
            return None;
        }

        // Convert to screen space
        let screen_x = (ndc.x + 1.0) * 0.5 * self.width as f32;
        let screen_y = (1.0 - ndc.y) * 0.5 * self.height as f32;

        Some((screen_x, screen_y, ndc.z))
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(800, 600)
    }
}
