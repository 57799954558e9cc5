//! Camera and projection utilities
use nalgebra::Matrix4;

use crate::geometry::SceneBounds;

/// Smallest near plane the auto-fit will produce
const MIN_NEAR: f32 = 0.1;

/// Perspective camera that sits `distance` units from the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub distance: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            distance: 500.0,
            fov: std::f32::consts::PI / 4.0, // 45 degrees
            aspect: width as f32 / height.max(1) as f32,
            near: 1.0,
            far: 1000.0,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
    }

    /// Place the camera so a model spanning `bounds` fits in view
    pub fn fit_to_bounds(&mut self, bounds: SceneBounds) {
        let SceneBounds { min, max } = bounds;

        self.distance = 2.0 * max - min;
        self.far = max + self.distance;
        self.near = if min < 0.0 {
            2.0 * min + self.distance
        } else {
            self.distance - 2.0 * min
        };

        self.near = self.near.max(MIN_NEAR);
        if self.far <= self.near {
            self.far = self.near * 2.0 + 1.0;
        }
        log::debug!(
            "Camera fit: distance {} near {} far {}",
            self.distance,
            self.near,
            self.far
        );
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}
