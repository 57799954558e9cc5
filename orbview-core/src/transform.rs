//! Orbit angles and model transforms
use nalgebra::{Matrix4, Vector3};

/// Pan (around z) and tilt (around x) of the orbiting camera, in radians,
/// with keyboard-driven angular rates in radians per second
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    pub pan: f32,
    pub tilt: f32,
    pub pan_rate: f32,
    pub tilt_rate: f32,
}

impl Orbit {
    pub fn new(pan: f32, tilt: f32) -> Self {
        Self {
            pan,
            tilt,
            pan_rate: 0.0,
            tilt_rate: 0.0,
        }
    }

    /// Apply the current rates over `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        self.pan += self.pan_rate * dt;
        self.tilt += self.tilt_rate * dt;
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dpan: f32, dtilt: f32) {
        self.pan += dpan;
        self.tilt += dtilt;
    }

    pub fn stop(&mut self) {
        self.pan_rate = 0.0;
        self.tilt_rate = 0.0;
    }

    /// Tilt applied after pan: `Rx(tilt) * Rz(pan)`
    pub fn rotation_matrix(&self) -> Matrix4<f32> {
        let rx = Matrix4::new_rotation(Vector3::new(self.tilt, 0.0, 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, self.pan));
        rx * rz
    }
}

impl Default for Orbit {
    /// Looking down at the scene from slightly above the horizon
    fn default() -> Self {
        Self::new(0.0, -1.4)
    }
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Create a translation matrix
    pub fn translation_matrix(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    /// Create a scale matrix
    pub fn scale_matrix(sx: f32, sy: f32, sz: f32) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz))
    }

    /// Inverse of an affine model matrix, identity if it is singular
    pub fn inverse_or_identity(m: &Matrix4<f32>) -> Matrix4<f32> {
        m.try_inverse().unwrap_or_else(Matrix4::identity)
    }
}
