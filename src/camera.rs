//! Camera that flies along the tunnel path.

use glam::{Mat4, Vec3};

use crate::path::TunnelPath;

/// A perspective camera riding a [`TunnelPath`].
///
/// The camera's position is entirely determined by `percentage`: the eye sits
/// on the curve at that arc-length fraction (wrapped into the loop) and looks
/// at the point `lookahead` further along, so it always faces down the tube.
pub struct FlightCamera {
    /// Arc-length fraction of the flight. Grows without bound; sampled mod 1.
    pub percentage: f32,
    /// Fraction added per accepted frame.
    pub speed: f32,
    /// How far ahead of the eye the look-at target sits.
    pub lookahead: f32,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl FlightCamera {
    pub fn new(aspect: f32) -> Self {
        Self {
            percentage: 0.0,
            speed: 0.0005,
            lookahead: 0.01,
            fov_y: 45.0_f32.to_radians(),
            aspect,
            near: 0.1,
            far: 150.0,
        }
    }

    /// Move one frame further along the loop.
    pub fn advance(&mut self) {
        self.percentage += self.speed;
    }

    /// Rewind the flight to the start of the loop.
    pub fn reset(&mut self) {
        self.percentage = 0.0;
    }

    /// Eye position: the point on the curve at the current percentage.
    pub fn eye(&self, path: &TunnelPath) -> Vec3 {
        path.point_at(self.percentage.rem_euclid(1.0))
    }

    /// Look-at target: the point slightly further along the curve.
    pub fn target(&self, path: &TunnelPath) -> Vec3 {
        path.point_at((self.percentage + self.lookahead).rem_euclid(1.0))
    }

    pub fn view_matrix(&self, path: &TunnelPath) -> Mat4 {
        Mat4::look_at_rh(self.eye(path), self.target(path), Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    /// Update the aspect ratio from a new surface size. Zero sizes (minimized
    /// windows) are ignored.
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }
}
