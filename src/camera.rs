use nalgebra::{point, Matrix4, Point3, Vector3};

use crate::ray::Ray;
use crate::transform::{self, camera_basis};

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub eye: Point3<f32>,
    pub center: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in degrees.
    pub fovy: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Camera::new(point![0.0, 0.0, 5.0], Point3::origin(), Vector3::y(), 90.0)
    }
}

impl Camera {
    pub fn new(eye: Point3<f32>, center: Point3<f32>, up: Vector3<f32>, fovy: f32) -> Self {
        Camera { eye, center, up, fovy }
    }

    /// Primary ray through the raster position `(row, col)`, with row 0 at
    /// the top of the image. Pixel centers sit at half-integer positions.
    pub fn ray_through_pixel(&self, row: f32, col: f32, height: u32, width: u32) -> Ray {
        let (u, v, w) = camera_basis(&self.eye, &self.center, &self.up);
        let half_height = height as f32 / 2.0;
        let half_width = width as f32 / 2.0;

        let tan_y = (self.fovy.to_radians() / 2.0).tan();
        let tan_x = tan_y * width as f32 / height as f32;
        let alpha = tan_x * (col - half_width) / half_width;
        let beta = tan_y * (half_height - row) / half_height;

        Ray::new(self.eye, alpha * u + beta * v - w)
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        transform::look_at(&self.eye, &self.center, &self.up)
    }

    pub fn projection(&self, aspect: f32, z_near: f32, z_far: f32) -> Matrix4<f32> {
        transform::perspective(self.fovy, aspect, z_near, z_far)
    }

    /// Swings the eye sideways around `center`.
    pub fn orbit_left(&mut self, degrees: f32) {
        let mut eye = Point3::from(self.eye - self.center);
        transform::left(degrees, &mut eye, &self.up);
        self.eye = self.center + eye.coords;
    }

    /// Swings the eye over the top of `center`, tilting `up` with it.
    pub fn orbit_up(&mut self, degrees: f32) {
        let mut eye = Point3::from(self.eye - self.center);
        transform::up(degrees, &mut eye, &mut self.up);
        self.eye = self.center + eye.coords;
    }
}
