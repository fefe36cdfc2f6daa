use nalgebra::{Matrix4, Point3, Vector3};

use crate::object::Primitive;
use crate::transform::{transform_point, transform_vector};

/// A half-line `origin + t * direction`. `direction` is not necessarily unit
/// length, so `t` is only a distance when it is.
#[derive(Clone, Debug, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self { origin, direction }
    }

    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }

    /// The same ray expressed through `m`. The direction keeps whatever
    /// length `m` gives it.
    pub fn transformed(&self, m: &Matrix4<f32>) -> Ray {
        Ray::new(transform_point(m, &self.origin), transform_vector(m, &self.direction))
    }
}

/// Nearest intersection of a world-space ray with the scene.
pub struct Hit<'a> {
    pub point: Point3<f32>,
    pub distance: f32,
    pub object: &'a Primitive,
}
