use nalgebra::{Point3, Vector3};

use crate::picture::Color;

/// Phong surface description, copied into each primitive when it is created.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Material {
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
    pub emission: Color,
    pub shininess: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightKind {
    Directional,
    Point,
}

/// For a point light `position_or_direction` is its position. For a
/// directional light it is the direction pointing toward the light.
#[derive(Clone, Debug, PartialEq)]
pub struct Light {
    pub position_or_direction: Vector3<f32>,
    pub color: Color,
    pub kind: LightKind,
}

impl Light {
    pub fn point(position: Point3<f32>, color: Color) -> Self {
        Light { position_or_direction: position.coords, color, kind: LightKind::Point }
    }

    pub fn directional(direction: Vector3<f32>, color: Color) -> Self {
        Light { position_or_direction: direction, color, kind: LightKind::Directional }
    }

    pub fn position(&self) -> Point3<f32> {
        Point3::from(self.position_or_direction)
    }

    pub fn direction(&self) -> Vector3<f32> {
        self.position_or_direction
    }

    /// Unit vector from `point` toward the light.
    pub fn direction_from(&self, point: &Point3<f32>) -> Vector3<f32> {
        match self.kind {
            LightKind::Point => (self.position() - point).normalize(),
            LightKind::Directional => self.direction().normalize(),
        }
    }
}

/// Point light falloff `1 / (constant + linear * d + quadratic * d^2)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Default for Attenuation {
    fn default() -> Self {
        Attenuation { constant: 1.0, linear: 0.0, quadratic: 0.0 }
    }
}

impl Attenuation {
    pub fn factor(&self, distance: f32) -> f32 {
        1.0 / (self.constant + self.linear * distance + self.quadratic * distance * distance)
    }
}
