use nalgebra::{Matrix4, Point3, Vector3};

use crate::material::Material;
use crate::ray::Ray;
use crate::transform::{transform_normal, transform_point};

pub const EPSILON: f32 = 1e-6;

/// Hits closer than this along the ray are discarded so that rays leaving a
/// surface do not immediately hit it again.
pub const NEAR_CLIP: f32 = 1e-2;

#[derive(Clone, Debug, PartialEq)]
pub struct Sphere {
    pub center: Point3<f32>,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Point3<f32>, radius: f32) -> Self {
        Sphere { center, radius }
    }

    /// Ray parameter of the nearer root, in the ray's own units.
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        let oc = ray.origin - self.center;
        let a = ray.direction.magnitude_squared();
        let b = 2.0 * ray.direction.dot(&oc);
        let c = oc.magnitude_squared() - self.radius * self.radius;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < -EPSILON {
            return None;
        }
        // tangent rays can land slightly below zero
        let sqrtd = discriminant.abs().sqrt();

        let t = f32::min((-b - sqrtd) / (2.0 * a), (-b + sqrtd) / (2.0 * a));
        (t >= NEAR_CLIP).then_some(t)
    }

    /// Outward normal at an object-space point, not normalized.
    pub fn normal(&self, point: &Point3<f32>) -> Vector3<f32> {
        point - self.center
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Triangle {
    pub vertices: [Point3<f32>; 3],
    pub normals: [Vector3<f32>; 3],
}

impl Triangle {
    /// A flat-shaded triangle: every vertex carries the face normal.
    pub fn new(a: Point3<f32>, b: Point3<f32>, c: Point3<f32>) -> Self {
        let face = (b - a).cross(&(c - a));
        Triangle { vertices: [a, b, c], normals: [face; 3] }
    }

    pub fn with_normals(vertices: [Point3<f32>; 3], normals: [Vector3<f32>; 3]) -> Self {
        Triangle { vertices, normals }
    }

    pub fn face_normal(&self) -> Vector3<f32> {
        let [a, b, c] = &self.vertices;
        (b - a).cross(&(c - a))
    }

    /// Weights `(alpha, beta, gamma)` of `point` against the vertices. Only
    /// meaningful for points on the triangle's plane.
    pub fn barycentric(&self, point: &Point3<f32>) -> Vector3<f32> {
        let [a, b, c] = &self.vertices;
        let n = self.face_normal();
        let nn = n.dot(&n);
        let beta = n.dot(&(c - point).cross(&(a - point))) / nn;
        let gamma = n.dot(&(a - point).cross(&(b - point))) / nn;
        Vector3::new(1.0 - beta - gamma, beta, gamma)
    }

    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        let n = self.face_normal();
        let denominator = ray.direction.dot(&n);
        if denominator.abs() <= EPSILON {
            return None;
        }

        let t = (self.vertices[0] - ray.origin).dot(&n) / denominator;
        if t < NEAR_CLIP {
            return None;
        }

        let weights = self.barycentric(&ray.at(t));
        let inside = weights.iter().all(|w| -EPSILON < *w && *w < 1.0 + EPSILON);
        inside.then_some(t)
    }

    /// Vertex normals blended at an object-space point, not normalized.
    pub fn normal(&self, point: &Point3<f32>) -> Vector3<f32> {
        let weights = self.barycentric(point);
        self.normals[0] * weights.x + self.normals[1] * weights.y + self.normals[2] * weights.z
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Sphere(Sphere),
    Triangle(Triangle),
}

impl Shape {
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        match self {
            Shape::Sphere(sphere) => sphere.intersect(ray),
            Shape::Triangle(triangle) => triangle.intersect(ray),
        }
    }

    pub fn normal(&self, point: &Point3<f32>) -> Vector3<f32> {
        match self {
            Shape::Sphere(sphere) => sphere.normal(point),
            Shape::Triangle(triangle) => triangle.normal(point),
        }
    }
}

/// A shape placed in the world by its own transform.
///
/// The inverse is computed once at construction and the fields are private,
/// so it always matches the transform.
#[derive(Clone, Debug)]
pub struct Primitive {
    shape: Shape,
    transform: Matrix4<f32>,
    inverse: Matrix4<f32>,
    material: Material,
}

impl Primitive {
    /// `None` when `transform` is singular.
    pub fn new(shape: Shape, transform: Matrix4<f32>, material: Material) -> Option<Self> {
        let inverse = transform.try_inverse()?;
        Some(Primitive { shape, transform, inverse, material })
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn transform(&self) -> &Matrix4<f32> {
        &self.transform
    }

    pub fn inverse(&self) -> &Matrix4<f32> {
        &self.inverse
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    /// World-space hit point of a world-space ray, if any.
    pub fn intersect(&self, ray: &Ray) -> Option<Point3<f32>> {
        let local = ray.transformed(&self.inverse);
        let t = self.shape.intersect(&local)?;
        Some(transform_point(&self.transform, &local.at(t)))
    }

    /// World-space normal at a world-space point on the surface, not
    /// normalized.
    pub fn normal_at(&self, point: &Point3<f32>) -> Vector3<f32> {
        let local = transform_point(&self.inverse, point);
        transform_normal(&self.inverse, &self.shape.normal(&local))
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::{point, vector};

    use crate::transform::{scale, translate};

    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    fn unit_triangle() -> Triangle {
        Triangle::new(point![0.0, 0.0, 0.0], point![1.0, 0.0, 0.0], point![0.0, 1.0, 0.0])
    }

    #[test]
    fn sphere_hit_through_center_is_distance_minus_radius() {
        let sphere = Sphere::new(point![1.0, 2.0, -3.0], 1.5);
        let origins = [point![1.0, 2.0, 7.0], point![-4.0, 0.0, 0.0], point![6.0, 6.0, -1.0]];
        for origin in origins {
            let direction = (sphere.center - origin).normalize();
            let t = sphere.intersect(&Ray::new(origin, direction)).unwrap();
            assert!(close(t, (sphere.center - origin).norm() - sphere.radius), "t = {}", t);
        }
    }

    #[test]
    fn sphere_miss_and_behind() {
        let sphere = Sphere::new(Point3::origin(), 1.0);
        let miss = Ray::new(point![0.0, 2.0, 5.0], vector![0.0, 0.0, -1.0]);
        assert_eq!(sphere.intersect(&miss), None);
        let behind = Ray::new(point![0.0, 0.0, 5.0], vector![0.0, 0.0, 1.0]);
        assert_eq!(sphere.intersect(&behind), None);
    }

    #[test]
    fn ray_leaving_sphere_surface_does_not_hit_it() {
        let sphere = Sphere::new(Point3::origin(), 1.0);
        let outward = Ray::new(point![0.0, 0.0, 1.0], vector![0.0, 0.0, 1.0]);
        assert_eq!(sphere.intersect(&outward), None);
    }

    #[test]
    fn sphere_hit_accepts_unnormalized_direction() {
        let sphere = Sphere::new(Point3::origin(), 1.0);
        let ray = Ray::new(point![0.0, 0.0, 5.0], vector![0.0, 0.0, -4.0]);
        let t = sphere.intersect(&ray).unwrap();
        assert!(close(t, 1.0));
        assert_eq!(ray.at(t), point![0.0, 0.0, 1.0]);
    }

    #[test]
    fn triangle_hit_weights_locate_the_hit() {
        let triangle = unit_triangle();
        let direction = vector![0.1, -0.05, -1.0];
        for (x, y) in [(0.4, 0.2), (0.1, 0.8), (0.45, 0.45), (0.05, 0.05), (0.53, 0.23)] {
            // aim so the ray crosses z = 0 at (x, y)
            let origin = point![x - 2.0 * direction.x, y - 2.0 * direction.y, 2.0];
            let ray = Ray::new(origin, direction);
            let t = triangle.intersect(&ray).unwrap_or_else(|| panic!("missed ({}, {})", x, y));
            assert!(close(t, 2.0));
            let weights = triangle.barycentric(&ray.at(t));
            assert!(close(weights.sum(), 1.0));
            assert!(close(weights.y, x) && close(weights.z, y), "{:?}", weights);
        }
    }

    #[test]
    fn triangle_misses_outside_and_parallel() {
        let triangle = unit_triangle();
        let outside = Ray::new(point![0.8, 0.8, 1.0], vector![0.0, 0.0, -1.0]);
        assert_eq!(triangle.intersect(&outside), None);
        let parallel = Ray::new(point![-1.0, 0.2, 0.0], vector![1.0, 0.0, 0.0]);
        assert_eq!(triangle.intersect(&parallel), None);
        let behind = Ray::new(point![0.2, 0.2, 1.0], vector![0.0, 0.0, 1.0]);
        assert_eq!(triangle.intersect(&behind), None);
    }

    #[test]
    fn triangle_normals_blend_by_weight() {
        let flat = unit_triangle();
        let n = flat.normal(&point![0.3, 0.3, 0.0]);
        assert!(close(n.x, 0.0) && close(n.y, 0.0) && close(n.z, 1.0));

        let smooth = Triangle::with_normals(
            flat.vertices,
            [vector![1.0, 0.0, 0.0], vector![0.0, 1.0, 0.0], vector![0.0, 0.0, 1.0]],
        );
        let n = smooth.normal(&point![0.25, 0.5, 0.0]);
        assert!(close(n.x, 0.25) && close(n.y, 0.25) && close(n.z, 0.5));
    }

    #[test]
    fn primitive_hits_in_world_space() {
        let sphere = Shape::Sphere(Sphere::new(Point3::origin(), 1.0));
        let primitive = Primitive::new(sphere, translate(0.0, 0.0, -2.0) * scale(2.0, 2.0, 2.0), Material::default()).unwrap();
        assert!((primitive.transform() * primitive.inverse() - Matrix4::identity()).norm() < 1e-6);
        let ray = Ray::new(point![0.0, 0.0, 5.0], vector![0.0, 0.0, -1.0]);
        let hit = primitive.intersect(&ray).unwrap();
        assert!((hit - point![0.0, 0.0, 0.0]).norm() < 1e-4);
        let normal = primitive.normal_at(&hit).normalize();
        assert!((normal - vector![0.0, 0.0, 1.0]).norm() < 1e-4);
    }

    #[test]
    fn non_uniform_scale_keeps_normals_perpendicular() {
        let sphere = Shape::Sphere(Sphere::new(Point3::origin(), 1.0));
        let primitive = Primitive::new(sphere, scale(3.0, 1.0, 1.0), Material::default()).unwrap();
        // on the ellipsoid x^2/9 + y^2 = 1 the gradient is (2x/9, 2y, 0)
        let angle = 0.6f32;
        let point = point![3.0 * angle.cos(), angle.sin(), 0.0];
        let normal = primitive.normal_at(&point).normalize();
        let expected = vector![point.x / 9.0, point.y, 0.0].normalize();
        assert!((normal - expected).norm() < 1e-4);
    }

    #[test]
    fn singular_transform_is_rejected() {
        let sphere = Shape::Sphere(Sphere::new(Point3::origin(), 1.0));
        assert!(Primitive::new(sphere, scale(0.0, 1.0, 1.0), Material::default()).is_none());
    }
}
