//! Matrix builders and homogeneous helpers shared by the scene builder, the
//! camera and the intersection code.
//!
//! Everything uses the column-vector convention: a transform `M` maps a point
//! `p` to `M * p`, and composing `A * B` applies `B` first.

use nalgebra::{point, Matrix3, Matrix4, Point3, Vector3};

/// Rodrigues rotation of `degrees` about `axis`.
///
/// `axis` must already be unit length. A non-normalized axis still yields a
/// matrix, but not a rotation.
pub fn rotate(degrees: f32, axis: &Vector3<f32>) -> Matrix3<f32> {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Matrix3::identity() * cos + (axis * axis.transpose()) * (1.0 - cos) + axis.cross_matrix() * sin
}

pub fn scale(sx: f32, sy: f32, sz: f32) -> Matrix4<f32> {
    Matrix4::new(
        sx, 0.0, 0.0, 0.0,
        0.0, sy, 0.0, 0.0,
        0.0, 0.0, sz, 0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

pub fn translate(tx: f32, ty: f32, tz: f32) -> Matrix4<f32> {
    Matrix4::new(
        1.0, 0.0, 0.0, tx,
        0.0, 1.0, 0.0, ty,
        0.0, 0.0, 1.0, tz,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Symmetric-frustum projection. `z_near == z_far` divides by zero.
pub fn perspective(fovy: f32, aspect: f32, z_near: f32, z_far: f32) -> Matrix4<f32> {
    let d = 1.0 / (fovy.to_radians() / 2.0).tan();
    let a = -(z_far + z_near) / (z_far - z_near);
    let b = -2.0 * z_far * z_near / (z_far - z_near);
    Matrix4::new(
        d / aspect, 0.0, 0.0, 0.0,
        0.0, d, 0.0, 0.0,
        0.0, 0.0, a, b,
        0.0, 0.0, -1.0, 0.0,
    )
}

/// Orthonormal camera frame `(u, v, w)` with `w` pointing from `center`
/// back to `eye`. Degenerate (NaN) when `up` is parallel to `eye - center`.
pub fn camera_basis(eye: &Point3<f32>, center: &Point3<f32>, up: &Vector3<f32>) -> (Vector3<f32>, Vector3<f32>, Vector3<f32>) {
    let w = (eye - center).normalize();
    let u = up.cross(&w).normalize();
    let v = w.cross(&u);
    (u, v, w)
}

pub fn look_at(eye: &Point3<f32>, center: &Point3<f32>, up: &Vector3<f32>) -> Matrix4<f32> {
    let (u, v, w) = camera_basis(eye, center, up);
    let eye = eye.coords;
    Matrix4::new(
        u.x, u.y, u.z, -u.dot(&eye),
        v.x, v.y, v.z, -v.dot(&eye),
        w.x, w.y, w.z, -w.dot(&eye),
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Orbits `eye` about the `up` axis, "crystal ball" style.
pub fn left(degrees: f32, eye: &mut Point3<f32>, up: &Vector3<f32>) {
    let rotation = rotate(degrees, &up.normalize());
    *eye = Point3::from(rotation * eye.coords);
}

/// Orbits `eye` and `up` together over the top of the crystal ball.
pub fn up(degrees: f32, eye: &mut Point3<f32>, up: &mut Vector3<f32>) {
    let axis = eye.coords.cross(up).normalize();
    let rotation = rotate(degrees, &axis);
    *eye = Point3::from(rotation * eye.coords);
    *up = rotation * *up;
}

/// Up direction re-orthogonalized against `z`.
pub fn upvector(up: &Vector3<f32>, z: &Vector3<f32>) -> Vector3<f32> {
    let x = up.cross(z);
    z.cross(&x).normalize()
}

/// Applies `m` to a point, dividing through by the homogeneous `w`.
pub fn transform_point(m: &Matrix4<f32>, p: &Point3<f32>) -> Point3<f32> {
    let h = m * p.to_homogeneous();
    point![h.x / h.w, h.y / h.w, h.z / h.w]
}

/// Applies `m` to a direction (`w = 0`). The result is not renormalized.
pub fn transform_vector(m: &Matrix4<f32>, v: &Vector3<f32>) -> Vector3<f32> {
    (m * v.to_homogeneous()).xyz()
}

/// Maps an object-space normal to world space through the transpose of the
/// inverse transform.
pub fn transform_normal(inverse: &Matrix4<f32>, n: &Vector3<f32>) -> Vector3<f32> {
    (inverse.transpose() * n.to_homogeneous()).xyz()
}
