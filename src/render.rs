use std::time::Instant;

use float_ord::FloatOrd;
use log::{info, trace};
use nalgebra::{Point3, Vector3};
use rayon::prelude::*;

use crate::material::{Attenuation, Light, LightKind};
use crate::object::EPSILON;
use crate::picture::{Color, Picture, RGB8};
use crate::ray::{Hit, Ray};
use crate::scene::Scene;

fn same_point(a: &Point3<f32>, b: &Point3<f32>) -> bool {
    (b - a).magnitude_squared() < EPSILON
}

fn reflect(v: &Vector3<f32>, n: &Vector3<f32>) -> Vector3<f32> {
    v - 2.0 * v.dot(n) * n
}

/// Mirror image of `ray` about `unit_normal`, leaving from `hit`.
pub fn reflected_ray(ray: &Ray, hit: &Point3<f32>, unit_normal: &Vector3<f32>) -> Ray {
    Ray::new(*hit, reflect(&ray.direction, unit_normal))
}

/// Closest primitive along `ray`, measured in world space from the ray's
/// origin. Each primitive intersects in its own object space.
pub fn nearest_hit<'a>(ray: &Ray, scene: &'a Scene) -> Option<Hit<'a>> {
    scene.objects.iter()
        .filter_map(|object| {
            let point = object.intersect(ray)?;
            let distance = (point - ray.origin).norm();
            Some(Hit { point, distance, object })
        })
        .min_by_key(|hit| FloatOrd(hit.distance))
}

/// Whether `light` reaches the hit point unobstructed.
///
/// A point light fires a ray from its position at the hit point and must land
/// on that very point. A directional light fires from the hit point along the
/// negated light vector and counts whenever that ray finds a surface.
pub fn is_lit(light: &Light, hit: &Hit, scene: &Scene) -> bool {
    match light.kind {
        LightKind::Point => {
            let position = light.position();
            let shadow = Ray::new(position, hit.point - position);
            nearest_hit(&shadow, scene).is_some_and(|blocker| same_point(&blocker.point, &hit.point))
        }
        LightKind::Directional => {
            let shadow = Ray::new(hit.point, -light.direction());
            nearest_hit(&shadow, scene).is_some()
        }
    }
}

/// Blinn-Phong contribution of one light. Point lights fall off with
/// `attenuation`, directional lights do not.
pub fn shade(light: &Light, hit: &Hit, ray: &Ray, attenuation: &Attenuation) -> Color {
    let material = hit.object.material();
    let to_light = light.direction_from(&hit.point);
    let normal = hit.object.normal_at(&hit.point).normalize();

    let n_dot_l = normal.dot(&to_light).max(0.0);
    let diffuse = material.diffuse * light.color * n_dot_l;

    let half = (to_light + (-ray.direction).normalize()).normalize();
    let n_dot_h = normal.dot(&half).max(0.0);
    let specular = material.specular * light.color * n_dot_h.powf(material.shininess);

    let color = diffuse + specular;
    match light.kind {
        LightKind::Point => color * attenuation.factor((light.position() - hit.point).norm()),
        LightKind::Directional => color,
    }
}

/// Color seen along `ray` after `depth` reflections. Past `scene.max_depth`
/// the ray contributes nothing.
pub fn render_ray(ray: &Ray, scene: &Scene, depth: u32) -> Color {
    if depth > scene.max_depth {
        return Color::BLACK;
    }

    let Some(hit) = nearest_hit(ray, scene) else {
        return Color::BLACK;
    };

    let material = hit.object.material();
    let mut color = material.ambient + material.emission;
    color += scene.lights.iter()
        .filter(|light| is_lit(light, &hit, scene))
        .map(|light| shade(light, &hit, ray, &scene.attenuation))
        .sum::<Color>();

    if !material.specular.is_black() {
        let normal = hit.object.normal_at(&hit.point).normalize();
        let reflected = reflected_ray(ray, &hit.point, &normal);
        color += material.specular * render_ray(&reflected, scene, depth + 1);
    }
    color
}

/// Color of the pixel at `(row, col)`, row 0 being the top of the image.
pub fn render_pixel(scene: &Scene, row: u32, col: u32) -> Color {
    let ray = scene.camera.ray_through_pixel(row as f32 + 0.5, col as f32 + 0.5, scene.height, scene.width);
    render_ray(&ray, scene, 0)
}

/// Renders every pixel of `scene`. Rows are traced in parallel and stored
/// bottom row first.
pub fn render_frame(scene: &Scene) -> Picture<Vec<RGB8>> {
    let (width, height) = (scene.width, scene.height);
    let mut picture = Picture::blank(width, height);
    if width == 0 || height == 0 {
        return picture;
    }

    info!(target: "render", "Starting frame render of {}x{} pixels...", width, height);
    let start = Instant::now();
    picture.buffer_mut()
        .par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(index, pixels)| {
            let row = height - 1 - index as u32;
            trace!(target: "render", "Rendering row {}", row);
            for (col, pixel) in pixels.iter_mut().enumerate() {
                *pixel = render_pixel(scene, row, col as u32).into();
            }
        });
    info!(target: "render", "Finished rendering. Took {:?}", start.elapsed());
    picture
}
