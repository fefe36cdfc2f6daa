//! Recursive ray tracer for declarative scene description files.
//!
//! A [`scene::Scene`] is built once from a scene file, then
//! [`render::render_frame`] traces one primary ray per pixel with shadow
//! tests and mirror reflections up to the scene's maximum depth.

pub mod camera;
pub mod cli;
pub mod material;
pub mod object;
pub mod output;
pub mod picture;
pub mod ray;
pub mod render;
pub mod scene;
pub mod transform;
