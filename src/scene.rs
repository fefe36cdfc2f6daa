//! Scene description files and the builder that turns them into a [`Scene`].
//!
//! A scene file is a sequence of lines, each holding one command followed by
//! whitespace-separated values. Blank lines and lines starting with `#` are
//! ignored. Commands that fail to parse are logged and skipped; only an
//! unreadable file or a triangle referring to a missing vertex aborts the
//! build.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::{FromStr, SplitWhitespace};

use log::{debug, info, warn};
use nalgebra::{Matrix4, Point3, Vector3};
use thiserror::Error;

use crate::camera::Camera;
use crate::material::{Attenuation, Light, Material};
use crate::object::{Primitive, Shape, Sphere, Triangle, EPSILON};
use crate::picture::Color;
use crate::transform;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("unable to read scene file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("line {line}: vertex index {index} is out of range, only {len} vertices defined")]
    VertexIndex { line: usize, index: usize, len: usize },
}

/// Problems confined to a single line. The line is skipped.
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("missing value {0}")]
    MissingValue(usize),
    #[error("invalid value {value:?} at position {position}")]
    InvalidNumber { position: usize, value: String },
    #[error("unknown command {0:?}")]
    UnknownCommand(String),
    #[error("rotation axis has zero length")]
    ZeroAxis,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Output(PathBuf),
    Size(u32, u32),
    MaxDepth(u32),
    Camera(Camera),
    MaxVerts(usize),
    MaxVertNorms(usize),
    Vertex(Point3<f32>),
    VertexNormal(Point3<f32>, Vector3<f32>),
    Sphere(Sphere),
    Tri([usize; 3]),
    TriNormal([usize; 3]),
    Light(Light),
    Attenuation(Attenuation),
    Ambient(Color),
    Diffuse(Color),
    Specular(Color),
    Emission(Color),
    Shininess(f32),
    Translate(Vector3<f32>),
    Scale(Vector3<f32>),
    /// Unit axis and angle in degrees.
    Rotate(Vector3<f32>, f32),
    PushTransform,
    PopTransform,
}

struct Values<'a> {
    tokens: SplitWhitespace<'a>,
    position: usize,
}

impl<'a> Values<'a> {
    fn new(tokens: SplitWhitespace<'a>) -> Self {
        Values { tokens, position: 0 }
    }

    fn token(&mut self) -> Result<&'a str, ParseError> {
        let token = self.tokens.next().ok_or(ParseError::MissingValue(self.position))?;
        self.position += 1;
        Ok(token)
    }

    fn number<T: FromStr>(&mut self) -> Result<T, ParseError> {
        let position = self.position;
        let token = self.token()?;
        token.parse().map_err(|_| ParseError::InvalidNumber { position, value: token.to_string() })
    }

    /// Whole numbers are read as floats and truncated, so `size 640.0 480`
    /// reads the same as `size 640 480`. Negative values are rejected.
    fn count<T: FromF32>(&mut self) -> Result<T, ParseError> {
        let position = self.position;
        let token = self.token()?;
        match token.parse::<f32>() {
            Ok(value) if value.is_finite() && value >= 0.0 => Ok(T::from_f32(value)),
            _ => Err(ParseError::InvalidNumber { position, value: token.to_string() }),
        }
    }

    fn vector(&mut self) -> Result<Vector3<f32>, ParseError> {
        Ok(Vector3::new(self.number()?, self.number()?, self.number()?))
    }

    fn point(&mut self) -> Result<Point3<f32>, ParseError> {
        Ok(Point3::new(self.number()?, self.number()?, self.number()?))
    }

    fn color(&mut self) -> Result<Color, ParseError> {
        Ok(Color::new(self.number()?, self.number()?, self.number()?))
    }

    fn indices(&mut self) -> Result<[usize; 3], ParseError> {
        Ok([self.count()?, self.count()?, self.count()?])
    }
}

/// Saturating float-to-integer conversion for counts and indices.
trait FromF32 {
    fn from_f32(value: f32) -> Self;
}

impl FromF32 for u32 {
    fn from_f32(value: f32) -> Self {
        value as u32
    }
}

impl FromF32 for usize {
    fn from_f32(value: f32) -> Self {
        value as usize
    }
}

impl Command {
    /// `Ok(None)` for blank and comment lines. Trailing values are ignored.
    pub fn parse(line: &str) -> Result<Option<Command>, ParseError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let mut tokens = line.split_whitespace();
        let Some(name) = tokens.next() else {
            return Ok(None);
        };
        let mut values = Values::new(tokens);

        let command = match name {
            "output" => Command::Output(PathBuf::from(values.token()?)),
            "size" => Command::Size(values.count()?, values.count()?),
            "maxdepth" => Command::MaxDepth(values.count()?),
            "camera" => Command::Camera(Camera::new(values.point()?, values.point()?, values.vector()?, values.number()?)),
            "maxverts" => Command::MaxVerts(values.count()?),
            "maxvertnorms" => Command::MaxVertNorms(values.count()?),
            "vertex" => Command::Vertex(values.point()?),
            "vertexnormal" => Command::VertexNormal(values.point()?, values.vector()?),
            "sphere" => Command::Sphere(Sphere::new(values.point()?, values.number()?)),
            "tri" => Command::Tri(values.indices()?),
            "trinormal" => Command::TriNormal(values.indices()?),
            "directional" => Command::Light(Light::directional(values.vector()?, values.color()?)),
            "point" => Command::Light(Light::point(values.point()?, values.color()?)),
            "attenuation" => Command::Attenuation(Attenuation {
                constant: values.number()?,
                linear: values.number()?,
                quadratic: values.number()?,
            }),
            "ambient" => Command::Ambient(values.color()?),
            "diffuse" => Command::Diffuse(values.color()?),
            "specular" => Command::Specular(values.color()?),
            "emission" => Command::Emission(values.color()?),
            "shininess" => Command::Shininess(values.number()?),
            "translate" => Command::Translate(values.vector()?),
            "scale" => Command::Scale(values.vector()?),
            "rotate" => {
                let axis = values.vector()?;
                let degrees = values.number()?;
                let axis = axis.try_normalize(EPSILON).ok_or(ParseError::ZeroAxis)?;
                Command::Rotate(axis, degrees)
            }
            "pushTransform" => Command::PushTransform,
            "popTransform" => Command::PopTransform,
            other => return Err(ParseError::UnknownCommand(other.to_string())),
        };
        Ok(Some(command))
    }
}

/// Everything the renderer needs. Built once by [`SceneBuilder`] and only
/// read afterwards.
#[derive(Clone, Debug)]
pub struct Scene {
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub max_depth: u32,
    pub attenuation: Attenuation,
    pub camera: Camera,
    pub objects: Vec<Primitive>,
    pub lights: Vec<Light>,
}

impl Default for Scene {
    fn default() -> Self {
        Scene {
            output: PathBuf::from("raytrace.png"),
            width: 640,
            height: 480,
            max_depth: 5,
            attenuation: Attenuation::default(),
            camera: Camera::default(),
            objects: Vec::new(),
            lights: Vec::new(),
        }
    }
}

impl Scene {
    pub fn read_file(path: impl AsRef<Path>) -> Result<Scene, SceneError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let scene = Scene::parse(&source)?;
        info!(target: "scene", "Reading of {} finished", path.display());
        Ok(scene)
    }

    pub fn parse(source: &str) -> Result<Scene, SceneError> {
        let mut builder = SceneBuilder::new();
        for (index, line) in source.lines().enumerate() {
            builder.apply_line(index + 1, line)?;
        }
        let scene = builder.finish();
        info!(
            target: "scene",
            "Objects: {}; Lights: {}; Pixels: {}",
            scene.objects.len(),
            scene.lights.len(),
            scene.width as u64 * scene.height as u64,
        );
        Ok(scene)
    }
}

/// `maxverts` and `maxvertnorms` are capacity hints. Larger values are still
/// accepted but only this many slots are reserved up front.
const MAX_RESERVED_VERTICES: usize = 1 << 16;

/// Parse-time state: the transform stack, the current material and the
/// vertex buffers. None of it survives into the finished [`Scene`].
pub struct SceneBuilder {
    scene: Scene,
    transforms: Vec<Matrix4<f32>>,
    material: Material,
    vertices: Vec<Point3<f32>>,
    normal_vertices: Vec<Point3<f32>>,
    vertex_normals: Vec<Vector3<f32>>,
}

impl Default for SceneBuilder {
    fn default() -> Self {
        SceneBuilder::new()
    }
}

impl SceneBuilder {
    pub fn new() -> Self {
        SceneBuilder {
            scene: Scene::default(),
            transforms: vec![Matrix4::identity()],
            material: Material::default(),
            vertices: Vec::new(),
            normal_vertices: Vec::new(),
            vertex_normals: Vec::new(),
        }
    }

    /// Current top of the transform stack.
    pub fn transform(&self) -> &Matrix4<f32> {
        // the stack never drops below the initial identity
        &self.transforms[self.transforms.len() - 1]
    }

    pub fn stack_depth(&self) -> usize {
        self.transforms.len()
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Parses and applies one line of a scene file. Recoverable problems are
    /// logged and leave the builder untouched.
    pub fn apply_line(&mut self, line: usize, text: &str) -> Result<(), SceneError> {
        match Command::parse(text) {
            Ok(Some(command)) => self.apply(line, command),
            Ok(None) => Ok(()),
            Err(err) => {
                warn!(target: "scene", "line {}: {}, skipping: {}", line, err, text.trim());
                Ok(())
            }
        }
    }

    pub fn apply(&mut self, line: usize, command: Command) -> Result<(), SceneError> {
        debug!(target: "scene", "line {}: {:?}", line, command);
        match command {
            Command::Output(path) => self.scene.output = path,
            Command::Size(width, height) => {
                self.scene.width = width;
                self.scene.height = height;
            }
            Command::MaxDepth(depth) => self.scene.max_depth = depth,
            Command::Camera(camera) => self.scene.camera = camera,
            Command::MaxVerts(count) => {
                let additional = count.min(MAX_RESERVED_VERTICES).saturating_sub(self.vertices.len());
                self.vertices.reserve(additional);
            }
            Command::MaxVertNorms(count) => {
                let additional = count.min(MAX_RESERVED_VERTICES).saturating_sub(self.normal_vertices.len());
                self.normal_vertices.reserve(additional);
                self.vertex_normals.reserve(additional);
            }
            Command::Vertex(vertex) => self.vertices.push(vertex),
            Command::VertexNormal(vertex, normal) => {
                self.normal_vertices.push(vertex);
                self.vertex_normals.push(normal);
            }
            Command::Sphere(sphere) => self.add_primitive(line, Shape::Sphere(sphere)),
            Command::Tri(indices) => {
                let [a, b, c] = lookup(&self.vertices, indices, line)?;
                self.add_primitive(line, Shape::Triangle(Triangle::new(a, b, c)));
            }
            Command::TriNormal(indices) => {
                let vertices = lookup(&self.normal_vertices, indices, line)?;
                let normals = lookup(&self.vertex_normals, indices, line)?;
                self.add_primitive(line, Shape::Triangle(Triangle::with_normals(vertices, normals)));
            }
            Command::Light(light) => self.scene.lights.push(light),
            Command::Attenuation(attenuation) => self.scene.attenuation = attenuation,
            Command::Ambient(color) => self.material.ambient = color,
            Command::Diffuse(color) => self.material.diffuse = color,
            Command::Specular(color) => self.material.specular = color,
            Command::Emission(color) => self.material.emission = color,
            Command::Shininess(shininess) => self.material.shininess = shininess,
            Command::Translate(offset) => self.right_multiply(transform::translate(offset.x, offset.y, offset.z)),
            Command::Scale(factors) => self.right_multiply(transform::scale(factors.x, factors.y, factors.z)),
            Command::Rotate(axis, degrees) => self.right_multiply(transform::rotate(degrees, &axis).to_homogeneous()),
            Command::PushTransform => {
                let top = *self.transform();
                self.transforms.push(top);
            }
            Command::PopTransform => {
                if self.transforms.len() <= 1 {
                    warn!(target: "scene", "line {}: transform stack has no elements to pop, ignoring", line);
                } else {
                    self.transforms.pop();
                }
            }
        }
        Ok(())
    }

    pub fn finish(self) -> Scene {
        self.scene
    }

    fn right_multiply(&mut self, m: Matrix4<f32>) {
        let top = self.transforms.len() - 1;
        self.transforms[top] *= m;
    }

    fn add_primitive(&mut self, line: usize, shape: Shape) {
        match Primitive::new(shape, *self.transform(), self.material.clone()) {
            Some(primitive) => self.scene.objects.push(primitive),
            None => warn!(target: "scene", "line {}: current transform is not invertible, skipping primitive", line),
        }
    }
}

fn lookup<T: Copy>(buffer: &[T], indices: [usize; 3], line: usize) -> Result<[T; 3], SceneError> {
    let get = |index: usize| {
        buffer.get(index).copied().ok_or(SceneError::VertexIndex { line, index, len: buffer.len() })
    };
    Ok([get(indices[0])?, get(indices[1])?, get(indices[2])?])
}
