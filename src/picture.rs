use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};

use bytemuck_derive::{AnyBitPattern, NoUninit};

/// Linear RGB color. Components are unbounded while shading and only clamped
/// when converted to bytes.
#[derive(Default, Debug, Copy, Clone, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Sum for Color {
    fn sum<I: Iterator<Item=Self>>(iter: I) -> Self {
        iter.fold(Color::BLACK, |acc, color| acc + color)
    }
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// True when every channel would export as a zero byte.
    pub fn is_black(&self) -> bool {
        RGB8::from(*self) == RGB8::default()
    }
}

impl Add for Color {
    type Output = Color;

    fn add(self, rhs: Self) -> Self::Output {
        Color::new(
            self.r + rhs.r,
            self.g + rhs.g,
            self.b + rhs.b,
        )
    }
}

impl AddAssign for Color {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Mul for Color {
    type Output = Color;

    fn mul(self, rhs: Self) -> Self::Output {
        Color::new(
            self.r * rhs.r,
            self.g * rhs.g,
            self.b * rhs.b,
        )
    }
}

impl Mul<f32> for Color {
    type Output = Color;

    fn mul(self, rhs: f32) -> Self::Output {
        Color::new(
            self.r * rhs,
            self.g * rhs,
            self.b * rhs,
        )
    }
}

impl Mul<Color> for f32 {
    type Output = Color;

    fn mul(self, rhs: Color) -> Self::Output {
        rhs * self
    }
}

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, AnyBitPattern, NoUninit)]
#[repr(C)]
pub struct RGB8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl From<Color> for RGB8 {
    fn from(value: Color) -> Self {
        RGB8::new_norm(value.r, value.g, value.b)
    }
}

fn normalize(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0) as u8
}

impl RGB8 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        RGB8 { r, g, b }
    }

    pub fn new_norm(r: f32, g: f32, b: f32) -> Self {
        RGB8::new(normalize(r), normalize(g), normalize(b))
    }
}

/// Row-major raster. Storage row 0 is the bottom of the image.
pub struct Picture<P> {
    pixels: P,
    size: (u32, u32),
}

impl<P> Picture<P> {
    pub fn new(pixels: P, size: (u32, u32)) -> Self {
        Picture { pixels, size }
    }

    pub fn width(&self) -> u32 {
        self.size.0
    }

    pub fn height(&self) -> u32 {
        self.size.1
    }

    fn to_index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width() as usize + x as usize
    }
}

impl<T: Copy + Default> Picture<Vec<T>> {
    pub fn blank(width: u32, height: u32) -> Self {
        Picture::new(vec![T::default(); width as usize * height as usize], (width, height))
    }
}

impl<T> Picture<Vec<T>> {
    pub fn pixel(&self, x: u32, y: u32) -> &T {
        &self.pixels[self.to_index(x, y)]
    }

    pub fn buffer_mut(&mut self) -> &mut [T] {
        &mut self.pixels
    }

    /// The pixel at column `x` of row `y` counted from the top of the image.
    pub fn pixel_from_top(&self, x: u32, y: u32) -> &T {
        self.pixel(x, self.height() - 1 - y)
    }
}

impl Picture<Vec<RGB8>> {
    /// Raw interleaved RGB bytes, bottom row first.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_clamp_and_truncate() {
        assert_eq!(RGB8::from(Color::new(0.5, 1.7, -0.2)), RGB8::new(127, 255, 0));
        assert_eq!(RGB8::from(Color::new(1.0, 1.0, 1.0)), RGB8::new(255, 255, 255));
    }

    #[test]
    fn accumulation_is_not_clamped() {
        let white = Color::new(1.0, 1.0, 1.0);
        let color = white + Color::new(0.5, 0.0, 0.0);
        assert_eq!(color.r, 1.5);
        let summed: Color = [white, white].into_iter().sum();
        assert_eq!(summed, Color::new(2.0, 2.0, 2.0));
        assert_eq!(Color::new(0.5, 0.5, 1.0) * Color::new(2.0, 0.0, 0.5), Color::new(1.0, 0.0, 0.5));
    }

    #[test]
    fn faint_colors_count_as_black() {
        assert!(Color::new(0.003, 0.0, 0.0).is_black());
        assert!(!Color::new(0.0, 0.0, 0.01).is_black());
    }

    #[test]
    fn bytes_are_interleaved_bottom_row_first() {
        let mut picture: Picture<Vec<RGB8>> = Picture::blank(2, 2);
        picture.buffer_mut()[0] = RGB8::new(1, 2, 3);
        assert_eq!(picture.as_bytes().len(), 12);
        assert_eq!(&picture.as_bytes()[..3], &[1, 2, 3]);
        assert_eq!(*picture.pixel_from_top(0, 1), RGB8::new(1, 2, 3));
    }
}
