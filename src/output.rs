use std::path::Path;

use image::{ColorType, ImageResult};
use log::info;

use crate::picture::{Picture, RGB8};

/// Encodes `picture` to `path`, choosing the format from the extension.
///
/// Pictures are stored bottom row first, so rows are flipped on the way out.
pub fn save_picture(picture: &Picture<Vec<RGB8>>, path: &Path) -> ImageResult<()> {
    let row_len = picture.width() as usize * 3;
    let mut bytes = Vec::with_capacity(picture.as_bytes().len());
    if row_len > 0 {
        for row in picture.as_bytes().chunks_exact(row_len).rev() {
            bytes.extend_from_slice(row);
        }
    }

    info!(target: "render", "Saving image: {}", path.display());
    image::save_buffer(path, &bytes, picture.width(), picture.height(), ColorType::Rgb8)
}
