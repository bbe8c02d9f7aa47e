// SPDX-License-Identifier: GPL-3.0-only

//! PNG encoding for exported photos and overlays

use crate::errors::PhotoError;
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;
use tracing::debug;

pub const PNG_MIME: &str = "image/png";
pub const PNG_EXTENSION: &str = "png";

/// Encode an RGBA image as PNG
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, PhotoError> {
    let mut buffer = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|e| PhotoError::EncodingFailed(format!("PNG encoding failed: {}", e)))?;
    debug!(
        width = image.width(),
        height = image.height(),
        size = buffer.len(),
        "PNG encoded"
    );
    Ok(buffer)
}
