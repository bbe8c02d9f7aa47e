// SPDX-License-Identifier: GPL-3.0-only

//! Frame processing for photo export
//!
//! The live frame is mirrored the way the preview shows it, cover-fitted
//! onto the export canvas (scaled just enough to fill it, overflow cropped
//! evenly on both sides, never letterboxed) and then filtered.

use crate::backends::media::CameraFrame;
use crate::errors::PhotoError;
use crate::filters::FilterPreset;
use image::RgbaImage;
use image::imageops::{self, FilterType};
use tracing::debug;

/// Source region of a frame that a cover fit keeps, in frame pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverCrop {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Frame-to-target scale factor
    pub scale: f32,
}

/// Cover-fit a `frame_w x frame_h` frame onto a `target_w x target_h` canvas
pub fn cover_fit(frame_w: u32, frame_h: u32, target_w: u32, target_h: u32) -> CoverCrop {
    let (fw, fh) = (frame_w as f32, frame_h as f32);
    let (tw, th) = (target_w as f32, target_h as f32);
    let scale = (tw / fw).max(th / fh);
    let width = (tw / scale).min(fw);
    let height = (th / scale).min(fh);
    CoverCrop {
        x: (fw - width) / 2.0,
        y: (fh - height) / 2.0,
        width,
        height,
        scale,
    }
}

/// Processing applied to a frame before stickers are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameProcessing {
    pub target_width: u32,
    pub target_height: u32,
    pub filter: FilterPreset,
    pub mirror: bool,
}

/// Produce the export background from a live frame
pub fn prepare_frame(frame: &CameraFrame, processing: &FrameProcessing) -> Result<RgbaImage, PhotoError> {
    let mut source = frame.to_image().ok_or(PhotoError::NoFrameAvailable)?;
    if processing.target_width == 0 || processing.target_height == 0 {
        return Err(PhotoError::EncodingFailed("export target has no area".to_string()));
    }

    if processing.mirror {
        imageops::flip_horizontal_in_place(&mut source);
    }

    let crop = cover_fit(
        frame.width,
        frame.height,
        processing.target_width,
        processing.target_height,
    );
    let crop_w = (crop.width.round() as u32).clamp(1, frame.width);
    let crop_h = (crop.height.round() as u32).clamp(1, frame.height);
    let crop_x = (frame.width - crop_w) / 2;
    let crop_y = (frame.height - crop_h) / 2;
    debug!(
        frame_width = frame.width,
        frame_height = frame.height,
        crop_x,
        crop_y,
        crop_w,
        crop_h,
        scale = crop.scale,
        "Cover-fitting frame"
    );

    let cropped = imageops::crop_imm(&source, crop_x, crop_y, crop_w, crop_h).to_image();
    let mut fitted = if (crop_w, crop_h) == (processing.target_width, processing.target_height) {
        cropped
    } else {
        imageops::resize(
            &cropped,
            processing.target_width,
            processing.target_height,
            FilterType::Triangle,
        )
    };

    processing.filter.apply(&mut fitted);
    Ok(fitted)
}
