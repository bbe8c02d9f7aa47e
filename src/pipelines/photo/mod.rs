// SPDX-License-Identifier: GPL-3.0-only

//! Async photo export pipeline
//!
//! ```text
//! live frame ─► mirror ─► cover fit ─► filter ─► stickers ─► PNG ─► artifact
//! ```
//!
//! Compositing and encoding are CPU-bound and run on the blocking pool so
//! the preview keeps running. The frame is mandatory; stickers are not.
//! A sticker whose text the pipeline's fonts cannot draw fails the capture
//! with `GlyphUnavailable` rather than exporting without it.

pub mod encoding;
pub mod processing;

pub use encoding::{PNG_MIME, encode_png};
pub use processing::{CoverCrop, FrameProcessing, cover_fit, prepare_frame};

use crate::backends::media::CameraFrame;
use crate::canvas::{FontSet, RasterCanvas};
use crate::errors::PhotoError;
use crate::filters::FilterPreset;
use crate::stickers::{StickerLayer, StickerObject, render::render_objects};
use crate::storage::{ArtifactKind, ArtifactNamer, MediaArtifact};
use image::RgbaImage;
use tracing::{error, info};

/// Photo export pipeline for one fixed target size
#[derive(Clone)]
pub struct PhotoPipeline {
    processing: FrameProcessing,
    fonts: FontSet,
}

impl PhotoPipeline {
    pub fn new(target_width: u32, target_height: u32) -> Self {
        Self {
            processing: FrameProcessing {
                target_width,
                target_height,
                filter: FilterPreset::None,
                mirror: false,
            },
            fonts: FontSet::default(),
        }
    }

    pub fn with_filter(mut self, filter: FilterPreset) -> Self {
        self.processing.filter = filter;
        self
    }

    pub fn with_mirror(mut self, mirror: bool) -> Self {
        self.processing.mirror = mirror;
        self
    }

    /// Faces for sticker text; the bundled text face by default
    pub fn with_fonts(mut self, fonts: FontSet) -> Self {
        self.fonts = fonts;
        self
    }

    pub fn target_size(&self) -> (u32, u32) {
        (self.processing.target_width, self.processing.target_height)
    }

    /// Composite frame and stickers synchronously
    pub fn compose(
        &self,
        frame: &CameraFrame,
        stickers: Option<&[StickerObject]>,
    ) -> Result<RgbaImage, PhotoError> {
        let background = prepare_frame(frame, &self.processing)?;
        let (width, height) = self.target_size();
        let mut canvas = RasterCanvas::from_image(background, self.fonts.clone());
        if let Some(objects) = stickers {
            render_objects(&mut canvas, objects, width, height);
        }
        canvas.finish()
    }

    /// Capture a photo artifact from `frame` and the sticker layer.
    ///
    /// Fails with `NoFrameAvailable` and emits nothing when there is no
    /// usable frame.
    pub async fn capture(
        &self,
        frame: Option<CameraFrame>,
        stickers: Option<&StickerLayer>,
        namer: &ArtifactNamer,
    ) -> Result<MediaArtifact, PhotoError> {
        let frame = match frame {
            Some(frame) if frame.is_valid() => frame,
            _ => {
                error!("Photo capture failed: no frame available");
                return Err(PhotoError::NoFrameAvailable);
            }
        };

        let (width, height) = self.target_size();
        info!(
            frame_width = frame.width,
            frame_height = frame.height,
            width,
            height,
            filter = %self.processing.filter,
            stickers = stickers.map_or(0, |s| s.len()),
            "Capturing photo"
        );

        let objects: Option<Vec<StickerObject>> = stickers.map(|s| s.objects().to_vec());
        let pipeline = self.clone();
        let bytes = tokio::task::spawn_blocking(move || {
            let image = pipeline.compose(&frame, objects.as_deref())?;
            encode_png(&image)
        })
        .await
        .map_err(|e| PhotoError::EncodingFailed(format!("Capture task error: {}", e)))?
        .inspect_err(|e| error!(error = %e, "Photo capture failed"))?;

        let artifact = MediaArtifact {
            file_name: namer.file_name(ArtifactKind::Photo, encoding::PNG_EXTENSION),
            mime_type: PNG_MIME.to_string(),
            bytes,
            kind: ArtifactKind::Photo,
        };
        info!(file = %artifact.file_name, size = artifact.len(), "Photo captured");
        Ok(artifact)
    }
}
