// SPDX-License-Identifier: GPL-3.0-only

//! Promo Studio - camera capture and sticker compositing core
//!
//! This library captures live camera frames, lets the user place transformable
//! stickers (emoji, promo labels, free text) over them, and flattens everything
//! into a single exportable photo or a recorded video clip.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`backends`]: Platform seams (camera streams, recorders) plus a virtual backend
//! - [`media`]: Recording container/codec knowledge and capability resolution
//! - [`stickers`]: Authoring-space sticker model, direct manipulation and rendering
//! - [`canvas`]: 2D drawing surface abstraction (raster and display-list targets)
//! - [`filters`]: Named visual presets shared by preview and export
//! - [`pipelines`]: Photo export and video recording pipelines
//! - [`session`]: One camera engagement tying the pieces together
//! - [`config`]: User configuration handling
//! - [`storage`]: Output artifacts and the upload hand-off
//!
//! ```text
//! MediaDevices ──► DeviceNegotiator ──► live stream ──┬──► PhotoPipeline ──┐
//!                                                     │        ▲           ├──► UploadSink
//!                                                     │   StickerLayer     │
//!                                                     └──► RecordingController
//! ```

pub mod backends;
pub mod canvas;
pub mod config;
pub mod constants;
pub mod errors;
pub mod filters;
pub mod logging;
pub mod media;
pub mod pipelines;
pub mod session;
pub mod stickers;
pub mod storage;

// Re-export commonly used types
pub use backends::media::{CaptureMode, Facing};
pub use config::StudioConfig;
pub use errors::{AppError, AppResult};
pub use filters::FilterPreset;
pub use session::CaptureSession;
pub use stickers::{StickerId, StickerKind, StickerLayer, StickerObject};
pub use storage::MediaArtifact;
