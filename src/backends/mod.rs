// SPDX-License-Identifier: GPL-3.0-only

//! Backend abstraction layer for camera, microphone and recorder access
//!
//! - [`media`]: the platform seams (`MediaDevices`, `MediaStream`,
//!   `RecorderFactory`, `MediaRecorder`) and the single-stream negotiator
//! - [`virtual_media`]: a scripted software implementation of every seam

pub mod media;
pub mod virtual_media;
