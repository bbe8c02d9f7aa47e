// SPDX-License-Identifier: GPL-3.0-only

//! Recording format knowledge
//!
//! - [`formats`]: containers, codecs and their MIME rendering
//! - [`capability`]: picking a supported format and constructing a recorder
//!   with fallbacks

pub mod capability;
pub mod formats;

pub use capability::{CreatedRecorder, candidates, create_recorder, resolve_format};
pub use formats::{AudioCodec, Container, RecordingFormat, VideoCodec, extension_for_mime};
