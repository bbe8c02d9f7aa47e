// SPDX-License-Identifier: GPL-3.0-only

//! Video recording pipeline
//!
//! The platform recorder does the encoding; this side picks the format,
//! drives the recorder through its state machine and assembles the
//! buffered slices into one artifact.

pub mod recorder;

pub use recorder::{RecordingController, RecordingSettings, RecordingState};
