// SPDX-License-Identifier: GPL-3.0-only

//! Recording capability resolution
//!
//! Picks the first container/codec combination the recorder backend claims
//! to support, preferring paired audio+video codecs when the stream carries
//! audio. Resolution never fails: the last candidate is the runtime default.
//! Construction then walks a broader MIME fallback list, because a type can
//! be reported as supported and still be rejected by the constructor.

use super::formats::{AudioCodec, Container, RecordingFormat, VideoCodec};
use crate::backends::media::{MediaRecorder, MediaStream, RecorderFactory, RecorderOptions};
use crate::errors::RecordingError;
use tracing::{debug, info, warn};

const PAIRED: [RecordingFormat; 4] = [
    RecordingFormat::paired(Container::WebM, VideoCodec::Vp9, AudioCodec::Opus),
    RecordingFormat::paired(Container::WebM, VideoCodec::Vp8, AudioCodec::Opus),
    RecordingFormat::paired(Container::Mp4, VideoCodec::H264, AudioCodec::Aac),
    RecordingFormat::paired(Container::Ogg, VideoCodec::Theora, AudioCodec::Vorbis),
];

const VIDEO_ONLY: [RecordingFormat; 4] = [
    RecordingFormat::video_only(Container::WebM, VideoCodec::Vp9),
    RecordingFormat::video_only(Container::WebM, VideoCodec::Vp8),
    RecordingFormat::video_only(Container::Mp4, VideoCodec::H264),
    RecordingFormat::video_only(Container::Ogg, VideoCodec::Theora),
];

const CONTAINER_DEFAULTS: [RecordingFormat; 3] = [
    RecordingFormat::container_default(Container::WebM),
    RecordingFormat::container_default(Container::Mp4),
    RecordingFormat::container_default(Container::Ogg),
];

/// Broader MIME strings tried when constructing with the resolved type fails
pub const CONSTRUCTION_FALLBACKS: [&str; 7] = [
    "video/webm",
    "video/webm;codecs=vp9",
    "video/webm;codecs=vp8",
    "video/mp4",
    "video/mp4;codecs=h264",
    "video/ogg",
    "",
];

/// Candidate formats in preference order.
///
/// Paired codecs are only candidates when the stream has audio; the runtime
/// default always comes last.
pub fn candidates(has_audio: bool) -> Vec<RecordingFormat> {
    let mut list = Vec::with_capacity(PAIRED.len() + VIDEO_ONLY.len() + CONTAINER_DEFAULTS.len() + 1);
    if has_audio {
        list.extend(PAIRED);
    }
    list.extend(VIDEO_ONLY);
    list.extend(CONTAINER_DEFAULTS);
    list.push(RecordingFormat::default());
    list
}

/// First supported candidate for `stream`
pub fn resolve_format(factory: &dyn RecorderFactory, stream: &dyn MediaStream) -> RecordingFormat {
    let has_audio = stream.audio_track_count() > 0;
    let format = candidates(has_audio)
        .into_iter()
        .find(|format| format.is_runtime_default() || factory.is_type_supported(&format.mime()))
        .unwrap_or_default();

    info!(has_audio, format = %format, "Resolved recording format");
    format
}

/// A constructed recorder and the MIME type it was built with
pub struct CreatedRecorder {
    pub recorder: Box<dyn MediaRecorder>,
    /// Empty when the runtime default was used
    pub requested_mime: String,
}

/// Construct a recorder for `resolved`, falling back through
/// [`CONSTRUCTION_FALLBACKS`] on constructor failure
pub fn create_recorder(
    factory: &dyn RecorderFactory,
    stream: &dyn MediaStream,
    resolved: RecordingFormat,
    bits_per_second: Option<u32>,
) -> Result<CreatedRecorder, RecordingError> {
    let first = resolved.mime();
    let mut tried: Vec<String> = Vec::new();
    let mut last_error = String::new();

    let attempts = std::iter::once(first.as_str()).chain(CONSTRUCTION_FALLBACKS);
    for mime in attempts {
        if tried.iter().any(|t| t == mime) {
            continue;
        }
        tried.push(mime.to_string());

        let options = RecorderOptions {
            mime_type: mime.to_string(),
            bits_per_second,
        };
        match factory.create(stream, &options) {
            Ok(recorder) => {
                if mime != first {
                    info!(resolved = %first, used = %mime, "Recorder constructed with fallback type");
                } else {
                    debug!(mime = %mime, "Recorder constructed");
                }
                return Ok(CreatedRecorder {
                    recorder,
                    requested_mime: mime.to_string(),
                });
            }
            Err(e) => {
                warn!(mime = %mime, error = %e, "Recorder construction failed");
                last_error = e;
            }
        }
    }

    Err(RecordingError::RecorderUnavailable(last_error))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_without_audio_have_no_paired_codec() {
        let list = candidates(false);
        assert!(list.iter().all(|f| !f.has_audio_codec()));
        assert_eq!(list.last(), Some(&RecordingFormat::default()));
    }

    #[test]
    fn test_candidates_with_audio_start_paired() {
        let list = candidates(true);
        assert_eq!(list[0].mime(), "video/webm;codecs=vp9,opus");
        assert_eq!(list[1].mime(), "video/webm;codecs=vp8,opus");
        let first_video_only = list.iter().position(|f| !f.has_audio_codec()).unwrap();
        assert!(list[..first_video_only].iter().all(|f| f.has_audio_codec()));
        assert!(list[first_video_only..].iter().all(|f| !f.has_audio_codec()));
    }
}
