// SPDX-License-Identifier: GPL-3.0-only

//! Recording container and codec vocabulary
//!
//! Formats are described structurally and rendered to the MIME strings a
//! recorder backend understands, e.g. `video/webm;codecs=vp9,opus`.

use std::fmt;

/// Container formats for recorded video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    /// WebM container (open format, best browser support)
    WebM,
    /// MP4 container (Safari)
    Mp4,
    /// Ogg container (legacy Firefox)
    Ogg,
}

impl Container {
    pub fn mime(&self) -> &'static str {
        match self {
            Container::WebM => "video/webm",
            Container::Mp4 => "video/mp4",
            Container::Ogg => "video/ogg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Container::WebM => "webm",
            Container::Mp4 => "mp4",
            Container::Ogg => "ogv",
        }
    }

    /// Container named by a MIME string, if any
    pub fn from_mime(mime: &str) -> Option<Self> {
        let base = mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        match base.as_str() {
            "video/webm" => Some(Container::WebM),
            "video/mp4" => Some(Container::Mp4),
            "video/ogg" => Some(Container::Ogg),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoCodec {
    Vp9,
    Vp8,
    H264,
    Theora,
}

impl VideoCodec {
    pub fn codec_name(&self) -> &'static str {
        match self {
            VideoCodec::Vp9 => "vp9",
            VideoCodec::Vp8 => "vp8",
            VideoCodec::H264 => "h264",
            VideoCodec::Theora => "theora",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioCodec {
    Opus,
    Aac,
    Vorbis,
}

impl AudioCodec {
    pub fn codec_name(&self) -> &'static str {
        match self {
            AudioCodec::Opus => "opus",
            AudioCodec::Aac => "aac",
            AudioCodec::Vorbis => "vorbis",
        }
    }
}

/// A container with optional explicit codecs.
///
/// The default value has no container at all and renders as the empty MIME
/// string, which lets the recorder pick whatever it produces natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RecordingFormat {
    pub container: Option<Container>,
    pub video: Option<VideoCodec>,
    pub audio: Option<AudioCodec>,
}

impl RecordingFormat {
    pub const fn paired(container: Container, video: VideoCodec, audio: AudioCodec) -> Self {
        Self {
            container: Some(container),
            video: Some(video),
            audio: Some(audio),
        }
    }

    pub const fn video_only(container: Container, video: VideoCodec) -> Self {
        Self {
            container: Some(container),
            video: Some(video),
            audio: None,
        }
    }

    /// Container with the runtime's default codecs
    pub const fn container_default(container: Container) -> Self {
        Self {
            container: Some(container),
            video: None,
            audio: None,
        }
    }

    /// True for the "no explicit type" format
    pub fn is_runtime_default(&self) -> bool {
        self.container.is_none()
    }

    pub fn has_audio_codec(&self) -> bool {
        self.audio.is_some()
    }

    pub fn mime(&self) -> String {
        let Some(container) = self.container else {
            return String::new();
        };
        let codecs: Vec<&str> = self
            .video
            .map(|v| v.codec_name())
            .into_iter()
            .chain(self.audio.map(|a| a.codec_name()))
            .collect();
        if codecs.is_empty() {
            container.mime().to_string()
        } else {
            format!("{};codecs={}", container.mime(), codecs.join(","))
        }
    }

    /// File extension; WebM when the container is left to the runtime
    pub fn extension(&self) -> &'static str {
        self.container.unwrap_or(Container::WebM).extension()
    }
}

impl fmt::Display for RecordingFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_runtime_default() {
            write!(f, "runtime default")
        } else {
            write!(f, "{}", self.mime())
        }
    }
}

/// File extension for whatever MIME string a recorder reports
pub fn extension_for_mime(mime: &str) -> &'static str {
    Container::from_mime(mime)
        .unwrap_or(Container::WebM)
        .extension()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_rendering() {
        assert_eq!(
            RecordingFormat::paired(Container::WebM, VideoCodec::Vp9, AudioCodec::Opus).mime(),
            "video/webm;codecs=vp9,opus"
        );
        assert_eq!(
            RecordingFormat::video_only(Container::Mp4, VideoCodec::H264).mime(),
            "video/mp4;codecs=h264"
        );
        assert_eq!(RecordingFormat::container_default(Container::Ogg).mime(), "video/ogg");
        assert_eq!(RecordingFormat::default().mime(), "");
    }

    #[test]
    fn test_extension_from_reported_mime() {
        assert_eq!(extension_for_mime("video/mp4;codecs=avc1"), "mp4");
        assert_eq!(extension_for_mime("VIDEO/WEBM"), "webm");
        assert_eq!(extension_for_mime(""), "webm");
        assert_eq!(extension_for_mime("video/x-matroska"), "webm");
    }
}
