// SPDX-License-Identifier: GPL-3.0-only

//! Captured media artifacts and their hand-off
//!
//! The capture core never persists anything itself. A finished photo or
//! video becomes a [`MediaArtifact`] that is passed to an [`UploadSink`];
//! [`DirectorySink`] is the local implementation.

use crate::errors::AppError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Photo,
    Video,
}

impl ArtifactKind {
    /// File name prefix
    pub fn prefix(&self) -> &'static str {
        match self {
            ArtifactKind::Photo => "photo",
            ArtifactKind::Video => "video",
        }
    }
}

/// One exported file, ready for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaArtifact {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
    pub kind: ArtifactKind,
}

impl MediaArtifact {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Generates `<kind>-<unix millis>.<ext>` names.
///
/// Stamps are strictly increasing across clones, so two captures within the
/// same millisecond still get distinct names.
#[derive(Debug, Clone, Default)]
pub struct ArtifactNamer {
    last: Arc<AtomicI64>,
}

impl ArtifactNamer {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_stamp(&self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        let mut previous = self.last.load(Ordering::Relaxed);
        loop {
            let stamp = now.max(previous + 1);
            match self
                .last
                .compare_exchange_weak(previous, stamp, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return stamp,
                Err(actual) => previous = actual,
            }
        }
    }

    pub fn file_name(&self, kind: ArtifactKind, extension: &str) -> String {
        format!("{}-{}.{}", kind.prefix(), self.next_stamp(), extension)
    }
}

/// Receives finished artifacts (upload collaborator boundary)
#[async_trait]
pub trait UploadSink: Send + Sync {
    /// Hand off an artifact; returns where it ended up
    async fn submit(&self, artifact: MediaArtifact) -> Result<String, AppError>;
}

/// Default output directory: `<Pictures>/promo-studio`
pub fn default_output_dir() -> PathBuf {
    dirs::picture_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join("promo-studio")
}

/// Writes artifacts into a local directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl Default for DirectorySink {
    fn default() -> Self {
        Self::new(default_output_dir())
    }
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl UploadSink for DirectorySink {
    async fn submit(&self, artifact: MediaArtifact) -> Result<String, AppError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(&artifact.file_name);
        debug!(path = %path.display(), size = artifact.len(), "Writing artifact");
        tokio::fs::write(&path, &artifact.bytes).await?;
        info!(path = %path.display(), mime = %artifact.mime_type, "Artifact saved");
        Ok(path.display().to_string())
    }
}
