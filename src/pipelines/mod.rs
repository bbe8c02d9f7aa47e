// SPDX-License-Identifier: GPL-3.0-only

//! Capture pipelines
//!
//! - [`photo`]: frame + filter + stickers flattened into a PNG
//! - [`video`]: recorder state machine producing a container blob
//!
//! Both end in a [`MediaArtifact`](crate::storage::MediaArtifact) for the
//! upload collaborator.

pub mod photo;
pub mod video;
