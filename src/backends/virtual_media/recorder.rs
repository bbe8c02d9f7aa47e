// SPDX-License-Identifier: GPL-3.0-only

//! Scripted recorder backend

use crate::backends::media::{
    MediaRecorder, MediaStream, RecorderEvent, RecorderEventStream, RecorderFactory,
    RecorderOptions,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// MIME types a Chromium-class runtime reports as recordable
pub const CHROMIUM_TYPES: [&str; 7] = [
    "video/webm;codecs=vp9,opus",
    "video/webm;codecs=vp8,opus",
    "video/webm;codecs=vp9",
    "video/webm;codecs=vp8",
    "video/webm",
    "video/mp4",
    "video/mp4;codecs=h264",
];

#[derive(Debug, Default)]
struct FactoryState {
    supported: Vec<String>,
    rejected: Vec<String>,
    reject_all: bool,
    attempts: Vec<String>,
    default_mime: String,
    last: Option<VirtualRecorderHandle>,
}

/// Recorder factory with a fixed support table and constructor failure
/// injection
#[derive(Debug, Clone)]
pub struct VirtualRecorderFactory {
    state: Arc<Mutex<FactoryState>>,
}

impl Default for VirtualRecorderFactory {
    fn default() -> Self {
        Self::new(&CHROMIUM_TYPES)
    }
}

impl VirtualRecorderFactory {
    pub fn new(supported: &[&str]) -> Self {
        Self {
            state: Arc::new(Mutex::new(FactoryState {
                supported: supported.iter().map(|s| s.to_string()).collect(),
                default_mime: "video/webm".to_string(),
                ..FactoryState::default()
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, FactoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make construction fail for `mime_type` even though it is reported
    /// as supported
    pub fn reject_construction(self, mime_type: &str) -> Self {
        self.state().rejected.push(mime_type.to_string());
        self
    }

    /// Make every construction fail
    pub fn reject_all_construction(self) -> Self {
        self.state().reject_all = true;
        self
    }

    /// MIME type reported by recorders constructed without an explicit type
    pub fn with_default_mime(self, mime_type: &str) -> Self {
        self.state().default_mime = mime_type.to_string();
        self
    }

    /// Every MIME type construction was attempted with, in order
    pub fn attempts(&self) -> Vec<String> {
        self.state().attempts.clone()
    }

    /// Control handle for the most recently constructed recorder
    pub fn last_recorder(&self) -> Option<VirtualRecorderHandle> {
        self.state().last.clone()
    }
}

impl RecorderFactory for VirtualRecorderFactory {
    fn is_type_supported(&self, mime_type: &str) -> bool {
        mime_type.is_empty() || self.state().supported.iter().any(|s| s == mime_type)
    }

    fn create(
        &self,
        stream: &dyn MediaStream,
        options: &RecorderOptions,
    ) -> Result<Box<dyn MediaRecorder>, String> {
        let supported = self.is_type_supported(&options.mime_type);
        let mut state = self.state();
        state.attempts.push(options.mime_type.clone());

        if state.reject_all || state.rejected.contains(&options.mime_type) || !supported {
            return Err(format!(
                "NotSupportedError: cannot record {:?}",
                options.mime_type
            ));
        }
        if !stream.is_active() {
            return Err("InvalidStateError: stream is inactive".to_string());
        }

        let mime_type = if options.mime_type.is_empty() {
            state.default_mime.clone()
        } else {
            options.mime_type.clone()
        };
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = VirtualRecorderHandle {
            sender,
            shared: Arc::new(Mutex::new(RecorderShared {
                bits_per_second: options.bits_per_second,
                ..RecorderShared::default()
            })),
        };
        state.last = Some(handle.clone());
        debug!(mime_type = %mime_type, "Virtual recorder constructed");

        Ok(Box::new(VirtualRecorder {
            mime_type,
            receiver: Some(receiver),
            handle,
        }))
    }
}

#[derive(Debug, Default)]
struct RecorderShared {
    timeslice: Option<Duration>,
    bits_per_second: Option<u32>,
    final_chunk: Vec<u8>,
    stopped: bool,
}

/// Test-side control of a [`VirtualRecorder`]
#[derive(Debug, Clone)]
pub struct VirtualRecorderHandle {
    sender: mpsc::UnboundedSender<RecorderEvent>,
    shared: Arc<Mutex<RecorderShared>>,
}

impl VirtualRecorderHandle {
    fn shared(&self) -> MutexGuard<'_, RecorderShared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deliver a data slice, as a timeslice tick would
    pub fn push_data(&self, bytes: &[u8]) {
        let _ = self.sender.send(RecorderEvent::Data(bytes.to_vec()));
    }

    /// Deliver a runtime error
    pub fn fail(&self, message: &str) {
        let _ = self.sender.send(RecorderEvent::Error(message.to_string()));
    }

    /// Data flushed when the recorder is stopped
    pub fn set_final_chunk(&self, bytes: &[u8]) {
        self.shared().final_chunk = bytes.to_vec();
    }

    /// Timeslice passed to `start`, if started
    pub fn timeslice(&self) -> Option<Duration> {
        self.shared().timeslice
    }

    pub fn bits_per_second(&self) -> Option<u32> {
        self.shared().bits_per_second
    }

    pub fn is_stopped(&self) -> bool {
        self.shared().stopped
    }
}

/// Recorder whose events come from its [`VirtualRecorderHandle`]
pub struct VirtualRecorder {
    mime_type: String,
    receiver: Option<mpsc::UnboundedReceiver<RecorderEvent>>,
    handle: VirtualRecorderHandle,
}

impl MediaRecorder for VirtualRecorder {
    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    fn start(&mut self, timeslice: Duration) -> Result<RecorderEventStream, String> {
        let mut receiver = self
            .receiver
            .take()
            .ok_or_else(|| "InvalidStateError: recorder already started".to_string())?;
        self.handle.shared().timeslice = Some(timeslice);

        let events = async_stream::stream! {
            while let Some(event) = receiver.recv().await {
                let terminal = matches!(event, RecorderEvent::Stopped | RecorderEvent::Error(_));
                yield event;
                if terminal {
                    break;
                }
            }
        };
        Ok(Box::pin(events))
    }

    fn stop(&mut self) {
        let final_chunk = {
            let mut shared = self.handle.shared();
            if shared.stopped {
                return;
            }
            shared.stopped = true;
            std::mem::take(&mut shared.final_chunk)
        };
        // Browsers always deliver one last dataavailable before stop
        self.handle.push_data(&final_chunk);
        let _ = self.handle.sender.send(RecorderEvent::Stopped);
    }
}
