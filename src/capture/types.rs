// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for capture sources

use crate::constants::capture::FRAME_CHANNEL_CAPACITY;
use std::sync::Arc;

/// A single luminance-plane frame from a capture source
///
/// The data is one byte per pixel (the Y channel of whatever the device
/// delivered), tightly packed with no stride padding. Frames are immutable
/// once produced; sources never retain them after handoff.
#[derive(Debug, Clone)]
pub struct LumaFrame {
    pub width: u32,
    pub height: u32,
    /// Luma bytes, `width * height` long
    pub luma: Arc<[u8]>,
    /// Monotonic milliseconds since the source started
    pub timestamp_ms: u64,
}

impl LumaFrame {
    pub fn new(width: u32, height: u32, luma: Vec<u8>, timestamp_ms: u64) -> Self {
        Self {
            width,
            height,
            luma: Arc::from(luma.into_boxed_slice()),
            timestamp_ms,
        }
    }

    /// Number of luma samples in the frame
    pub fn len(&self) -> usize {
        self.luma.len()
    }

    pub fn is_empty(&self) -> bool {
        self.luma.is_empty()
    }
}

/// Frame sender type for capture streams
pub type FrameSender = futures::channel::mpsc::Sender<LumaFrame>;

/// Frame receiver type for capture streams
pub type FrameReceiver = futures::channel::mpsc::Receiver<LumaFrame>;

/// Create the bounded frame channel used between sources and consumers
pub fn frame_channel() -> (FrameSender, FrameReceiver) {
    futures::channel::mpsc::channel(FRAME_CHANNEL_CAPACITY)
}
