// SPDX-License-Identifier: GPL-3.0-only

//! Synthetic frame source
//!
//! Generates a deterministic moving-gradient test pattern at a fixed rate
//! on its own producer thread. Used by `meter --synthetic`, and by tests
//! and demos on machines without a camera. The per-frame mean drifts as
//! the pattern scrolls, which makes throttled sampling visible in the
//! output.

use crate::capture::types::{FrameSender, LumaFrame};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Configuration for the synthetic source
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            width: crate::constants::capture::DEFAULT_WIDTH,
            height: crate::constants::capture::DEFAULT_HEIGHT,
            fps: crate::constants::capture::DEFAULT_FPS,
        }
    }
}

/// Synthetic test-pattern source running on a dedicated producer thread
pub struct SyntheticSource {
    thread_handle: Option<JoinHandle<()>>,
    stop_flag: Arc<AtomicBool>,
}

impl SyntheticSource {
    /// Start generating frames into the given sender.
    pub fn start(config: SyntheticConfig, sender: FrameSender) -> Self {
        let stop_flag = Arc::new(AtomicBool::new(false));
        let stop_flag_clone = Arc::clone(&stop_flag);

        let thread_handle = std::thread::spawn(move || {
            generator_loop(config, sender, stop_flag_clone);
        });

        Self {
            thread_handle: Some(thread_handle),
            stop_flag,
        }
    }

    /// Stop the source and wait for its thread to finish.
    ///
    /// Joining also drops the sender, so consumers observe a closed frame
    /// channel once buffered frames are drained.
    pub fn stop(&mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            if let Err(e) = handle.join() {
                warn!("Synthetic producer thread panicked: {:?}", e);
            }
        }
    }
}

impl Drop for SyntheticSource {
    fn drop(&mut self) {
        if self.thread_handle.is_some() {
            debug!("SyntheticSource dropped, stopping producer thread");
            self.stop();
        }
    }
}

/// Producer thread body: one frame per tick until stopped.
fn generator_loop(config: SyntheticConfig, mut sender: FrameSender, stop_flag: Arc<AtomicBool>) {
    let frame_interval = Duration::from_secs_f64(1.0 / config.fps.max(1) as f64);
    let started = Instant::now();
    let mut frame_count: u64 = 0;

    debug!(
        width = config.width,
        height = config.height,
        fps = config.fps,
        "Synthetic source started"
    );

    while !stop_flag.load(Ordering::SeqCst) {
        let luma = generate_pattern(config.width, config.height, frame_count);
        let timestamp_ms = started.elapsed().as_millis() as u64;
        let frame = LumaFrame::new(config.width, config.height, luma, timestamp_ms);

        // Latest frame wins: drop when the consumer is behind
        if sender.try_send(frame).is_err() {
            trace!(frame_count, "Frame channel full, dropping frame");
        }

        frame_count += 1;
        std::thread::sleep(frame_interval);
    }

    debug!(frames = frame_count, "Synthetic source stopped");
}

/// Generate one frame of the scrolling gradient pattern.
///
/// Pixel value mixes position and frame counter so each frame is distinct
/// but fully deterministic.
fn generate_pattern(width: u32, height: u32, frame_count: u64) -> Vec<u8> {
    let pixel_count = (width * height) as usize;
    let mut luma = vec![0u8; pixel_count];
    for (i, sample) in luma.iter_mut().enumerate() {
        *sample = ((i as u64 + frame_count * 4) % 256) as u8;
    }
    luma
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::types::frame_channel;

    fn tiny_config() -> SyntheticConfig {
        SyntheticConfig {
            width: 16,
            height: 16,
            fps: 120,
        }
    }

    /// Collect up to `count` frames, polling with a deadline.
    fn collect_frames(
        receiver: &mut crate::capture::types::FrameReceiver,
        count: usize,
    ) -> Vec<LumaFrame> {
        let deadline = Instant::now() + Duration::from_secs(2);
        let mut frames = Vec::new();
        while frames.len() < count && Instant::now() < deadline {
            match receiver.try_next() {
                Ok(Some(frame)) => frames.push(frame),
                Ok(None) => break,
                Err(_) => std::thread::sleep(Duration::from_millis(5)),
            }
        }
        frames
    }

    #[test]
    fn test_pattern_is_deterministic() {
        let a = generate_pattern(8, 8, 3);
        let b = generate_pattern(8, 8, 3);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_pattern_scrolls_between_frames() {
        let a = generate_pattern(8, 8, 0);
        let b = generate_pattern(8, 8, 1);
        assert_ne!(a, b);
    }

    #[test]
    fn test_delivered_frames_are_complete_and_ordered() {
        let (sender, mut receiver) = frame_channel();
        let mut source = SyntheticSource::start(tiny_config(), sender);

        let frames = collect_frames(&mut receiver, 3);
        source.stop();

        assert_eq!(frames.len(), 3, "source should deliver frames");
        for frame in &frames {
            assert_eq!(frame.len(), 256);
            assert!(!frame.is_empty());
        }
        // Timestamps feed the sampler, whose contract requires them to be
        // non-decreasing
        for pair in frames.windows(2) {
            assert!(pair[1].timestamp_ms >= pair[0].timestamp_ms);
        }
    }

    #[test]
    fn test_stop_closes_the_frame_channel() {
        let (sender, mut receiver) = frame_channel();
        let mut source = SyntheticSource::start(tiny_config(), sender);
        source.stop();

        // After join the sender is gone; draining any buffered frames must
        // end in a closed channel, not a hang
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            match receiver.try_next() {
                Ok(Some(_)) => continue,
                Ok(None) => return,
                Err(_) => std::thread::sleep(Duration::from_millis(5)),
            }
        }
        panic!("frame channel should close once the source stops");
    }
}
