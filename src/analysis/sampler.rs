// SPDX-License-Identifier: GPL-3.0-only

//! Throttled mean-luminance sampler
//!
//! Consumes frames one at a time and suppresses all but at most one frame
//! per time window. A processed frame produces the arithmetic mean of its
//! luma bytes. The sampler holds no clock of its own: callers stamp every
//! `offer` with monotonic milliseconds, which keeps the component trivially
//! testable with synthetic timestamps.

use crate::errors::AnalysisError;
use std::time::Duration;
use tracing::trace;

/// Sampler that processes at most one frame per interval.
///
/// Single-threaded access is assumed; callers that feed frames from
/// multiple producer threads must serialize their `offer` calls. Timestamps
/// must be non-decreasing across successive calls.
#[derive(Debug, Clone)]
pub struct ThrottledSampler {
    /// Minimum time between two processed frames, in milliseconds
    interval_ms: u64,
    /// Timestamp of the last processed frame; `None` until the first frame
    /// is processed, so the first offer is never throttled
    last_processed_ms: Option<u64>,
}

impl ThrottledSampler {
    /// Create a sampler with the given throttle window.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval_ms: interval.as_millis() as u64,
            last_processed_ms: None,
        }
    }

    /// The throttle window in milliseconds.
    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Offer a frame's luma bytes for processing.
    ///
    /// Returns `Ok(None)` when the frame falls inside the throttle window,
    /// `Ok(Some(mean))` when the frame was processed, and
    /// `Err(AnalysisError::EmptyFrame)` when the window permits processing
    /// but the frame carries zero samples. The window boundary is inclusive:
    /// a frame arriving exactly `interval` after the last processed one is
    /// processed. State only advances on a processed frame, so an empty
    /// frame leaves the next offer measured against the original boundary.
    pub fn offer(&mut self, samples: &[u8], now_ms: u64) -> Result<Option<f64>, AnalysisError> {
        if let Some(last) = self.last_processed_ms {
            if now_ms.saturating_sub(last) < self.interval_ms {
                trace!(now_ms, last, "Frame throttled");
                return Ok(None);
            }
        }

        if samples.is_empty() {
            return Err(AnalysisError::EmptyFrame);
        }

        let sum: u64 = samples.iter().map(|&v| u64::from(v)).sum();
        let mean = sum as f64 / samples.len() as f64;

        self.last_processed_ms = Some(now_ms);
        Ok(Some(mean))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sampler() -> ThrottledSampler {
        ThrottledSampler::new(Duration::from_millis(1000))
    }

    #[test]
    fn test_first_frame_processed_regardless_of_timestamp() {
        for t in [0u64, 1, 999, u64::MAX] {
            let mut s = sampler();
            let result = s.offer(&[42, 42], t).unwrap();
            assert_eq!(result, Some(42.0), "first frame at t={} must process", t);
        }
    }

    #[test]
    fn test_frames_inside_window_are_skipped() {
        let mut s = sampler();
        assert!(s.offer(&[1], 5_000).unwrap().is_some());
        assert_eq!(s.offer(&[1], 5_001).unwrap(), None);
        assert_eq!(s.offer(&[1], 5_999).unwrap(), None);
    }

    #[test]
    fn test_window_boundary_is_inclusive() {
        let mut s = sampler();
        assert!(s.offer(&[1], 1_000).unwrap().is_some());
        assert!(s.offer(&[1], 2_000).unwrap().is_some());
    }

    #[test]
    fn test_mean_values() {
        let mut s = sampler();
        assert_eq!(s.offer(&[0, 255], 0).unwrap(), Some(127.5));

        let mut s = sampler();
        assert_eq!(s.offer(&[10, 20, 30], 0).unwrap(), Some(20.0));

        let mut s = sampler();
        assert_eq!(s.offer(&[255; 4], 0).unwrap(), Some(255.0));
    }

    #[test]
    fn test_high_bytes_summed_as_unsigned() {
        // 0x80..0xFF must not be treated as negative
        let mut s = sampler();
        let mean = s.offer(&[128, 130], 0).unwrap().unwrap();
        assert_eq!(mean, 129.0);
    }

    #[test]
    fn test_empty_frame_is_an_error_and_leaves_state_untouched() {
        let mut s = sampler();
        assert_eq!(s.offer(&[], 100), Err(AnalysisError::EmptyFrame));
        // The failed offer did not consume the window: the very next
        // non-empty frame is still accepted, even just 1ms later.
        assert!(s.offer(&[7], 101).unwrap().is_some());
    }

    #[test]
    fn test_skips_do_not_mutate_state() {
        let mut s = sampler();
        assert!(s.offer(&[1], 0).unwrap().is_some());
        for _ in 0..5 {
            assert_eq!(s.offer(&[1], 500).unwrap(), None);
        }
        // Window still anchored at t=0, so t=1000 processes.
        assert!(s.offer(&[1], 1_000).unwrap().is_some());
    }

    #[test]
    fn test_custom_interval() {
        let mut s = ThrottledSampler::new(Duration::from_millis(250));
        assert!(s.offer(&[1], 0).unwrap().is_some());
        assert_eq!(s.offer(&[1], 249).unwrap(), None);
        assert!(s.offer(&[1], 250).unwrap().is_some());
    }
}
