// SPDX-License-Identifier: GPL-3.0-only

//! Result types for frame analysis

/// One emitted mean-luminance sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LumaSample {
    /// Arithmetic mean of the frame's luma bytes, in `[0.0, 255.0]`
    pub mean: f64,
    /// Number of bytes the mean was computed over
    pub samples: usize,
    /// Monotonic timestamp of the processed frame, in milliseconds
    pub timestamp_ms: u64,
}

impl LumaSample {
    pub fn new(mean: f64, samples: usize, timestamp_ms: u64) -> Self {
        Self {
            mean,
            samples,
            timestamp_ms,
        }
    }
}
