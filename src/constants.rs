// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Minimum interval enforced between two processed frames.
///
/// Matches the one-sample-per-second cadence of the luminosity analyzer
/// this tool grew out of. Overridable per run via `meter --interval`.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(1000);

/// Capture defaults
pub mod capture {
    /// Default frame width requested from capture sources
    pub const DEFAULT_WIDTH: u32 = 640;

    /// Default frame height requested from capture sources
    pub const DEFAULT_HEIGHT: u32 = 480;

    /// Default capture rate in frames per second
    pub const DEFAULT_FPS: u32 = 30;

    /// Bounded frame channel capacity between capture threads and consumers.
    ///
    /// Producers drop frames when the channel is full; the meter only ever
    /// needs the latest frame.
    pub const FRAME_CHANNEL_CAPACITY: usize = 10;
}

/// Configuration file locations
pub mod config_file {
    /// Directory name under the user config dir
    pub const APP_DIR: &str = "luxmeter";

    /// Configuration file name
    pub const FILE_NAME: &str = "config.json";
}

/// Format elapsed milliseconds for display (e.g., "1.5s" or "250ms")
pub fn format_elapsed(ms: u64) -> String {
    if ms >= 1000 && ms % 100 == 0 {
        let secs = ms as f64 / 1000.0;
        if secs == secs.floor() {
            format!("{}s", secs as u64)
        } else {
            format!("{:.1}s", secs)
        }
    } else {
        format!("{}ms", ms)
    }
}
