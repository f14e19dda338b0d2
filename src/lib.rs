// SPDX-License-Identifier: GPL-3.0-only

//! luxmeter - camera luminance metering
//!
//! This library provides the core functionality for the luxmeter tool:
//! capture sources stream luminance-plane frames into a throttled sampler
//! that emits at most one mean-luminance value per time window.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`analysis`]: The throttled mean-luminance sampler and its result types
//! - [`capture`]: Frame sources (V4L2 devices, synthetic test pattern),
//!   pixel-format luma extraction, and capture thread lifecycle
//! - [`config`]: User configuration handling
//! - [`constants`]: Defaults shared across the tool
//! - [`errors`]: Error types

pub mod analysis;
pub mod capture;
pub mod config;
pub mod constants;
pub mod errors;

// Re-export commonly used types
pub use analysis::{LumaSample, ThrottledSampler};
pub use capture::LumaFrame;
pub use config::Config;
pub use errors::{AnalysisError, AppError, AppResult, CaptureError};
