// SPDX-License-Identifier: GPL-3.0-only

//! Frame analysis
//!
//! Home of the throttled luminance sampler: frames arrive from a capture
//! source, the sampler decides per frame whether the throttle window allows
//! processing, and processed frames produce a single mean-luminance sample.

pub mod sampler;
pub mod types;

pub use sampler::ThrottledSampler;
pub use types::LumaSample;
