// SPDX-License-Identifier: GPL-3.0-only

//! Frame capture sources
//!
//! Sources produce [`LumaFrame`]s on their own thread and push them through
//! a bounded channel. When the consumer falls behind, producers drop frames
//! instead of blocking; the meter only cares about the latest frame.

pub mod converters;
pub mod synthetic;
pub mod types;
pub mod v4l2;

pub use types::{FrameReceiver, FrameSender, LumaFrame, frame_channel};
