// SPDX-License-Identifier: GPL-3.0-only

//! V4L2 device source
//!
//! Captures frames from a local V4L2 device node. The device and its mmap
//! stream live entirely on a dedicated capture thread (the stream borrows
//! the device, so neither can leave that thread); the source hands out
//! frames through the bounded channel and is stopped via a shared flag.

use crate::capture::converters;
use crate::capture::types::{FrameSender, LumaFrame};
use crate::errors::CaptureError;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Instant;
use tracing::{debug, error, info, trace, warn};

/// Formats we can reduce to a luma plane, in preference order
const PREFERRED_FOURCCS: [&[u8; 4]; 4] = [b"GREY", b"YUYV", b"UYVY", b"RGB3"];

/// Give up after this many consecutive capture failures
const MAX_CONSECUTIVE_ERRORS: u32 = 10;

/// Configuration for a V4L2 source
#[derive(Debug, Clone)]
pub struct V4l2Config {
    /// Device path (e.g., "/dev/video0")
    pub device: String,
    /// Preferred frame width
    pub width: u32,
    /// Preferred frame height
    pub height: u32,
    /// Target frame rate
    pub fps: u32,
}

impl Default for V4l2Config {
    fn default() -> Self {
        Self {
            device: "/dev/video0".to_string(),
            width: crate::constants::capture::DEFAULT_WIDTH,
            height: crate::constants::capture::DEFAULT_HEIGHT,
            fps: crate::constants::capture::DEFAULT_FPS,
        }
    }
}

/// V4L2 frame source running on a dedicated capture thread
pub struct V4l2Source {
    thread_handle: Option<JoinHandle<()>>,
    stop_flag: Arc<AtomicBool>,
}

impl V4l2Source {
    /// Start capturing from the configured device.
    ///
    /// The device path is validated here; open and format failures inside
    /// the capture thread are logged and end the stream (the consumer
    /// observes a closed frame channel).
    pub fn start(config: V4l2Config, sender: FrameSender) -> Result<Self, CaptureError> {
        if !Path::new(&config.device).exists() {
            return Err(CaptureError::DeviceNotFound(config.device));
        }

        let stop_flag = Arc::new(AtomicBool::new(false));
        let stop_flag_clone = Arc::clone(&stop_flag);

        let thread_handle = std::thread::spawn(move || {
            capture_loop(config, sender, stop_flag_clone);
        });

        Ok(Self {
            thread_handle: Some(thread_handle),
            stop_flag,
        })
    }

    /// Stop the source and wait for the capture thread to finish.
    pub fn stop(&mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            if let Err(e) = handle.join() {
                warn!("V4L2 capture thread panicked: {:?}", e);
            }
        }
    }
}

impl Drop for V4l2Source {
    fn drop(&mut self) {
        if self.thread_handle.is_some() {
            debug!("V4l2Source dropped, stopping capture thread");
            self.stop();
        }
    }
}

/// Capture thread body: owns the device and stream for their whole life.
fn capture_loop(config: V4l2Config, mut sender: FrameSender, stop_flag: Arc<AtomicBool>) {
    use v4l::buffer::Type;
    use v4l::io::traits::CaptureStream;
    use v4l::prelude::MmapStream;
    use v4l::video::Capture;

    let mut device = match v4l::Device::with_path(&config.device) {
        Ok(device) => device,
        Err(e) => {
            error!(device = %config.device, error = %e, "Failed to open V4L2 device");
            return;
        }
    };

    let format = match negotiate_format(&device, &config) {
        Ok(format) => format,
        Err(e) => {
            error!(device = %config.device, error = %e, "Format negotiation failed");
            return;
        }
    };

    if config.fps > 0 {
        let params = v4l::video::capture::Parameters::with_fps(config.fps);
        if let Err(e) = device.set_params(&params) {
            warn!(device = %config.device, error = %e, "Failed to set frame rate");
        }
    }

    let mut stream = match MmapStream::with_buffers(&mut device, Type::VideoCapture, 4) {
        Ok(stream) => stream,
        Err(e) => {
            error!(device = %config.device, error = %e, "Failed to create capture stream");
            return;
        }
    };

    info!(
        device = %config.device,
        width = format.width,
        height = format.height,
        fourcc = %format.fourcc,
        "V4L2 capture started"
    );

    let started = Instant::now();
    let mut consecutive_errors: u32 = 0;

    loop {
        if stop_flag.load(Ordering::SeqCst) {
            debug!(device = %config.device, "Stop signal received");
            break;
        }

        let (buf, _meta) = match stream.next() {
            Ok(result) => result,
            Err(e) => {
                consecutive_errors += 1;
                warn!(device = %config.device, error = %e, "Frame capture failed");
                if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                    error!(device = %config.device, "Too many capture failures, giving up");
                    break;
                }
                continue;
            }
        };
        consecutive_errors = 0;

        // Format was negotiated from the supported set, so this never
        // returns None in practice
        let Some(luma) = converters::extract_luma(&format.fourcc.repr, buf) else {
            error!(fourcc = %format.fourcc, "Unconvertible format in capture loop");
            break;
        };

        let timestamp_ms = started.elapsed().as_millis() as u64;
        let frame = LumaFrame::new(format.width, format.height, luma, timestamp_ms);

        // Latest frame wins: drop when the consumer is behind
        if sender.try_send(frame).is_err() {
            trace!(device = %config.device, "Frame channel full, dropping frame");
        }
    }

    info!(device = %config.device, "V4L2 capture stopped");
}

/// Negotiate a capture format we can reduce to a luma plane.
///
/// Tries the preferred FourCCs in order at the requested geometry; drivers
/// answer with what they actually applied, so the answer is checked too.
fn negotiate_format(
    device: &v4l::Device,
    config: &V4l2Config,
) -> Result<v4l::Format, CaptureError> {
    use v4l::video::Capture;

    let mut format = device
        .format()
        .map_err(|e| CaptureError::StreamFailed(format!("read format: {}", e)))?;
    format.width = config.width;
    format.height = config.height;

    for fourcc in PREFERRED_FOURCCS {
        format.fourcc = v4l::FourCC::new(fourcc);
        match device.set_format(&format) {
            Ok(applied) if applied.fourcc.repr == *fourcc => {
                debug!(fourcc = %applied.fourcc, "Negotiated capture format");
                return Ok(applied);
            }
            Ok(_) => {}
            Err(e) => {
                trace!(fourcc = %format.fourcc, error = %e, "Format rejected");
            }
        }
    }

    // Last resort: whatever the driver is currently configured for, if we
    // happen to be able to convert it
    let current = device
        .format()
        .map_err(|e| CaptureError::StreamFailed(format!("read format: {}", e)))?;
    if converters::is_supported(&current.fourcc.repr) {
        return Ok(current);
    }

    Err(CaptureError::FormatNotSupported(format!(
        "device offers no luma-convertible format (current: {})",
        current.fourcc
    )))
}

/// Summary of an enumerated capture device
#[derive(Debug, Clone)]
pub struct DeviceSummary {
    /// Device path (e.g., /dev/video0)
    pub path: String,
    /// Device name (V4L2 card, or sysfs name as fallback)
    pub card: String,
    /// Kernel driver name
    pub driver: String,
    /// FourCC codes of the formats the device offers
    pub formats: Vec<String>,
}

/// Enumerate V4L2 capture devices by scanning /dev/video*.
pub fn enumerate_devices() -> Vec<DeviceSummary> {
    use v4l::video::Capture;

    let mut devices = Vec::new();

    let entries = match std::fs::read_dir("/dev") {
        Ok(entries) => entries,
        Err(_) => return devices,
    };

    for entry in entries.flatten() {
        let name = entry.file_name();
        let name_str = name.to_string_lossy();
        if !name_str.starts_with("video") {
            continue;
        }

        let path = format!("/dev/{}", name_str);
        let device = match v4l::Device::with_path(&path) {
            Ok(device) => device,
            Err(e) => {
                trace!(path = %path, error = %e, "Skipping unopenable device");
                continue;
            }
        };

        let (card, driver) = match device.query_caps() {
            Ok(caps) => (caps.card, caps.driver),
            Err(_) => (sysfs_device_name(&name_str), String::new()),
        };

        let formats = device
            .enum_formats()
            .map(|descriptions| {
                descriptions
                    .iter()
                    .map(|desc| desc.fourcc.to_string())
                    .collect()
            })
            .unwrap_or_default();

        devices.push(DeviceSummary {
            path,
            card,
            driver,
            formats,
        });
    }

    devices.sort_by(|a, b| a.path.cmp(&b.path));
    devices
}

/// Read the device name from sysfs when the capability query fails
fn sysfs_device_name(node: &str) -> String {
    std::fs::read_to_string(format!("/sys/class/video4linux/{}/name", node))
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}
