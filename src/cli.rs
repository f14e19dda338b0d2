// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for luminance metering
//!
//! This module provides command-line functionality for:
//! - Metering average luminance from a live camera or synthetic source
//! - Listing available capture devices
//! - One-shot analysis of image files

use chrono::Local;
use clap::Args;
use luxmeter::analysis::{LumaSample, ThrottledSampler};
use luxmeter::capture::synthetic::{SyntheticConfig, SyntheticSource};
use luxmeter::capture::types::frame_channel;
use luxmeter::capture::v4l2::{V4l2Config, V4l2Source, enumerate_devices};
use luxmeter::config::Config;
use luxmeter::constants::format_elapsed;
use luxmeter::errors::AnalysisError;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Arguments for the `meter` command
#[derive(Args, Default, Debug)]
pub struct MeterArgs {
    /// Capture device path (default: last used, or /dev/video0)
    #[arg(short, long)]
    pub device: Option<String>,

    /// Use the synthetic test-pattern source instead of a camera
    #[arg(long, conflicts_with = "device")]
    pub synthetic: bool,

    /// Throttle window between processed frames in milliseconds
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Metering duration in seconds (0 = run until Ctrl+C)
    #[arg(long, default_value = "0")]
    pub duration: u64,

    /// Requested frame width
    #[arg(long)]
    pub width: Option<u32>,

    /// Requested frame height
    #[arg(long)]
    pub height: Option<u32>,

    /// Requested capture rate in frames per second
    #[arg(long)]
    pub fps: Option<u32>,

    /// Append samples to a CSV file (timestamp,mean,samples)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Either kind of running source; kept alive for the metering loop
enum Source {
    V4l2(V4l2Source),
    Synthetic(SyntheticSource),
}

impl Source {
    fn stop(&mut self) {
        match self {
            Source::V4l2(source) => source.stop(),
            Source::Synthetic(source) => source.stop(),
        }
    }
}

/// Run the metering loop against a camera or the synthetic source
pub fn run_meter(args: MeterArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load();

    let interval_ms = args.interval.unwrap_or(config.sample_interval_ms);
    let width = args.width.unwrap_or(config.frame_width);
    let height = args.height.unwrap_or(config.frame_height);
    let fps = args.fps.unwrap_or(config.fps);

    let (sender, mut receiver) = frame_channel();

    // Persisted only after the device proves itself by delivering a frame;
    // starting merely checks the path exists
    let mut pending_device: Option<String> = None;

    let (mut source, source_label) = if args.synthetic {
        let synthetic = SyntheticSource::start(SyntheticConfig { width, height, fps }, sender);
        (Source::Synthetic(synthetic), "synthetic".to_string())
    } else {
        let device = args
            .device
            .clone()
            .or_else(|| config.last_device_path.clone())
            .unwrap_or_else(|| V4l2Config::default().device);
        let v4l2 = V4l2Source::start(
            V4l2Config {
                device: device.clone(),
                width,
                height,
                fps,
            },
            sender,
        )?;
        pending_device = Some(device.clone());
        (Source::V4l2(v4l2), device)
    };

    let mut csv = match args.log_file.as_ref() {
        Some(path) => Some(open_csv_log(path)?),
        None => None,
    };

    // Stop on Ctrl+C
    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_flag_clone = stop_flag.clone();
    ctrlc::set_handler(move || {
        stop_flag_clone.store(true, Ordering::SeqCst);
    })?;

    info!(
        source = %source_label,
        window = %format_elapsed(interval_ms),
        "Metering started (press Ctrl+C to stop)"
    );

    let mut sampler = ThrottledSampler::new(Duration::from_millis(interval_ms));
    let started = Instant::now();
    let target_duration = (args.duration > 0).then(|| Duration::from_secs(args.duration));
    let first_frame_timeout = Duration::from_secs(5);
    let mut saw_frame = false;

    let result = loop {
        if stop_flag.load(Ordering::SeqCst) {
            break Ok(());
        }
        if let Some(target) = target_duration {
            if started.elapsed() >= target {
                break Ok(());
            }
        }
        if !saw_frame && started.elapsed() > first_frame_timeout {
            break Err(format!("No frames received from {}", source_label).into());
        }

        let frame = match receiver.try_next() {
            Ok(Some(frame)) => frame,
            // Channel closed: the capture thread gave up (details in its logs)
            Ok(None) => break Err(format!("Capture source {} stopped", source_label).into()),
            Err(_) => {
                std::thread::sleep(Duration::from_millis(5));
                continue;
            }
        };
        saw_frame = true;
        if remember_working_device(&mut pending_device, &mut config) {
            if let Err(e) = config.save() {
                warn!(error = %e, "Failed to persist config");
            }
        }

        match sampler.offer(&frame.luma, frame.timestamp_ms) {
            Ok(Some(mean)) => {
                let sample = LumaSample::new(mean, frame.len(), frame.timestamp_ms);
                info!(
                    mean = format!("{:.1}", sample.mean),
                    samples = sample.samples,
                    t = %format_elapsed(sample.timestamp_ms),
                    "Average luminance"
                );
                println!("{:>8}  {:6.1}", format_elapsed(sample.timestamp_ms), sample.mean);
                if let Some(writer) = csv.as_mut() {
                    write_csv_sample(writer, &sample)?;
                }
            }
            Ok(None) => {}
            Err(AnalysisError::EmptyFrame) => {
                // Recoverable: log and keep going, the window was not consumed
                warn!("Dropped empty frame from source");
            }
        }
    };

    source.stop();
    if let Some(writer) = csv.as_mut() {
        writer.flush()?;
    }

    info!(elapsed_secs = started.elapsed().as_secs(), "Metering stopped");
    result
}

/// List all available capture devices
pub fn list_devices() -> Result<(), Box<dyn std::error::Error>> {
    let devices = enumerate_devices();

    if devices.is_empty() {
        println!("No capture devices found.");
        return Ok(());
    }

    println!("Available capture devices:");
    println!();
    for device in &devices {
        if device.driver.is_empty() {
            println!("  {}  {}", device.path, device.card);
        } else {
            println!("  {}  {} ({})", device.path, device.card, device.driver);
        }
        if !device.formats.is_empty() {
            println!("      Formats: {}", device.formats.join(", "));
        }
        println!();
    }

    Ok(())
}

/// Compute mean luminance for each image file
pub fn analyze_images(images: Vec<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    let mut failures = 0usize;

    rt.block_on(async {
        for path in &images {
            match analyze_one(path).await {
                Ok(mean) => {
                    println!("{}  {:.1}", path.display(), mean);
                }
                Err(e) => {
                    failures += 1;
                    eprintln!("{}: {}", path.display(), e);
                }
            }
        }
    });

    if failures > 0 {
        return Err(format!("{} of {} images failed", failures, images.len()).into());
    }
    Ok(())
}

/// Load one image, reduce it to a luma plane, and run it through a fresh
/// sampler (its first offer is never throttled).
async fn analyze_one(path: &PathBuf) -> Result<f64, Box<dyn std::error::Error>> {
    let bytes = tokio::fs::read(path).await?;

    // Decode in a blocking task; image decoding is CPU-bound
    let luma = tokio::task::spawn_blocking(move || {
        image::load_from_memory(&bytes).map(|img| img.to_luma8().into_raw())
    })
    .await??;

    let mut sampler = ThrottledSampler::new(Duration::from_millis(0));
    match sampler.offer(&luma, 0)? {
        Some(mean) => Ok(mean),
        None => Err("sampler unexpectedly throttled a first frame".into()),
    }
}

/// Record a device as the last working one, once it has delivered a frame.
///
/// Takes the pending path so the update happens exactly once per run;
/// returns whether the config changed and needs saving. The synthetic
/// source never sets a pending path.
fn remember_working_device(pending: &mut Option<String>, config: &mut Config) -> bool {
    match pending.take() {
        Some(device) => {
            config.last_device_path = Some(device);
            true
        }
        None => false,
    }
}

/// Open the CSV sample log, writing a header for new files
fn open_csv_log(path: &PathBuf) -> Result<std::io::BufWriter<std::fs::File>, std::io::Error> {
    let existed = path.exists();
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    let mut writer = std::io::BufWriter::new(file);
    if !existed {
        writeln!(writer, "timestamp,mean,samples")?;
    }
    Ok(writer)
}

fn write_csv_sample(
    writer: &mut std::io::BufWriter<std::fs::File>,
    sample: &LumaSample,
) -> Result<(), std::io::Error> {
    writeln!(
        writer,
        "{},{:.3},{}",
        Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
        sample.mean,
        sample.samples
    )
}
