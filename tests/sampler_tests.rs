// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the throttled sampler

use luxmeter::errors::AnalysisError;
use luxmeter::{LumaFrame, ThrottledSampler};
use std::time::Duration;

fn second_sampler() -> ThrottledSampler {
    ThrottledSampler::new(Duration::from_millis(1000))
}

#[test]
fn test_first_frame_always_processed() {
    let mut sampler = second_sampler();
    let result = sampler.offer(&[100, 150, 200], 123_456).unwrap();
    assert_eq!(result, Some(150.0));
}

#[test]
fn test_throttle_window_respected() {
    let mut sampler = second_sampler();
    assert!(sampler.offer(&[50], 10_000).unwrap().is_some());
    assert_eq!(sampler.offer(&[50], 10_999).unwrap(), None);
}

#[test]
fn test_window_boundary_inclusive() {
    let mut sampler = second_sampler();
    assert!(sampler.offer(&[50], 10_000).unwrap().is_some());
    assert!(sampler.offer(&[50], 11_000).unwrap().is_some());
}

#[test]
fn test_mean_correctness() {
    let mut sampler = second_sampler();
    assert_eq!(sampler.offer(&[0, 255], 0).unwrap(), Some(127.5));

    let mut sampler = second_sampler();
    assert_eq!(sampler.offer(&[10, 20, 30], 0).unwrap(), Some(20.0));

    let mut sampler = second_sampler();
    assert_eq!(
        sampler.offer(&[255, 255, 255, 255], 0).unwrap(),
        Some(255.0)
    );
}

#[test]
fn test_empty_frame_does_not_consume_window() {
    let mut sampler = second_sampler();
    assert_eq!(sampler.offer(&[], 500), Err(AnalysisError::EmptyFrame));

    // A follow-up frame within what would have been the window must still
    // be accepted: the failed offer left the sampler untouched.
    assert_eq!(sampler.offer(&[80, 120], 900).unwrap(), Some(100.0));
}

#[test]
fn test_empty_frame_after_a_sample_keeps_the_anchor() {
    let mut sampler = second_sampler();
    assert_eq!(sampler.offer(&[10], 1_000).unwrap(), Some(10.0));

    // The window has reopened, but an empty frame errors without moving
    // the anchor forward
    assert_eq!(sampler.offer(&[], 2_000), Err(AnalysisError::EmptyFrame));

    // Still anchored at t=1000, so the very next non-empty frame past the
    // window is processed
    assert_eq!(sampler.offer(&[40, 60], 2_001).unwrap(), Some(50.0));
}

#[test]
fn test_skip_is_idempotent() {
    let mut sampler = second_sampler();
    assert!(sampler.offer(&[1, 2, 3], 0).unwrap().is_some());
    for _ in 0..10 {
        assert_eq!(sampler.offer(&[9, 9, 9], 400).unwrap(), None);
    }
    // Still anchored at t=0
    assert!(sampler.offer(&[1], 1_000).unwrap().is_some());
}

#[test]
fn test_sampling_a_stream_of_frames() {
    // A 30fps-ish stream for 3 seconds should yield one sample per second
    let mut sampler = second_sampler();
    let mut samples = Vec::new();

    for i in 0..90u64 {
        let t = i * 33;
        let frame = LumaFrame::new(4, 2, vec![(i % 256) as u8; 8], t);
        if let Some(mean) = sampler.offer(&frame.luma, frame.timestamp_ms).unwrap() {
            samples.push((t, mean));
        }
    }

    assert_eq!(samples.len(), 3);
    assert_eq!(samples[0].0, 0);
    // Each subsequent sample is the first frame at or after the boundary
    for pair in samples.windows(2) {
        assert!(pair[1].0 - pair[0].0 >= 1000);
        assert!(pair[1].0 - pair[0].0 < 1033);
    }
}
