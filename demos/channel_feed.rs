//! Example: feeding the dashboard from a channel
//!
//! This example demonstrates how to integrate vitalwatch into your own
//! application by pushing samples through a channel.
//!
//! This is useful when you want to:
//! - Bridge from a bedside device or gateway you already talk to
//! - Generate synthetic data for testing
//! - Replay a recorded session
//!
//! # Usage
//!
//! ```bash
//! cargo run --example channel_feed
//! ```

use std::thread;
use std::time::Duration;

use vitalwatch::{ChannelFeed, VitalsSample, VitalsSource};

fn main() {
    println!("Channel feed example");
    println!("Generating synthetic vitals...\n");

    // Create a channel feed - this returns both a sender and the feed
    let (tx, mut feed) = ChannelFeed::create("synthetic-data");

    // Spawn a thread that plays the role of the backend
    thread::spawn(move || {
        let mut tick = 0u64;

        loop {
            tick += 1;
            let phase = tick as f64 * 0.3;

            let sample = VitalsSample {
                heart_rate: Some(72.0 + 6.0 * phase.sin()),
                spo2: Some(97.5 + 1.5 * (phase * 0.5).cos()),
                temperature: Some(98.4 + 0.3 * (phase * 0.1).sin()),
                ecg: Some(0.8 * (phase * 4.0).sin()),
                accel_x: Some(0.02),
                accel_y: Some(-0.01),
                accel_z: Some(0.99),
                motion_status: Some("resting".to_string()),
                ..VitalsSample::default()
            };

            if tx.blocking_send(sample).is_err() {
                break; // Receiver dropped
            }

            thread::sleep(Duration::from_secs(1));
        }
    });

    // Poll the feed in the main thread
    println!("Receiving samples (press Ctrl+C to stop):\n");

    loop {
        if let Some(sample) = feed.poll() {
            println!(
                "HR {:>5.1} bpm | SpO2 {:>5.1} % | Temp {:>5.1} F | motion: {}",
                sample.heart_rate.unwrap_or(0.0),
                sample.spo2.unwrap_or(0.0),
                sample.temperature.unwrap_or(0.0),
                sample.motion_status.as_deref().unwrap_or("-"),
            );
        }

        thread::sleep(Duration::from_millis(100));
    }
}
