//! Example: reading vitals from a JSON file
//!
//! This example demonstrates how to use vitalwatch to watch a vitals
//! sample file that some other process rewrites.
//!
//! The file should contain a single JSON sample object.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example file_feed -- path/to/vitals.json
//! ```

use std::env;
use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use vitalwatch::{FileFeed, VitalsSource};

fn main() {
    let path = env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: cargo run --example file_feed -- <path-to-vitals.json>");
        eprintln!();
        eprintln!("The file should contain a JSON sample in the format:");
        eprintln!(r#"  {{"heart_rate": 72, "spo2": 98, "temperature": 98.6}}"#);
        std::process::exit(1);
    });

    println!("Watching file: {}", path);
    println!("Press Ctrl+C to stop\n");

    let mut feed = FileFeed::new(&path);

    loop {
        match feed.poll() {
            Some(sample) => {
                println!(
                    "HR {:?} bpm | SpO2 {:?} % | Temp {:?} F | risk: {}",
                    sample.heart_rate,
                    sample.spo2,
                    sample.temperature,
                    sample.risk_level.unwrap_or_default().label(),
                );
            }
            None => {
                if let Some(err) = feed.error() {
                    eprint!("\rError: {}  ", err);
                } else {
                    print!("\rWaiting for changes...  ");
                }
                io::stdout().flush().unwrap();
            }
        }

        thread::sleep(Duration::from_millis(500));
    }
}
