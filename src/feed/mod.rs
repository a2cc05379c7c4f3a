//! Sample sources for the dashboard.
//!
//! This module provides a trait-based abstraction for receiving vitals
//! samples from various sources - the live per-patient WebSocket stream,
//! file replay, or in-memory channels.

mod channel;
mod file;
mod message;
mod socket;

pub use channel::ChannelFeed;
pub use file::FileFeed;
pub use message::{Aggregate, AggregatePatient, FeedMessage, RiskLevel, VitalsSample};
pub use socket::{FeedConfig, SocketFeed};

use std::fmt::Debug;

/// Trait for receiving vitals samples from various sources.
///
/// Implementations provide samples from different backends - the live
/// WebSocket stream, file polling, or in-process channels.
///
/// # Example
///
/// ```
/// use vitalwatch::{FileFeed, VitalsSource};
///
/// let mut feed = FileFeed::new("vitals.json");
/// if let Some(sample) = feed.poll() {
///     println!("heart rate: {:?}", sample.heart_rate);
/// }
/// ```
pub trait VitalsSource: Send + Debug {
    /// Poll for the next sample, in delivery order.
    ///
    /// Returns `Some(sample)` if new data is available, `None` otherwise.
    /// This method should be non-blocking; callers drain it each tick and
    /// keep the last returned sample as the latest.
    fn poll(&mut self) -> Option<VitalsSample>;

    /// Whether the underlying transport currently has a live connection.
    ///
    /// True only between a successful open and the next close.
    fn connected(&self) -> bool;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the status bar.
    fn description(&self) -> &str;

    /// The most recent source error, if any.
    fn error(&self) -> Option<String>;
}
