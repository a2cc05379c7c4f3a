//! # vitalwatch
//!
//! A terminal dashboard and library for live patient vital-sign monitoring.
//!
//! This crate renders live and historical vitals (heart rate, SpO₂,
//! temperature, ECG waveform, accelerometer/fall detection) for a selected
//! patient. Samples arrive over a persistent, auto-reconnecting WebSocket
//! bound to one patient at a time; the patient roster is fetched once at
//! startup from a REST endpoint. Aggregation and risk scoring live in the
//! backend - this crate only consumes them.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │(processing)   │(rendering)   │         │ │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘ │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  ┌─────────┐                                                │
//! │  │  feed   │◀── SocketFeed | FileFeed | ChannelFeed        │
//! │  │ (input) │                                                │
//! │  └─────────┘                                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state, patient selection, and interaction logic
//! - **[`feed`]**: Sample source abstraction ([`VitalsSource`] trait) with the
//!   reconnecting WebSocket client, file polling, and channel-based input
//! - **[`data`]**: Data models and processing - annotates raw samples with
//!   alert status from [`AlertThresholds`] and tracks per-patient [`History`]
//!   for charts
//! - **[`roster`]**: The patient-roster REST collaborator
//! - **[`ui`]**: Terminal rendering using ratatui - dashboard, aggregate
//!   history, settings, and theme support
//!
//! ## Invariants
//!
//! At most one live connection is open per app. Switching patients drops
//! the old [`SocketFeed`] (closing its transport and its sample channel)
//! before the replacement opens, so a stale stream can never surface a
//! sample after the switch.
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Monitor against a live backend
//! vitalwatch --server http://ward-3.local:8000
//!
//! # Replay a recorded sample file
//! vitalwatch --file vitals.json
//! ```
//!
//! ### As a library with a file feed
//!
//! ```
//! use vitalwatch::{App, AlertThresholds, FileFeed};
//!
//! let source = Box::new(FileFeed::new("vitals.json"));
//! let app = App::new_with_source(
//!     source,
//!     AlertThresholds::default(),
//!     "vitalwatch.json".into(),
//! );
//! ```
//!
//! ### As a library with a channel feed (for embedding)
//!
//! ```
//! use vitalwatch::{App, AlertThresholds, ChannelFeed, VitalsSample};
//!
//! // Create a channel for pushing samples
//! let (tx, feed) = ChannelFeed::create("bedside-bridge");
//!
//! let app = App::new_with_source(
//!     Box::new(feed),
//!     AlertThresholds::default(),
//!     "vitalwatch.json".into(),
//! );
//!
//! tx.try_send(VitalsSample {
//!     heart_rate: Some(72.0),
//!     ..VitalsSample::default()
//! }).unwrap();
//! ```

pub mod app;
pub mod data;
pub mod events;
pub mod feed;
pub mod roster;
pub mod settings;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, View};
pub use data::{AlertThresholds, History, VitalStatus, VitalsData};
pub use feed::{
    Aggregate, AggregatePatient, ChannelFeed, FeedConfig, FeedMessage, FileFeed, RiskLevel,
    SocketFeed, VitalsSample, VitalsSource,
};
pub use roster::{Patient, RosterClient};
pub use settings::{load_settings, save_settings, Settings};
