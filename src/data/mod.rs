//! Data models and processing for vitals samples.
//!
//! This module handles the transformation of raw feed samples into
//! structured, alert-annotated data suitable for display.
//!
//! ## Submodules
//!
//! - [`history`]: Per-patient historical tracking for charts and sparklines
//! - [`vitals`]: Core data models ([`VitalsData`], [`AlertThresholds`], [`VitalStatus`])
//!
//! ## Data Flow
//!
//! ```text
//! VitalsSample (raw JSON)
//!        │
//!        ▼
//! VitalsData::from_sample()
//!        │
//!        ├──▶ per-vital VitalStatus (computed from AlertThresholds)
//!        │
//!        └──▶ History::record() (for charts)
//! ```

pub mod history;
pub mod vitals;

pub use history::{normalize_levels, History, PatientSeries};
pub use vitals::{AlertThresholds, VitalStatus, VitalsData};
