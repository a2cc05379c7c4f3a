//! Vitals processing and alert status computation.
//!
//! This module transforms raw feed samples into processed data with
//! per-vital alert status computed from configurable thresholds.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::feed::{Aggregate, RiskLevel, VitalsSample};

/// Margin beyond a heart-rate bound at which a reading becomes critical (bpm).
const HR_CRITICAL_MARGIN: f64 = 20.0;
/// Margin below the SpO2 floor at which a reading becomes critical (%).
const SPO2_CRITICAL_MARGIN: f64 = 5.0;
/// Margin above the temperature ceiling at which a reading becomes critical (F).
const TEMP_CRITICAL_MARGIN: f64 = 2.0;
/// Deviation from 1 g of resting acceleration that indicates an impact.
const FALL_MAGNITUDE_G: f64 = 0.8;

/// Alert thresholds for vital-sign status computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    /// Heart rate below this triggers a warning (bpm).
    pub heart_rate_min: f64,
    /// Heart rate above this triggers a warning (bpm).
    pub heart_rate_max: f64,
    /// SpO2 below this triggers a warning (%).
    pub spo2_min: f64,
    /// Temperature above this triggers a warning (F).
    pub temperature_max: f64,
    /// Whether fall detection is evaluated at all.
    pub fall_detection: bool,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            heart_rate_min: 60.0,
            heart_rate_max: 100.0,
            spo2_min: 95.0,
            temperature_max: 99.5,
            fall_detection: true,
        }
    }
}

/// Alert status for a single vital reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VitalStatus {
    Normal,
    Warning,
    Critical,
}

impl VitalStatus {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            VitalStatus::Normal => "OK",
            VitalStatus::Warning => "WARN",
            VitalStatus::Critical => "CRIT",
        }
    }
}

/// Latest processed vitals ready for display.
#[derive(Debug, Clone)]
pub struct VitalsData {
    pub heart_rate: Option<f64>,
    pub heart_rate_status: VitalStatus,
    pub spo2: Option<f64>,
    pub spo2_status: VitalStatus,
    pub temperature: Option<f64>,
    pub temperature_status: VitalStatus,
    pub ecg: Option<f64>,
    /// Tri-axial acceleration in g, present only when all three axes are.
    pub accel: Option<[f64; 3]>,
    pub motion_status: Option<String>,
    pub fall_detected: bool,
    pub risk_level: RiskLevel,
    pub confidence: Option<f64>,
    pub summary: Option<String>,
    pub aggregates: Vec<Aggregate>,
    /// Worst status across all vitals (falls count as critical).
    pub overall: VitalStatus,
    pub last_updated: Instant,
}

impl VitalsData {
    /// Convert a raw sample into processed data.
    ///
    /// This is the primary conversion method used for every inbound sample.
    pub fn from_sample(sample: VitalsSample, thresholds: &AlertThresholds) -> Self {
        let heart_rate_status = sample.heart_rate.map_or(VitalStatus::Normal, |v| {
            compute_range_status(
                v,
                thresholds.heart_rate_min,
                thresholds.heart_rate_max,
                HR_CRITICAL_MARGIN,
            )
        });

        let spo2_status = sample.spo2.map_or(VitalStatus::Normal, |v| {
            compute_floor_status(v, thresholds.spo2_min, SPO2_CRITICAL_MARGIN)
        });

        let temperature_status = sample.temperature.map_or(VitalStatus::Normal, |v| {
            compute_ceiling_status(v, thresholds.temperature_max, TEMP_CRITICAL_MARGIN)
        });

        let accel = match (sample.accel_x, sample.accel_y, sample.accel_z) {
            (Some(x), Some(y), Some(z)) => Some([x, y, z]),
            _ => None,
        };

        let fall_detected =
            thresholds.fall_detection && detect_fall(sample.motion_status.as_deref(), accel);

        let overall = [heart_rate_status, spo2_status, temperature_status]
            .into_iter()
            .max()
            .unwrap_or(VitalStatus::Normal)
            .max(if fall_detected {
                VitalStatus::Critical
            } else {
                VitalStatus::Normal
            });

        Self {
            heart_rate: sample.heart_rate,
            heart_rate_status,
            spo2: sample.spo2,
            spo2_status,
            temperature: sample.temperature,
            temperature_status,
            ecg: sample.ecg,
            accel,
            motion_status: sample.motion_status,
            fall_detected,
            risk_level: sample.risk_level.unwrap_or_default(),
            confidence: sample.confidence,
            summary: sample.summary,
            aggregates: sample.aggregates,
            overall,
            last_updated: Instant::now(),
        }
    }
}

fn compute_range_status(value: f64, min: f64, max: f64, margin: f64) -> VitalStatus {
    if value < min - margin || value > max + margin {
        VitalStatus::Critical
    } else if value < min || value > max {
        VitalStatus::Warning
    } else {
        VitalStatus::Normal
    }
}

fn compute_floor_status(value: f64, min: f64, margin: f64) -> VitalStatus {
    if value < min - margin {
        VitalStatus::Critical
    } else if value < min {
        VitalStatus::Warning
    } else {
        VitalStatus::Normal
    }
}

fn compute_ceiling_status(value: f64, max: f64, margin: f64) -> VitalStatus {
    if value > max + margin {
        VitalStatus::Critical
    } else if value > max {
        VitalStatus::Warning
    } else {
        VitalStatus::Normal
    }
}

/// Decide whether this sample indicates a fall.
///
/// The motion classifier's verdict wins when present; otherwise an
/// acceleration magnitude far from resting 1 g counts as an impact.
fn detect_fall(motion_status: Option<&str>, accel: Option<[f64; 3]>) -> bool {
    if let Some(status) = motion_status {
        if status.to_ascii_lowercase().contains("fall") {
            return true;
        }
        return false;
    }

    match accel {
        Some([x, y, z]) => {
            let magnitude = (x * x + y * y + z * z).sqrt();
            (magnitude - 1.0).abs() > FALL_MAGNITUDE_G
        }
        None => false,
    }
}
