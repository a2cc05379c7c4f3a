//! Wire types for the live vitals feed.
//!
//! These types match the JSON frames emitted by the vitals backend on the
//! per-patient stream. They serve as the common data format between the
//! backend producer and this dashboard consumer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One frame on the patient stream.
///
/// The backend tags every frame with a `type` field. Kinds this client
/// does not recognize deserialize to [`FeedMessage::Unknown`] and are
/// ignored without error.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum FeedMessage {
    /// Informational greeting sent when the backend accepts the stream.
    #[serde(rename = "connection_established")]
    ConnectionEstablished {
        #[serde(default)]
        message: Option<String>,
    },

    /// A new sample for the subscribed patient.
    #[serde(rename = "vitals_update")]
    VitalsUpdate { data: VitalsSample },

    /// Any frame kind this client does not understand.
    #[serde(other)]
    Unknown,
}

/// Categorical risk classification produced by the backend's scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    /// The backend has not scored this patient yet.
    #[serde(rename = "N/A")]
    #[default]
    Unknown,
}

impl RiskLevel {
    /// Returns the display label for this risk level.
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
            RiskLevel::Unknown => "N/A",
        }
    }
}

/// A single inbound vitals update.
///
/// Every field is optional: the backend sends whatever the sensors and the
/// scoring pipeline produced for this tick. Missing vitals render as
/// unavailable rather than zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VitalsSample {
    /// Heart rate in beats per minute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<f64>,

    /// Blood oxygen saturation in percent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spo2: Option<f64>,

    /// Body temperature in degrees Fahrenheit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    /// Instantaneous ECG value in millivolts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ecg: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub accel_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accel_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accel_z: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,

    /// Scorer confidence in the 0..=1 range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    /// Free-text assessment produced alongside the risk level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Motion classifier output (e.g. "resting", "walking", "fall").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motion_status: Option<String>,

    /// Periodic window summaries, relayed read-only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aggregates: Vec<Aggregate>,

    /// Short-window buffered series, used to seed charts after a switch.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hr_data: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub spo2_data: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ecg_data: Vec<f64>,
}

/// A summarized monitoring window produced by the backend.
///
/// Aggregates carry averaged vitals over a time range plus the risk
/// assessment for that window. This client only relays them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Aggregate {
    pub id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub patient: AggregatePatient,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_heart_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_spo2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_accel_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_accel_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_accel_z: Option<f64>,

    #[serde(default)]
    pub risk_level: RiskLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub summary: String,
    pub created_at: DateTime<Utc>,
}

/// The patient reference embedded in an aggregate record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatePatient {
    pub id: i64,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_vitals_update() {
        let json = r#"{"type":"vitals_update","data":{"heart_rate":72,"spo2":98,"risk_level":"Low"}}"#;

        let message: FeedMessage = serde_json::from_str(json).unwrap();
        let FeedMessage::VitalsUpdate { data } = message else {
            panic!("expected a vitals_update frame");
        };

        assert_eq!(data.heart_rate, Some(72.0));
        assert_eq!(data.spo2, Some(98.0));
        assert_eq!(data.risk_level, Some(RiskLevel::Low));
        assert!(data.temperature.is_none());
        assert!(data.aggregates.is_empty());
        assert!(data.hr_data.is_empty());
    }

    #[test]
    fn test_deserialize_connection_established() {
        let json = r#"{"type":"connection_established","message":"ok"}"#;

        let message: FeedMessage = serde_json::from_str(json).unwrap();
        let FeedMessage::ConnectionEstablished { message } = message else {
            panic!("expected a connection_established frame");
        };
        assert_eq!(message.as_deref(), Some("ok"));
    }

    #[test]
    fn test_unknown_frame_kind_is_tolerated() {
        let json = r#"{"type":"heartbeat","sequence":42}"#;

        let message: FeedMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(message, FeedMessage::Unknown));
    }

    #[test]
    fn test_malformed_frame_is_an_error() {
        assert!(serde_json::from_str::<FeedMessage>("not json").is_err());
        assert!(serde_json::from_str::<FeedMessage>(r#"{"data":{}}"#).is_err());
    }

    #[test]
    fn test_risk_level_not_applicable() {
        let json = r#"{"type":"vitals_update","data":{"risk_level":"N/A"}}"#;

        let message: FeedMessage = serde_json::from_str(json).unwrap();
        let FeedMessage::VitalsUpdate { data } = message else {
            panic!("expected a vitals_update frame");
        };
        assert_eq!(data.risk_level, Some(RiskLevel::Unknown));
        assert_eq!(data.risk_level.unwrap().label(), "N/A");
    }

    #[test]
    fn test_deserialize_sample_with_aggregates() {
        let json = r#"{
            "heart_rate": 81.5,
            "motion_status": "walking",
            "hr_data": [78, 79, 81.5],
            "aggregates": [{
                "id": 3,
                "start_time": "2025-06-01T10:00:00Z",
                "end_time": "2025-06-01T10:05:00Z",
                "patient": { "id": 7, "name": "Jane Roe" },
                "avg_heart_rate": 79.2,
                "avg_spo2": 97.1,
                "risk_level": "Moderate",
                "confidence": 0.82,
                "summary": "Mildly elevated heart rate while ambulating.",
                "created_at": "2025-06-01T10:05:01Z"
            }]
        }"#;

        let sample: VitalsSample = serde_json::from_str(json).unwrap();
        assert_eq!(sample.hr_data, vec![78.0, 79.0, 81.5]);
        assert_eq!(sample.aggregates.len(), 1);

        let agg = &sample.aggregates[0];
        assert_eq!(agg.patient.name, "Jane Roe");
        assert_eq!(agg.risk_level, RiskLevel::Moderate);
        assert_eq!(agg.avg_heart_rate, Some(79.2));
        assert!(agg.avg_temperature.is_none());
        assert!(agg.end_time > agg.start_time);
    }
}
