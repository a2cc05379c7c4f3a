//! Patient roster.
//!
//! The roster lives in the backend and is fetched once at startup from its
//! REST endpoint. Roster errors block monitoring (there is nothing to
//! monitor without a patient) and are surfaced for a manual retry rather
//! than retried automatically.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// A patient record from the roster service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    /// Backend primary key; identifies the patient's stream endpoint.
    pub id: i64,
    /// Human-facing identifier (e.g. "P-1042").
    pub patient_id: String,
    pub name: String,
    pub age: u32,
    pub room: String,
    pub condition: String,
}

/// Client for the roster REST endpoint.
#[derive(Debug, Clone)]
pub struct RosterClient {
    base_url: String,
    client: reqwest::Client,
}

impl RosterClient {
    /// Create a client for the given backend base URL.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Fetch the patient list from `/api/patients/`.
    pub async fn fetch_patients(&self) -> Result<Vec<Patient>> {
        let url = format!("{}/api/patients/", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("roster request to {} failed", url))?
            .error_for_status()
            .context("roster service returned an error")?;
        response.json().await.context("invalid roster payload")
    }
}

/// Load a roster from a JSON file (offline mode).
pub fn load_roster_file(path: &Path) -> Result<Vec<Patient>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read roster file {}", path.display()))?;
    serde_json::from_str(&content).context("invalid roster JSON")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn roster_json() -> &'static str {
        r#"[
            {"id": 1, "patient_id": "P-1001", "name": "John Doe", "age": 67,
             "room": "204A", "condition": "Cardiac monitoring"},
            {"id": 2, "patient_id": "P-1002", "name": "Jane Roe", "age": 54,
             "room": "109B", "condition": "Post-operative"}
        ]"#
    }

    #[test]
    fn test_deserialize_roster() {
        let patients: Vec<Patient> = serde_json::from_str(roster_json()).unwrap();
        assert_eq!(patients.len(), 2);
        assert_eq!(patients[0].patient_id, "P-1001");
        assert_eq!(patients[1].room, "109B");
        assert_eq!(patients[1].age, 54);
    }

    #[test]
    fn test_load_roster_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", roster_json()).unwrap();

        let patients = load_roster_file(file.path()).unwrap();
        assert_eq!(patients.len(), 2);
        assert_eq!(patients[0].name, "John Doe");
    }

    #[test]
    fn test_load_roster_file_missing() {
        let err = load_roster_file(Path::new("/nonexistent/roster.json")).unwrap_err();
        assert!(err.to_string().contains("roster file"));
    }

    #[test]
    fn test_roster_client_strips_trailing_slash() {
        let client = RosterClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.base_url, "http://localhost:8000");
    }
}
