//! Application state and navigation logic.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;

use crate::data::{AlertThresholds, History, VitalsData};
use crate::feed::{Aggregate, SocketFeed, VitalsSource};
use crate::roster::Patient;
use crate::settings::{save_settings, Settings};
use crate::ui::history::SortColumn;
use crate::ui::settings::SettingsField;
use crate::ui::Theme;

/// History key used when the app runs on a fixed source (file replay,
/// embedded channel) with no roster.
const REPLAY_KEY: &str = "replay";

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Live charts, ECG waveform, motion monitor and risk assessment.
    Dashboard,
    /// Table of backend-produced aggregate windows.
    History,
    /// Alert-threshold editor.
    Settings,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Dashboard => View::History,
            View::History => View::Settings,
            View::Settings => View::Dashboard,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Dashboard => View::Settings,
            View::History => View::Dashboard,
            View::Settings => View::History,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::History => "History",
            View::Settings => "Settings",
        }
    }
}

/// How the app acquires samples.
#[derive(Debug)]
enum FeedMode {
    /// One live WebSocket per selected patient.
    Live {
        runtime: tokio::runtime::Handle,
        server_url: String,
    },
    /// A fixed source; no patient switching.
    Fixed,
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    pub show_patient_selector: bool,

    mode: FeedMode,
    feed: Option<Box<dyn VitalsSource>>,

    // Roster
    pub patients: Vec<Patient>,
    pub selected_patient: Option<usize>,
    pub selector_index: usize,
    pub roster_error: Option<String>,

    // Data
    pub vitals: Option<VitalsData>,
    pub history: History,
    pub aggregates: Vec<Aggregate>,
    pub thresholds: AlertThresholds,
    pub load_error: Option<String>,

    // History view
    pub sort_column: SortColumn,
    pub sort_ascending: bool,
    pub filter_text: String,
    pub filter_active: bool,
    pub selected_row: usize,

    // Settings view
    pub settings_field: SettingsField,
    pub settings_dirty: bool,
    settings_path: PathBuf,

    // UI
    pub theme: Theme,
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create an app in live mode: one WebSocket feed per selected patient.
    ///
    /// No transport is opened until a patient is selected.
    pub fn new_live(
        runtime: tokio::runtime::Handle,
        server_url: String,
        patients: Vec<Patient>,
        roster_error: Option<String>,
        thresholds: AlertThresholds,
        settings_path: PathBuf,
    ) -> Self {
        Self::build(
            FeedMode::Live {
                runtime,
                server_url,
            },
            None,
            patients,
            roster_error,
            thresholds,
            settings_path,
        )
    }

    /// Create an app over a fixed source (file replay or embedded channel).
    pub fn new_with_source(
        source: Box<dyn VitalsSource>,
        thresholds: AlertThresholds,
        settings_path: PathBuf,
    ) -> Self {
        Self::build(
            FeedMode::Fixed,
            Some(source),
            Vec::new(),
            None,
            thresholds,
            settings_path,
        )
    }

    fn build(
        mode: FeedMode,
        feed: Option<Box<dyn VitalsSource>>,
        patients: Vec<Patient>,
        roster_error: Option<String>,
        thresholds: AlertThresholds,
        settings_path: PathBuf,
    ) -> Self {
        Self {
            running: true,
            current_view: View::Dashboard,
            show_help: false,
            show_patient_selector: false,
            mode,
            feed,
            patients,
            selected_patient: None,
            selector_index: 0,
            roster_error,
            vitals: None,
            history: History::new(),
            aggregates: Vec::new(),
            thresholds,
            load_error: None,
            sort_column: SortColumn::default(),
            sort_ascending: false, // Newest windows first
            filter_text: String::new(),
            filter_active: false,
            selected_row: 0,
            settings_field: SettingsField::default(),
            settings_dirty: false,
            settings_path,
            theme: Theme::auto_detect(),
            status_message: None,
        }
    }

    /// The currently monitored patient, if any.
    pub fn selected_patient(&self) -> Option<&Patient> {
        self.selected_patient.and_then(|i| self.patients.get(i))
    }

    /// Key under which the active stream's history is recorded.
    pub fn chart_key(&self) -> String {
        self.selected_patient()
            .map(|p| p.patient_id.clone())
            .unwrap_or_else(|| REPLAY_KEY.to_string())
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.feed
            .as_deref()
            .map(|f| f.description())
            .unwrap_or("no source")
    }

    /// Whether the active source currently has a live connection.
    pub fn connected(&self) -> bool {
        self.feed.as_deref().is_some_and(|f| f.connected())
    }

    /// The backend base URL in live mode.
    pub fn server_url(&self) -> Option<String> {
        match &self.mode {
            FeedMode::Live { server_url, .. } => Some(server_url.clone()),
            FeedMode::Fixed => None,
        }
    }

    /// Select a patient by roster index, tearing down the previous feed.
    ///
    /// The old transport is dropped (closing its connection and its sample
    /// channel) before the replacement opens, so a superseded stream can
    /// never surface a stale sample.
    pub fn select_patient(&mut self, index: usize) {
        if index >= self.patients.len() {
            return;
        }
        self.show_patient_selector = false;
        if self.selected_patient == Some(index) {
            return;
        }

        self.selected_patient = Some(index);
        self.selector_index = index;

        // Reset per-patient display state before the new stream starts
        self.vitals = None;
        self.aggregates.clear();
        self.selected_row = 0;
        self.load_error = None;

        // Close the old transport before opening the new one
        self.feed = None;
        if let FeedMode::Live {
            runtime,
            server_url,
        } = &self.mode
        {
            let patient = &self.patients[index];
            self.feed = Some(Box::new(SocketFeed::connect(
                runtime,
                server_url,
                &patient.id.to_string(),
            )));
        }
    }

    /// Select a patient by its roster `patient_id`. Returns false if absent.
    pub fn select_patient_by_id(&mut self, patient_id: &str) -> bool {
        match self.patients.iter().position(|p| p.patient_id == patient_id) {
            Some(index) => {
                self.select_patient(index);
                true
            }
            None => false,
        }
    }

    /// Select the first roster entry, if the roster is non-empty.
    pub fn select_first_patient(&mut self) {
        if !self.patients.is_empty() {
            self.select_patient(0);
        }
    }

    /// Re-fetch the roster (live mode only). Blocks briefly.
    pub fn retry_roster(&mut self) {
        let (runtime, server_url) = match &self.mode {
            FeedMode::Live {
                runtime,
                server_url,
            } => (runtime.clone(), server_url.clone()),
            FeedMode::Fixed => return,
        };

        let result = crate::roster::RosterClient::new(&server_url)
            .map(|client| runtime.block_on(client.fetch_patients()));
        match result {
            Ok(Ok(patients)) => {
                self.patients = patients;
                self.roster_error = None;
                self.set_status_message(format!(
                    "Roster loaded: {} patients",
                    self.patients.len()
                ));
                if self.selected_patient.is_none() {
                    self.select_first_patient();
                }
            }
            Ok(Err(e)) | Err(e) => {
                self.roster_error = Some(format!("{:#}", e));
            }
        }
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < std::time::Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// Drain the active source, recording every sample in order.
    ///
    /// Returns Ok(true) if new data was received, Ok(false) if no new data.
    /// The last drained sample becomes the latest vitals.
    pub fn reload_data(&mut self) -> Result<bool> {
        let key = self.chart_key();
        let Some(feed) = self.feed.as_deref_mut() else {
            return Ok(false);
        };

        self.load_error = feed.error();

        let mut updated = false;
        while let Some(sample) = feed.poll() {
            self.history.record(&key, &sample);
            let data = VitalsData::from_sample(sample, &self.thresholds);
            self.aggregates = data.aggregates.clone();
            self.vitals = Some(data);
            updated = true;
        }

        if updated {
            // Clamp the history-table selection to the new row count
            let max = self.filtered_aggregate_count().saturating_sub(1);
            self.selected_row = self.selected_row.min(max);
        }
        Ok(updated)
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Move selection down by one item in the current view.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item in the current view.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        match self.current_view {
            View::History => {
                let max = self.filtered_aggregate_count().saturating_sub(1);
                self.selected_row = (self.selected_row + n).min(max);
            }
            View::Settings => {
                for _ in 0..n {
                    self.settings_field = self.settings_field.next();
                }
            }
            View::Dashboard => {}
        }
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        match self.current_view {
            View::History => {
                self.selected_row = self.selected_row.saturating_sub(n);
            }
            View::Settings => {
                for _ in 0..n {
                    self.settings_field = self.settings_field.prev();
                }
            }
            View::Dashboard => {}
        }
    }

    /// Jump to the first item in the current view's list.
    pub fn select_first(&mut self) {
        match self.current_view {
            View::History => self.selected_row = 0,
            View::Settings => self.settings_field = SettingsField::default(),
            View::Dashboard => {}
        }
    }

    /// Jump to the last item in the current view's list.
    pub fn select_last(&mut self) {
        match self.current_view {
            View::History => {
                self.selected_row = self.filtered_aggregate_count().saturating_sub(1);
            }
            View::Settings => self.settings_field = SettingsField::last(),
            View::Dashboard => {}
        }
    }

    /// Open the patient-selector overlay (live mode with a roster only).
    pub fn open_patient_selector(&mut self) {
        if matches!(self.mode, FeedMode::Fixed) {
            self.set_status_message("Patient switching unavailable for this source".to_string());
            return;
        }
        self.selector_index = self.selected_patient.unwrap_or(0);
        self.show_patient_selector = true;
    }

    /// Close the patient-selector overlay without switching.
    pub fn close_patient_selector(&mut self) {
        self.show_patient_selector = false;
    }

    /// Move the selector cursor down.
    pub fn selector_next(&mut self) {
        let max = self.patients.len().saturating_sub(1);
        self.selector_index = (self.selector_index + 1).min(max);
    }

    /// Move the selector cursor up.
    pub fn selector_prev(&mut self) {
        self.selector_index = self.selector_index.saturating_sub(1);
    }

    /// Switch to the patient under the selector cursor.
    pub fn confirm_selection(&mut self) {
        self.select_patient(self.selector_index);
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Cycle the sort column in the History view.
    pub fn cycle_sort(&mut self) {
        self.sort_column = self.sort_column.next();
    }

    /// Toggle sort direction between ascending and descending.
    pub fn toggle_sort_direction(&mut self) {
        self.sort_ascending = !self.sort_ascending;
    }

    /// Enter filter input mode (starts capturing keystrokes for search).
    pub fn start_filter(&mut self) {
        self.filter_active = true;
    }

    /// Exit filter input mode without clearing the filter text.
    pub fn cancel_filter(&mut self) {
        self.filter_active = false;
    }

    /// Clear the filter text and exit filter mode.
    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
    }

    /// Append a character to the filter text.
    pub fn filter_push(&mut self, c: char) {
        self.filter_text.push(c);
    }

    /// Remove the last character from the filter text.
    pub fn filter_pop(&mut self) {
        self.filter_text.pop();
    }

    /// Check if an aggregate matches the current filter.
    pub fn matches_filter(&self, aggregate: &Aggregate) -> bool {
        if self.filter_text.is_empty() {
            return true;
        }
        let search = self.filter_text.to_lowercase();
        aggregate.summary.to_lowercase().contains(&search)
            || aggregate.risk_level.label().to_lowercase().contains(&search)
    }

    /// Count of aggregates after applying the filter.
    pub fn filtered_aggregate_count(&self) -> usize {
        self.aggregates.iter().filter(|a| self.matches_filter(a)).count()
    }

    /// Adjust the selected settings field by `direction` steps.
    pub fn adjust_setting(&mut self, direction: f64) {
        let t = &mut self.thresholds;
        match self.settings_field {
            SettingsField::HeartRateMin => {
                t.heart_rate_min =
                    (t.heart_rate_min + direction).clamp(20.0, t.heart_rate_max - 1.0);
            }
            SettingsField::HeartRateMax => {
                t.heart_rate_max =
                    (t.heart_rate_max + direction).clamp(t.heart_rate_min + 1.0, 220.0);
            }
            SettingsField::SpO2Min => {
                t.spo2_min = (t.spo2_min + direction * 0.5).clamp(70.0, 100.0);
            }
            SettingsField::TemperatureMax => {
                t.temperature_max = (t.temperature_max + direction * 0.1).clamp(95.0, 106.0);
            }
            SettingsField::FallDetection => {
                t.fall_detection = !t.fall_detection;
            }
        }
        self.settings_dirty = true;
    }

    /// Restore the default thresholds.
    pub fn reset_thresholds(&mut self) {
        self.thresholds = AlertThresholds::default();
        self.settings_dirty = true;
        self.set_status_message("Thresholds reset to defaults".to_string());
    }

    /// Persist the current thresholds to the settings file.
    pub fn save_thresholds(&mut self) {
        let settings = Settings {
            server: self.server_url(),
            alerts: self.thresholds.clone(),
        };
        match save_settings(&self.settings_path, &settings) {
            Ok(()) => {
                self.settings_dirty = false;
                self.set_status_message(format!("Saved to {}", self.settings_path.display()));
            }
            Err(e) => {
                self.set_status_message(format!("Save failed: {}", e));
            }
        }
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the current state to a JSON file.
    pub fn export_state(&self, path: &std::path::Path) -> Result<()> {
        use std::io::Write;

        let Some(ref vitals) = self.vitals else {
            anyhow::bail!("No data to export");
        };

        let mut export = serde_json::Map::new();

        if let Some(patient) = self.selected_patient() {
            export.insert("patient".to_string(), serde_json::json!(patient));
        }
        export.insert("connected".to_string(), serde_json::json!(self.connected()));

        export.insert(
            "vitals".to_string(),
            serde_json::json!({
                "heart_rate": vitals.heart_rate,
                "heart_rate_status": vitals.heart_rate_status.symbol(),
                "spo2": vitals.spo2,
                "spo2_status": vitals.spo2_status.symbol(),
                "temperature": vitals.temperature,
                "temperature_status": vitals.temperature_status.symbol(),
                "risk_level": vitals.risk_level.label(),
                "confidence": vitals.confidence,
                "summary": vitals.summary,
                "motion_status": vitals.motion_status,
                "fall_detected": vitals.fall_detected,
            }),
        );

        export.insert(
            "aggregates".to_string(),
            serde_json::to_value(&self.aggregates)?,
        );

        let json = serde_json::to_string_pretty(&serde_json::Value::Object(export))?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(json.as_bytes())?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{ChannelFeed, VitalsSample};
    use std::path::PathBuf;

    fn sample(heart_rate: f64) -> VitalsSample {
        VitalsSample {
            heart_rate: Some(heart_rate),
            spo2: Some(98.0),
            ..VitalsSample::default()
        }
    }

    fn roster() -> Vec<Patient> {
        vec![
            Patient {
                id: 1,
                patient_id: "P-1001".to_string(),
                name: "John Doe".to_string(),
                age: 67,
                room: "204A".to_string(),
                condition: "Cardiac monitoring".to_string(),
            },
            Patient {
                id: 2,
                patient_id: "P-1002".to_string(),
                name: "Jane Roe".to_string(),
                age: 54,
                room: "109B".to_string(),
                condition: "Post-operative".to_string(),
            },
        ]
    }

    fn channel_app() -> (tokio::sync::mpsc::Sender<VitalsSample>, App) {
        let (tx, feed) = ChannelFeed::create("test");
        let app = App::new_with_source(
            Box::new(feed),
            AlertThresholds::default(),
            PathBuf::from("vitalwatch.json"),
        );
        (tx, app)
    }

    fn live_app(rt: &tokio::runtime::Runtime) -> App {
        App::new_live(
            rt.handle().clone(),
            // Nothing listens here; connects fail and retry in background
            "http://127.0.0.1:1".to_string(),
            roster(),
            None,
            AlertThresholds::default(),
            PathBuf::from("vitalwatch.json"),
        )
    }

    #[test]
    fn test_no_patient_means_no_feed() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = live_app(&rt);

        assert!(!app.connected());
        assert!(!app.reload_data().unwrap());
        assert!(app.vitals.is_none());
        assert_eq!(app.source_description(), "no source");
    }

    #[test]
    fn test_latest_vitals_follow_delivery_order() {
        let (tx, mut app) = channel_app();

        tx.try_send(sample(70.0)).unwrap();
        tx.try_send(sample(75.0)).unwrap();

        assert!(app.reload_data().unwrap());
        // The exposed vitals always equal the most recently delivered sample
        assert_eq!(app.vitals.as_ref().unwrap().heart_rate, Some(75.0));
        // Every sample was recorded, in order
        assert_eq!(app.history.heart_rate("replay"), vec![70.0, 75.0]);
    }

    #[test]
    fn test_aggregates_track_the_latest_sample() {
        let (tx, mut app) = channel_app();

        let with_aggregates: VitalsSample = serde_json::from_str(
            r#"{"heart_rate": 80, "aggregates": [{
                "id": 1,
                "start_time": "2025-06-01T10:00:00Z",
                "end_time": "2025-06-01T10:05:00Z",
                "patient": {"id": 1, "name": "John Doe"},
                "risk_level": "Low",
                "summary": "Stable.",
                "created_at": "2025-06-01T10:05:01Z"
            }]}"#,
        )
        .unwrap();

        tx.try_send(with_aggregates).unwrap();
        app.reload_data().unwrap();
        assert_eq!(app.aggregates.len(), 1);

        // A later sample without aggregates clears the table, matching the
        // backend's latest word
        tx.try_send(sample(81.0)).unwrap();
        app.reload_data().unwrap();
        assert!(app.aggregates.is_empty());
    }

    #[test]
    fn test_switching_patient_resets_state_and_feed() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = live_app(&rt);

        app.select_patient(0);
        assert_eq!(app.selected_patient().unwrap().patient_id, "P-1001");
        assert!(app.source_description().contains("/ws/patient/1/"));

        // Pretend data had arrived for the first patient
        app.vitals = Some(VitalsData::from_sample(
            sample(70.0),
            &AlertThresholds::default(),
        ));

        app.select_patient(1);
        assert_eq!(app.selected_patient().unwrap().patient_id, "P-1002");
        // The new feed targets the new patient's stream
        assert!(app.source_description().contains("/ws/patient/2/"));
        // Display state was reset; nothing from the old stream lingers
        assert!(app.vitals.is_none());
        assert!(app.aggregates.is_empty());

        // Re-selecting the current patient is a no-op
        let desc = app.source_description().to_string();
        app.select_patient(1);
        assert_eq!(app.source_description(), desc);
    }

    #[test]
    fn test_history_is_kept_across_switches() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = live_app(&rt);

        app.select_patient(0);
        app.history.record("P-1001", &sample(70.0));
        app.select_patient(1);

        // Patient A's chart data is still there for switch-back
        assert_eq!(app.history.heart_rate("P-1001"), vec![70.0]);
        assert!(app.history.heart_rate("P-1002").is_empty());
    }

    #[test]
    fn test_select_patient_by_id() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = live_app(&rt);

        assert!(app.select_patient_by_id("P-1002"));
        assert_eq!(app.selected_patient, Some(1));
        assert!(!app.select_patient_by_id("P-9999"));
    }

    #[test]
    fn test_disconnected_channel_reports_offline() {
        let (tx, mut app) = channel_app();
        tx.try_send(sample(70.0)).unwrap();
        drop(tx);

        app.reload_data().unwrap();
        assert_eq!(app.vitals.as_ref().unwrap().heart_rate, Some(70.0));
        // Sender gone: the source reports disconnected, data stays
        app.reload_data().unwrap();
        assert!(!app.connected());
        assert_eq!(app.vitals.as_ref().unwrap().heart_rate, Some(70.0));
    }

    #[test]
    fn test_adjust_and_reset_thresholds() {
        let (_tx, mut app) = channel_app();

        app.settings_field = SettingsField::HeartRateMax;
        app.adjust_setting(5.0);
        assert_eq!(app.thresholds.heart_rate_max, 105.0);
        assert!(app.settings_dirty);

        app.settings_field = SettingsField::FallDetection;
        app.adjust_setting(1.0);
        assert!(!app.thresholds.fall_detection);

        app.reset_thresholds();
        assert_eq!(app.thresholds.heart_rate_max, 100.0);
        assert!(app.thresholds.fall_detection);
    }

    #[test]
    fn test_threshold_bounds_hold() {
        let (_tx, mut app) = channel_app();

        app.settings_field = SettingsField::HeartRateMin;
        for _ in 0..100 {
            app.adjust_setting(5.0);
        }
        // The floor can never cross the ceiling
        assert!(app.thresholds.heart_rate_min < app.thresholds.heart_rate_max);
    }

    #[test]
    fn test_export_state() {
        let (tx, mut app) = channel_app();
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("export.json");

        // Nothing received yet: export refuses
        assert!(app.export_state(&path).is_err());

        tx.try_send(sample(72.0)).unwrap();
        app.reload_data().unwrap();
        app.export_state(&path).unwrap();

        let exported: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(exported["vitals"]["heart_rate"], 72.0);
        assert_eq!(exported["vitals"]["risk_level"], "N/A");
    }

    #[test]
    fn test_view_cycle() {
        assert_eq!(View::Dashboard.next(), View::History);
        assert_eq!(View::Settings.next(), View::Dashboard);
        assert_eq!(View::Dashboard.prev(), View::Settings);
    }
}
