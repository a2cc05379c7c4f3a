//! Per-patient vitals history for charts and sparklines.
//!
//! Records samples over time per patient so charts survive a patient
//! switch: buffers for patient A are retained while B is active and shown
//! again when the user switches back.

use std::collections::{HashMap, VecDeque};

use crate::feed::VitalsSample;

/// Points kept for the heart-rate and SpO2 charts.
const VITAL_POINTS: usize = 60;
/// Points kept for the ECG waveform.
const ECG_POINTS: usize = 200;

/// Ring buffers for one patient.
#[derive(Debug, Clone, Default)]
pub struct PatientSeries {
    heart_rate: VecDeque<f64>,
    spo2: VecDeque<f64>,
    ecg: VecDeque<f64>,
}

/// Tracks historical vitals per patient.
#[derive(Debug, Clone, Default)]
pub struct History {
    series: HashMap<String, PatientSeries>,
}

impl History {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sample for the given patient.
    ///
    /// A sample carrying buffered wire series seeds this patient's empty
    /// buffers (restoring charts right after a switch); accumulation is
    /// local thereafter.
    pub fn record(&mut self, patient_key: &str, sample: &VitalsSample) {
        let series = self.series.entry(patient_key.to_string()).or_default();

        seed_if_empty(&mut series.heart_rate, &sample.hr_data, VITAL_POINTS);
        seed_if_empty(&mut series.spo2, &sample.spo2_data, VITAL_POINTS);
        seed_if_empty(&mut series.ecg, &sample.ecg_data, ECG_POINTS);

        if let Some(v) = sample.heart_rate {
            push_capped(&mut series.heart_rate, v, VITAL_POINTS);
        }
        if let Some(v) = sample.spo2 {
            push_capped(&mut series.spo2, v, VITAL_POINTS);
        }
        if let Some(v) = sample.ecg {
            push_capped(&mut series.ecg, v, ECG_POINTS);
        }
    }

    /// Heart-rate series for a patient, oldest first.
    pub fn heart_rate(&self, patient_key: &str) -> Vec<f64> {
        self.values(patient_key, |s| &s.heart_rate)
    }

    /// SpO2 series for a patient, oldest first.
    pub fn spo2(&self, patient_key: &str) -> Vec<f64> {
        self.values(patient_key, |s| &s.spo2)
    }

    /// ECG series for a patient, oldest first.
    pub fn ecg(&self, patient_key: &str) -> Vec<f64> {
        self.values(patient_key, |s| &s.ecg)
    }

    fn values<F>(&self, patient_key: &str, pick: F) -> Vec<f64>
    where
        F: Fn(&PatientSeries) -> &VecDeque<f64>,
    {
        self.series
            .get(patient_key)
            .map(|s| pick(s).iter().copied().collect())
            .unwrap_or_default()
    }
}

/// Normalize values to the 0-7 range for 8-level sparkline display.
///
/// Returns an empty Vec if there is not enough history.
pub fn normalize_levels(values: &[f64]) -> Vec<u8> {
    if values.len() < 2 {
        return Vec::new();
    }

    let max = values.iter().copied().fold(f64::MIN, f64::max);
    let min = values.iter().copied().fold(f64::MAX, f64::min);
    let range = (max - min).max(f64::EPSILON);

    values
        .iter()
        .map(|&v| {
            let normalized = ((v - min) / range * 7.0) as u8;
            normalized.min(7)
        })
        .collect()
}

fn seed_if_empty(buffer: &mut VecDeque<f64>, wire: &[f64], cap: usize) {
    if !buffer.is_empty() || wire.is_empty() {
        return;
    }
    let start = wire.len().saturating_sub(cap);
    buffer.extend(wire[start..].iter().copied());
}

fn push_capped(buffer: &mut VecDeque<f64>, value: f64, cap: usize) {
    buffer.push_back(value);
    if buffer.len() > cap {
        buffer.pop_front();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(heart_rate: f64) -> VitalsSample {
        VitalsSample {
            heart_rate: Some(heart_rate),
            spo2: Some(97.0),
            ecg: Some(0.1),
            ..VitalsSample::default()
        }
    }

    #[test]
    fn test_record_accumulates_in_order() {
        let mut history = History::new();
        history.record("P-1", &sample(70.0));
        history.record("P-1", &sample(71.0));
        history.record("P-1", &sample(72.0));

        assert_eq!(history.heart_rate("P-1"), vec![70.0, 71.0, 72.0]);
        assert_eq!(history.spo2("P-1").len(), 3);
        assert_eq!(history.ecg("P-1").len(), 3);
    }

    #[test]
    fn test_capacity_is_bounded() {
        let mut history = History::new();
        for i in 0..(VITAL_POINTS + 10) {
            history.record("P-1", &sample(i as f64));
        }

        let hr = history.heart_rate("P-1");
        assert_eq!(hr.len(), VITAL_POINTS);
        // Oldest points were evicted
        assert_eq!(hr[0], 10.0);
        assert_eq!(*hr.last().unwrap(), (VITAL_POINTS + 9) as f64);
    }

    #[test]
    fn test_patients_are_isolated() {
        let mut history = History::new();
        history.record("P-1", &sample(70.0));
        history.record("P-2", &sample(90.0));

        assert_eq!(history.heart_rate("P-1"), vec![70.0]);
        assert_eq!(history.heart_rate("P-2"), vec![90.0]);
        assert!(history.heart_rate("P-3").is_empty());
    }

    #[test]
    fn test_wire_series_seeds_empty_buffer() {
        let mut history = History::new();
        let mut s = sample(75.0);
        s.hr_data = vec![71.0, 72.0, 73.0];
        history.record("P-1", &s);

        // Seeded from the wire, then the instantaneous value appended
        assert_eq!(history.heart_rate("P-1"), vec![71.0, 72.0, 73.0, 75.0]);

        // A later wire series does not overwrite accumulated data
        let mut s = sample(76.0);
        s.hr_data = vec![1.0, 2.0];
        history.record("P-1", &s);
        assert_eq!(
            history.heart_rate("P-1"),
            vec![71.0, 72.0, 73.0, 75.0, 76.0]
        );
    }

    #[test]
    fn test_seed_truncates_to_capacity() {
        let mut history = History::new();
        let mut s = VitalsSample::default();
        s.ecg_data = (0..(ECG_POINTS + 50)).map(|i| i as f64).collect();
        history.record("P-1", &s);

        let ecg = history.ecg("P-1");
        assert_eq!(ecg.len(), ECG_POINTS);
        assert_eq!(ecg[0], 50.0);
    }

    #[test]
    fn test_normalize_levels() {
        assert!(normalize_levels(&[]).is_empty());
        assert!(normalize_levels(&[1.0]).is_empty());

        let levels = normalize_levels(&[0.0, 50.0, 100.0]);
        assert_eq!(levels, vec![0, 3, 7]);

        // Flat series normalizes without dividing by zero
        let levels = normalize_levels(&[5.0, 5.0, 5.0]);
        assert_eq!(levels.len(), 3);
        assert!(levels.iter().all(|&l| l <= 7));
    }
}
