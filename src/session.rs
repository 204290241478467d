use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::metrics::{sample_wpm, Scores};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    Running,
    Finished,
}

/// Mutable state of the one test currently being typed.
#[derive(Debug, Clone)]
pub struct Session {
    pub duration_secs: u32,
    pub remaining_secs: u32,
    pub passage: String,
    pub input: String,
    pub chars_this_second: usize,
    pub wpm_data: Vec<f64>,
    pub started_at: DateTime<Local>,
    input_len: usize,
}

impl Session {
    pub fn new(duration_secs: u32, passage: String) -> Self {
        Self {
            duration_secs,
            remaining_secs: duration_secs,
            passage,
            input: String::new(),
            chars_this_second: 0,
            wpm_data: Vec::with_capacity(duration_secs as usize),
            started_at: Local::now(),
            input_len: 0,
        }
    }

    /// Replace the typed text and return how many characters it grew by.
    pub fn replace_input(&mut self, value: &str) -> usize {
        let new_len = value.chars().count();
        let grown = new_len.saturating_sub(self.input_len);

        self.input.clear();
        self.input.push_str(value);
        self.input_len = new_len;

        grown
    }

    pub fn input_len(&self) -> usize {
        self.input_len
    }

    /// Close the current one-second window and record its WPM sample.
    pub fn close_second(&mut self, remaining_secs: u32) -> f64 {
        let sample = sample_wpm(self.chars_this_second);
        self.wpm_data.push(sample);
        self.chars_this_second = 0;
        self.remaining_secs = remaining_secs;
        sample
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            passage: self.passage.clone(),
            input: self.input.clone(),
        }
    }

    pub fn test_id(&self) -> i64 {
        self.started_at.timestamp_millis()
    }

    pub fn into_result(self, scores: Scores) -> TestResult {
        TestResult {
            test_id: self.test_id(),
            date: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            duration: self.duration_secs,
            wpm: scores.wpm,
            accuracy: scores.accuracy,
            consistency: scores.consistency,
            characters_typed: scores.characters_typed,
            wpm_data: self.wpm_data,
        }
    }
}

/// Read-only view used for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub passage: String,
    pub input: String,
}

/// Finished test as handed to storage and charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub test_id: i64,
    /// RFC 3339 / ISO-8601, UTC.
    pub date: String,
    pub duration: u32,
    pub wpm: f64,
    pub accuracy: f64,
    pub consistency: f64,
    pub characters_typed: usize,
    #[serde(default)]
    pub wpm_data: Vec<f64>,
}

impl TestResult {
    pub fn date_time(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.date)
            .ok()
            .map(|d| d.with_timezone(&Utc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_full_length() {
        let session = Session::new(30, "abc".to_string());
        assert_eq!(session.remaining_secs, 30);
        assert_eq!(session.input_len(), 0);
        assert!(session.wpm_data.is_empty());
    }

    #[test]
    fn replace_input_reports_growth_only() {
        let mut session = Session::new(30, "hello".to_string());
        assert_eq!(session.replace_input("he"), 2);
        assert_eq!(session.replace_input("hell"), 2);
        assert_eq!(session.replace_input("h"), 0);
        assert_eq!(session.replace_input("h"), 0);
        assert_eq!(session.input, "h");
        assert_eq!(session.input_len(), 1);
    }

    #[test]
    fn close_second_samples_and_resets() {
        let mut session = Session::new(10, "hello".to_string());
        session.chars_this_second = 4;
        assert_eq!(session.close_second(9), 48.0);
        assert_eq!(session.chars_this_second, 0);
        assert_eq!(session.remaining_secs, 9);
        assert_eq!(session.wpm_data, vec![48.0]);
    }

    #[test]
    fn result_serializes_with_camel_case_keys() {
        let result = TestResult {
            test_id: 1,
            date: "2024-01-01T00:00:00.000Z".to_string(),
            duration: 60,
            wpm: 42.5,
            accuracy: 97.1,
            consistency: 3.2,
            characters_typed: 213,
            wpm_data: vec![36.0, 48.0],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["testId"], 1);
        assert_eq!(json["charactersTyped"], 213);
        assert_eq!(json["wpmData"][1], 48.0);
        assert!(result.date_time().is_some());
    }
}
