//! Pure scoring functions behind a finished session.
//!
//! Speeds use the standard five-characters-per-word convention and are
//! "gross": errors are not subtracted.

use crate::util::{round_to_tenth, std_dev};

pub const CHARS_PER_WORD: f64 = 5.0;

/// Multiplier turning a one-second character count into words per minute
/// (`chars / 5 * 60`).
pub const SAMPLE_WPM_FACTOR: f64 = 60.0 / CHARS_PER_WORD;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccuracyCounts {
    pub correct: usize,
    pub total: usize,
}

impl AccuracyCounts {
    /// Percentage of correct characters, 0 when nothing was typed.
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.correct as f64 / self.total as f64) * 100.0
    }
}

/// Compare `input` against `passage` position by position.
///
/// Every typed character counts towards the total. Characters typed past
/// the end of the passage are always incorrect.
pub fn accuracy_counts(passage: &str, input: &str) -> AccuracyCounts {
    let mut expected = passage.chars();
    let mut counts = AccuracyCounts::default();

    for typed in input.chars() {
        counts.total += 1;
        if let Some(want) = expected.next() {
            if want == typed {
                counts.correct += 1;
            }
        }
    }

    counts
}

/// WPM sample for a single one-second window.
pub fn sample_wpm(chars_this_second: usize) -> f64 {
    chars_this_second as f64 * SAMPLE_WPM_FACTOR
}

/// Gross words per minute over the whole configured duration.
pub fn gross_wpm(characters_typed: usize, duration_secs: u32) -> f64 {
    if duration_secs == 0 {
        return 0.0;
    }
    (characters_typed as f64 / CHARS_PER_WORD) / (duration_secs as f64 / 60.0)
}

/// Spread of the per-second WPM series; lower is steadier.
pub fn consistency(wpm_data: &[f64]) -> f64 {
    std_dev(wpm_data).unwrap_or(0.0)
}

/// Final numbers as they appear on a result record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scores {
    pub wpm: f64,
    pub accuracy: f64,
    pub consistency: f64,
    pub characters_typed: usize,
}

pub fn score(passage: &str, input: &str, duration_secs: u32, wpm_data: &[f64]) -> Scores {
    let counts = accuracy_counts(passage, input);

    Scores {
        wpm: round_to_tenth(gross_wpm(counts.total, duration_secs)),
        accuracy: round_to_tenth(counts.percentage()),
        consistency: round_to_tenth(consistency(wpm_data)),
        characters_typed: counts.total,
    }
}
