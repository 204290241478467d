use crate::session::TestResult;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSeriesPoint {
    pub t: f64,
    pub wpm: f64,
}

impl TimeSeriesPoint {
    pub fn new(t: f64, wpm: f64) -> Self {
        Self { t, wpm }
    }
}

impl From<TimeSeriesPoint> for (f64, f64) {
    fn from(p: TimeSeriesPoint) -> Self {
        (p.t, p.wpm)
    }
}

/// Per-second speed of one test; the first sample sits at second 1.
pub fn wpm_series(wpm_data: &[f64]) -> Vec<TimeSeriesPoint> {
    wpm_data
        .iter()
        .enumerate()
        .map(|(i, wpm)| TimeSeriesPoint::new((i + 1) as f64, *wpm))
        .collect()
}

/// Final WPM of past tests, oldest first, indexed from 1.
///
/// `history` is expected newest first, as returned by the history store.
pub fn trend_series(history: &[TestResult]) -> Vec<TimeSeriesPoint> {
    history
        .iter()
        .rev()
        .enumerate()
        .map(|(i, r)| TimeSeriesPoint::new((i + 1) as f64, r.wpm))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(wpm: f64) -> TestResult {
        TestResult {
            test_id: 0,
            date: String::new(),
            duration: 60,
            wpm,
            accuracy: 100.0,
            consistency: 0.0,
            characters_typed: 0,
            wpm_data: vec![],
        }
    }

    #[test]
    fn wpm_series_starts_at_one() {
        let points = wpm_series(&[12.0, 36.0]);
        assert_eq!(
            points,
            vec![TimeSeriesPoint::new(1.0, 12.0), TimeSeriesPoint::new(2.0, 36.0)]
        );
        assert!(wpm_series(&[]).is_empty());
    }

    #[test]
    fn trend_series_is_chronological() {
        let newest_first = vec![result(70.0), result(60.0), result(50.0)];
        let tuples: Vec<(f64, f64)> = trend_series(&newest_first)
            .into_iter()
            .map(Into::into)
            .collect();
        assert_eq!(tuples, vec![(1.0, 50.0), (2.0, 60.0), (3.0, 70.0)]);
    }
}
