use rusqlite::{params, Connection, Row};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use tracing::{debug, warn};

use crate::app_dirs::AppDirs;
use crate::error::{KeypaceError, Result};
use crate::session::TestResult;

/// Best scores reached at one test length.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PersonalBest {
    pub best_wpm: f64,
    pub best_accuracy: f64,
}

/// Keyed by test duration in seconds.
pub type PersonalBests = BTreeMap<u32, PersonalBest>;

pub trait HistoryStore {
    fn save(&mut self, result: &TestResult) -> Result<()>;
    /// All stored results, newest first.
    fn history(&self) -> Result<Vec<TestResult>>;

    fn personal_bests(&self) -> Result<PersonalBests> {
        Ok(personal_bests(&self.history()?))
    }
}

pub fn personal_bests(results: &[TestResult]) -> PersonalBests {
    let mut bests = PersonalBests::new();
    for r in results {
        let best = bests.entry(r.duration).or_default();
        best.best_wpm = best.best_wpm.max(r.wpm);
        best.best_accuracy = best.best_accuracy.max(r.accuracy);
    }
    bests
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS test_results (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    test_id INTEGER NOT NULL,
    date TEXT NOT NULL,
    duration INTEGER NOT NULL,
    wpm REAL NOT NULL,
    accuracy REAL NOT NULL,
    consistency REAL NOT NULL,
    characters_typed INTEGER NOT NULL,
    wpm_data TEXT NOT NULL DEFAULT '[]'
);
CREATE INDEX IF NOT EXISTS idx_test_results_date ON test_results(date);
"#;

/// Result history kept in a local SQLite file.
#[derive(Debug)]
pub struct SqliteHistory {
    conn: Connection,
}

impl SqliteHistory {
    /// Open (and create if needed) the database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        debug!(path = %path.display(), "opening history database");
        Self::init(Connection::open(path)?)
    }

    /// Open the database in the user's state directory.
    pub fn open_default() -> Result<Self> {
        let path = AppDirs::db_path().ok_or(KeypaceError::NoStateDir)?;
        Self::open(path)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM test_results", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn clear(&self) -> Result<()> {
        self.conn.execute("DELETE FROM test_results", [])?;
        Ok(())
    }

    fn row_to_result(row: &Row<'_>) -> rusqlite::Result<(TestResult, String)> {
        let wpm_data: String = row.get(7)?;
        let characters_typed: i64 = row.get(6)?;
        Ok((
            TestResult {
                test_id: row.get(0)?,
                date: row.get(1)?,
                duration: row.get(2)?,
                wpm: row.get(3)?,
                accuracy: row.get(4)?,
                consistency: row.get(5)?,
                characters_typed: characters_typed.max(0) as usize,
                wpm_data: Vec::new(),
            },
            wpm_data,
        ))
    }
}

impl HistoryStore for SqliteHistory {
    fn save(&mut self, result: &TestResult) -> Result<()> {
        let wpm_data = serde_json::to_string(&result.wpm_data)?;
        self.conn.execute(
            r#"
            INSERT INTO test_results
            (test_id, date, duration, wpm, accuracy, consistency, characters_typed, wpm_data)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                result.test_id,
                result.date,
                result.duration,
                result.wpm,
                result.accuracy,
                result.consistency,
                result.characters_typed as i64,
                wpm_data,
            ],
        )?;
        debug!(test_id = result.test_id, "saved result");
        Ok(())
    }

    fn history(&self) -> Result<Vec<TestResult>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT test_id, date, duration, wpm, accuracy, consistency, characters_typed, wpm_data
            FROM test_results
            ORDER BY date DESC, id DESC
            "#,
        )?;

        let rows = stmt.query_map([], Self::row_to_result)?;

        let mut results = Vec::new();
        for row in rows {
            let (mut result, wpm_data) = row?;
            result.wpm_data = serde_json::from_str(&wpm_data).unwrap_or_else(|err| {
                warn!(test_id = result.test_id, %err, "unreadable wpm series");
                Vec::new()
            });
            results.push(result);
        }

        Ok(results)
    }
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    date: &'a str,
    duration: u32,
    wpm: f64,
    accuracy: f64,
    consistency: f64,
    characters_typed: usize,
}

/// Write `results` as CSV with a header row.
pub fn export_csv<W: Write>(results: &[TestResult], out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for r in results {
        writer.serialize(CsvRow {
            date: &r.date,
            duration: r.duration,
            wpm: r.wpm,
            accuracy: r.accuracy,
            consistency: r.consistency,
            characters_typed: r.characters_typed,
        })?;
    }
    if results.is_empty() {
        writer.write_record([
            "date",
            "duration",
            "wpm",
            "accuracy",
            "consistency",
            "characters_typed",
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(date: &str, duration: u32, wpm: f64, accuracy: f64) -> TestResult {
        TestResult {
            test_id: wpm as i64,
            date: date.to_string(),
            duration,
            wpm,
            accuracy,
            consistency: 4.2,
            characters_typed: 250,
            wpm_data: vec![48.0, 60.0, 72.0],
        }
    }

    #[test]
    fn save_and_read_back() {
        let mut db = SqliteHistory::open_in_memory().unwrap();
        assert!(db.is_empty().unwrap());

        let r = result("2024-03-01T10:00:00.000Z", 60, 55.5, 97.2);
        db.save(&r).unwrap();

        let history = db.history().unwrap();
        assert_eq!(history, vec![r]);
        assert_eq!(db.len().unwrap(), 1);
    }

    #[test]
    fn history_is_newest_first() {
        let mut db = SqliteHistory::open_in_memory().unwrap();
        db.save(&result("2024-03-01T10:00:00.000Z", 60, 40.0, 90.0))
            .unwrap();
        db.save(&result("2024-03-03T10:00:00.000Z", 60, 60.0, 90.0))
            .unwrap();
        db.save(&result("2024-03-02T10:00:00.000Z", 60, 50.0, 90.0))
            .unwrap();

        let wpms: Vec<f64> = db.history().unwrap().iter().map(|r| r.wpm).collect();
        assert_eq!(wpms, vec![60.0, 50.0, 40.0]);
    }

    #[test]
    fn personal_bests_per_duration() {
        let mut db = SqliteHistory::open_in_memory().unwrap();
        db.save(&result("2024-03-01T10:00:00.000Z", 30, 70.0, 91.0))
            .unwrap();
        db.save(&result("2024-03-02T10:00:00.000Z", 30, 65.0, 99.0))
            .unwrap();
        db.save(&result("2024-03-03T10:00:00.000Z", 60, 58.0, 95.5))
            .unwrap();

        let bests = db.personal_bests().unwrap();
        assert_eq!(bests.len(), 2);
        assert_eq!(
            bests[&30],
            PersonalBest {
                best_wpm: 70.0,
                best_accuracy: 99.0
            }
        );
        assert_eq!(bests[&60].best_wpm, 58.0);
        assert!(!bests.contains_key(&120));
    }

    #[test]
    fn clear_removes_everything() {
        let mut db = SqliteHistory::open_in_memory().unwrap();
        db.save(&result("2024-03-01T10:00:00.000Z", 30, 70.0, 91.0))
            .unwrap();
        db.clear().unwrap();
        assert!(db.history().unwrap().is_empty());
    }

    #[test]
    fn open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("history.db");
        let mut db = SqliteHistory::open(&path).unwrap();
        db.save(&result("2024-03-01T10:00:00.000Z", 30, 70.0, 91.0))
            .unwrap();
        drop(db);

        let reopened = SqliteHistory::open(&path).unwrap();
        assert_eq!(reopened.len().unwrap(), 1);
    }

    #[test]
    fn csv_export_has_header_and_rows() {
        let results = vec![result("2024-03-01T10:00:00.000Z", 30, 70.0, 91.0)];
        let mut out = Vec::new();
        export_csv(&results, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("date,duration,wpm,accuracy,consistency,characters_typed")
        );
        assert_eq!(
            lines.next(),
            Some("2024-03-01T10:00:00.000Z,30,70.0,91.0,4.2,250")
        );
    }

    #[test]
    fn csv_export_of_nothing_is_just_a_header() {
        let mut out = Vec::new();
        export_csv(&[], &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "date,duration,wpm,accuracy,consistency,characters_typed\n"
        );
    }
}
