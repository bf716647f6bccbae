//! Append-only feedback log.
//!
//! Human-corrected predictions are appended, one JSON object per line, to
//! `feedback.jsonl` in the model directory. The sink never mutates or
//! replays entries; the only read path is the line count surfaced by
//! engine stats. Appends are serialized behind a mutex so concurrent
//! writers cannot interleave partial lines.

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use log::debug;
use parking_lot::Mutex;

use crate::error::Result;
use crate::types::FeedbackEntry;

const FEEDBACK_FILE: &str = "feedback.jsonl";

/// Durable write-only sink for prediction feedback.
#[derive(Debug)]
pub struct FeedbackSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FeedbackSink {
    /// Create a sink writing into `dir`. The log file itself is created
    /// lazily on the first append.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            path: dir.as_ref().join(FEEDBACK_FILE),
            write_lock: Mutex::new(()),
        }
    }

    /// Append one entry as a single JSON line.
    pub fn record(&self, entry: &FeedbackEntry) -> Result<()> {
        let line = serde_json::to_string(entry)?;

        let _guard = self.write_lock.lock();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")?;

        debug!(
            "feedback recorded: {} -> {}",
            entry.predicted_category, entry.actual_category
        );
        Ok(())
    }

    /// Number of entries recorded so far. A missing log file counts as
    /// zero.
    pub fn count(&self) -> usize {
        match std::fs::File::open(&self.path) {
            Ok(file) => BufReader::new(file).lines().count(),
            Err(_) => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use crate::types::ExpenseRecord;

    fn entry() -> FeedbackEntry {
        FeedbackEntry::new(
            ExpenseRecord {
                title: Some("Team lunch".to_string()),
                amount: Some(42.0),
                ..Default::default()
            },
            Category::Other,
            Category::Meals,
            0.4,
        )
    }

    #[test]
    fn test_each_record_appends_one_line() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FeedbackSink::new(dir.path());

        assert_eq!(sink.count(), 0);
        for expected in 1..=3 {
            sink.record(&entry()).unwrap();
            assert_eq!(sink.count(), expected);
        }
    }

    #[test]
    fn test_entries_round_trip_as_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FeedbackSink::new(dir.path());
        sink.record(&entry()).unwrap();

        let contents = std::fs::read_to_string(dir.path().join(FEEDBACK_FILE)).unwrap();
        let parsed: FeedbackEntry = serde_json::from_str(contents.trim()).unwrap();
        assert_eq!(parsed.predicted_category, Category::Other);
        assert_eq!(parsed.actual_category, Category::Meals);
        assert_eq!(parsed.confidence, 0.4);
    }

    #[test]
    fn test_count_without_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FeedbackSink::new(dir.path());
        assert_eq!(sink.count(), 0);
    }
}
