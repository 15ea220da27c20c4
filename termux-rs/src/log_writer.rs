//! Batched append-only CSV history.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::debug;

use common::Row;

use crate::models::errors::SamplerError;

/// Append-only CSV log with a bounded in-memory batch.
///
/// The header row is written exactly once at construction, truncating any
/// prior file. Appended rows accumulate in the pending batch and reach the
/// disk when the batch fills or on an explicit [`flush`](CsvLogWriter::flush).
/// A failed flush keeps the batch so the next trigger retries it.
pub(crate) struct CsvLogWriter {
    path: PathBuf,
    batch_size: usize,
    pending: Mutex<Vec<Row>>,
}

impl CsvLogWriter {
    /// Creates the log file, truncating any previous one, and writes the
    /// header row.
    pub(crate) fn new(
        path: impl Into<PathBuf>,
        header: &[String],
        batch_size: usize,
    ) -> Result<Self, SamplerError> {
        let path = path.into();
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)
                    .map_err(|e| SamplerError::Persistence(e.to_string()))?;
            }
        }

        let file = File::create(&path).map_err(|e| SamplerError::Persistence(e.to_string()))?;
        let mut writer = csv::Writer::from_writer(file);
        writer
            .write_record(header)
            .map_err(|e| SamplerError::Persistence(e.to_string()))?;
        writer
            .flush()
            .map_err(|e| SamplerError::Persistence(e.to_string()))?;

        Ok(Self {
            path,
            batch_size: batch_size.max(1),
            pending: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Queues one row, flushing when the batch reaches the size threshold.
    pub(crate) fn append(&self, row: Row) -> Result<(), SamplerError> {
        let should_flush = {
            let mut pending = self.pending.lock().unwrap();
            pending.push(row);
            pending.len() >= self.batch_size
        };
        if should_flush {
            self.flush()
        } else {
            Ok(())
        }
    }

    /// Appends every pending row to the log in one write, then clears the
    /// batch. An empty batch is a successful no-op.
    pub(crate) fn flush(&self) -> Result<(), SamplerError> {
        let mut pending = self.pending.lock().unwrap();
        if pending.is_empty() {
            return Ok(());
        }
        debug!(
            "Flushing {} rows to {}",
            pending.len(),
            self.path.display()
        );

        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| SamplerError::Persistence(e.to_string()))?;
        let mut writer = csv::Writer::from_writer(file);
        for row in pending.iter() {
            let mut record = vec![row.timestamp().to_string()];
            record.extend(row.values().iter().map(|v| v.to_string()));
            writer
                .write_record(&record)
                .map_err(|e| SamplerError::Persistence(e.to_string()))?;
        }
        writer
            .flush()
            .map_err(|e| SamplerError::Persistence(e.to_string()))?;

        pending.clear();
        Ok(())
    }

    #[cfg(test)]
    fn pending_len(&self) -> usize {
        self.pending.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Vec<String> {
        vec!["timestamp".to_string(), "Accelerometer_X".to_string()]
    }

    fn row(second: usize, value: f64) -> Row {
        Row::new(format!("2026-08-06 10:00:{:02}", second), vec![value])
    }

    fn line_count(path: &Path) -> usize {
        std::fs::read_to_string(path).unwrap().lines().count()
    }

    #[test]
    fn test_header_written_once_and_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");

        let writer = CsvLogWriter::new(&path, &header(), 10).unwrap();
        writer.append(row(0, 1.0)).unwrap();
        writer.flush().unwrap();
        assert_eq!(line_count(&path), 2);

        // A new writer starts the file over.
        let _writer = CsvLogWriter::new(&path, &header(), 10).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "timestamp,Accelerometer_X\n");
    }

    #[test]
    fn test_append_below_threshold_stays_pending() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        let writer = CsvLogWriter::new(&path, &header(), 3).unwrap();

        writer.append(row(0, 1.0)).unwrap();
        writer.append(row(1, 2.0)).unwrap();
        assert_eq!(writer.pending_len(), 2);
        assert_eq!(line_count(&path), 1, "only the header is on disk");
    }

    #[test]
    fn test_batch_size_triggers_automatic_flush() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        let writer = CsvLogWriter::new(&path, &header(), 3).unwrap();

        for i in 0..3 {
            writer.append(row(i, i as f64)).unwrap();
        }
        assert_eq!(writer.pending_len(), 0);
        assert_eq!(line_count(&path), 4);
    }

    #[test]
    fn test_explicit_flush_persists_partial_batch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        let writer = CsvLogWriter::new(&path, &header(), 20).unwrap();

        for i in 0..19 {
            writer.append(row(i, i as f64)).unwrap();
        }
        writer.flush().unwrap();
        assert_eq!(writer.pending_len(), 0);
        assert_eq!(line_count(&path), 20);
    }

    #[test]
    fn test_flush_on_empty_batch_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        let writer = CsvLogWriter::new(&path, &header(), 3).unwrap();
        assert!(writer.flush().is_ok());
    }

    #[test]
    fn test_rows_keep_insertion_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        let writer = CsvLogWriter::new(&path, &header(), 2).unwrap();

        writer.append(row(0, 1.5)).unwrap();
        writer.append(row(1, 2.5)).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[1], "2026-08-06 10:00:00,1.5");
        assert_eq!(lines[2], "2026-08-06 10:00:01,2.5");
    }
}
