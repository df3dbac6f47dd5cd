//! Session-scoped persistence.
//!
//! One session owns one directory for the whole run: a subdirectory per
//! query holding a text file per accepted record, plus a cumulative
//! `dataset.csv`. CSV rows are buffered in the session value and appended
//! in fixed-size batches; the buffer is owned here and mutated only by the
//! orchestrating task, with an explicit flush on close.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;

use crate::error::{Result, ScoutError};
use crate::metadata::DatasetRecord;

/// Rows buffered before each CSV append.
pub const CSV_FLUSH_THRESHOLD: usize = 10;

/// Length cap for sanitized directory and file names.
const SANITIZED_NAME_LEN: usize = 50;

/// Width of the separator between a record's header and its text.
const SEPARATOR_WIDTH: usize = 80;

#[derive(Debug, Serialize)]
struct CsvRow {
    query: String,
    url: String,
    dataset_name: String,
    formats: String,
    download_links: String,
    license: String,
    relevance: u8,
    local_path: String,
}

/// The output scope of one run.
pub struct Session {
    session_dir: PathBuf,
    csv_path: PathBuf,
    buffer: Vec<CsvRow>,
}

impl Session {
    /// Create a session under `data_dir`.
    ///
    /// When `session_id` is not given, a timestamp-derived one is used.
    pub fn create(data_dir: impl AsRef<Path>, session_id: Option<&str>) -> Result<Self> {
        let id = match session_id {
            Some(id) => id.to_string(),
            None => Local::now().format("%Y%m%d_%H%M%S").to_string(),
        };

        let session_dir = data_dir.as_ref().join(id);
        fs::create_dir_all(&session_dir).map_err(|e| ScoutError::Storage {
            path: session_dir.clone(),
            source: e,
        })?;

        let csv_path = session_dir.join("dataset.csv");

        Ok(Self {
            session_dir,
            csv_path,
            buffer: Vec::new(),
        })
    }

    /// The session's directory.
    pub fn session_dir(&self) -> &Path {
        &self.session_dir
    }

    /// Path of the cumulative table.
    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }

    /// Persist one record: write its text file and buffer its CSV row.
    ///
    /// Returns the path of the written text file. Flushes the CSV buffer
    /// automatically once it reaches [`CSV_FLUSH_THRESHOLD`].
    pub fn save_record(&mut self, record: &DatasetRecord) -> Result<PathBuf> {
        let query_dir = self.session_dir.join(sanitize_prefix(&record.query));
        fs::create_dir_all(&query_dir).map_err(|e| ScoutError::Storage {
            path: query_dir.clone(),
            source: e,
        })?;

        let file_path = query_dir.join(format!("{}.txt", sanitize_suffix(&record.url)));
        fs::write(&file_path, render_record(record)).map_err(|e| ScoutError::Storage {
            path: file_path.clone(),
            source: e,
        })?;

        self.buffer.push(CsvRow {
            query: record.query.clone(),
            url: record.url.clone(),
            dataset_name: record.dataset_name.clone(),
            formats: format_list(&record.formats),
            download_links: format_list(&record.download_links),
            license: record.license.clone(),
            relevance: record.relevance_score,
            local_path: file_path.display().to_string(),
        });

        if self.buffer.len() >= CSV_FLUSH_THRESHOLD {
            self.flush()?;
        }

        Ok(file_path)
    }

    /// Append buffered rows to the cumulative CSV.
    ///
    /// An empty buffer performs no file write at all; repeated flushes are
    /// idempotent. The header row is written only when the file is first
    /// created.
    pub fn flush(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let existed = self.csv_path.exists();
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.csv_path)
            .map_err(|e| ScoutError::Storage {
                path: self.csv_path.clone(),
                source: e,
            })?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(!existed)
            .from_writer(file);

        let rows = self.buffer.len();
        for row in self.buffer.drain(..) {
            writer.serialize(row)?;
        }
        writer.flush().map_err(|e| ScoutError::Storage {
            path: self.csv_path.clone(),
            source: e,
        })?;

        tracing::debug!(rows, csv = %self.csv_path.display(), "flushed record batch");
        Ok(())
    }

    /// Flush remaining rows and consume the session.
    pub fn close(mut self) -> Result<()> {
        self.flush()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.buffer.is_empty() {
            if let Err(e) = self.flush() {
                tracing::warn!(error = %e, "failed to flush session buffer on drop");
            }
        }
    }
}

/// Replace non-alphanumeric chars with `_` and keep the first 50 chars.
fn sanitize_prefix(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .take(SANITIZED_NAME_LEN)
        .collect()
}

/// Replace non-alphanumeric chars with `_` and keep the *last* 50 chars —
/// the tail of a URL is its distinctive part.
fn sanitize_suffix(name: &str) -> String {
    let sanitized: Vec<char> = name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    let start = sanitized.len().saturating_sub(SANITIZED_NAME_LEN);
    sanitized[start..].iter().collect()
}

/// Render a list the way the table consumer expects it: `['CSV', 'JSON']`.
fn format_list(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|i| format!("'{}'", i)).collect();
    format!("[{}]", quoted.join(", "))
}

fn render_record(record: &DatasetRecord) -> String {
    let mut out = String::new();
    out.push_str(&format!("URL: {}\n", record.url));
    out.push_str(&format!("Query: {}\n", record.query));
    out.push_str(&format!("Dataset Name: {}\n", record.dataset_name));
    out.push_str(&format!("Formats: {}\n", format_list(&record.formats)));
    out.push_str(&format!(
        "Download Links: {}\n",
        format_list(&record.download_links)
    ));
    out.push_str(&format!("License: {}\n", record.license));
    out.push_str(&format!("Description: {}\n", record.description));
    out.push_str(&"-".repeat(SEPARATOR_WIDTH));
    out.push('\n');
    out.push_str(&record.text);
    out
}
