//! Append-only JSONL trace log

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::events::TraceRecord;

/// One JSON record per line, appended across attempts
pub struct TraceLog {
    path: PathBuf,
}

impl TraceLog {
    /// Open (or prepare) a trace log. Parent directories are created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = expand_path(path)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create trace log directory: {}", parent.display())
                })?;
            }
        }

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append records and flush
    pub fn append(&self, records: &[TraceRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open trace log: {}", self.path.display()))?;

        let mut buffer = String::new();
        for record in records {
            buffer.push_str(&record.to_json_line().context("Failed to serialize trace record")?);
        }
        file.write_all(buffer.as_bytes())
            .context("Failed to write trace log")?;
        file.flush()?;

        debug!("Appended {} trace records to {}", records.len(), self.path.display());
        Ok(())
    }

    /// Read every record back. Lines that do not parse are skipped.
    pub fn read_all(&self) -> Result<Vec<TraceRecord>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to open trace log: {}", self.path.display()))
            }
        };

        let mut records = Vec::new();
        for (number, line) in BufReader::new(file).lines().enumerate() {
            let line = line.context("Failed to read trace log")?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping malformed trace line {}: {}", number + 1, e),
            }
        }
        Ok(records)
    }
}

/// Expand a leading `~` to the home directory
fn expand_path<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let path_str = path.as_ref().to_str()
        .context("Invalid path encoding")?;

    let expanded = match path_str.strip_prefix("~/") {
        Some(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => PathBuf::from(path_str),
        },
        None => PathBuf::from(path_str),
    };

    Ok(expanded)
}
