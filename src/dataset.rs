//! Steering dataset log.
//!
//! One `LogEntry` per snapshot, kept in memory in capture order and written
//! once, at shutdown, as a two-column CSV (`name_image,steering`).

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CSV_HEADER: [&str; 2] = ["name_image", "steering"];

/// Snapshot file name paired with the steering angle at capture time.
///
/// Fields are private: entries are immutable once recorded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    name_image: String,
    steering: String,
}

impl LogEntry {
    pub fn new(name_image: impl Into<String>, steering: impl Into<String>) -> Self {
        Self {
            name_image: name_image.into(),
            steering: steering.into(),
        }
    }

    /// Entry for a steering angle in radians.
    pub fn from_angle(name_image: impl Into<String>, angle: f64) -> Self {
        Self::new(name_image, format_angle(angle))
    }

    pub fn name_image(&self) -> &str {
        &self.name_image
    }

    pub fn steering(&self) -> &str {
        &self.steering
    }
}

/// Shortest round-trippable decimal, always with a fractional part ("0.0", "-0.01").
pub fn format_angle(angle: f64) -> String {
    format!("{:?}", angle)
}

/// Write all entries to `path`, truncating any previous file.
pub fn flush(path: &Path, entries: &[LogEntry]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("open steering csv {}", path.display()))?;
    writer.write_record(CSV_HEADER)?;
    for entry in entries {
        writer.serialize(entry)?;
    }
    writer
        .flush()
        .with_context(|| format!("flush steering csv {}", path.display()))?;
    Ok(())
}

/// Read a steering CSV back, requiring the exact header.
pub fn read_entries(path: &Path) -> Result<Vec<LogEntry>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("open steering csv {}", path.display()))?;
    let headers = reader.headers()?.clone();
    if headers.iter().ne(CSV_HEADER.iter().copied()) {
        return Err(anyhow!(
            "unexpected csv header in {}: {:?}",
            path.display(),
            headers
        ));
    }
    let entries = reader
        .deserialize()
        .collect::<std::result::Result<Vec<LogEntry>, _>>()
        .with_context(|| format!("parse steering csv {}", path.display()))?;
    Ok(entries)
}
