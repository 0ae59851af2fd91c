//! Recording verification.
//!
//! Checks a finished recording directory against its steering CSV:
//! - the CSV has the `name_image,steering` header and parses
//! - every referenced snapshot exists and fully decodes as PNG
//! - all snapshots share one size
//! - every steering value is a number within the mechanical range

use anyhow::Result;
use std::path::Path;

use crate::dataset;

/// Outcome of `verify_recording`.
#[derive(Clone, Debug, Default)]
pub struct VerifyReport {
    pub entries: usize,
    pub missing_images: Vec<String>,
    pub undecodable_images: Vec<String>,
    /// Images whose size differs from the first decodable one.
    pub size_mismatches: Vec<String>,
    pub image_size: Option<(u32, u32)>,
    /// `(image, steering)` rows whose steering is not a number in range.
    pub bad_steering: Vec<(String, String)>,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.missing_images.is_empty()
            && self.undecodable_images.is_empty()
            && self.size_mismatches.is_empty()
            && self.bad_steering.is_empty()
    }
}

/// Verify `dir/csv_file_name` and the snapshots it references.
///
/// Structural CSV problems (missing file, wrong header, malformed rows) are errors;
/// per-entry problems are collected in the report.
pub fn verify_recording(dir: &Path, csv_file_name: &str, max_angle: f64) -> Result<VerifyReport> {
    let entries = dataset::read_entries(&dir.join(csv_file_name))?;
    let mut report = VerifyReport {
        entries: entries.len(),
        ..VerifyReport::default()
    };

    for entry in &entries {
        let name = entry.name_image().to_string();
        let path = dir.join(entry.name_image());
        if !path.is_file() {
            report.missing_images.push(name);
        } else {
            match image::open(&path).map(|img| (img.width(), img.height())) {
                Ok(size) => match report.image_size {
                    None => report.image_size = Some(size),
                    Some(expected) if expected != size => report.size_mismatches.push(name),
                    Some(_) => {}
                },
                Err(e) => {
                    log::warn!("cannot decode {}: {}", path.display(), e);
                    report.undecodable_images.push(name);
                }
            }
        }

        let in_range = entry
            .steering()
            .parse::<f64>()
            .map(|angle| angle.is_finite() && angle.abs() <= max_angle)
            .unwrap_or(false);
        if !in_range {
            report
                .bad_steering
                .push((entry.name_image().to_string(), entry.steering().to_string()));
        }
    }

    Ok(report)
}
