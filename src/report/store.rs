//! Report persistence.
//!
//! Each run writes a fresh `report-<UTC timestamp>.txt`; existing reports
//! are never opened for writing.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::error::Result;

use super::run_report::RunReport;

const PREFIX: &str = "report-";
const SUFFIX: &str = ".txt";
const MAX_COLLISIONS: u32 = 1000;

/// Directory of run reports.
pub struct ReportStore {
    dir: PathBuf,
}

impl ReportStore {
    /// Create a store rooted at `dir`. Nothing is created until a write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `report` to a new file and return its path.
    ///
    /// Two reports stamped with the same millisecond get a counter suffix.
    pub fn write(&self, report: &RunReport) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create report directory {:?}", self.dir))?;

        let stamp = report.timestamp.format("%Y%m%dT%H%M%S%.3fZ").to_string();
        let text = report.render();

        for attempt in 0..MAX_COLLISIONS {
            let name = if attempt == 0 {
                format!("{}{}{}", PREFIX, stamp, SUFFIX)
            } else {
                format!("{}{}-{}{}", PREFIX, stamp, attempt, SUFFIX)
            };
            let path = self.dir.join(name);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(text.as_bytes())
                        .with_context(|| format!("Failed to write report {:?}", path))?;
                    tracing::debug!("Wrote report {}", path.display());
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(anyhow::Error::new(e)
                        .context(format!("Failed to create report {:?}", path))
                        .into())
                }
            }
        }

        Err(anyhow::anyhow!("Too many reports stamped {} in {:?}", stamp, self.dir).into())
    }

    /// All report files, oldest first.
    pub fn list(&self) -> Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut reports: Vec<(String, u32, PathBuf)> = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if let Some((stamp, counter)) = parse_name(name) {
                reports.push((stamp.to_string(), counter, path.clone()));
            }
        }

        reports.sort();
        Ok(reports.into_iter().map(|(_, _, path)| path).collect())
    }

    /// The newest report, if any.
    pub fn latest(&self) -> Result<Option<PathBuf>> {
        Ok(self.list()?.pop())
    }
}

/// Split `report-<stamp>[-n].txt` into its stamp and counter.
fn parse_name(name: &str) -> Option<(&str, u32)> {
    let body = name.strip_prefix(PREFIX)?.strip_suffix(SUFFIX)?;
    match body.rsplit_once('-') {
        Some((stamp, n)) if n.chars().all(|c| c.is_ascii_digit()) && !n.is_empty() => {
            Some((stamp, n.parse().ok()?))
        }
        _ => Some((body, 0)),
    }
}
