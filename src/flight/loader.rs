use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::flight::{FlightError, FlightSummary, RejectReason, TelemetryPoint};

/// Outcome counts of loading a batch of summary files.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LoadReport {
    pub files: usize,
    pub loaded: usize,
    pub rejected: BTreeMap<RejectReason, usize>,
}

impl LoadReport {
    pub fn rejected_total(&self) -> usize {
        self.rejected.values().sum()
    }

    fn reject(&mut self, reason: RejectReason) {
        *self.rejected.entry(reason).or_default() += 1;
    }
}

/// Find summary files laid out as `<folder>/<a>/<b>/<serial>.json`.
///
/// The result is sorted so repeated runs visit flights in the same order.
pub fn discover_summary_files(folder: &Path) -> Result<Vec<PathBuf>, FlightError> {
    if !folder.is_dir() {
        return Err(FlightError::FolderNotFound(folder.to_path_buf()));
    }

    let mut files = Vec::new();
    for level1 in subdirectories(folder)? {
        for level2 in subdirectories(&level1)? {
            for entry in fs::read_dir(&level2)? {
                let path = entry?.path();
                if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                    files.push(path);
                }
            }
        }
    }

    files.sort();
    Ok(files)
}

fn subdirectories(path: &Path) -> Result<Vec<PathBuf>, FlightError> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(path)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    Ok(dirs)
}

/// Load one summary file. Anything other than exactly three well-formed
/// points is rejected.
fn load_summary_file(path: &Path) -> Result<FlightSummary, FlightError> {
    let content = fs::read_to_string(path)?;
    let raw: Vec<serde_json::Value> = serde_json::from_str(&content)?;
    if raw.len() != 3 {
        return Err(FlightError::InvalidPointCount(raw.len()));
    }

    let points = raw
        .into_iter()
        .map(serde_json::from_value::<TelemetryPoint>)
        .collect::<Result<Vec<_>, _>>()?;
    let summary = FlightSummary::try_from(points)?;
    summary.validate()?;
    Ok(summary)
}

/// Load every file, skipping and counting the ones that fail.
pub fn load_summaries(files: &[PathBuf]) -> (Vec<FlightSummary>, LoadReport) {
    let mut report = LoadReport {
        files: files.len(),
        ..Default::default()
    };
    let mut summaries = Vec::with_capacity(files.len());

    for path in files {
        match load_summary_file(path) {
            Ok(summary) => summaries.push(summary),
            Err(e) => {
                log::warn!("Skipping summary {}: {}", path.display(), e);
                report.reject(e.reason());
            }
        }
    }

    report.loaded = summaries.len();
    (summaries, report)
}
