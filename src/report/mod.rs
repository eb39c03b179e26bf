//! Report persistence
//!
//! Each run is written to `<results_root>/<task>/<yyyyMMdd_HHmmss>/` as
//! `junit-report.xml` and `result.json`.

pub mod json;
pub mod junit;
pub mod summary;

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::PROJECT_DIR;
use crate::domain::TaskResult;
use crate::error::{GepettoError, Result};

pub const JUNIT_FILE: &str = "junit-report.xml";
pub const JSON_FILE: &str = "result.json";
const RUN_DIR_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Replace every character outside `[A-Za-z0-9-_.]` with `_`
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Files written for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub dir: PathBuf,
    pub junit: PathBuf,
    pub json: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ReportWriter {
    results_root: PathBuf,
}

impl Default for ReportWriter {
    fn default() -> Self {
        Self::new(Path::new(PROJECT_DIR).join("results"))
    }
}

impl ReportWriter {
    pub fn new(results_root: impl Into<PathBuf>) -> Self {
        Self {
            results_root: results_root.into(),
        }
    }

    pub fn results_root(&self) -> &Path {
        &self.results_root
    }

    /// Directory a result is written to
    pub fn run_dir(&self, result: &TaskResult) -> PathBuf {
        self.results_root
            .join(sanitize_file_name(&result.task.name))
            .join(result.execution_time.format(RUN_DIR_FORMAT).to_string())
    }

    pub fn save(&self, result: &TaskResult) -> Result<ReportPaths> {
        let dir = self.run_dir(result);
        fs::create_dir_all(&dir)
            .map_err(|e| GepettoError::Report(format!("Failed to create {}: {}", dir.display(), e)))?;

        let junit_path = dir.join(JUNIT_FILE);
        fs::write(&junit_path, junit::render(result))
            .map_err(|e| GepettoError::Report(format!("Failed to write {}: {}", junit_path.display(), e)))?;

        let json_path = dir.join(JSON_FILE);
        fs::write(&json_path, json::render(result)?)
            .map_err(|e| GepettoError::Report(format!("Failed to write {}: {}", json_path.display(), e)))?;

        log::info!("Saved reports to {}", dir.display());
        Ok(ReportPaths {
            dir,
            junit: junit_path,
            json: json_path,
        })
    }
}
