//! Suite report

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::E2eResult;
use crate::step::{Outcome, StepId};

pub const REPORT_FILE: &str = "suite-report.json";

/// Outcome of one step, in execution order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEntry {
    pub id: StepId,
    pub name: String,
    pub group: String,
    pub outcome: Outcome,
    pub message: Option<String>,
    pub duration_ms: u64,
}

/// Result of one suite run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Set when a fatal error stopped the run early.
    pub aborted: Option<String>,
    pub entries: Vec<ReportEntry>,
}

impl Default for SuiteReport {
    fn default() -> Self {
        Self::new()
    }
}

impl SuiteReport {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            aborted: None,
            entries: Vec::new(),
        }
    }

    pub fn record(&mut self, entry: ReportEntry) {
        self.entries.push(entry);
    }

    pub fn outcome(&self, id: &StepId) -> Option<&Outcome> {
        self.entries
            .iter()
            .find(|entry| &entry.id == id)
            .map(|entry| &entry.outcome)
    }

    pub fn passed(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_failed()).count()
    }

    pub fn skipped(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_skipped()).count()
    }

    pub fn total(&self) -> usize {
        self.entries.len()
    }

    /// Skipped steps are informational: their root cause is already counted.
    pub fn success(&self) -> bool {
        self.failed() == 0
    }

    /// 0 on success, 1 when a step failed, 2 when the run was aborted.
    pub fn exit_code(&self) -> i32 {
        if self.aborted.is_some() {
            2
        } else if self.success() {
            0
        } else {
            1
        }
    }

    pub fn duration_ms(&self) -> u64 {
        self.entries.iter().map(|e| e.duration_ms).sum()
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Write the report as pretty JSON into `dir`, creating it if needed.
    pub fn write_json(&self, dir: &Path) -> E2eResult<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(REPORT_FILE);
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        info!(path = %path.display(), "Report written");
        Ok(path)
    }

    pub fn to_yaml(&self) -> E2eResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
