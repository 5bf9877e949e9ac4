use std::{
    fmt,
    fs::{self, OpenOptions},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Local};

use crate::error::HardkitError;

const FILE_PREFIX: &str = "report_";
const FILE_SUFFIX: &str = ".log";

pub const STATUS_SUCCESS: &str = "Success";
pub const NO_LOGS: &str = "No logs available.";

/// Append-only record of action outcomes for one process run
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

/// Contents of an audit log as seen by a reader
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogContents {
    Available(String),
    /// No log file has been written yet
    Missing,
}

impl fmt::Display for LogContents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogContents::Available(text) => f.write_str(text),
            LogContents::Missing => f.write_str(NO_LOGS),
        }
    }
}

impl AuditLog {
    /// Log for a run started at `started_at`, stored under `report_dir`
    pub fn for_run(report_dir: &Path, started_at: DateTime<Local>) -> Self {
        let name = format!(
            "{FILE_PREFIX}{}{FILE_SUFFIX}",
            started_at.format("%Y%m%d_%H%M%S")
        );
        Self::at(report_dir.join(name))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `[<timestamp>] <action>: <status>`, creating the file and its directory if needed
    pub fn record(&self, action: &str, status: &str) -> Result<(), HardkitError> {
        self.record_at(Local::now(), action, status)
    }

    pub(crate) fn record_at(
        &self,
        at: DateTime<Local>,
        action: &str,
        status: &str,
    ) -> Result<(), HardkitError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| HardkitError::file(parent, source))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| HardkitError::file(&self.path, source))?;
        writeln!(file, "{}", format_entry(at, action, status))
            .map_err(|source| HardkitError::file(&self.path, source))
    }

    /// Whole log as text, or [`LogContents::Missing`] if nothing was recorded yet
    pub fn read_all(&self) -> Result<LogContents, HardkitError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(LogContents::Available(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(LogContents::Missing),
            Err(source) => Err(HardkitError::file(&self.path, source)),
        }
    }

    /// Most recent run log in `report_dir`, if any.
    ///
    /// File names embed the start time, so lexical order is chronological.
    pub fn latest(report_dir: &Path) -> Result<Option<Self>, HardkitError> {
        let entries = match fs::read_dir(report_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(HardkitError::file(report_dir, source)),
        };

        let latest = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| {
                let name = entry.file_name().into_string().ok()?;
                (name.starts_with(FILE_PREFIX) && name.ends_with(FILE_SUFFIX)).then_some(name)
            })
            .max();

        Ok(latest.map(|name| Self::at(report_dir.join(name))))
    }
}

fn format_entry(at: DateTime<Local>, action: &str, status: &str) -> String {
    format!("[{}] {action}: {status}", at.format("%Y-%m-%d %H:%M:%S%.6f"))
}

/// Status text for a failed action, folded onto a single line
pub fn failure_status(error: &dyn fmt::Display) -> String {
    let text = error.to_string();
    let detail = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("; ");
    format!("Failed - {detail}")
}
