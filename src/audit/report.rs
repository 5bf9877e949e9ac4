use super::logfile::{AuditLog, LogContents, STATUS_SUCCESS};
use crate::error::HardkitError;

/// One parsed audit line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub timestamp: String,
    pub action: String,
    pub status: String,
}

impl ReportEntry {
    /// Parse `[<timestamp>] <action>: <status>`
    pub fn parse(line: &str) -> Option<Self> {
        let rest = line.strip_prefix('[')?;
        let (timestamp, rest) = rest.split_once("] ")?;
        let (action, status) = rest.split_once(": ")?;
        Some(Self {
            timestamp: timestamp.to_string(),
            action: action.to_string(),
            status: status.to_string(),
        })
    }

    pub fn succeeded(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

/// Audit log read back for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub text: String,
    pub entries: Vec<ReportEntry>,
}

impl Report {
    pub fn from_text(text: String) -> Self {
        let entries = text.lines().filter_map(ReportEntry::parse).collect();
        Self { text, entries }
    }

    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.succeeded()).count()
    }

    pub fn failed(&self) -> usize {
        self.entries.len() - self.succeeded()
    }
}

/// Read the log behind `log`; `Ok(None)` means there is nothing to report yet
pub fn read_report(log: &AuditLog) -> Result<Option<Report>, HardkitError> {
    match log.read_all()? {
        LogContents::Available(text) => Ok(Some(Report::from_text(text))),
        LogContents::Missing => Ok(None),
    }
}
