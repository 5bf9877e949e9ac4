pub mod logfile;
pub mod report;

pub use logfile::{AuditLog, LogContents, NO_LOGS, STATUS_SUCCESS, failure_status};
pub use report::{Report, ReportEntry, read_report};
