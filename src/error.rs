use thiserror::Error;

use std::{path::PathBuf, process::ExitStatus};

/// Coarse classification used when reporting failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Policy document or settings file missing, unreadable or malformed
    Config,
    /// An external command could not be started or exited non-zero
    Command,
    /// Reading or writing a file failed
    Io,
}

#[derive(Debug, Error)]
pub enum HardkitError {
    #[error("failed to read policy {path}: {source}")]
    PolicyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse policy {path}: {source}")]
    PolicyParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("policy {path} is not a JSON object")]
    PolicyNotObject { path: PathBuf },

    #[error("policy is missing required key '{key}'")]
    MissingKey { key: &'static str },

    #[error("invalid '{key}' in policy: {source}")]
    InvalidSection {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to execute `{command}`: {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command `{command}` failed with {status}{}", stderr_suffix(.stderr))]
    CommandFailed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("I/O error on {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HardkitError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PolicyRead { .. }
            | Self::PolicyParse { .. }
            | Self::PolicyNotObject { .. }
            | Self::MissingKey { .. }
            | Self::InvalidSection { .. }
            | Self::ConfigParse { .. } => ErrorKind::Config,
            Self::CommandSpawn { .. } | Self::CommandFailed { .. } => ErrorKind::Command,
            Self::File { .. } | Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Wrap an I/O error with the path it happened on
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}
