use std::{fmt, path::PathBuf, str::FromStr};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

pub const DEFAULT_POLICY_PATH: &str = "config/default_rules.json";
pub const DEFAULT_REPORT_DIR: &str = "reports";
pub const DEFAULT_SSHD_CONFIG: &str = "/etc/ssh/sshd_config";
pub const DEFAULT_SSH_SERVICE: &str = "ssh";

/// How privileged commands are elevated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Privilege {
    /// Always prefix commands with `sudo`
    #[default]
    Sudo,
    /// Run commands as the current user
    None,
    /// Use `sudo` unless already running as root
    Auto,
}

impl Privilege {
    /// Whether commands should be wrapped in `sudo`
    pub fn uses_sudo(self) -> bool {
        match self {
            Privilege::Sudo => true,
            Privilege::None => false,
            Privilege::Auto => !nix::unistd::geteuid().is_root(),
        }
    }
}

impl FromStr for Privilege {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sudo" => Ok(Privilege::Sudo),
            "none" => Ok(Privilege::None),
            "auto" => Ok(Privilege::Auto),
            other => Err(format!(
                "unknown privilege mode '{other}' (expected sudo, none or auto)"
            )),
        }
    }
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Privilege::Sudo => "sudo",
            Privilege::None => "none",
            Privilege::Auto => "auto",
        };
        f.write_str(name)
    }
}

/// Process-wide settings, built once at startup and shared by reference
#[derive(Debug, Clone)]
pub struct Settings {
    pub policy_path: PathBuf,
    pub report_dir: PathBuf,
    pub sshd_config: PathBuf,
    pub ssh_service: String,
    pub privilege: Privilege,
    pub started_at: DateTime<Local>,
}

impl Settings {
    pub fn new(started_at: DateTime<Local>) -> Self {
        Self {
            policy_path: PathBuf::from(DEFAULT_POLICY_PATH),
            report_dir: PathBuf::from(DEFAULT_REPORT_DIR),
            sshd_config: PathBuf::from(DEFAULT_SSHD_CONFIG),
            ssh_service: DEFAULT_SSH_SERVICE.to_string(),
            privilege: Privilege::default(),
            started_at,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(Local::now())
    }
}
