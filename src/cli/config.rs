use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    error::HardkitError,
    settings::{Privilege, Settings},
};

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub ssh: SshConfig,
    #[serde(default)]
    pub commands: CommandsConfig,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct PathsConfig {
    /// Policy document (JSON)
    pub policy: Option<PathBuf>,
    /// Directory for audit logs
    pub reports: Option<PathBuf>,
    /// sshd configuration file
    pub sshd_config: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct SshConfig {
    /// Service restarted after rewriting sshd_config
    pub service: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct CommandsConfig {
    pub privilege: Option<Privilege>,
}

impl ConfigFile {
    /// Load configuration file
    pub fn load(path: &Path) -> Result<Self, HardkitError> {
        let content = fs::read_to_string(path).map_err(|source| HardkitError::file(path, source))?;
        toml::from_str(&content).map_err(|source| HardkitError::ConfigParse {
            path: PathBuf::from(path),
            source,
        })
    }

    /// Override `settings` with every value present in the file
    pub fn apply(self, settings: &mut Settings) {
        if let Some(policy) = self.paths.policy {
            settings.policy_path = policy;
        }
        if let Some(reports) = self.paths.reports {
            settings.report_dir = reports;
        }
        if let Some(sshd_config) = self.paths.sshd_config {
            settings.sshd_config = sshd_config;
        }
        if let Some(service) = self.ssh.service {
            settings.ssh_service = service;
        }
        if let Some(privilege) = self.commands.privilege {
            settings.privilege = privilege;
        }
    }
}
