use chrono::{DateTime, Local};

use crate::error::HardkitError;
use crate::settings::Settings;

use super::args::Args;
use super::config::ConfigFile;

/// Build settings from defaults, the config file and command line flags
pub struct SettingsLoader;

impl SettingsLoader {
    /// Load complete settings from CLI arguments
    pub fn load(args: &Args, started_at: DateTime<Local>) -> Result<Settings, HardkitError> {
        let mut settings = Settings::new(started_at);

        // Configuration file first so that flags win
        if let Some(config_path) = args.config.as_ref() {
            ConfigFile::load(config_path)?.apply(&mut settings);
        }

        if let Some(policy) = &args.policy {
            settings.policy_path = policy.clone();
        }
        if let Some(reports) = &args.reports {
            settings.report_dir = reports.clone();
        }
        if let Some(sshd_config) = &args.sshd_config {
            settings.sshd_config = sshd_config.clone();
        }
        if let Some(service) = &args.ssh_service {
            settings.ssh_service = service.clone();
        }
        if let Some(privilege) = args.privilege {
            settings.privilege = privilege;
        }

        Ok(settings)
    }
}
