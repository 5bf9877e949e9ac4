pub mod firewall;
pub mod services;
pub mod ssh;

use std::{fmt, path::Path};

use thiserror::Error;

use crate::{
    audit::{AuditLog, Report, STATUS_SUCCESS, failure_status, read_report},
    error::HardkitError,
    policy::PolicyStore,
    runtime::CommandRunner,
    settings::Settings,
};

/// The user-triggered operations that leave an audit entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    FirewallSetup,
    RemoveServices,
    SshHardening,
    BackupConfiguration,
    RestoreConfiguration,
}

impl Action {
    /// Name written to the audit log
    pub fn label(self) -> &'static str {
        match self {
            Action::FirewallSetup => "Firewall Setup",
            Action::RemoveServices => "Remove Unnecessary Services",
            Action::SshHardening => "SSH Hardening",
            Action::BackupConfiguration => "Backup Configuration",
            Action::RestoreConfiguration => "Restore Configuration",
        }
    }

    pub fn success_message(self) -> &'static str {
        match self {
            Action::FirewallSetup => "Firewall setup completed successfully.",
            Action::RemoveServices => "Unnecessary services removed successfully.",
            Action::SshHardening => "SSH configuration hardened successfully.",
            Action::BackupConfiguration => "Configuration backup completed successfully.",
            Action::RestoreConfiguration => "Configuration restored successfully.",
        }
    }

    fn failure_prefix(self) -> &'static str {
        match self {
            Action::FirewallSetup => "Firewall setup failed",
            Action::RemoveServices => "Failed to remove services",
            Action::SshHardening => "SSH hardening failed",
            Action::BackupConfiguration => "Failed to backup configuration",
            Action::RestoreConfiguration => "Failed to restore configuration",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How an action ended when it did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStatus {
    Completed,
    /// No path was supplied for backup/restore; nothing ran and nothing was logged
    Cancelled,
}

/// A failed action, already recorded in the audit log
#[derive(Debug, Error)]
#[error("{}: {source}", .action.failure_prefix())]
pub struct ActionError {
    pub action: Action,
    #[source]
    pub source: HardkitError,
}

pub type ActionResult = Result<ActionStatus, ActionError>;

/// Runs policy actions against the on-disk policy and records each outcome.
///
/// Holds no state between actions beyond the policy file and the run's
/// audit log.
pub struct Toolkit<'a, R> {
    settings: &'a Settings,
    store: PolicyStore,
    audit: AuditLog,
    runner: R,
}

impl<'a, R: CommandRunner> Toolkit<'a, R> {
    pub fn new(settings: &'a Settings, runner: R) -> Self {
        Self {
            settings,
            store: PolicyStore::new(&settings.policy_path),
            audit: AuditLog::for_run(&settings.report_dir, settings.started_at),
            runner,
        }
    }

    /// Use an existing audit log instead of this run's own file
    pub fn with_audit_log(mut self, audit: AuditLog) -> Self {
        self.audit = audit;
        self
    }

    pub fn settings(&self) -> &Settings {
        self.settings
    }

    pub fn store(&self) -> &PolicyStore {
        &self.store
    }

    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    /// Write the built-in policy on first run
    pub fn ensure_defaults(&self) -> Result<bool, HardkitError> {
        self.store.ensure_defaults()
    }

    pub async fn apply_firewall_policy(&self) -> ActionResult {
        let outcome = firewall::apply(&self.store, &self.runner).await;
        self.conclude(Action::FirewallSetup, outcome)
    }

    pub async fn disable_unnecessary_services(&self) -> ActionResult {
        let outcome = services::disable(&self.store, &self.runner)
            .await
            .map(|_ignored| ());
        self.conclude(Action::RemoveServices, outcome)
    }

    pub async fn harden_ssh(&self) -> ActionResult {
        let outcome = ssh::harden(
            &self.store,
            &self.runner,
            &self.settings.sshd_config,
            &self.settings.ssh_service,
        )
        .await;
        self.conclude(Action::SshHardening, outcome)
    }

    pub fn backup_configuration(&self, destination: Option<&Path>) -> ActionResult {
        let Some(destination) = destination else {
            log::info!("Backup cancelled: no destination given");
            return Ok(ActionStatus::Cancelled);
        };
        let outcome = self.store.backup(destination);
        self.conclude(Action::BackupConfiguration, outcome)
    }

    pub fn restore_configuration(&self, source: Option<&Path>) -> ActionResult {
        let Some(source) = source else {
            log::info!("Restore cancelled: no backup file given");
            return Ok(ActionStatus::Cancelled);
        };
        let outcome = self.store.restore(source);
        self.conclude(Action::RestoreConfiguration, outcome)
    }

    /// Read back the audit log; `Ok(None)` when nothing has been logged yet
    pub fn generate_report(&self) -> Result<Option<Report>, HardkitError> {
        read_report(&self.audit)
    }

    fn conclude(&self, action: Action, outcome: Result<(), HardkitError>) -> ActionResult {
        let status = match &outcome {
            Ok(()) => STATUS_SUCCESS.to_string(),
            Err(err) => failure_status(err),
        };
        if let Err(err) = self.audit.record(action.label(), &status) {
            log::error!("Failed to record '{action}' in audit log: {err}");
        }

        match outcome {
            Ok(()) => Ok(ActionStatus::Completed),
            Err(source) => {
                log::error!("{action} failed: {source}");
                Err(ActionError { action, source })
            }
        }
    }
}
