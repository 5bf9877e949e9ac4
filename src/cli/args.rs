use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::settings::Privilege;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Apply a fixed set of Linux hardening policies and keep an audit log"
)]
pub struct Args {
    /// Path to configuration file (TOML)
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Policy document (JSON); created with built-in rules if missing
    #[arg(long = "policy", value_name = "PATH", global = true)]
    pub policy: Option<PathBuf>,

    /// Directory receiving the per-run audit logs
    #[arg(long = "reports", value_name = "DIR", global = true)]
    pub reports: Option<PathBuf>,

    /// sshd configuration file to rewrite
    #[arg(long = "sshd-config", value_name = "PATH", global = true)]
    pub sshd_config: Option<PathBuf>,

    /// systemd unit restarted after SSH hardening
    #[arg(long = "ssh-service", value_name = "NAME", global = true)]
    pub ssh_service: Option<String>,

    /// How commands are elevated: sudo, none or auto
    #[arg(long = "privilege", value_name = "MODE", global = true)]
    pub privilege: Option<Privilege>,

    #[command(subcommand)]
    pub operation: Operation,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Reset the firewall, set default policies and apply the firewall rules
    Firewall,
    /// Stop and disable the unnecessary services
    Services,
    /// Rewrite sshd directives and restart the SSH service
    Ssh,
    /// Copy the policy document to PATH (nothing happens without PATH)
    Backup { path: Option<PathBuf> },
    /// Replace the policy document with the backup at PATH (nothing happens without PATH)
    Restore { path: Option<PathBuf> },
    /// Show this run's audit log
    Report {
        /// Show the most recent log in the reports directory instead
        #[arg(long)]
        latest: bool,
    },
    /// Print the current policy document
    Show,
    /// Interactive menu running one action at a time
    Menu,
}
