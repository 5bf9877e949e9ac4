use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

use crate::{
    actions::{Action, ActionResult, ActionStatus, Toolkit},
    audit::{AuditLog, NO_LOGS, Report, read_report},
    error::HardkitError,
    policy::store::render_json,
    runtime::CommandRunner,
};

use super::args::Operation;

const MENU: &[&str] = &[
    "Setup Firewall",
    "Remove Unnecessary Services",
    "Secure SSH",
    "Backup Configuration",
    "Restore Configuration",
    "Generate Report",
];

/// Notification severity shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Success,
    Info,
    Warning,
    Error,
}

impl Notice {
    fn title(self) -> &'static str {
        match self {
            Notice::Success => "Success",
            Notice::Info => "Info",
            Notice::Warning => "Warning",
            Notice::Error => "Error",
        }
    }
}

pub fn notify(out: &mut impl Write, notice: Notice, message: &str) -> io::Result<()> {
    writeln!(out, "{}: {}", notice.title(), message)
}

/// Show the outcome of an action; returns whether it succeeded
pub fn present(out: &mut impl Write, action: Action, result: &ActionResult) -> io::Result<bool> {
    match result {
        Ok(ActionStatus::Completed) => {
            notify(out, Notice::Success, action.success_message())?;
            Ok(true)
        }
        Ok(ActionStatus::Cancelled) => {
            notify(out, Notice::Info, "Cancelled, no file selected.")?;
            Ok(true)
        }
        Err(err) => {
            notify(out, Notice::Error, &err.to_string())?;
            Ok(false)
        }
    }
}

fn present_report(out: &mut impl Write, report: Option<Report>) -> io::Result<()> {
    match report {
        Some(report) => {
            writeln!(out, "Report:")?;
            out.write_all(report.text.as_bytes())?;
            if !report.text.ends_with('\n') {
                writeln!(out)?;
            }
            writeln!(
                out,
                "{} succeeded, {} failed",
                report.succeeded(),
                report.failed()
            )
        }
        None => notify(out, Notice::Warning, "No logs available to generate report."),
    }
}

/// Run the requested operation; returns whether it succeeded
pub async fn dispatch<R: CommandRunner>(
    toolkit: &Toolkit<'_, R>,
    operation: &Operation,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<bool, HardkitError> {
    if *operation == Operation::Menu {
        run_menu(toolkit, input, out).await?;
        return Ok(true);
    }
    perform(toolkit, operation, out).await
}

/// Run one non-interactive operation and print its outcome
pub async fn perform<R: CommandRunner>(
    toolkit: &Toolkit<'_, R>,
    operation: &Operation,
    out: &mut impl Write,
) -> Result<bool, HardkitError> {
    let ok = match operation {
        Operation::Firewall => {
            let result = toolkit.apply_firewall_policy().await;
            present(out, Action::FirewallSetup, &result)?
        }
        Operation::Services => {
            let result = toolkit.disable_unnecessary_services().await;
            present(out, Action::RemoveServices, &result)?
        }
        Operation::Ssh => {
            let result = toolkit.harden_ssh().await;
            present(out, Action::SshHardening, &result)?
        }
        Operation::Backup { path } => {
            let result = toolkit.backup_configuration(path.as_deref());
            present(out, Action::BackupConfiguration, &result)?
        }
        Operation::Restore { path } => {
            let result = toolkit.restore_configuration(path.as_deref());
            present(out, Action::RestoreConfiguration, &result)?
        }
        Operation::Report { latest } => {
            let report = if *latest {
                match AuditLog::latest(&toolkit.settings().report_dir)? {
                    Some(log) => read_report(&log)?,
                    None => None,
                }
            } else {
                toolkit.generate_report()?
            };
            present_report(out, report)?;
            true
        }
        Operation::Show => match toolkit.store().load() {
            Ok(policy) => {
                out.write_all(render_json(&policy.as_value())?.as_bytes())?;
                true
            }
            Err(err) => {
                notify(out, Notice::Error, &err.to_string())?;
                false
            }
        },
        Operation::Menu => {
            notify(out, Notice::Info, "Already in the menu.")?;
            true
        }
    };
    Ok(ok)
}

/// Numbered menu standing in for the window's buttons; one action at a time
pub async fn run_menu<R: CommandRunner>(
    toolkit: &Toolkit<'_, R>,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<(), HardkitError> {
    writeln!(out, "Linux Hardening Toolkit")?;
    writeln!(out, "\nLogs:")?;
    match toolkit.generate_report()? {
        Some(report) => out.write_all(report.text.as_bytes())?,
        None => writeln!(out, "{NO_LOGS}")?,
    }

    loop {
        writeln!(out)?;
        for (i, label) in MENU.iter().enumerate() {
            writeln!(out, "  {}) {}", i + 1, label)?;
        }
        writeln!(out, "  0) Exit")?;
        write!(out, "Enter your selection [0-{}]: ", MENU.len())?;
        out.flush()?;

        let Some(line) = read_line(input)? else {
            break;
        };

        let operation = match line.parse::<usize>() {
            Ok(0) => break,
            Ok(1) => Operation::Firewall,
            Ok(2) => Operation::Services,
            Ok(3) => Operation::Ssh,
            Ok(4) => Operation::Backup {
                path: prompt_path(input, out, "Save backup to")?,
            },
            Ok(5) => Operation::Restore {
                path: prompt_path(input, out, "Restore from")?,
            },
            Ok(6) => Operation::Report { latest: false },
            _ => {
                writeln!(out, "Invalid selection.")?;
                continue;
            }
        };

        perform(toolkit, &operation, out).await?;
    }

    Ok(())
}

fn read_line(input: &mut impl BufRead) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Ask for a JSON file path; an empty answer cancels
fn prompt_path(
    input: &mut impl BufRead,
    out: &mut impl Write,
    label: &str,
) -> io::Result<Option<PathBuf>> {
    write!(out, "{label} (JSON file, empty to cancel): ")?;
    out.flush()?;
    Ok(read_line(input)?
        .filter(|line| !line.is_empty())
        .map(PathBuf::from))
}
