use std::{fmt, process::Stdio};

use async_trait::async_trait;
use tokio::process::Command;

#[cfg(test)]
use mockall::automock;

use crate::{error::HardkitError, settings::Privilege};

/// A single external command, without any privilege wrapper
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether this invocation is exactly `program args...`
    pub fn is(&self, program: &str, args: &[&str]) -> bool {
        self.program == program && self.args.iter().map(String::as_str).eq(args.iter().copied())
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Command execution abstraction for testing
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the command to completion; non-zero exit is an error
    async fn run(&self, invocation: &Invocation) -> Result<(), HardkitError>;
}

/// Runs commands on the host, elevating them through `sudo` when configured
pub struct SystemCommandRunner {
    privilege: Privilege,
}

impl SystemCommandRunner {
    pub fn new(privilege: Privilege) -> Self {
        Self { privilege }
    }

    fn build(&self, invocation: &Invocation) -> (Command, String) {
        if self.privilege.uses_sudo() {
            let mut command = Command::new("sudo");
            command.arg(&invocation.program).args(&invocation.args);
            (command, format!("sudo {invocation}"))
        } else {
            let mut command = Command::new(&invocation.program);
            command.args(&invocation.args);
            (command, invocation.to_string())
        }
    }
}

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, invocation: &Invocation) -> Result<(), HardkitError> {
        let (mut command, line) = self.build(invocation);
        log::info!("Running {line}");

        let output = command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| HardkitError::CommandSpawn {
                command: line.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            log::debug!("{line}: {}", stdout.trim());
        }

        if output.status.success() {
            Ok(())
        } else {
            Err(HardkitError::CommandFailed {
                command: line,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn displays_command_line() {
        let invocation = Invocation::new("ufw", ["default", "deny", "incoming"]);
        assert_eq!(invocation.to_string(), "ufw default deny incoming");
        assert!(invocation.is("ufw", &["default", "deny", "incoming"]));
        assert!(!invocation.is("ufw", &["default", "deny"]));
    }

    #[tokio::test]
    async fn successful_command_is_ok() {
        let runner = SystemCommandRunner::new(Privilege::None);
        runner
            .run(&Invocation::new("true", Vec::<String>::new()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn non_zero_exit_is_command_error() {
        let runner = SystemCommandRunner::new(Privilege::None);
        let err = runner
            .run(&Invocation::new("sh", ["-c", "echo boom >&2; exit 3"]))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Command);
        match err {
            HardkitError::CommandFailed {
                command,
                status,
                stderr,
            } => {
                assert_eq!(command, "sh -c echo boom >&2; exit 3");
                assert_eq!(status.code(), Some(3));
                assert_eq!(stderr.trim(), "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn child_sees_empty_stdin() {
        let runner = SystemCommandRunner::new(Privilege::None);
        runner
            .run(&Invocation::new("sh", ["-c", "test -z \"$(cat)\""]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn missing_program_is_command_error() {
        let runner = SystemCommandRunner::new(Privilege::None);
        let err = runner
            .run(&Invocation::new("hardkit-no-such-program", ["--help"]))
            .await
            .unwrap_err();
        assert!(matches!(err, HardkitError::CommandSpawn { .. }));
        assert_eq!(err.kind(), ErrorKind::Command);
    }

    #[test]
    fn sudo_wraps_command_line() {
        let runner = SystemCommandRunner::new(Privilege::Sudo);
        let (command, line) = runner.build(&Invocation::new("systemctl", ["restart", "ssh"]));
        assert_eq!(line, "sudo systemctl restart ssh");
        assert_eq!(command.as_std().get_program(), "sudo");
    }
}
