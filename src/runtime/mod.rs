pub mod command;

pub use command::{CommandRunner, Invocation, SystemCommandRunner};

#[cfg(test)]
pub use command::MockCommandRunner;
