use std::{fs, path::Path};

use crate::{
    error::HardkitError,
    policy::{PolicyStore, SshDirective},
    runtime::{CommandRunner, Invocation},
};

/// Replace every directive line named in `directives` with `<name> <value>`.
///
/// A line matches when its first token (up to whitespace or `=`) equals a
/// directive name, ignoring ASCII case. Indented lines (inside `Match`
/// blocks) and comments are left alone. If two directives match the same
/// line the later one wins. Returns the new text and the number of lines
/// replaced; untouched lines are copied byte for byte.
pub fn rewrite_sshd_config(content: &str, directives: &[SshDirective]) -> (String, usize) {
    let mut output = String::with_capacity(content.len());
    let mut replaced = 0;

    for line in content.split_inclusive('\n') {
        let (body, ending) = split_line_ending(line);
        let matched = directive_name(body).and_then(|name| {
            directives
                .iter()
                .rev()
                .find(|directive| directive.name.eq_ignore_ascii_case(name))
        });

        match matched {
            Some(directive) => {
                output.push_str(&directive.name);
                output.push(' ');
                output.push_str(&directive.value);
                output.push_str(ending);
                replaced += 1;
            }
            None => output.push_str(line),
        }
    }

    (output, replaced)
}

fn directive_name(line: &str) -> Option<&str> {
    if line.starts_with(char::is_whitespace) {
        return None;
    }
    line.split(|c: char| c.is_whitespace() || c == '=')
        .next()
        .filter(|token| !token.is_empty())
}

fn split_line_ending(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

/// Rewrite the sshd configuration in place, then restart the SSH service
pub async fn harden(
    store: &PolicyStore,
    runner: &dyn CommandRunner,
    sshd_config: &Path,
    service: &str,
) -> Result<(), HardkitError> {
    let directives = store.load()?.ssh_hardening()?;

    let content =
        fs::read_to_string(sshd_config).map_err(|source| HardkitError::file(sshd_config, source))?;
    let (rewritten, replaced) = rewrite_sshd_config(&content, &directives);
    fs::write(sshd_config, rewritten).map_err(|source| HardkitError::file(sshd_config, source))?;
    log::info!(
        "Rewrote {replaced} directive line(s) in {}",
        sshd_config.display()
    );

    runner
        .run(&Invocation::new("systemctl", ["restart", service]))
        .await
}
