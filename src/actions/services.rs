use crate::{
    error::HardkitError,
    policy::PolicyStore,
    runtime::{CommandRunner, Invocation},
};

const SYSTEMCTL: &str = "systemctl";

/// Stop and disable every listed service.
///
/// Failures of individual `systemctl` calls are logged and skipped; only a
/// policy that cannot be read fails the whole run. Returns the number of
/// ignored command failures.
pub async fn disable(store: &PolicyStore, runner: &dyn CommandRunner) -> Result<usize, HardkitError> {
    let services = store.load()?.unnecessary_services()?;
    let mut ignored = 0;

    for service in &services {
        for verb in ["stop", "disable"] {
            let step = Invocation::new(SYSTEMCTL, [verb, service.as_str()]);
            if let Err(err) = runner.run(&step).await {
                log::warn!("Ignoring failure of `{step}`: {err}");
                ignored += 1;
            }
        }
    }

    log::info!(
        "Processed {} services ({} command failures ignored)",
        services.len(),
        ignored
    );
    Ok(ignored)
}
