use crate::{
    error::HardkitError,
    policy::{FirewallRule, PolicyStore},
    runtime::{CommandRunner, Invocation},
};

const UFW: &str = "ufw";

/// Every ufw command needed to apply `rules`, in execution order.
///
/// `--force` keeps reset and enable from waiting on an interactive prompt.
pub fn firewall_steps(rules: &[FirewallRule]) -> Vec<Invocation> {
    let mut steps = vec![
        Invocation::new(UFW, ["--force", "reset"]),
        Invocation::new(UFW, ["default", "deny", "incoming"]),
        Invocation::new(UFW, ["default", "allow", "outgoing"]),
    ];
    steps.extend(
        rules
            .iter()
            .map(|rule| Invocation::new(UFW, [rule.action.as_str(), rule.port.as_str()])),
    );
    steps.push(Invocation::new(UFW, ["--force", "enable"]));
    steps
}

/// Reset the firewall and apply the policy's rules; stops at the first failing step
pub async fn apply(store: &PolicyStore, runner: &dyn CommandRunner) -> Result<(), HardkitError> {
    let rules = store.load()?.firewall_rules()?;
    let steps = firewall_steps(&rules);
    log::info!("Applying firewall policy ({} rules)", rules.len());

    for step in &steps {
        runner.run(step).await?;
    }
    Ok(())
}
