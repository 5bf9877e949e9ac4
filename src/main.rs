use std::{io, process::ExitCode};

use chrono::Local;
use clap::Parser;
use hardkit::{
    actions::Toolkit,
    cli::{Args, SettingsLoader, shell},
    error::HardkitError,
    runtime::SystemCommandRunner,
};

#[tokio::main]
async fn main() -> Result<ExitCode, HardkitError> {
    env_logger::init();

    let args = Args::parse();

    let settings = SettingsLoader::load(&args, Local::now())?;
    let toolkit = Toolkit::new(&settings, SystemCommandRunner::new(settings.privilege));
    toolkit.ensure_defaults()?;

    let mut input = io::stdin().lock();
    let mut out = io::stdout().lock();
    let ok = shell::dispatch(&toolkit, &args.operation, &mut input, &mut out).await?;

    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
