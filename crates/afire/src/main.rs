mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use afire_config::Profile;
use afire_core::ControllerConfig;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need the cloud
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "afire", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let config = build_controller_config(&cli.global)?;
            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, config, &cli.global).await
        }
    }
}

/// Build a `ControllerConfig` from the config file, profile, and CLI overrides.
///
/// Without a config file the built-in empty profile is used, so
/// `AFIRE_USERNAME` / `AFIRE_PASSWORD` alone are enough to run.
fn build_controller_config(global: &GlobalOpts) -> Result<ControllerConfig, CliError> {
    let cfg = afire_config::load_config_or_default();
    let profile_name = cfg.active_profile_name(global.profile.as_deref());

    let fallback = Profile::default();
    let profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile,
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound { name: profile_name });
        }
        None => &fallback,
    };

    let mut config = afire_config::profile_to_controller_config(profile, &profile_name, &cfg.defaults)?;

    if let Some(ref raw) = global.base_url {
        let url = raw.parse().map_err(|_| CliError::Validation {
            field: "base-url".into(),
            reason: format!("invalid URL: {raw}"),
        })?;
        config.base_url = Some(url);
    }
    if let Some(secs) = global.timeout {
        config.timeout = std::time::Duration::from_secs(secs);
    }

    Ok(config)
}
