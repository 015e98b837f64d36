//! Command handlers, one module per command group.

pub mod config_cmd;
pub mod control;
pub mod devices;
pub mod watch;

use afire_core::{ControllerConfig, CoreError, Snapshot};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route a cloud-backed command to its handler.
pub async fn dispatch(
    cmd: Command,
    config: ControllerConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Devices => devices::list(config, global).await,
        Command::Device(arg) => devices::show(&arg.device, config, global).await,
        Command::Login => devices::login(config, global).await,
        Command::Watch(args) => watch::handle(args, config, global).await,
        Command::Power(_)
        | Command::Rgb(_)
        | Command::Amber(_)
        | Command::Flame(_)
        | Command::Speed(_)
        | Command::Color(_)
        | Command::Effect(_)
        | Command::LightOff(_) => control::handle(cmd, config, global).await,
        // Handled in main before a config is built.
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}

/// Resolve a device argument: exact ID first, then a unique
/// case-insensitive display name.
pub fn resolve_device(snapshot: &Snapshot, identifier: &str) -> Result<String, CoreError> {
    if snapshot.contains(identifier) {
        return Ok(identifier.to_owned());
    }

    let matches: Vec<_> = snapshot
        .views()
        .filter(|v| v.display_name().eq_ignore_ascii_case(identifier))
        .map(|v| v.id().to_owned())
        .collect();

    match matches.as_slice() {
        [id] => Ok(id.clone()),
        [] => Err(CoreError::DeviceNotFound {
            identifier: identifier.into(),
        }),
        _ => Err(CoreError::InvalidValue {
            attribute: "device".into(),
            message: format!("'{identifier}' matches {} fireplaces; use the ID", matches.len()),
        }),
    }
}
