//! Power, flame, and lighting commands.

use serde::Serialize;

use afire_core::{Command as CoreCommand, CommandResult, Controller, ControllerConfig, Effect, Rgb};

use crate::cli::{Command, EffectArg, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::resolve_device;

#[derive(Debug, Serialize)]
struct Write {
    attribute: String,
    value: i64,
}

#[derive(Debug, Serialize)]
struct Sent {
    device: String,
    writes: Vec<Write>,
}

impl From<CommandResult> for Sent {
    fn from(result: CommandResult) -> Self {
        Self {
            device: result.device_id,
            writes: result
                .sent
                .into_iter()
                .map(|w| Write {
                    attribute: w.attribute,
                    value: w.value,
                })
                .collect(),
        }
    }
}

fn effect(arg: EffectArg) -> Effect {
    match arg {
        EffectArg::Smooth => Effect::Smooth,
        EffectArg::Fade1 => Effect::Fade1,
        EffectArg::Fade2 => Effect::Fade2,
    }
}

/// Split a CLI command into its target device and core command.
fn translate(cmd: Command) -> Option<(String, CoreCommand)> {
    let pair = match cmd {
        Command::Power(a) => (a.device, CoreCommand::Power(a.state.is_on())),
        Command::Rgb(a) => (a.device, CoreCommand::RgbLeds(a.state.is_on())),
        Command::Amber(a) => (a.device, CoreCommand::AmberLeds(a.state.is_on())),
        Command::Flame(a) => (a.device, CoreCommand::FlameHeight(a.level)),
        Command::Speed(a) => (a.device, CoreCommand::FlameSpeed(a.level)),
        Command::Color(a) => (a.device, CoreCommand::Color(Rgb(a.red, a.green, a.blue))),
        Command::Effect(a) => (a.device, CoreCommand::Effect(effect(a.effect))),
        Command::LightOff(a) => (a.device, CoreCommand::LightOff),
        _ => return None,
    };
    Some(pair)
}

pub async fn handle(
    cmd: Command,
    config: ControllerConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let Some((identifier, core_cmd)) = translate(cmd) else {
        return Ok(());
    };

    let result = Controller::oneshot(config, |c| async move {
        let id = resolve_device(&c.snapshot(), &identifier)?;
        c.execute(&id, core_cmd).await
    })
    .await?;

    let sent = Sent::from(result);
    let out = output::render_single(
        global.output,
        &sent,
        |s| {
            let writes: Vec<_> = s
                .writes
                .iter()
                .map(|w| format!("{}={}", w.attribute, w.value))
                .collect();
            format!("✓ Sent {} to {}", writes.join(", "), s.device)
        },
        |s| s.device.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{ColorArgs, OnOff, SwitchArgs};

    #[test]
    fn cli_commands_map_to_core_commands() {
        let (device, cmd) = translate(Command::Amber(SwitchArgs {
            device: "dev1".into(),
            state: OnOff::Off,
        }))
        .unwrap_or_else(|| panic!("amber is a control command"));
        assert_eq!(device, "dev1");
        assert_eq!(cmd, CoreCommand::AmberLeds(false));

        let (_, cmd) = translate(Command::Color(ColorArgs {
            device: "dev1".into(),
            red: 1,
            green: 2,
            blue: 3,
        }))
        .unwrap_or_else(|| panic!("color is a control command"));
        assert_eq!(cmd, CoreCommand::Color(Rgb(1, 2, 3)));

        assert!(translate(Command::Devices).is_none());
    }
}
