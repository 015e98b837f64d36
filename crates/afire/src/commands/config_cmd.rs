//! Config subcommand handlers.

use dialoguer::{Input, Password, Select};
use serde_json::Value;

use afire_config::{self as config, Config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "********";

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Replace every `password` value in a serialized config.
fn redact(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, inner) in map.iter_mut() {
                if key == "password" && !inner.is_null() {
                    *inner = Value::String(REDACTED.into());
                } else {
                    redact(inner);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact),
        _ => {}
    }
}

fn summary(cfg: &Config) -> String {
    let mut lines = vec![
        format!("Config path:     {}", config::config_path().display()),
        format!(
            "Default profile: {}",
            cfg.default_profile.as_deref().unwrap_or("-")
        ),
        format!("Output:          {}", cfg.defaults.output),
        format!("Timeout:         {}s", cfg.defaults.timeout),
        format!("Refresh:         {}s", cfg.defaults.refresh_interval),
    ];
    let mut profiles: Vec<_> = cfg.profiles.iter().collect();
    profiles.sort_by_key(|(name, _)| *name);
    for (name, profile) in profiles {
        let user = profile
            .credential_override
            .as_ref()
            .map(|o| o.username.as_str())
            .or(profile.username.as_deref())
            .unwrap_or("-");
        lines.push(format!("Profile {name}: {user}"));
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(),
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let mut value = serde_json::to_value(&cfg)?;
            redact(&mut value);
            let out = output::render_single(
                global.output,
                &value,
                |_| summary(&cfg),
                |_| config::config_path().display().to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
        ConfigCommand::SetPassword => {
            let cfg = config::load_config_or_default();
            let profile_name = cfg.active_profile_name(global.profile.as_deref());
            let password = Password::new()
                .with_prompt(format!("Password for profile '{profile_name}'"))
                .with_confirmation("Confirm password", "Passwords do not match")
                .interact()
                .map_err(prompt_err)?;
            config::store_password(&profile_name, &password)?;
            eprintln!("✓ Password stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}

// ── Init: interactive wizard ────────────────────────────────────────

fn init() -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("AFIRE CLI configuration");
    eprintln!("   Config path: {}\n", config_path.display());

    let mut cfg = config::load_config_or_default();

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let username: String = Input::new()
        .with_prompt("AFIRE account e-mail")
        .interact_text()
        .map_err(prompt_err)?;

    let password = Password::new()
        .with_prompt("Password")
        .interact()
        .map_err(prompt_err)?;

    if username.trim().is_empty() || password.is_empty() {
        return Err(CliError::Validation {
            field: "credentials".into(),
            reason: "e-mail and password cannot be empty".into(),
        });
    }

    let store_choices = &[
        "Store password in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let store_selection = Select::new()
        .with_prompt("Where to store the password?")
        .items(store_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let password_field = if store_selection == 0 {
        config::store_password(&profile_name, &password)?;
        eprintln!("   ✓ Password stored in system keyring");
        None
    } else {
        Some(password)
    };

    cfg.profiles.insert(
        profile_name.clone(),
        Profile {
            username: Some(username.trim().to_owned()),
            password: password_field,
            ..Profile::default()
        },
    );
    cfg.default_profile = Some(profile_name.clone());

    let path = config::save_config(&cfg)?;

    eprintln!("\n✓ Configuration written to {}", path.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Test it: afire login");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn redact_hides_nested_passwords() {
        let mut value = json!({
            "profiles": {
                "home": {
                    "username": "me@example.com",
                    "password": "secret",
                    "override": { "username": "new@example.com", "password": "newer" },
                },
                "cabin": { "password": null },
            }
        });
        redact(&mut value);
        assert_eq!(value["profiles"]["home"]["password"], REDACTED);
        assert_eq!(value["profiles"]["home"]["override"]["password"], REDACTED);
        assert_eq!(value["profiles"]["home"]["username"], "me@example.com");
        assert!(value["profiles"]["cabin"]["password"].is_null());
    }
}
