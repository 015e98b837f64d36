//! Shared configuration for the AFIRE command-line tools.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `afire_core::ControllerConfig`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use afire_core::{ControllerConfig, Credentials, StalePolicy};

/// Keyring service name under which passwords are stored.
pub const KEYRING_SERVICE: &str = "afire";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named account profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use: explicit choice, then the configured
    /// default, then `"default"`.
    pub fn active_profile_name(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Polling period in seconds for `watch`.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            refresh_interval: default_refresh_interval(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    15
}
fn default_refresh_interval() -> u64 {
    30
}

/// Username/password pair entered during reconfiguration. Wins over the
/// profile's stored pair.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CredentialOverride {
    pub username: String,
    pub password: String,
}

/// A named cloud account.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Account e-mail.
    pub username: Option<String>,

    /// Password (plaintext; prefer keyring or `AFIRE_PASSWORD`).
    pub password: Option<String>,

    #[serde(rename = "override", skip_serializing_if = "Option::is_none")]
    pub credential_override: Option<CredentialOverride>,

    /// Cloud base URL; the production endpoint when unset.
    pub base_url: Option<String>,

    /// Application identifier header value.
    pub app_id: Option<String>,

    /// Language code sent with the login.
    pub language: Option<String>,

    /// Path to an extra CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,

    /// Override refresh interval (seconds, 0 disables polling).
    pub refresh_interval: Option<u64>,

    /// `"keep"` (show last known state) or `"unavailable"`.
    pub stale_policy: Option<String>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "afire", "afire").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("afire");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from an explicit file, layered over defaults and under
/// `AFIRE_`-prefixed environment variables.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("AFIRE_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file is missing or broken.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/password"),
    )?)
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password)?;
    Ok(())
}

/// Resolve account credentials for a profile.
///
/// An override pair wins outright. Otherwise the username comes from the
/// profile, then `AFIRE_USERNAME`; the password from `AFIRE_PASSWORD`,
/// then the keyring, then plaintext in the profile.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<Credentials, ConfigError> {
    let mut credentials = resolve_pair(profile, profile_name)?;
    if let Some(ref language) = profile.language {
        credentials.language.clone_from(language);
    }
    Ok(credentials)
}

fn resolve_pair(profile: &Profile, profile_name: &str) -> Result<Credentials, ConfigError> {
    if let Some(ref pair) = profile.credential_override {
        return Ok(Credentials::new(
            pair.username.clone(),
            SecretString::from(pair.password.clone()),
        ));
    }

    let username = profile
        .username
        .clone()
        .or_else(|| std::env::var("AFIRE_USERNAME").ok())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;

    // 1. Env var
    if let Ok(pw) = std::env::var("AFIRE_PASSWORD") {
        return Ok(Credentials::new(username, SecretString::from(pw)));
    }

    // 2. Keyring
    if let Ok(pw) = keyring_entry(profile_name).and_then(|e| Ok(e.get_password()?)) {
        return Ok(Credentials::new(username, SecretString::from(pw)));
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(Credentials::new(username, SecretString::from(pw.clone())));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

pub fn parse_stale_policy(value: &str) -> Result<StalePolicy, ConfigError> {
    match value {
        "keep" => Ok(StalePolicy::KeepLastKnown),
        "unavailable" => Ok(StalePolicy::MarkUnavailable),
        other => Err(ConfigError::Validation {
            field: "stale_policy".into(),
            reason: format!("expected 'keep' or 'unavailable', got '{other}'"),
        }),
    }
}

/// Build a `ControllerConfig` from a profile and the global defaults.
pub fn profile_to_controller_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ControllerConfig, ConfigError> {
    let credentials = resolve_credentials(profile, profile_name)?;
    let mut config = ControllerConfig::new(credentials);

    if let Some(ref raw) = profile.base_url {
        let url: url::Url = raw.parse().map_err(|_| ConfigError::Validation {
            field: "base_url".into(),
            reason: format!("invalid URL: {raw}"),
        })?;
        config.base_url = Some(url);
    }
    if let Some(ref app_id) = profile.app_id {
        config.app_id.clone_from(app_id);
    }
    config.ca_cert.clone_from(&profile.ca_cert);
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.refresh_interval = Duration::from_secs(
        profile
            .refresh_interval
            .unwrap_or(defaults.refresh_interval),
    );
    if let Some(ref policy) = profile.stale_policy {
        config.stale_policy = parse_stale_policy(policy)?;
    }

    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    fn overridden() -> Profile {
        Profile {
            username: Some("stored@example.com".into()),
            password: Some("stored".into()),
            credential_override: Some(CredentialOverride {
                username: "new@example.com".into(),
                password: "fresh".into(),
            }),
            ..Profile::default()
        }
    }

    #[test]
    fn override_pair_wins_over_stored_credentials() {
        let creds = resolve_credentials(&overridden(), "home").unwrap();
        assert_eq!(creds.username, "new@example.com");
        assert_eq!(creds.password.expose_secret(), "fresh");
        assert_eq!(creds.language, "en");
    }

    #[test]
    fn profile_language_is_applied() {
        let profile = Profile {
            language: Some("de".into()),
            ..overridden()
        };
        assert_eq!(resolve_credentials(&profile, "home").unwrap().language, "de");
    }

    #[test]
    fn profile_fields_flow_into_controller_config() {
        let profile = Profile {
            base_url: Some("https://eu.example.com/app".into()),
            timeout: Some(5),
            refresh_interval: Some(0),
            stale_policy: Some("unavailable".into()),
            ..overridden()
        };
        let config = profile_to_controller_config(&profile, "home", &Defaults::default()).unwrap();

        assert_eq!(
            config.base_url.map(String::from).as_deref(),
            Some("https://eu.example.com/app")
        );
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.refresh_interval.is_zero());
        assert_eq!(config.stale_policy, StalePolicy::MarkUnavailable);
    }

    #[test]
    fn defaults_fill_unset_profile_fields() {
        let config =
            profile_to_controller_config(&overridden(), "home", &Defaults::default()).unwrap();
        assert!(config.base_url.is_none());
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.refresh_interval, Duration::from_secs(30));
        assert_eq!(config.stale_policy, StalePolicy::KeepLastKnown);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let profile = Profile {
            base_url: Some("not a url".into()),
            ..overridden()
        };
        let err = profile_to_controller_config(&profile, "home", &Defaults::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "base_url"));

        assert!(parse_stale_policy("forever").is_err());
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert("home".into(), overridden());
        save_config_to(&cfg, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("[profiles.home.override]"));

        let loaded = load_config_from(&path).unwrap();
        let profile = loaded.profile("home").unwrap();
        assert_eq!(profile.username.as_deref(), Some("stored@example.com"));
        assert_eq!(
            profile.credential_override.as_ref().map(|o| o.username.as_str()),
            Some("new@example.com")
        );
        assert!(matches!(
            loaded.profile("missing"),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn active_profile_prefers_explicit_choice() {
        let cfg = Config::default();
        assert_eq!(cfg.active_profile_name(Some("cabin")), "cabin");
        assert_eq!(cfg.active_profile_name(None), "default");
    }
}
