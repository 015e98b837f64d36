//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use std::sync::Arc;

use miette::Diagnostic;
use thiserror::Error;

use afire_config::ConfigError;
use afire_core::CoreError;
use afire_core::api::ErrorKind;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const REJECTED: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the AFIRE cloud")]
    #[diagnostic(
        code(afire::connection_failed),
        help("Check your network connection and try again.\n{reason}")
    )]
    ConnectionFailed { reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(afire::timeout),
        help("Increase timeout with --timeout or try again later.")
    )]
    Timeout,

    #[error("Unexpected response from the AFIRE cloud: {message}")]
    #[diagnostic(code(afire::protocol))]
    Protocol { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed")]
    #[diagnostic(
        code(afire::auth_failed),
        help(
            "Verify the account e-mail and password.\n\
             Run: afire config set-password\n\
             {detail}"
        )
    )]
    AuthFailed { detail: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(afire::no_credentials),
        help(
            "Configure credentials with: afire config init\n\
             Or set AFIRE_USERNAME and AFIRE_PASSWORD."
        )
    )]
    NoCredentials { profile: String },

    // ── Devices ──────────────────────────────────────────────────────
    #[error("Fireplace '{identifier}' not found")]
    #[diagnostic(
        code(afire::not_found),
        help("Run: afire devices to see available fireplaces")
    )]
    NotFound { identifier: String },

    #[error("No fireplaces are bound to this account")]
    #[diagnostic(
        code(afire::no_devices),
        help("Pair the fireplace in the AFIRE mobile app first.")
    )]
    NoDevices,

    #[error("Fireplace {device} is off; {attribute} cannot be changed")]
    #[diagnostic(
        code(afire::rejected),
        help("Turn it on first: afire power {device} on")
    )]
    Rejected { device: String, attribute: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(afire::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(afire::profile_not_found),
        help("Create one with: afire config init")
    )]
    ProfileNotFound { name: String },

    #[error(transparent)]
    #[diagnostic(code(afire::config))]
    Config(Box<figment::Error>),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    #[diagnostic(code(afire::json))]
    Json(#[from] serde_json::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::NoDevices | Self::ProfileNotFound { .. } => {
                exit_code::NOT_FOUND
            }
            Self::Rejected { .. } => exit_code::REJECTED,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl CliError {
    /// Map a failure still referenced by other refresh subscribers.
    fn from_shared(err: &CoreError) -> Self {
        let detail = err.to_string();
        match err.api_kind() {
            Some(ErrorKind::Authentication) => Self::AuthFailed { detail },
            Some(ErrorKind::Protocol) => Self::Protocol { message: detail },
            _ if err.api_error().is_some_and(afire_core::api::Error::is_timeout) => Self::Timeout,
            _ => Self::ConnectionFailed { reason: detail },
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Authentication { source } => Self::AuthFailed {
                detail: source.to_string(),
            },

            CoreError::Transport { source } if source.is_timeout() => Self::Timeout,

            CoreError::Transport { source } => Self::ConnectionFailed {
                reason: source.to_string(),
            },

            CoreError::Protocol { source } => Self::Protocol {
                message: source.to_string(),
            },

            CoreError::CommandRejected {
                device_id,
                attribute,
            } => Self::Rejected {
                device: device_id,
                attribute,
            },

            CoreError::InvalidValue { attribute, message } => Self::Validation {
                field: attribute,
                reason: message,
            },

            CoreError::DeviceNotFound { identifier } => Self::NotFound { identifier },

            CoreError::NoDevices => Self::NoDevices,

            CoreError::RefreshFailed { source } => match Arc::try_unwrap(source) {
                Ok(inner) => inner.into(),
                Err(shared) => Self::from_shared(&shared),
            },

            CoreError::ControllerDisconnected => Self::ConnectionFailed {
                reason: "controller is not connected".into(),
            },

            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::UnknownProfile { name } => Self::ProfileNotFound { name },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::Figment(inner) => Self::Config(inner),
            ConfigError::Io(inner) => Self::Io(inner),
            ConfigError::Keyring(inner) => Self::Validation {
                field: "keyring".into(),
                reason: inner.to_string(),
            },
            ConfigError::Serialization(inner) => Self::Validation {
                field: "config".into(),
                reason: inner.to_string(),
            },
        }
    }
}
