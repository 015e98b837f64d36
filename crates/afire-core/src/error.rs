// ── Core error types ──
//
// Errors surfaced by afire-core. Cloud failures keep the original
// `afire_api::Error` as their source so status codes, bodies, and parse
// details survive for diagnostics. `CommandRejected` is a local policy
// decision and never wraps a cloud error.

use std::sync::Arc;

use thiserror::Error;

use afire_api::ErrorKind;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Cloud errors ─────────────────────────────────────────────────
    #[error("Authentication failed: {source}")]
    Authentication {
        #[source]
        source: afire_api::Error,
    },

    #[error("Cloud request failed: {source}")]
    Transport {
        #[source]
        source: afire_api::Error,
    },

    #[error("Unexpected cloud response: {source}")]
    Protocol {
        #[source]
        source: afire_api::Error,
    },

    // ── Policy errors ────────────────────────────────────────────────
    #[error("Command rejected: fireplace {device_id} is off, cannot change {attribute}")]
    CommandRejected { device_id: String, attribute: String },

    #[error("Invalid value for {attribute}: {message}")]
    InvalidValue { attribute: String, message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Device not found: {identifier}")]
    DeviceNotFound { identifier: String },

    #[error("No fireplaces are bound to this account")]
    NoDevices,

    #[error("Refresh failed: {source}")]
    RefreshFailed {
        #[source]
        source: Arc<CoreError>,
    },

    // ── Lifecycle errors ─────────────────────────────────────────────
    #[error("Controller disconnected")]
    ControllerDisconnected,

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// The cloud error category behind this error, looking through
    /// refresh failures.
    pub fn api_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Authentication { .. } => Some(ErrorKind::Authentication),
            Self::Transport { .. } => Some(ErrorKind::Transport),
            Self::Protocol { .. } => Some(ErrorKind::Protocol),
            Self::RefreshFailed { source } => source.api_kind(),
            _ => None,
        }
    }

    /// The underlying cloud error, if any.
    pub fn api_error(&self) -> Option<&afire_api::Error> {
        match self {
            Self::Authentication { source }
            | Self::Transport { source }
            | Self::Protocol { source } => Some(source),
            Self::RefreshFailed { source } => source.api_error(),
            _ => None,
        }
    }

    pub fn is_command_rejected(&self) -> bool {
        matches!(self, Self::CommandRejected { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<afire_api::Error> for CoreError {
    fn from(err: afire_api::Error) -> Self {
        match err.kind() {
            ErrorKind::Authentication => Self::Authentication { source: err },
            ErrorKind::Transport => Self::Transport { source: err },
            ErrorKind::Protocol => Self::Protocol { source: err },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_keep_their_category_and_cause() {
        let err = CoreError::from(afire_api::Error::Status {
            endpoint: "bindings".into(),
            status: 500,
            body: "boom".into(),
        });
        assert_eq!(err.api_kind(), Some(ErrorKind::Transport));
        assert_eq!(err.api_error().and_then(afire_api::Error::status), Some(500));

        let wrapped = CoreError::RefreshFailed {
            source: Arc::new(err),
        };
        assert_eq!(wrapped.api_kind(), Some(ErrorKind::Transport));
        assert!(wrapped.to_string().contains("boom"));
    }

    #[test]
    fn rejection_is_distinct_from_cloud_failures() {
        let err = CoreError::CommandRejected {
            device_id: "dev1".into(),
            attribute: "FLAME".into(),
        };
        assert!(err.is_command_rejected());
        assert_eq!(err.api_kind(), None);
    }
}
