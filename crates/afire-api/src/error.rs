use thiserror::Error;

/// Top-level error type for the `afire-api` crate.
///
/// Every failure falls into one of three categories (see [`ErrorKind`]):
/// authentication, transport, or protocol. `afire-core` maps these into
/// user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The login endpoint answered with a non-success status.
    #[error("Authentication failed (HTTP {status}): {body}")]
    Authentication { status: u16, body: String },

    // ── Transport ───────────────────────────────────────────────────
    /// A non-login endpoint answered with a non-success status.
    #[error("HTTP {status} from {endpoint}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// Connection refused, DNS failure, timeout, or a broken body stream.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or HTTP client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Protocol ────────────────────────────────────────────────────
    /// The response could not be parsed into the expected shape.
    /// Carries the raw body for debugging.
    #[error("Unexpected response from {endpoint}: {message}")]
    Protocol {
        endpoint: String,
        message: String,
        body: String,
    },
}

/// Coarse error category, stable across variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Authentication,
    Transport,
    Protocol,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::Status { .. } | Self::Transport(_) | Self::InvalidUrl(_) | Self::Tls(_) => {
                ErrorKind::Transport
            }
            Self::Protocol { .. } => ErrorKind::Protocol,
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { status, .. } | Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` if the cloud rejected the session token.
    ///
    /// The caller's session is invalidated when this happens so the next
    /// request logs in again.
    pub fn is_token_rejected(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }

    /// Returns `true` if this is a transient error worth retrying later.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Returns `true` if the underlying request hit the fixed timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_the_taxonomy() {
        let auth = Error::Authentication {
            status: 400,
            body: "bad password".into(),
        };
        assert_eq!(auth.kind(), ErrorKind::Authentication);
        assert_eq!(auth.status(), Some(400));

        let status = Error::Status {
            endpoint: "bindings".into(),
            status: 502,
            body: String::new(),
        };
        assert_eq!(status.kind(), ErrorKind::Transport);
        assert!(status.is_transient());
        assert!(!status.is_token_rejected());

        let protocol = Error::Protocol {
            endpoint: "login".into(),
            message: "missing token".into(),
            body: "{}".into(),
        };
        assert_eq!(protocol.kind(), ErrorKind::Protocol);
        assert_eq!(protocol.status(), None);
    }

    #[test]
    fn unauthorized_status_marks_token_rejected() {
        let err = Error::Status {
            endpoint: "devdata".into(),
            status: 401,
            body: "token expired".into(),
        };
        assert!(err.is_token_rejected());
        assert!(!err.is_transient());
    }
}
