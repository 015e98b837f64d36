// Transport configuration for building the reqwest::Client used by
// `CloudClient`. Timeout, user agent, and TLS roots live here so the
// request layer only deals with URLs and payloads.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::Error;

/// Fixed bound on every cloud round trip.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// TLS trust roots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsMode {
    /// Use the bundled web PKI roots.
    #[default]
    System,
    /// Additionally trust a CA certificate from the given PEM file
    /// (intercepting proxies, regional mirrors).
    CustomCa(PathBuf),
}

/// Transport configuration for the HTTP client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("afire/", env!("CARGO_PKG_VERSION")));

        if let TlsMode::CustomCa(path) = &self.tls {
            let cert_pem = std::fs::read(path)
                .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
            let cert = reqwest::Certificate::from_pem(&cert_pem)
                .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
            builder = builder.add_root_certificate(cert);
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeout_is_fifteen_seconds() {
        assert_eq!(TransportConfig::default().timeout, Duration::from_secs(15));
    }

    #[test]
    fn missing_ca_file_is_a_tls_error() {
        let config = TransportConfig {
            tls: TlsMode::CustomCa(PathBuf::from("/nonexistent/ca.pem")),
            timeout: DEFAULT_TIMEOUT,
        };
        assert!(matches!(config.build_client(), Err(Error::Tls(_))));
    }
}
