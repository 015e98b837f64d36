// ── Runtime connection configuration ──
//
// These types describe *how* to reach the vendor cloud and how often to
// poll it. They carry credential data and tuning, but never touch disk.
// The CLI constructs a `ControllerConfig` and hands it in.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use afire_api::transport::{DEFAULT_TIMEOUT, TlsMode};
use afire_api::{CloudClient, Credentials, DEFAULT_APP_ID, DEFAULT_BASE_URL, TransportConfig};

use crate::error::CoreError;

/// Default polling period for the background refresh timer.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// How devices are reported after a refresh cycle fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StalePolicy {
    /// Keep showing the last good snapshot as available.
    #[default]
    KeepLastKnown,
    /// Report every device unavailable until a refresh succeeds again.
    MarkUnavailable,
}

/// Configuration for one cloud account.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub credentials: Credentials,
    /// Application identifier header value.
    pub app_id: String,
    /// Cloud base URL. `None` uses the production endpoint.
    pub base_url: Option<Url>,
    /// Extra CA certificate to trust.
    pub ca_cert: Option<PathBuf>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Background refresh period. Zero disables the timer.
    pub refresh_interval: Duration,
    pub stale_policy: StalePolicy,
}

impl ControllerConfig {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            app_id: DEFAULT_APP_ID.into(),
            base_url: None,
            ca_cert: None,
            timeout: DEFAULT_TIMEOUT,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            stale_policy: StalePolicy::default(),
        }
    }

    pub fn resolved_base_url(&self) -> Result<Url, CoreError> {
        match &self.base_url {
            Some(url) => Ok(url.clone()),
            None => Url::parse(DEFAULT_BASE_URL).map_err(|e| CoreError::Config {
                message: format!("invalid default base URL: {e}"),
            }),
        }
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: self
                .ca_cert
                .clone()
                .map_or(TlsMode::System, TlsMode::CustomCa),
            timeout: self.timeout,
        }
    }

    /// Build a fresh client (and with it a fresh session) for this account.
    pub fn build_client(&self) -> Result<Arc<CloudClient>, CoreError> {
        let client = CloudClient::new(
            self.resolved_base_url()?,
            self.app_id.clone(),
            self.credentials.clone(),
            &self.transport(),
        )?;
        Ok(Arc::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn config() -> ControllerConfig {
        ControllerConfig::new(Credentials::new("user@example.com", SecretString::from("pw")))
    }

    #[test]
    fn defaults_match_production_cloud() {
        let config = config();
        assert_eq!(config.app_id, DEFAULT_APP_ID);
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.refresh_interval, Duration::from_secs(30));
        assert_eq!(config.stale_policy, StalePolicy::KeepLastKnown);
        assert_eq!(
            config.resolved_base_url().ok().map(String::from),
            Some("https://api.gizwits.com/app".to_owned())
        );
    }

    #[test]
    fn custom_ca_selects_tls_mode() {
        let mut config = config();
        config.ca_cert = Some(PathBuf::from("/tmp/ca.pem"));
        assert_eq!(
            config.transport().tls,
            TlsMode::CustomCa(PathBuf::from("/tmp/ca.pem"))
        );
    }
}
