// Cloud API HTTP client
//
// Wraps `reqwest::Client` with URL construction, the vendor header set,
// status checking, and response decoding. Endpoint groups (auth,
// devices) are implemented as inherent methods in separate files to keep
// this module focused on transport mechanics.

use std::sync::Arc;

use reqwest::header::ACCEPT;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::clock::{Clock, SystemClock};
use crate::error::Error;
use crate::session::{Credentials, Session, SessionManager};
use crate::transport::TransportConfig;

pub(crate) const APP_ID_HEADER: &str = "X-Gizwits-Application-Id";
pub(crate) const TOKEN_HEADER: &str = "X-Gizwits-User-token";

/// Request layer for the vendor cloud.
///
/// Holds no device state: every call validates the session first, then
/// issues exactly one HTTP round trip bounded by the transport timeout.
/// Nothing is retried here; retry policy belongs to the caller.
pub struct CloudClient {
    http: reqwest::Client,
    base_url: Url,
    app_id: String,
    session: SessionManager,
}

impl CloudClient {
    /// Create a client from a `TransportConfig`, using the system clock.
    pub fn new(
        base_url: Url,
        app_id: impl Into<String>,
        credentials: Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(
            http,
            base_url,
            app_id,
            credentials,
            Arc::new(SystemClock),
        ))
    }

    /// Create a client with a pre-built `reqwest::Client` and clock.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        app_id: impl Into<String>,
        credentials: Credentials,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            http,
            base_url,
            app_id: app_id.into(),
            session: SessionManager::new(credentials, clock),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base_url}/{path}`. The base may carry a path prefix
    /// (`https://api.gizwits.com/app`), so this is concatenation, not
    /// `Url::join`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let full = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Ok(Url::parse(&full)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Authenticated GET, decoded as `T`.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        url: Url,
    ) -> Result<T, Error> {
        let session = self.ensure_valid().await?;
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .header(APP_ID_HEADER, &self.app_id)
            .header(TOKEN_HEADER, session.token.expose_secret())
            .send()
            .await?;

        self.decode(endpoint, &session, resp).await
    }

    /// Authenticated POST with a JSON body, decoded as `T`.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        url: Url,
        body: &impl Serialize,
    ) -> Result<T, Error> {
        let session = self.ensure_valid().await?;
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .header(ACCEPT, "application/json")
            .header(APP_ID_HEADER, &self.app_id)
            .header(TOKEN_HEADER, session.token.expose_secret())
            .json(body)
            .send()
            .await?;

        self.decode(endpoint, &session, resp).await
    }

    /// Check the status and decode the body.
    ///
    /// A 401/403 drops the session that was used so the next request logs
    /// in again; the failing request itself is not retried.
    async fn decode<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        session: &Arc<Session>,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let err = Error::Status {
                endpoint: endpoint.to_owned(),
                status: status.as_u16(),
                body,
            };
            if err.is_token_rejected() {
                warn!(endpoint, %status, "token rejected, dropping session");
                self.session.invalidate(session);
            } else {
                warn!(endpoint, %status, "request failed");
            }
            return Err(err);
        }

        serde_json::from_str(&body).map_err(|e| Error::Protocol {
            endpoint: endpoint.to_owned(),
            message: e.to_string(),
            body,
        })
    }
}

impl std::fmt::Debug for CloudClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudClient")
            .field("base_url", &self.base_url.as_str())
            .field("app_id", &self.app_id)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
