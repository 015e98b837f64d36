// Session login and renewal.
//
// `login` exchanges the stored credentials for a token and replaces the
// session wholesale; `ensure_valid` is called before every request and
// logs in again once the token is inside its skew window.

use std::sync::Arc;

use chrono::DateTime;
use reqwest::header::ACCEPT;
use secrecy::ExposeSecret;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::client::{APP_ID_HEADER, CloudClient, TOKEN_HEADER};
use crate::error::Error;
use crate::models::LoginResponse;
use crate::session::Session;

const ENDPOINT: &str = "login";

impl CloudClient {
    /// Authenticate and replace the current session.
    ///
    /// `POST /login` with `{username, password, lang}` and an empty token
    /// header. When the response has no `expire_at`, the session lasts one
    /// hour from now. On failure the previous session is left in place.
    pub async fn login(&self) -> Result<Arc<Session>, Error> {
        let url = self.api_url(ENDPOINT)?;
        let creds = self.session().credentials();
        debug!(username = %creds.username, "logging in at {}", url);

        let body = json!({
            "username": creds.username,
            "password": creds.password.expose_secret(),
            "lang": creds.language,
        });

        let resp = self
            .http()
            .post(url)
            .header(ACCEPT, "application/json")
            .header(APP_ID_HEADER, self.app_id())
            .header(TOKEN_HEADER, "")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            warn!(%status, "login failed");
            return Err(Error::Authentication {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: LoginResponse = serde_json::from_str(&body).map_err(|e| Error::Protocol {
            endpoint: ENDPOINT.into(),
            message: e.to_string(),
            body: body.clone(),
        })?;

        let Some(token) = parsed.token.filter(|t| !t.is_empty()) else {
            return Err(Error::Protocol {
                endpoint: ENDPOINT.into(),
                message: "response carries no token".into(),
                body,
            });
        };

        let expires_at = match parsed.expire_at {
            Some(secs) => Some(DateTime::from_timestamp(secs, 0).ok_or_else(|| {
                Error::Protocol {
                    endpoint: ENDPOINT.into(),
                    message: format!("expire_at out of range: {secs}"),
                    body: body.clone(),
                }
            })?),
            None => None,
        };

        let session = self
            .session()
            .replace(self.session().issue(token, parsed.uid, expires_at));
        info!(
            uid = session.owner_id.as_deref().unwrap_or("-"),
            expires_at = %session.expires_at,
            "login successful"
        );
        Ok(session)
    }

    /// Return a session that is valid right now, logging in if needed.
    ///
    /// Concurrent callers that find the token expired wait for a single
    /// login rather than each issuing their own.
    pub async fn ensure_valid(&self) -> Result<Arc<Session>, Error> {
        if let Some(session) = self.session().valid_session() {
            return Ok(session);
        }

        let _renewal = self.session().renewal.lock().await;
        if let Some(session) = self.session().valid_session() {
            return Ok(session);
        }

        debug!("session missing or near expiry, renewing");
        self.login().await
    }
}
