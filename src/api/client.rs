//! Authenticated HTTP client for the Toon resource API
//!
//! Every call waits at the request gate, sends a bearer GET and, when the
//! server says the access token expired, refreshes once and retries once.

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::auth::gate::DEFAULT_CEILING;
use crate::auth::{AuthState, Authenticator, RequestGate};
use crate::error::{ApiError, AuthError};

use super::endpoints::{self, DEFAULT_API_BASE};

/// Fault string the resource server sends for an expired access token
pub const TOKEN_EXPIRED_FAULT: &str = "Access Token expired";

/// Resource API location and timing
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base: String,
    /// Overall timeout per request
    pub timeout: Duration,
    /// Longest a request waits for an in-flight login or refresh
    pub gate_ceiling: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(10),
            gate_ceiling: DEFAULT_CEILING,
        }
    }
}

pub struct ToonClient {
    http: reqwest::Client,
    auth: Authenticator,
    gate: RequestGate,
    base: String,
}

impl ToonClient {
    pub fn new(auth: Authenticator, settings: ApiSettings) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;
        let gate = auth.gate(settings.gate_ceiling);
        Ok(Self {
            http,
            auth,
            gate,
            base: settings.base,
        })
    }

    #[cfg(test)]
    pub fn authenticator(&self) -> &Authenticator {
        &self.auth
    }

    /// Wait at the gate for the login started alongside this client. A login
    /// that settled as failed is reported here instead of sending calls without a token.
    pub async fn wait_for_login(&self) -> Result<(), AuthError> {
        self.gate.wait().await;
        match self.auth.state() {
            AuthState::Failed(reason) => Err(AuthError::LoginFailed(reason)),
            _ => Ok(()),
        }
    }

    pub(crate) fn url(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        agreement_id: Option<&str>,
    ) -> String {
        endpoints::endpoint_url(&self.base, endpoint, params, agreement_id)
    }

    /// GET `url` and decode a 200 body into `T`.
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let mut retried = false;
        loop {
            self.gate.wait().await;
            let token = self.auth.access_token();
            tracing::debug!("GET {}", url);

            let resp = self
                .http
                .get(url)
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .bearer_auth(&token)
                .send()
                .await
                .map_err(|e| ApiError::Transport(e.to_string()))?;

            let status = resp.status();
            let body = resp
                .bytes()
                .await
                .map_err(|e| ApiError::Transport(e.to_string()))?;

            if status == reqwest::StatusCode::OK {
                return serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()));
            }

            let err = ApiError::from_status_body(status.as_u16(), &body);
            if !retried && is_token_expired(&err) {
                retried = true;
                tracing::info!("Access token expired, refreshing and retrying {}", url);
                match self.auth.start_refresh() {
                    // Busy: another caller is already refreshing; the gate waits for it.
                    Ok(()) | Err(AuthError::Busy) => {}
                    Err(e) => tracing::warn!("Could not start token refresh: {}", e),
                }
                continue;
            }

            tracing::debug!("GET {} failed: {}", url, err);
            return Err(err);
        }
    }
}

/// The one failure that earns a refresh-and-retry.
fn is_token_expired(err: &ApiError) -> bool {
    match err {
        ApiError::Status { status, fault } => {
            *status == reqwest::StatusCode::UNAUTHORIZED.as_u16()
                && fault.faultstring == TOKEN_EXPIRED_FAULT
        }
        _ => false,
    }
}
