//! Form-encoded POSTs to the authorization server
//!
//! Used for the credential post, the code exchange and the refresh exchange.
//! Responses are handed back untouched; the authenticator classifies them.

use std::time::Duration;

use crate::error::AuthError;

pub struct TokenExchangeClient {
    http: reqwest::Client,
}

impl TokenExchangeClient {
    pub fn new(timeout: Duration) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    /// POST `fields` (in order) as `application/x-www-form-urlencoded`.
    pub async fn post_form(
        &self,
        endpoint: &str,
        fields: &[(&str, &str)],
    ) -> Result<reqwest::Response, reqwest::Error> {
        tracing::debug!("POST {}", endpoint);
        self.http.post(endpoint).form(fields).send().await
    }
}
