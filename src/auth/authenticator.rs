//! Login and refresh state machine
//!
//! `start_login` binds the callback listener, then posts the user's
//! credentials straight to `/authorize/legacy`. The authorization server
//! redirects to the listener with a `code`, which is exchanged at `/token`.
//! `start_refresh` skips the callback and exchanges the stored refresh token.
//!
//! At most one cycle runs at a time. A cycle ends by storing the token (on
//! success), publishing exactly one terminal event, and only then leaving
//! `Authenticating`.

use std::sync::Arc;
use std::time::Duration;

use oauth2::{AuthorizationCode, RefreshToken};
use tokio::sync::{broadcast, oneshot};

use super::callback::{CallbackListener, CallbackOutcome};
use super::exchange::TokenExchangeClient;
use super::gate::RequestGate;
use super::tokens::{AuthEvent, AuthState, OAuthToken, TokenStore};
use super::{AuthConfig, Credential};
use crate::error::AuthError;

const EVENT_CAPACITY: usize = 16;

/// Cheap to clone; every clone drives the same state.
#[derive(Clone)]
pub struct Authenticator {
    inner: Arc<Inner>,
}

struct Inner {
    config: AuthConfig,
    store: TokenStore,
    exchange: TokenExchangeClient,
    events: broadcast::Sender<AuthEvent>,
}

impl Authenticator {
    pub fn new(config: AuthConfig) -> Result<Self, AuthError> {
        let exchange = TokenExchangeClient::new(config.http_timeout)?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            inner: Arc::new(Inner {
                config,
                store: TokenStore::new(),
                exchange,
                events,
            }),
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.inner.events.subscribe()
    }

    pub fn state(&self) -> AuthState {
        self.inner.store.state()
    }

    #[cfg(test)]
    pub fn token(&self) -> OAuthToken {
        self.inner.store.token()
    }

    pub fn access_token(&self) -> String {
        self.inner.store.access_token()
    }

    /// Gate that holds callers while a cycle of this authenticator is in flight.
    pub fn gate(&self, ceiling: Duration) -> RequestGate {
        RequestGate::new(self.inner.store.subscribe(), ceiling)
    }

    /// Begin a login in the background. Fails only when a cycle is already running;
    /// every other outcome is reported through the state and the event channel.
    pub fn start_login(&self, credential: Credential) -> Result<(), AuthError> {
        if !self.inner.store.try_begin() {
            return Err(AuthError::Busy);
        }
        tracing::info!("Starting login for {}", credential.username);

        let this = self.clone();
        tokio::spawn(async move { this.run_login(credential).await });
        Ok(())
    }

    /// Begin a refresh-token exchange in the background.
    pub fn start_refresh(&self) -> Result<(), AuthError> {
        if !self.inner.store.try_begin() {
            return Err(AuthError::Busy);
        }
        tracing::info!("Refreshing access token...");
        self.publish(AuthEvent::TokenRefreshing);

        let this = self.clone();
        tokio::spawn(async move { this.run_refresh().await });
        Ok(())
    }

    async fn run_login(&self, credential: Credential) {
        let config = &self.inner.config;
        let cb = &config.callback;

        // Bound before the credential post so the redirect always finds a listener.
        let listener = match CallbackListener::bind(&cb.host, cb.port, &cb.endpoint).await {
            Ok(listener) => listener,
            Err(e) => return self.fail(e),
        };
        let redirect_uri = cb.redirect_uri_for(listener.local_addr());
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let waiting = tokio::spawn(listener.wait_for_code(cb.timeout, shutdown_rx));

        let identity = &config.identity;
        let posted = self
            .inner
            .exchange
            .post_form(
                config.endpoints.auth_url.url().as_str(),
                &[
                    ("client_id", identity.client_id.as_str()),
                    ("username", credential.username.as_str()),
                    ("password", credential.password.as_str()),
                    ("redirecturi", redirect_uri.as_str()),
                    ("tenant_id", identity.tenant_id.as_str()),
                    ("response_type", "code"),
                    ("state", ""),
                    ("scope", ""),
                ],
            )
            .await;

        let post_error = match posted {
            Err(e) => Some(AuthError::from(e)),
            Ok(resp) if !resp.status().is_success() => {
                let status = resp.status().as_u16();
                let body = resp.text().await.unwrap_or_default();
                Some(AuthError::HttpStatus { status, body })
            }
            Ok(_) => None,
        };
        if post_error.is_some() {
            // A callback that already arrived still wins; otherwise the listener stops now.
            let _ = shutdown_tx.send(());
        }

        match waiting.await {
            Ok(Ok(CallbackOutcome::Received(code))) => {
                self.handle_authorization_code(code.as_deref().unwrap_or_default())
                    .await
            }
            Ok(Ok(CallbackOutcome::Cancelled)) => self.fail(post_error.unwrap_or_else(|| {
                AuthError::Callback("callback listener stopped before a code arrived".into())
            })),
            Ok(Err(e)) => self.fail(post_error.unwrap_or(e)),
            Err(e) => self.fail(AuthError::Callback(format!(
                "callback listener task failed: {}",
                e
            ))),
        }
    }

    /// Exchange an authorization code delivered to the callback for a token.
    pub async fn handle_authorization_code(&self, code: &str) {
        if code.is_empty() {
            return self.fail(AuthError::Callback(
                "no code found in OAuth2 callback".to_string(),
            ));
        }
        let code = AuthorizationCode::new(code.to_string());
        let identity = &self.inner.config.identity;

        let response = self
            .inner
            .exchange
            .post_form(
                self.inner.config.endpoints.token_url.url().as_str(),
                &[
                    ("client_id", identity.client_id.as_str()),
                    ("client_secret", identity.client_secret.secret().as_str()),
                    ("grant_type", "authorization_code"),
                    ("code", code.secret().as_str()),
                ],
            )
            .await;
        self.complete_exchange(response).await;
    }

    async fn run_refresh(&self) {
        let stored = self.inner.store.token();
        if stored.refresh_token.is_empty() {
            return self.fail(AuthError::NoRefreshToken);
        }
        let refresh_token = RefreshToken::new(stored.refresh_token);
        let identity = &self.inner.config.identity;

        let response = self
            .inner
            .exchange
            .post_form(
                self.inner.config.endpoints.token_url.url().as_str(),
                &[
                    ("client_id", identity.client_id.as_str()),
                    ("client_secret", identity.client_secret.secret().as_str()),
                    ("grant_type", "refresh_token"),
                    ("refresh_token", refresh_token.secret().as_str()),
                ],
            )
            .await;
        self.complete_exchange(response).await;
    }

    /// Terminal step shared by the code and refresh exchanges.
    async fn complete_exchange(&self, response: Result<reqwest::Response, reqwest::Error>) {
        match read_token(response).await {
            Ok(token) => self.succeed(token),
            Err(e) => self.fail(e),
        }
    }

    fn succeed(&self, token: OAuthToken) {
        self.inner.store.set_token(token);
        self.publish(AuthEvent::TokenReceived);
        self.inner.store.finish(AuthState::Authenticated);
        tracing::info!("OAuth token received");
    }

    fn fail(&self, err: AuthError) {
        let reason = err.to_string();
        tracing::warn!("Authentication failed: {}", reason);
        self.publish(AuthEvent::TokenError(reason.clone()));
        self.inner.store.finish(AuthState::Failed(reason));
    }

    fn publish(&self, event: AuthEvent) {
        // No subscriber is fine; state still records the outcome.
        let _ = self.inner.events.send(event);
    }
}

async fn read_token(
    response: Result<reqwest::Response, reqwest::Error>,
) -> Result<OAuthToken, AuthError> {
    let response = response?;
    let status = response.status();
    let body = response.text().await?;
    if status != reqwest::StatusCode::OK {
        return Err(AuthError::HttpStatus {
            status: status.as_u16(),
            body,
        });
    }
    OAuthToken::from_json(&body)
}
