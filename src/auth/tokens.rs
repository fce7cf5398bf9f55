//! Token and authentication state storage

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::AuthError;

/// Token pair returned by the token endpoint.
///
/// All four fields are text on the wire and are kept verbatim.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthToken {
    pub access_token: String,
    pub expires_in: String,
    pub refresh_token: String,
    pub refresh_token_expires_in: String,
}

impl OAuthToken {
    pub fn from_json(body: &str) -> Result<Self, AuthError> {
        serde_json::from_str(body).map_err(|e| AuthError::Decode(e.to_string()))
    }
}

impl fmt::Debug for OAuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthToken")
            .field("access_token", &"[redacted]")
            .field("expires_in", &self.expires_in)
            .field("refresh_token", &"[redacted]")
            .field("refresh_token_expires_in", &self.refresh_token_expires_in)
            .finish()
    }
}

/// Authentication lifecycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthState {
    #[default]
    Idle,
    Authenticating,
    Authenticated,
    Failed(String),
}

impl AuthState {
    pub fn is_authenticating(&self) -> bool {
        matches!(self, AuthState::Authenticating)
    }
}

/// Notification published on lifecycle transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    TokenReceived,
    TokenRefreshing,
    TokenError(String),
}

/// State and token as one atomically replaced value
#[derive(Debug, Clone, Default)]
pub struct AuthSnapshot {
    pub state: AuthState,
    pub token: OAuthToken,
}

/// Shared token/state cell.
///
/// Backed by a watch channel so readers always see a whole snapshot and
/// waiters can be woken on every transition.
#[derive(Debug)]
pub struct TokenStore {
    tx: watch::Sender<AuthSnapshot>,
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(AuthSnapshot::default());
        Self { tx }
    }

    pub fn state(&self) -> AuthState {
        self.tx.borrow().state.clone()
    }

    pub fn token(&self) -> OAuthToken {
        self.tx.borrow().token.clone()
    }

    pub fn access_token(&self) -> String {
        self.tx.borrow().token.access_token.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.tx.subscribe()
    }

    /// Enter `Authenticating` unless a cycle is already in flight.
    /// Returns false when the start was rejected.
    pub(crate) fn try_begin(&self) -> bool {
        self.tx.send_if_modified(|snapshot| {
            if snapshot.state.is_authenticating() {
                return false;
            }
            snapshot.state = AuthState::Authenticating;
            true
        })
    }

    pub(crate) fn set_token(&self, token: OAuthToken) {
        self.tx.send_modify(|snapshot| snapshot.token = token);
    }

    pub(crate) fn finish(&self, state: AuthState) {
        self.tx.send_modify(|snapshot| snapshot.state = state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_fields_stay_textual() {
        let json = r#"{"access_token":"a","expires_in":"600","refresh_token":"r","refresh_token_expires_in":"1200"}"#;
        let token = OAuthToken::from_json(json).unwrap();
        assert_eq!(token.access_token, "a");
        assert_eq!(token.expires_in, "600");
        assert_eq!(token.refresh_token, "r");
        assert_eq!(token.refresh_token_expires_in, "1200");

        let back = serde_json::to_string(&token).unwrap();
        assert_eq!(OAuthToken::from_json(&back).unwrap(), token);
    }

    #[test]
    fn test_token_missing_field_is_decode_error() {
        let err = OAuthToken::from_json(r#"{"access_token":"a"}"#).unwrap_err();
        assert!(matches!(err, AuthError::Decode(_)));
    }

    #[test]
    fn test_token_debug_redacts_secrets() {
        let token = OAuthToken {
            access_token: "secret-access".to_string(),
            expires_in: "600".to_string(),
            refresh_token: "secret-refresh".to_string(),
            refresh_token_expires_in: "1200".to_string(),
        };
        let debug = format!("{:?}", token);
        assert!(!debug.contains("secret-access"));
        assert!(!debug.contains("secret-refresh"));
        assert!(debug.contains("600"));
    }

    #[test]
    fn test_store_rejects_second_begin() {
        let store = TokenStore::new();
        assert_eq!(store.state(), AuthState::Idle);
        assert!(store.try_begin());
        assert!(!store.try_begin());
        store.finish(AuthState::Authenticated);
        assert!(store.try_begin());
    }

    #[test]
    fn test_store_begin_after_failure() {
        let store = TokenStore::new();
        assert!(store.try_begin());
        store.finish(AuthState::Failed("boom".to_string()));
        assert_eq!(store.state(), AuthState::Failed("boom".to_string()));
        assert!(store.try_begin());
        assert!(store.state().is_authenticating());
    }

    #[test]
    fn test_store_token_visible_to_subscribers() {
        let store = TokenStore::new();
        let rx = store.subscribe();
        store.set_token(OAuthToken {
            access_token: "a".to_string(),
            ..Default::default()
        });
        assert_eq!(rx.borrow().token.access_token, "a");
        assert_eq!(store.access_token(), "a");
    }
}
