//! Authentication module for the Toon API
//!
//! Implements the legacy OAuth2 login (credentials posted directly to the
//! authorization endpoint, code delivered to a local callback), the token
//! refresh cycle, and the gate that holds API calls while either is in flight.

pub mod authenticator;
pub mod callback;
pub mod exchange;
pub mod gate;
pub mod tokens;

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use oauth2::{AuthUrl, ClientId, ClientSecret, TokenUrl};

pub use authenticator::Authenticator;
pub use gate::RequestGate;
pub use tokens::{AuthEvent, AuthState};

/// Application identity registered with the vendor
#[derive(Debug, Clone)]
pub struct ClientIdentity {
    pub client_id: ClientId,
    pub client_secret: ClientSecret,
    /// Provider tenant, e.g. "eneco"
    pub tenant_id: String,
}

/// End-user login
#[derive(Clone)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Authorization server endpoints
#[derive(Debug, Clone)]
pub struct AuthEndpoints {
    pub auth_url: AuthUrl,
    pub token_url: TokenUrl,
}

impl AuthEndpoints {
    /// Derive `/authorize/legacy` and `/token` from the authorization host.
    pub fn from_host(auth_host: &str) -> Result<Self, url::ParseError> {
        let host = auth_host.trim_end_matches('/');
        Ok(Self {
            auth_url: AuthUrl::new(format!("{}/authorize/legacy", host))?,
            token_url: TokenUrl::new(format!("{}/token", host))?,
        })
    }
}

/// Where the one-shot callback listener binds and how long it waits
#[derive(Debug, Clone)]
pub struct CallbackSettings {
    pub host: String,
    /// 0 binds an ephemeral port
    pub port: u16,
    pub endpoint: String,
    /// Overrides the redirect URI derived from the bound address
    pub redirect_uri: Option<String>,
    pub timeout: Duration,
}

impl CallbackSettings {
    /// Redirect URI to hand to the authorization server for a listener bound at `addr`.
    pub fn redirect_uri_for(&self, addr: SocketAddr) -> String {
        if let Some(uri) = &self.redirect_uri {
            return uri.clone();
        }
        let host = match self.host.as_str() {
            "0.0.0.0" | "::" | "[::]" => "127.0.0.1",
            other => other,
        };
        format!("http://{}:{}{}", host, addr.port(), self.endpoint)
    }
}

/// Everything an [`Authenticator`] needs, fixed for the process lifetime
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub identity: ClientIdentity,
    pub endpoints: AuthEndpoints,
    pub callback: CallbackSettings,
    /// Overall timeout for each call to the authorization server
    pub http_timeout: Duration,
}
