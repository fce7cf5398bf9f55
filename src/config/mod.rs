//! Configuration loading
//!
//! Read from `config.toml` in the platform config directory (or an explicit
//! path). Every field has a default; command-line flags override file values.
//! Tokens are never written here.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use oauth2::{ClientId, ClientSecret};
use serde::{Deserialize, Serialize};

use crate::api::endpoints::DEFAULT_API_BASE;
use crate::api::ApiSettings;
use crate::auth::{AuthConfig, AuthEndpoints, CallbackSettings, ClientIdentity};

pub const DEFAULT_AUTH_HOST: &str = "https://api.toon.eu";

/// Application configuration
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub client: ClientConfig,
    pub callback: CallbackConfig,
    pub endpoints: EndpointConfig,
    pub http: HttpConfig,
}

/// App registration from the vendor developer portal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Energy provider name, sent as `tenant_id`
    pub tenant_id: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            tenant_id: "eneco".to_string(),
        }
    }
}

/// Local OAuth callback listener
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CallbackConfig {
    pub host: String,
    pub port: u16,
    pub endpoint: String,
    pub redirect_uri: Option<String>,
    pub timeout_secs: u64,
}

impl Default for CallbackConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            endpoint: "/oauthcallback".to_string(),
            redirect_uri: None,
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub auth_host: String,
    pub api_base: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            auth_host: DEFAULT_AUTH_HOST.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Applied to every outbound call, token exchange included
    pub timeout_secs: u64,
    /// How long API calls wait for an in-flight login or refresh
    pub gate_ceiling_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            gate_ceiling_ms: 10_000,
        }
    }
}

impl Config {
    /// Get config directory path
    fn config_dir() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("eu", "toon-cli", "toon-cli")
            .context("Could not determine config directory")?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }

    /// Default config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from `path`, or the default location. A missing file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }

    /// Authenticator settings; fails when the client registration is incomplete.
    pub fn auth_config(&self) -> Result<AuthConfig> {
        let client_id = match self.client.client_id.as_deref() {
            Some(id) if !id.is_empty() => id,
            _ => bail!("Missing client id (--client-id or [client] client_id)"),
        };
        let client_secret = match self.client.client_secret.as_deref() {
            Some(secret) if !secret.is_empty() => secret,
            _ => bail!("Missing client secret (--client-secret or [client] client_secret)"),
        };
        let endpoints = AuthEndpoints::from_host(&self.endpoints.auth_host)
            .with_context(|| format!("Invalid auth host {}", self.endpoints.auth_host))?;

        Ok(AuthConfig {
            identity: ClientIdentity {
                client_id: ClientId::new(client_id.to_string()),
                client_secret: ClientSecret::new(client_secret.to_string()),
                tenant_id: self.client.tenant_id.clone(),
            },
            endpoints,
            callback: CallbackSettings {
                host: self.callback.host.clone(),
                port: self.callback.port,
                endpoint: self.callback.endpoint.clone(),
                redirect_uri: self.callback.redirect_uri.clone(),
                timeout: Duration::from_secs(self.callback.timeout_secs),
            },
            http_timeout: Duration::from_secs(self.http.timeout_secs),
        })
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            base: self.endpoints.api_base.clone(),
            timeout: Duration::from_secs(self.http.timeout_secs),
            gate_ceiling: Duration::from_millis(self.http.gate_ceiling_ms),
        }
    }
}
