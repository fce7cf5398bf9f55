//! In-process mock of the Toon authorization and resource servers

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Form, State};
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::post;
use axum::Router;
use tokio::sync::broadcast;

use crate::auth::{
    AuthConfig, AuthEndpoints, AuthEvent, CallbackSettings, ClientIdentity, Credential,
};

pub const EXPIRED_BODY: &str =
    r#"{"fault":{"faultstring":"Access Token expired","detail":{"errorcode":"keymanagement.service.access_token_expired"}}}"#;

#[derive(Debug, Clone)]
struct Behavior {
    login_status: Option<u16>,
    callback_code: String,
    token_status: Option<u16>,
    token_body: Option<String>,
    token_delay: Duration,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            login_status: None,
            callback_code: "the-code".to_string(),
            token_status: None,
            token_body: None,
            token_delay: Duration::ZERO,
        }
    }
}

#[derive(Default)]
pub struct MockState {
    behavior: Mutex<Behavior>,
    login_forms: Mutex<Vec<HashMap<String, String>>>,
    token_forms: Mutex<Vec<HashMap<String, String>>>,
    issued: AtomicUsize,
    resource_script: Mutex<VecDeque<(u16, String)>>,
    resource_requests: Mutex<Vec<(String, String)>>,
}

impl MockState {
    /// `Some(status)` answers the credential post with that status instead of redirecting.
    pub fn set_login_status(&self, status: Option<u16>) {
        self.behavior.lock().unwrap().login_status = status;
    }

    pub fn set_callback_code(&self, code: &str) {
        self.behavior.lock().unwrap().callback_code = code.to_string();
    }

    pub fn set_token_status(&self, status: Option<u16>) {
        self.behavior.lock().unwrap().token_status = status;
    }

    pub fn set_token_body(&self, body: Option<String>) {
        self.behavior.lock().unwrap().token_body = body;
    }

    pub fn set_token_delay(&self, delay: Duration) {
        self.behavior.lock().unwrap().token_delay = delay;
    }

    /// Queue a resource response; unscripted requests get `200 []`.
    pub fn push_resource(&self, status: u16, body: &str) {
        self.resource_script
            .lock()
            .unwrap()
            .push_back((status, body.to_string()));
    }

    pub fn login_forms(&self) -> Vec<HashMap<String, String>> {
        self.login_forms.lock().unwrap().clone()
    }

    pub fn token_forms(&self) -> Vec<HashMap<String, String>> {
        self.token_forms.lock().unwrap().clone()
    }

    fn grants(&self, grant: &str) -> usize {
        self.token_forms()
            .iter()
            .filter(|f| f.get("grant_type").map(String::as_str) == Some(grant))
            .count()
    }

    pub fn code_exchanges(&self) -> usize {
        self.grants("authorization_code")
    }

    pub fn refreshes(&self) -> usize {
        self.grants("refresh_token")
    }

    /// (path and query, Authorization header) per resource request
    pub fn resource_requests(&self) -> Vec<(String, String)> {
        self.resource_requests.lock().unwrap().clone()
    }
}

pub struct MockToon {
    pub base: String,
    pub state: Arc<MockState>,
}

impl MockToon {
    pub async fn spawn() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .route("/authorize/legacy", post(authorize))
            .route("/token", post(token))
            .fallback(resource)
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0))
            .await
            .expect("bind mock server");
        let addr = listener.local_addr().expect("mock server addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base: format!("http://{}", addr),
            state,
        }
    }

    pub fn api_base(&self) -> String {
        format!("{}/toon/v3", self.base)
    }
}

async fn authorize(
    State(state): State<Arc<MockState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let redirect_uri = form.get("redirecturi").cloned().unwrap_or_default();
    state.login_forms.lock().unwrap().push(form);
    let behavior = state.behavior.lock().unwrap().clone();

    if let Some(status) = behavior.login_status {
        let status = StatusCode::from_u16(status).unwrap();
        return (status, "login page").into_response();
    }
    Redirect::to(&format!("{}?code={}", redirect_uri, behavior.callback_code)).into_response()
}

async fn token(
    State(state): State<Arc<MockState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    state.token_forms.lock().unwrap().push(form);
    let behavior = state.behavior.lock().unwrap().clone();

    if !behavior.token_delay.is_zero() {
        tokio::time::sleep(behavior.token_delay).await;
    }
    if let Some(status) = behavior.token_status {
        let status = StatusCode::from_u16(status).unwrap();
        return (status, "token endpoint unavailable").into_response();
    }

    let n = state.issued.fetch_add(1, Ordering::SeqCst) + 1;
    let body = behavior.token_body.unwrap_or_else(|| {
        serde_json::json!({
            "access_token": format!("access-{}", n),
            "expires_in": "600",
            "refresh_token": format!("refresh-{}", n),
            "refresh_token_expires_in": "1200",
        })
        .to_string()
    });
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}

async fn resource(State(state): State<Arc<MockState>>, uri: Uri, headers: HeaderMap) -> Response {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    state
        .resource_requests
        .lock()
        .unwrap()
        .push((uri.to_string(), bearer));

    let (status, body) = state
        .resource_script
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or((200, "[]".to_string()));
    let status = StatusCode::from_u16(status).unwrap();
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

pub fn auth_config(base: &str) -> AuthConfig {
    AuthConfig {
        identity: ClientIdentity {
            client_id: oauth2::ClientId::new("client-id".to_string()),
            client_secret: oauth2::ClientSecret::new("client-secret".to_string()),
            tenant_id: "eneco".to_string(),
        },
        endpoints: AuthEndpoints::from_host(base).unwrap(),
        callback: CallbackSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            endpoint: "/oauthcallback".to_string(),
            redirect_uri: None,
            timeout: Duration::from_millis(500),
        },
        http_timeout: Duration::from_secs(5),
    }
}

pub fn credential() -> Credential {
    Credential {
        username: "alice".to_string(),
        password: "secret".to_string(),
    }
}

pub async fn next_event(events: &mut broadcast::Receiver<AuthEvent>) -> AuthEvent {
    tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("no auth event within 5s")
        .expect("event channel closed")
}

/// A local port with nothing listening on it
pub fn unused_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}
