//! One-shot local listener for the OAuth2 authorization-code redirect
//!
//! Lives for exactly one login attempt: it stops after the first request to
//! the callback path, when its deadline passes, or when the login task asks
//! it to shut down.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

use crate::error::AuthError;

const MAX_REQUEST_BYTES: usize = 16 * 1024;
const READ_TIMEOUT: Duration = Duration::from_secs(5);
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

const SUCCESS_HTML: &str =
    "<html><body><h1>Login successful</h1><p>You may close this window.</p></body></html>";
const ERROR_HTML: &str =
    "<html><body><h1>Login failed</h1><p>No authorization code received.</p></body></html>";
const NOT_FOUND_HTML: &str = "<html><body><h1>Not found</h1></body></html>";

/// How the listener ended without error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// A request hit the callback path; carries its `code`, if any
    Received(Option<String>),
    /// Shut down before any callback arrived
    Cancelled,
}

pub struct CallbackListener {
    listener: TcpListener,
    endpoint: String,
    local_addr: SocketAddr,
}

impl CallbackListener {
    pub async fn bind(host: &str, port: u16, endpoint: &str) -> Result<Self, AuthError> {
        let addr = format!("{}:{}", host, port);
        let bind_err = |e: std::io::Error| AuthError::Bind {
            addr: addr.clone(),
            reason: e.to_string(),
        };
        let listener = TcpListener::bind(addr.as_str()).await.map_err(bind_err)?;
        let local_addr = listener.local_addr().map_err(bind_err)?;
        tracing::debug!("OAuth callback listening on {}{}", local_addr, endpoint);

        Ok(Self {
            listener,
            endpoint: endpoint.to_string(),
            local_addr,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve until the callback arrives, `timeout` elapses or `shutdown` fires.
    /// The socket is closed when this returns.
    pub async fn wait_for_code(
        self,
        timeout: Duration,
        shutdown: oneshot::Receiver<()>,
    ) -> Result<CallbackOutcome, AuthError> {
        // The deadline and shutdown also cut short a connection that is still being read.
        tokio::select! {
            _ = tokio::time::sleep(timeout) => {
                tracing::warn!("No OAuth callback within {:?}", timeout);
                Err(AuthError::CallbackTimeout(timeout))
            }
            _ = shutdown => {
                tracing::debug!("OAuth callback listener shut down");
                Ok(CallbackOutcome::Cancelled)
            }
            code = self.serve() => Ok(CallbackOutcome::Received(code)),
        }
    }

    /// Accept connections until one hits the callback path; returns its `code`.
    async fn serve(&self) -> Option<String> {
        loop {
            let mut socket = match self.listener.accept().await {
                Ok((socket, _)) => socket,
                Err(e) => {
                    tracing::warn!("OAuth callback accept failed: {}", e);
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            };

            let request = match tokio::time::timeout(READ_TIMEOUT, read_request(&mut socket)).await
            {
                Ok(Ok(Some(request))) => request,
                Ok(Ok(None)) => {
                    respond(&mut socket, "400 Bad Request", ERROR_HTML).await;
                    continue;
                }
                Ok(Err(e)) => {
                    tracing::debug!("OAuth callback read failed: {}", e);
                    continue;
                }
                Err(_) => {
                    tracing::debug!("OAuth callback read timed out");
                    continue;
                }
            };

            if request.path != self.endpoint {
                respond(&mut socket, "404 Not Found", NOT_FOUND_HTML).await;
                continue;
            }

            let code = request.code();
            match code.as_deref() {
                Some(c) if !c.is_empty() => respond(&mut socket, "200 OK", SUCCESS_HTML).await,
                _ => respond(&mut socket, "400 Bad Request", ERROR_HTML).await,
            }
            tracing::debug!("OAuth callback received ({} {})", request.method, request.path);
            return code;
        }
    }
}

/// The parts of an inbound HTTP request the callback cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackRequest {
    pub method: String,
    pub path: String,
    pub query: String,
    pub body: String,
}

impl CallbackRequest {
    /// Parse a raw HTTP/1.x request. Returns `None` when the request line is malformed.
    pub fn parse(raw: &[u8]) -> Option<Self> {
        let text = String::from_utf8_lossy(raw);
        let (head, body) = match text.split_once("\r\n\r\n") {
            Some((head, body)) => (head, body),
            None => (text.as_ref(), ""),
        };

        let request_line = head.lines().next()?;
        let mut parts = request_line.split_whitespace();
        let method = parts.next()?.to_string();
        let target = parts.next()?;

        // Absolute-form targets carry scheme and authority; keep only the path part.
        let target = match target.find("://") {
            Some(idx) => {
                let rest = &target[idx + 3..];
                rest.find('/').map(|slash| &rest[slash..]).unwrap_or("/")
            }
            None => target,
        };
        let (path, query) = target.split_once('?').unwrap_or((target, ""));

        Some(Self {
            method,
            path: path.to_string(),
            query: query.to_string(),
            body: body.to_string(),
        })
    }

    /// `code` from the query string, falling back to a form-encoded body.
    pub fn code(&self) -> Option<String> {
        form_value(&self.query, "code").or_else(|| form_value(&self.body, "code"))
    }
}

fn form_value(encoded: &str, key: &str) -> Option<String> {
    url::form_urlencoded::parse(encoded.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

async fn read_request(socket: &mut TcpStream) -> std::io::Result<Option<CallbackRequest>> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];

    loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(head_end) = find_head_end(&buf) {
            let wanted = (head_end + 4).saturating_add(content_length(&buf[..head_end]));
            if buf.len() >= wanted {
                break;
            }
        }
        if buf.len() >= MAX_REQUEST_BYTES {
            break;
        }
    }

    Ok(CallbackRequest::parse(&buf))
}

fn find_head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Declared body length, capped at what the listener is willing to buffer.
fn content_length(head: &[u8]) -> usize {
    String::from_utf8_lossy(head)
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .map_or(0, |len| len.min(MAX_REQUEST_BYTES))
}

async fn respond(socket: &mut TcpStream, status: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}
