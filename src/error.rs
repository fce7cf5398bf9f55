//! Error types for the authentication lifecycle and resource calls

use std::time::Duration;

use thiserror::Error;

use crate::models::{ErrorResponse, Fault, FaultDetail};

/// Errors that end an authentication cycle (or refuse to start one).
#[derive(Debug, Error)]
pub enum AuthError {
    /// Network failure talking to the authorization server
    #[error("transport error: {0}")]
    Transport(String),

    /// Authorization server answered with an unexpected status
    #[error("authorization server returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Token payload could not be decoded
    #[error("unable to parse received OAuth token: {0}")]
    Decode(String),

    /// Callback arrived without a usable authorization code
    #[error("callback error: {0}")]
    Callback(String),

    /// Callback listener could not be bound
    #[error("unable to bind callback listener on {addr}: {reason}")]
    Bind { addr: String, reason: String },

    /// No callback arrived before the listener deadline
    #[error("timed out after {0:?} waiting for OAuth callback")]
    CallbackTimeout(Duration),

    #[error("no refresh token available")]
    NoRefreshToken,

    /// The login settled in the failed state
    #[error("login failed: {0}")]
    LoginFailed(String),

    /// A login or refresh cycle is already in flight
    #[error("authentication already in progress")]
    Busy,
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::Transport(err.to_string())
    }
}

/// Errors returned from an authenticated resource call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request never produced a readable status
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-200 answer, with the vendor fault envelope
    #[error("HTTP {status}: {} ({})", .fault.faultstring, .fault.detail.errorcode)]
    Status { status: u16, fault: Fault },

    /// 200 answer whose body did not match the expected shape
    #[error("unable to parse JSON: {0}")]
    Decode(String),
}

impl ApiError {
    /// Build a status error from a non-200 body, synthesizing a fault when
    /// the body is not a vendor envelope.
    pub fn from_status_body(status: u16, body: &[u8]) -> Self {
        let fault = match serde_json::from_slice::<ErrorResponse>(body) {
            Ok(envelope) => envelope.fault,
            Err(e) => Fault {
                faultstring: e.to_string(),
                detail: FaultDetail {
                    errorcode: format!("Statuscode: {}", status),
                },
            },
        };
        ApiError::Status { status, fault }
    }

    #[cfg(test)]
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Render the error as the vendor fault envelope for output.
    pub fn into_error_response(self) -> ErrorResponse {
        let fault = match self {
            ApiError::Status { fault, .. } => fault,
            ApiError::Transport(msg) => Fault {
                faultstring: msg,
                detail: FaultDetail {
                    errorcode: "Transport error".to_string(),
                },
            },
            ApiError::Decode(msg) => Fault {
                faultstring: msg,
                detail: FaultDetail {
                    errorcode: "Unable to parse JSON".to_string(),
                },
            },
        };
        ErrorResponse { fault }
    }
}
