//! API client module for the Toon resource API

mod agreements;
pub mod client;
mod consumption;
pub mod endpoints;

use anyhow::{bail, Result};
use serde::Serialize;

use crate::error::ApiError;
use crate::models::Agreement;

pub use client::{ApiSettings, ToonClient};
pub use endpoints::{Interval, TimeRange};

/// Print a response as pretty JSON on stdout. Errors are printed as the
/// vendor fault envelope and then returned so the process exits non-zero.
pub fn print_response<T: Serialize>(result: Result<T, ApiError>) -> Result<()> {
    match result {
        Ok(data) => {
            println!("{}", serde_json::to_string_pretty(&data)?);
            Ok(())
        }
        Err(err) => {
            let message = err.to_string();
            println!("{}", serde_json::to_string_pretty(&err.into_error_response())?);
            bail!("request failed: {}", message)
        }
    }
}

/// The agreement to query: the requested one, or the first linked to the account.
pub fn pick_agreement(agreements: &[Agreement], requested: Option<&str>) -> Result<String> {
    if let Some(id) = requested {
        return Ok(id.to_string());
    }
    match agreements.first() {
        Some(agreement) => Ok(agreement.agreement_id.clone()),
        None => bail!("No agreements found for this account"),
    }
}
