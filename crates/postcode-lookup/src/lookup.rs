//! The lookup seam between field-group hosts and postcode sources.

use async_trait::async_trait;
use thiserror::Error;

use postcode_core::Locality;

use crate::protocol::LookupResponse;

#[derive(Error, Debug)]
pub enum LookupError {
    /// The API answered but reported a non-success status.
    #[error("Postcode API returned status {code}: {text}")]
    Status { code: u16, text: String },

    /// The HTTP exchange itself failed with a non-success status.
    #[error("HTTP {status}")]
    Http {
        status: u16,
        reason: Option<String>,
    },

    #[error("Postcode lookup timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed postcode response: {0}")]
    Decode(String),
}

impl LookupError {
    /// Description worth showing to the user, if the failure carried one.
    pub fn user_message(&self) -> Option<String> {
        match self {
            LookupError::Status { text, .. } if !text.trim().is_empty() => Some(text.clone()),
            LookupError::Http {
                reason: Some(reason),
                ..
            } if !reason.is_empty() => Some(reason.clone()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LookupError::Timeout(e.to_string())
        } else if e.is_decode() {
            LookupError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            LookupError::Http {
                status: status.as_u16(),
                reason: status.canonical_reason().map(str::to_string),
            }
        } else {
            LookupError::Network(e.to_string())
        }
    }
}

/// Unwrap an API envelope into its localities.
pub fn localities_from(response: LookupResponse) -> Result<Vec<Locality>, LookupError> {
    if response.is_ok() {
        Ok(response.data.unwrap_or_default().localities)
    } else {
        Err(LookupError::Status {
            code: response.status.code,
            text: response.status.text,
        })
    }
}

/// A source of locality records.
#[async_trait]
pub trait LookupClient: Send + Sync {
    /// Short name for logs and the status bar.
    fn name(&self) -> &str;

    async fn search(&self, query: &str) -> Result<Vec<Locality>, LookupError>;
}
