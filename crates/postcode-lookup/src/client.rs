//! HTTP client for the postcode API.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use postcode_core::options::normalize_base_url;
use postcode_core::Locality;

use crate::lookup::{localities_from, LookupClient, LookupError};
use crate::protocol::LookupResponse;

/// Client for `GET <base_url>/<locality>`.
pub struct HttpLookupClient {
    client: Client,
    base_url: String,
}

impl HttpLookupClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: normalize_base_url(base_url),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full request URL for `query`; the query is one encoded path segment.
    pub fn search_url(&self, query: &str) -> String {
        format!("{}{}", self.base_url, urlencoding::encode(query))
    }
}

#[async_trait]
impl LookupClient for HttpLookupClient {
    fn name(&self) -> &str {
        &self.base_url
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<Locality>, LookupError> {
        let url = self.search_url(query);
        let resp = self.client.get(&url).send().await?;
        let envelope: LookupResponse = resp.error_for_status()?.json().await?;

        if !envelope.is_ok() {
            warn!(
                code = envelope.status.code,
                text = %envelope.status.text,
                "Postcode API rejected search"
            );
        }
        let localities = localities_from(envelope)?;
        debug!("Found {} localities", localities.len());
        Ok(localities)
    }
}
