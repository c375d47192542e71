//! Lookups answered from a local postcode pool instead of the network.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use postcode_core::{Locality, PostcodePool};

use crate::lookup::{localities_from, LookupClient, LookupError};
use crate::protocol::LookupResponse;

pub struct OfflineLookupClient {
    pool: Arc<PostcodePool>,
}

impl OfflineLookupClient {
    pub fn new(pool: Arc<PostcodePool>) -> Self {
        Self { pool }
    }

    /// The reply the postcode API would give for `query`.
    pub fn respond(&self, query: &str) -> LookupResponse {
        match self.pool.search_by_locality(query) {
            Ok(localities) => LookupResponse::ok(localities),
            Err(rejection) => LookupResponse::rejected(rejection),
        }
    }
}

#[async_trait]
impl LookupClient for OfflineLookupClient {
    fn name(&self) -> &str {
        "offline"
    }

    async fn search(&self, query: &str) -> Result<Vec<Locality>, LookupError> {
        let response = self.respond(query);
        debug!(query, code = response.status.code, "Offline lookup");
        localities_from(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OfflineLookupClient {
        OfflineLookupClient::new(Arc::new(PostcodePool::from_records(vec![
            Locality::new("RICHMOND", "VIC", "3121"),
            Locality::new("RICHMOND", "TAS", "7025"),
            Locality::new("PARKVILLE", "VIC", "3052"),
        ])))
    }

    #[tokio::test]
    async fn answers_matches_in_pool_order() {
        let found = client().search("rich").await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].state, "TAS");
    }

    #[tokio::test]
    async fn rejections_surface_as_status_errors() {
        let err = client().search("xyz").await.unwrap_err();
        assert!(matches!(err, LookupError::Status { code: 404, .. }));
        assert_eq!(
            err.user_message().as_deref(),
            Some("No localities matched 'xyz'")
        );

        let err = client().search("P@rk").await.unwrap_err();
        assert!(matches!(err, LookupError::Status { code: 400, .. }));
    }
}
