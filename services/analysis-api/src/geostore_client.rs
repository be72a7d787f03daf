//! HTTP client for the geostore service.

use tracing::{debug, instrument};

use analysis_protocol::Geostore;
use zonal_common::{ZonalError, ZonalResult};

/// Resolves geostore ids to stored geometries.
#[derive(Debug, Clone)]
pub struct GeostoreClient {
    client: reqwest::Client,
    base_url: String,
}

impl GeostoreClient {
    /// Create a client against the given geostore base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetch a geostore entry by id.
    #[instrument(skip(self))]
    pub async fn fetch(&self, geostore_id: &str) -> ZonalResult<Geostore> {
        let url = format!(
            "{}/v2/geostore/{}",
            self.base_url.trim_end_matches('/'),
            geostore_id
        );

        let response = self.client.get(&url).send().await.map_err(|e| {
            ZonalError::InternalError(format!("geostore request failed: {}", e))
        })?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ZonalError::GeostoreNotFound(geostore_id.to_string()));
        }
        if !response.status().is_success() {
            return Err(ZonalError::InternalError(format!(
                "geostore returned {} for {}",
                response.status(),
                geostore_id
            )));
        }

        let body = response.bytes().await.map_err(|e| {
            ZonalError::InternalError(format!("geostore body read failed: {}", e))
        })?;

        let geostore = Geostore::from_response(geostore_id, &body)?;
        debug!(area_ha = geostore.area_ha, "resolved geostore entry");
        Ok(geostore)
    }
}
