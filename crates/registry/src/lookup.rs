//! HTTP lookups against the client registry service.

use std::time::Duration;

use async_trait::async_trait;
use moka::sync::Cache;
use serde::Deserialize;

use ledgra_core::client::{ClientDirectory, ClientSummary, DirectoryError};
use ledgra_shared::config::RegistryConfig;
use ledgra_shared::types::ClientId;

/// Wire shape of a client record as the registry serves it.
///
/// The registry publishes more fields than this service needs; the rest
/// are ignored on deserialization.
#[derive(Debug, Deserialize)]
struct ClientPayload {
    #[serde(rename = "clienteId")]
    client_id: String,
    #[serde(rename = "nombre")]
    name: String,
    #[serde(rename = "estado")]
    active: bool,
}

/// [`ClientDirectory`] backed by the registry's REST endpoint.
///
/// Each fetch is one `GET {base_url}/codigo/{clientId}`, bounded by the
/// configured timeout. There are no retries: creation paths fail fast
/// and read paths degrade to placeholder names instead.
pub struct ClientLookupClient {
    http: reqwest::Client,
    base_url: String,
}

impl ClientLookupClient {
    /// Builds a lookup client from the registry configuration.
    ///
    /// # Errors
    ///
    /// Returns the underlying error when the HTTP client cannot be
    /// constructed.
    pub fn new(config: &RegistryConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl ClientDirectory for ClientLookupClient {
    async fn fetch(&self, client: &ClientId) -> Result<ClientSummary, DirectoryError> {
        // The client code goes on the path as a single segment; building
        // the URL through `Url` percent-encodes whatever the registry
        // put in the code.
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|err| DirectoryError::Remote(format!("invalid registry base url: {err}")))?;
        url.path_segments_mut()
            .map_err(|()| {
                DirectoryError::Remote("registry base url cannot be a base".to_string())
            })?
            .pop_if_empty()
            .push("codigo")
            .push(client.as_str());

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| DirectoryError::Remote(err.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DirectoryError::NotFound(client.clone()));
        }
        if !status.is_success() {
            return Err(DirectoryError::Remote(format!(
                "Registry answered {status} for client {client}"
            )));
        }

        let payload: ClientPayload = response
            .json()
            .await
            .map_err(|err| DirectoryError::Remote(err.to_string()))?;

        Ok(ClientSummary {
            id: ClientId::from(payload.client_id),
            display_name: payload.name,
            active: payload.active,
        })
    }
}

/// Short-lived cache of client display names for read enrichment.
///
/// Only successful lookups are cached, so a client that appears in the
/// registry after a miss shows up on the next read. TTL and capacity
/// come from configuration.
pub struct NameCache {
    names: Cache<ClientId, String>,
}

impl NameCache {
    /// Builds a cache sized per the registry configuration.
    #[must_use]
    pub fn new(config: &RegistryConfig) -> Self {
        let names = Cache::builder()
            .max_capacity(config.name_cache_capacity)
            .time_to_live(Duration::from_secs(config.name_cache_ttl_secs))
            .build();
        Self { names }
    }

    /// Returns the cached display name, if still fresh.
    #[must_use]
    pub fn get(&self, client: &ClientId) -> Option<String> {
        self.names.get(client)
    }

    /// Caches the display name for a client.
    pub fn insert(&self, client: ClientId, name: String) {
        self.names.insert(client, name);
    }
}
