//! Read-side view of clients owned by the registry service.
//!
//! This service never stores client records. Owner display names are
//! resolved on read through a [`ClientDirectory`], and reads degrade to
//! placeholder names when the registry is unreachable.

use async_trait::async_trait;
use ledgra_shared::error::AppError;
use ledgra_shared::types::ClientId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Display name used when the registry has no such client.
pub const CLIENT_NOT_FOUND_PLACEHOLDER: &str = "(unknown client)";

/// Display name used when the registry could not be reached.
pub const CLIENT_LOOKUP_FAILED_PLACEHOLDER: &str = "(client lookup failed)";

/// What this service knows about a client, as reported by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSummary {
    /// The registry's identifier for the client.
    pub id: ClientId,
    /// Human-readable name for display next to accounts.
    pub display_name: String,
    /// Whether the registry considers the client active.
    pub active: bool,
}

/// Errors from looking a client up in the registry.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The registry answered and has no such client.
    #[error("Client not found in registry: {0}")]
    NotFound(ClientId),

    /// The registry failed to answer: transport error, timeout, or a
    /// 5xx response.
    #[error("Client registry error: {0}")]
    Remote(String),
}

impl From<DirectoryError> for AppError {
    fn from(err: DirectoryError) -> Self {
        let message = err.to_string();
        match err {
            DirectoryError::NotFound(_) => Self::NotFound(message),
            DirectoryError::Remote(_) => Self::RemoteError(message),
        }
    }
}

/// Looks clients up in the registry service.
///
/// Implementations make exactly one bounded-timeout attempt per call;
/// retrying is the caller's decision, not the directory's.
#[async_trait]
pub trait ClientDirectory: Send + Sync {
    /// Fetches the client's current registry record.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the registry has no such client and
    /// `Remote` when the registry could not be consulted.
    async fn fetch(&self, client: &ClientId) -> Result<ClientSummary, DirectoryError>;
}

/// Reduces a lookup outcome to a display name.
///
/// Read paths use this so a registry outage degrades the owner name
/// instead of failing the whole account read.
#[must_use]
pub fn display_name_or_placeholder(outcome: Result<ClientSummary, DirectoryError>) -> String {
    match outcome {
        Ok(summary) => summary.display_name,
        Err(DirectoryError::NotFound(_)) => CLIENT_NOT_FOUND_PLACEHOLDER.to_string(),
        Err(DirectoryError::Remote(_)) => CLIENT_LOOKUP_FAILED_PLACEHOLDER.to_string(),
    }
}
