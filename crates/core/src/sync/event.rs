//! Client lifecycle event wire format.
//!
//! The JSON field names and event identifiers are a published contract
//! with the client registry service and must not change.

use std::fmt;

use chrono::{DateTime, Utc};
use ledgra_shared::types::ClientId;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// What happened to a client.
///
/// Identifiers the registry does not publish yet deserialize into
/// `Unknown` so consumers can log and discard them instead of failing
/// the whole delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEventKind {
    /// Client was activated.
    Activated,
    /// Client was deactivated.
    Deactivated,
    /// Client was removed entirely.
    Deleted,
    /// Identifier this service does not handle.
    Unknown(String),
}

impl LifecycleEventKind {
    const ACTIVATED: &'static str = "CLIENTE_ACTIVADO";
    const DEACTIVATED: &'static str = "CLIENTE_DESACTIVADO";
    const DELETED: &'static str = "CLIENTE_ELIMINADO";

    /// Returns the wire identifier for this kind.
    #[must_use]
    pub fn as_wire(&self) -> &str {
        match self {
            Self::Activated => Self::ACTIVATED,
            Self::Deactivated => Self::DEACTIVATED,
            Self::Deleted => Self::DELETED,
            Self::Unknown(other) => other,
        }
    }

    /// Parses a wire identifier, keeping unrecognized ones verbatim.
    #[must_use]
    pub fn from_wire(value: &str) -> Self {
        match value {
            Self::ACTIVATED => Self::Activated,
            Self::DEACTIVATED => Self::Deactivated,
            Self::DELETED => Self::Deleted,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for LifecycleEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl Serialize for LifecycleEventKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for LifecycleEventKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_wire(&value))
    }
}

/// A client lifecycle notification.
///
/// Serialized field names follow the registry's published schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientLifecycleEvent {
    /// What happened.
    #[serde(rename = "evento")]
    pub kind: LifecycleEventKind,
    /// The client it happened to.
    #[serde(rename = "clienteId")]
    pub client_id: ClientId,
    /// When it happened, ISO-8601 in UTC.
    #[serde(rename = "fecha")]
    pub occurred_at: DateTime<Utc>,
}

impl ClientLifecycleEvent {
    fn now(kind: LifecycleEventKind, client_id: ClientId) -> Self {
        Self {
            kind,
            client_id,
            occurred_at: Utc::now(),
        }
    }

    /// Builds an activation event stamped with the current time.
    #[must_use]
    pub fn activated(client_id: ClientId) -> Self {
        Self::now(LifecycleEventKind::Activated, client_id)
    }

    /// Builds a deactivation event stamped with the current time.
    #[must_use]
    pub fn deactivated(client_id: ClientId) -> Self {
        Self::now(LifecycleEventKind::Deactivated, client_id)
    }

    /// Builds a deletion event stamped with the current time.
    #[must_use]
    pub fn deleted(client_id: ClientId) -> Self {
        Self::now(LifecycleEventKind::Deleted, client_id)
    }

    /// Returns the partition routing key for this event.
    ///
    /// Keying by client keeps all events of one client in order.
    #[must_use]
    pub fn routing_key(&self) -> &str {
        self.client_id.as_str()
    }
}
