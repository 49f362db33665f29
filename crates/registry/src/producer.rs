//! Publisher for client lifecycle notifications.
//!
//! The producer sits on the registry side of the integration: whenever a
//! client transitions state, it announces the transition so downstream
//! account services can react. Callers must publish only after the local
//! state change has been durably committed, and only when the transition
//! actually changed something ([`Standing::apply`] reports that through
//! its `changed` flag).
//!
//! [`Standing::apply`]: ledgra_core::account::Standing::apply

use std::sync::Arc;

use tracing::info;

use ledgra_core::sync::ClientLifecycleEvent;
use ledgra_shared::types::ClientId;

use crate::channel::{ChannelError, EventChannel, EventMessage};

/// Publishes client lifecycle events, keyed by client so every event for
/// one client lands on the same partition in order.
///
/// Each method blocks until the channel has accepted the message; a
/// returned error means the announcement was not made and the caller
/// should surface the failure rather than assume delivery.
pub struct ClientLifecycleProducer {
    channel: Arc<dyn EventChannel>,
}

impl ClientLifecycleProducer {
    /// Creates a producer publishing to the given channel.
    #[must_use]
    pub fn new(channel: Arc<dyn EventChannel>) -> Self {
        Self { channel }
    }

    /// Announces that a client became active.
    ///
    /// # Errors
    ///
    /// Returns an error when the event cannot be serialized or the
    /// channel does not accept it.
    pub async fn client_activated(&self, client: &ClientId) -> Result<(), ChannelError> {
        self.emit(ClientLifecycleEvent::activated(client.clone()))
            .await
    }

    /// Announces that a client became inactive.
    ///
    /// # Errors
    ///
    /// Returns an error when the event cannot be serialized or the
    /// channel does not accept it.
    pub async fn client_deactivated(&self, client: &ClientId) -> Result<(), ChannelError> {
        self.emit(ClientLifecycleEvent::deactivated(client.clone()))
            .await
    }

    /// Announces that a client was removed entirely.
    ///
    /// # Errors
    ///
    /// Returns an error when the event cannot be serialized or the
    /// channel does not accept it.
    pub async fn client_deleted(&self, client: &ClientId) -> Result<(), ChannelError> {
        self.emit(ClientLifecycleEvent::deleted(client.clone()))
            .await
    }

    async fn emit(&self, event: ClientLifecycleEvent) -> Result<(), ChannelError> {
        let payload = serde_json::to_value(&event)
            .map_err(|err| ChannelError::Serialization(err.to_string()))?;
        let message = EventMessage {
            key: event.routing_key().to_string(),
            payload,
        };

        self.channel.publish(message).await?;

        info!(
            client_id = %event.client_id,
            kind = %event.kind,
            "Client lifecycle event published"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::InMemoryEventChannel;

    #[tokio::test]
    async fn test_published_event_carries_wire_schema() {
        let channel = Arc::new(InMemoryEventChannel::new("clientes-eventos"));
        let subscription = channel.subscribe("cuentas");
        let producer = ClientLifecycleProducer::new(channel);

        producer
            .client_deactivated(&ClientId::from("CLI-42"))
            .await
            .unwrap();

        let delivery = subscription.recv().await;
        let message = delivery.message();
        assert_eq!(message.key, "CLI-42");
        assert_eq!(message.payload["evento"], "CLIENTE_DESACTIVADO");
        assert_eq!(message.payload["clienteId"], "CLI-42");
        assert!(message.payload["fecha"].is_string());
        delivery.ack();
    }

    #[tokio::test]
    async fn test_each_transition_has_its_own_identifier() {
        let channel = Arc::new(InMemoryEventChannel::new("clientes-eventos"));
        let subscription = channel.subscribe("cuentas");
        let producer = ClientLifecycleProducer::new(channel);

        let client = ClientId::from("CLI-7");
        producer.client_activated(&client).await.unwrap();
        producer.client_deleted(&client).await.unwrap();

        let first = subscription.recv().await;
        assert_eq!(first.message().payload["evento"], "CLIENTE_ACTIVADO");
        first.ack();

        let second = subscription.recv().await;
        assert_eq!(second.message().payload["evento"], "CLIENTE_ELIMINADO");
        second.ack();
    }

    #[tokio::test]
    async fn test_publish_resolves_even_without_subscribers() {
        let channel = Arc::new(InMemoryEventChannel::new("clientes-eventos"));
        let producer = ClientLifecycleProducer::new(channel);

        producer
            .client_activated(&ClientId::from("CLI-1"))
            .await
            .unwrap();
    }
}
