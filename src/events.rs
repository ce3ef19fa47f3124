//! Publishes domain events to NATS when a server is configured

use tracing::{debug, warn};

use crate::domain::events::DomainEvent;

/// Fire-and-forget publisher. Without NATS every event is only logged at debug, and a
/// failed publish never fails the request that raised it.
#[derive(Clone, Default)]
pub struct EventPublisher {
    nats: Option<async_nats::Client>,
}

impl EventPublisher {
    pub fn disabled() -> Self { Self::default() }

    pub async fn connect(url: Option<&str>) -> Self {
        let Some(url) = url else { return Self::disabled() };
        match async_nats::connect(url).await {
            Ok(client) => Self { nats: Some(client) },
            Err(e) => {
                warn!(url, error = %e, "NATS unreachable, domain events will not be published");
                Self::disabled()
            }
        }
    }

    pub async fn publish(&self, event: DomainEvent) {
        let subject = event.subject();
        let Some(client) = &self.nats else {
            debug!(subject, ?event, "event not published, NATS disabled");
            return;
        };
        let payload = match serde_json::to_vec(&event) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(subject, error = %e, "could not encode event");
                return;
            }
        };
        if let Err(e) = client.publish(subject.to_string(), payload.into()).await {
            warn!(subject, error = %e, "event publish failed");
        }
    }
}
