use std::sync::Arc;

use tracing::debug;

use crate::{frame::MAX_FRAME_LEN, message::Message, outbox::DeliveryError, registry::Registry};

/// Outcome of routing one message. Never reported back to the sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Queued on the recipient's outbox. The write itself may still fail.
    Queued,
    UnknownDestination,
    /// `sender: content` would not fit in one frame on the recipient's side.
    Oversized,
    Dropped(DeliveryError),
}

#[derive(Debug, Clone)]
pub struct Router {
    registry: Arc<Registry>,
}

impl Router {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// Hands the message to its destination without waiting for the write.
    pub async fn route(&self, message: Message) -> Delivery {
        let payload = message.payload();
        if payload.len() > MAX_FRAME_LEN {
            debug!(
                sender = %message.sender,
                destination = %message.destination,
                len = payload.len(),
                "dropping message longer than one frame"
            );
            return Delivery::Oversized;
        }

        let Some(outbox) = self.registry.lookup(&message.destination).await else {
            debug!(
                sender = %message.sender,
                destination = %message.destination,
                "dropping message for unknown destination"
            );
            return Delivery::UnknownDestination;
        };

        match outbox.deliver(payload) {
            Ok(()) => Delivery::Queued,
            Err(error) => {
                debug!(
                    sender = %message.sender,
                    destination = %message.destination,
                    ?error,
                    "dropping message for unreachable destination"
                );
                Delivery::Dropped(error)
            }
        }
    }
}
