use tokio::sync::mpsc::{self, error::TrySendError};

/// Payloads a connection's writer task can fall behind by before new ones are dropped.
pub const OUTBOX_CAPACITY: usize = 64;

/// Sending side of a connection's write queue.
///
/// Delivery never waits: the payload is either queued for the connection's
/// writer task or dropped on the spot.
#[derive(Debug, Clone)]
pub struct Outbox {
    sender: mpsc::Sender<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryError {
    /// The recipient's writer is backed up.
    Full,
    /// The recipient's writer has stopped.
    Closed,
}

impl Outbox {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }

    pub fn deliver(&self, payload: String) -> Result<(), DeliveryError> {
        self.sender.try_send(payload).map_err(|err| match err {
            TrySendError::Full(_) => DeliveryError::Full,
            TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn queues_until_full() {
        let (outbox, mut inbox) = Outbox::channel(1);

        assert_eq!(outbox.deliver("first".into()), Ok(()));
        assert_eq!(outbox.deliver("second".into()), Err(DeliveryError::Full));
        assert_eq!(inbox.recv().await.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn reports_stopped_writer() {
        let (outbox, inbox) = Outbox::channel(1);
        drop(inbox);

        assert_eq!(outbox.deliver("lost".into()), Err(DeliveryError::Closed));
    }
}
