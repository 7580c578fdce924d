//! Single-process bus backed by `std::sync::mpsc` channels.

use std::sync::{Mutex, PoisonError, mpsc};

use thiserror::Error;

use crate::bus::{EventBus, Subscription};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    /// A publisher panicked while holding the subscriber list.
    #[error("subscriber list poisoned")]
    Poisoned,
}

/// Broadcast bus for requisition envelopes.
///
/// Senders whose receiver was dropped are pruned on the next publish.
#[derive(Debug)]
pub struct InMemoryEventBus<M> {
    senders: Mutex<Vec<mpsc::Sender<M>>>,
}

impl<M> InMemoryEventBus<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of subscriptions registered, including ones dropped since the
    /// last publish.
    pub fn subscriber_count(&self) -> usize {
        self.senders.lock().map(|s| s.len()).unwrap_or(0)
    }
}

impl<M> Default for InMemoryEventBus<M> {
    fn default() -> Self {
        Self {
            senders: Mutex::new(Vec::new()),
        }
    }
}

impl<M> EventBus<M> for InMemoryEventBus<M>
where
    M: Clone + Send + 'static,
{
    type Error = BusError;

    fn publish(&self, message: M) -> Result<usize, BusError> {
        let mut senders = self.senders.lock().map_err(|_| BusError::Poisoned)?;

        let before = senders.len();
        senders.retain(|tx| tx.send(message.clone()).is_ok());
        let delivered = senders.len();
        if delivered < before {
            tracing::debug!(pruned = before - delivered, "dropped subscribers pruned");
        }

        Ok(delivered)
    }

    fn subscribe(&self) -> Subscription<M> {
        let (tx, rx) = mpsc::channel();
        // Registering a sender cannot leave the list half-updated.
        let mut senders = self.senders.lock().unwrap_or_else(PoisonError::into_inner);
        senders.push(tx);
        Subscription::new(rx)
    }
}
