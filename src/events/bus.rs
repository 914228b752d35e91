use super::sink::ChaincodeEvent;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::{Level, event};

/// Fan-out of committed events to whoever is listening.
///
/// Delivery is fire-and-forget: no acknowledgement, no retry, and
/// publishing with no subscribers is not an error.
pub struct EventBus {
    sender: broadcast::Sender<ChaincodeEvent>,
    published: AtomicU64,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            published: AtomicU64::new(0),
        }
    }

    pub fn subscribe(&self) -> EventSubscription {
        EventSubscription {
            receiver: self.sender.subscribe(),
            topic: None,
        }
    }

    /// Subscription that only yields events for one station topic.
    pub fn subscribe_topic(&self, topic: impl Into<String>) -> EventSubscription {
        EventSubscription {
            receiver: self.sender.subscribe(),
            topic: Some(topic.into()),
        }
    }

    /// Deliver a committed transaction's events in order.
    pub fn publish(&self, events: Vec<ChaincodeEvent>) {
        for item in events {
            let topic = item.topic.clone();
            self.published.fetch_add(1, Ordering::SeqCst);
            if self.sender.send(item).is_err() {
                event!(Level::DEBUG, topic = %topic, "event published with no subscribers");
            }
        }
    }

    pub fn published_count(&self) -> u64 {
        self.published.load(Ordering::SeqCst)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

pub struct EventSubscription {
    receiver: broadcast::Receiver<ChaincodeEvent>,
    topic: Option<String>,
}

impl EventSubscription {
    fn accepts(&self, item: &ChaincodeEvent) -> bool {
        self.topic.as_deref().is_none_or(|topic| topic == item.topic)
    }

    /// Wait for the next matching event; `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<ChaincodeEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(item) if self.accepts(&item) => return Some(item),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    event!(Level::WARN, skipped, "event subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next matching event already delivered, without waiting.
    pub fn try_recv(&mut self) -> Option<ChaincodeEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(item) if self.accepts(&item) => return Some(item),
                Ok(_) => continue,
                Err(TryRecvError::Lagged(skipped)) => {
                    event!(Level::WARN, skipped, "event subscriber lagged");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    /// Every matching event delivered so far.
    pub fn drain(&mut self) -> Vec<ChaincodeEvent> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}
