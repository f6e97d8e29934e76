//! Observer fan-out
//!
//! Dashboard observers register an outbound channel; every event is
//! serialized once and pushed to each observer that is still open.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::ObserverEvent;

/// Anonymous set of observer connections
pub struct Broadcaster {
    observers: DashMap<Uuid, mpsc::UnboundedSender<String>>,
}

pub type SharedBroadcaster = Arc<Broadcaster>;

impl Broadcaster {
    pub fn new() -> Self {
        Self {
            observers: DashMap::new(),
        }
    }

    pub fn shared() -> SharedBroadcaster {
        Arc::new(Self::new())
    }

    /// Add an observer and return the id used to remove it on close.
    pub fn register(&self, sender: mpsc::UnboundedSender<String>) -> Uuid {
        let observer_id = Uuid::new_v4();
        self.observers.insert(observer_id, sender);
        info!(%observer_id, total = self.observers.len(), "Observer connected");
        observer_id
    }

    pub fn unregister(&self, observer_id: Uuid) {
        if self.observers.remove(&observer_id).is_some() {
            info!(%observer_id, remaining = self.observers.len(), "Observer disconnected");
        }
    }

    /// Push `event` to every open observer. Returns the number reached.
    pub fn broadcast(&self, event: &ObserverEvent) -> usize {
        let message = match serde_json::to_string(event) {
            Ok(json) => json,
            Err(e) => {
                error!(event_type = event.event_type(), error = %e, "Failed to serialize observer event");
                return 0;
            }
        };

        let mut delivered = 0;
        for entry in self.observers.iter() {
            if entry.value().is_closed() {
                continue;
            }
            match entry.value().send(message.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => warn!(observer_id = %entry.key(), error = %e, "Failed to notify observer"),
            }
        }

        debug!(event_type = event.event_type(), delivered, "Event broadcast");
        delivered
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn broadcast_reaches_every_open_observer() {
        let broadcaster = Broadcaster::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        broadcaster.register(tx1);
        broadcaster.register(tx2);

        let delivered = broadcaster.broadcast(&ObserverEvent::Meter(json!({"connectorId": 1})));
        assert_eq!(delivered, 2);

        for rx in [&mut rx1, &mut rx2] {
            let value: Value = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
            assert_eq!(value, json!({"type": "meter", "payload": {"connectorId": 1}}));
        }
    }

    #[test]
    fn closed_observers_are_skipped() {
        let broadcaster = Broadcaster::new();
        let (open_tx, mut open_rx) = mpsc::unbounded_channel();
        let (closed_tx, closed_rx) = mpsc::unbounded_channel::<String>();
        broadcaster.register(open_tx);
        broadcaster.register(closed_tx);
        drop(closed_rx);

        assert_eq!(broadcaster.broadcast(&ObserverEvent::Meter(json!({}))), 1);
        assert!(open_rx.try_recv().is_ok());
    }

    #[test]
    fn late_observers_miss_earlier_events() {
        let broadcaster = Broadcaster::new();
        assert_eq!(broadcaster.broadcast(&ObserverEvent::Meter(json!({}))), 0);

        let (tx, mut rx) = mpsc::unbounded_channel();
        broadcaster.register(tx);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn unregister_removes_observer() {
        let broadcaster = Broadcaster::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let id = broadcaster.register(tx);
        assert_eq!(broadcaster.observer_count(), 1);
        broadcaster.unregister(id);
        assert_eq!(broadcaster.observer_count(), 0);
    }
}
