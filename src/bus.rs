//! In-process topic bus
//!
//! Topic-keyed fan-out over bounded crossbeam channels. Delivery is
//! at-least-once per local subscriber with no ordering guarantee across
//! topics; a subscriber that falls behind loses the oldest messages it
//! never drained (the daemon only cares about the latest value anyway).

use crate::messages::BusMessage;
use crossbeam_channel::{Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Messages a subscriber can buffer before the bus starts dropping for it
const SUBSCRIBER_DEPTH: usize = 64;

/// Shared handle to the process-local publish/subscribe bus
///
/// Cloning is cheap; all clones publish into the same topic table.
#[derive(Clone, Default)]
pub struct Bus {
    topics: Arc<Mutex<HashMap<String, Vec<Sender<BusMessage>>>>>,
}

impl Bus {
    pub fn new() -> Self {
        Bus::default()
    }

    /// Register a new subscriber for a topic
    ///
    /// Messages published after this call are delivered to the returned
    /// receiver; there is no replay of earlier traffic.
    pub fn subscribe(&self, topic: &str) -> Receiver<BusMessage> {
        let (tx, rx) = crossbeam_channel::bounded(SUBSCRIBER_DEPTH);
        self.topics
            .lock()
            .entry(topic.to_string())
            .or_default()
            .push(tx);
        rx
    }

    /// Publish a message to every live subscriber of a topic
    ///
    /// Subscribers whose receiving end is gone are pruned. A full
    /// subscriber queue drops this message for that subscriber only.
    pub fn publish(&self, topic: &str, message: BusMessage) {
        let mut topics = self.topics.lock();
        let Some(senders) = topics.get_mut(topic) else {
            return;
        };
        senders.retain(|tx| match tx.try_send(message.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                log::debug!("Bus subscriber on '{}' is full, dropping message", topic);
                true
            }
            Err(TrySendError::Disconnected(_)) => false,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::BatteryStatus;

    #[test]
    fn test_publish_reaches_subscriber() {
        let bus = Bus::new();
        let rx = bus.subscribe("battery");
        bus.publish(
            "battery",
            BusMessage::Battery(BatteryStatus {
                battery_voltage: 24.1,
            }),
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            BusMessage::Battery(BatteryStatus {
                battery_voltage: 24.1
            })
        );
    }

    #[test]
    fn test_no_delivery_across_topics() {
        let bus = Bus::new();
        let rx = bus.subscribe("camera");
        bus.publish("battery", BusMessage::RequestUpdate);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_fanout_to_multiple_subscribers() {
        let bus = Bus::new();
        let a = bus.subscribe("misc");
        let b = bus.subscribe("misc");
        bus.publish("misc", BusMessage::RequestUpdate);
        assert_eq!(a.try_recv().unwrap(), BusMessage::RequestUpdate);
        assert_eq!(b.try_recv().unwrap(), BusMessage::RequestUpdate);
    }

    #[test]
    fn test_dead_subscriber_is_pruned() {
        let bus = Bus::new();
        let rx = bus.subscribe("misc");
        drop(rx);
        // Must not panic or leak; the next publish drops the dead sender
        bus.publish("misc", BusMessage::RequestUpdate);
        bus.publish("misc", BusMessage::RequestUpdate);
    }
}
