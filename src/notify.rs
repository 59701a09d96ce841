use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::model::BedEvent;

const CHANNEL_CAPACITY: usize = 256;

/// Broadcast hub for per-room bed events. Views subscribe to the rooms they
/// render and re-render at least once per received event.
pub struct NotifyHub {
    channels: DashMap<String, broadcast::Sender<BedEvent>>,
}

impl Default for NotifyHub {
    fn default() -> Self {
        Self::new()
    }
}

impl NotifyHub {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
        }
    }

    /// Subscribe to events for a room. Creates the channel if needed.
    pub fn subscribe(&self, room_no: &str) -> broadcast::Receiver<BedEvent> {
        let sender = self
            .channels
            .entry(room_no.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0);
        sender.subscribe()
    }

    /// Send an event. No-op if nobody is listening on the room.
    pub fn send(&self, room_no: &str, event: &BedEvent) {
        if let Some(sender) = self.channels.get(room_no) {
            let _ = sender.send(event.clone());
        }
    }

    /// Remove a room's channel (e.g. when the room leaves the inventory).
    pub fn remove(&self, room_no: &str) {
        self.channels.remove(room_no);
    }
}
