//! Subscription manager for broadcasting room updates.

use crate::error::{ProjectionError, Result};
use crossbeam_channel::{bounded, Sender};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use super::types::{DropReason, RoomUpdate, SubscriptionFilter, SubscriptionHandle, SubscriptionId};

/// Internal subscription state.
struct Subscription {
    filter: SubscriptionFilter,
    sender: Sender<RoomUpdate>,
    /// Updates allowed in flight. The channel holds one more slot for the drop notice.
    buffer: usize,
}

impl Subscription {
    /// Try to send an update. Returns false if the buffer is full or the receiver is gone.
    fn try_send(&self, update: RoomUpdate) -> bool {
        if self.sender.len() >= self.buffer {
            return false;
        }
        self.sender.try_send(update).is_ok()
    }

    fn matches(&self, update: &RoomUpdate) -> bool {
        if matches!(update, RoomUpdate::Ignored { .. }) && !self.filter.include_ignored {
            return false;
        }
        match update.room_id() {
            Some(room_id) => self.filter.matches_room(room_id),
            None => true,
        }
    }
}

/// Manages subscriptions and broadcasts updates.
pub struct SubscriptionManager {
    subscriptions: RwLock<HashMap<SubscriptionId, Subscription>>,
    next_id: AtomicU64,
    buffer_size: usize,
}

impl SubscriptionManager {
    /// Create a manager whose subscribers buffer up to `buffer_size` updates.
    pub fn new(buffer_size: usize) -> Self {
        Self {
            subscriptions: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            buffer_size,
        }
    }

    /// Create a new subscription.
    pub fn subscribe(&self, filter: SubscriptionFilter) -> SubscriptionHandle {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let (sender, receiver) = bounded(self.buffer_size + 1);

        self.subscriptions.write().insert(
            id,
            Subscription {
                filter,
                sender,
                buffer: self.buffer_size,
            },
        );

        SubscriptionHandle { id, receiver }
    }

    /// Unsubscribe and clean up.
    pub fn unsubscribe(&self, id: SubscriptionId) -> Result<()> {
        let sub = self
            .subscriptions
            .write()
            .remove(&id)
            .ok_or(ProjectionError::SubscriptionDropped)?;
        // Best effort; the receiver may already be gone.
        let _ = sub.sender.try_send(RoomUpdate::Dropped {
            reason: DropReason::Unsubscribed,
        });
        Ok(())
    }

    /// Get subscription count.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.read().len()
    }

    /// Send an update to every matching subscriber. Drops subscribers that fail to receive.
    pub fn broadcast(&self, update: &RoomUpdate) {
        let mut to_remove = Vec::new();

        {
            let subs = self.subscriptions.read();
            for (id, sub) in subs.iter() {
                if sub.matches(update) && !sub.try_send(update.clone()) {
                    to_remove.push(*id);
                }
            }
        }

        if !to_remove.is_empty() {
            let mut subs = self.subscriptions.write();
            for id in to_remove {
                if let Some(sub) = subs.remove(&id) {
                    tracing::debug!(subscription = id.0, "dropping slow subscriber");
                    let _ = sub.sender.try_send(RoomUpdate::Dropped {
                        reason: DropReason::BufferOverflow,
                    });
                }
            }
        }
    }
}

impl Default for SubscriptionManager {
    fn default() -> Self {
        Self::new(super::RegistryConfig::default().subscription_buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EventId, RoomId};
    use std::time::Duration;

    fn applied(room: &str, event: &str) -> RoomUpdate {
        RoomUpdate::Applied {
            room_id: RoomId::new(room),
            event_id: EventId::new(event),
            name: "storyAdded".to_string(),
        }
    }

    #[test]
    fn test_subscribe_unsubscribe() {
        let manager = SubscriptionManager::default();

        let handle = manager.subscribe(SubscriptionFilter::all());
        assert_eq!(manager.subscription_count(), 1);

        manager.unsubscribe(handle.id).unwrap();
        assert_eq!(manager.subscription_count(), 0);
        assert!(matches!(
            handle.try_recv(),
            Ok(RoomUpdate::Dropped {
                reason: DropReason::Unsubscribed
            })
        ));

        assert!(manager.unsubscribe(handle.id).is_err());
    }

    #[test]
    fn test_broadcast_filters_by_room() {
        let manager = SubscriptionManager::default();
        let handle = manager.subscribe(SubscriptionFilter::rooms(vec![RoomId::new("r1")]));

        manager.broadcast(&applied("r2", "e1"));
        manager.broadcast(&applied("r1", "e2"));

        let update = handle.recv_timeout(Duration::from_millis(100)).unwrap();
        assert_eq!(update, applied("r1", "e2"));
        assert!(handle.recv_timeout(Duration::from_millis(50)).is_err());
    }

    #[test]
    fn test_ignored_updates_are_opt_in() {
        let manager = SubscriptionManager::default();
        let plain = manager.subscribe(SubscriptionFilter::all());
        let verbose = manager.subscribe(SubscriptionFilter::all().with_ignored());

        let ignored = RoomUpdate::Ignored {
            room_id: RoomId::new("r1"),
            event_id: EventId::new("e1"),
            name: "somethingNew".to_string(),
            reason: "unknown".to_string(),
        };
        manager.broadcast(&ignored);

        assert!(plain.try_recv().is_err());
        assert_eq!(verbose.try_recv().unwrap(), ignored);
    }

    #[test]
    fn test_drop_slow_subscriber() {
        let manager = SubscriptionManager::new(2);
        let handle = manager.subscribe(SubscriptionFilter::all());

        for i in 0..10 {
            manager.broadcast(&applied("r1", &format!("e{}", i)));
        }

        assert_eq!(manager.subscription_count(), 0);
        let received: Vec<_> = handle.receiver.try_iter().collect();
        assert_eq!(
            received,
            vec![
                applied("r1", "e0"),
                applied("r1", "e1"),
                RoomUpdate::Dropped {
                    reason: DropReason::BufferOverflow
                },
            ]
        );
    }
}
