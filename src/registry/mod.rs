//! Per-room projections shared by an embedding application.
//!
//! The registry keeps one [`RoomState`] per room and applies events in the
//! order its dispatch methods are called. It does not establish that order;
//! callers serialize each room's stream before handing it over.
//!
//! # Example
//!
//! ```ignore
//! let registry = RoomRegistry::new(RegistryConfig::default());
//! registry.open_room(RoomPreset::new("room-1").with_user("u1"))?;
//!
//! let updates = registry.subscribe(SubscriptionFilter::rooms(vec!["room-1".into()]));
//! registry.dispatch(&event)?;
//!
//! let state = registry.snapshot(&"room-1".into()).unwrap();
//! ```

mod subscriptions;
mod types;

pub use subscriptions::SubscriptionManager;
pub use types::{
    DropReason, RegistryConfig, RoomUpdate, SubscriptionFilter, SubscriptionHandle, SubscriptionId,
};

use crate::error::{ProjectionError, Result};
use crate::events::RoomEvent;
use crate::fold::{fold_with_summary, FoldSummary};
use crate::reducer::{apply_with_outcome, Outcome};
use crate::state::{initial_state, RoomPreset, RoomState};
use crate::types::{Fingerprint, RoomId};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Holds the projected state of every open room.
pub struct RoomRegistry {
    config: RegistryConfig,
    rooms: RwLock<HashMap<RoomId, RoomState>>,
    subscriptions: SubscriptionManager,
}

impl RoomRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        let subscriptions = SubscriptionManager::new(config.subscription_buffer);
        Self {
            config,
            rooms: RwLock::new(HashMap::new()),
            subscriptions,
        }
    }

    // --- Room Lifecycle ---

    /// Open a room with fresh state.
    pub fn open_room(&self, preset: RoomPreset) -> Result<()> {
        let mut rooms = self.rooms.write();
        if rooms.contains_key(&preset.room_id) {
            return Err(ProjectionError::RoomExists(preset.room_id));
        }
        let room_id = preset.room_id.clone();
        rooms.insert(room_id.clone(), initial_state(preset));
        tracing::debug!(room = %room_id, "room opened");
        self.subscriptions.broadcast(&RoomUpdate::Opened { room_id });
        Ok(())
    }

    /// Close a room, returning its last state.
    pub fn close_room(&self, room_id: &RoomId) -> Option<RoomState> {
        let state = self.rooms.write().remove(room_id)?;
        tracing::debug!(room = %room_id, "room closed");
        self.subscriptions.broadcast(&RoomUpdate::Closed {
            room_id: room_id.clone(),
        });
        Some(state)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.read().len()
    }

    /// Ids of all open rooms, sorted.
    pub fn room_ids(&self) -> Vec<RoomId> {
        let mut ids: Vec<RoomId> = self.rooms.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    // --- Dispatch ---

    /// Apply a single event to the room it names.
    pub fn dispatch(&self, event: &RoomEvent) -> Result<Outcome> {
        let mut rooms = self.rooms.write();
        let state = self.take_room(&mut rooms, &event.room_id)?;

        let (next, outcome) = apply_with_outcome(state, event);
        rooms.insert(event.room_id.clone(), next);

        let update = match &outcome {
            Outcome::Applied => RoomUpdate::Applied {
                room_id: event.room_id.clone(),
                event_id: event.id.clone(),
                name: event.name().to_string(),
            },
            Outcome::Ignored(reason) => RoomUpdate::Ignored {
                room_id: event.room_id.clone(),
                event_id: event.id.clone(),
                name: event.name().to_string(),
                reason: format!("{:?}", reason),
            },
        };
        // Broadcast under the lock so updates reach subscribers in application order.
        self.subscriptions.broadcast(&update);
        Ok(outcome)
    }

    /// Fold a batch into one room.
    ///
    /// Every event must belong to `room_id`; otherwise nothing is applied.
    pub fn dispatch_batch(&self, room_id: &RoomId, events: &[RoomEvent]) -> Result<FoldSummary> {
        if let Some(foreign) = events.iter().find(|e| &e.room_id != room_id) {
            return Err(ProjectionError::RoomMismatch {
                expected: room_id.clone(),
                got: foreign.room_id.clone(),
            });
        }

        let mut rooms = self.rooms.write();
        let state = self.take_room(&mut rooms, room_id)?;

        let (next, summary) = fold_with_summary(state, events);
        rooms.insert(room_id.clone(), next);

        self.subscriptions
            .broadcast(&RoomUpdate::batch(room_id.clone(), &summary));
        Ok(summary)
    }

    /// Remove a room's state for updating, opening it first if configured to.
    fn take_room(
        &self,
        rooms: &mut HashMap<RoomId, RoomState>,
        room_id: &RoomId,
    ) -> Result<RoomState> {
        if let Some(state) = rooms.remove(room_id) {
            return Ok(state);
        }
        if self.config.create_missing_rooms {
            tracing::debug!(room = %room_id, "opening room on first event");
            self.subscriptions.broadcast(&RoomUpdate::Opened {
                room_id: room_id.clone(),
            });
            return Ok(initial_state(RoomPreset::new(room_id.clone())));
        }
        Err(ProjectionError::RoomNotFound(room_id.clone()))
    }

    // --- Reads ---

    /// Copy of a room's current state.
    pub fn snapshot(&self, room_id: &RoomId) -> Option<RoomState> {
        self.rooms.read().get(room_id).cloned()
    }

    /// Fingerprint of a room's current state.
    pub fn fingerprint(&self, room_id: &RoomId) -> Result<Fingerprint> {
        let rooms = self.rooms.read();
        let state = rooms
            .get(room_id)
            .ok_or_else(|| ProjectionError::RoomNotFound(room_id.clone()))?;
        state.fingerprint()
    }

    // --- Subscriptions ---

    pub fn subscribe(&self, filter: SubscriptionFilter) -> SubscriptionHandle {
        self.subscriptions.subscribe(filter)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> Result<()> {
        self.subscriptions.unsubscribe(id)
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.subscription_count()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use crate::types::{StoryId, Timestamp};

    fn rid(id: &str) -> RoomId {
        RoomId::new(id)
    }

    #[test]
    fn test_open_twice_fails() {
        let registry = RoomRegistry::default();
        registry.open_room(RoomPreset::new("r1")).unwrap();
        assert!(matches!(
            registry.open_room(RoomPreset::new("r1")),
            Err(ProjectionError::RoomExists(_))
        ));
        assert_eq!(registry.room_count(), 1);
    }

    #[test]
    fn test_dispatch_to_unknown_room() {
        let registry = RoomRegistry::default();
        let event = RoomEvent::new("r1", "u1", EventKind::story_selected("s1"));
        assert!(matches!(
            registry.dispatch(&event),
            Err(ProjectionError::RoomNotFound(_))
        ));
    }

    #[test]
    fn test_dispatch_creates_room_when_configured() {
        let registry = RoomRegistry::new(RegistryConfig {
            create_missing_rooms: true,
            ..Default::default()
        });
        let event = RoomEvent::new("r1", "u1", EventKind::story_selected("s1"));

        assert_eq!(registry.dispatch(&event).unwrap(), Outcome::Applied);
        let state = registry.snapshot(&rid("r1")).unwrap();
        assert_eq!(state.selected_story, Some(StoryId::new("s1")));
    }

    #[test]
    fn test_rooms_are_isolated() {
        let registry = RoomRegistry::default();
        registry.open_room(RoomPreset::new("r1")).unwrap();
        registry.open_room(RoomPreset::new("r2")).unwrap();

        registry
            .dispatch(&RoomEvent::new(
                "r1",
                "u1",
                EventKind::story_added("s1", "t", "d", Timestamp(1)),
            ))
            .unwrap();

        assert_eq!(registry.snapshot(&rid("r1")).unwrap().stories.len(), 1);
        assert!(registry.snapshot(&rid("r2")).unwrap().stories.is_empty());
        assert_ne!(
            registry.fingerprint(&rid("r1")).unwrap(),
            registry.fingerprint(&rid("r2")).unwrap()
        );
    }

    #[test]
    fn test_batch_rejects_foreign_events_atomically() {
        let registry = RoomRegistry::default();
        registry.open_room(RoomPreset::new("r1")).unwrap();
        let before = registry.snapshot(&rid("r1")).unwrap();

        let events = vec![
            RoomEvent::new("r1", "u1", EventKind::story_added("s1", "t", "d", Timestamp(1))),
            RoomEvent::new("r2", "u1", EventKind::story_selected("s1")),
        ];
        let err = registry.dispatch_batch(&rid("r1"), &events).unwrap_err();
        assert!(matches!(err, ProjectionError::RoomMismatch { .. }));
        assert_eq!(registry.snapshot(&rid("r1")).unwrap(), before);
    }

    #[test]
    fn test_close_room_returns_state() {
        let registry = RoomRegistry::default();
        registry.open_room(RoomPreset::new("r1")).unwrap();
        assert!(registry.close_room(&rid("r1")).is_some());
        assert!(registry.close_room(&rid("r1")).is_none());
        assert!(registry.room_ids().is_empty());
    }
}
