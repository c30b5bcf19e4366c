//! Registry configuration and subscription types.

use crate::fold::FoldSummary;
use crate::types::{EventId, RoomId};
use serde::{Deserialize, Serialize};

/// Configuration for a [`RoomRegistry`](super::RoomRegistry).
#[derive(Clone, Debug)]
pub struct RegistryConfig {
    /// Open a room with default presets when an event arrives for an unknown room.
    /// Default: false
    pub create_missing_rooms: bool,

    /// Max buffered updates per subscriber before it is dropped.
    /// Default: 256
    pub subscription_buffer: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            create_missing_rooms: false,
            subscription_buffer: 256,
        }
    }
}

/// Filter criteria for subscriptions.
#[derive(Clone, Debug, Default)]
pub struct SubscriptionFilter {
    /// Only these rooms (None = all rooms).
    pub room_ids: Option<Vec<RoomId>>,

    /// Also deliver events that left the state unchanged.
    pub include_ignored: bool,
}

impl SubscriptionFilter {
    /// Subscribe to every room.
    pub fn all() -> Self {
        Self::default()
    }

    /// Subscribe to specific rooms.
    pub fn rooms(room_ids: Vec<RoomId>) -> Self {
        Self {
            room_ids: Some(room_ids),
            ..Default::default()
        }
    }

    pub fn with_ignored(mut self) -> Self {
        self.include_ignored = true;
        self
    }

    pub(crate) fn matches_room(&self, room_id: &RoomId) -> bool {
        match &self.room_ids {
            Some(ids) => ids.contains(room_id),
            None => true,
        }
    }
}

/// Notifications emitted by the registry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomUpdate {
    /// A room was opened.
    Opened { room_id: RoomId },

    /// A room was closed and its state discarded.
    Closed { room_id: RoomId },

    /// A single event changed a room's state.
    Applied {
        room_id: RoomId,
        event_id: EventId,
        name: String,
    },

    /// A single event left a room's state unchanged.
    Ignored {
        room_id: RoomId,
        event_id: EventId,
        name: String,
        reason: String,
    },

    /// A batch was folded into a room's state.
    Batch {
        room_id: RoomId,
        applied: usize,
        ignored: usize,
    },

    /// Subscription was dropped.
    Dropped { reason: DropReason },
}

impl RoomUpdate {
    pub(crate) fn batch(room_id: RoomId, summary: &FoldSummary) -> Self {
        RoomUpdate::Batch {
            room_id,
            applied: summary.applied,
            ignored: summary.ignored,
        }
    }

    /// Room this update concerns, if any.
    pub fn room_id(&self) -> Option<&RoomId> {
        match self {
            RoomUpdate::Opened { room_id }
            | RoomUpdate::Closed { room_id }
            | RoomUpdate::Applied { room_id, .. }
            | RoomUpdate::Ignored { room_id, .. }
            | RoomUpdate::Batch { room_id, .. } => Some(room_id),
            RoomUpdate::Dropped { .. } => None,
        }
    }
}

/// Why a subscription was dropped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Send buffer overflowed (slow consumer).
    BufferOverflow,
    /// Explicitly unsubscribed.
    Unsubscribed,
}

/// Unique identifier for a subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Handle to manage a subscription.
pub struct SubscriptionHandle {
    pub id: SubscriptionId,
    /// Channel to receive updates.
    pub receiver: crossbeam_channel::Receiver<RoomUpdate>,
}

impl SubscriptionHandle {
    /// Receive the next update (blocking).
    pub fn recv(&self) -> Result<RoomUpdate, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an update (non-blocking).
    pub fn try_recv(&self) -> Result<RoomUpdate, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Result<RoomUpdate, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}
