//! Domain events and their wire format.
//!
//! Events arrive as an envelope `{id, userId, correlationId, roomId, name,
//! payload}`. The `name` selects an [`EventKind`]; names this crate does not
//! know decode to [`EventKind::Unknown`] rather than failing, so newer
//! senders can talk to older projections.

mod kinds;
mod wire;

pub use kinds::{
    AvatarSet, CardConfigSet, ConsensusAchieved, EmailSet, EstimateGiven, EventKind, JoinedRoom,
    Revealed, StoryAdded, StoryChanged, StoryRef, StorySelected, UserRef, UsernameSet,
};
pub use wire::{decode_event, decode_events, WireEvent};

use crate::types::{CorrelationId, EventId, RoomId, Timestamp, UserId};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_LOCAL_ID: AtomicU64 = AtomicU64::new(1);

/// An immutable, uniquely identified room event.
#[derive(Clone, Debug, PartialEq)]
pub struct RoomEvent {
    pub id: EventId,
    /// Participant that caused the event.
    pub user_id: UserId,
    pub correlation_id: CorrelationId,
    pub room_id: RoomId,
    pub kind: EventKind,
}

impl RoomEvent {
    /// Create an event with a locally generated id.
    ///
    /// The correlation id defaults to the event id (a chain of one).
    pub fn new(room_id: impl Into<RoomId>, user_id: impl Into<UserId>, kind: EventKind) -> Self {
        let seq = NEXT_LOCAL_ID.fetch_add(1, Ordering::Relaxed);
        let id = EventId(format!("{}-{}", Timestamp::now().0, seq));
        Self {
            correlation_id: CorrelationId(id.0.clone()),
            id,
            user_id: user_id.into(),
            room_id: room_id.into(),
            kind,
        }
    }

    pub fn with_id(mut self, id: impl Into<EventId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_correlation(mut self, correlation_id: impl Into<CorrelationId>) -> Self {
        self.correlation_id = correlation_id.into();
        self
    }

    /// Wire name of the event.
    pub fn name(&self) -> &str {
        self.kind.name()
    }
}
