//! # Room Projection
//!
//! Folds the ordered event stream of an estimation room into the room's
//! current state: its stories, the votes given on them, which story is under
//! discussion, and whether the latest round reached consensus.
//!
//! ## Core Concepts
//!
//! - **Events**: Immutable records `{id, userId, correlationId, roomId, name, payload}`
//! - **Reducer**: Pure, total function from (state, event) to the next state
//! - **Fold**: Left fold of the reducer over an already ordered batch
//! - **Registry**: Optional shared holder of per-room state with change subscriptions
//!
//! ## Example
//!
//! ```
//! use room_projection::{fold_all, initial_state, EventKind, RoomEvent, RoomPreset, Timestamp};
//!
//! let room = initial_state(RoomPreset::new("room-1").with_user("u1"));
//! let events = vec![
//!     RoomEvent::new("room-1", "u1", EventKind::story_added("s1", "Login", "", Timestamp(0))),
//!     RoomEvent::new("room-1", "u1", EventKind::story_selected("s1")),
//! ];
//!
//! let state = fold_all(room, &events);
//! assert_eq!(state.selected_story, Some("s1".into()));
//! ```

pub mod error;
pub mod events;
pub mod fold;
pub mod reducer;
pub mod registry;
pub mod state;
pub mod types;

// Re-exports
pub use error::{ProjectionError, Result};
pub use events::{decode_event, decode_events, EventKind, RoomEvent, WireEvent};
pub use fold::{fold_all, fold_with_summary, FoldSummary};
pub use reducer::{apply, apply_with_outcome, reduce, IgnoreReason, Outcome};
pub use registry::{
    DropReason, RegistryConfig, RoomRegistry, RoomUpdate, SubscriptionFilter, SubscriptionHandle,
    SubscriptionId,
};
pub use state::{initial_state, Card, Estimations, RoomPreset, RoomState, Story, User};
pub use types::*;
