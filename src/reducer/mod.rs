//! The event reducer.
//!
//! `reduce` computes the next room state from the current one and exactly one
//! event. It is total: unknown kinds and events whose story or participant is
//! missing leave the state unchanged instead of failing, so a fold over a
//! batch always reaches the end.

mod stories;
mod users;

use crate::events::{EventKind, RoomEvent};
use crate::state::RoomState;
use crate::types::{StoryId, UserId};

/// Why an event left the state unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The event name is not one this reducer handles.
    UnknownKind(String),
    /// The referenced story is not in the room.
    MissingStory(StoryId),
    /// The referenced participant is not in the room.
    MissingUser(UserId),
}

/// What a single reducer step did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Ignored(IgnoreReason),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

/// Compute the state that follows `event`. The input is left untouched.
pub fn reduce(state: &RoomState, event: &RoomEvent) -> RoomState {
    apply(state.clone(), event)
}

/// Owned variant of [`reduce`], used by the fold to avoid a clone per step.
pub fn apply(state: RoomState, event: &RoomEvent) -> RoomState {
    apply_with_outcome(state, event).0
}

/// Like [`apply`], also reporting whether the event changed anything.
pub fn apply_with_outcome(mut state: RoomState, event: &RoomEvent) -> (RoomState, Outcome) {
    let outcome = step(&mut state, event);
    if let Outcome::Ignored(reason) = &outcome {
        tracing::debug!(
            event_id = %event.id,
            name = event.name(),
            reason = ?reason,
            "event ignored"
        );
    }
    (state, outcome)
}

fn step(state: &mut RoomState, event: &RoomEvent) -> Outcome {
    match &event.kind {
        EventKind::StoryAdded(p) => stories::added(state, p),
        EventKind::StorySelected(p) => stories::selected(state, p),
        EventKind::StoryChanged(p) => stories::changed(state, p),
        EventKind::StoryTrashed(p) => stories::set_trashed(state, &p.story_id, true),
        EventKind::StoryRestored(p) => stories::set_trashed(state, &p.story_id, false),
        EventKind::StoryDeleted(p) => stories::deleted(state, &p.story_id),
        EventKind::StoryEstimateGiven(p) => stories::estimate_given(state, &event.user_id, p),
        EventKind::StoryEstimateCleared(p) => {
            stories::estimate_cleared(state, &event.user_id, &p.story_id)
        }
        EventKind::Revealed(p) => stories::revealed(state, &p.story_id),
        EventKind::ConsensusAchieved(p) => stories::consensus_achieved(state, p),
        EventKind::NewEstimationRoundStarted(p) => stories::new_round_started(state, &p.story_id),

        EventKind::JoinedRoom(p) => users::joined(state, &event.user_id, p),
        EventKind::LeftRoom => users::remove(state, &event.user_id),
        EventKind::ConnectionLost => users::connection_lost(state, &event.user_id),
        EventKind::Kicked(p) => users::remove(state, users::target(p, &event.user_id)),
        EventKind::UsernameSet(p) => users::modify(state, &event.user_id, |u| {
            u.username = Some(p.username.clone())
        }),
        EventKind::EmailSet(p) => {
            users::modify(state, &event.user_id, |u| u.email = Some(p.email.clone()))
        }
        EventKind::AvatarSet(p) => {
            users::modify(state, &event.user_id, |u| u.avatar = Some(p.avatar))
        }
        EventKind::ExcludedFromEstimations(p) => {
            users::modify(state, users::target(p, &event.user_id), |u| u.excluded = true)
        }
        EventKind::IncludedInEstimations(p) => {
            users::modify(state, users::target(p, &event.user_id), |u| u.excluded = false)
        }
        EventKind::CardConfigSet(p) => {
            state.card_config = p.card_config.clone();
            Outcome::Applied
        }

        EventKind::Unknown { name, .. } => Outcome::Ignored(IgnoreReason::UnknownKind(name.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{initial_state, RoomPreset};
    use crate::types::Timestamp;

    fn room() -> RoomState {
        initial_state(RoomPreset::new("r1").with_user("u1"))
    }

    fn event(kind: EventKind) -> RoomEvent {
        RoomEvent::new("r1", "u1", kind)
    }

    #[test]
    fn test_unknown_kind_is_identity() {
        let state = room();
        let unknown = event(EventKind::Unknown {
            name: "somethingNew".to_string(),
            payload: serde_json::json!({"x": 1}),
        });

        let (next, outcome) = apply_with_outcome(state.clone(), &unknown);
        assert_eq!(next, state);
        assert_eq!(
            outcome,
            Outcome::Ignored(IgnoreReason::UnknownKind("somethingNew".to_string()))
        );
    }

    #[test]
    fn test_reduce_leaves_input_untouched() {
        let state = room();
        let before = state.clone();
        let next = reduce(
            &state,
            &event(EventKind::story_added("s1", "t", "d", Timestamp(1))),
        );
        assert_eq!(state, before);
        assert!(next.stories.contains_key(&StoryId::new("s1")));
    }

    #[test]
    fn test_missing_story_reports_reason() {
        let (next, outcome) = apply_with_outcome(room(), &event(EventKind::revealed("nope")));
        assert_eq!(next, room());
        assert_eq!(
            outcome,
            Outcome::Ignored(IgnoreReason::MissingStory(StoryId::new("nope")))
        );
    }

    #[test]
    fn test_card_config_replaced() {
        let deck = vec![crate::state::Card {
            label: "XL".to_string(),
            value: 40.0,
            color: "#000".to_string(),
        }];
        let next = apply(
            room(),
            &event(EventKind::CardConfigSet(crate::events::CardConfigSet {
                card_config: deck.clone(),
            })),
        );
        assert_eq!(next.card_config, deck);
    }
}
