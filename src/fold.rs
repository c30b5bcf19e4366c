//! Batch folding of ordered event streams.
//!
//! The fold is mechanical: events are applied in the order given, with no
//! reordering, deduplication or causal checks. Only the final state is
//! returned.

use crate::events::RoomEvent;
use crate::reducer::{apply, apply_with_outcome, Outcome};
use crate::state::RoomState;

/// Counters collected while folding a batch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FoldSummary {
    /// Events that changed the state.
    pub applied: usize,
    /// Events left without effect (unknown kind or missing story/participant).
    pub ignored: usize,
}

impl FoldSummary {
    pub fn total(&self) -> usize {
        self.applied + self.ignored
    }
}

/// Apply `events` to `initial` in order and return the final state.
pub fn fold_all<'a, I>(initial: RoomState, events: I) -> RoomState
where
    I: IntoIterator<Item = &'a RoomEvent>,
{
    events.into_iter().fold(initial, |state, event| {
        tracing::trace!(event_id = %event.id, name = event.name(), "applying event");
        apply(state, event)
    })
}

/// Same as [`fold_all`], also counting applied and ignored events.
pub fn fold_with_summary<'a, I>(initial: RoomState, events: I) -> (RoomState, FoldSummary)
where
    I: IntoIterator<Item = &'a RoomEvent>,
{
    let mut summary = FoldSummary::default();
    let state = events.into_iter().fold(initial, |state, event| {
        let (next, outcome) = apply_with_outcome(state, event);
        match outcome {
            Outcome::Applied => summary.applied += 1,
            Outcome::Ignored(_) => summary.ignored += 1,
        }
        next
    });
    tracing::debug!(
        applied = summary.applied,
        ignored = summary.ignored,
        "folded event batch"
    );
    (state, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use crate::reducer::reduce;
    use crate::state::{initial_state, RoomPreset};
    use crate::types::{StoryId, Timestamp};

    fn events() -> Vec<RoomEvent> {
        vec![
            RoomEvent::new("r1", "u1", EventKind::story_added("s1", "a", "", Timestamp(1))),
            RoomEvent::new("r1", "u1", EventKind::estimate_given("s1", 3.0)),
            RoomEvent::new("r1", "u1", EventKind::estimate_given("missing", 3.0)),
            RoomEvent::new(
                "r1",
                "u1",
                EventKind::Unknown {
                    name: "futureThing".to_string(),
                    payload: serde_json::Value::Null,
                },
            ),
            RoomEvent::new("r1", "u1", EventKind::story_selected("s1")),
        ]
    }

    #[test]
    fn test_fold_matches_repeated_reduce() {
        let initial = initial_state(RoomPreset::new("r1"));
        let events = events();

        let mut expected = initial.clone();
        for event in &events {
            expected = reduce(&expected, event);
        }

        assert_eq!(fold_all(initial, &events), expected);
    }

    #[test]
    fn test_empty_batch_returns_initial() {
        let initial = initial_state(RoomPreset::new("r1"));
        let no_events: Vec<RoomEvent> = Vec::new();
        assert_eq!(fold_all(initial.clone(), &no_events), initial);
    }

    #[test]
    fn test_summary_counts() {
        let (state, summary) = fold_with_summary(initial_state(RoomPreset::new("r1")), &events());
        assert_eq!(summary, FoldSummary { applied: 3, ignored: 2 });
        assert_eq!(summary.total(), 5);
        assert_eq!(state.selected_story, Some(StoryId::new("s1")));
    }
}
