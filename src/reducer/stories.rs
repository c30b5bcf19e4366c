//! Story and estimation transitions.

use super::{IgnoreReason, Outcome};
use crate::events::{ConsensusAchieved, EstimateGiven, StoryAdded, StoryChanged, StorySelected};
use crate::state::{RoomState, Story};
use crate::types::{StoryId, UserId};

fn missing(id: &StoryId) -> Outcome {
    Outcome::Ignored(IgnoreReason::MissingStory(id.clone()))
}

/// Run `f` against the story if it exists.
fn modify<F>(state: &mut RoomState, id: &StoryId, f: F) -> Outcome
where
    F: FnOnce(&mut Story),
{
    match state.story_mut(id) {
        Some(story) => {
            f(story);
            Outcome::Applied
        }
        None => missing(id),
    }
}

pub(super) fn added(state: &mut RoomState, p: &StoryAdded) -> Outcome {
    let story = Story {
        estimations: Some(p.estimations.clone().unwrap_or_default()),
        ..Story::new(
            p.story_id.clone(),
            p.title.clone(),
            p.description.clone(),
            p.created_at,
        )
    };
    state.stories.insert(p.story_id.clone(), story);
    Outcome::Applied
}

pub(super) fn selected(state: &mut RoomState, p: &StorySelected) -> Outcome {
    state.selected_story = p.story_id.clone();
    Outcome::Applied
}

pub(super) fn changed(state: &mut RoomState, p: &StoryChanged) -> Outcome {
    modify(state, &p.story_id, |story| {
        story.title = p.title.clone();
        story.description = p.description.clone();
        story.edit_mode = Some(false);
    })
}

pub(super) fn set_trashed(state: &mut RoomState, id: &StoryId, trashed: bool) -> Outcome {
    modify(state, id, |story| story.trashed = Some(trashed))
}

pub(super) fn deleted(state: &mut RoomState, id: &StoryId) -> Outcome {
    let story = state.stories.remove(id);
    let votes = state.estimations.remove(id);
    if story.is_none() && votes.is_none() {
        return missing(id);
    }
    Outcome::Applied
}

pub(super) fn estimate_given(state: &mut RoomState, user: &UserId, p: &EstimateGiven) -> Outcome {
    if !state.stories.contains_key(&p.story_id) {
        return missing(&p.story_id);
    }
    state
        .estimations
        .entry(p.story_id.clone())
        .or_default()
        .insert(user.clone(), p.value);
    Outcome::Applied
}

/// Retracts one participant's vote. The story's map stays, possibly empty.
pub(super) fn estimate_cleared(state: &mut RoomState, user: &UserId, id: &StoryId) -> Outcome {
    if !state.stories.contains_key(id) {
        return missing(id);
    }
    state.estimations.entry(id.clone()).or_default().remove(user);
    Outcome::Applied
}

pub(super) fn revealed(state: &mut RoomState, id: &StoryId) -> Outcome {
    modify(state, id, |story| story.revealed = Some(true))
}

pub(super) fn consensus_achieved(state: &mut RoomState, p: &ConsensusAchieved) -> Outcome {
    let outcome = modify(state, &p.story_id, |story| story.consensus = Some(p.value));
    if outcome.is_applied() {
        state.applause = true;
    }
    outcome
}

/// Resets the round: the story's votes are removed by key, not emptied.
pub(super) fn new_round_started(state: &mut RoomState, id: &StoryId) -> Outcome {
    let outcome = modify(state, id, |story| {
        story.consensus = None;
        story.revealed = Some(false);
    });
    if outcome.is_applied() {
        state.estimations.remove(id);
        state.applause = false;
    }
    outcome
}
