//! Room state aggregate and its parts.

use crate::error::{ProjectionError, Result};
use crate::types::{EstimateValue, Fingerprint, RoomId, StoryId, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Estimates for one story, keyed by participant.
pub type Estimations = BTreeMap<UserId, EstimateValue>;

/// A unit of work being estimated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: StoryId,
    pub title: String,
    pub description: String,
    pub created_at: Timestamp,

    /// Set once when the story is added and never touched again.
    /// Live votes are kept in `RoomState::estimations`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimations: Option<Estimations>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revealed: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consensus: Option<EstimateValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_mode: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trashed: Option<bool>,
}

impl Story {
    /// Create a story with only the required fields set.
    pub fn new(
        id: impl Into<StoryId>,
        title: impl Into<String>,
        description: impl Into<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            created_at,
            estimations: None,
            revealed: None,
            consensus: None,
            edit_mode: None,
            trashed: None,
        }
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed.unwrap_or(false)
    }

    pub fn is_trashed(&self) -> bool {
        self.trashed.unwrap_or(false)
    }

    pub fn is_in_edit_mode(&self) -> bool {
        self.edit_mode.unwrap_or(false)
    }
}

/// Participant metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<u32>,

    #[serde(default)]
    pub disconnected: bool,

    #[serde(default)]
    pub excluded: bool,
}

impl User {
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            username: None,
            email: None,
            avatar: None,
            disconnected: false,
            excluded: false,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}

/// One card of the room's estimation deck.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub label: String,
    pub value: EstimateValue,
    pub color: String,
}

/// The projected state of a single room.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomState {
    pub room_id: RoomId,

    /// The participant this projection belongs to.
    pub user_id: Option<UserId>,

    pub preset_username: Option<String>,
    pub preset_email: Option<String>,
    pub preset_user_id: Option<UserId>,

    pub stories: BTreeMap<StoryId, Story>,

    /// Live votes per story. A missing key and an empty map both mean "no votes".
    pub estimations: BTreeMap<StoryId, Estimations>,

    pub selected_story: Option<StoryId>,

    /// True while the latest round reached consensus and no new round started.
    pub applause: bool,

    pub users: BTreeMap<UserId, User>,

    pub card_config: Vec<Card>,
}

impl RoomState {
    /// Look up a story.
    pub fn story(&self, id: &StoryId) -> Option<&Story> {
        self.stories.get(id)
    }

    pub(crate) fn story_mut(&mut self, id: &StoryId) -> Option<&mut Story> {
        self.stories.get_mut(id)
    }

    /// Live estimations for a story, if any round data exists.
    pub fn estimations_for(&self, id: &StoryId) -> Option<&Estimations> {
        self.estimations.get(id)
    }

    /// The currently selected story, if it still exists.
    pub fn selected(&self) -> Option<&Story> {
        self.selected_story.as_ref().and_then(|id| self.stories.get(id))
    }

    /// Stories that are not in the trash.
    pub fn active_stories(&self) -> impl Iterator<Item = &Story> {
        self.stories.values().filter(|s| !s.is_trashed())
    }

    /// Stories that are in the trash.
    pub fn trashed_stories(&self) -> impl Iterator<Item = &Story> {
        self.stories.values().filter(|s| s.is_trashed())
    }

    /// Canonical JSON encoding of the state.
    ///
    /// All maps are ordered, so equal states always encode to equal bytes.
    pub fn to_canonical_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| ProjectionError::Serialization(e.to_string()))
    }

    /// Digest of the canonical encoding, for comparing projections across participants.
    pub fn fingerprint(&self) -> Result<Fingerprint> {
        Ok(Fingerprint::from_bytes(&self.to_canonical_json()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{initial_state, RoomPreset};
    use serde_json::json;

    #[test]
    fn test_story_omits_absent_optionals() {
        let story = Story::new("s1", "FirstStory", "description one", Timestamp(1592115935676));
        let value = serde_json::to_value(&story).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "s1",
                "title": "FirstStory",
                "description": "description one",
                "createdAt": 1592115935676i64
            })
        );
    }

    #[test]
    fn test_story_deserializes_camel_case() {
        let story: Story = serde_json::from_value(json!({
            "id": "s2",
            "title": "Second story",
            "description": "",
            "createdAt": 1,
            "editMode": true,
            "trashed": false
        }))
        .unwrap();
        assert!(story.is_in_edit_mode());
        assert!(!story.is_trashed());
        assert_eq!(story.consensus, None);
    }

    #[test]
    fn test_fingerprint_is_stable_for_equal_states() {
        let preset = RoomPreset::new("room-1");
        let a = initial_state(preset.clone());
        let b = initial_state(preset);
        assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
    }

    #[test]
    fn test_fingerprint_changes_with_content() {
        let a = initial_state(RoomPreset::new("room-1"));
        let mut b = a.clone();
        b.applause = true;
        assert_ne!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
    }

    #[test]
    fn test_selected_story_lookup() {
        let mut state = initial_state(RoomPreset::new("room-1"));
        state.selected_story = Some(StoryId::new("gone"));
        assert!(state.selected().is_none());

        let story = Story::new("s1", "t", "d", Timestamp(0));
        state.stories.insert(story.id.clone(), story);
        state.selected_story = Some(StoryId::new("s1"));
        assert_eq!(state.selected().map(|s| s.title.as_str()), Some("t"));
    }
}
