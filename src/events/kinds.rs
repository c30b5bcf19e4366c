//! Typed event kinds and their payloads.

use crate::error::{ProjectionError, Result};
use crate::state::{Card, Estimations};
use crate::types::{EstimateValue, StoryId, Timestamp, UserId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

// --- Story payloads ---

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryAdded {
    pub story_id: StoryId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub created_at: Timestamp,
    /// Copied verbatim into the story's legacy estimation record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimations: Option<Estimations>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorySelected {
    /// `None` deselects.
    #[serde(default)]
    pub story_id: Option<StoryId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryChanged {
    pub story_id: StoryId,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Payload of events that only name a story.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryRef {
    pub story_id: StoryId,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateGiven {
    pub story_id: StoryId,
    pub value: EstimateValue,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Revealed {
    pub story_id: StoryId,
    /// Whether a participant revealed by hand rather than by everyone voting.
    #[serde(default)]
    pub manually: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsensusAchieved {
    pub story_id: StoryId,
    pub value: EstimateValue,
}

// --- Participant payloads ---

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinedRoom {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<u32>,
}

/// Payload naming another participant. Defaults to the event's author when absent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UsernameSet {
    pub username: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmailSet {
    pub email: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AvatarSet {
    pub avatar: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardConfigSet {
    pub card_config: Vec<Card>,
}

/// Every transition the reducer knows about.
///
/// Names not listed here decode to [`EventKind::Unknown`] and are ignored by
/// the reducer.
#[derive(Clone, Debug, PartialEq)]
pub enum EventKind {
    StoryAdded(StoryAdded),
    StorySelected(StorySelected),
    StoryChanged(StoryChanged),
    StoryTrashed(StoryRef),
    StoryRestored(StoryRef),
    StoryDeleted(StoryRef),
    StoryEstimateGiven(EstimateGiven),
    StoryEstimateCleared(StoryRef),
    Revealed(Revealed),
    ConsensusAchieved(ConsensusAchieved),
    NewEstimationRoundStarted(StoryRef),

    JoinedRoom(JoinedRoom),
    LeftRoom,
    ConnectionLost,
    Kicked(UserRef),
    UsernameSet(UsernameSet),
    EmailSet(EmailSet),
    AvatarSet(AvatarSet),
    ExcludedFromEstimations(UserRef),
    IncludedInEstimations(UserRef),
    CardConfigSet(CardConfigSet),

    Unknown {
        name: String,
        payload: serde_json::Value,
    },
}

fn payload<T: DeserializeOwned>(name: &str, value: serde_json::Value) -> Result<T> {
    // Senders omit the payload for events that carry no data.
    let value = if value.is_null() {
        serde_json::Value::Object(Default::default())
    } else {
        value
    };
    serde_json::from_value(value).map_err(|e| ProjectionError::InvalidPayload {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

fn to_value<T: Serialize>(payload: &T) -> Result<serde_json::Value> {
    serde_json::to_value(payload).map_err(|e| ProjectionError::Serialization(e.to_string()))
}

impl EventKind {
    /// Wire name of this kind.
    pub fn name(&self) -> &str {
        match self {
            EventKind::StoryAdded(_) => "storyAdded",
            EventKind::StorySelected(_) => "storySelected",
            EventKind::StoryChanged(_) => "storyChanged",
            EventKind::StoryTrashed(_) => "storyTrashed",
            EventKind::StoryRestored(_) => "storyRestored",
            EventKind::StoryDeleted(_) => "storyDeleted",
            EventKind::StoryEstimateGiven(_) => "storyEstimateGiven",
            EventKind::StoryEstimateCleared(_) => "storyEstimateCleared",
            EventKind::Revealed(_) => "revealed",
            EventKind::ConsensusAchieved(_) => "consensusAchieved",
            EventKind::NewEstimationRoundStarted(_) => "newEstimationRoundStarted",
            EventKind::JoinedRoom(_) => "joinedRoom",
            EventKind::LeftRoom => "leftRoom",
            EventKind::ConnectionLost => "connectionLost",
            EventKind::Kicked(_) => "kicked",
            EventKind::UsernameSet(_) => "usernameSet",
            EventKind::EmailSet(_) => "emailSet",
            EventKind::AvatarSet(_) => "avatarSet",
            EventKind::ExcludedFromEstimations(_) => "excludedFromEstimations",
            EventKind::IncludedInEstimations(_) => "includedInEstimations",
            EventKind::CardConfigSet(_) => "cardConfigSet",
            EventKind::Unknown { name, .. } => name.as_str(),
        }
    }

    /// Decode a kind from its wire name and untyped payload.
    pub fn from_parts(name: &str, value: serde_json::Value) -> Result<Self> {
        let kind = match name {
            "storyAdded" => EventKind::StoryAdded(payload(name, value)?),
            "storySelected" => EventKind::StorySelected(payload(name, value)?),
            "storyChanged" => EventKind::StoryChanged(payload(name, value)?),
            "storyTrashed" => EventKind::StoryTrashed(payload(name, value)?),
            "storyRestored" => EventKind::StoryRestored(payload(name, value)?),
            "storyDeleted" => EventKind::StoryDeleted(payload(name, value)?),
            "storyEstimateGiven" => EventKind::StoryEstimateGiven(payload(name, value)?),
            "storyEstimateCleared" => EventKind::StoryEstimateCleared(payload(name, value)?),
            "revealed" => EventKind::Revealed(payload(name, value)?),
            "consensusAchieved" => EventKind::ConsensusAchieved(payload(name, value)?),
            "newEstimationRoundStarted" => {
                EventKind::NewEstimationRoundStarted(payload(name, value)?)
            }
            "joinedRoom" => EventKind::JoinedRoom(payload(name, value)?),
            "leftRoom" => EventKind::LeftRoom,
            "connectionLost" => EventKind::ConnectionLost,
            "kicked" => EventKind::Kicked(payload(name, value)?),
            "usernameSet" => EventKind::UsernameSet(payload(name, value)?),
            "emailSet" => EventKind::EmailSet(payload(name, value)?),
            "avatarSet" => EventKind::AvatarSet(payload(name, value)?),
            "excludedFromEstimations" => {
                EventKind::ExcludedFromEstimations(payload(name, value)?)
            }
            "includedInEstimations" => EventKind::IncludedInEstimations(payload(name, value)?),
            "cardConfigSet" => EventKind::CardConfigSet(payload(name, value)?),
            _ => EventKind::Unknown {
                name: name.to_string(),
                payload: value,
            },
        };
        Ok(kind)
    }

    /// Encode the payload back into an untyped value.
    pub fn payload_value(&self) -> Result<serde_json::Value> {
        match self {
            EventKind::StoryAdded(p) => to_value(p),
            EventKind::StorySelected(p) => to_value(p),
            EventKind::StoryChanged(p) => to_value(p),
            EventKind::StoryTrashed(p)
            | EventKind::StoryRestored(p)
            | EventKind::StoryDeleted(p)
            | EventKind::StoryEstimateCleared(p)
            | EventKind::NewEstimationRoundStarted(p) => to_value(p),
            EventKind::StoryEstimateGiven(p) => to_value(p),
            EventKind::Revealed(p) => to_value(p),
            EventKind::ConsensusAchieved(p) => to_value(p),
            EventKind::JoinedRoom(p) => to_value(p),
            EventKind::LeftRoom | EventKind::ConnectionLost => {
                Ok(serde_json::Value::Object(Default::default()))
            }
            EventKind::Kicked(p)
            | EventKind::ExcludedFromEstimations(p)
            | EventKind::IncludedInEstimations(p) => to_value(p),
            EventKind::UsernameSet(p) => to_value(p),
            EventKind::EmailSet(p) => to_value(p),
            EventKind::AvatarSet(p) => to_value(p),
            EventKind::CardConfigSet(p) => to_value(p),
            EventKind::Unknown { payload, .. } => Ok(payload.clone()),
        }
    }

    /// The story this event targets, if any.
    pub fn story_id(&self) -> Option<&StoryId> {
        match self {
            EventKind::StoryAdded(p) => Some(&p.story_id),
            EventKind::StorySelected(p) => p.story_id.as_ref(),
            EventKind::StoryChanged(p) => Some(&p.story_id),
            EventKind::StoryTrashed(p)
            | EventKind::StoryRestored(p)
            | EventKind::StoryDeleted(p)
            | EventKind::StoryEstimateCleared(p)
            | EventKind::NewEstimationRoundStarted(p) => Some(&p.story_id),
            EventKind::StoryEstimateGiven(p) => Some(&p.story_id),
            EventKind::Revealed(p) => Some(&p.story_id),
            EventKind::ConsensusAchieved(p) => Some(&p.story_id),
            _ => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, EventKind::Unknown { .. })
    }

    // --- Constructors ---

    pub fn story_added(
        story_id: impl Into<StoryId>,
        title: impl Into<String>,
        description: impl Into<String>,
        created_at: Timestamp,
    ) -> Self {
        EventKind::StoryAdded(StoryAdded {
            story_id: story_id.into(),
            title: title.into(),
            description: description.into(),
            created_at,
            estimations: Some(Estimations::new()),
        })
    }

    pub fn story_selected(story_id: impl Into<StoryId>) -> Self {
        EventKind::StorySelected(StorySelected {
            story_id: Some(story_id.into()),
        })
    }

    pub fn story_changed(
        story_id: impl Into<StoryId>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        EventKind::StoryChanged(StoryChanged {
            story_id: story_id.into(),
            title: title.into(),
            description: description.into(),
        })
    }

    pub fn story_trashed(story_id: impl Into<StoryId>) -> Self {
        EventKind::StoryTrashed(StoryRef {
            story_id: story_id.into(),
        })
    }

    pub fn story_restored(story_id: impl Into<StoryId>) -> Self {
        EventKind::StoryRestored(StoryRef {
            story_id: story_id.into(),
        })
    }

    pub fn story_deleted(story_id: impl Into<StoryId>) -> Self {
        EventKind::StoryDeleted(StoryRef {
            story_id: story_id.into(),
        })
    }

    pub fn estimate_given(story_id: impl Into<StoryId>, value: EstimateValue) -> Self {
        EventKind::StoryEstimateGiven(EstimateGiven {
            story_id: story_id.into(),
            value,
        })
    }

    pub fn estimate_cleared(story_id: impl Into<StoryId>) -> Self {
        EventKind::StoryEstimateCleared(StoryRef {
            story_id: story_id.into(),
        })
    }

    pub fn revealed(story_id: impl Into<StoryId>) -> Self {
        EventKind::Revealed(Revealed {
            story_id: story_id.into(),
            manually: false,
        })
    }

    pub fn consensus_achieved(story_id: impl Into<StoryId>, value: EstimateValue) -> Self {
        EventKind::ConsensusAchieved(ConsensusAchieved {
            story_id: story_id.into(),
            value,
        })
    }

    pub fn new_round_started(story_id: impl Into<StoryId>) -> Self {
        EventKind::NewEstimationRoundStarted(StoryRef {
            story_id: story_id.into(),
        })
    }
}
