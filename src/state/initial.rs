//! Fresh room state construction.

use super::room::{Card, RoomState};
use crate::types::{RoomId, UserId};
use std::collections::BTreeMap;

/// Identity and preset fields supplied by the embedding application.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RoomPreset {
    pub room_id: RoomId,
    pub user_id: Option<UserId>,
    pub username: Option<String>,
    pub email: Option<String>,
}

impl RoomPreset {
    pub fn new(room_id: impl Into<RoomId>) -> Self {
        Self {
            room_id: room_id.into(),
            ..Default::default()
        }
    }

    pub fn with_user(mut self, user_id: impl Into<UserId>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// The deck a room starts with until a card configuration event replaces it.
pub fn default_card_config() -> Vec<Card> {
    [
        ("?", -2.0, "#bdbfbf"),
        ("1/2", 0.5, "#667a66"),
        ("1", 1.0, "#839e7a"),
        ("2", 2.0, "#8cb876"),
        ("3", 3.0, "#96ba5d"),
        ("5", 5.0, "#b0c949"),
        ("8", 8.0, "#d8d935"),
        ("13", 13.0, "#f0c030"),
        ("21", 21.0, "#f0a030"),
        ("34", 34.0, "#f17c2e"),
        ("55", 55.0, "#f05e2e"),
    ]
    .into_iter()
    .map(|(label, value, color)| Card {
        label: label.to_string(),
        value,
        color: color.to_string(),
    })
    .collect()
}

/// Build the state of a room nobody has acted in yet.
pub fn initial_state(preset: RoomPreset) -> RoomState {
    RoomState {
        room_id: preset.room_id,
        preset_user_id: preset.user_id.clone(),
        user_id: preset.user_id,
        preset_username: preset.username,
        preset_email: preset.email,
        stories: BTreeMap::new(),
        estimations: BTreeMap::new(),
        selected_story: None,
        applause: false,
        users: BTreeMap::new(),
        card_config: default_card_config(),
    }
}

impl RoomState {
    /// Alias for [`initial_state`].
    pub fn new(preset: RoomPreset) -> Self {
        initial_state(preset)
    }
}
