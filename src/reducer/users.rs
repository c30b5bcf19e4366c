//! Participant lifecycle transitions. These only touch `users`.

use super::{IgnoreReason, Outcome};
use crate::events::{JoinedRoom, UserRef};
use crate::state::{RoomState, User};
use crate::types::UserId;

/// The participant an event targets: the payload's user, else the author.
pub(super) fn target<'a>(p: &'a UserRef, author: &'a UserId) -> &'a UserId {
    p.user_id.as_ref().unwrap_or(author)
}

pub(super) fn modify<F>(state: &mut RoomState, id: &UserId, f: F) -> Outcome
where
    F: FnOnce(&mut User),
{
    match state.users.get_mut(id) {
        Some(user) => {
            f(user);
            Outcome::Applied
        }
        None => Outcome::Ignored(IgnoreReason::MissingUser(id.clone())),
    }
}

/// Joining twice (e.g. after a reconnect) keeps what is already known.
pub(super) fn joined(state: &mut RoomState, id: &UserId, p: &JoinedRoom) -> Outcome {
    let user = state
        .users
        .entry(id.clone())
        .or_insert_with(|| User::new(id.clone()));
    user.disconnected = false;
    if let Some(username) = &p.username {
        user.username = Some(username.clone());
    }
    if let Some(email) = &p.email {
        user.email = Some(email.clone());
    }
    if let Some(avatar) = p.avatar {
        user.avatar = Some(avatar);
    }
    Outcome::Applied
}

pub(super) fn remove(state: &mut RoomState, id: &UserId) -> Outcome {
    match state.users.remove(id) {
        Some(_) => Outcome::Applied,
        None => Outcome::Ignored(IgnoreReason::MissingUser(id.clone())),
    }
}

pub(super) fn connection_lost(state: &mut RoomState, id: &UserId) -> Outcome {
    modify(state, id, |user| user.disconnected = true)
}
