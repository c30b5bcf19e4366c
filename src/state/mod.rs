//! Materialized room state.
//!
//! `RoomState` is a plain serializable value. The reducer never mutates a
//! state it was handed by reference; every step produces a new value.

mod initial;
mod room;

pub use initial::{default_card_config, initial_state, RoomPreset};
pub use room::{Card, Estimations, RoomState, Story, User};
