//! Envelope decoding and encoding.

use super::{EventKind, RoomEvent};
use crate::error::{ProjectionError, Result};
use crate::types::{CorrelationId, EventId, PayloadEncoding, RoomId, UserId};
use serde::{Deserialize, Serialize};

/// The event envelope exactly as it travels between participants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireEvent {
    pub id: EventId,
    pub user_id: UserId,
    pub correlation_id: CorrelationId,
    pub room_id: RoomId,
    pub name: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl TryFrom<WireEvent> for RoomEvent {
    type Error = ProjectionError;

    fn try_from(wire: WireEvent) -> Result<Self> {
        let kind = EventKind::from_parts(&wire.name, wire.payload)?;
        Ok(RoomEvent {
            id: wire.id,
            user_id: wire.user_id,
            correlation_id: wire.correlation_id,
            room_id: wire.room_id,
            kind,
        })
    }
}

impl RoomEvent {
    /// Convert back into the wire envelope.
    pub fn to_wire(&self) -> Result<WireEvent> {
        Ok(WireEvent {
            id: self.id.clone(),
            user_id: self.user_id.clone(),
            correlation_id: self.correlation_id.clone(),
            room_id: self.room_id.clone(),
            name: self.kind.name().to_string(),
            payload: self.kind.payload_value()?,
        })
    }

    /// Decode a JSON envelope.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let wire: WireEvent = serde_json::from_slice(bytes)?;
        wire.try_into()
    }

    /// Decode a MessagePack envelope.
    pub fn from_msgpack(bytes: &[u8]) -> Result<Self> {
        let wire: WireEvent = rmp_serde::from_slice(bytes)?;
        wire.try_into()
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.to_wire()?)
            .map_err(|e| ProjectionError::Serialization(e.to_string()))
    }

    /// Encode as MessagePack with field names preserved.
    pub fn to_msgpack(&self) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(&self.to_wire()?)?)
    }
}

/// Decode one envelope in the given encoding.
pub fn decode_event(bytes: &[u8], encoding: PayloadEncoding) -> Result<RoomEvent> {
    match encoding {
        PayloadEncoding::Json => RoomEvent::from_json(bytes),
        PayloadEncoding::MessagePack => RoomEvent::from_msgpack(bytes),
    }
}

/// Decode a JSON array of envelopes, as delivered in a batch.
///
/// Fails on the first malformed envelope; the order of the input is kept.
pub fn decode_events(bytes: &[u8]) -> Result<Vec<RoomEvent>> {
    let wires: Vec<WireEvent> = serde_json::from_slice(bytes)?;
    wires.into_iter().map(RoomEvent::try_from).collect()
}
