//! Wire protocol for the duet pairing server
//!
//! Every WebSocket text frame carries one event encoded as
//! `{"event": "<name>", "payload": {...}}`.
//!
//! ## Client → server
//!
//! - `offer {sdp, roomId}`
//! - `answer {sdp, roomId}`
//! - `add-ice-candidate {candidate, roomId, type}`
//! - `leave-room {roomId}`
//!
//! ## Server → client
//!
//! - `lobby {}` - you are waiting for a partner
//! - `send-offer {roomId, peerName}` - you are paired, negotiation may begin
//! - `offer {sdp, roomId, peerName}` / `answer {sdp, roomId, peerName}`
//! - `add-ice-candidate {candidate, type, roomId}`
//! - `peer-disconnected {peerName}` - your partner left

#![forbid(unsafe_code)]

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// Identifier of a live connection, allocated by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub uuid::Uuid);

impl From<uuid::Uuid> for ConnectionId {
    fn from(id: uuid::Uuid) -> Self {
        ConnectionId(id)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of a 1:1 room. Sent as a string on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for RoomId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(RoomId)
    }
}

impl Serialize for RoomId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RoomId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
            Raw::Number(n) => Ok(RoomId(n)),
        }
    }
}

/// Which side of the negotiation gathered an ICE candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IceRole {
    /// Gathered by the side that sent the offer
    Sender,
    /// Gathered by the side that answered
    Receiver,
}

/// Events sent by a peer to the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// SDP offer for the other member of `room_id`
    #[serde(rename_all = "camelCase")]
    Offer { sdp: String, room_id: RoomId },
    /// SDP answer for the other member of `room_id`
    #[serde(rename_all = "camelCase")]
    Answer { sdp: String, room_id: RoomId },
    /// ICE candidate, forwarded untouched along with its role tag
    #[serde(rename_all = "camelCase")]
    AddIceCandidate {
        candidate: serde_json::Value,
        room_id: RoomId,
        #[serde(rename = "type")]
        role: IceRole,
    },
    /// End the session and go back to the waiting pool
    #[serde(rename_all = "camelCase")]
    LeaveRoom { room_id: RoomId },
}

impl ClientEvent {
    /// The room this event addresses
    pub fn room_id(&self) -> RoomId {
        match self {
            ClientEvent::Offer { room_id, .. }
            | ClientEvent::Answer { room_id, .. }
            | ClientEvent::AddIceCandidate { room_id, .. }
            | ClientEvent::LeaveRoom { room_id } => *room_id,
        }
    }
}

impl FromStr for ClientEvent {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s)
    }
}

impl fmt::Display for ClientEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

/// Events sent by the server to a peer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum ServerEvent {
    Lobby {},
    #[serde(rename_all = "camelCase")]
    SendOffer { room_id: RoomId, peer_name: String },
    #[serde(rename_all = "camelCase")]
    Offer {
        sdp: String,
        room_id: RoomId,
        peer_name: String,
    },
    #[serde(rename_all = "camelCase")]
    Answer {
        sdp: String,
        room_id: RoomId,
        peer_name: String,
    },
    #[serde(rename_all = "camelCase")]
    AddIceCandidate {
        candidate: serde_json::Value,
        #[serde(rename = "type")]
        role: IceRole,
        room_id: RoomId,
    },
    #[serde(rename_all = "camelCase")]
    PeerDisconnected { peer_name: String },
}

impl ServerEvent {
    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::Lobby {} => "lobby",
            ServerEvent::SendOffer { .. } => "send-offer",
            ServerEvent::Offer { .. } => "offer",
            ServerEvent::Answer { .. } => "answer",
            ServerEvent::AddIceCandidate { .. } => "add-ice-candidate",
            ServerEvent::PeerDisconnected { .. } => "peer-disconnected",
        }
    }
}

impl FromStr for ServerEvent {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s)
    }
}

impl fmt::Display for ServerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
