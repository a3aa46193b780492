//! Error types for the pairing core

use duet_protocol::{ConnectionId, RoomId};
use thiserror::Error;

/// Errors raised inside the core. None of them are fatal; the coordinator
/// logs them and carries on.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SignalingError {
    /// The room was already torn down, or never existed
    #[error("Room {0} not found")]
    RoomNotFound(RoomId),

    /// The connection is not a member of the room it addressed
    #[error("Connection {connection} is not a member of room {room}")]
    NotInRoom {
        room: RoomId,
        connection: ConnectionId,
    },

    /// The transport handed us an id that is already registered
    #[error("Connection {0} is already registered")]
    AlreadyConnected(ConnectionId),

    /// The peer's outbound channel is closed
    #[error("Peer channel closed")]
    ChannelClosed,

    /// The peer is not draining its outbound channel; the event was dropped
    #[error("Peer is not keeping up with its outbound events")]
    SlowConsumer,

    /// Every room id the store can hand out has been used
    #[error("Room ids exhausted")]
    RoomIdsExhausted,
}

/// Errors from client requests
#[derive(Error, Debug)]
pub enum ClientRequestError {
    /// The frame could not be decoded into an event
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The event decoded but carries an unusable payload
    #[error("Malformed request: {0}")]
    Malformed(&'static str),

    /// The sending connection is not registered
    #[error("Unknown connection {0}")]
    UnknownConnection(ConnectionId),
}
