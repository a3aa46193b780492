//! Error types for the WebSocket transport

use duet_signaling::{ClientRequestError, SignalingError};
use thiserror::Error;

/// Errors that end or reject a single frame from a client
#[derive(Error, Debug)]
pub enum TransportError {
    /// Connection was closed
    #[error("Connection closed")]
    Close,

    /// Binary frames are not part of the protocol
    #[error("Unsupported message type")]
    UnsupportedType,

    /// WebSocket error
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] axum::Error),

    /// The frame was read but the core rejected it
    #[error(transparent)]
    Request(#[from] ClientRequestError),

    /// The core refused to register the connection
    #[error(transparent)]
    Signaling(#[from] SignalingError),
}
