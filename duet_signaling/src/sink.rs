//! Outbound delivery seam between the core and the transport

use crate::error::SignalingError;
use duet_protocol::ServerEvent;
use tokio::sync::mpsc::{self, Sender, UnboundedSender};

/// Something that accepts events destined for a single connection.
///
/// Implementations must not block: the core calls `send` while holding its
/// lock, and delivery to the wire happens elsewhere.
pub trait PeerSink: Send + Sync + 'static {
    fn send(&self, event: ServerEvent) -> Result<(), SignalingError>;
}

/// Bounded channel; a full channel drops the event instead of waiting.
impl PeerSink for Sender<ServerEvent> {
    fn send(&self, event: ServerEvent) -> Result<(), SignalingError> {
        self.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SignalingError::SlowConsumer,
            mpsc::error::TrySendError::Closed(_) => SignalingError::ChannelClosed,
        })
    }
}

impl PeerSink for UnboundedSender<ServerEvent> {
    fn send(&self, event: ServerEvent) -> Result<(), SignalingError> {
        UnboundedSender::send(self, event).map_err(|_| SignalingError::ChannelClosed)
    }
}
