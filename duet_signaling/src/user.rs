//! Registry entries for live connections

use crate::sink::PeerSink;
use duet_protocol::{ConnectionId, ServerEvent};
use std::{fmt, sync::Arc};
use tracing::warn;

/// A registered connection: who it is and how to reach it
#[derive(Clone)]
pub struct User {
    id: ConnectionId,
    name: String,
    generation: u64,
    sink: Arc<dyn PeerSink>,
}

impl User {
    pub fn new(id: ConnectionId, name: String, generation: u64, sink: Arc<dyn PeerSink>) -> Self {
        Self {
            id,
            name,
            generation,
            sink,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registration epoch; lets a queued ticket tell whether it still refers
    /// to this exact registration.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Fire-and-forget delivery. A closed channel means the connection is on
    /// its way out and its disconnect will clean up after it.
    pub fn notify(&self, event: ServerEvent) {
        let name = event.name();
        if let Err(e) = self.sink.send(event) {
            warn!(connection = %self.id, event = name, "dropping outbound event: {e}");
        }
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}
