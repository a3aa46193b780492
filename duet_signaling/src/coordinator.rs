//! Glue between transport events and the queue, rooms and relay

use crate::{
    error::{ClientRequestError, SignalingError},
    queue::{MatchQueue, Ticket},
    relay,
    rooms::RoomStore,
    sink::PeerSink,
    user::User,
};
use duet_protocol::{ClientEvent, ConnectionId, RoomId, ServerEvent};
use serde::Serialize;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tracing::{debug, error, info, warn};

/// Point-in-time counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Registered connections
    pub connected: usize,
    /// Connections in the waiting pool
    pub waiting: usize,
    /// Active rooms
    pub rooms: usize,
}

#[derive(Debug, Default)]
struct Core {
    users: HashMap<ConnectionId, User>,
    queue: MatchQueue,
    rooms: RoomStore,
    next_generation: u64,
}

/// A ticket is live while its registration is current and not already in a room.
fn is_live(users: &HashMap<ConnectionId, User>, rooms: &RoomStore, ticket: &Ticket) -> bool {
    users
        .get(&ticket.id)
        .is_some_and(|u| u.generation() == ticket.generation)
        && rooms.find_room_for_user(ticket.id).is_none()
}

impl Core {
    fn connect(
        &mut self,
        id: ConnectionId,
        name: String,
        sink: Arc<dyn PeerSink>,
    ) -> Result<(), SignalingError> {
        if self.users.contains_key(&id) {
            return Err(SignalingError::AlreadyConnected(id));
        }
        let generation = self.next_generation;
        self.next_generation += 1;
        info!(connection = %id, %name, "user connected");
        self.users.insert(id, User::new(id, name, generation, sink));
        self.enqueue(id, false);
        Ok(())
    }

    fn disconnect(&mut self, id: ConnectionId) {
        let Some(user) = self.users.remove(&id) else {
            debug!(connection = %id, "disconnect for unknown connection");
            return;
        };
        info!(connection = %id, name = user.name(), "user disconnected");

        self.queue.remove(id);
        if let Some(room_id) = self.rooms.find_room_for_user(id) {
            if let Some(remaining) = self.rooms.end_room(room_id, id) {
                self.enqueue(remaining, true);
            }
        }
    }

    fn leave_room(&mut self, id: ConnectionId, room_id: RoomId) {
        info!(connection = %id, room = %room_id, "user leaving room");
        if let Some(remaining) = self.rooms.end_room(room_id, id) {
            self.enqueue(remaining, true);
        }
        self.enqueue(id, false);
    }

    /// Adds a registered, unmatched user to the pool and drains it.
    fn enqueue(&mut self, id: ConnectionId, priority: bool) {
        let Some(user) = self.users.get(&id) else {
            debug!(connection = %id, "not enqueueing unknown connection");
            return;
        };
        if self.rooms.find_room_for_user(id).is_some() {
            debug!(connection = %id, "not enqueueing connection that is in a room");
            return;
        }
        let ticket = Ticket {
            id,
            generation: user.generation(),
        };
        if !self.queue.push(ticket, priority) {
            debug!(connection = %id, "connection already waiting");
            return;
        }
        debug!(connection = %id, priority, waiting = self.queue.len(), "enqueued");
        user.notify(ServerEvent::Lobby {});
        self.try_match();
    }

    fn try_match(&mut self) {
        let Core {
            users,
            queue,
            rooms,
            ..
        } = self;
        while let Some((a, b)) = queue.next_pair(|t| is_live(users, rooms, t)) {
            let (Some(first), Some(second)) = (users.get(&a.id), users.get(&b.id)) else {
                // is_live already vouched for both
                warn!(first = %a.id, second = %b.id, "paired tickets without users");
                continue;
            };
            if let Err(e) = rooms.create_room(first.clone(), second.clone()) {
                error!(first = %a.id, second = %b.id, "cannot pair: {e}");
                queue.push(b, true);
                queue.push(a, true);
                break;
            }
        }
    }

    fn handle_event(&mut self, id: ConnectionId, event: ClientEvent) -> Result<(), SignalingError> {
        match event {
            ClientEvent::Offer { sdp, room_id } => {
                relay::relay_offer(&self.rooms, room_id, id, sdp)
            }
            ClientEvent::Answer { sdp, room_id } => {
                relay::relay_answer(&self.rooms, room_id, id, sdp)
            }
            ClientEvent::AddIceCandidate {
                candidate,
                room_id,
                role,
            } => relay::relay_ice(&self.rooms, room_id, id, candidate, role),
            ClientEvent::LeaveRoom { room_id } => {
                self.leave_room(id, room_id);
                Ok(())
            }
        }
    }

    fn stats(&self) -> Stats {
        Stats {
            connected: self.users.len(),
            waiting: self.queue.len(),
            rooms: self.rooms.len(),
        }
    }
}

/// Owns all pairing state behind a single lock.
///
/// Cheap to clone; every clone is a handle to the same state. Each method
/// takes the lock once and runs to completion, so callers on any thread see
/// the same serialized history.
#[derive(Debug, Clone, Default)]
pub struct SessionCoordinator {
    core: Arc<Mutex<Core>>,
}

impl SessionCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn with_first_room_id(first: u64) -> Self {
        let core = Core {
            rooms: RoomStore::starting_at(first),
            ..Default::default()
        };
        Self {
            core: Arc::new(Mutex::new(core)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Core> {
        // Core mutations never leave it half-updated across a panic point.
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a new connection and puts it in the waiting pool
    pub fn connect(
        &self,
        id: ConnectionId,
        name: impl Into<String>,
        sink: impl PeerSink,
    ) -> Result<(), SignalingError> {
        self.lock().connect(id, name.into(), Arc::new(sink))
    }

    /// Retires a connection, ending its room if it had one
    pub fn disconnect(&self, id: ConnectionId) {
        self.lock().disconnect(id);
    }

    /// Applies one inbound event from `id`.
    ///
    /// Events naming a room that is gone, or one the sender is not in, are
    /// logged and dropped. Only malformed input is reported back.
    pub fn handle_event(
        &self,
        id: ConnectionId,
        event: ClientEvent,
    ) -> Result<(), ClientRequestError> {
        validate(&event)?;
        let mut core = self.lock();
        if !core.users.contains_key(&id) {
            return Err(ClientRequestError::UnknownConnection(id));
        }
        let room_id = event.room_id();
        if let Err(e) = core.handle_event(id, event) {
            warn!(connection = %id, room = %room_id, "ignoring event: {e}");
        }
        Ok(())
    }

    /// Decodes a JSON frame and applies it
    pub fn handle_message(&self, id: ConnectionId, text: &str) -> Result<(), ClientRequestError> {
        let event: ClientEvent = text.parse()?;
        self.handle_event(id, event)
    }

    pub fn stats(&self) -> Stats {
        self.lock().stats()
    }

    /// Waiting connections, front of the queue first
    pub fn waiting(&self) -> Vec<ConnectionId> {
        self.lock().queue.ids().collect()
    }

    pub fn room_of(&self, id: ConnectionId) -> Option<RoomId> {
        self.lock().rooms.find_room_for_user(id)
    }

    #[cfg(test)]
    fn room_members(&self, room_id: RoomId) -> Option<[ConnectionId; 2]> {
        let core = self.lock();
        let [a, b] = core.rooms.get(room_id)?.members();
        Some([a.id(), b.id()])
    }
}

fn validate(event: &ClientEvent) -> Result<(), ClientRequestError> {
    match event {
        ClientEvent::Offer { sdp, .. } | ClientEvent::Answer { sdp, .. } if sdp.is_empty() => {
            Err(ClientRequestError::Malformed("empty session description"))
        }
        ClientEvent::AddIceCandidate { candidate, .. } if candidate.is_null() => {
            Err(ClientRequestError::Malformed("missing ICE candidate"))
        }
        _ => Ok(()),
    }
}
