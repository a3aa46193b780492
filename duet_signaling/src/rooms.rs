//! Active rooms and the connection → room index

use crate::{error::SignalingError, user::User};
use duet_protocol::{ConnectionId, RoomId, ServerEvent};
use std::collections::HashMap;
use tracing::{info, warn};

/// An exclusive pairing of two distinct connections
#[derive(Debug)]
pub struct Room {
    id: RoomId,
    members: [User; 2],
}

impl Room {
    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn members(&self) -> &[User; 2] {
        &self.members
    }

    /// Splits the room into `(member, other member)` from `id`'s point of view
    pub fn split(&self, id: ConnectionId) -> Result<(&User, &User), SignalingError> {
        let [a, b] = &self.members;
        if a.id() == id {
            Ok((a, b))
        } else if b.id() == id {
            Ok((b, a))
        } else {
            Err(SignalingError::NotInRoom {
                room: self.id,
                connection: id,
            })
        }
    }
}

/// Hands out room ids. Never repeats one for the lifetime of the store.
#[derive(Debug)]
struct RoomIdGenerator {
    /// `None` once `u64::MAX` has been handed out
    next: Option<u64>,
}

impl RoomIdGenerator {
    fn next(&mut self) -> Result<RoomId, SignalingError> {
        let id = self.next.ok_or(SignalingError::RoomIdsExhausted)?;
        self.next = id.checked_add(1);
        Ok(RoomId(id))
    }
}

/// Room table plus the index from each member back to its room.
///
/// Both are only ever changed together, so a connection is indexed exactly
/// when it sits in a stored room.
#[derive(Debug)]
pub struct RoomStore {
    ids: RoomIdGenerator,
    rooms: HashMap<RoomId, Room>,
    index: HashMap<ConnectionId, RoomId>,
}

impl Default for RoomStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomStore {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// A store whose first room gets id `first`
    pub fn starting_at(first: u64) -> Self {
        Self {
            ids: RoomIdGenerator { next: Some(first) },
            rooms: HashMap::new(),
            index: HashMap::new(),
        }
    }

    /// Number of active rooms
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn get(&self, room_id: RoomId) -> Option<&Room> {
        self.rooms.get(&room_id)
    }

    #[cfg(test)]
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    /// The room `id` is currently in, if any
    pub fn find_room_for_user(&self, id: ConnectionId) -> Option<RoomId> {
        self.index.get(&id).copied()
    }

    /// Pairs two unmatched users into a fresh room and tells both to start
    /// negotiating. Neither is designated offerer.
    ///
    /// Fails without touching any state once room ids run out.
    pub fn create_room(&mut self, first: User, second: User) -> Result<RoomId, SignalingError> {
        debug_assert_ne!(first.id(), second.id());
        debug_assert!(!self.index.contains_key(&first.id()));
        debug_assert!(!self.index.contains_key(&second.id()));

        let room_id = self.ids.next()?;
        info!(
            room = %room_id,
            first = %first.id(),
            second = %second.id(),
            "creating room"
        );

        self.index.insert(first.id(), room_id);
        self.index.insert(second.id(), room_id);

        first.notify(ServerEvent::SendOffer {
            room_id,
            peer_name: second.name().to_string(),
        });
        second.notify(ServerEvent::SendOffer {
            room_id,
            peer_name: first.name().to_string(),
        });

        self.rooms.insert(
            room_id,
            Room {
                id: room_id,
                members: [first, second],
            },
        );
        Ok(room_id)
    }

    /// Tears the room down on behalf of `leaving` and returns the member left
    /// behind, or `None` if there was nothing to tear down.
    pub fn end_room(&mut self, room_id: RoomId, leaving: ConnectionId) -> Option<ConnectionId> {
        match self.try_end_room(room_id, leaving) {
            Ok(remaining) => Some(remaining),
            Err(e) => {
                warn!(connection = %leaving, "not ending room: {e}");
                None
            }
        }
    }

    fn try_end_room(
        &mut self,
        room_id: RoomId,
        leaving: ConnectionId,
    ) -> Result<ConnectionId, SignalingError> {
        let room = self
            .rooms
            .get(&room_id)
            .ok_or(SignalingError::RoomNotFound(room_id))?;
        room.split(leaving)?;

        let room = self
            .rooms
            .remove(&room_id)
            .ok_or(SignalingError::RoomNotFound(room_id))?;
        let (leaver, remaining) = room.split(leaving)?;
        self.index.remove(&leaver.id());
        self.index.remove(&remaining.id());

        info!(
            room = %room_id,
            leaving = %leaver.id(),
            remaining = %remaining.id(),
            "ending room"
        );
        remaining.notify(ServerEvent::PeerDisconnected {
            peer_name: leaver.name().to_string(),
        });
        Ok(remaining.id())
    }
}
