//! Forwarding of negotiation messages between the two members of a room
//!
//! Everything here is a lookup followed by a single send to the member that
//! did not send the message. The sender never gets its own message back.

use crate::{error::SignalingError, rooms::RoomStore, user::User};
use duet_protocol::{ConnectionId, IceRole, RoomId, ServerEvent};
use tracing::debug;

fn route(
    rooms: &RoomStore,
    room_id: RoomId,
    sender: ConnectionId,
) -> Result<(&User, &User), SignalingError> {
    rooms
        .get(room_id)
        .ok_or(SignalingError::RoomNotFound(room_id))?
        .split(sender)
}

/// Forwards an SDP offer, tagged with the sender's name.
pub fn relay_offer(
    rooms: &RoomStore,
    room_id: RoomId,
    sender: ConnectionId,
    sdp: String,
) -> Result<(), SignalingError> {
    let (from, to) = route(rooms, room_id, sender)?;
    debug!(room = %room_id, from = %from.id(), to = %to.id(), "relaying offer");
    to.notify(ServerEvent::Offer {
        sdp,
        room_id,
        peer_name: from.name().to_string(),
    });
    Ok(())
}

/// Forwards an SDP answer, tagged with the sender's name.
pub fn relay_answer(
    rooms: &RoomStore,
    room_id: RoomId,
    sender: ConnectionId,
    sdp: String,
) -> Result<(), SignalingError> {
    let (from, to) = route(rooms, room_id, sender)?;
    debug!(room = %room_id, from = %from.id(), to = %to.id(), "relaying answer");
    to.notify(ServerEvent::Answer {
        sdp,
        room_id,
        peer_name: from.name().to_string(),
    });
    Ok(())
}

/// The role tag is passed through as the sender labelled it.
pub fn relay_ice(
    rooms: &RoomStore,
    room_id: RoomId,
    sender: ConnectionId,
    candidate: serde_json::Value,
    role: IceRole,
) -> Result<(), SignalingError> {
    let (from, to) = route(rooms, room_id, sender)?;
    debug!(room = %room_id, from = %from.id(), to = %to.id(), ?role, "relaying ICE candidate");
    to.notify(ServerEvent::AddIceCandidate {
        candidate,
        role,
        room_id,
    });
    Ok(())
}
