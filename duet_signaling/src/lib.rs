//! Pairing core for 1:1 WebRTC sessions
//!
//! Connections are pooled in a [`MatchQueue`], paired two at a time into rooms
//! held by a [`RoomStore`], and exchange offers, answers and ICE candidates
//! through the [`relay`] until one of them leaves. The survivor goes back to
//! the front of the pool.
//!
//! All of it sits behind a [`SessionCoordinator`], which the transport feeds
//! with connect, disconnect and message events. Outbound events leave through
//! a [`PeerSink`] per connection.

#![forbid(unsafe_code)]

pub mod coordinator;
pub mod error;
pub mod queue;
pub mod relay;
pub mod rooms;
pub mod sink;
mod user;

pub use coordinator::{SessionCoordinator, Stats};
pub use error::{ClientRequestError, SignalingError};
pub use queue::{MatchQueue, Ticket};
pub use rooms::{Room, RoomStore};
pub use sink::PeerSink;
pub use user::User;
