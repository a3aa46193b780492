//! WebSocket front end for the duet pairing server
//!
//! Each client opens a WebSocket and is put in a waiting pool. As soon as a
//! second client is waiting the two are paired into a room and both receive
//! `send-offer`; from then on offers, answers and ICE candidates sent by one
//! are forwarded to the other. When either leaves, the other is told and goes
//! back to the front of the pool.
//!
//! # Endpoints
//!
//! - **GET /ws?name={display name}** - WebSocket upgrade (`/` works too)
//! - **GET /health** - Health check
//! - **GET /stats** - `{"connected": n, "waiting": n, "rooms": n}`
//!
//! # Example
//!
//! ```bash
//! # Start the server
//! duet-server --host 127.0.0.1:3536
//!
//! # Connect two clients
//! websocat "ws://127.0.0.1:3536/ws?name=alice"
//! websocat "ws://127.0.0.1:3536/ws?name=bob"
//!
//! # Send an offer from alice once both got send-offer
//! {"event":"offer","payload":{"sdp":"v=0...","roomId":"1"}}
//! ```

#![forbid(unsafe_code)]

pub mod args;
pub mod error;
pub mod handler;
pub mod state;

pub use error::TransportError;
pub use handler::router;
pub use state::{ServerConfig, ServerState};
