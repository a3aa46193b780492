//! Ordered pool of connections waiting for a partner

use duet_protocol::ConnectionId;
use std::collections::VecDeque;
use tracing::debug;

/// A queue entry: the connection plus the registration it was enqueued under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    /// The waiting connection
    pub id: ConnectionId,
    /// Registration epoch of the connection when it was enqueued
    pub generation: u64,
}

/// FIFO pool with front insertion for peers returned from an ended room
#[derive(Debug, Default)]
pub struct MatchQueue {
    entries: VecDeque<Ticket>,
}

impl MatchQueue {
    /// An empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of waiting connections
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nobody is waiting
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `id` is waiting, whatever its generation
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.entries.iter().any(|t| t.id == id)
    }

    /// Waiting ids, front first
    pub fn ids(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.entries.iter().map(|t| t.id)
    }

    /// Inserts a ticket at the front (`priority`) or the back.
    ///
    /// Returns `false` and leaves the queue untouched if the id is already waiting.
    pub fn push(&mut self, ticket: Ticket, priority: bool) -> bool {
        if self.contains(ticket.id) {
            return false;
        }
        if priority {
            self.entries.push_front(ticket);
        } else {
            self.entries.push_back(ticket);
        }
        true
    }

    /// Removes an id wherever it sits. No-op if absent.
    pub fn remove(&mut self, id: ConnectionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|t| t.id != id);
        self.entries.len() != before
    }

    /// Pops the two front-most live tickets.
    ///
    /// Stale tickets are dropped; when only one of a popped pair is live it
    /// goes back to the front so it keeps its place. Every round that does not
    /// return shrinks the queue, so this runs at most `len` rounds.
    pub fn next_pair(
        &mut self,
        mut is_live: impl FnMut(&Ticket) -> bool,
    ) -> Option<(Ticket, Ticket)> {
        while self.entries.len() >= 2 {
            let first = self.entries.pop_front()?;
            let second = self.entries.pop_front()?;
            match (is_live(&first), is_live(&second)) {
                (true, true) => return Some((first, second)),
                (true, false) => {
                    debug!(stale = %second.id, "dropping stale ticket");
                    self.entries.push_front(first);
                }
                (false, true) => {
                    debug!(stale = %first.id, "dropping stale ticket");
                    self.entries.push_front(second);
                }
                (false, false) => {
                    debug!(stale = %first.id, also = %second.id, "dropping stale tickets");
                }
            }
        }
        None
    }
}
