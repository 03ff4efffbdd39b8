//! Request generations.
//!
//! Every controller may have several requests in flight for the same slot (two list
//! refreshes, two editor loads). Each request takes a [`Ticket`] from the slot's
//! [`RequestGeneration`] when it starts; when it completes, its result is applied only if
//! no newer request has started since. The counter lives inside the controller's locked
//! state, so the check and the application of a result happen under the same lock.

use std::fmt;

/// Monotonic request counter for one slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RequestGeneration(u64);

/// Identity of one request, taken from a [`RequestGeneration`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// What happened to the result of a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The response was accepted into state.
    Applied,
    /// The request failed; the failure was recorded in state.
    Failed,
    /// A newer request started first; the response was dropped.
    Superseded,
}

impl RequestGeneration {
    /// Starts a new request, superseding every earlier one.
    pub fn advance(&mut self) -> Ticket {
        self.0 += 1;
        Ticket(self.0)
    }

    /// Supersedes every request in flight without starting a new one.
    pub fn invalidate(&mut self) {
        self.0 += 1;
    }

    /// Ticket of the newest request.
    pub fn ticket(&self) -> Ticket {
        Ticket(self.0)
    }

    pub fn accepts(&self, ticket: Ticket) -> bool {
        self.0 == ticket.0
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
