//! Session liveness for late-arriving generation results
//!
//! Generation calls cannot be cancelled. Instead each mutation takes a
//! ticket when it starts and presents it before applying its result: if
//! the graph was replaced in the meantime (regenerate, project switch) the
//! epoch has moved on and the result is discarded. Closing the session
//! invalidates every outstanding ticket.

use super::MutationError;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Epoch observed when a mutation started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochTicket(u64);

#[derive(Debug, Default)]
pub struct SessionEpoch {
    epoch: AtomicU64,
    closed: AtomicBool,
}

impl SessionEpoch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticket for a mutation starting now
    pub fn ticket(&self) -> Result<EpochTicket, MutationError> {
        if self.is_closed() {
            return Err(MutationError::SessionClosed);
        }
        Ok(EpochTicket(self.epoch.load(Ordering::SeqCst)))
    }

    /// Whether a result taken under `ticket` may still be applied
    pub fn check(&self, ticket: EpochTicket) -> Result<(), MutationError> {
        if self.is_closed() {
            return Err(MutationError::SessionClosed);
        }
        if self.epoch.load(Ordering::SeqCst) != ticket.0 {
            return Err(MutationError::Superseded);
        }
        Ok(())
    }

    /// Invalidate outstanding tickets; the graph is being replaced
    pub fn advance(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
