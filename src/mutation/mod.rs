//! Graph mutations: expand, delete and regenerate
//!
//! `MutationService` owns the live graph of a session and applies the
//! three user-driven mutations to it. Collaborator failures surface as
//! `MutationError`; validation drops and empty parses are not errors.

mod epoch;
mod guard;
mod service;
mod state;

pub use epoch::{EpochTicket, SessionEpoch};
pub use service::MutationService;
pub use state::MutationState;

use crate::generation::GenerationError;
use crate::graph::NodeId;
use thiserror::Error;

/// Errors surfaced to the caller of a mutation. The graph is unchanged
/// whenever one is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MutationError {
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("node {0} is already being expanded")]
    ExpansionInFlight(NodeId),

    #[error("a regeneration is already running")]
    RegenerationInFlight,

    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("graph was replaced while the request was running")]
    Superseded,

    #[error("session is closed")]
    SessionClosed,
}

pub type MutationResult<T> = Result<T, MutationError>;
