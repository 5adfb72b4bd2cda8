use serde::{Deserialize, Serialize};

/// What the service is doing, as shown by the view's busy indicator.
///
/// Deletion is synchronous and never observable here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationState {
    #[default]
    Idle,
    /// At least one node expansion is awaiting generation
    Expanding,
    /// A full regeneration is awaiting extraction
    Regenerating,
}

impl MutationState {
    pub fn is_busy(self) -> bool {
        self != MutationState::Idle
    }
}
