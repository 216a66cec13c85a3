use super::domain::{ApplicationId, StageId};

/// Errors raised by the board core. None of them are fatal; callers either
/// absorb them (cancel, rollback) or surface them as a notice.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },
    #[error("drop target is not a stage: {stage_id}")]
    InvalidTarget { stage_id: StageId },
    #[error("move was not persisted: {reason}")]
    PersistenceFailure { reason: String },
    #[error("application {application_id} already has a move in flight")]
    MoveInFlight { application_id: ApplicationId },
    #[error("stage '{stage_id}' still holds {count} applications")]
    StageOccupied { stage_id: StageId, count: usize },
    #[error("a drag session is already active for {active}")]
    SessionActive { active: ApplicationId },
    #[error("no drag session is active")]
    NoActiveSession,
    #[error("no stage order is left after the last stage")]
    StageOrderExhausted,
}

impl BoardError {
    pub fn application_not_found(id: &ApplicationId) -> Self {
        Self::NotFound {
            resource: "application",
            id: id.to_string(),
        }
    }

    pub fn stage_not_found(id: &StageId) -> Self {
        Self::NotFound {
            resource: "stage",
            id: id.to_string(),
        }
    }

    /// Whether the user may simply try the same action again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::PersistenceFailure { .. } | Self::MoveInFlight { .. }
        )
    }
}
