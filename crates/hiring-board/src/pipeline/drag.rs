//! Drag session state machine.
//!
//! `Idle -> Armed -> Dragging -> {Dropped | Cancelled} -> Idle`. The terminal
//! states are reported as a [`DragOutcome`] at the moment the session resets,
//! so the session itself only ever rests in one of the first three phases.

use serde::Serialize;
use tracing::debug;

use super::domain::{ApplicationId, MoveIntent, StageId};
use super::error::BoardError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum DragPhase {
    Idle,
    Armed {
        subject: ApplicationId,
    },
    Dragging {
        subject: ApplicationId,
        hover: Option<StageId>,
    },
}

impl DragPhase {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Armed { .. } => "armed",
            Self::Dragging { .. } => "dragging",
        }
    }
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    Dropped(MoveIntent),
    Cancelled { subject: ApplicationId },
}

/// The single in-flight drag gesture. Only the board owns one.
#[derive(Debug, Clone)]
pub struct DragSession {
    phase: DragPhase,
}

impl Default for DragSession {
    fn default() -> Self {
        Self {
            phase: DragPhase::Idle,
        }
    }
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &DragPhase {
        &self.phase
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.phase, DragPhase::Idle)
    }

    pub fn subject(&self) -> Option<&ApplicationId> {
        match &self.phase {
            DragPhase::Idle => None,
            DragPhase::Armed { subject } | DragPhase::Dragging { subject, .. } => Some(subject),
        }
    }

    pub fn hover_target(&self) -> Option<&StageId> {
        match &self.phase {
            DragPhase::Dragging { hover, .. } => hover.as_ref(),
            _ => None,
        }
    }

    /// Arm a new session. A pick-up while another session is live is rejected, not queued.
    pub(crate) fn pick_up(&mut self, subject: ApplicationId) -> Result<(), BoardError> {
        if let Some(active) = self.subject() {
            debug!(%active, rejected = %subject, "pick-up ignored, session already active");
            return Err(BoardError::SessionActive {
                active: active.clone(),
            });
        }

        debug!(%subject, "drag armed");
        self.phase = DragPhase::Armed { subject };
        Ok(())
    }

    /// Track the stage under the pointer. Purely visual.
    pub(crate) fn hover(&mut self, over: Option<StageId>) -> Result<(), BoardError> {
        let subject = self
            .subject()
            .cloned()
            .ok_or(BoardError::NoActiveSession)?;
        self.phase = DragPhase::Dragging {
            subject,
            hover: over,
        };
        Ok(())
    }

    /// Release the card. No target means the drop landed outside every column.
    pub(crate) fn drop_on(&mut self, over: Option<StageId>) -> Result<DragOutcome, BoardError> {
        let subject = self.take_subject()?;
        let outcome = match over {
            Some(target) => DragOutcome::Dropped(MoveIntent::new(subject, target)),
            None => DragOutcome::Cancelled { subject },
        };
        debug!(?outcome, "drag released");
        Ok(outcome)
    }

    pub(crate) fn cancel(&mut self) -> Result<DragOutcome, BoardError> {
        let subject = self.take_subject()?;
        debug!(%subject, "drag cancelled");
        Ok(DragOutcome::Cancelled { subject })
    }

    fn take_subject(&mut self) -> Result<ApplicationId, BoardError> {
        match std::mem::replace(&mut self.phase, DragPhase::Idle) {
            DragPhase::Idle => Err(BoardError::NoActiveSession),
            DragPhase::Armed { subject } | DragPhase::Dragging { subject, .. } => Ok(subject),
        }
    }
}
