use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{ApplicationId, MoveIntent, Stage, StageId};

/// System of record for application stage membership.
#[async_trait]
pub trait MoveStore: Send + Sync {
    async fn commit_move(&self, intent: &MoveIntent) -> Result<(), StoreError>;
}

/// System of record for stage definitions.
#[async_trait]
pub trait StageStore: Send + Sync {
    async fn create_stage(&self, stage: &Stage) -> Result<(), StoreError>;
    async fn update_stage(&self, stage: &Stage) -> Result<(), StoreError>;
    async fn delete_stage(&self, id: &StageId) -> Result<(), StoreError>;
}

/// Error enumeration for collaborator failures. The board only cares that one happened.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("rejected by the system of record: {0}")]
    Rejected(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hook for user-visible, non-blocking notices (toasts, banners).
pub trait NoticePublisher: Send + Sync {
    fn publish(&self, notice: BoardNotice);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    MoveReverted,
    StageChangeReverted,
    UnexpectedFailure,
}

impl NoticeKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::MoveReverted => "Move reverted",
            Self::StageChangeReverted => "Stage change reverted",
            Self::UnexpectedFailure => "Something went wrong",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardNotice {
    pub kind: NoticeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<ApplicationId>,
    pub message: String,
    pub retryable: bool,
    pub raised_at: DateTime<Utc>,
}

impl BoardNotice {
    pub fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            application_id: None,
            message: message.into(),
            retryable: false,
            raised_at: Utc::now(),
        }
    }

    pub fn for_application(mut self, id: ApplicationId) -> Self {
        self.application_id = Some(id);
        self
    }

    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }
}
