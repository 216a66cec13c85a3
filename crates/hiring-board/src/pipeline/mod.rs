//! Recruitment pipeline board.
//!
//! Stages and applications are plain data holders; the [`Board`] composes them
//! with the single drag session and owns the two-phase move (apply locally,
//! then confirm or roll back). [`BoardService`] connects the board to the
//! systems of record without holding the board lock across their calls.

pub mod board;
pub mod column;
pub mod domain;
pub mod drag;
pub mod error;
pub mod index;
pub mod router;
pub mod sensors;
pub mod service;
pub mod stages;
pub mod store;

#[cfg(test)]
mod tests;

pub use board::{Board, GestureResult, MovePlan, MoveTicket};
pub use column::{render_column, BoardView, CardView, ColumnView, VISIBLE_TAG_LIMIT};
pub use domain::{
    ApplicationCard, ApplicationId, MoveIntent, Rating, RatingError, Stage, StageId, StagePatch,
    TagIndex,
};
pub use drag::{DragOutcome, DragPhase, DragSession};
pub use error::BoardError;
pub use index::{ApplicationIndex, StageChange};
pub use router::board_router;
pub use sensors::{ActivationConstraint, DragVerb, Modality, Point, RawInput, Sensor};
pub use service::{BoardService, MoveReceipt};
pub use stages::StageRegistry;
pub use store::{BoardNotice, MoveStore, NoticeKind, NoticePublisher, StageStore, StoreError};
