use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{info, warn};

use super::board::{Board, GestureResult, MovePlan};
use super::column::BoardView;
use super::domain::{MoveIntent, Stage, StageId, StagePatch, TagIndex};
use super::error::BoardError;
use super::sensors::DragVerb;
use super::store::{BoardNotice, MoveStore, NoticeKind, NoticePublisher, StageStore};

/// How a move request ended once the system of record answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveReceipt {
    /// The application already sat in the target stage; nothing was sent.
    Unchanged,
    Confirmed { from: StageId, to: StageId },
}

/// Service wiring the board to its collaborators.
///
/// The board lock is never held across a collaborator call, so gestures on
/// other applications proceed while a move is in flight.
pub struct BoardService<M, S, N> {
    board: Arc<Mutex<Board>>,
    moves: Arc<M>,
    stage_store: Arc<S>,
    notices: Arc<N>,
}

impl<M, S, N> BoardService<M, S, N>
where
    M: MoveStore + 'static,
    S: StageStore + 'static,
    N: NoticePublisher + 'static,
{
    pub fn new(board: Board, moves: Arc<M>, stage_store: Arc<S>, notices: Arc<N>) -> Self {
        Self {
            board: Arc::new(Mutex::new(board)),
            moves,
            stage_store,
            notices,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Board> {
        self.board.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run a closure against the board under the lock.
    pub fn with_board<T>(&self, f: impl FnOnce(&mut Board) -> T) -> T {
        let mut board = self.lock();
        f(&mut board)
    }

    pub fn render(&self) -> BoardView {
        self.lock().render()
    }

    pub fn replace_tags(&self, tags: TagIndex) {
        self.lock().replace_tags(tags);
    }

    /// Non-interactive move entry point (e.g. a "move to stage" menu action).
    pub async fn dispatch_move(&self, intent: MoveIntent) -> Result<MoveReceipt, BoardError> {
        let plan = {
            let mut board = self.lock();
            board.begin_move(intent)
        };
        let plan = match plan {
            Ok(plan) => plan,
            Err(err) => {
                self.flush_notices();
                return Err(err);
            }
        };
        self.commit(plan).await
    }

    /// Feed one verb from an input adapter. Drops that produce a move are
    /// committed through the same path as [`Self::dispatch_move`].
    pub async fn gesture(&self, verb: DragVerb) -> Result<Option<MoveReceipt>, BoardError> {
        let result = {
            let mut board = self.lock();
            board.apply_verb(verb)
        };
        match result {
            Ok(GestureResult::Dropped(plan)) => self.commit(plan).await.map(Some),
            Ok(_) => Ok(None),
            Err(err) => {
                self.flush_notices();
                Err(err)
            }
        }
    }

    async fn commit(&self, plan: MovePlan) -> Result<MoveReceipt, BoardError> {
        let ticket = match plan {
            MovePlan::Unchanged => return Ok(MoveReceipt::Unchanged),
            MovePlan::Pending(ticket) => ticket,
        };

        let result = self.moves.commit_move(&ticket.intent).await;
        let receipt = MoveReceipt::Confirmed {
            from: ticket.previous.clone(),
            to: ticket.intent.target_stage_id.clone(),
        };

        let settled = {
            let mut board = self.lock();
            board.settle_move(ticket, result)
        };
        self.flush_notices();
        settled.map(|()| receipt)
    }

    /// Append a stage locally, then persist it. The stage refuses moves until
    /// the store accepts it and is withdrawn again if the store refuses.
    pub async fn create_stage(&self, name: String, color: String) -> Result<Stage, BoardError> {
        let stage = self.lock().add_stage(name, color)?;

        if let Err(store_error) = self.stage_store.create_stage(&stage).await {
            warn!(stage_id = %stage.id, error = %store_error, "stage create rejected");
            {
                let mut board = self.lock();
                if let Err(err) = board.withdraw_stage(&stage.id) {
                    warn!(stage_id = %stage.id, error = %err, "rejected stage already gone");
                }
                board.push_notice(
                    BoardNotice::new(NoticeKind::StageChangeReverted, "The stage could not be created")
                        .retryable(),
                );
            }
            self.flush_notices();
            return Err(BoardError::PersistenceFailure {
                reason: store_error.to_string(),
            });
        }

        self.lock().confirm_stage(&stage.id);
        Ok(stage)
    }

    pub async fn update_stage(&self, id: &StageId, patch: StagePatch) -> Result<Stage, BoardError> {
        let applied = {
            let mut board = self.lock();
            board.update_stage(id, patch).and_then(|previous| {
                board
                    .stages()
                    .get(id)
                    .cloned()
                    .map(|current| (previous, current))
                    .ok_or_else(|| BoardError::stage_not_found(id))
            })
        };
        let (previous, current) = match applied {
            Ok(pair) => pair,
            Err(err) => {
                self.flush_notices();
                return Err(err);
            }
        };

        if let Err(store_error) = self.stage_store.update_stage(&current).await {
            warn!(stage_id = %id, error = %store_error, "stage update rejected");
            {
                let mut board = self.lock();
                board.restore_stage(previous);
                board.push_notice(
                    BoardNotice::new(NoticeKind::StageChangeReverted, "The stage could not be updated")
                        .retryable(),
                );
            }
            self.flush_notices();
            return Err(BoardError::PersistenceFailure {
                reason: store_error.to_string(),
            });
        }

        info!(stage_id = %id, "stage updated");
        Ok(current)
    }

    /// Delete an empty stage. Occupied stages are refused; move applications out first.
    pub async fn delete_stage(&self, id: &StageId) -> Result<Stage, BoardError> {
        let removed = self.lock().remove_stage(id);
        let removed = match removed {
            Ok(stage) => stage,
            Err(err) => {
                self.flush_notices();
                return Err(err);
            }
        };

        if let Err(store_error) = self.stage_store.delete_stage(id).await {
            warn!(stage_id = %id, error = %store_error, "stage delete rejected");
            {
                let mut board = self.lock();
                board.restore_stage(removed);
                board.push_notice(
                    BoardNotice::new(NoticeKind::StageChangeReverted, "The stage could not be deleted")
                        .retryable(),
                );
            }
            self.flush_notices();
            return Err(BoardError::PersistenceFailure {
                reason: store_error.to_string(),
            });
        }

        Ok(removed)
    }

    fn flush_notices(&self) {
        let notices = self.lock().take_notices();
        for notice in notices {
            self.notices.publish(notice);
        }
    }
}
