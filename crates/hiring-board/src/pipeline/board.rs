use std::collections::{HashMap, HashSet};

use tracing::{debug, error, info, warn};

use super::column::{render_column, BoardView};
use super::domain::{
    ApplicationCard, ApplicationId, MoveIntent, Stage, StageId, StagePatch, TagIndex,
};
use super::drag::{DragOutcome, DragSession};
use super::error::BoardError;
use super::index::{ApplicationIndex, StageChange};
use super::sensors::DragVerb;
use super::stages::StageRegistry;
use super::store::{BoardNotice, NoticeKind, StoreError};

/// An optimistically applied move awaiting the system of record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveTicket {
    pub intent: MoveIntent,
    pub previous: StageId,
    sequence: u64,
}

/// What applying a move intent did to the local index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovePlan {
    /// Already in the target stage; nothing to persist.
    Unchanged,
    Pending(MoveTicket),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureResult {
    Armed,
    Hovering,
    Cancelled,
    Dropped(MovePlan),
}

#[derive(Debug, Clone)]
struct PendingMove {
    previous: StageId,
    sequence: u64,
}

/// Composes stages, applications, tags, and the drag session; owns rollback.
#[derive(Debug, Default)]
pub struct Board {
    stages: StageRegistry,
    applications: ApplicationIndex,
    tags: TagIndex,
    drag: DragSession,
    pending: HashMap<ApplicationId, PendingMove>,
    /// Stages created locally that the stage store has not accepted yet.
    unconfirmed_stages: HashSet<StageId>,
    notices: Vec<BoardNotice>,
    sequence: u64,
}

impl Board {
    /// Build a board. Every application must reference a known stage.
    pub fn new(
        stages: StageRegistry,
        applications: ApplicationIndex,
        tags: TagIndex,
    ) -> Result<Self, BoardError> {
        if let Some(orphan) = applications
            .cards()
            .iter()
            .find(|card| !stages.contains(&card.stage_id))
        {
            return Err(BoardError::stage_not_found(&orphan.stage_id));
        }

        Ok(Self {
            stages,
            applications,
            tags,
            ..Self::default()
        })
    }

    pub fn stages(&self) -> &StageRegistry {
        &self.stages
    }

    pub fn applications(&self) -> &ApplicationIndex {
        &self.applications
    }

    pub fn tags(&self) -> &TagIndex {
        &self.tags
    }

    pub fn drag(&self) -> &DragSession {
        &self.drag
    }

    pub fn by_stage(&self, stage_id: &StageId) -> Vec<&ApplicationCard> {
        self.applications.by_stage(stage_id)
    }

    pub fn is_pending(&self, id: &ApplicationId) -> bool {
        self.pending.contains_key(id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_stage_confirmed(&self, id: &StageId) -> bool {
        self.stages.contains(id) && !self.unconfirmed_stages.contains(id)
    }

    pub fn replace_tags(&mut self, tags: TagIndex) {
        debug!(entries = tags.len(), "tag index replaced");
        self.tags = tags;
    }

    /// Append a stage. It is shown at once but refuses moves until
    /// [`Self::confirm_stage`] records that the stage store accepted it.
    pub fn add_stage(
        &mut self,
        name: impl Into<String>,
        color: impl Into<String>,
    ) -> Result<Stage, BoardError> {
        let stage = self.stages.add_stage(name, color)?;
        self.unconfirmed_stages.insert(stage.id.clone());
        info!(stage_id = %stage.id, name = %stage.name, "stage created");
        Ok(stage)
    }

    pub fn confirm_stage(&mut self, id: &StageId) {
        self.unconfirmed_stages.remove(id);
    }

    /// Drop a created stage the stage store refused. Nothing can have moved
    /// into it while it was unconfirmed.
    pub fn withdraw_stage(&mut self, id: &StageId) -> Result<Stage, BoardError> {
        self.unconfirmed_stages.remove(id);
        let withdrawn = self.stages.remove_stage(id)?;
        info!(stage_id = %id, "stage withdrawn");
        Ok(withdrawn)
    }

    /// Patch a stage in place; returns the stage as it was before.
    pub fn update_stage(&mut self, id: &StageId, patch: StagePatch) -> Result<Stage, BoardError> {
        self.stages
            .update_stage(id, patch)
            .map_err(|err| self.report_missing(err))
    }

    /// Delete a stage. Refused while it holds applications or while a pending
    /// move might roll an application back into it.
    pub fn remove_stage(&mut self, id: &StageId) -> Result<Stage, BoardError> {
        if !self.stages.contains(id) {
            return Err(self.report_missing(BoardError::stage_not_found(id)));
        }

        let occupants = self.applications.count_in(id)
            + self
                .pending
                .values()
                .filter(|pending| &pending.previous == id)
                .count();
        if occupants > 0 {
            return Err(BoardError::StageOccupied {
                stage_id: id.clone(),
                count: occupants,
            });
        }

        let removed = self.stages.remove_stage(id)?;
        self.unconfirmed_stages.remove(id);
        info!(stage_id = %id, "stage removed");
        Ok(removed)
    }

    /// Undo a local stage mutation the stage store refused.
    pub fn restore_stage(&mut self, stage: Stage) {
        self.stages.insert(stage);
    }

    /// Feed one verb from an input adapter. Verbs naming anything other than
    /// the active session's subject are refused and leave the session as it was.
    pub fn apply_verb(&mut self, verb: DragVerb) -> Result<GestureResult, BoardError> {
        if !matches!(verb, DragVerb::PickUp(_)) {
            self.ensure_subject(verb.subject())?;
        }
        match verb {
            DragVerb::PickUp(id) => self.pick_up(id).map(|()| GestureResult::Armed),
            DragVerb::Move { over, .. } => self.hover(over).map(|()| GestureResult::Hovering),
            DragVerb::Drop { over, .. } => self.drop_on(over),
            DragVerb::Cancel { .. } => self.cancel_drag().map(|()| GestureResult::Cancelled),
        }
    }

    fn ensure_subject(&self, subject: &ApplicationId) -> Result<(), BoardError> {
        match self.drag.subject() {
            None => Err(BoardError::NoActiveSession),
            Some(active) if active == subject => Ok(()),
            Some(active) => {
                debug!(%active, foreign = %subject, "verb for another gesture ignored");
                Err(BoardError::SessionActive {
                    active: active.clone(),
                })
            }
        }
    }

    pub fn pick_up(&mut self, id: ApplicationId) -> Result<(), BoardError> {
        if self.applications.get(&id).is_none() {
            return Err(self.report_missing(BoardError::application_not_found(&id)));
        }
        if self.pending.contains_key(&id) {
            return Err(BoardError::MoveInFlight { application_id: id });
        }
        self.drag.pick_up(id)
    }

    /// Unknown or unconfirmed stages under the pointer are not highlighted.
    pub fn hover(&mut self, over: Option<StageId>) -> Result<(), BoardError> {
        let over = over.filter(|stage| self.is_stage_confirmed(stage));
        self.drag.hover(over)
    }

    pub fn cancel_drag(&mut self) -> Result<(), BoardError> {
        self.drag.cancel().map(|_| ())
    }

    /// Release the active drag. Drops outside a real stage cancel silently.
    pub fn drop_on(&mut self, over: Option<StageId>) -> Result<GestureResult, BoardError> {
        match self.drag.drop_on(over)? {
            DragOutcome::Cancelled { .. } => Ok(GestureResult::Cancelled),
            DragOutcome::Dropped(intent) => match self.begin_move(intent) {
                Ok(plan) => Ok(GestureResult::Dropped(plan)),
                Err(BoardError::InvalidTarget { stage_id }) => {
                    debug!(%stage_id, "drop target is not a stage, treating as cancel");
                    Ok(GestureResult::Cancelled)
                }
                Err(err) => Err(err),
            },
        }
    }

    /// Phase one: apply the intent to the local index before confirmation.
    pub fn begin_move(&mut self, intent: MoveIntent) -> Result<MovePlan, BoardError> {
        let id = &intent.application_id;
        if self.pending.contains_key(id) {
            return Err(BoardError::MoveInFlight {
                application_id: id.clone(),
            });
        }

        if self.applications.get(id).is_none() {
            return Err(self.report_missing(BoardError::application_not_found(id)));
        }
        if self.unconfirmed_stages.contains(&intent.target_stage_id) {
            debug!(stage_id = %intent.target_stage_id, "stage not yet confirmed");
            return Err(BoardError::InvalidTarget {
                stage_id: intent.target_stage_id.clone(),
            });
        }

        let change = self
            .applications
            .move_application(id, &intent.target_stage_id, &self.stages)
            .map_err(|err| self.report_missing(err))?;

        match change {
            StageChange::Unchanged => {
                debug!(application_id = %id, "move targets current stage");
                Ok(MovePlan::Unchanged)
            }
            StageChange::Moved { from } => {
                self.sequence += 1;
                self.pending.insert(
                    id.clone(),
                    PendingMove {
                        previous: from.clone(),
                        sequence: self.sequence,
                    },
                );
                info!(
                    application_id = %id,
                    from = %from,
                    to = %intent.target_stage_id,
                    "move applied optimistically"
                );
                Ok(MovePlan::Pending(MoveTicket {
                    intent,
                    previous: from,
                    sequence: self.sequence,
                }))
            }
        }
    }

    /// Phase two: keep the move on success, revert it on failure.
    pub fn settle_move(
        &mut self,
        ticket: MoveTicket,
        result: Result<(), StoreError>,
    ) -> Result<(), BoardError> {
        let id = ticket.intent.application_id;
        let current = self.pending.get(&id).map(|pending| pending.sequence) == Some(ticket.sequence);
        if !current {
            warn!(application_id = %id, "settled a move that is not pending");
            return Err(BoardError::NotFound {
                resource: "pending move",
                id: id.to_string(),
            });
        }
        self.pending.remove(&id);

        match result {
            Ok(()) => {
                info!(application_id = %id, stage_id = %ticket.intent.target_stage_id, "move confirmed");
                Ok(())
            }
            Err(store_error) => {
                warn!(
                    application_id = %id,
                    error = %store_error,
                    restored = %ticket.previous,
                    "move rejected, rolling back"
                );
                self.applications.rollback(&id, ticket.previous)?;
                self.notices.push(
                    BoardNotice::new(
                        NoticeKind::MoveReverted,
                        "The move could not be saved and was undone. Please try again.",
                    )
                    .for_application(id)
                    .retryable(),
                );
                Err(BoardError::PersistenceFailure {
                    reason: store_error.to_string(),
                })
            }
        }
    }

    /// Log a missing-record error and queue the generic failure notice.
    /// Other errors pass through untouched.
    fn report_missing(&mut self, err: BoardError) -> BoardError {
        if let BoardError::NotFound { resource, id } = &err {
            error!(resource = *resource, %id, "operation references missing data");
            let mut notice =
                BoardNotice::new(NoticeKind::UnexpectedFailure, "Something went wrong. Please reload the board.");
            if *resource == "application" {
                notice = notice.for_application(ApplicationId::new(id.clone()));
            }
            self.notices.push(notice);
        }
        err
    }

    pub fn push_notice(&mut self, notice: BoardNotice) {
        self.notices.push(notice);
    }

    pub fn take_notices(&mut self) -> Vec<BoardNotice> {
        std::mem::take(&mut self.notices)
    }

    /// Derive every column, left to right.
    pub fn render(&self) -> BoardView {
        let hover = self.drag.hover_target();
        let subject = self.drag.subject();

        let columns = self
            .stages
            .listing()
            .into_iter()
            .map(|stage| {
                let mut column =
                    render_column(stage, self.applications.by_stage(&stage.id), &self.tags);
                column.highlighted = hover == Some(&stage.id);
                column.pending = self.unconfirmed_stages.contains(&stage.id);
                for card in &mut column.cards {
                    card.dragging = subject == Some(&card.application_id);
                    card.pending = self.pending.contains_key(&card.application_id);
                }
                column
            })
            .collect();

        BoardView {
            columns,
            total: self.applications.len(),
        }
    }
}
