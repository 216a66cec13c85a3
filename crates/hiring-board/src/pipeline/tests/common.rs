use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::pipeline::domain::{
    ApplicationCard, ApplicationId, MoveIntent, Rating, Stage, StageId, TagIndex,
};
use crate::pipeline::store::{BoardNotice, MoveStore, NoticePublisher, StageStore, StoreError};
use crate::pipeline::{ApplicationIndex, Board, BoardService, StageRegistry};

pub(super) fn stage(id: &str, name: &str, order: i64) -> Stage {
    Stage {
        id: StageId::new(id),
        name: name.to_string(),
        color: "#90caf9".to_string(),
        order,
    }
}

pub(super) fn card(id: &str, stage_id: &str, rating: Option<u8>) -> ApplicationCard {
    ApplicationCard {
        id: ApplicationId::new(id),
        candidate_name: format!("Candidate {id}"),
        rating: rating.map(|value| Rating::new(value).expect("valid rating")),
        stage_id: StageId::new(stage_id),
        role_title: "Platform Engineer".to_string(),
        employer_name: "Northwind".to_string(),
    }
}

pub(super) fn app(id: &str) -> ApplicationId {
    ApplicationId::new(id)
}

pub(super) fn sid(id: &str) -> StageId {
    StageId::new(id)
}

pub(super) fn intent(application: &str, stage_id: &str) -> MoveIntent {
    MoveIntent::new(app(application), sid(stage_id))
}

/// `new` (order 0) and `interview` (order 1), with A1 rated 4 in `new`.
pub(super) fn two_stage_board() -> Board {
    board_with(vec![card("A1", "new", Some(4))])
}

pub(super) fn board_with(cards: Vec<ApplicationCard>) -> Board {
    let stages = StageRegistry::from_stages([
        stage("new", "New", 0),
        stage("interview", "Interview", 1),
    ]);
    Board::new(stages, ApplicationIndex::from_cards(cards), TagIndex::default())
        .expect("valid board")
}

pub(super) fn ids_in(board: &Board, stage_id: &str) -> Vec<String> {
    board
        .by_stage(&sid(stage_id))
        .iter()
        .map(|card| card.id.0.clone())
        .collect()
}

/// Every application appears in exactly one known stage.
pub(super) fn assert_partition(board: &Board) {
    let mut seen = HashSet::new();
    for stage in board.stages().listing() {
        for card in board.by_stage(&stage.id) {
            assert!(seen.insert(card.id.clone()), "duplicate {}", card.id);
        }
    }
    assert_eq!(seen.len(), board.applications().len());
}

#[derive(Default)]
pub(super) struct MemoryMoves {
    pub(super) reject: bool,
    pub(super) commits: Mutex<Vec<MoveIntent>>,
}

impl MemoryMoves {
    pub(super) fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    pub(super) fn commits(&self) -> Vec<MoveIntent> {
        self.commits.lock().expect("commit mutex poisoned").clone()
    }
}

#[async_trait]
impl MoveStore for MemoryMoves {
    async fn commit_move(&self, intent: &MoveIntent) -> Result<(), StoreError> {
        self.commits
            .lock()
            .expect("commit mutex poisoned")
            .push(intent.clone());
        if self.reject {
            Err(StoreError::Rejected("stage transition not allowed".to_string()))
        } else {
            Ok(())
        }
    }
}

/// Holds every commit until released, so tests can act while a move is in flight.
#[derive(Default)]
pub(super) struct GatedMoves {
    pub(super) gate: Notify,
    pub(super) entered: Notify,
    pub(super) reject: bool,
}

#[async_trait]
impl MoveStore for GatedMoves {
    async fn commit_move(&self, _intent: &MoveIntent) -> Result<(), StoreError> {
        self.entered.notify_one();
        self.gate.notified().await;
        if self.reject {
            Err(StoreError::Unavailable("timeout".to_string()))
        } else {
            Ok(())
        }
    }
}

#[derive(Default)]
pub(super) struct MemoryStages {
    pub(super) reject: bool,
    pub(super) calls: AtomicUsize,
}

impl MemoryStages {
    pub(super) fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    fn answer(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.reject {
            Err(StoreError::Unavailable("stage service offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl StageStore for MemoryStages {
    async fn create_stage(&self, _stage: &Stage) -> Result<(), StoreError> {
        self.answer()
    }

    async fn update_stage(&self, _stage: &Stage) -> Result<(), StoreError> {
        self.answer()
    }

    async fn delete_stage(&self, _id: &StageId) -> Result<(), StoreError> {
        self.answer()
    }
}

/// Holds `create_stage` until released; other calls answer at once.
#[derive(Default)]
pub(super) struct GatedStages {
    pub(super) gate: Notify,
    pub(super) entered: Notify,
    pub(super) reject: bool,
}

impl GatedStages {
    fn answer(&self) -> Result<(), StoreError> {
        if self.reject {
            Err(StoreError::Rejected("stage name taken".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl StageStore for GatedStages {
    async fn create_stage(&self, _stage: &Stage) -> Result<(), StoreError> {
        self.entered.notify_one();
        self.gate.notified().await;
        self.answer()
    }

    async fn update_stage(&self, _stage: &Stage) -> Result<(), StoreError> {
        self.answer()
    }

    async fn delete_stage(&self, _id: &StageId) -> Result<(), StoreError> {
        self.answer()
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotices {
    events: Arc<Mutex<Vec<BoardNotice>>>,
}

impl NoticePublisher for MemoryNotices {
    fn publish(&self, notice: BoardNotice) {
        self.events
            .lock()
            .expect("notice mutex poisoned")
            .push(notice);
    }
}

impl MemoryNotices {
    pub(super) fn events(&self) -> Vec<BoardNotice> {
        self.events.lock().expect("notice mutex poisoned").clone()
    }
}

pub(super) type TestService<M> = BoardService<M, MemoryStages, MemoryNotices>;

pub(super) fn build_service<M: MoveStore + 'static>(
    board: Board,
    moves: M,
) -> (TestService<M>, Arc<M>, Arc<MemoryNotices>) {
    let moves = Arc::new(moves);
    let notices = Arc::new(MemoryNotices::default());
    let service = BoardService::new(
        board,
        moves.clone(),
        Arc::new(MemoryStages::default()),
        notices.clone(),
    );
    (service, moves, notices)
}
