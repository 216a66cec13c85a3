use async_trait::async_trait;
use hiring_board::pipeline::{
    ApplicationCard, ApplicationId, ApplicationIndex, Board, BoardError, BoardNotice, MoveIntent,
    MoveStore, NoticePublisher, Rating, Stage, StageId, StageRegistry, StageStore, StoreError,
    TagIndex,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Stand-in system of record for stage membership.
#[derive(Default)]
pub(crate) struct InMemoryMoveStore {
    membership: Mutex<HashMap<ApplicationId, StageId>>,
    reject: AtomicBool,
}

impl InMemoryMoveStore {
    pub(crate) fn rejecting(reject: bool) -> Self {
        let store = Self::default();
        store.reject.store(reject, Ordering::Relaxed);
        store
    }

}

#[async_trait]
impl MoveStore for InMemoryMoveStore {
    async fn commit_move(&self, intent: &MoveIntent) -> Result<(), StoreError> {
        if self.reject.load(Ordering::Relaxed) {
            return Err(StoreError::Rejected(format!(
                "{} cannot enter {}",
                intent.application_id, intent.target_stage_id
            )));
        }
        let mut guard = self.membership.lock().expect("move store mutex poisoned");
        let previous = guard.insert(
            intent.application_id.clone(),
            intent.target_stage_id.clone(),
        );
        info!(
            application_id = %intent.application_id,
            stage_id = %intent.target_stage_id,
            previous = ?previous,
            tracked = guard.len(),
            "move recorded"
        );
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryStageStore {
    stages: Mutex<HashMap<StageId, Stage>>,
}

#[async_trait]
impl StageStore for InMemoryStageStore {
    async fn create_stage(&self, stage: &Stage) -> Result<(), StoreError> {
        let mut guard = self.stages.lock().expect("stage store mutex poisoned");
        if guard.contains_key(&stage.id) {
            return Err(StoreError::Rejected(format!("stage {} exists", stage.id)));
        }
        guard.insert(stage.id.clone(), stage.clone());
        Ok(())
    }

    async fn update_stage(&self, stage: &Stage) -> Result<(), StoreError> {
        let mut guard = self.stages.lock().expect("stage store mutex poisoned");
        guard.insert(stage.id.clone(), stage.clone());
        Ok(())
    }

    async fn delete_stage(&self, id: &StageId) -> Result<(), StoreError> {
        let mut guard = self.stages.lock().expect("stage store mutex poisoned");
        guard.remove(id);
        Ok(())
    }
}

/// Logs every notice and keeps a copy for the demo transcript.
#[derive(Default, Clone)]
pub(crate) struct LoggingNoticePublisher {
    events: Arc<Mutex<Vec<BoardNotice>>>,
}

impl NoticePublisher for LoggingNoticePublisher {
    fn publish(&self, notice: BoardNotice) {
        warn!(
            kind = notice.kind.label(),
            application_id = ?notice.application_id,
            retryable = notice.retryable,
            "{}",
            notice.message
        );
        let mut guard = self.events.lock().expect("notice mutex poisoned");
        guard.push(notice);
    }
}

impl LoggingNoticePublisher {
    pub(crate) fn drain(&self) -> Vec<BoardNotice> {
        std::mem::take(&mut *self.events.lock().expect("notice mutex poisoned"))
    }
}

pub(crate) fn sample_board() -> Result<Board, BoardError> {
    let stages = StageRegistry::from_stages(
        [
            ("applied", "Applied", "#90a4ae"),
            ("screen", "Phone Screen", "#4fc3f7"),
            ("interview", "Interview", "#81c784"),
            ("offer", "Offer", "#ffb74d"),
        ]
        .into_iter()
        .enumerate()
        .map(|(order, (id, name, color))| Stage {
            id: StageId::new(id),
            name: name.to_string(),
            color: color.to_string(),
            order: order as i64,
        }),
    );

    let cards = [
        ("app-001", "Ada Park", None, "applied"),
        ("app-002", "Bilal Okafor", Some(5), "applied"),
        ("app-003", "Chen Wei", Some(3), "applied"),
        ("app-004", "Dana Ruiz", None, "applied"),
        ("app-005", "Eli Novak", Some(4), "screen"),
        ("app-006", "Farah Haddad", Some(2), "interview"),
    ]
    .into_iter()
    .map(|(id, name, rating, stage)| ApplicationCard {
        id: ApplicationId::new(id),
        candidate_name: name.to_string(),
        rating: rating.and_then(|value| Rating::new(value).ok()),
        stage_id: StageId::new(stage),
        role_title: "Backend Engineer".to_string(),
        employer_name: "Northwind Labs".to_string(),
    });

    let mut tags = BTreeMap::new();
    tags.insert(
        ApplicationId::new("app-002"),
        ["referral", "rust", "remote", "senior", "relocation"]
            .into_iter()
            .map(String::from)
            .collect(),
    );
    tags.insert(ApplicationId::new("app-005"), vec!["go".to_string()]);

    Board::new(stages, ApplicationIndex::from_cards(cards), TagIndex::new(tags))
}
