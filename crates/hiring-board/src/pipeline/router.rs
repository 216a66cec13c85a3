use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{ApplicationId, MoveIntent, StageId, StagePatch, TagIndex};
use super::error::BoardError;
use super::service::{BoardService, MoveReceipt};
use super::store::{MoveStore, NoticePublisher, StageStore};

/// Router builder exposing the board over HTTP.
pub fn board_router<M, S, N>(service: Arc<BoardService<M, S, N>>) -> Router
where
    M: MoveStore + 'static,
    S: StageStore + 'static,
    N: NoticePublisher + 'static,
{
    Router::new()
        .route("/api/v1/board", get(board_handler::<M, S, N>))
        .route("/api/v1/board/moves", post(move_handler::<M, S, N>))
        .route("/api/v1/board/stages", post(create_stage_handler::<M, S, N>))
        .route(
            "/api/v1/board/stages/:stage_id",
            patch(update_stage_handler::<M, S, N>).delete(delete_stage_handler::<M, S, N>),
        )
        .route("/api/v1/board/tags", put(tags_handler::<M, S, N>))
        .with_state(service)
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MoveRequest {
    pub application_id: ApplicationId,
    pub stage_id: StageId,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateStageRequest {
    pub name: String,
    #[serde(default = "default_stage_color")]
    pub color: String,
}

fn default_stage_color() -> String {
    "#9e9e9e".to_string()
}

pub(crate) fn status_for(error: &BoardError) -> StatusCode {
    match error {
        BoardError::NotFound { .. } => StatusCode::NOT_FOUND,
        BoardError::InvalidTarget { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        BoardError::PersistenceFailure { .. } => StatusCode::BAD_GATEWAY,
        BoardError::MoveInFlight { .. }
        | BoardError::StageOccupied { .. }
        | BoardError::SessionActive { .. }
        | BoardError::NoActiveSession
        | BoardError::StageOrderExhausted => StatusCode::CONFLICT,
    }
}

pub(crate) fn error_response(error: BoardError) -> Response {
    let payload = json!({
        "error": error.to_string(),
        "retryable": error.is_retryable(),
    });
    (status_for(&error), axum::Json(payload)).into_response()
}

pub(crate) async fn board_handler<M, S, N>(
    State(service): State<Arc<BoardService<M, S, N>>>,
) -> Response
where
    M: MoveStore + 'static,
    S: StageStore + 'static,
    N: NoticePublisher + 'static,
{
    (StatusCode::OK, axum::Json(service.render())).into_response()
}

pub(crate) async fn move_handler<M, S, N>(
    State(service): State<Arc<BoardService<M, S, N>>>,
    axum::Json(request): axum::Json<MoveRequest>,
) -> Response
where
    M: MoveStore + 'static,
    S: StageStore + 'static,
    N: NoticePublisher + 'static,
{
    let intent = MoveIntent::new(request.application_id.clone(), request.stage_id);
    match service.dispatch_move(intent).await {
        Ok(MoveReceipt::Unchanged) => {
            let payload = json!({
                "application_id": request.application_id,
                "status": "unchanged",
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Ok(MoveReceipt::Confirmed { from, to }) => {
            let payload = json!({
                "application_id": request.application_id,
                "status": "moved",
                "from": from,
                "to": to,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_stage_handler<M, S, N>(
    State(service): State<Arc<BoardService<M, S, N>>>,
    axum::Json(request): axum::Json<CreateStageRequest>,
) -> Response
where
    M: MoveStore + 'static,
    S: StageStore + 'static,
    N: NoticePublisher + 'static,
{
    match service.create_stage(request.name, request.color).await {
        Ok(stage) => (StatusCode::CREATED, axum::Json(stage)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_stage_handler<M, S, N>(
    State(service): State<Arc<BoardService<M, S, N>>>,
    Path(stage_id): Path<String>,
    axum::Json(patch): axum::Json<StagePatch>,
) -> Response
where
    M: MoveStore + 'static,
    S: StageStore + 'static,
    N: NoticePublisher + 'static,
{
    if patch.is_empty() {
        let payload = json!({ "error": "patch must set a name or a color" });
        return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
    }

    match service.update_stage(&StageId(stage_id), patch).await {
        Ok(stage) => (StatusCode::OK, axum::Json(stage)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_stage_handler<M, S, N>(
    State(service): State<Arc<BoardService<M, S, N>>>,
    Path(stage_id): Path<String>,
) -> Response
where
    M: MoveStore + 'static,
    S: StageStore + 'static,
    N: NoticePublisher + 'static,
{
    match service.delete_stage(&StageId(stage_id)).await {
        Ok(stage) => {
            let payload = json!({ "deleted": true, "id": stage.id });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn tags_handler<M, S, N>(
    State(service): State<Arc<BoardService<M, S, N>>>,
    axum::Json(tags): axum::Json<TagIndex>,
) -> Response
where
    M: MoveStore + 'static,
    S: StageStore + 'static,
    N: NoticePublisher + 'static,
{
    service.replace_tags(tags);
    StatusCode::NO_CONTENT.into_response()
}
