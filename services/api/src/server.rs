use crate::cli::ServeArgs;
use crate::infra::{
    sample_board, AppState, InMemoryMoveStore, InMemoryStageStore, LoggingNoticePublisher,
};
use crate::routes::with_board_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use hiring_board::config::AppConfig;
use hiring_board::error::AppError;
use hiring_board::pipeline::BoardService;
use hiring_board::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let board_service = Arc::new(BoardService::new(
        sample_board()?,
        Arc::new(InMemoryMoveStore::rejecting(args.reject_moves)),
        Arc::new(InMemoryStageStore::default()),
        Arc::new(LoggingNoticePublisher::default()),
    ));

    let app = with_board_routes(board_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "hiring pipeline board ready");
    info!(
        pointer_px = config.sensors.pointer_distance_px,
        mouse_px = config.sensors.mouse_distance_px,
        touch_delay_ms = config.sensors.touch_delay.as_millis() as u64,
        touch_tolerance_px = config.sensors.touch_tolerance_px,
        "drag activation thresholds for board clients"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
