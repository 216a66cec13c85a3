use crate::infra::{sample_board, InMemoryStageStore, LoggingNoticePublisher};
use async_trait::async_trait;
use clap::{Args, ValueEnum};
use hiring_board::config::SensorConfig;
use hiring_board::error::AppError;
use hiring_board::pipeline::{
    ApplicationId, BoardError, BoardService, BoardView, DragVerb, Modality, MoveIntent,
    MoveReceipt, MoveStore, Point, RawInput, Sensor, StageId, StoreError,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub(crate) enum DemoModality {
    #[default]
    Mouse,
    Pointer,
    Touch,
}

impl From<DemoModality> for Modality {
    fn from(value: DemoModality) -> Self {
        match value {
            DemoModality::Mouse => Modality::Mouse,
            DemoModality::Pointer => Modality::Pointer,
            DemoModality::Touch => Modality::Touch,
        }
    }
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Input device used for the scripted drag
    #[arg(long, value_enum, default_value_t)]
    pub(crate) modality: DemoModality,
    /// Make the move store refuse the scripted drag as well
    #[arg(long)]
    pub(crate) reject_moves: bool,
}

/// Move store whose answer the script flips between steps.
#[derive(Default)]
struct ScriptedMoveStore {
    reject: AtomicBool,
    accepted: AtomicUsize,
}

#[async_trait]
impl MoveStore for ScriptedMoveStore {
    async fn commit_move(&self, intent: &MoveIntent) -> Result<(), StoreError> {
        if self.reject.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable(format!(
                "pipeline service timed out moving {}",
                intent.application_id
            )));
        }
        self.accepted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

type DemoService = BoardService<ScriptedMoveStore, InMemoryStageStore, LoggingNoticePublisher>;

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let moves = Arc::new(ScriptedMoveStore::default());
    moves.reject.store(args.reject_moves, Ordering::Relaxed);
    let notices = Arc::new(LoggingNoticePublisher::default());
    let service = BoardService::new(
        sample_board()?,
        moves.clone(),
        Arc::new(InMemoryStageStore::default()),
        notices.clone(),
    );

    println!("Hiring pipeline board demo");
    render_board(&service.render());

    let modality = Modality::from(args.modality);
    println!("\n1. Drag app-002 from Applied to Phone Screen ({modality:?})");
    let verbs = scripted_drag(modality, "app-002", "screen");
    report_move(play(&service, verbs).await);
    for notice in notices.drain() {
        println!("   notice: {} - {}", notice.kind.label(), notice.message);
    }

    println!("\n2. Pick up app-003, then try to grab app-004 mid-drag");
    service
        .gesture(DragVerb::PickUp(ApplicationId::new("app-003")))
        .await?;
    service
        .gesture(DragVerb::Move {
            subject: ApplicationId::new("app-003"),
            over: Some(StageId::new("offer")),
        })
        .await?;
    match service
        .gesture(DragVerb::PickUp(ApplicationId::new("app-004")))
        .await
    {
        Ok(_) => println!("   second pick-up unexpectedly accepted"),
        Err(err) => println!("   second pick-up ignored: {err}"),
    }
    service
        .gesture(DragVerb::Cancel {
            subject: ApplicationId::new("app-003"),
        })
        .await?;
    println!("   drag cancelled, nothing persisted");

    println!("\n3. Menu action: move app-005 to Interview while the store is refusing moves");
    moves.reject.store(true, Ordering::Relaxed);
    report_move(
        service
            .dispatch_move(MoveIntent::new(
                ApplicationId::new("app-005"),
                StageId::new("interview"),
            ))
            .await
            .map(Some),
    );
    for notice in notices.drain() {
        println!("   notice: {} - {}", notice.kind.label(), notice.message);
    }
    moves.reject.store(args.reject_moves, Ordering::Relaxed);

    println!("\n4. Drop app-006 back onto Interview");
    report_move(play(&service, scripted_drag(modality, "app-006", "interview")).await);

    println!("\n5. Stage maintenance");
    match service.delete_stage(&StageId::new("applied")).await {
        Ok(_) => println!("   Applied deleted"),
        Err(err) => println!("   delete refused: {err}"),
    }
    let hired = service
        .create_stage("Hired".to_string(), "#ba68c8".to_string())
        .await?;
    println!("   created {} at order {}", hired.name, hired.order);

    println!(
        "\nFinal board ({} moves persisted)",
        moves.accepted.load(Ordering::Relaxed)
    );
    render_board(&service.render());
    Ok(())
}

async fn play(
    service: &DemoService,
    verbs: Vec<DragVerb>,
) -> Result<Option<MoveReceipt>, BoardError> {
    let mut last = Ok(None);
    for verb in verbs {
        last = service.gesture(verb).await;
        if last.is_err() {
            break;
        }
    }
    last
}

/// Synthesize a raw event timeline that satisfies the modality's activation constraint.
fn scripted_drag(modality: Modality, application: &str, target: &str) -> Vec<DragVerb> {
    let mut sensor = Sensor::for_modality(modality, &SensorConfig::default());
    let start = Instant::now();
    let target = Some(StageId::new(target));
    let mut verbs = sensor.handle(RawInput::Down {
        application_id: ApplicationId::new(application),
        at: Point::new(0.0, 0.0),
        time: start,
    });

    if modality == Modality::Touch {
        verbs.extend(sensor.tick(start + Duration::from_millis(300)));
    }
    verbs.extend(sensor.handle(RawInput::Move {
        at: Point::new(220.0, 4.0),
        time: start + Duration::from_millis(350),
        over: target.clone(),
    }));
    verbs.extend(sensor.handle(RawInput::Up {
        at: Point::new(220.0, 4.0),
        over: target,
    }));
    verbs
}

fn report_move(result: Result<Option<MoveReceipt>, BoardError>) {
    match result {
        Ok(Some(MoveReceipt::Confirmed { from, to })) => println!("   moved {from} -> {to}"),
        Ok(Some(MoveReceipt::Unchanged)) => println!("   already there, nothing to save"),
        Ok(None) => println!("   gesture ended without a move"),
        Err(err) => println!("   move failed: {err}"),
    }
}

fn render_board(view: &BoardView) {
    for column in &view.columns {
        println!("[{}] {} ({})", column.order, column.name, column.count);
        for card in &column.cards {
            let rating = card
                .rating
                .map(|value| format!("{value}/5"))
                .unwrap_or_else(|| "unrated".to_string());
            let overflow = if card.overflow_tags > 0 {
                format!(" +{}", card.overflow_tags)
            } else {
                String::new()
            };
            println!(
                "  - {} | {} | {} @ {} | tags: {}{}",
                card.candidate_name,
                rating,
                card.role_title,
                card.employer_name,
                card.tags.join(", "),
                overflow
            );
        }
    }
}
