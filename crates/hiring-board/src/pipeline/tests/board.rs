use super::common::*;
use crate::pipeline::store::{NoticeKind, StoreError};
use crate::pipeline::{
    Board, BoardError, DragPhase, DragVerb, GestureResult, MovePlan, StageRegistry, TagIndex,
};
use crate::pipeline::{ApplicationIndex, StagePatch};

fn pending(plan: MovePlan) -> crate::pipeline::MoveTicket {
    match plan {
        MovePlan::Pending(ticket) => ticket,
        other => panic!("expected a pending move, got {other:?}"),
    }
}

#[test]
fn new_rejects_applications_in_unknown_stages() {
    let stages = StageRegistry::from_stages([stage("new", "New", 0)]);
    let cards = ApplicationIndex::from_cards([card("A1", "offer", None)]);

    match Board::new(stages, cards, TagIndex::default()) {
        Err(BoardError::NotFound {
            resource: "stage", ..
        }) => {}
        other => panic!("expected missing stage, got {other:?}"),
    }
}

#[test]
fn confirmed_drag_moves_application() {
    let mut board = two_stage_board();

    board.pick_up(app("A1")).expect("armed");
    board.hover(Some(sid("interview"))).expect("dragging");
    assert_partition(&board);

    let GestureResult::Dropped(plan) = board.drop_on(Some(sid("interview"))).expect("dropped")
    else {
        panic!("expected a drop");
    };
    let ticket = pending(plan);
    assert_eq!(ids_in(&board, "interview"), vec!["A1"]);
    assert!(board.is_pending(&app("A1")));

    board.settle_move(ticket, Ok(())).expect("confirmed");

    assert_eq!(ids_in(&board, "interview"), vec!["A1"]);
    assert!(ids_in(&board, "new").is_empty());
    assert_eq!(board.pending_count(), 0);
    assert!(board.take_notices().is_empty());
}

#[test]
fn rejected_move_rolls_back_and_raises_notice() {
    let mut board = two_stage_board();
    let before: Vec<_> = board.applications().cards().to_vec();

    let ticket = pending(board.begin_move(intent("A1", "interview")).expect("applied"));
    assert_eq!(ids_in(&board, "interview"), vec!["A1"]);

    let err = board
        .settle_move(ticket, Err(StoreError::Rejected("locked".to_string())))
        .expect_err("persistence failure");

    assert!(matches!(err, BoardError::PersistenceFailure { .. }));
    assert!(err.is_retryable());
    assert_eq!(board.applications().cards(), before.as_slice());
    assert_eq!(ids_in(&board, "new"), vec!["A1"]);
    assert!(ids_in(&board, "interview").is_empty());

    let notices = board.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NoticeKind::MoveReverted);
    assert_eq!(notices[0].application_id, Some(app("A1")));
    assert!(notices[0].retryable);
}

#[test]
fn dropping_on_current_stage_is_a_no_op() {
    let mut board = two_stage_board();
    board.pick_up(app("A1")).expect("armed");

    let result = board.drop_on(Some(sid("new"))).expect("dropped");

    assert_eq!(result, GestureResult::Dropped(MovePlan::Unchanged));
    assert_eq!(ids_in(&board, "new"), vec!["A1"]);
    assert_eq!(board.pending_count(), 0);
}

#[test]
fn second_pick_up_is_ignored_while_dragging() {
    let mut board = board_with(vec![card("A1", "new", Some(4)), card("A2", "new", None)]);
    board.pick_up(app("A1")).expect("armed");
    board.hover(Some(sid("interview"))).expect("dragging");

    let err = board.pick_up(app("A2")).expect_err("rejected");

    assert_eq!(err, BoardError::SessionActive { active: app("A1") });
    assert_eq!(board.drag().subject(), Some(&app("A1")));
    assert!(matches!(board.drag().phase(), DragPhase::Dragging { .. }));
}

#[test]
fn drop_on_unknown_stage_cancels_silently() {
    let mut board = two_stage_board();
    board.pick_up(app("A1")).expect("armed");

    let result = board.drop_on(Some(sid("archived"))).expect("cancelled");

    assert_eq!(result, GestureResult::Cancelled);
    assert_eq!(ids_in(&board, "new"), vec!["A1"]);
    assert!(!board.drag().is_active());
    assert!(board.take_notices().is_empty());
}

#[test]
fn cancelled_drag_has_no_side_effects() {
    let mut board = two_stage_board();
    let before = board.render();

    board
        .apply_verb(DragVerb::PickUp(app("A1")))
        .expect("armed");
    board
        .apply_verb(DragVerb::Move {
            subject: app("A1"),
            over: Some(sid("interview")),
        })
        .expect("hovering");
    let result = board
        .apply_verb(DragVerb::Cancel { subject: app("A1") })
        .expect("cancelled");

    assert_eq!(result, GestureResult::Cancelled);
    assert_eq!(board.render(), before);
    assert_eq!(board.pending_count(), 0);
}

#[test]
fn one_move_in_flight_per_application() {
    let mut board = two_stage_board();
    let _ticket = pending(board.begin_move(intent("A1", "interview")).expect("applied"));

    assert_eq!(
        board.begin_move(intent("A1", "new")),
        Err(BoardError::MoveInFlight {
            application_id: app("A1")
        })
    );
    assert_eq!(
        board.pick_up(app("A1")),
        Err(BoardError::MoveInFlight {
            application_id: app("A1")
        })
    );
}

#[test]
fn other_applications_move_while_one_is_in_flight() {
    let mut board = board_with(vec![card("A1", "new", Some(4)), card("A2", "new", Some(2))]);
    let first = pending(board.begin_move(intent("A1", "interview")).expect("applied"));

    board.pick_up(app("A2")).expect("other card armed");
    let GestureResult::Dropped(plan) = board.drop_on(Some(sid("interview"))).expect("dropped")
    else {
        panic!("expected a drop");
    };
    let second = pending(plan);

    board
        .settle_move(first, Err(StoreError::Unavailable("timeout".to_string())))
        .expect_err("first rejected");
    board.settle_move(second, Ok(())).expect("second confirmed");

    assert_eq!(ids_in(&board, "new"), vec!["A1"]);
    assert_eq!(ids_in(&board, "interview"), vec!["A2"]);
    assert_partition(&board);
}

#[test]
fn unknown_application_surfaces_generic_notice() {
    let mut board = two_stage_board();

    let err = board
        .begin_move(intent("ghost", "interview"))
        .expect_err("missing application");

    assert!(matches!(
        err,
        BoardError::NotFound {
            resource: "application",
            ..
        }
    ));
    let notices = board.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NoticeKind::UnexpectedFailure);

    let err = board
        .apply_verb(DragVerb::PickUp(app("ghost")))
        .expect_err("missing application");
    assert!(matches!(err, BoardError::NotFound { .. }));
    assert!(!board.drag().is_active());
    let notices = board.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NoticeKind::UnexpectedFailure);
    assert_eq!(notices[0].application_id, Some(app("ghost")));
}

#[test]
fn unknown_stage_edits_surface_generic_notice() {
    let mut board = two_stage_board();

    assert!(matches!(
        board.update_stage(&sid("ghost"), StagePatch::name("Ghost")),
        Err(BoardError::NotFound { resource: "stage", .. })
    ));
    assert!(matches!(
        board.remove_stage(&sid("ghost")),
        Err(BoardError::NotFound { resource: "stage", .. })
    ));

    let notices = board.take_notices();
    assert_eq!(notices.len(), 2);
    assert!(notices
        .iter()
        .all(|notice| notice.kind == NoticeKind::UnexpectedFailure && notice.application_id.is_none()));
}

#[test]
fn verbs_for_another_subject_leave_the_session_alone() {
    let mut board = board_with(vec![card("A1", "new", Some(4)), card("A2", "new", None)]);
    board.apply_verb(DragVerb::PickUp(app("A1"))).expect("armed");
    board
        .apply_verb(DragVerb::Move {
            subject: app("A1"),
            over: Some(sid("new")),
        })
        .expect("hovering");

    assert_eq!(
        board.apply_verb(DragVerb::PickUp(app("A2"))),
        Err(BoardError::SessionActive { active: app("A1") })
    );
    assert_eq!(
        board.apply_verb(DragVerb::Drop {
            subject: app("A2"),
            over: Some(sid("interview")),
        }),
        Err(BoardError::SessionActive { active: app("A1") })
    );
    assert_eq!(
        board.apply_verb(DragVerb::Cancel { subject: app("A2") }),
        Err(BoardError::SessionActive { active: app("A1") })
    );

    assert_eq!(board.drag().subject(), Some(&app("A1")));
    assert_eq!(board.drag().hover_target(), Some(&sid("new")));
    assert_eq!(ids_in(&board, "new"), vec!["A1", "A2"]);
    assert_eq!(board.pending_count(), 0);
}

#[test]
fn verbs_without_a_session_are_refused() {
    let mut board = two_stage_board();
    assert_eq!(
        board.apply_verb(DragVerb::Drop {
            subject: app("A1"),
            over: Some(sid("interview")),
        }),
        Err(BoardError::NoActiveSession)
    );
    assert_eq!(ids_in(&board, "new"), vec!["A1"]);
}

#[test]
fn unconfirmed_stage_refuses_moves_until_confirmed() {
    let mut board = two_stage_board();
    let offer = board.add_stage("Offer", "#ffb300").expect("added");

    assert!(!board.is_stage_confirmed(&offer.id));
    assert_eq!(
        board.begin_move(intent("A1", offer.id.as_str())),
        Err(BoardError::InvalidTarget {
            stage_id: offer.id.clone()
        })
    );
    assert!(board.render().columns[2].pending);

    board.pick_up(app("A1")).expect("armed");
    board.hover(Some(offer.id.clone())).expect("dragging");
    assert!(board.drag().hover_target().is_none());
    assert_eq!(
        board.drop_on(Some(offer.id.clone())),
        Ok(GestureResult::Cancelled)
    );
    assert_eq!(ids_in(&board, "new"), vec!["A1"]);

    board.confirm_stage(&offer.id);
    assert!(matches!(
        board.begin_move(intent("A1", offer.id.as_str())),
        Ok(MovePlan::Pending(_))
    ));
}

#[test]
fn stale_ticket_is_refused() {
    let mut board = two_stage_board();
    let ticket = pending(board.begin_move(intent("A1", "interview")).expect("applied"));
    board.settle_move(ticket.clone(), Ok(())).expect("confirmed");

    assert!(matches!(
        board.settle_move(ticket, Err(StoreError::Rejected("late".to_string()))),
        Err(BoardError::NotFound {
            resource: "pending move",
            ..
        })
    ));
    assert_eq!(ids_in(&board, "interview"), vec!["A1"]);
}

#[test]
fn occupied_stage_cannot_be_removed() {
    let mut board = two_stage_board();

    assert_eq!(
        board.remove_stage(&sid("new")),
        Err(BoardError::StageOccupied {
            stage_id: sid("new"),
            count: 1
        })
    );
    board.remove_stage(&sid("interview")).expect("empty stage removed");
    assert_eq!(board.stages().len(), 1);
}

#[test]
fn stage_referenced_by_pending_rollback_is_protected() {
    let mut board = two_stage_board();
    let _ticket = pending(board.begin_move(intent("A1", "interview")).expect("applied"));

    assert!(matches!(
        board.remove_stage(&sid("new")),
        Err(BoardError::StageOccupied { count: 1, .. })
    ));
}

#[test]
fn render_orders_columns_and_marks_drag_state() {
    let mut board = board_with(vec![
        card("A1", "new", None),
        card("A2", "new", Some(5)),
        card("A3", "new", Some(3)),
        card("A4", "new", None),
    ]);
    let offer = board.add_stage("Offer", "#ffb300").expect("added");
    board
        .update_stage(&offer.id, StagePatch::name("Offer extended"))
        .expect("renamed");

    board.pick_up(app("A2")).expect("armed");
    board.hover(Some(sid("interview"))).expect("dragging");
    let view = board.render();

    let names: Vec<&str> = view.columns.iter().map(|column| column.name.as_str()).collect();
    assert_eq!(names, vec!["New", "Interview", "Offer extended"]);
    assert_eq!(view.total, 4);

    let ratings: Vec<Option<u8>> = view.columns[0].cards.iter().map(|card| card.rating).collect();
    assert_eq!(ratings, vec![Some(5), Some(3), None, None]);
    assert_eq!(view.columns[0].cards[2].application_id, app("A1"));
    assert!(view.columns[0].cards[0].dragging);
    assert!(view.columns[1].highlighted);
    assert!(!view.columns[0].highlighted);
}

#[test]
fn render_flags_pending_cards() {
    let mut board = two_stage_board();
    let _ticket = pending(board.begin_move(intent("A1", "interview")).expect("applied"));

    let view = board.render();
    assert!(view.columns[1].cards[0].pending);
}

#[test]
fn hovering_unknown_stage_highlights_nothing() {
    let mut board = two_stage_board();
    board.pick_up(app("A1")).expect("armed");
    board.hover(Some(sid("nowhere"))).expect("dragging");

    assert!(board.drag().hover_target().is_none());
    assert!(board.render().columns.iter().all(|column| !column.highlighted));
}
