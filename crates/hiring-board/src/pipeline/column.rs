use std::cmp::Reverse;

use serde::Serialize;

use super::domain::{ApplicationCard, ApplicationId, Stage, StageId, TagIndex};

/// Tags shown on a card before the rest collapse into an overflow count.
pub const VISIBLE_TAG_LIMIT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardView {
    pub application_id: ApplicationId,
    pub candidate_name: String,
    pub rating: Option<u8>,
    pub role_title: String,
    pub employer_name: String,
    pub tags: Vec<String>,
    pub overflow_tags: usize,
    /// Set while the card is the subject of the active drag session.
    pub dragging: bool,
    /// Set while a move for this card awaits confirmation.
    pub pending: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnView {
    pub stage_id: StageId,
    pub name: String,
    pub color: String,
    pub order: i64,
    /// The column currently under the pointer during a drag.
    pub highlighted: bool,
    /// Created locally and awaiting the stage store; not a drop target yet.
    pub pending: bool,
    pub count: usize,
    pub cards: Vec<CardView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardView {
    pub columns: Vec<ColumnView>,
    pub total: usize,
}

/// Derive one column's display sequence: rated cards by rating descending,
/// then unrated ones. Ties keep their input order.
pub fn render_column(stage: &Stage, cards: Vec<&ApplicationCard>, tags: &TagIndex) -> ColumnView {
    let mut cards = cards;
    cards.sort_by_key(|card| Reverse(card.rating));

    let cards: Vec<CardView> = cards
        .into_iter()
        .map(|card| card_view(card, tags.tags_for(&card.id)))
        .collect();

    ColumnView {
        stage_id: stage.id.clone(),
        name: stage.name.clone(),
        color: stage.color.clone(),
        order: stage.order,
        highlighted: false,
        pending: false,
        count: cards.len(),
        cards,
    }
}

fn card_view(card: &ApplicationCard, tags: &[String]) -> CardView {
    CardView {
        application_id: card.id.clone(),
        candidate_name: card.candidate_name.clone(),
        rating: card.rating.map(|rating| rating.value()),
        role_title: card.role_title.clone(),
        employer_name: card.employer_name.clone(),
        tags: tags.iter().take(VISIBLE_TAG_LIMIT).cloned().collect(),
        overflow_tags: tags.len().saturating_sub(VISIBLE_TAG_LIMIT),
        dragging: false,
        pending: false,
    }
}
