use super::domain::{ApplicationCard, ApplicationId, StageId};
use super::error::BoardError;
use super::stages::StageRegistry;

/// Result of reassigning an application's stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageChange {
    /// The application already sat in the target stage.
    Unchanged,
    Moved { from: StageId },
}

/// Application membership by stage. Keeps supplied order so column sorting stays stable.
#[derive(Debug, Clone, Default)]
pub struct ApplicationIndex {
    cards: Vec<ApplicationCard>,
}

impl ApplicationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cards(cards: impl IntoIterator<Item = ApplicationCard>) -> Self {
        let mut index = Self::new();
        for card in cards {
            index.upsert(card);
        }
        index
    }

    /// Insert a card, replacing an existing one with the same id in place.
    pub fn upsert(&mut self, card: ApplicationCard) {
        match self.cards.iter_mut().find(|existing| existing.id == card.id) {
            Some(existing) => *existing = card,
            None => self.cards.push(card),
        }
    }

    pub fn by_stage(&self, stage_id: &StageId) -> Vec<&ApplicationCard> {
        self.cards
            .iter()
            .filter(|card| &card.stage_id == stage_id)
            .collect()
    }

    pub fn count_in(&self, stage_id: &StageId) -> usize {
        self.cards
            .iter()
            .filter(|card| &card.stage_id == stage_id)
            .count()
    }

    pub fn get(&self, id: &ApplicationId) -> Option<&ApplicationCard> {
        self.cards.iter().find(|card| &card.id == id)
    }

    pub fn stage_of(&self, id: &ApplicationId) -> Option<&StageId> {
        self.get(id).map(|card| &card.stage_id)
    }

    pub fn cards(&self) -> &[ApplicationCard] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Reassign one application. Moving to the current stage succeeds without change.
    pub fn move_application(
        &mut self,
        id: &ApplicationId,
        target: &StageId,
        stages: &StageRegistry,
    ) -> Result<StageChange, BoardError> {
        let card = self
            .cards
            .iter_mut()
            .find(|card| &card.id == id)
            .ok_or_else(|| BoardError::application_not_found(id))?;

        if !stages.contains(target) {
            return Err(BoardError::InvalidTarget {
                stage_id: target.clone(),
            });
        }

        if &card.stage_id == target {
            return Ok(StageChange::Unchanged);
        }

        let from = std::mem::replace(&mut card.stage_id, target.clone());
        Ok(StageChange::Moved { from })
    }

    /// Put an application back into the stage it held before a rejected move.
    pub fn rollback(&mut self, id: &ApplicationId, previous: StageId) -> Result<(), BoardError> {
        let card = self
            .cards
            .iter_mut()
            .find(|card| &card.id == id)
            .ok_or_else(|| BoardError::application_not_found(id))?;
        card.stage_id = previous;
        Ok(())
    }
}
