use tracing::debug;

use super::domain::{Stage, StageId, StagePatch};
use super::error::BoardError;

/// Unsorted holder of pipeline stages. Ordering is derived on read.
#[derive(Debug, Clone, Default)]
pub struct StageRegistry {
    stages: Vec<Stage>,
    sequence: u64,
}

impl StageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the registry with stages loaded from the system of record.
    pub fn from_stages(stages: impl IntoIterator<Item = Stage>) -> Self {
        let mut registry = Self::new();
        for stage in stages {
            registry.insert(stage);
        }
        registry
    }

    /// Append a stage after every existing one.
    pub fn add_stage(
        &mut self,
        name: impl Into<String>,
        color: impl Into<String>,
    ) -> Result<Stage, BoardError> {
        let order = match self.stages.iter().map(|stage| stage.order).max() {
            Some(max) => max.checked_add(1).ok_or(BoardError::StageOrderExhausted)?,
            None => 0,
        };

        let stage = Stage {
            id: self.next_stage_id(),
            name: name.into(),
            color: color.into(),
            order,
        };
        debug!(stage_id = %stage.id, order, "stage added");
        self.stages.push(stage.clone());
        Ok(stage)
    }

    /// Apply a name/color patch, returning the stage as it was before the patch.
    pub fn update_stage(&mut self, id: &StageId, patch: StagePatch) -> Result<Stage, BoardError> {
        let stage = self
            .stages
            .iter_mut()
            .find(|stage| &stage.id == id)
            .ok_or_else(|| BoardError::stage_not_found(id))?;

        let previous = stage.clone();
        if let Some(name) = patch.name {
            stage.name = name;
        }
        if let Some(color) = patch.color {
            stage.color = color;
        }
        Ok(previous)
    }

    pub fn remove_stage(&mut self, id: &StageId) -> Result<Stage, BoardError> {
        let position = self
            .stages
            .iter()
            .position(|stage| &stage.id == id)
            .ok_or_else(|| BoardError::stage_not_found(id))?;
        Ok(self.stages.remove(position))
    }

    /// Put a stage back verbatim, replacing any entry with the same id.
    pub fn insert(&mut self, stage: Stage) {
        match self.stages.iter_mut().find(|existing| existing.id == stage.id) {
            Some(existing) => *existing = stage,
            None => self.stages.push(stage),
        }
    }

    pub fn get(&self, id: &StageId) -> Option<&Stage> {
        self.stages.iter().find(|stage| &stage.id == id)
    }

    pub fn contains(&self, id: &StageId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stages left to right: ascending order, ties broken by id.
    pub fn listing(&self) -> Vec<&Stage> {
        let mut listing: Vec<&Stage> = self.stages.iter().collect();
        listing.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        listing
    }

    fn next_stage_id(&mut self) -> StageId {
        loop {
            self.sequence += 1;
            let candidate = StageId(format!("stage-{:04}", self.sequence));
            if !self.contains(&candidate) {
                return candidate;
            }
        }
    }
}
