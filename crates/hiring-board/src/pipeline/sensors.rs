//! Input adapters that turn raw pointer, mouse, and touch events into the
//! four drag verbs. Each adapter applies its own activation constraint so a
//! click or tap never starts a drag.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::domain::{ApplicationId, StageId};
use crate::config::SensorConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    Pointer,
    Mouse,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn distance_to(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Device-level event as delivered by the host UI.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    Down {
        application_id: ApplicationId,
        at: Point,
        time: Instant,
    },
    Move {
        at: Point,
        time: Instant,
        over: Option<StageId>,
    },
    Up {
        at: Point,
        over: Option<StageId>,
    },
    Cancel,
}

/// The modality-independent vocabulary the board understands. Every verb
/// after the pick-up names its subject so a stale adapter cannot steer
/// another device's session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragVerb {
    PickUp(ApplicationId),
    Move {
        subject: ApplicationId,
        over: Option<StageId>,
    },
    Drop {
        subject: ApplicationId,
        over: Option<StageId>,
    },
    Cancel {
        subject: ApplicationId,
    },
}

impl DragVerb {
    pub fn subject(&self) -> &ApplicationId {
        match self {
            Self::PickUp(subject)
            | Self::Move { subject, .. }
            | Self::Drop { subject, .. }
            | Self::Cancel { subject } => subject,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActivationConstraint {
    /// Promote once the pointer travels this far from where it went down.
    Distance { px: f64 },
    /// Promote once held this long without drifting past the tolerance.
    Delay { delay: Duration, tolerance_px: f64 },
}

#[derive(Debug, Clone)]
struct PendingActivation {
    application_id: ApplicationId,
    origin: Point,
    started: Instant,
    last: Point,
}

#[derive(Debug, Clone)]
pub struct Sensor {
    modality: Modality,
    constraint: ActivationConstraint,
    pending: Option<PendingActivation>,
    active: Option<ApplicationId>,
}

impl Sensor {
    pub fn new(modality: Modality, constraint: ActivationConstraint) -> Self {
        Self {
            modality,
            constraint,
            pending: None,
            active: None,
        }
    }

    pub fn for_modality(modality: Modality, config: &SensorConfig) -> Self {
        let constraint = match modality {
            Modality::Pointer => ActivationConstraint::Distance {
                px: config.pointer_distance_px,
            },
            Modality::Mouse => ActivationConstraint::Distance {
                px: config.mouse_distance_px,
            },
            Modality::Touch => ActivationConstraint::Delay {
                delay: config.touch_delay,
                tolerance_px: config.touch_tolerance_px,
            },
        };
        Self::new(modality, constraint)
    }

    pub fn modality(&self) -> Modality {
        self.modality
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Forget any pending or active gesture. Hosts call this when the board
    /// refuses the pick-up this sensor emitted.
    pub fn reset(&mut self) {
        self.pending = None;
        self.active = None;
    }

    /// Translate one raw event. Most events produce no verb.
    pub fn handle(&mut self, input: RawInput) -> Vec<DragVerb> {
        match input {
            RawInput::Down {
                application_id,
                at,
                time,
            } => {
                if self.active.is_some() {
                    return Vec::new();
                }
                self.pending = Some(PendingActivation {
                    application_id,
                    origin: at,
                    started: time,
                    last: at,
                });
                if matches!(self.constraint, ActivationConstraint::Distance { px } if px <= 0.0) {
                    return self.activate(None);
                }
                Vec::new()
            }
            RawInput::Move { at, time, over } => {
                if let Some(subject) = &self.active {
                    return vec![DragVerb::Move {
                        subject: subject.clone(),
                        over,
                    }];
                }
                let Some(pending) = self.pending.as_mut() else {
                    return Vec::new();
                };
                pending.last = at;
                let travelled = pending.origin.distance_to(at);
                let held = time.saturating_duration_since(pending.started);
                match self.constraint {
                    ActivationConstraint::Distance { px } if travelled >= px => {
                        self.activate(over)
                    }
                    ActivationConstraint::Distance { .. } => Vec::new(),
                    ActivationConstraint::Delay { tolerance_px, .. } if travelled > tolerance_px => {
                        // Moved too early: this is a scroll, not a hold.
                        self.pending = None;
                        Vec::new()
                    }
                    ActivationConstraint::Delay { delay, .. } if held >= delay => {
                        self.activate(over)
                    }
                    ActivationConstraint::Delay { .. } => Vec::new(),
                }
            }
            RawInput::Up { over, .. } => {
                self.pending = None;
                match self.active.take() {
                    Some(subject) => vec![DragVerb::Drop { subject, over }],
                    None => Vec::new(),
                }
            }
            RawInput::Cancel => {
                self.pending = None;
                match self.active.take() {
                    Some(subject) => vec![DragVerb::Cancel { subject }],
                    None => Vec::new(),
                }
            }
        }
    }

    /// Timer callback for hold-to-drag sensors; promotes a still-held touch.
    pub fn tick(&mut self, now: Instant) -> Vec<DragVerb> {
        let ActivationConstraint::Delay {
            delay,
            tolerance_px,
        } = self.constraint
        else {
            return Vec::new();
        };
        let ready = self.pending.as_ref().is_some_and(|pending| {
            now.saturating_duration_since(pending.started) >= delay
                && pending.origin.distance_to(pending.last) <= tolerance_px
        });
        if ready && self.active.is_none() {
            self.activate(None)
        } else {
            Vec::new()
        }
    }

    fn activate(&mut self, over: Option<StageId>) -> Vec<DragVerb> {
        match self.pending.take() {
            Some(pending) => {
                let subject = pending.application_id;
                self.active = Some(subject.clone());
                let mut verbs = vec![DragVerb::PickUp(subject.clone())];
                if over.is_some() {
                    verbs.push(DragVerb::Move { subject, over });
                }
                verbs
            }
            None => Vec::new(),
        }
    }
}
