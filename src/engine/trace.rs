use serde::Serialize;

use super::events::FailureReason;

pub const SOFT_SPEED_LOW: u8 = 1 << 0;
pub const SOFT_ROTATION_LOW: u8 = 1 << 1;
pub const SOFT_DIRECTION_DRIFT: u8 = 1 << 2;
pub const SOFT_DIRECTION_CHANGES_PENDING: u8 = 1 << 3;
pub const SOFT_CIRCULARITY_PENDING: u8 = 1 << 4;
pub const SOFT_END_PENDING: u8 = 1 << 5;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[repr(u8)]
pub enum EngineStateId {
    #[default]
    Idle = 0,
    PendingConfirmation = 1,
    InProgress = 2,
    Cooldown = 3,
}

impl EngineStateId {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::PendingConfirmation => "pending",
            Self::InProgress => "in_progress",
            Self::Cooldown => "cooldown",
        }
    }
}

/// Per-tick diagnostics, reported in the state the tick was handled in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct EngineTraceSample {
    pub t_s: f64,
    pub state_id: EngineStateId,
    pub tracked: bool,
    /// Catalog index of the active gesture.
    pub active: Option<u8>,
    pub candidate_count: u8,
    pub soft_warnings: u8,
    pub failure: Option<FailureReason>,
    pub elapsed_s: f32,
    pub progress: f32,
    pub total_distance: f32,
    pub current_speed: f32,
}

impl EngineTraceSample {
    pub fn has_warning(&self, bit: u8) -> bool {
        self.soft_warnings & bit != 0
    }
}
