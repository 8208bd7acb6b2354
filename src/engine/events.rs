use std::{fmt, sync::mpsc};

use serde::Serialize;

use crate::{
    catalog::GestureDefinition,
    types::{GestureMetrics, GestureName, MovementSnapshot},
};

/// Events emitted in one tick. Ticks emit at most three.
pub type EventBuffer = heapless::Vec<GestureEvent, 4>;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[repr(u8)]
pub enum FailureReason {
    Timeout = 1,
    PoseLost = 2,
    SpeedTooLow = 3,
    SpeedTooHigh = 4,
    DistanceTooShort = 5,
    DirectionWrong = 6,
    DirectionChangesInsufficient = 7,
    RotationInsufficient = 8,
    NotCircular = 9,
    TrackingLost = 10,
    OutOfZone = 11,
    EndPoseMismatch = 12,
    Unknown = 13,
}

impl FailureReason {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::PoseLost => "pose_lost",
            Self::SpeedTooLow => "speed_too_low",
            Self::SpeedTooHigh => "speed_too_high",
            Self::DistanceTooShort => "distance_too_short",
            Self::DirectionWrong => "direction_wrong",
            Self::DirectionChangesInsufficient => "direction_changes_insufficient",
            Self::RotationInsufficient => "rotation_insufficient",
            Self::NotCircular => "not_circular",
            Self::TrackingLost => "tracking_lost",
            Self::OutOfZone => "out_of_zone",
            Self::EndPoseMismatch => "end_pose_mismatch",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum GesturePhase {
    Start,
    Move,
    End,
}

impl GesturePhase {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Move => "move",
            Self::End => "end",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum GestureOutcome {
    Success,
    Failure,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GestureFailure {
    pub reason: FailureReason,
    pub phase: GesturePhase,
    pub hint: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DynamicGestureResult {
    pub gesture: GestureName,
    pub outcome: GestureOutcome,
    pub metrics: GestureMetrics,
    pub snapshot: MovementSnapshot,
    pub failure: Option<GestureFailure>,
}

impl DynamicGestureResult {
    pub fn reason(&self) -> Option<FailureReason> {
        self.failure.as_ref().map(|f| f.reason)
    }

    pub fn phase(&self) -> Option<GesturePhase> {
        self.failure.as_ref().map(|f| f.phase)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum GestureEvent {
    Started { gesture: GestureName },
    Progress { gesture: GestureName, progress: f32 },
    Completed(DynamicGestureResult),
    Failed(DynamicGestureResult),
    PendingChanged { pending: bool },
}

impl GestureEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Started { .. } => "started",
            Self::Progress { .. } => "progress",
            Self::Completed(_) => "completed",
            Self::Failed(_) => "failed",
            Self::PendingChanged { .. } => "pending_changed",
        }
    }

    pub fn gesture(&self) -> Option<&str> {
        match self {
            Self::Started { gesture } | Self::Progress { gesture, .. } => Some(gesture.as_ref()),
            Self::Completed(result) | Self::Failed(result) => Some(result.gesture.as_ref()),
            Self::PendingChanged { .. } => None,
        }
    }
}

/// Human-readable guidance for a failed attempt.
pub fn failure_hint(
    reason: FailureReason,
    phase: GesturePhase,
    metrics: &GestureMetrics,
    definition: &GestureDefinition,
) -> String {
    let name = &definition.name;
    let body = match reason {
        FailureReason::Timeout if phase == GesturePhase::End => {
            let short = definition.requires_movement
                && metrics.total_distance < definition.min_distance;
            if short {
                format!(
                    "`{name}` ran past {:.1} s having moved {:.0} cm of {:.0} cm",
                    definition.max_duration_s,
                    metrics.total_distance * 100.0,
                    definition.min_distance * 100.0
                )
            } else {
                format!(
                    "`{name}` ran past {:.1} s without the expected end hand shape",
                    definition.max_duration_s
                )
            }
        }
        FailureReason::Timeout => format!(
            "`{name}` took longer than {:.1} s, finish the motion sooner",
            definition.max_duration_s
        ),
        FailureReason::PoseLost => {
            format!("hold the `{name}` hand shape for the whole motion")
        }
        FailureReason::SpeedTooLow => format!(
            "move faster: {:.2} m/s average, at least {:.2} m/s expected",
            metrics.average_speed, definition.min_speed
        ),
        FailureReason::SpeedTooHigh => {
            format!("slow down: peaked at {:.2} m/s", metrics.max_speed)
        }
        FailureReason::DistanceTooShort => format!(
            "make the motion larger: moved {:.0} cm of {:.0} cm",
            metrics.total_distance * 100.0,
            definition.min_distance * 100.0
        ),
        FailureReason::DirectionWrong => format!(
            "move in the `{name}` direction, within {:.0} degrees",
            definition.direction_tolerance_deg
        ),
        FailureReason::DirectionChangesInsufficient => format!(
            "change direction {} times, counted {}",
            definition.required_direction_changes, metrics.direction_changes
        ),
        FailureReason::RotationInsufficient => format!(
            "rotate the hand further: {:.0} of {:.0} degrees",
            metrics.total_rotation_degrees, definition.min_rotation_deg
        ),
        FailureReason::NotCircular => format!(
            "trace a rounder circle: scored {:.2}, {:.2} needed",
            metrics.circularity_score, definition.min_circularity
        ),
        FailureReason::TrackingLost => "keep the hand visible to the tracker".to_string(),
        FailureReason::OutOfZone => format!(
            "perform `{name}` within {:.0} cm of its target area",
            definition.zone_radius * 100.0
        ),
        FailureReason::EndPoseMismatch => {
            format!("finish `{name}` with the expected hand shape")
        }
        FailureReason::Unknown => format!("`{name}` was not recognized, try again"),
    };
    format!("{} phase: {body}", phase.as_str())
}

/// Destination for emitted events.
pub trait EventSink {
    fn emit(&mut self, event: GestureEvent);
}

impl EventSink for Vec<GestureEvent> {
    fn emit(&mut self, event: GestureEvent) {
        self.push(event);
    }
}

impl EventSink for mpsc::Sender<GestureEvent> {
    /// A disconnected receiver drops the event.
    fn emit(&mut self, event: GestureEvent) {
        let _ = self.send(event);
    }
}

impl<F> EventSink for F
where
    F: FnMut(&GestureEvent),
{
    fn emit(&mut self, event: GestureEvent) {
        self(&event);
    }
}
