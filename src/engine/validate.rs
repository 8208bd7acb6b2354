//! Per-tick constraint evaluation for the active gesture.

use crate::{
    catalog::{GestureDefinition, ZoneTiming},
    trajectory::TrajectoryTracker,
    types::Position,
};

use super::{
    config::{EngineConfig, PhaseRatios},
    events::{FailureReason, GesturePhase},
    trace::{
        SOFT_CIRCULARITY_PENDING, SOFT_DIRECTION_CHANGES_PENDING, SOFT_DIRECTION_DRIFT,
        SOFT_END_PENDING, SOFT_ROTATION_LOW, SOFT_SPEED_LOW,
    },
};

pub(crate) struct InProgressInput<'a> {
    pub definition: &'a GestureDefinition,
    pub tracker: &'a TrajectoryTracker,
    pub elapsed_s: f32,
    pub position: Position,
    pub anchor: Option<Position>,
    /// Largest distance from the session's first sample so far.
    pub reach_m: f32,
    pub during_ok: bool,
    pub end_ok: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Verdict {
    Continue,
    Complete,
    Fail(FailureReason, GesturePhase),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Evaluation {
    pub verdict: Verdict,
    pub soft_warnings: u8,
    pub progress: f32,
}

impl Evaluation {
    fn fail(reason: FailureReason, phase: GesturePhase, soft_warnings: u8, progress: f32) -> Self {
        Self {
            verdict: Verdict::Fail(reason, phase),
            soft_warnings,
            progress,
        }
    }
}

pub(crate) fn zone_window_applies(timing: ZoneTiming, ratio: f32, ratios: &PhaseRatios) -> bool {
    match timing {
        ZoneTiming::Start => ratio <= ratios.zone_start_end,
        ZoneTiming::During => ratio > ratios.zone_start_end && ratio < ratios.zone_end_begin,
        ZoneTiming::End => ratio >= ratios.zone_end_begin,
    }
}

fn zone_phase(timing: ZoneTiming) -> GesturePhase {
    match timing {
        ZoneTiming::Start => GesturePhase::Start,
        ZoneTiming::During => GesturePhase::Move,
        ZoneTiming::End => GesturePhase::End,
    }
}

pub(crate) fn in_zone(
    definition: &GestureDefinition,
    position: Position,
    anchor: Option<Position>,
) -> bool {
    let center = anchor.map_or(definition.zone_center, |a| {
        a + definition.zone_center.coords
    });
    nalgebra::distance(&position, &center) <= definition.zone_radius
}

fn distance_met(definition: &GestureDefinition, tracker: &TrajectoryTracker) -> bool {
    !definition.requires_movement || tracker.total_distance() >= definition.min_distance
}

/// A session past `max_duration_s` always times out. The phase names what
/// was still missing: the start when the hand never moved, the end when
/// distance or the end pose were unmet.
fn deadline_phase(input: &InProgressInput<'_>, still: bool) -> GesturePhase {
    if still {
        GesturePhase::Start
    } else if !distance_met(input.definition, input.tracker) || !input.end_ok {
        GesturePhase::End
    } else {
        GesturePhase::Move
    }
}

/// Runs the in-progress checks in order. Shape checks (direction, direction
/// changes, circularity) only hard-fail once the hand has actually moved.
pub(crate) fn evaluate_in_progress(
    input: &InProgressInput<'_>,
    config: &EngineConfig,
) -> Evaluation {
    let definition = input.definition;
    let tracker = input.tracker;
    let ratios = &config.ratios;
    let ratio = input.elapsed_s / definition.min_duration_s;
    let progress = ratio.clamp(0.0, 1.0);
    let still = input.reach_m <= config.motion.distance_m;
    let hard = ratio > ratios.hard_fail && !still;
    let mut soft = 0u8;

    if input.elapsed_s > definition.max_duration_s {
        let phase = deadline_phase(input, still);
        return Evaluation::fail(FailureReason::Timeout, phase, soft, progress);
    }

    if !input.during_ok {
        return Evaluation::fail(FailureReason::PoseLost, GesturePhase::Move, soft, progress);
    }

    if definition.requires_movement
        && !definition.requires_direction_change
        && definition.has_direction()
        && ratio >= ratios.direction_grace
        && !tracker.is_moving_in_direction(
            &definition.primary_direction,
            definition.direction_tolerance_deg,
        )
    {
        if hard {
            return Evaluation::fail(
                FailureReason::DirectionWrong,
                GesturePhase::Move,
                soft,
                progress,
            );
        }
        soft |= SOFT_DIRECTION_DRIFT;
    }

    if definition.requires_movement
        && tracker.current_speed() < definition.min_speed * config.speed_soft_factor
    {
        soft |= SOFT_SPEED_LOW;
    }

    if definition.requires_direction_change
        && tracker.direction_changes() < definition.required_direction_changes
    {
        if hard {
            return Evaluation::fail(
                FailureReason::DirectionChangesInsufficient,
                GesturePhase::Move,
                soft,
                progress,
            );
        }
        soft |= SOFT_DIRECTION_CHANGES_PENDING;
    }

    if definition.requires_rotation
        && tracker.total_rotation_degrees() < definition.min_rotation_deg
    {
        soft |= SOFT_ROTATION_LOW;
    }

    if definition.requires_circular_motion
        && tracker.circularity_score() < definition.min_circularity
    {
        if hard {
            return Evaluation::fail(
                FailureReason::NotCircular,
                GesturePhase::Move,
                soft,
                progress,
            );
        }
        soft |= SOFT_CIRCULARITY_PENDING;
    }

    if definition.requires_spatial_zone
        && zone_window_applies(definition.zone_timing, ratio, ratios)
        && !in_zone(definition, input.position, input.anchor)
    {
        return Evaluation::fail(
            FailureReason::OutOfZone,
            zone_phase(definition.zone_timing),
            soft,
            progress,
        );
    }

    if input.elapsed_s >= definition.min_duration_s {
        if distance_met(definition, tracker) && input.end_ok {
            return Evaluation {
                verdict: Verdict::Complete,
                soft_warnings: soft,
                progress,
            };
        }
        soft |= SOFT_END_PENDING;
    }

    Evaluation {
        verdict: Verdict::Continue,
        soft_warnings: soft,
        progress,
    }
}
