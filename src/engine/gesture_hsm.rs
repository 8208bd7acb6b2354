use std::sync::Arc;

use log::{debug, info, warn};
use statig::{blocking::IntoStateMachineExt as _, prelude::*};

use crate::{
    catalog::{GestureCatalog, GestureDefinition, MAX_CATALOG_GESTURES},
    pose::PoseObservation,
    trajectory::TrajectoryTracker,
    types::{GestureName, Position, TrajectorySample},
};

use super::{
    config::EngineConfig,
    disambiguate::resolve,
    events::{
        failure_hint, DynamicGestureResult, EventBuffer, FailureReason, GestureEvent,
        GestureFailure, GestureOutcome, GesturePhase,
    },
    trace::{EngineStateId, EngineTraceSample},
    validate::{evaluate_in_progress, InProgressInput, Verdict},
};

mod engine;
mod helpers;

pub use engine::GestureEngine;

type Candidates = heapless::Vec<usize, MAX_CATALOG_GESTURES>;

#[derive(Clone, Copy, Debug)]
struct TickInput {
    sample: TrajectorySample,
    tracked: bool,
    anchor: Option<Position>,
    pose: PoseObservation,
}

#[derive(Clone, Copy, Debug)]
enum GestureHsmEvent {
    Tick(TickInput),
    Reset,
}

#[derive(Default)]
struct DispatchContext {
    events: EventBuffer,
}

/// One gesture attempt, from the first matching start pose until the
/// machine returns to Idle.
#[derive(Clone, Debug)]
struct Session {
    start_time: f64,
    start_position: Position,
    reach_m: f32,
    active: Option<usize>,
    candidates: Candidates,
}

struct GestureHsm {
    catalog: Arc<GestureCatalog>,
    config: EngineConfig,
    tracker: TrajectoryTracker,
    session: Option<Session>,
    cooldown_until: Option<f64>,
    /// Gesture that failed and still has its start pose held.
    rearm_blocked: Option<usize>,
    last_tracked_at: Option<f64>,
    last_soft: u8,
    current: EngineStateId,
    last_trace: EngineTraceSample,
}

#[state_machine(initial = "State::idle()")]
impl GestureHsm {
    #[state(superstate = "engaged")]
    fn idle(&mut self, context: &mut DispatchContext, event: &GestureHsmEvent) -> Outcome<State> {
        match event {
            GestureHsmEvent::Tick(input) => {
                self.note_tracking(input);
                if !input.tracked {
                    self.tracker.reset();
                    self.rearm_blocked = None;
                    self.record_trace(EngineStateId::Idle, input, 0, None, 0.0);
                    return Handled;
                }

                // A failed gesture re-arms only after its start pose is released.
                let blocked = self
                    .rearm_blocked
                    .filter(|&idx| input.pose.start_matches(idx));
                self.rearm_blocked = blocked;
                let matches: Candidates = (0..self.catalog.len())
                    .filter(|&idx| Some(idx) != blocked && input.pose.start_matches(idx))
                    .collect();
                self.record_trace(EngineStateId::Idle, input, 0, None, 0.0);

                match matches.len() {
                    0 => Handled,
                    1 => {
                        let single = matches[0];
                        self.begin_session(input, matches, Some(single));
                        let name = self.gesture_name(single);
                        debug!("gesture: `{name}` started at {:.3}s", input.sample.timestamp);
                        Self::emit(context, GestureEvent::Started { gesture: name });
                        self.enter(EngineStateId::InProgress, State::in_progress())
                    }
                    _ => {
                        debug!(
                            "gesture: {} candidates pending at {:.3}s",
                            matches.len(),
                            input.sample.timestamp
                        );
                        self.begin_session(input, matches, None);
                        Self::emit(context, GestureEvent::PendingChanged { pending: true });
                        self.enter(
                            EngineStateId::PendingConfirmation,
                            State::pending_confirmation(),
                        )
                    }
                }
            }
            GestureHsmEvent::Reset => Super,
        }
    }

    #[state(superstate = "engaged")]
    fn pending_confirmation(
        &mut self,
        context: &mut DispatchContext,
        event: &GestureHsmEvent,
    ) -> Outcome<State> {
        match event {
            GestureHsmEvent::Tick(input) => {
                self.note_tracking(input);
                let Some(session) = self.session.clone() else {
                    return self.enter(EngineStateId::Idle, State::idle());
                };
                if !input.tracked {
                    debug!("gesture: tracking lost while pending");
                    return self.abandon_pending(context, input);
                }

                self.advance(input.sample);
                let elapsed = (input.sample.timestamp - session.start_time) as f32;

                let pose_holds = input.pose.pose_present
                    && (self.config.any_pose_mode
                        || session
                            .candidates
                            .iter()
                            .any(|&idx| input.pose.start_matches(idx)));
                if !pose_holds {
                    return self.abandon_pending(context, input);
                }

                let moving = self.tracker.total_distance() > self.config.motion.distance_m
                    || self.tracker.current_speed() > self.config.motion.speed_mps;
                if !moving {
                    if elapsed >= self.config.confirmation_timeout_s {
                        debug!("gesture: static pose held {elapsed:.2}s, not a motion");
                        return self.abandon_pending(context, input);
                    }
                    self.record_trace(EngineStateId::PendingConfirmation, input, 0, None, 0.0);
                    return Handled;
                }

                if elapsed > self.pending_ceiling(&session) {
                    debug!("gesture: candidates never resolved within {elapsed:.2}s");
                    return self.abandon_pending(context, input);
                }

                let resolution = resolve(
                    &self.catalog,
                    &session.candidates,
                    &self.tracker,
                    &self.config.cascade,
                );
                self.record_trace(EngineStateId::PendingConfirmation, input, 0, None, 0.0);
                let Some(resolution) = resolution else {
                    return Handled;
                };

                if let Some(active) = self.session.as_mut() {
                    active.active = Some(resolution.index);
                }
                let name = self.gesture_name(resolution.index);
                debug!(
                    "gesture: `{name}` resolved by {:?} after {elapsed:.2}s",
                    resolution.rule
                );
                Self::emit(context, GestureEvent::PendingChanged { pending: false });
                Self::emit(context, GestureEvent::Started { gesture: name });
                self.enter(EngineStateId::InProgress, State::in_progress())
            }
            GestureHsmEvent::Reset => Super,
        }
    }

    #[state(superstate = "engaged")]
    fn in_progress(
        &mut self,
        context: &mut DispatchContext,
        event: &GestureHsmEvent,
    ) -> Outcome<State> {
        match event {
            GestureHsmEvent::Tick(input) => {
                let Some((index, start_time)) = self
                    .session
                    .as_ref()
                    .and_then(|s| s.active.map(|idx| (idx, s.start_time)))
                else {
                    return self.enter(EngineStateId::Idle, State::idle());
                };
                let catalog = Arc::clone(&self.catalog);
                let Some(definition) = catalog.get(index) else {
                    self.session = None;
                    return self.enter(EngineStateId::Idle, State::idle());
                };
                let elapsed = (input.sample.timestamp - start_time) as f32;

                if !input.tracked {
                    let lost_since = self.last_tracked_at.unwrap_or(start_time);
                    let gap = (input.sample.timestamp - lost_since) as f32;
                    if gap > self.config.tracking_loss_tolerance_s {
                        return self.fail(
                            context,
                            input,
                            definition,
                            FailureReason::TrackingLost,
                            GesturePhase::Move,
                        );
                    }
                    self.record_trace(
                        EngineStateId::InProgress,
                        input,
                        self.last_soft,
                        None,
                        self.last_trace.progress,
                    );
                    return Handled;
                }

                self.note_tracking(input);
                self.advance(input.sample);
                let reach_m = self.session.as_ref().map_or(0.0, |s| s.reach_m);

                let evaluation = evaluate_in_progress(
                    &InProgressInput {
                        definition,
                        tracker: &self.tracker,
                        elapsed_s: elapsed,
                        position: input.sample.position,
                        anchor: input.anchor,
                        reach_m,
                        during_ok: input.pose.during_matches(index),
                        end_ok: input.pose.end_matches(index),
                    },
                    &self.config,
                );
                self.note_soft_warnings(definition, evaluation.soft_warnings);

                match evaluation.verdict {
                    Verdict::Fail(reason, phase) => {
                        self.fail(context, input, definition, reason, phase)
                    }
                    Verdict::Continue => {
                        self.record_trace(
                            EngineStateId::InProgress,
                            input,
                            evaluation.soft_warnings,
                            None,
                            evaluation.progress,
                        );
                        Self::emit(
                            context,
                            GestureEvent::Progress {
                                gesture: definition.name.clone(),
                                progress: evaluation.progress,
                            },
                        );
                        Handled
                    }
                    Verdict::Complete => {
                        self.record_trace(
                            EngineStateId::InProgress,
                            input,
                            evaluation.soft_warnings,
                            None,
                            1.0,
                        );
                        Self::emit(
                            context,
                            GestureEvent::Progress {
                                gesture: definition.name.clone(),
                                progress: 1.0,
                            },
                        );
                        self.complete(context, input, definition)
                    }
                }
            }
            GestureHsmEvent::Reset => Super,
        }
    }

    #[state(superstate = "engaged")]
    fn cooldown(
        &mut self,
        context: &mut DispatchContext,
        event: &GestureHsmEvent,
    ) -> Outcome<State> {
        let _ = context;
        match event {
            GestureHsmEvent::Tick(input) => {
                self.note_tracking(input);
                self.record_trace(EngineStateId::Cooldown, input, 0, None, 0.0);
                let expired = self
                    .cooldown_until
                    .is_none_or(|until| input.sample.timestamp >= until);
                if expired {
                    self.cooldown_until = None;
                    return self.enter(EngineStateId::Idle, State::idle());
                }
                Handled
            }
            GestureHsmEvent::Reset => Super,
        }
    }

    #[superstate]
    fn engaged(
        &mut self,
        context: &mut DispatchContext,
        event: &GestureHsmEvent,
    ) -> Outcome<State> {
        let _ = context;
        match event {
            GestureHsmEvent::Reset => {
                self.clear();
                self.enter(EngineStateId::Idle, State::idle())
            }
            GestureHsmEvent::Tick(_) => Handled,
        }
    }
}

impl GestureHsm {
    fn fail(
        &mut self,
        context: &mut DispatchContext,
        input: &TickInput,
        definition: &GestureDefinition,
        reason: FailureReason,
        phase: GesturePhase,
    ) -> Outcome<State> {
        let metrics = self.tracker.metrics();
        let hint = failure_hint(reason, phase, &metrics, definition);
        warn!(
            "gesture: `{}` failed with {reason} in {} phase after {:.2}s",
            definition.name,
            phase.as_str(),
            metrics.duration
        );
        self.record_trace(
            EngineStateId::InProgress,
            input,
            self.last_soft,
            Some(reason),
            0.0,
        );
        Self::emit(
            context,
            GestureEvent::Failed(DynamicGestureResult {
                gesture: definition.name.clone(),
                outcome: GestureOutcome::Failure,
                metrics,
                snapshot: self.tracker.snapshot(),
                failure: Some(GestureFailure {
                    reason,
                    phase,
                    hint,
                }),
            }),
        );
        self.rearm_blocked = self.session.as_ref().and_then(|session| session.active);
        self.end_session();
        self.enter(EngineStateId::Idle, State::idle())
    }

    fn complete(
        &mut self,
        context: &mut DispatchContext,
        input: &TickInput,
        definition: &GestureDefinition,
    ) -> Outcome<State> {
        let metrics = self.tracker.metrics();
        info!(
            "gesture: `{}` completed in {:.2}s over {:.3}m",
            definition.name, metrics.duration, metrics.total_distance
        );
        Self::emit(
            context,
            GestureEvent::Completed(DynamicGestureResult {
                gesture: definition.name.clone(),
                outcome: GestureOutcome::Success,
                metrics,
                snapshot: self.tracker.snapshot(),
                failure: None,
            }),
        );
        self.end_session();
        self.cooldown_until = Some(input.sample.timestamp + f64::from(self.config.cooldown_s));
        self.enter(EngineStateId::Cooldown, State::cooldown())
    }

    fn abandon_pending(
        &mut self,
        context: &mut DispatchContext,
        input: &TickInput,
    ) -> Outcome<State> {
        self.record_trace(EngineStateId::PendingConfirmation, input, 0, None, 0.0);
        Self::emit(context, GestureEvent::PendingChanged { pending: false });
        self.end_session();
        self.tracker.reset();
        self.enter(EngineStateId::Idle, State::idle())
    }

    fn gesture_name(&self, index: usize) -> GestureName {
        self.catalog
            .get(index)
            .map_or_else(|| GestureName::from("unknown"), |g| g.name.clone())
    }
}
