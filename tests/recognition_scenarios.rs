//! End-to-end recognition runs over synthetic 60 Hz hand paths.

use std::sync::Arc;

use nalgebra::Vector3;
use signmotion::{
    engine::{CascadeConfig, MotionThresholds},
    EngineConfig, EngineStateId, FailureReason, FixedPose, GestureCatalog, GestureDefinition,
    GestureEngine, GestureEvent, GesturePhase, HandFrame, PoseTiming, StaticPoseRequirement,
    TrajectorySample,
};

const HZ: f64 = 60.0;

fn linear(name: &str, direction: Vector3<f32>) -> GestureDefinition {
    GestureDefinition {
        requires_movement: true,
        primary_direction: direction,
        direction_tolerance_deg: 45.0,
        min_distance: 0.08,
        pose_sequence: vec![StaticPoseRequirement::named("B", PoseTiming::Start)],
        ..GestureDefinition::new(name, 0.4, 3.0)
    }
}

fn circle(name: &str) -> GestureDefinition {
    GestureDefinition {
        requires_movement: true,
        requires_circular_motion: true,
        min_circularity: 0.7,
        min_distance: 0.1,
        pose_sequence: vec![StaticPoseRequirement::named("B", PoseTiming::Start)],
        ..GestureDefinition::new(name, 0.8, 3.0)
    }
}

fn engine_with(definitions: Vec<GestureDefinition>, config: EngineConfig) -> GestureEngine {
    let catalog = GestureCatalog::new(definitions).expect("valid catalog");
    GestureEngine::new(Arc::new(catalog), config)
}

/// Drives the engine with `path(tick)`; `None` marks a frame without tracking.
fn run<F>(engine: &mut GestureEngine, ticks: usize, path: F) -> Vec<(f64, GestureEvent)>
where
    F: Fn(usize) -> Option<[f32; 3]>,
{
    let pose = FixedPose::new(Some("B"));
    let mut events = Vec::new();
    for tick in 0..ticks {
        let t = tick as f64 / HZ;
        let frame = match path(tick) {
            Some([x, y, z]) => HandFrame::tracked(TrajectorySample::at(x, y, z, t)),
            None => HandFrame::lost(t),
        };
        let output = engine.tick(&frame, &pose);
        events.extend(output.iter().cloned().map(|event| (t, event)));
    }
    events
}

fn completed(events: &[(f64, GestureEvent)]) -> Vec<(f64, &str)> {
    events
        .iter()
        .filter_map(|(t, event)| match event {
            GestureEvent::Completed(result) => Some((*t, &*result.gesture)),
            _ => None,
        })
        .collect()
}

fn failures(events: &[(f64, GestureEvent)]) -> Vec<(f64, FailureReason, GesturePhase)> {
    events
        .iter()
        .filter_map(|(t, event)| match event {
            GestureEvent::Failed(result) => {
                let failure = result.failure.as_ref()?;
                Some((*t, failure.reason, failure.phase))
            }
            _ => None,
        })
        .collect()
}

fn descend(tick: usize) -> Option<[f32; 3]> {
    Some([0.0, -0.004 * tick.min(30) as f32, 0.0])
}

#[test]
fn downward_stroke_completes_once() {
    let mut engine = engine_with(
        vec![linear("down", Vector3::new(0.0, -1.0, 0.0))],
        EngineConfig::default(),
    );
    let events = run(&mut engine, 40, descend);

    assert!(failures(&events).is_empty());
    let done = completed(&events);
    assert_eq!(done.len(), 1);
    let (t, name) = done[0];
    assert_eq!(name, "down");
    assert!((0.39..0.45).contains(&t), "completed at {t}");

    let full_progress = events.iter().position(|(_, event)| {
        matches!(event, GestureEvent::Progress { progress, .. } if *progress >= 1.0)
    });
    let completion = events
        .iter()
        .position(|(_, event)| matches!(event, GestureEvent::Completed(_)));
    assert!(full_progress.is_some() && full_progress < completion);

    let GestureEvent::Completed(result) = &events[completion.unwrap_or_default()].1 else {
        panic!("completion event expected");
    };
    assert!(result.metrics.total_distance >= 0.08);
    assert!(result.failure.is_none());
    assert_eq!(engine.state(), EngineStateId::Cooldown);
}

#[test]
fn sideways_stroke_fails_on_direction() {
    let mut engine = engine_with(
        vec![linear("down", Vector3::new(0.0, -1.0, 0.0))],
        EngineConfig::default(),
    );
    let events = run(&mut engine, 40, |tick| Some([0.004 * tick as f32, 0.0, 0.0]));

    assert!(completed(&events).is_empty());
    let failed = failures(&events);
    assert_eq!(failed.len(), 1);
    let (t, reason, phase) = failed[0];
    assert_eq!(reason, FailureReason::DirectionWrong);
    assert_eq!(phase, GesturePhase::Move);
    assert!(t > 0.36 && t < 0.4, "failed at {t}");
    let starts = events
        .iter()
        .filter(|(_, event)| matches!(event, GestureEvent::Started { .. }))
        .count();
    assert_eq!(starts, 1, "a held pose must not restart the failed gesture");
    assert_eq!(engine.state(), EngineStateId::Idle);
}

#[test]
fn motionless_hand_times_out() {
    let mut engine = engine_with(
        vec![linear("down", Vector3::new(0.0, -1.0, 0.0))],
        EngineConfig::default(),
    );
    let events = run(&mut engine, 200, |_| Some([0.0; 3]));

    let failed = failures(&events);
    assert_eq!(failed.len(), 1);
    let (t, reason, phase) = failed[0];
    assert_eq!(reason, FailureReason::Timeout);
    assert_eq!(phase, GesturePhase::Start);
    assert!(t > 3.0 && t < 3.05, "failed at {t}");
}

#[test]
fn circular_candidate_outranks_matching_direction() {
    let config = EngineConfig {
        confirmation_timeout_s: 1.0,
        motion: MotionThresholds {
            distance_m: 0.08,
            speed_mps: 10.0,
        },
        cascade: CascadeConfig {
            min_circularity: 0.15,
            min_rotation_deg: 8.0,
        },
        ..EngineConfig::default()
    };
    let mut engine = engine_with(
        vec![linear("left", Vector3::new(-1.0, 0.0, 0.0)), circle("circle")],
        config,
    );
    // Counter-clockwise at one revolution per second from angle zero.
    let events = run(&mut engine, 70, |tick| {
        let angle = (tick as f32 * 6.0).to_radians();
        Some([0.05 * angle.cos(), 0.05 * angle.sin(), 0.0])
    });

    let started: Vec<&str> = events
        .iter()
        .filter_map(|(_, event)| match event {
            GestureEvent::Started { gesture } => Some(&**gesture),
            _ => None,
        })
        .collect();
    assert_eq!(started, ["circle"]);
    assert!(failures(&events).is_empty());
    assert_eq!(
        completed(&events).iter().map(|(_, name)| *name).collect::<Vec<_>>(),
        ["circle"]
    );
}

#[test]
fn short_tracking_gap_is_tolerated() {
    let mut engine = engine_with(
        vec![linear("down", Vector3::new(0.0, -1.0, 0.0))],
        EngineConfig::default(),
    );
    let events = run(&mut engine, 40, |tick| {
        (!(11..=16).contains(&tick)).then(|| [0.0, -0.004 * tick as f32, 0.0])
    });

    assert!(failures(&events).is_empty());
    assert_eq!(completed(&events).len(), 1);
}

#[test]
fn long_tracking_gap_fails() {
    let mut engine = engine_with(
        vec![linear("down", Vector3::new(0.0, -1.0, 0.0))],
        EngineConfig::default(),
    );
    let events = run(&mut engine, 40, |tick| {
        (tick <= 10).then(|| [0.0, -0.004 * tick as f32, 0.0])
    });

    let failed = failures(&events);
    assert_eq!(failed.len(), 1);
    let (t, reason, phase) = failed[0];
    assert_eq!(reason, FailureReason::TrackingLost);
    assert_eq!(phase, GesturePhase::Move);
    let gap = t - 10.0 / HZ;
    assert!(gap > 0.2 && gap < 0.25, "gap {gap}");
}

#[test]
fn builtin_forward_stroke_resolves_before_circularity_is_measurable() {
    let mut engine =
        GestureEngine::with_builtin_catalog(EngineConfig::default()).expect("builtin catalog");
    // "please" and "thank_you" share the flat-hand start pose.
    let forward = Vector3::new(0.0, -0.3, 1.0).normalize() * 0.004;
    let events = run(&mut engine, 40, |tick| {
        let travel = forward * tick.min(30) as f32;
        Some([travel.x, travel.y, travel.z])
    });

    assert!(matches!(
        events.first(),
        Some((_, GestureEvent::PendingChanged { pending: true }))
    ));
    assert_eq!(
        completed(&events).iter().map(|(_, name)| *name).collect::<Vec<_>>(),
        ["thank_you"]
    );
}
