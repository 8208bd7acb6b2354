use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use serde_json::json;
use signmotion::{EngineConfig, FixedPose, GestureCatalog, GestureEngine, GestureEvent, HandFrame};

use crate::{
    logging::Logger,
    trace::{parse_expected_kinds, parse_trace, TraceFrame},
};

const TAIL_HZ: f64 = 60.0;

pub struct ReplayOptions {
    pub trace_path: PathBuf,
    pub catalog_path: Option<PathBuf>,
    pub expect_path: Option<PathBuf>,
    pub tail_ms: u64,
}

#[derive(Clone, Debug)]
pub struct ReplayedEvent {
    pub t_s: f64,
    pub event: GestureEvent,
}

pub fn load_catalog(path: Option<&PathBuf>) -> Result<GestureCatalog> {
    match path {
        Some(path) => GestureCatalog::from_toml_path(path)
            .with_context(|| format!("failed to load catalog {}", path.display())),
        None => GestureCatalog::builtin().context("built-in catalog is invalid"),
    }
}

pub fn run_replay(logger: &mut Logger, options: ReplayOptions) -> Result<()> {
    let catalog = load_catalog(options.catalog_path.as_ref())?;
    let frames = parse_trace(&options.trace_path)?;
    logger.info(format!(
        "replaying {} frames from {} against {} gestures",
        frames.len(),
        options.trace_path.display(),
        catalog.len()
    ));

    let mut engine = GestureEngine::new(Arc::new(catalog), EngineConfig::default());
    let events = replay_frames(&mut engine, &frames, options.tail_ms as f64 / 1000.0);

    println!("event,t_s,kind,gesture,detail");
    for replayed in &events {
        println!(
            "event,{:.3},{},{},{}",
            replayed.t_s,
            replayed.event.kind(),
            replayed.event.gesture().unwrap_or(""),
            detail(&replayed.event)
        );
        logger.record(
            "gesture_event",
            json!({
                "t_s": replayed.t_s,
                "kind": replayed.event.kind(),
                "gesture": replayed.event.gesture(),
                "detail": detail(&replayed.event),
            }),
        );
    }

    if let Some(expect_path) = options.expect_path {
        let expected = parse_expected_kinds(&expect_path)?;
        let actual: Vec<&str> = events.iter().map(|e| e.event.kind()).collect();
        if actual != expected {
            logger.error(format!("expected kinds: {}", expected.join(",")));
            logger.error(format!("actual kinds:   {}", actual.join(",")));
            bail!("event sequence mismatch");
        }
        logger.info(format!("{} events match {}", actual.len(), expect_path.display()));
    }

    Ok(())
}

/// Feeds every frame through the engine. A positive `tail_s` keeps holding
/// the last frame so pending deadlines can resolve after the trace ends.
pub fn replay_frames(
    engine: &mut GestureEngine,
    frames: &[TraceFrame],
    tail_s: f64,
) -> Vec<ReplayedEvent> {
    let mut pose = FixedPose::none();
    let mut events = Vec::new();
    let mut feed = |engine: &mut GestureEngine, frame: &TraceFrame| {
        pose.set(frame.pose.as_deref());
        let hand = if frame.tracked {
            HandFrame::tracked(frame.sample)
        } else {
            HandFrame::lost(frame.sample.timestamp)
        };
        let output = engine.tick(&hand, &pose);
        events.extend(output.iter().cloned().map(|event| ReplayedEvent {
            t_s: frame.sample.timestamp,
            event,
        }));
    };

    for frame in frames {
        feed(engine, frame);
    }

    if let Some(last) = frames.last() {
        let ticks = (tail_s * TAIL_HZ).ceil() as usize;
        for tick in 1..=ticks {
            let mut held = last.clone();
            held.sample.timestamp += tick as f64 / TAIL_HZ;
            feed(engine, &held);
        }
    }

    events
}

fn detail(event: &GestureEvent) -> String {
    match event {
        GestureEvent::Started { .. } => String::new(),
        GestureEvent::Progress { progress, .. } => format!("{progress:.3}"),
        GestureEvent::Completed(result) => format!(
            "distance={:.3} duration={:.2}",
            result.metrics.total_distance, result.metrics.duration
        ),
        GestureEvent::Failed(result) => match &result.failure {
            Some(failure) => format!("{}/{}", failure.reason, failure.phase.as_str()),
            None => "unknown".to_string(),
        },
        GestureEvent::PendingChanged { pending } => pending.to_string(),
    }
}
