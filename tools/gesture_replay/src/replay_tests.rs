use std::{fs, path::PathBuf, sync::Arc};

use anyhow::Result;
use signmotion::{EngineConfig, FailureReason, GestureEngine, GestureEvent, SequenceMatcherConfig};

use crate::{
    catalog_check::constraints,
    dtw::match_sequences,
    replay::{load_catalog, replay_frames},
    trace::{parse_expected_kinds, parse_trace, parse_trace_str, tracked_samples, TRACE_HEADER},
};

fn trace_fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("traces").join(name)
}

fn builtin_engine() -> Result<GestureEngine> {
    Ok(GestureEngine::new(
        Arc::new(load_catalog(None)?),
        EngineConfig::default(),
    ))
}

#[test]
fn parses_trace_lines_and_skips_comments() -> Result<()> {
    let raw = format!(
        "# comment\n{TRACE_HEADER}\n\
         hand_trace,0.0,1,0.1,0.2,0.3,0,0,0,1,B\n\
         touch_trace,5,1\n\
         hand_trace,0.016,0,0,0,0,0,0,0,0,\n"
    );
    let frames = parse_trace_str(&raw, "inline")?;

    assert_eq!(frames.len(), 2);
    assert!(frames[0].tracked);
    assert_eq!(frames[0].pose.as_deref(), Some("B"));
    assert!((frames[0].sample.position.y - 0.2).abs() < 1e-6);
    assert!(!frames[1].tracked);
    assert_eq!(frames[1].pose, None);
    assert_eq!(frames[1].sample.rotation, nalgebra::UnitQuaternion::identity());
    Ok(())
}

#[test]
fn reports_line_numbers_for_bad_rows() {
    let short = parse_trace_str("hand_trace,0.0,1,0.1\n", "short.csv").unwrap_err();
    assert!(short.to_string().contains("short.csv:1"));

    let flag = parse_trace_str("hand_trace,0.0,yes,0,0,0,0,0,0,1,A\n", "flag.csv").unwrap_err();
    assert!(flag.to_string().contains("invalid tracked value `yes`"));

    let raw = "hand_trace,0.5,1,0,0,0,0,0,0,1,A\nhand_trace,0.4,1,0,0,0,0,0,0,1,A\n";
    let backwards = parse_trace_str(raw, "time.csv").unwrap_err();
    assert!(backwards.to_string().contains("time.csv:2"));
}

#[test]
fn reads_trace_and_expectations_from_disk() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let trace_path = dir.path().join("trace.csv");
    fs::write(&trace_path, "hand_trace,0.0,1,0,0,0,0,0,0,1,A\n")?;
    let expect_path = dir.path().join("kinds.txt");
    fs::write(&expect_path, "# kinds\nstarted, progress\n\ncompleted\n")?;

    assert_eq!(parse_trace(&trace_path)?.len(), 1);
    assert_eq!(
        parse_expected_kinds(&expect_path)?,
        ["started", "progress", "completed"]
    );
    assert!(parse_trace(&dir.path().join("missing.csv")).is_err());
    Ok(())
}

#[test]
fn recorded_j_stroke_matches_expected_kinds() -> Result<()> {
    let frames = parse_trace(&trace_fixture("j_stroke.csv"))?;
    let expected = parse_expected_kinds(&trace_fixture("j_stroke.expected"))?;

    let mut engine = builtin_engine()?;
    let events = replay_frames(&mut engine, &frames, 0.0);
    let kinds: Vec<&str> = events.iter().map(|e| e.event.kind()).collect();
    assert_eq!(kinds, expected);
    assert_eq!(events.last().and_then(|e| e.event.gesture()), Some("J"));
    Ok(())
}

#[test]
fn tail_lets_a_held_pose_time_out() -> Result<()> {
    let raw = "hand_trace,0.0,1,0,0,0,0,0,0,1,I\nhand_trace,0.1,1,0,0,0,0,0,0,1,I\n";
    let frames = parse_trace_str(raw, "held.csv")?;

    let mut engine = builtin_engine()?;
    let without_tail = replay_frames(&mut engine, &frames, 0.0);
    assert!(!without_tail
        .iter()
        .any(|e| matches!(e.event, GestureEvent::Failed(_))));

    let mut engine = builtin_engine()?;
    let with_tail = replay_frames(&mut engine, &frames, 3.0);
    let failure = with_tail.iter().find_map(|e| match &e.event {
        GestureEvent::Failed(result) => result.reason(),
        _ => None,
    });
    assert_eq!(failure, Some(FailureReason::Timeout));
    Ok(())
}

#[test]
fn recorded_stroke_matches_itself_by_dtw() -> Result<()> {
    let samples = tracked_samples(&parse_trace(&trace_fixture("j_stroke.csv"))?);
    let config = SequenceMatcherConfig {
        sample_rate_hz: 60.0,
        threshold: 0.005,
        ..SequenceMatcherConfig::default()
    };

    let result = match_sequences(&samples, &samples, 0, samples.len() - 1, config)?;
    assert!(result.accepted, "distance {}", result.distance);
    assert!(match_sequences(&samples, &samples, 10, 5, config).is_err());
    Ok(())
}

#[test]
fn catalog_constraints_are_labelled() -> Result<()> {
    let catalog = load_catalog(None)?;
    let labels = |name: &str| catalog.find(name).map(constraints).unwrap_or_default();

    assert_eq!(labels("J"), ["movement", "direction", "rotation"]);
    assert_eq!(labels("please"), ["movement", "circular", "zone"]);
    assert!(labels("no").is_empty());
    Ok(())
}
