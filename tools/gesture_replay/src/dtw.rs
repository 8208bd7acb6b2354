use std::path::PathBuf;

use anyhow::{Context, Result};
use serde_json::json;
use signmotion::{SequenceMatch, SequenceMatcher, SequenceMatcherConfig, TrajectorySample};

use crate::{
    logging::Logger,
    trace::{parse_trace, tracked_samples},
};

pub struct DtwOptions {
    pub reference_path: PathBuf,
    pub live_path: PathBuf,
    pub start: usize,
    pub end: usize,
    pub config: SequenceMatcherConfig,
}

pub fn run_dtw(logger: &mut Logger, options: DtwOptions) -> Result<()> {
    let reference = tracked_samples(&parse_trace(&options.reference_path)?);
    let live = tracked_samples(&parse_trace(&options.live_path)?);
    logger.info(format!(
        "reference {} samples [{}..={}], live {} samples",
        reference.len(),
        options.start,
        options.end,
        live.len()
    ));

    let result = match_sequences(&reference, &live, options.start, options.end, options.config)?;
    println!("dtw,distance,accepted,live_samples");
    println!(
        "dtw,{:.5},{},{}",
        result.distance, result.accepted, result.live_samples
    );
    logger.record(
        "dtw_result",
        json!({
            "distance": result.distance,
            "accepted": result.accepted,
            "live_samples": result.live_samples,
            "threshold": options.config.threshold,
        }),
    );
    Ok(())
}

pub fn match_sequences(
    reference: &[TrajectorySample],
    live: &[TrajectorySample],
    start: usize,
    end: usize,
    config: SequenceMatcherConfig,
) -> Result<SequenceMatch> {
    let mut matcher = SequenceMatcher::new(config);
    matcher
        .record_reference(reference, start, end)
        .context("failed to cut the reference")?;

    let started_at = live.first().map_or(0.0, |sample| sample.timestamp);
    matcher.start_session(started_at)?;
    for sample in live {
        matcher.push_live(sample);
    }
    matcher
        .finish_session()
        .context("failed to compare the live trace")
}
