//! Template matching by dynamic time warping, for gestures that parametric
//! constraints describe poorly.
//!
//! A reference path is cut once from a pre-captured recording. Live sessions
//! sample the same tracked point at a fixed rate and the DTW distance is
//! computed only when the session is finished, never per tick.

use log::{debug, info};

use crate::{
    error::MatcherError,
    types::{Position, TrajectorySample},
};

#[derive(Clone, Copy, Debug)]
pub struct SequenceMatcherConfig {
    pub sample_rate_hz: f32,
    /// Live samples after this many seconds are ignored.
    pub max_duration_s: f32,
    /// Highest normalized distance (meters per aligned step) still accepted.
    pub threshold: f32,
    /// Sakoe-Chiba band half-width; `None` evaluates the full cost matrix.
    pub band: Option<usize>,
}

impl Default for SequenceMatcherConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 30.0,
            max_duration_s: 3.0,
            threshold: 0.03,
            band: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SequenceMatch {
    pub distance: f32,
    pub accepted: bool,
    pub live_samples: usize,
}

#[derive(Clone, Copy, Debug)]
struct LiveSession {
    started_at: f64,
    next_sample_at: f64,
}

pub struct SequenceMatcher {
    config: SequenceMatcherConfig,
    reference: Vec<Position>,
    live: Vec<Position>,
    session: Option<LiveSession>,
}

const SCHEDULE_SLACK_S: f64 = 1e-6;

impl SequenceMatcher {
    pub fn new(config: SequenceMatcherConfig) -> Self {
        Self {
            config,
            reference: Vec::new(),
            live: Vec::new(),
            session: None,
        }
    }

    pub fn config(&self) -> &SequenceMatcherConfig {
        &self.config
    }

    /// Stores `recording[start..=end]` as the reference path. Recording a
    /// second reference requires `clear_reference` first.
    pub fn record_reference(
        &mut self,
        recording: &[TrajectorySample],
        start: usize,
        end: usize,
    ) -> Result<(), MatcherError> {
        if !self.reference.is_empty() {
            return Err(MatcherError::ReferenceAlreadyRecorded);
        }
        if start > end || end >= recording.len() {
            return Err(MatcherError::InvalidReferenceRange {
                start,
                end,
                len: recording.len(),
            });
        }
        self.reference = recording[start..=end]
            .iter()
            .map(|sample| sample.position)
            .collect();
        debug!(
            "sequence: reference recorded, {} samples",
            self.reference.len()
        );
        Ok(())
    }

    pub fn clear_reference(&mut self) {
        self.reference.clear();
    }

    pub fn reference(&self) -> &[Position] {
        &self.reference
    }

    pub fn has_reference(&self) -> bool {
        !self.reference.is_empty()
    }

    pub fn start_session(&mut self, now: f64) -> Result<(), MatcherError> {
        if self.reference.is_empty() {
            return Err(MatcherError::NoReference);
        }
        self.live.clear();
        self.session = Some(LiveSession {
            started_at: now,
            next_sample_at: now,
        });
        Ok(())
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_some()
    }

    pub fn live(&self) -> &[Position] {
        &self.live
    }

    /// Returns whether the sample was kept. Samples arriving faster than the
    /// configured rate or after `max_duration_s` are skipped.
    pub fn push_live(&mut self, sample: &TrajectorySample) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let elapsed = sample.timestamp - session.started_at;
        if elapsed > f64::from(self.config.max_duration_s) {
            return false;
        }
        if sample.timestamp + SCHEDULE_SLACK_S < session.next_sample_at {
            return false;
        }

        let interval = 1.0 / f64::from(self.config.sample_rate_hz.max(f32::EPSILON));
        while session.next_sample_at <= sample.timestamp + SCHEDULE_SLACK_S {
            session.next_sample_at += interval;
        }
        self.live.push(sample.position);
        true
    }

    pub fn cancel_session(&mut self) {
        self.session = None;
        self.live.clear();
    }

    /// Ends the live session and compares it with the reference.
    pub fn finish_session(&mut self) -> Result<SequenceMatch, MatcherError> {
        if self.session.take().is_none() {
            return Err(MatcherError::NotRecording);
        }
        if self.reference.is_empty() {
            return Err(MatcherError::NoReference);
        }
        if self.live.is_empty() {
            return Err(MatcherError::EmptyLiveSequence);
        }

        let distance = match self.config.band {
            Some(band) => dtw_distance_banded(&self.reference, &self.live, band),
            None => dtw_distance(&self.reference, &self.live),
        }
        .ok_or(MatcherError::EmptyLiveSequence)?;
        let result = SequenceMatch {
            distance,
            accepted: distance <= self.config.threshold,
            live_samples: self.live.len(),
        };
        info!(
            "sequence: distance {:.4} against threshold {:.4}, {}",
            result.distance,
            self.config.threshold,
            if result.accepted { "accepted" } else { "rejected" }
        );
        Ok(result)
    }
}

/// Normalized DTW distance over the full cost matrix.
pub fn dtw_distance(a: &[Position], b: &[Position]) -> Option<f32> {
    dtw(a, b, None)
}

/// DTW restricted to `|i - j| <= band`, widened to the length difference so
/// an alignment always exists.
pub fn dtw_distance_banded(a: &[Position], b: &[Position], band: usize) -> Option<f32> {
    dtw(a, b, Some(band.max(a.len().abs_diff(b.len()))))
}

/// Two rolling rows of the cost matrix; `None` for an empty input.
fn dtw(a: &[Position], b: &[Position], window: Option<usize>) -> Option<f32> {
    if a.is_empty() || b.is_empty() {
        return None;
    }
    let (n, m) = (a.len(), b.len());
    let mut prev = vec![f32::INFINITY; m + 1];
    let mut curr = vec![f32::INFINITY; m + 1];
    prev[0] = 0.0;

    for i in 1..=n {
        curr.fill(f32::INFINITY);
        let (lo, hi) = match window {
            Some(w) => (i.saturating_sub(w).max(1), (i + w).min(m)),
            None => (1, m),
        };
        for j in lo..=hi {
            let cost = nalgebra::distance(&a[i - 1], &b[j - 1]);
            let best = prev[j].min(curr[j - 1]).min(prev[j - 1]);
            curr[j] = cost + best;
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    let total = prev[m];
    total.is_finite().then(|| total / n.max(m) as f32)
}
