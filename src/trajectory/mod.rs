//! Time-windowed trajectory history and the motion signals derived from it.
//!
//! Every `update` is O(1) amortized: the window is a fixed-capacity ring
//! buffer and the recent-direction average is read from running prefix sums
//! stored with each sample. Circularity scans the window and is only queried
//! for gestures that ask for it.

use heapless::Deque;
use nalgebra::Vector3;

use crate::types::{
    Direction, GestureMetrics, MovementSnapshot, Orientation, Position, TrajectorySample,
};

pub const TRACKER_CAPACITY: usize = 512;

const NEAR_ZERO: f32 = 1e-6;

#[derive(Clone, Copy, Debug)]
pub struct TrackerConfig {
    /// Samples older than this (seconds) are evicted.
    pub window_s: f64,
    /// Hard cap on retained samples, clamped to `TRACKER_CAPACITY`.
    pub max_samples: usize,
    /// Frame displacements at or below this (meters) never count as a
    /// direction change.
    pub noise_floor_m: f32,
    pub direction_change_deg: f32,
    /// Share of the window (by sample count) averaged for `average_direction`.
    pub recent_fraction: f32,
    /// Per-tick rotation at or below this (degrees) is not accumulated.
    pub rotation_deadband_deg: f32,
    pub min_circle_samples: usize,
    pub min_circle_radius_m: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            window_s: 3.0,
            max_samples: 256,
            noise_floor_m: 0.001,
            direction_change_deg: 30.0,
            recent_fraction: 0.3,
            rotation_deadband_deg: 0.0,
            min_circle_samples: 10,
            min_circle_radius_m: 0.01,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct WindowEntry {
    sample: TrajectorySample,
    /// Running sum of unit frame displacements up to this sample.
    direction_sum: Vector3<f64>,
    /// Running count of non-degenerate displacements.
    valid_steps: u32,
}

pub struct TrajectoryTracker {
    config: TrackerConfig,
    window: Deque<WindowEntry, TRACKER_CAPACITY>,
    started_at: Option<f64>,
    total_distance: f32,
    total_rotation_deg: f32,
    direction_changes: u32,
    last_unit_step: Option<Direction>,
    direction_sum: Vector3<f64>,
    valid_steps: u32,
    current_speed: f32,
    max_speed: f32,
    average_direction: Direction,
}

impl Default for TrajectoryTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

pub(crate) fn angle_deg(a: &Direction, b: &Direction) -> f32 {
    a.angle(b).to_degrees()
}

impl TrajectoryTracker {
    pub fn new(config: TrackerConfig) -> Self {
        let config = TrackerConfig {
            max_samples: config.max_samples.clamp(1, TRACKER_CAPACITY),
            ..config
        };
        Self {
            config,
            window: Deque::new(),
            started_at: None,
            total_distance: 0.0,
            total_rotation_deg: 0.0,
            direction_changes: 0,
            last_unit_step: None,
            direction_sum: Vector3::zeros(),
            valid_steps: 0,
            current_speed: 0.0,
            max_speed: 0.0,
            average_direction: Vector3::zeros(),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn reset(&mut self) {
        self.window.clear();
        self.started_at = None;
        self.total_distance = 0.0;
        self.total_rotation_deg = 0.0;
        self.direction_changes = 0;
        self.last_unit_step = None;
        self.direction_sum = Vector3::zeros();
        self.valid_steps = 0;
        self.current_speed = 0.0;
        self.max_speed = 0.0;
        self.average_direction = Vector3::zeros();
    }

    pub fn update(&mut self, position: Position, rotation: Orientation, timestamp: f64) {
        self.push(TrajectorySample::new(position, rotation, timestamp));
    }

    pub fn push(&mut self, sample: TrajectorySample) {
        if self.started_at.is_none() {
            self.started_at = Some(sample.timestamp);
        }

        if let Some(prev) = self.window.back().map(|entry| entry.sample) {
            self.accumulate_step(&prev, &sample);
        }

        if self.window.is_full() {
            self.window.pop_front();
        }
        let _ = self.window.push_back(WindowEntry {
            sample,
            direction_sum: self.direction_sum,
            valid_steps: self.valid_steps,
        });
        self.evict(sample.timestamp);

        self.current_speed = self.compute_speed();
        self.max_speed = self.max_speed.max(self.current_speed);
        self.average_direction = self.compute_average_direction();
    }

    fn accumulate_step(&mut self, prev: &TrajectorySample, sample: &TrajectorySample) {
        let step = sample.position - prev.position;
        let frame_distance = step.norm();
        self.total_distance += frame_distance;

        if frame_distance > NEAR_ZERO {
            let unit = step / frame_distance;
            self.direction_sum += unit.cast::<f64>();
            self.valid_steps += 1;

            // Only direction-change counting ignores sub-floor jitter.
            if frame_distance > self.config.noise_floor_m {
                if let Some(last) = self.last_unit_step {
                    if angle_deg(&last, &unit) > self.config.direction_change_deg {
                        self.direction_changes += 1;
                    }
                }
                self.last_unit_step = Some(unit);
            }
        }

        let rotation_step = prev.rotation.angle_to(&sample.rotation).to_degrees();
        if rotation_step > self.config.rotation_deadband_deg {
            self.total_rotation_deg += rotation_step;
        }
    }

    fn evict(&mut self, now: f64) {
        while self.window.len() > self.config.max_samples {
            self.window.pop_front();
        }
        let horizon = now - self.config.window_s;
        while self.window.len() > 1
            && self
                .window
                .front()
                .is_some_and(|entry| entry.sample.timestamp < horizon)
        {
            self.window.pop_front();
        }
    }

    fn entry(&self, idx: usize) -> Option<&WindowEntry> {
        let (head, tail) = self.window.as_slices();
        if idx < head.len() {
            head.get(idx)
        } else {
            tail.get(idx - head.len())
        }
    }

    fn compute_speed(&self) -> f32 {
        let len = self.window.len();
        if len < 3 {
            return 0.0;
        }
        let (Some(first), Some(last)) = (self.entry(len - 3), self.entry(len - 1)) else {
            return 0.0;
        };
        let dt = (last.sample.timestamp - first.sample.timestamp) as f32;
        if dt <= NEAR_ZERO {
            return 0.0;
        }
        nalgebra::distance(&first.sample.position, &last.sample.position) / dt
    }

    fn compute_average_direction(&self) -> Direction {
        let len = self.window.len();
        if len < 2 {
            return Vector3::zeros();
        }
        let recent = ((len as f32 * self.config.recent_fraction).ceil() as usize).clamp(2, len);
        let (Some(oldest), Some(newest)) = (self.entry(len - recent), self.entry(len - 1)) else {
            return Vector3::zeros();
        };
        if newest.valid_steps == oldest.valid_steps {
            return Vector3::zeros();
        }
        let sum = (newest.direction_sum - oldest.direction_sum).cast::<f32>();
        let norm = sum.norm();
        if norm < NEAR_ZERO {
            Vector3::zeros()
        } else {
            sum / norm
        }
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn last_sample(&self) -> Option<TrajectorySample> {
        self.window.back().map(|entry| entry.sample)
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.window.iter().map(|entry| entry.sample.position)
    }

    pub fn total_distance(&self) -> f32 {
        self.total_distance
    }

    pub fn current_speed(&self) -> f32 {
        self.current_speed
    }

    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    pub fn average_direction(&self) -> Direction {
        self.average_direction
    }

    pub fn total_rotation_degrees(&self) -> f32 {
        self.total_rotation_deg
    }

    pub fn direction_changes(&self) -> u32 {
        self.direction_changes
    }

    /// Seconds between the first sample since reset and the newest one.
    pub fn duration(&self) -> f32 {
        match (self.started_at, self.last_sample()) {
            (Some(start), Some(last)) => (last.timestamp - start).max(0.0) as f32,
            _ => 0.0,
        }
    }

    /// 1 when every in-window point sits at the same distance from the
    /// centroid, falling towards 0 as the radius spread grows.
    pub fn circularity_score(&self) -> f32 {
        let len = self.window.len();
        if len < self.config.min_circle_samples.max(1) {
            return 0.0;
        }

        let count = len as f32;
        let centroid = self
            .positions()
            .fold(Vector3::zeros(), |acc: Vector3<f32>, p| acc + p.coords)
            / count;
        let mean_radius = self
            .positions()
            .map(|p| (p.coords - centroid).norm())
            .sum::<f32>()
            / count;
        if mean_radius < self.config.min_circle_radius_m {
            return 0.0;
        }

        let variance = self
            .positions()
            .map(|p| {
                let deviation = (p.coords - centroid).norm() - mean_radius;
                deviation * deviation
            })
            .sum::<f32>()
            / count;

        1.0 - (variance / (mean_radius * mean_radius)).clamp(0.0, 1.0)
    }

    pub fn is_moving_in_direction(&self, target: &Direction, tolerance_deg: f32) -> bool {
        if self.average_direction.norm() < NEAR_ZERO || target.norm() < NEAR_ZERO {
            return false;
        }
        angle_deg(&self.average_direction, target) <= tolerance_deg
    }

    pub fn snapshot(&self) -> MovementSnapshot {
        MovementSnapshot {
            total_distance: self.total_distance,
            current_speed: self.current_speed,
            average_direction: self.average_direction,
            total_rotation_degrees: self.total_rotation_deg,
            direction_changes: self.direction_changes,
            circularity_score: self.circularity_score(),
        }
    }

    pub fn metrics(&self) -> GestureMetrics {
        let duration = self.duration();
        let average_speed = if duration > NEAR_ZERO {
            self.total_distance / duration
        } else {
            0.0
        };
        GestureMetrics {
            average_speed,
            max_speed: self.max_speed,
            total_distance: self.total_distance,
            duration,
            direction_changes: self.direction_changes,
            total_rotation_degrees: self.total_rotation_deg,
            circularity_score: self.circularity_score(),
        }
    }
}
