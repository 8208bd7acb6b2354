use std::sync::Arc;

use nalgebra::{Point3, UnitQuaternion, Vector3};
use serde::Serialize;

pub type Position = Point3<f32>;
pub type Direction = Vector3<f32>;
pub type Orientation = UnitQuaternion<f32>;

/// Shared, cheaply clonable gesture name carried by every emitted event.
pub type GestureName = Arc<str>;

/// One tick of the tracked reference joint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrajectorySample {
    pub position: Position,
    pub rotation: Orientation,
    /// Seconds on the host clock.
    pub timestamp: f64,
}

impl TrajectorySample {
    pub fn new(position: Position, rotation: Orientation, timestamp: f64) -> Self {
        Self {
            position,
            rotation,
            timestamp,
        }
    }

    pub fn at(x: f32, y: f32, z: f32, timestamp: f64) -> Self {
        Self::new(Point3::new(x, y, z), UnitQuaternion::identity(), timestamp)
    }
}

impl Default for TrajectorySample {
    fn default() -> Self {
        Self::at(0.0, 0.0, 0.0, 0.0)
    }
}

/// Derived motion signals, recomputed every tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct MovementSnapshot {
    pub total_distance: f32,
    pub current_speed: f32,
    pub average_direction: Direction,
    pub total_rotation_degrees: f32,
    pub direction_changes: u32,
    pub circularity_score: f32,
}

/// Summary attached to completion and failure results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct GestureMetrics {
    pub average_speed: f32,
    pub max_speed: f32,
    pub total_distance: f32,
    pub duration: f32,
    pub direction_changes: u32,
    pub total_rotation_degrees: f32,
    pub circularity_score: f32,
}
