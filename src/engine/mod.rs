//! Gesture lifecycle: pose-triggered sessions, candidate disambiguation,
//! per-tick constraint validation and event emission.

pub mod config;
pub mod disambiguate;
pub mod events;
mod gesture_hsm;
pub mod trace;
pub mod types;
mod validate;

pub use config::{CascadeConfig, EngineConfig, MotionThresholds, PhaseRatios};
pub use disambiguate::{CascadeRule, Resolution};
pub use events::{
    failure_hint, DynamicGestureResult, EventBuffer, EventSink, FailureReason, GestureEvent,
    GestureFailure, GestureOutcome, GesturePhase,
};
pub use gesture_hsm::GestureEngine;
pub use trace::{EngineStateId, EngineTraceSample};
pub use types::{EngineOutput, HandFrame};
