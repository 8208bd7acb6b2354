//! Dynamic hand-gesture recognition.
//!
//! The host feeds one [`HandFrame`] per tick together with the name of the
//! currently recognized static pose; [`GestureEngine`] answers with the
//! lifecycle events of at most one gesture attempt at a time. Motion signals
//! come from a sliding-window [`TrajectoryTracker`] and gestures are declared
//! in a [`GestureCatalog`], either the compiled-in default or a TOML file.
//!
//! ```no_run
//! use signmotion::{EngineConfig, FixedPose, GestureEngine, HandFrame, TrajectorySample};
//!
//! let mut engine = GestureEngine::with_builtin_catalog(EngineConfig::default())?;
//! let pose = FixedPose::new(Some("B"));
//! let frame = HandFrame::tracked(TrajectorySample::at(0.0, 1.2, 0.3, 0.016));
//! for event in engine.tick(&frame, &pose).iter() {
//!     println!("{}", event.kind());
//! }
//! # Ok::<(), signmotion::CatalogError>(())
//! ```

pub mod catalog;
pub mod engine;
pub mod error;
pub mod joints;
pub mod pose;
pub mod sequence;
pub mod trajectory;
pub mod types;

pub use catalog::{
    GestureCatalog, GestureDefinition, PoseTiming, StaticPoseRequirement, ZoneTiming,
};
pub use engine::{
    DynamicGestureResult, EngineConfig, EngineOutput, EngineStateId, EngineTraceSample,
    EventSink, FailureReason, GestureEngine, GestureEvent, GestureFailure, GestureOutcome,
    GesturePhase, HandFrame,
};
pub use error::{CatalogError, MatcherError};
pub use joints::{HandJoint, HandJoints};
pub use pose::{FixedPose, PoseAdapter, ShapeValidator};
pub use sequence::{SequenceMatch, SequenceMatcher, SequenceMatcherConfig};
pub use trajectory::{TrackerConfig, TrajectoryTracker};
pub use types::{
    Direction, GestureMetrics, GestureName, MovementSnapshot, Orientation, Position,
    TrajectorySample,
};
