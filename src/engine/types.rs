use crate::{
    joints::HandJoints,
    types::{Position, TrajectorySample},
};

use super::{
    events::{DynamicGestureResult, EventBuffer, EventSink, GestureEvent},
    trace::EngineTraceSample,
};

/// One host frame for the tracked reference joint.
#[derive(Clone, Copy, Debug)]
pub struct HandFrame<'a> {
    pub sample: TrajectorySample,
    pub tracked: bool,
    /// Latest raw joints, for requirements with a direct shape reference.
    pub joints: Option<&'a HandJoints>,
    /// Current target; zone centres are relative to it when present.
    pub anchor: Option<Position>,
}

impl<'a> HandFrame<'a> {
    pub fn tracked(sample: TrajectorySample) -> Self {
        Self {
            sample,
            tracked: true,
            joints: None,
            anchor: None,
        }
    }

    /// A frame where the tracker lost the hand; only the timestamp is used.
    pub fn lost(timestamp: f64) -> Self {
        Self {
            sample: TrajectorySample {
                timestamp,
                ..TrajectorySample::default()
            },
            tracked: false,
            joints: None,
            anchor: None,
        }
    }

    pub fn with_joints(self, joints: &'a HandJoints) -> Self {
        Self {
            joints: Some(joints),
            ..self
        }
    }

    pub fn with_anchor(self, anchor: Position) -> Self {
        Self {
            anchor: Some(anchor),
            ..self
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct EngineOutput {
    pub events: EventBuffer,
    pub trace: EngineTraceSample,
}

impl EngineOutput {
    pub fn iter(&self) -> impl Iterator<Item = &GestureEvent> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn contains_kind(&self, kind: &str) -> bool {
        self.events.iter().any(|event| event.kind() == kind)
    }

    pub fn completed(&self) -> Option<&DynamicGestureResult> {
        self.events.iter().find_map(|event| match event {
            GestureEvent::Completed(result) => Some(result),
            _ => None,
        })
    }

    pub fn failed(&self) -> Option<&DynamicGestureResult> {
        self.events.iter().find_map(|event| match event {
            GestureEvent::Failed(result) => Some(result),
            _ => None,
        })
    }

    /// Forwards the buffered events in emission order.
    pub fn dispatch<S: EventSink + ?Sized>(self, sink: &mut S) {
        for event in self.events {
            sink.emit(event);
        }
    }
}
