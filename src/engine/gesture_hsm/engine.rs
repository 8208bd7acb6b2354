use crate::{
    engine::types::{EngineOutput, HandFrame},
    error::CatalogError,
    pose::{PoseAdapter, ShapeValidator},
    types::MovementSnapshot,
};

use super::*;

/// Tick-driven recognizer for the gestures of one catalog.
pub struct GestureEngine {
    machine: statig::blocking::StateMachine<GestureHsm>,
    shape_validator: Option<Box<dyn ShapeValidator>>,
}

impl GestureEngine {
    pub fn new(catalog: Arc<GestureCatalog>, config: EngineConfig) -> Self {
        Self {
            machine: GestureHsm::new(catalog, config).state_machine(),
            shape_validator: None,
        }
    }

    pub fn with_builtin_catalog(config: EngineConfig) -> Result<Self, CatalogError> {
        Ok(Self::new(Arc::new(GestureCatalog::builtin()?), config))
    }

    /// Enables direct validation of requirements that carry a `shape_ref`.
    pub fn with_shape_validator(mut self, validator: impl ShapeValidator + 'static) -> Self {
        self.shape_validator = Some(Box::new(validator));
        self
    }

    /// Advances the machine by one host frame. Never blocks.
    pub fn tick(&mut self, frame: &HandFrame<'_>, poses: &dyn PoseAdapter) -> EngineOutput {
        let pose = PoseObservation::observe(
            self.catalog(),
            poses.current_pose_name(),
            frame.joints,
            self.shape_validator.as_deref(),
        );
        let input = TickInput {
            sample: frame.sample,
            tracked: frame.tracked,
            anchor: frame.anchor,
            pose,
        };
        let mut context = DispatchContext::default();
        self.machine
            .handle_with_context(&GestureHsmEvent::Tick(input), &mut context);
        self.finish(context)
    }

    /// Drops the current attempt and any cooldown without emitting events.
    pub fn reset(&mut self) -> EngineOutput {
        let mut context = DispatchContext::default();
        self.machine
            .handle_with_context(&GestureHsmEvent::Reset, &mut context);
        self.finish(context)
    }

    pub fn state(&self) -> EngineStateId {
        self.machine.inner().current
    }

    pub fn catalog(&self) -> &GestureCatalog {
        &self.machine.inner().catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.machine.inner().config
    }

    pub fn active_gesture(&self) -> Option<&GestureDefinition> {
        let hsm = self.machine.inner();
        hsm.session
            .as_ref()
            .and_then(|session| session.active)
            .and_then(|idx| hsm.catalog.get(idx))
    }

    /// Names of the gestures still competing in PendingConfirmation.
    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        let hsm = self.machine.inner();
        hsm.session
            .iter()
            .filter(|session| session.active.is_none())
            .flat_map(|session| session.candidates.iter())
            .filter_map(move |&idx| hsm.catalog.get(idx))
            .map(|definition| &*definition.name)
    }

    pub fn snapshot(&self) -> MovementSnapshot {
        self.machine.inner().tracker.snapshot()
    }

    pub fn last_trace(&self) -> EngineTraceSample {
        self.machine.inner().last_trace
    }

    fn finish(&self, context: DispatchContext) -> EngineOutput {
        EngineOutput {
            events: context.events,
            trace: self.machine.inner().last_trace,
        }
    }
}
