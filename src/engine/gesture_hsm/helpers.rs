use super::*;

impl GestureHsm {
    pub(super) fn new(catalog: Arc<GestureCatalog>, config: EngineConfig) -> Self {
        Self {
            catalog,
            tracker: TrajectoryTracker::new(config.tracker),
            config,
            session: None,
            cooldown_until: None,
            rearm_blocked: None,
            last_tracked_at: None,
            last_soft: 0,
            current: EngineStateId::Idle,
            last_trace: EngineTraceSample::default(),
        }
    }

    pub(super) fn enter(&mut self, state_id: EngineStateId, state: State) -> Outcome<State> {
        self.current = state_id;
        Transition(state)
    }

    pub(super) fn emit(context: &mut DispatchContext, event: GestureEvent) {
        if context.events.push(event).is_err() {
            warn!("gesture: event buffer full, dropping event");
        }
    }

    pub(super) fn note_tracking(&mut self, input: &TickInput) {
        if input.tracked {
            self.last_tracked_at = Some(input.sample.timestamp);
        }
    }

    pub(super) fn begin_session(
        &mut self,
        input: &TickInput,
        candidates: Candidates,
        active: Option<usize>,
    ) {
        self.tracker.reset();
        self.last_soft = 0;
        self.session = Some(Session {
            start_time: input.sample.timestamp,
            start_position: input.sample.position,
            reach_m: 0.0,
            active,
            candidates,
        });
        self.tracker.push(input.sample);
    }

    /// Feeds a tracked sample into the window and the session's reach.
    pub(super) fn advance(&mut self, sample: TrajectorySample) {
        self.tracker.push(sample);
        if let Some(session) = self.session.as_mut() {
            let offset = nalgebra::distance(&session.start_position, &sample.position);
            session.reach_m = session.reach_m.max(offset);
        }
    }

    pub(super) fn end_session(&mut self) {
        self.session = None;
        self.last_soft = 0;
    }

    pub(super) fn clear(&mut self) {
        self.end_session();
        self.tracker.reset();
        self.cooldown_until = None;
        self.rearm_blocked = None;
        self.last_tracked_at = None;
        self.last_trace = EngineTraceSample::default();
    }

    /// PendingConfirmation gives up once no candidate could still finish.
    pub(super) fn pending_ceiling(&self, session: &Session) -> f32 {
        session
            .candidates
            .iter()
            .filter_map(|&idx| self.catalog.get(idx))
            .map(|definition| definition.max_duration_s)
            .fold(0.0, f32::max)
    }

    /// Soft warnings never fail a gesture; they are logged when they change.
    pub(super) fn note_soft_warnings(&mut self, definition: &GestureDefinition, soft: u8) {
        if soft != self.last_soft {
            debug!(
                "gesture: `{}` soft warnings {soft:#08b}, speed {:.3} m/s, rotation {:.1} deg",
                definition.name,
                self.tracker.current_speed(),
                self.tracker.total_rotation_degrees()
            );
        }
        self.last_soft = soft;
    }

    pub(super) fn record_trace(
        &mut self,
        state_id: EngineStateId,
        input: &TickInput,
        soft_warnings: u8,
        failure: Option<FailureReason>,
        progress: f32,
    ) {
        let (active, candidate_count, elapsed_s) = match &self.session {
            Some(session) => (
                session.active.and_then(|idx| u8::try_from(idx).ok()),
                session.candidates.len() as u8,
                (input.sample.timestamp - session.start_time) as f32,
            ),
            None => (None, 0, 0.0),
        };
        self.last_trace = EngineTraceSample {
            t_s: input.sample.timestamp,
            state_id,
            tracked: input.tracked,
            active,
            candidate_count,
            soft_warnings,
            failure,
            elapsed_s,
            progress,
            total_distance: self.tracker.total_distance(),
            current_speed: self.tracker.current_speed(),
        };
    }
}
