use crate::trajectory::TrackerConfig;

/// Motion that ends PendingConfirmation and runs the disambiguation cascade.
#[derive(Clone, Copy, Debug)]
pub struct MotionThresholds {
    pub distance_m: f32,
    pub speed_mps: f32,
}

/// Cascade rule thresholds, checked in declaration order.
#[derive(Clone, Copy, Debug)]
pub struct CascadeConfig {
    pub min_circularity: f32,
    pub min_rotation_deg: f32,
}

/// Ratios of `elapsed / min_duration_s` that gate hard failures.
#[derive(Clone, Copy, Debug)]
pub struct PhaseRatios {
    /// Direction is not checked before this.
    pub direction_grace: f32,
    /// Soft checks turn into hard failures after this.
    pub hard_fail: f32,
    /// Zone `Start` window is `[0, zone_start_end]`.
    pub zone_start_end: f32,
    /// Zone `End` window begins here; `During` lies in between.
    pub zone_end_begin: f32,
}

#[derive(Clone, Copy, Debug)]
pub struct EngineConfig {
    pub confirmation_timeout_s: f32,
    pub motion: MotionThresholds,
    pub cascade: CascadeConfig,
    pub ratios: PhaseRatios,
    /// `min_speed` multiplier below which a soft warning is raised.
    pub speed_soft_factor: f32,
    pub cooldown_s: f32,
    pub tracking_loss_tolerance_s: f32,
    /// Keep PendingConfirmation alive while any pose is present, even one
    /// that no longer matches a candidate's start requirement.
    pub any_pose_mode: bool,
    pub tracker: TrackerConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            confirmation_timeout_s: 0.25,
            motion: MotionThresholds {
                distance_m: 0.015,
                speed_mps: 0.06,
            },
            cascade: CascadeConfig {
                min_circularity: 0.15,
                min_rotation_deg: 8.0,
            },
            ratios: PhaseRatios {
                direction_grace: 0.5,
                hard_fail: 0.9,
                zone_start_end: 0.25,
                zone_end_begin: 0.9,
            },
            speed_soft_factor: 0.5,
            cooldown_s: 2.0,
            tracking_loss_tolerance_s: 0.2,
            any_pose_mode: false,
            tracker: TrackerConfig::default(),
        }
    }
}
