//! Static-pose inputs: the adapter label, direct shape validation and the
//! per-tick observation packed for the state machine.

use crate::{
    catalog::{
        GestureCatalog, GestureDefinition, PoseTiming, StaticPoseRequirement, MAX_CATALOG_GESTURES,
    },
    joints::HandJoints,
};

/// Last cached static-pose classification. Must not block.
pub trait PoseAdapter {
    fn current_pose_name(&self) -> Option<&str>;
}

/// Evaluates a named shape reference directly against raw joints.
pub trait ShapeValidator {
    fn matches(&self, shape_ref: &str, joints: &HandJoints) -> bool;
}

impl<F> ShapeValidator for F
where
    F: Fn(&str, &HandJoints) -> bool,
{
    fn matches(&self, shape_ref: &str, joints: &HandJoints) -> bool {
        self(shape_ref, joints)
    }
}

/// Adapter whose label is set by the host, e.g. from a replayed trace.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FixedPose(Option<String>);

impl FixedPose {
    pub fn new(pose: Option<&str>) -> Self {
        Self(pose.map(str::to_string))
    }

    pub fn none() -> Self {
        Self(None)
    }

    pub fn set(&mut self, pose: Option<&str>) {
        self.0 = pose.map(str::to_string);
    }
}

impl PoseAdapter for FixedPose {
    fn current_pose_name(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl PoseAdapter for Option<&str> {
    fn current_pose_name(&self) -> Option<&str> {
        *self
    }
}

/// Which catalog gestures have their Start, During and End requirement
/// groups satisfied this tick. Bit `i` refers to catalog index `i`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoseObservation {
    pub pose_present: bool,
    pub start_mask: u64,
    pub during_mask: u64,
    pub end_mask: u64,
}

impl PoseObservation {
    pub fn observe(
        catalog: &GestureCatalog,
        pose: Option<&str>,
        joints: Option<&HandJoints>,
        validator: Option<&dyn ShapeValidator>,
    ) -> Self {
        let probe = PoseProbe {
            pose,
            joints,
            validator,
        };
        let mut observation = Self {
            pose_present: pose.is_some(),
            ..Self::default()
        };
        for (idx, definition) in catalog.iter().enumerate().take(MAX_CATALOG_GESTURES) {
            let bit = 1u64 << idx;
            if probe.group_satisfied(definition, PoseTiming::Start) {
                observation.start_mask |= bit;
            }
            if probe.group_satisfied(definition, PoseTiming::During) {
                observation.during_mask |= bit;
            }
            if probe.group_satisfied(definition, PoseTiming::End) {
                observation.end_mask |= bit;
            }
        }
        observation
    }

    pub fn start_matches(&self, idx: usize) -> bool {
        bit_set(self.start_mask, idx)
    }

    pub fn during_matches(&self, idx: usize) -> bool {
        bit_set(self.during_mask, idx)
    }

    pub fn end_matches(&self, idx: usize) -> bool {
        bit_set(self.end_mask, idx)
    }
}

fn bit_set(mask: u64, idx: usize) -> bool {
    idx < MAX_CATALOG_GESTURES && mask & (1u64 << idx) != 0
}

struct PoseProbe<'a> {
    pose: Option<&'a str>,
    joints: Option<&'a HandJoints>,
    validator: Option<&'a dyn ShapeValidator>,
}

impl PoseProbe<'_> {
    fn requirement_matches(&self, requirement: &StaticPoseRequirement) -> bool {
        if let (Some(shape), Some(validator), Some(joints)) = (
            requirement.shape_ref.as_deref(),
            self.validator,
            self.joints,
        ) {
            return validator.matches(shape, joints);
        }
        self.pose.is_some_and(|pose| requirement.accepts_name(pose))
    }

    /// Every mandatory requirement of the group must match. A start group
    /// must also exist and match at least once, so gestures without a
    /// start pose never trigger by themselves.
    fn group_satisfied(&self, definition: &GestureDefinition, phase: PoseTiming) -> bool {
        let mut any_requirement = false;
        let mut any_match = false;
        for requirement in definition.requirements(phase) {
            any_requirement = true;
            let matched = self.requirement_matches(requirement);
            if !matched && !requirement.is_optional {
                return false;
            }
            any_match |= matched;
        }
        match phase {
            PoseTiming::Start => any_requirement && any_match,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Point3;

    use super::*;
    use crate::joints::HAND_JOINT_COUNT;

    fn catalog() -> GestureCatalog {
        let mut compound = GestureDefinition::new("compound", 0.2, 1.5);
        compound.pose_sequence = vec![
            StaticPoseRequirement {
                alternatives: vec!["H".to_string()],
                ..StaticPoseRequirement::named("U", PoseTiming::Start)
            },
            StaticPoseRequirement {
                shape_ref: Some("snap".to_string()),
                ..StaticPoseRequirement::named("O", PoseTiming::End)
            },
        ];

        let mut during = GestureDefinition::new("during", 0.4, 2.0);
        during.pose_sequence = vec![
            StaticPoseRequirement::named("point", PoseTiming::Any),
            StaticPoseRequirement {
                is_optional: true,
                ..StaticPoseRequirement::named("X", PoseTiming::Start)
            },
        ];

        let no_start = GestureDefinition::new("no_start", 0.4, 2.0);

        GestureCatalog::new(vec![compound, during, no_start]).expect("valid catalog")
    }

    fn joints() -> HandJoints {
        HandJoints::new([Point3::origin(); HAND_JOINT_COUNT], 0.0)
    }

    #[test]
    fn start_matches_by_name_and_alternative() {
        let catalog = catalog();
        let by_name = PoseObservation::observe(&catalog, Some("U"), None, None);
        let by_alt = PoseObservation::observe(&catalog, Some("H"), None, None);
        assert!(by_name.start_matches(0));
        assert!(by_alt.start_matches(0));
        assert!(!by_name.start_matches(1));
        assert!(!by_name.start_matches(2));
        assert!(by_name.pose_present);
    }

    #[test]
    fn any_timing_joins_every_group_and_optional_is_not_required() {
        let catalog = catalog();
        let observation = PoseObservation::observe(&catalog, Some("point"), None, None);
        assert!(observation.start_matches(1));
        assert!(observation.during_matches(1));
        assert!(observation.end_matches(1));

        let lost = PoseObservation::observe(&catalog, None, None, None);
        assert!(!lost.pose_present);
        assert!(!lost.during_matches(1));
        assert_eq!(lost.start_mask, 0);
    }

    #[test]
    fn shape_reference_takes_precedence_over_label() {
        let catalog = catalog();
        let joints = joints();
        let accept = |shape: &str, _: &HandJoints| shape == "snap";
        let reject = |_: &str, _: &HandJoints| false;

        let direct = PoseObservation::observe(&catalog, Some("U"), Some(&joints), Some(&accept));
        assert!(direct.end_matches(0));

        let vetoed = PoseObservation::observe(&catalog, Some("O"), Some(&joints), Some(&reject));
        assert!(!vetoed.end_matches(0));

        // Without joints the label is the only evidence.
        let by_label = PoseObservation::observe(&catalog, Some("O"), None, Some(&reject));
        assert!(by_label.end_matches(0));
    }

    #[test]
    fn fixed_pose_reports_its_label() {
        let mut adapter = FixedPose::none();
        assert_eq!(adapter.current_pose_name(), None);
        adapter.set(Some("B"));
        assert_eq!(adapter.current_pose_name(), Some("B"));
    }
}
