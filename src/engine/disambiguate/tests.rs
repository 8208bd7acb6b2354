use core::f32::consts::TAU;

use nalgebra::{Point3, UnitQuaternion, Vector3};

use super::*;
use crate::{
    catalog::{PoseTiming, StaticPoseRequirement},
    engine::EngineConfig,
};

fn gesture(name: &str) -> GestureDefinition {
    GestureDefinition {
        requires_movement: true,
        pose_sequence: vec![StaticPoseRequirement::named("B", PoseTiming::Start)],
        ..GestureDefinition::new(name, 0.5, 3.0)
    }
}

fn linear(name: &str, direction: Vector3<f32>) -> GestureDefinition {
    GestureDefinition {
        primary_direction: direction,
        direction_tolerance_deg: 45.0,
        ..gesture(name)
    }
}

fn circular(name: &str) -> GestureDefinition {
    GestureDefinition {
        requires_circular_motion: true,
        min_circularity: 0.6,
        ..gesture(name)
    }
}

fn cascade() -> CascadeConfig {
    EngineConfig::default().cascade
}

fn circle_tracker() -> TrajectoryTracker {
    let mut tracker = TrajectoryTracker::default();
    for i in 0..48 {
        let angle = TAU * i as f32 / 48.0;
        tracker.update(
            Point3::new(0.05 * angle.cos(), 0.05 * angle.sin(), 0.0),
            UnitQuaternion::identity(),
            i as f64 / 60.0,
        );
    }
    tracker
}

fn line_tracker(step: Vector3<f32>, count: usize) -> TrajectoryTracker {
    let mut tracker = TrajectoryTracker::default();
    let mut position = Point3::origin();
    for i in 0..count {
        tracker.update(position, UnitQuaternion::identity(), i as f64 / 60.0);
        position += step;
    }
    tracker
}

#[test]
fn circular_candidate_wins_over_coincidental_direction_match() {
    let tracker = circle_tracker();
    let heading = tracker.average_direction();
    assert!(heading.norm() > 0.5);
    assert!(tracker.circularity_score() > 0.15);

    // Linear candidate listed first and pointing exactly where the hand goes.
    let catalog = GestureCatalog::new(vec![linear("swipe", heading), circular("circle")])
        .expect("valid catalog");
    let resolved = resolve(&catalog, &[0, 1], &tracker, &cascade()).expect("resolves");

    assert_eq!(resolved.index, 1);
    assert_eq!(resolved.rule, CascadeRule::Circular);
}

#[test]
fn short_motion_falls_through_to_direction() {
    // Too few samples for a circularity score.
    let tracker = line_tracker(Vector3::new(0.0, -0.004, 0.0), 8);
    assert_eq!(tracker.circularity_score(), 0.0);

    let catalog = GestureCatalog::new(vec![
        circular("circle"),
        linear("down", Vector3::new(0.0, -1.0, 0.0)),
    ])
    .expect("valid catalog");
    let resolved = resolve(&catalog, &[0, 1], &tracker, &cascade()).expect("resolves");

    assert_eq!(resolved.index, 1);
    assert_eq!(resolved.rule, CascadeRule::ClosestDirection);
}

#[test]
fn rotation_outranks_direction() {
    let mut tracker = TrajectoryTracker::default();
    let axis = Vector3::z_axis();
    for i in 0..10 {
        tracker.update(
            Point3::new(0.0, -0.004 * i as f32, 0.0),
            UnitQuaternion::from_axis_angle(&axis, (2.0 * i as f32).to_radians()),
            i as f64 / 60.0,
        );
    }
    assert!(tracker.total_rotation_degrees() > 8.0);

    let twist = GestureDefinition {
        requires_rotation: true,
        min_rotation_deg: 20.0,
        ..gesture("twist")
    };
    let catalog = GestureCatalog::new(vec![linear("down", Vector3::new(0.0, -1.0, 0.0)), twist])
        .expect("valid catalog");
    let resolved = resolve(&catalog, &[0, 1], &tracker, &cascade()).expect("resolves");

    assert_eq!(resolved.index, 1);
    assert_eq!(resolved.rule, CascadeRule::Rotation);
}

#[test]
fn direction_changes_rule_needs_a_change() {
    let zigzag = GestureDefinition {
        requires_direction_change: true,
        required_direction_changes: 2,
        ..gesture("zigzag")
    };
    let catalog = GestureCatalog::new(vec![linear("right", Vector3::new(1.0, 0.0, 0.0)), zigzag])
        .expect("valid catalog");

    let straight = line_tracker(Vector3::new(0.004, 0.0, 0.0), 20);
    let resolved = resolve(&catalog, &[0, 1], &straight, &cascade()).expect("resolves");
    assert_eq!(resolved.index, 0);

    let mut turned = TrajectoryTracker::default();
    for (i, (x, y)) in [(0.0, 0.0), (0.02, 0.0), (0.04, 0.0), (0.06, -0.02), (0.08, -0.02)]
        .iter()
        .enumerate()
    {
        turned.update(Point3::new(*x, *y, 0.0), UnitQuaternion::identity(), i as f64 / 30.0);
    }
    assert!(turned.direction_changes() > 0);
    let resolved = resolve(&catalog, &[0, 1], &turned, &cascade()).expect("resolves");
    assert_eq!(resolved.index, 1);
    assert_eq!(resolved.rule, CascadeRule::DirectionChanges);
}

#[test]
fn closest_direction_wins_and_out_of_tolerance_stays_pending() {
    let tracker = line_tracker(Vector3::new(0.0, -0.004, 0.0), 20);
    let catalog = GestureCatalog::new(vec![
        linear("down_right", Vector3::new(1.0, -1.2, 0.0)),
        linear("down", Vector3::new(0.0, -1.0, 0.0)),
        linear("up", Vector3::new(0.0, 1.0, 0.0)),
    ])
    .expect("valid catalog");

    let resolved = resolve(&catalog, &[0, 1, 2], &tracker, &cascade()).expect("resolves");
    assert_eq!(resolved.index, 1);

    assert_eq!(resolve(&catalog, &[2], &tracker, &cascade()), None);
}
