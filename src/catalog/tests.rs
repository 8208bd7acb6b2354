use super::*;

fn swipe(name: &str) -> GestureDefinition {
    GestureDefinition {
        requires_movement: true,
        primary_direction: Vector3::new(0.0, -2.0, 0.0),
        min_distance: 0.08,
        pose_sequence: vec![StaticPoseRequirement::named("B", PoseTiming::Start)],
        ..GestureDefinition::new(name, 0.4, 3.0)
    }
}

#[test]
fn builtin_catalog_loads() {
    let catalog = GestureCatalog::builtin().expect("builtin catalog should load");
    assert!(!catalog.is_empty());
    for gesture in catalog.iter() {
        assert!(gesture.min_duration_s < gesture.max_duration_s, "{}", gesture.name);
        assert!(
            gesture.requirements(PoseTiming::Start).next().is_some(),
            "{} has no start pose",
            gesture.name
        );
    }

    let no = catalog.find("no").expect("`no` should be built in");
    let end = no
        .requirements(PoseTiming::End)
        .next()
        .expect("`no` has an end requirement");
    assert_eq!(end.shape_ref.as_deref(), Some("finger_snap_closed"));
}

#[test]
fn primary_direction_is_normalized() {
    let catalog = GestureCatalog::new(vec![swipe("down")]).expect("valid catalog");
    let down = catalog.get(0).expect("one gesture");
    assert!((down.primary_direction - Vector3::new(0.0, -1.0, 0.0)).norm() < 1e-6);
    assert!(down.has_direction());
}

#[test]
fn inverted_durations_are_corrected() {
    let catalog = GestureCatalog::new(vec![GestureDefinition::new("slow", 2.0, 1.5)])
        .expect("inverted bounds are corrected, not rejected");
    let slow = catalog.find("slow").expect("gesture present");
    assert_eq!(slow.max_duration_s, 2.0 + DURATION_CORRECTION_S);

    let equal = GestureCatalog::new(vec![GestureDefinition::new("equal", 0.5, 0.5)])
        .expect("equal bounds are corrected");
    assert_eq!(equal.get(0).map(|g| g.max_duration_s), Some(1.5));
}

#[test]
fn duplicate_names_are_rejected() {
    let err = GestureCatalog::new(vec![swipe("down"), swipe("down")])
        .expect_err("duplicates must fail");
    assert!(matches!(err, CatalogError::DuplicateName(name) if name == "down"));
}

#[test]
fn non_positive_min_duration_is_rejected() {
    let err = GestureCatalog::new(vec![GestureDefinition::new("instant", 0.0, 1.0)])
        .expect_err("zero min duration must fail");
    assert!(matches!(err, CatalogError::InvalidDefinition { .. }));
}

#[test]
fn in_code_definitions_get_the_toml_range_checks() {
    let rejected = |definition: GestureDefinition, field: &str| {
        let err = GestureCatalog::new(vec![definition]).expect_err("definition must fail");
        assert!(
            matches!(&err, CatalogError::InvalidDefinition { reason, .. } if reason.contains(field)),
            "{err}"
        );
    };

    rejected(
        GestureDefinition {
            requires_spatial_zone: true,
            zone_radius: f32::NAN,
            ..swipe("nan_zone")
        },
        "finite",
    );
    rejected(
        GestureDefinition {
            direction_tolerance_deg: 0.0,
            ..swipe("no_tolerance")
        },
        "direction_tolerance_deg",
    );
    rejected(
        GestureDefinition {
            direction_tolerance_deg: 200.0,
            ..swipe("wide_tolerance")
        },
        "direction_tolerance_deg",
    );
    rejected(
        GestureDefinition {
            requires_direction_change: true,
            ..swipe("zigzag")
        },
        "required_direction_changes",
    );
    rejected(
        GestureDefinition {
            requires_circular_motion: true,
            min_circularity: 1.5,
            ..swipe("circle")
        },
        "min_circularity",
    );
    rejected(
        GestureDefinition {
            min_distance: -0.1,
            ..swipe("backwards")
        },
        "min_distance",
    );
}

#[test]
fn catalog_size_is_bounded() {
    let definitions = (0..=MAX_CATALOG_GESTURES)
        .map(|i| swipe(&format!("g{i}")))
        .collect();
    let err = GestureCatalog::new(definitions).expect_err("65 gestures must fail");
    assert!(matches!(err, CatalogError::TooManyGestures { count: 65, max: 64 }));
}

#[test]
fn toml_catalog_maps_every_field() {
    let raw = r#"
[[gesture]]
name = "circle"
requires_movement = true
requires_circular_motion = true
requires_spatial_zone = true
min_circularity = 0.7
min_duration_s = 1.0
max_duration_s = 0.5

[gesture.zone]
center = [0.0, 0.1, 0.0]
radius = 0.2
timing = "end"

[[gesture.pose]]
name = "C"
timing = "any"
alternatives = [" claw "]
"#;
    let catalog = GestureCatalog::from_toml_str(raw).expect("catalog should load");
    let circle = catalog.find("circle").expect("gesture present");

    assert!(circle.requires_circular_motion);
    assert_eq!(circle.min_circularity, 0.7);
    assert_eq!(circle.max_duration_s, 2.0);
    assert_eq!(circle.zone_timing, ZoneTiming::End);
    assert_eq!(circle.zone_center, Point3::new(0.0, 0.1, 0.0));
    assert!(!circle.has_direction());

    let pose = &circle.pose_sequence[0];
    assert_eq!(pose.timing, PoseTiming::Any);
    assert!(pose.accepts_name("claw"));
    assert!(pose.accepts_name("C"));
    assert!(!pose.accepts_name("O"));
    assert_eq!(circle.requirements(PoseTiming::Start).count(), 1);
    assert_eq!(circle.requirements(PoseTiming::End).count(), 1);
}

#[test]
fn toml_validation_errors_surface_as_load_errors() {
    let raw = r#"
[[gesture]]
name = "bad"
min_duration_s = -1.0
max_duration_s = 1.0
"#;
    let err = GestureCatalog::from_toml_str(raw).expect_err("negative duration must fail");
    assert!(matches!(err, CatalogError::Load(_)));
    assert!(err.to_string().contains("min_duration_s"));
}
