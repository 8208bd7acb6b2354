use std::fmt::Write as _;

use crate::schema::{CatalogFile, GestureSpec, PoseSpec, ZoneTimingSpec};

fn float(value: f32) -> String {
    format!("{value:?}")
}

fn vector(values: [f32; 3]) -> String {
    format!(
        "{}, {}, {}",
        float(values[0]),
        float(values[1]),
        float(values[2])
    )
}

fn render_pose(out: &mut String, pose: &PoseSpec) {
    let alternatives = pose
        .alternatives
        .iter()
        .map(|alt| format!("{:?}.to_string()", alt.trim()))
        .collect::<Vec<_>>()
        .join(", ");
    let shape_ref = match pose.shape_ref.as_deref() {
        Some(shape) => format!("Some({:?}.to_string())", shape.trim()),
        None => "None".to_string(),
    };

    let _ = writeln!(out, "                StaticPoseRequirement {{");
    let _ = writeln!(out, "                    pose_name: {:?}.to_string(),", pose.name.trim());
    let _ = writeln!(out, "                    timing: {},", pose.timing.rust_variant());
    let _ = writeln!(out, "                    is_optional: {},", pose.optional);
    let _ = writeln!(out, "                    alternatives: vec![{alternatives}],");
    let _ = writeln!(out, "                    shape_ref: {shape_ref},");
    let _ = writeln!(out, "                }},");
}

fn render_gesture(out: &mut String, gesture: &GestureSpec) {
    let direction = gesture.primary_direction.unwrap_or([0.0; 3]);
    let (zone_center, zone_radius, zone_timing) = match &gesture.zone {
        Some(zone) => (zone.center, zone.radius, zone.timing),
        None => ([0.0; 3], 0.0, ZoneTimingSpec::default()),
    };

    let _ = writeln!(out, "        GestureDefinition {{");
    let _ = writeln!(out, "            name: {:?}.into(),", gesture.name.trim());
    let _ = writeln!(out, "            requires_movement: {},", gesture.requires_movement);
    let _ = writeln!(
        out,
        "            requires_direction_change: {},",
        gesture.requires_direction_change
    );
    let _ = writeln!(out, "            requires_rotation: {},", gesture.requires_rotation);
    let _ = writeln!(
        out,
        "            requires_circular_motion: {},",
        gesture.requires_circular_motion
    );
    let _ = writeln!(
        out,
        "            requires_spatial_zone: {},",
        gesture.requires_spatial_zone
    );
    let _ = writeln!(
        out,
        "            primary_direction: Vector3::new({}),",
        vector(direction)
    );
    let _ = writeln!(
        out,
        "            direction_tolerance_deg: {},",
        float(gesture.direction_tolerance_deg)
    );
    let _ = writeln!(out, "            min_speed: {},", float(gesture.min_speed));
    let _ = writeln!(out, "            min_distance: {},", float(gesture.min_distance));
    let _ = writeln!(out, "            min_duration_s: {},", float(gesture.min_duration_s));
    let _ = writeln!(out, "            max_duration_s: {},", float(gesture.max_duration_s));
    let _ = writeln!(
        out,
        "            required_direction_changes: {},",
        gesture.required_direction_changes
    );
    let _ = writeln!(
        out,
        "            min_rotation_deg: {},",
        float(gesture.min_rotation_deg)
    );
    let _ = writeln!(
        out,
        "            min_circularity: {},",
        float(gesture.min_circularity)
    );
    let _ = writeln!(
        out,
        "            zone_center: Point3::new({}),",
        vector(zone_center)
    );
    let _ = writeln!(out, "            zone_radius: {},", float(zone_radius));
    let _ = writeln!(out, "            zone_timing: {},", zone_timing.rust_variant());
    if gesture.poses.is_empty() {
        let _ = writeln!(out, "            pose_sequence: Vec::new(),");
    } else {
        let _ = writeln!(out, "            pose_sequence: vec![");
        for pose in &gesture.poses {
            render_pose(out, pose);
        }
        let _ = writeln!(out, "            ],");
    }
    let _ = writeln!(out, "        }},");
}

/// Renders `builtin_definitions()` for `include!` from the catalog module.
pub fn render_generated_catalog(catalog: &CatalogFile) -> String {
    let mut out = String::new();
    out.push_str("// @generated by gesture_catalog_compiler. Do not edit.\n");
    out.push_str("pub(crate) fn builtin_definitions() -> Vec<GestureDefinition> {\n");
    out.push_str("    vec![\n");
    for gesture in &catalog.gestures {
        render_gesture(&mut out, gesture);
    }
    out.push_str("    ]\n");
    out.push_str("}\n");
    out
}
