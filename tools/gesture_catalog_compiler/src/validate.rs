use std::collections::HashSet;

use crate::{schema::CatalogFile, CatalogCompilerError};

/// Per-tick pose matches are packed into `u64` masks by the engine.
pub const MAX_CATALOG_GESTURES: usize = 64;

fn invalid(msg: String) -> CatalogCompilerError {
    CatalogCompilerError::Validation(msg)
}

fn all_finite(values: &[f32]) -> bool {
    values.iter().all(|v| v.is_finite())
}

pub fn validate_catalog(catalog: &CatalogFile) -> Result<(), CatalogCompilerError> {
    if catalog.gestures.is_empty() {
        return Err(invalid(
            "catalog must define at least one [[gesture]]".to_string(),
        ));
    }
    if catalog.gestures.len() > MAX_CATALOG_GESTURES {
        return Err(invalid(format!(
            "catalog defines {} gestures, at most {MAX_CATALOG_GESTURES} are supported",
            catalog.gestures.len()
        )));
    }

    let mut names = HashSet::new();
    for (idx, gesture) in catalog.gestures.iter().enumerate() {
        let name = gesture.name.trim();
        if name.is_empty() {
            return Err(invalid(format!("gesture[{idx}].name must not be empty")));
        }
        if !names.insert(name) {
            return Err(invalid(format!("duplicate gesture name `{name}`")));
        }

        let mut numbers = vec![
            gesture.direction_tolerance_deg,
            gesture.min_speed,
            gesture.min_distance,
            gesture.min_duration_s,
            gesture.max_duration_s,
            gesture.min_rotation_deg,
            gesture.min_circularity,
        ];
        if let Some(direction) = gesture.primary_direction {
            numbers.extend(direction);
        }
        if let Some(zone) = &gesture.zone {
            numbers.extend(zone.center);
            numbers.push(zone.radius);
        }
        if !all_finite(&numbers) {
            return Err(invalid(format!("`{name}`: all numeric fields must be finite")));
        }

        if gesture.min_duration_s <= 0.0 {
            return Err(invalid(format!("`{name}`: min_duration_s must be > 0")));
        }
        if gesture.min_speed < 0.0 || gesture.min_distance < 0.0 {
            return Err(invalid(format!(
                "`{name}`: min_speed and min_distance must be >= 0"
            )));
        }
        if !(gesture.direction_tolerance_deg > 0.0 && gesture.direction_tolerance_deg <= 180.0) {
            return Err(invalid(format!(
                "`{name}`: direction_tolerance_deg must be in (0, 180]"
            )));
        }
        if let Some([x, y, z]) = gesture.primary_direction {
            if (x * x + y * y + z * z).sqrt() < 1e-6 {
                return Err(invalid(format!("`{name}`: primary_direction must be non-zero")));
            }
        }
        if gesture.requires_direction_change && gesture.required_direction_changes == 0 {
            return Err(invalid(format!(
                "`{name}`: required_direction_changes must be >= 1 when requires_direction_change is set"
            )));
        }
        if gesture.requires_circular_motion
            && !(gesture.min_circularity > 0.0 && gesture.min_circularity <= 1.0)
        {
            return Err(invalid(format!(
                "`{name}`: min_circularity must be in (0, 1] when requires_circular_motion is set"
            )));
        }
        if gesture.requires_rotation && gesture.min_rotation_deg <= 0.0 {
            return Err(invalid(format!(
                "`{name}`: min_rotation_deg must be > 0 when requires_rotation is set"
            )));
        }
        if gesture.requires_spatial_zone {
            match &gesture.zone {
                Some(zone) if zone.radius > 0.0 => {}
                Some(_) => {
                    return Err(invalid(format!("`{name}`: zone.radius must be > 0")));
                }
                None => {
                    return Err(invalid(format!(
                        "`{name}`: requires_spatial_zone needs a [gesture.zone] table"
                    )));
                }
            }
        }

        for (pose_idx, pose) in gesture.poses.iter().enumerate() {
            if pose.name.trim().is_empty() {
                return Err(invalid(format!(
                    "`{name}`: pose[{pose_idx}].name must not be empty"
                )));
            }
            if pose.alternatives.iter().any(|alt| alt.trim().is_empty()) {
                return Err(invalid(format!(
                    "`{name}`: pose[{pose_idx}].alternatives must not contain empty names"
                )));
            }
            if pose
                .shape_ref
                .as_deref()
                .is_some_and(|shape| shape.trim().is_empty())
            {
                return Err(invalid(format!(
                    "`{name}`: pose[{pose_idx}].shape_ref must not be empty"
                )));
            }
        }
    }

    Ok(())
}

/// Non-fatal findings; the runtime catalog corrects these on load.
pub fn catalog_warnings(catalog: &CatalogFile) -> Vec<String> {
    let mut warnings = Vec::new();
    for gesture in &catalog.gestures {
        if gesture.min_duration_s >= gesture.max_duration_s {
            warnings.push(format!(
                "`{}`: min_duration_s ({}) >= max_duration_s ({}), max will be raised on load",
                gesture.name, gesture.min_duration_s, gesture.max_duration_s
            ));
        }
        if gesture.requires_movement
            && gesture.primary_direction.is_none()
            && !(gesture.requires_circular_motion || gesture.requires_direction_change)
        {
            warnings.push(format!(
                "`{}`: requires_movement without primary_direction skips the direction check",
                gesture.name
            ));
        }
        if !gesture.poses.iter().any(|pose| {
            matches!(
                pose.timing,
                crate::PoseTimingSpec::Start | crate::PoseTimingSpec::Any
            )
        }) {
            warnings.push(format!(
                "`{}`: no start pose, the gesture can never be triggered",
                gesture.name
            ));
        }
    }
    warnings
}
