//! Runtime loading of custom catalogs with the build-time schema.

use std::path::Path;

use gesture_catalog_compiler::{
    catalog_warnings, parse_catalog_file, parse_catalog_str, validate_catalog, CatalogFile,
    GestureSpec, PoseSpec, PoseTimingSpec, ZoneTimingSpec,
};
use log::warn;
use nalgebra::{Point3, Vector3};

use super::{GestureCatalog, GestureDefinition, PoseTiming, StaticPoseRequirement, ZoneTiming};
use crate::error::CatalogError;

pub(super) fn from_toml_str(raw: &str) -> Result<GestureCatalog, CatalogError> {
    build(parse_catalog_str(raw)?)
}

pub(super) fn from_toml_path(path: &Path) -> Result<GestureCatalog, CatalogError> {
    build(parse_catalog_file(path)?)
}

fn build(file: CatalogFile) -> Result<GestureCatalog, CatalogError> {
    validate_catalog(&file)?;
    for warning in catalog_warnings(&file) {
        warn!("catalog: {warning}");
    }
    GestureCatalog::new(file.gestures.iter().map(definition_from_spec).collect())
}

fn pose_timing(spec: PoseTimingSpec) -> PoseTiming {
    match spec {
        PoseTimingSpec::Start => PoseTiming::Start,
        PoseTimingSpec::During => PoseTiming::During,
        PoseTimingSpec::End => PoseTiming::End,
        PoseTimingSpec::Any => PoseTiming::Any,
    }
}

fn zone_timing(spec: ZoneTimingSpec) -> ZoneTiming {
    match spec {
        ZoneTimingSpec::Start => ZoneTiming::Start,
        ZoneTimingSpec::During => ZoneTiming::During,
        ZoneTimingSpec::End => ZoneTiming::End,
    }
}

fn requirement_from_spec(pose: &PoseSpec) -> StaticPoseRequirement {
    StaticPoseRequirement {
        pose_name: pose.name.trim().to_string(),
        timing: pose_timing(pose.timing),
        is_optional: pose.optional,
        alternatives: pose
            .alternatives
            .iter()
            .map(|alt| alt.trim().to_string())
            .collect(),
        shape_ref: pose.shape_ref.as_deref().map(|s| s.trim().to_string()),
    }
}

fn definition_from_spec(spec: &GestureSpec) -> GestureDefinition {
    let direction = spec.primary_direction.unwrap_or([0.0; 3]);
    let mut definition = GestureDefinition {
        requires_movement: spec.requires_movement,
        requires_direction_change: spec.requires_direction_change,
        requires_rotation: spec.requires_rotation,
        requires_circular_motion: spec.requires_circular_motion,
        requires_spatial_zone: spec.requires_spatial_zone,
        primary_direction: Vector3::from(direction),
        direction_tolerance_deg: spec.direction_tolerance_deg,
        min_speed: spec.min_speed,
        min_distance: spec.min_distance,
        required_direction_changes: spec.required_direction_changes,
        min_rotation_deg: spec.min_rotation_deg,
        min_circularity: spec.min_circularity,
        pose_sequence: spec.poses.iter().map(requirement_from_spec).collect(),
        ..GestureDefinition::new(spec.name.trim(), spec.min_duration_s, spec.max_duration_s)
    };
    if let Some(zone) = &spec.zone {
        definition.zone_center = Point3::from(zone.center);
        definition.zone_radius = zone.radius;
        definition.zone_timing = zone_timing(zone.timing);
    }
    definition
}
