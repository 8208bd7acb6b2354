//! Immutable gesture definitions and the catalog that holds them.

use std::{collections::HashSet, path::Path};

use log::warn;
use nalgebra::{Point3, Vector3};
use serde::Serialize;

use crate::{
    error::CatalogError,
    types::{Direction, GestureName, Position},
};

mod builtin;
mod load;

pub use gesture_catalog_compiler::MAX_CATALOG_GESTURES;

/// Span added to `min_duration_s` when a definition arrives with
/// `min_duration_s >= max_duration_s`.
pub const DURATION_CORRECTION_S: f32 = 1.0;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum PoseTiming {
    Start,
    During,
    End,
    Any,
}

impl PoseTiming {
    pub fn applies_to(self, phase: PoseTiming) -> bool {
        self == phase || self == PoseTiming::Any
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub enum ZoneTiming {
    Start,
    #[default]
    During,
    End,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StaticPoseRequirement {
    pub pose_name: String,
    pub timing: PoseTiming,
    pub is_optional: bool,
    /// Pose family: other adapter labels accepted in place of `pose_name`.
    pub alternatives: Vec<String>,
    /// Key of a shape detector evaluated directly against raw joints.
    pub shape_ref: Option<String>,
}

impl StaticPoseRequirement {
    pub fn named(pose_name: &str, timing: PoseTiming) -> Self {
        Self {
            pose_name: pose_name.to_string(),
            timing,
            is_optional: false,
            alternatives: Vec::new(),
            shape_ref: None,
        }
    }

    pub fn accepts_name(&self, pose: &str) -> bool {
        self.pose_name == pose || self.alternatives.iter().any(|alt| alt == pose)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GestureDefinition {
    pub name: GestureName,
    pub requires_movement: bool,
    pub requires_direction_change: bool,
    pub requires_rotation: bool,
    pub requires_circular_motion: bool,
    pub requires_spatial_zone: bool,
    /// Unit vector, or zero when the gesture has no preferred direction.
    pub primary_direction: Direction,
    pub direction_tolerance_deg: f32,
    pub min_speed: f32,
    pub min_distance: f32,
    pub min_duration_s: f32,
    pub max_duration_s: f32,
    pub required_direction_changes: u32,
    pub min_rotation_deg: f32,
    pub min_circularity: f32,
    /// Relative to the per-tick anchor when the host supplies one.
    pub zone_center: Position,
    pub zone_radius: f32,
    pub zone_timing: ZoneTiming,
    pub pose_sequence: Vec<StaticPoseRequirement>,
}

impl GestureDefinition {
    /// A definition with no movement constraints; fill in what the gesture needs.
    pub fn new(name: &str, min_duration_s: f32, max_duration_s: f32) -> Self {
        Self {
            name: name.into(),
            requires_movement: false,
            requires_direction_change: false,
            requires_rotation: false,
            requires_circular_motion: false,
            requires_spatial_zone: false,
            primary_direction: Vector3::zeros(),
            direction_tolerance_deg: 45.0,
            min_speed: 0.0,
            min_distance: 0.0,
            min_duration_s,
            max_duration_s,
            required_direction_changes: 0,
            min_rotation_deg: 0.0,
            min_circularity: 0.0,
            zone_center: Point3::origin(),
            zone_radius: 0.0,
            zone_timing: ZoneTiming::default(),
            pose_sequence: Vec::new(),
        }
    }

    pub fn has_direction(&self) -> bool {
        self.primary_direction.norm() > 1e-6
    }

    pub fn requirements(&self, phase: PoseTiming) -> impl Iterator<Item = &StaticPoseRequirement> {
        self.pose_sequence
            .iter()
            .filter(move |req| req.timing.applies_to(phase))
    }

    fn normalize(&mut self) -> Result<(), CatalogError> {
        let invalid = |reason: &str| CatalogError::InvalidDefinition {
            gesture: self.name.to_string(),
            reason: reason.to_string(),
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name must not be empty"));
        }
        if !(self.min_duration_s.is_finite() && self.min_duration_s > 0.0) {
            return Err(invalid("min_duration_s must be > 0"));
        }
        if !self.max_duration_s.is_finite() || self.min_duration_s >= self.max_duration_s {
            let corrected = self.min_duration_s + DURATION_CORRECTION_S;
            warn!(
                "catalog: `{}` min_duration_s={} >= max_duration_s={}, using max_duration_s={}",
                self.name, self.min_duration_s, self.max_duration_s, corrected
            );
            self.max_duration_s = corrected;
        }

        let finite = [
            self.direction_tolerance_deg,
            self.min_speed,
            self.min_distance,
            self.min_rotation_deg,
            self.min_circularity,
            self.zone_radius,
        ]
        .into_iter()
        .chain(self.primary_direction.iter().copied())
        .chain(self.zone_center.coords.iter().copied())
        .all(f32::is_finite);
        if !finite {
            return Err(invalid("all numeric fields must be finite"));
        }
        if self.min_speed < 0.0 || self.min_distance < 0.0 {
            return Err(invalid("min_speed and min_distance must be >= 0"));
        }
        if !(self.direction_tolerance_deg > 0.0 && self.direction_tolerance_deg <= 180.0) {
            return Err(invalid("direction_tolerance_deg must be in (0, 180]"));
        }
        if self.requires_direction_change && self.required_direction_changes == 0 {
            return Err(invalid(
                "required_direction_changes must be >= 1 when direction changes are required",
            ));
        }
        if self.requires_circular_motion
            && !(self.min_circularity > 0.0 && self.min_circularity <= 1.0)
        {
            return Err(invalid("min_circularity must be in (0, 1] for circular motion"));
        }
        if self.requires_rotation && self.min_rotation_deg <= 0.0 {
            return Err(invalid("min_rotation_deg must be > 0 when rotation is required"));
        }
        if self.requires_spatial_zone && self.zone_radius <= 0.0 {
            return Err(invalid("zone_radius must be > 0 when a spatial zone is required"));
        }

        let norm = self.primary_direction.norm();
        self.primary_direction = if norm > 1e-6 {
            self.primary_direction / norm
        } else {
            Vector3::zeros()
        };
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GestureCatalog {
    gestures: Vec<GestureDefinition>,
}

impl GestureCatalog {
    /// Validates the definitions and corrects inverted duration bounds.
    pub fn new(definitions: Vec<GestureDefinition>) -> Result<Self, CatalogError> {
        if definitions.len() > MAX_CATALOG_GESTURES {
            return Err(CatalogError::TooManyGestures {
                count: definitions.len(),
                max: MAX_CATALOG_GESTURES,
            });
        }

        let mut seen = HashSet::new();
        let mut gestures = Vec::with_capacity(definitions.len());
        for mut definition in definitions {
            definition.normalize()?;
            if !seen.insert(definition.name.clone()) {
                return Err(CatalogError::DuplicateName(definition.name.to_string()));
            }
            gestures.push(definition);
        }
        Ok(Self { gestures })
    }

    /// The catalog compiled from `config/gestures.toml`.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::new(builtin::builtin_definitions())
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, CatalogError> {
        load::from_toml_str(raw)
    }

    pub fn from_toml_path(path: &Path) -> Result<Self, CatalogError> {
        load::from_toml_path(path)
    }

    pub fn len(&self) -> usize {
        self.gestures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gestures.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&GestureDefinition> {
        self.gestures.get(index)
    }

    pub fn find(&self, name: &str) -> Option<&GestureDefinition> {
        self.gestures.iter().find(|g| &*g.name == name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.gestures.iter().position(|g| &*g.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GestureDefinition> {
        self.gestures.iter()
    }
}

#[cfg(test)]
mod tests;
