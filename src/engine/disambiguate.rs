//! Priority cascade that picks one gesture out of several pending candidates.

use crate::{
    catalog::{GestureCatalog, GestureDefinition},
    trajectory::{angle_deg, TrajectoryTracker},
};

use super::config::CascadeConfig;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CascadeRule {
    Circular,
    Rotation,
    DirectionChanges,
    ClosestDirection,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Resolution {
    pub index: usize,
    pub rule: CascadeRule,
}

fn direction_matches(definition: &GestureDefinition, tracker: &TrajectoryTracker) -> bool {
    !definition.has_direction()
        || tracker.is_moving_in_direction(
            &definition.primary_direction,
            definition.direction_tolerance_deg,
        )
}

fn defined<'a>(
    catalog: &'a GestureCatalog,
    candidates: &'a [usize],
) -> impl Iterator<Item = (usize, &'a GestureDefinition)> + 'a {
    candidates
        .iter()
        .filter_map(move |&idx| catalog.get(idx).map(|definition| (idx, definition)))
}

fn resolution(
    rule: CascadeRule,
    found: Option<(usize, &GestureDefinition)>,
) -> Option<Resolution> {
    found.map(|(index, _)| Resolution { index, rule })
}

/// First rule that matches wins; within a rule, catalog order breaks ties.
pub fn resolve(
    catalog: &GestureCatalog,
    candidates: &[usize],
    tracker: &TrajectoryTracker,
    cascade: &CascadeConfig,
) -> Option<Resolution> {
    let circular = defined(catalog, candidates).find(|(_, d)| d.requires_circular_motion);
    if circular.is_some() && tracker.circularity_score() > cascade.min_circularity {
        return resolution(CascadeRule::Circular, circular);
    }

    if tracker.total_rotation_degrees() > cascade.min_rotation_deg {
        let rotating = defined(catalog, candidates).find(|(_, d)| d.requires_rotation);
        if rotating.is_some() {
            return resolution(CascadeRule::Rotation, rotating);
        }
    }

    if tracker.direction_changes() > 0 {
        let zigzag = defined(catalog, candidates)
            .find(|(_, d)| d.requires_direction_change && direction_matches(d, tracker));
        if zigzag.is_some() {
            return resolution(CascadeRule::DirectionChanges, zigzag);
        }
    }

    let average = tracker.average_direction();
    if average.norm() < 1e-6 {
        return None;
    }
    let mut best: Option<(usize, f32)> = None;
    for (idx, definition) in defined(catalog, candidates).filter(|(_, d)| d.has_direction()) {
        let angle = angle_deg(&average, &definition.primary_direction);
        if angle > definition.direction_tolerance_deg {
            continue;
        }
        if best.is_none_or(|(_, best_angle)| angle < best_angle) {
            best = Some((idx, angle));
        }
    }
    best.map(|(index, _)| Resolution {
        index,
        rule: CascadeRule::ClosestDirection,
    })
}

#[cfg(test)]
mod tests;
