use std::{fs, path::Path};

use anyhow::{Context, Result};
use gesture_catalog_compiler::{catalog_warnings, parse_catalog_str, validate_catalog};
use signmotion::{GestureCatalog, GestureDefinition};

use crate::logging::Logger;

pub fn run_catalog(logger: &mut Logger, path: &Path) -> Result<()> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file = parse_catalog_str(&raw)?;
    validate_catalog(&file)?;
    for warning in catalog_warnings(&file) {
        logger.warn(format!("warning: {warning}"));
    }

    let catalog = GestureCatalog::from_toml_str(&raw)?;
    println!("gesture,name,min_s,max_s,constraints,poses");
    for definition in catalog.iter() {
        println!(
            "gesture,{},{:.2},{:.2},{},{}",
            definition.name,
            definition.min_duration_s,
            definition.max_duration_s,
            constraints(definition).join("+"),
            definition.pose_sequence.len()
        );
    }
    logger.info(format!("{}: {} gestures ok", path.display(), catalog.len()));
    Ok(())
}

pub fn constraints(definition: &GestureDefinition) -> Vec<&'static str> {
    [
        (definition.requires_movement, "movement"),
        (definition.has_direction(), "direction"),
        (definition.requires_direction_change, "direction_change"),
        (definition.requires_rotation, "rotation"),
        (definition.requires_circular_motion, "circular"),
        (definition.requires_spatial_zone, "zone"),
    ]
    .into_iter()
    .filter_map(|(enabled, label)| enabled.then_some(label))
    .collect()
}
