//! Schema, validation and code generation for declarative gesture catalogs.
//!
//! A catalog is a TOML file with one `[[gesture]]` table per dynamic gesture
//! and nested `[[gesture.pose]]` tables for its static-pose requirements.
//! `build.rs` turns the built-in catalog into Rust source; hosts can parse
//! custom catalogs at runtime with the same schema.

use std::{fs, path::Path};

mod render;
mod schema;
mod validate;

pub use render::render_generated_catalog;
pub use schema::{
    CatalogFile, GestureSpec, PoseSpec, PoseTimingSpec, ZoneSpec, ZoneTimingSpec,
    DEFAULT_DIRECTION_TOLERANCE_DEG,
};
pub use validate::{catalog_warnings, validate_catalog, MAX_CATALOG_GESTURES};

#[derive(Debug, thiserror::Error)]
pub enum CatalogCompilerError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("catalog parse error: {0}")]
    Parse(String),
    #[error("catalog validation error: {0}")]
    Validation(String),
}

pub fn parse_catalog_str(raw: &str) -> Result<CatalogFile, CatalogCompilerError> {
    toml::from_str(raw).map_err(|e| CatalogCompilerError::Parse(e.to_string()))
}

pub fn parse_catalog_file(path: &Path) -> Result<CatalogFile, CatalogCompilerError> {
    let raw = fs::read_to_string(path).map_err(|source| CatalogCompilerError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_catalog_str(&raw)
}

/// Parses, validates and renders a catalog file in one step.
pub fn generate_from_path(path: &Path) -> Result<String, CatalogCompilerError> {
    let catalog = parse_catalog_file(path)?;
    validate_catalog(&catalog)?;
    Ok(render_generated_catalog(&catalog))
}
