use std::{env, fs, path::PathBuf};

use gesture_catalog_compiler::{catalog_warnings, generate_from_path, parse_catalog_file};

fn main() {
    let manifest_dir =
        PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("missing CARGO_MANIFEST_DIR"));
    let catalog_path = manifest_dir.join("config/gestures.toml");

    println!("cargo:rerun-if-changed={}", catalog_path.display());

    let generated = generate_from_path(&catalog_path).unwrap_or_else(|e| {
        panic!(
            "gesture catalog compile failed for {}: {e}",
            catalog_path.display()
        )
    });

    if let Ok(catalog) = parse_catalog_file(&catalog_path) {
        for warning in catalog_warnings(&catalog) {
            println!("cargo:warning=gestures.toml: {warning}");
        }
    }

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("missing OUT_DIR"));
    let out_file = out_dir.join("builtin_catalog.rs");
    fs::write(&out_file, generated)
        .unwrap_or_else(|e| panic!("failed to write {}: {e}", out_file.display()));
}
