//! Tool locations from the environment: env var → `.env` in the working directory.

use log::debug;
use std::path::{Path, PathBuf};

use crate::utils::config::PackagePaths;

fn non_empty_var(name: &str) -> Option<String> {
    let s = std::env::var(name).ok()?;
    let s = s.trim().to_string();
    (!s.is_empty()).then_some(s)
}

/// Read `<PKG>_<KEY>` from the environment, falling back to a `.env` file in `dir`.
pub fn env_override(dir: &Path, key: &str) -> Option<String> {
    let name = PackagePaths::get().env_var(key);
    if let Some(s) = non_empty_var(&name) {
        debug!("{} set in environment", name);
        return Some(s);
    }
    let env_path = dir.join(".env");
    if env_path.is_file() {
        let _ = dotenvy::from_path(&env_path);
        if let Some(s) = non_empty_var(&name) {
            debug!("{} loaded from {}", name, env_path.display());
            return Some(s);
        }
    }
    None
}

/// External vector tool override (`STROKES2FONT_INKSCAPE`).
pub fn inkscape_override(dir: &Path) -> Option<PathBuf> {
    env_override(dir, "inkscape").map(PathBuf::from)
}

/// Font packager override (`STROKES2FONT_PACKAGER`).
pub fn packager_override(dir: &Path) -> Option<PathBuf> {
    env_override(dir, "packager").map(PathBuf::from)
}
