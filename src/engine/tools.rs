//! Input enumeration and directory utilities

use anyhow::{Context, Result};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::{CompletionRecord, Item, Opts};

/// Check if a file should be excluded based on OS-specific hidden files
pub fn is_os_hidden_file(path: &Path) -> bool {
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        match name {
            // macOS
            ".DS_Store" | ".AppleDouble" | ".LSOverride" => true,
            // Windows
            "Thumbs.db" | "ehthumbs.db" | "Desktop.ini" => true,
            // Linux
            ".directory" => true,
            _ => {
                // macOS resource fork files start with ._
                name.starts_with("._")
            }
        }
    } else {
        false
    }
}

/// True if the file name ends in `.<extension>` (case-sensitive, leading dot optional).
pub fn has_extension(name: &str, extension: &str) -> bool {
    let extension = extension.trim_start_matches('.');
    name.len() > extension.len() + 1
        && name
            .strip_suffix(extension)
            .is_some_and(|stem| stem.ends_with('.'))
}

/// Files directly under `source` ending in `.<extension>`, in directory listing order,
/// as items whose outputs go to `temp`. Unreadable entries are skipped with a warning.
pub fn list_items(source: &Path, temp: &Path, extension: &str) -> Result<Vec<Item>> {
    if !source.is_dir() {
        anyhow::bail!("source is not a directory: {}", source.display());
    }
    let mut items = Vec::new();
    let mut skipped = 0_usize;
    for entry in WalkDir::new(source)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Skipping unreadable entry: {}", err);
                skipped += 1;
                continue;
            }
        };
        if !entry.file_type().is_file() || is_os_hidden_file(entry.path()) {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            warn!("Skipping non UTF-8 file name: {}", entry.path().display());
            skipped += 1;
            continue;
        };
        if has_extension(name, extension) {
            items.push(Item::new(name, source, temp));
        }
    }
    if skipped > 0 {
        warn!("Skipped {} entries in {}", skipped, source.display());
    }
    debug!("Found {} .{} files in {}", items.len(), extension, source.display());
    Ok(items)
}

fn canonical_or_absolute(path: &Path) -> PathBuf {
    path.canonicalize()
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Create temp and destination directories. With `clean_temp`, remove leftover
/// `*.<extension>` files directly under temp so stale outputs are not packaged. Nothing else
/// in temp is touched. Refuses to clean when temp is the source directory itself.
pub fn prepare_dirs(opts: &Opts, source: &Path) -> Result<()> {
    if opts.clean_temp && opts.temp.is_dir() {
        let temp = canonical_or_absolute(&opts.temp);
        if canonical_or_absolute(source) == temp {
            anyhow::bail!(
                "temp directory {} is the source; refusing to clean it",
                opts.temp.display()
            );
        }
        let removed = remove_stale_outputs(&opts.temp, &opts.extension)?;
        debug!("Removed {} stale outputs from {}", removed, opts.temp.display());
    }
    std::fs::create_dir_all(&opts.temp)
        .with_context(|| format!("create temp directory {}", opts.temp.display()))?;
    std::fs::create_dir_all(&opts.destination)
        .with_context(|| format!("create destination {}", opts.destination.display()))?;
    Ok(())
}

/// Delete regular files directly under `temp` ending in `.<extension>`. Returns how many.
fn remove_stale_outputs(temp: &Path, extension: &str) -> Result<usize> {
    let mut removed = 0_usize;
    let entries = std::fs::read_dir(temp)
        .with_context(|| format!("read temp directory {}", temp.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("read temp directory {}", temp.display()))?;
        if !entry.file_type().is_ok_and(|t| t.is_file()) {
            continue;
        }
        let matches = entry
            .file_name()
            .to_str()
            .is_some_and(|name| has_extension(name, extension));
        if matches {
            std::fs::remove_file(entry.path())
                .with_context(|| format!("remove stale output {}", entry.path().display()))?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Delete partial outputs left by failed items so the packager only sees finished files.
pub fn remove_failed_outputs(records: &[CompletionRecord]) {
    for record in records.iter().filter(|r| !r.is_success()) {
        let path = &record.item.destination;
        if path.exists() {
            match std::fs::remove_file(path) {
                Ok(()) => debug!("{}: removed partial output", record.item.id),
                Err(e) => warn!("{}: could not remove partial output: {}", record.item.id, e),
            }
        }
    }
}
