use std::path::{Path, PathBuf};

use crate::foundation::error::{TypewaveError, TypewaveResult};

const FONT_EXTENSIONS: &[&str] = &["ttf", "otf"];
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];
const PORTRAIT_HINTS: &[&str] = &["portrait", "char"];

fn has_extension(path: &Path, exts: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| exts.iter().any(|x| e.eq_ignore_ascii_case(x)))
}

/// Files in `dir` with one of `exts`, sorted by name. Unreadable directories yield nothing.
fn files_with_extensions(dir: &Path, exts: &[&str]) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "asset directory not readable");
            return Vec::new();
        }
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && has_extension(p, exts))
        .collect();
    files.sort();
    files
}

/// The font to load: the configured file if it exists, else the first font in `asset_dir`.
///
/// No usable font is fatal.
pub fn resolve_font(
    configured: Option<&Path>,
    asset_dir: &Path,
    auto_discover: bool,
) -> TypewaveResult<PathBuf> {
    if let Some(path) = configured {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        if !auto_discover {
            return Err(TypewaveError::missing_asset(format!(
                "font '{}' not found",
                path.display()
            )));
        }
        tracing::warn!(font = %path.display(), "configured font not found, searching asset directory");
    } else if !auto_discover {
        return Err(TypewaveError::missing_asset(
            "no font configured and asset discovery is disabled",
        ));
    }

    files_with_extensions(asset_dir, FONT_EXTENSIONS)
        .into_iter()
        .next()
        .ok_or_else(|| {
            TypewaveError::missing_asset(format!(
                "no .ttf/.otf font found in '{}'",
                asset_dir.display()
            ))
        })
}

/// The portrait to draw, if any; never fails.
///
/// Discovery prefers images whose name mentions `portrait` or `char`, else the first image.
/// Paths in `exclude` (the output file, the background image) are never picked.
pub fn resolve_portrait(
    configured: Option<&Path>,
    asset_dir: &Path,
    auto_discover: bool,
    exclude: &[&Path],
) -> Option<PathBuf> {
    if let Some(path) = configured {
        if path.is_file() {
            return Some(path.to_path_buf());
        }
        tracing::warn!(portrait = %path.display(), "configured portrait not found");
    }
    if !auto_discover {
        return None;
    }

    let candidates: Vec<PathBuf> = files_with_extensions(asset_dir, IMAGE_EXTENSIONS)
        .into_iter()
        .filter(|p| !exclude.iter().any(|x| same_file_name(p, x)))
        .collect();

    let hinted = candidates.iter().find(|p| {
        p.file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.to_ascii_lowercase())
            .is_some_and(|n| PORTRAIT_HINTS.iter().any(|h| n.contains(h)))
    });
    hinted.or_else(|| candidates.first()).cloned()
}

fn same_file_name(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a.file_name().is_some() && a.file_name() == b.file_name(),
    }
}
