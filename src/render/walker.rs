use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::{FillError, Result};

pub const DEFAULT_TEMPLATE_SUFFIX: &str = ".tpl";

/// Templates found under a root, plus any errors hit while walking.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Template paths, each joined onto the walk root.
    pub templates: Vec<PathBuf>,
    pub errors: Vec<FillError>,
}

/// Recursively collect regular files under `root` whose name ends with `suffix`.
///
/// Paths matching any `exclude` glob (relative to `root`) are skipped.
/// Traversal errors do not stop the walk; they are returned in
/// [`Discovery::errors`].
pub fn discover_templates(root: &Path, suffix: &str, exclude: &[String]) -> Result<Discovery> {
    let exclude_set = build_glob_set(exclude)?;
    let mut discovery = Discovery::default();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(root = %root.display(), error = %e, "error while walking templates");
                discovery.errors.push(FillError::Discovery {
                    root: root.to_path_buf(),
                    source: e,
                });
                continue;
            }
        };

        if !entry.file_type().is_file() || !is_template_name(entry.file_name(), suffix) {
            continue;
        }

        let rel_path = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if exclude_set.is_match(rel_path) {
            continue;
        }

        discovery.templates.push(entry.into_path());
    }

    info!("found {} template files", discovery.templates.len());
    Ok(discovery)
}

fn is_template_name(file_name: &OsStr, suffix: &str) -> bool {
    let name = file_name.to_string_lossy();
    name.len() > suffix.len() && name.ends_with(suffix)
}

/// The rendered output path for a template: its own path without the suffix.
///
/// The suffix is stripped from the raw file name, so names that are not valid
/// UTF-8 keep their exact bytes.
pub fn destination_path(source: &Path, suffix: &str) -> PathBuf {
    match source.file_name().and_then(|name| strip_name_suffix(name, suffix)) {
        Some(stem) => source.with_file_name(stem),
        None => source.to_path_buf(),
    }
}

#[cfg(unix)]
fn strip_name_suffix(name: &OsStr, suffix: &str) -> Option<OsString> {
    use std::os::unix::ffi::OsStrExt;

    let stem = name.as_bytes().strip_suffix(suffix.as_bytes())?;
    (!stem.is_empty()).then(|| OsStr::from_bytes(stem).to_os_string())
}

#[cfg(not(unix))]
fn strip_name_suffix(name: &OsStr, suffix: &str) -> Option<OsString> {
    let stem = name.to_str()?.strip_suffix(suffix)?;
    (!stem.is_empty()).then(|| OsString::from(stem))
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| FillError::GlobPattern {
            pattern: pattern.clone(),
            source: e,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| FillError::GlobPattern {
        pattern: "<combined>".into(),
        source: e,
    })
}
