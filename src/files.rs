//! PHP file discovery.
//!
//! Provides workspace file collection for `check` and `fix`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

use vylint_core::error::VylintError;
use vylint_core::output::SkippedFile;

/// Directory names never descended into.
const EXCLUDED_DIRS: [&str; 3] = ["vendor", "node_modules", "target"];

// ============================================================================
// Error Types
// ============================================================================

/// Error type for file operations.
#[derive(Debug, Error)]
pub enum FileError {
    /// A requested path does not exist.
    #[error("file not found: {path}")]
    NotFound { path: String },

    /// Reading a file or directory failed.
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Result type for file operations.
pub type FileResult<T> = Result<T, FileError>;

impl From<FileError> for VylintError {
    fn from(err: FileError) -> Self {
        match err {
            FileError::NotFound { path } => VylintError::file_not_found(path),
            other => VylintError::internal(other.to_string()),
        }
    }
}

// ============================================================================
// File Collection
// ============================================================================

/// A PHP file read from the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to the workspace root, with `/` separators.
    pub rel_path: String,
    /// Path on disk.
    pub path: PathBuf,
    pub content: String,
}

/// PHP files read from the workspace, plus the ones that could not be used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectedFiles {
    /// Sorted by relative path.
    pub files: Vec<SourceFile>,
    /// Files whose content is not UTF-8 text.
    pub skipped: Vec<SkippedFile>,
}

/// Collect PHP files under `paths` (relative to `workspace_root`), or the
/// whole workspace when `paths` is empty.
///
/// Directories are walked for `*.php`, skipping hidden directories and
/// dependency folders. Files named explicitly are taken as they are.
/// The result is sorted by relative path and free of duplicates. A file that
/// is not valid UTF-8 is skipped with a warning instead of failing the run.
pub fn collect_php_files(workspace_root: &Path, paths: &[PathBuf]) -> FileResult<CollectedFiles> {
    let roots: Vec<PathBuf> = if paths.is_empty() {
        vec![workspace_root.to_path_buf()]
    } else {
        paths.iter().map(|p| workspace_root.join(p)).collect()
    };

    let mut found: Vec<PathBuf> = Vec::new();
    for root in &roots {
        if root.is_file() {
            found.push(root.clone());
        } else if root.is_dir() {
            walk_php_files(root, &mut found)?;
        } else {
            return Err(FileError::NotFound {
                path: root.display().to_string(),
            });
        }
    }

    let mut found: Vec<(String, PathBuf)> = found
        .into_iter()
        .map(|path| (relative_path(workspace_root, &path), path))
        .collect();
    found.sort_by(|a, b| a.0.cmp(&b.0));
    found.dedup_by(|a, b| a.0 == b.0);

    let mut collected = CollectedFiles::default();
    for (rel_path, path) in found {
        let bytes = fs::read(&path).map_err(|source| FileError::Io {
            path: rel_path.clone(),
            source,
        })?;
        match String::from_utf8(bytes) {
            Ok(content) => collected.files.push(SourceFile {
                rel_path,
                path,
                content,
            }),
            Err(_) => {
                warn!("Skipping {}: not valid UTF-8", rel_path);
                collected.skipped.push(SkippedFile {
                    path: rel_path,
                    reason: "not valid UTF-8".to_string(),
                });
            }
        }
    }

    debug!(
        count = collected.files.len(),
        skipped = collected.skipped.len(),
        "collected php files"
    );
    Ok(collected)
}

fn walk_php_files(root: &Path, found: &mut Vec<PathBuf>) -> FileResult<()> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_excluded(entry.file_name()));

    for entry in walker {
        let entry = entry.map_err(|e| FileError::Io {
            path: e
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| root.display().to_string()),
            source: e.into(),
        })?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "php") {
            found.push(path.to_path_buf());
        }
    }
    Ok(())
}

fn is_excluded(name: &std::ffi::OsStr) -> bool {
    let name = name.to_string_lossy();
    name.starts_with('.') || EXCLUDED_DIRS.contains(&name.as_ref())
}

fn relative_path(workspace_root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(workspace_root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
