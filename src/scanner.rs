//! Repository scanner for discovering indexable files
//!
//! The scanner walks a root directory, applies the ignore policy (hidden
//! and version-control directories, dependency directories, unknown or
//! binary extensions, a maximum file size) and produces decoded
//! [`FileRecord`]s for the snapshot build pipeline. Each scan is
//! independent; there is no shared state across calls.

use ignore::WalkBuilder;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::ScanError;
use crate::models::{FileRecord, Language, ScanConfig};

/// Dependency and build-output directories that are never descended into,
/// even outside git repositories where no .gitignore applies
const IGNORE_DIRS: &[&str] = &[
    "node_modules",
    "__pycache__",
    ".venv",
    "venv",
    "env",
    "dist",
    "build",
    ".next",
    ".nuxt",
    "target",
    "obj",
    "coverage",
    ".pytest_cache",
    "vendor",
];

/// Result of one scan: decoded records plus the count of files that were
/// excluded non-fatally (oversized, unreadable, or not valid UTF-8)
#[derive(Debug)]
pub struct ScanOutcome {
    pub records: Vec<FileRecord>,
    pub skipped_files: usize,
}

/// Enumerate and decode all eligible files under `root`.
///
/// Records are returned sorted by path, so the traversal result is
/// deterministic for a fixed filesystem state. Symbolic links are not
/// followed. Fails only on a bad root; per-file problems are skipped
/// silently and counted.
pub fn scan(root: &Path, config: &ScanConfig) -> Result<ScanOutcome, ScanError> {
    if !root.exists() {
        return Err(ScanError::PathNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let candidates = discover_candidates(root);
    log::debug!("Scanner found {} candidate files under {}", candidates.len(), root.display());

    let skipped = AtomicUsize::new(0);
    let mut records: Vec<FileRecord> = candidates
        .par_iter()
        .filter_map(|path| match load_record(root, path, config) {
            Loaded::Record(record) => Some(record),
            Loaded::Skipped => {
                skipped.fetch_add(1, Ordering::Relaxed);
                None
            }
        })
        .collect();

    // Sorted output keeps document ids and tie-breaks stable across
    // rebuilds of an unchanged tree.
    records.sort_by(|a, b| a.path.cmp(&b.path));

    let skipped_files = skipped.load(Ordering::Relaxed);
    log::info!(
        "Scanned {}: {} files eligible, {} skipped",
        root.display(),
        records.len(),
        skipped_files
    );

    Ok(ScanOutcome { records, skipped_files })
}

enum Loaded {
    Record(FileRecord),
    Skipped,
}

/// Walk the tree and collect paths whose extension maps to an indexable
/// language. Hidden entries and .gitignore rules are honored by the walker.
fn discover_candidates(root: &Path) -> Vec<PathBuf> {
    let walker = WalkBuilder::new(root)
        .follow_links(false)
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            !IGNORE_DIRS.contains(&name.as_ref())
        })
        .build();

    let mut candidates = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::debug!("Walk error: {}", e);
                continue;
            }
        };

        // Only plain files; symlinks report their own file type here and
        // fall through.
        if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
            continue;
        }

        let ext = match entry.path().extension() {
            Some(ext) => ext.to_string_lossy().to_lowercase(),
            None => continue,
        };
        if Language::from_extension(&ext).is_indexable() {
            candidates.push(entry.path().to_path_buf());
        }
    }
    candidates
}

/// Read and decode one candidate into a record, or skip it.
fn load_record(root: &Path, path: &Path, config: &ScanConfig) -> Loaded {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) => {
            log::debug!("Skipping {} (stat failed: {})", path.display(), e);
            return Loaded::Skipped;
        }
    };

    if metadata.len() > config.max_file_size {
        log::debug!("Skipping {} (too large: {} bytes)", path.display(), metadata.len());
        return Loaded::Skipped;
    }

    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::debug!("Skipping {} (read failed: {})", path.display(), e);
            return Loaded::Skipped;
        }
    };

    let content = match String::from_utf8(bytes) {
        Ok(content) => content,
        Err(_) => {
            log::debug!("Skipping {} (not valid UTF-8)", path.display());
            return Loaded::Skipped;
        }
    };

    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let rel_path = path
        .strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/");

    Loaded::Record(FileRecord {
        path: rel_path,
        language: Language::from_extension(&ext),
        byte_size: metadata.len(),
        line_count: content.lines().count(),
        content,
    })
}
