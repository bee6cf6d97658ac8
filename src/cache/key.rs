//! Lock-file discovery and cache key derivation

use std::fs;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use sha2::{Digest, Sha256};
use tracing::debug;
use walkdir::WalkDir;

use crate::cache::error::CacheError;
use crate::config::CACHE_KEY_PREFIX;

/// Files under `root` matching any of `patterns`, sorted by path.
///
/// Patterns are globs relative to `root`; a leading `!` excludes matches.
/// Fails with [`CacheError::LockFileNotFound`] when nothing matches.
pub fn resolve_lock_files(root: &Path, patterns: &[String]) -> Result<Vec<PathBuf>, CacheError> {
    let mut include = GlobSetBuilder::new();
    let mut exclude = GlobSetBuilder::new();
    let mut has_include = false;

    for pattern in patterns.iter().map(|p| p.trim()).filter(|p| !p.is_empty()) {
        match pattern.strip_prefix('!') {
            Some(negated) => {
                exclude.add(glob(root, negated)?);
            }
            None => {
                include.add(glob(root, pattern)?);
                has_include = true;
            }
        }
    }

    let not_found = || CacheError::LockFileNotFound {
        patterns: patterns.to_vec(),
    };
    if !has_include {
        return Err(not_found());
    }

    let include = include.build()?;
    let exclude = exclude.build()?;
    let files = walk_matches(root, &include, &exclude);
    if files.is_empty() {
        return Err(not_found());
    }

    debug!("Lock files: {:?}", files);
    Ok(files)
}

fn glob(root: &Path, pattern: &str) -> Result<globset::Glob, CacheError> {
    let relative = Path::new(pattern)
        .strip_prefix(root)
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|_| pattern.trim_start_matches("./").to_string());

    Ok(GlobBuilder::new(&relative).literal_separator(true).build()?)
}

fn walk_matches(root: &Path, include: &GlobSet, exclude: &GlobSet) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.file_name() != ".git")
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let relative = entry.path().strip_prefix(root).ok()?;
            (include.is_match(relative) && !exclude.is_match(relative))
                .then(|| entry.path().to_path_buf())
        })
        .collect();
    files.sort();
    files
}

/// Hex encoded SHA-256 over the SHA-256 digests of `files`, in order
pub fn hash_files(files: &[PathBuf]) -> Result<String, CacheError> {
    let mut outer = Sha256::new();
    for path in files {
        let content = fs::read(path).map_err(|source| CacheError::HashingFailed {
            path: path.clone(),
            source,
        })?;
        outer.update(Sha256::digest(&content));
    }
    Ok(hex::encode(outer.finalize()))
}

/// `dotnet-cache-{platform}-{hash}`
pub fn primary_key(platform: &str, hash: &str) -> String {
    format!("{}-{}-{}", CACHE_KEY_PREFIX, platform, hash)
}
