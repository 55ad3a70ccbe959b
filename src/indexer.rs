//! Repository indexing: walk a file tree, embed supported files, and
//! populate the vector store.
//!
//! Failure isolation is per file: an unreadable file, a failed embedding
//! call, or a failed insert is logged and skipped without aborting the walk.
//! Re-running over an unchanged tree is a no-op per file — documents are
//! keyed by path and skipped when their content hash matches the stored one.

use anyhow::{bail, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use sha2::{Digest, Sha256};
use std::path::Path;
use walkdir::WalkDir;

use crate::config::Config;
use crate::embedding::{self, EmbeddingProvider};
use crate::normalize::{normalize, truncate_chars};
use crate::store::VectorStore;

#[derive(Debug, Default)]
pub struct IndexStats {
    /// Supported files found under the root.
    pub scanned: u64,
    /// Files embedded and written to the store.
    pub indexed: u64,
    /// Files skipped because their content hash matched the stored row.
    pub unchanged: u64,
    /// Files skipped after a read, embedding, or insert failure.
    pub failed: u64,
}

/// Index every supported file under `root` into the store.
///
/// With `full`, the content-hash check is bypassed and every file is
/// re-embedded.
pub async fn index_tree(
    config: &Config,
    store: &VectorStore,
    provider: &dyn EmbeddingProvider,
    root: &Path,
    full: bool,
) -> Result<IndexStats> {
    let mut stats = IndexStats::default();

    for path in collect_files(config, root)? {
        stats.scanned += 1;

        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Warning: could not read {}: {}", path, e);
                stats.failed += 1;
                continue;
            }
        };

        let cleaned = truncate_chars(&normalize(&content), config.indexing.max_chars);
        let hash = hash_text(&cleaned);

        if !full {
            match store.content_hash(&path).await {
                Ok(Some(stored)) if stored == hash => {
                    stats.unchanged += 1;
                    continue;
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Warning: hash lookup failed for {}: {}", path, e);
                }
            }
        }

        let vector = match provider.embed(&cleaned).await {
            Ok(v) => v,
            Err(e) => {
                eprintln!("Warning: embedding failed for {}: {}", path, e);
                stats.failed += 1;
                continue;
            }
        };

        match store.upsert(&path, &cleaned, &hash, &vector).await {
            Ok(()) => stats.indexed += 1,
            Err(e) => {
                eprintln!("Warning: could not store {}: {}", path, e);
                stats.failed += 1;
            }
        }
    }

    Ok(stats)
}

/// Walk the root and return the supported files, sorted for deterministic
/// ordering. Paths are returned as walked so retrieval can re-read them
/// later without knowing the root.
pub fn collect_files(config: &Config, root: &Path) -> Result<Vec<String>> {
    if !root.exists() {
        bail!("Index root does not exist: {}", root.display());
    }

    let mut default_excludes = vec![
        "**/.git/**".to_string(),
        "**/target/**".to_string(),
        "**/node_modules/**".to_string(),
    ];
    default_excludes.extend(config.indexing.exclude_globs.clone());
    let exclude_set = build_globset(&default_excludes)?;

    let mut files = Vec::new();

    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                eprintln!("Warning: walk error under {}: {}", root.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        if exclude_set.is_match(relative) {
            continue;
        }

        let supported = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                config.indexing.extensions.iter().any(|e| e == &ext)
            })
            .unwrap_or(false);
        if !supported {
            continue;
        }

        files.push(path.to_string_lossy().to_string());
    }

    files.sort();
    Ok(files)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

pub fn hash_text(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// CLI entry point for `prr index`.
pub async fn run_index(config: &Config, root: &Path, full: bool, dry_run: bool) -> Result<()> {
    if dry_run {
        let files = collect_files(config, root)?;
        println!("index {} (dry-run)", root.display());
        println!("  supported files: {}", files.len());
        return Ok(());
    }

    let provider = embedding::create_provider(&config.embedding)?;
    let store = VectorStore::connect(config).await?;

    let result = index_tree(config, &store, provider.as_ref(), root, full).await;
    store.close().await;
    let stats = result?;

    println!("index {}", root.display());
    println!("  scanned: {}", stats.scanned);
    println!("  indexed: {}", stats.indexed);
    println!("  unchanged: {}", stats.unchanged);
    println!("  failed: {}", stats.failed);
    println!("ok");

    Ok(())
}
