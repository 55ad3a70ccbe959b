//! Retrieval and context assembly for review grounding.
//!
//! The store holds the lossy normalized text used for similarity; the
//! context handed to the language model is the full original file content,
//! re-read from disk at retrieval time. A file that has moved or been
//! deleted since indexing is dropped with a warning and the remaining items
//! are kept in order.

use anyhow::Result;
use std::path::Path;

use crate::config::Config;
use crate::embedding::{self, EmbeddingProvider};
use crate::normalize::{normalize, truncate_chars};
use crate::store::VectorStore;

/// Fetch the raw content of the `k` stored documents nearest to `query`,
/// nearest first.
///
/// Callers gate on [`VectorStore::exists`] and a present query vector;
/// this function assumes both preconditions hold.
pub async fn retrieve_context(
    store: &VectorStore,
    query: &[f32],
    k: usize,
) -> Result<Vec<String>> {
    let results = store.nearest(query, k).await?;

    let mut contents = Vec::with_capacity(results.len());
    for doc in results {
        match std::fs::read_to_string(&doc.path) {
            Ok(raw) => contents.push(raw),
            Err(e) => {
                eprintln!("Warning: could not re-read {}: {}", doc.path, e);
            }
        }
    }

    Ok(contents)
}

/// Build the context block for a diff: embed the normalized diff, retrieve
/// the top-K nearest indexed files, and join their raw contents with blank
/// lines, nearest first.
///
/// Degrades to an empty string — never an error — when the embedding call
/// fails, the store is empty, or retrieval itself fails. The review then
/// proceeds without retrieval-augmented grounding.
pub async fn build_review_context(
    config: &Config,
    store: &VectorStore,
    provider: &dyn EmbeddingProvider,
    diff: &str,
) -> String {
    let cleaned = truncate_chars(&normalize(diff), config.indexing.max_chars);

    let query = match provider.embed(&cleaned).await {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Warning: diff embedding failed, reviewing without context: {}", e);
            return String::new();
        }
    };

    match store.exists().await {
        Ok(true) => {}
        Ok(false) => return String::new(),
        Err(e) => {
            eprintln!("Warning: index check failed, reviewing without context: {}", e);
            return String::new();
        }
    }

    match retrieve_context(store, &query, config.retrieval.top_k).await {
        Ok(contents) => contents.join("\n\n"),
        Err(e) => {
            eprintln!("Warning: retrieval failed, reviewing without context: {}", e);
            String::new()
        }
    }
}

/// CLI entry point for `prr context`: build and print the context that a
/// diff on disk would retrieve. Debugging aid for index quality.
pub async fn run_context(config: &Config, diff_path: &Path) -> Result<()> {
    let diff = std::fs::read_to_string(diff_path)?;

    let provider = embedding::create_provider(&config.embedding)?;
    let store = VectorStore::connect(config).await?;

    let context = build_review_context(config, &store, provider.as_ref(), &diff).await;
    store.close().await;

    if context.is_empty() {
        println!("(no context retrieved)");
    } else {
        println!("{}", context);
    }

    Ok(())
}
