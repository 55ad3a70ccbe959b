//! Top-level review workflow: fetch the PR, build grounded context, run the
//! analysis, and write the report.

use anyhow::Result;

use crate::config::Config;
use crate::context;
use crate::embedding::{self, EmbeddingProvider};
use crate::github::GithubClient;
use crate::llm;
use crate::report;
use crate::store::VectorStore;

/// Run the full PR review pipeline.
///
/// Provider, client, and store construction failures are fatal
/// (configuration / resource acquisition). The store is closed on every
/// exit path, including errors from the workflow body.
pub async fn run_review(config: &Config, owner: &str, repo: &str, number: u64) -> Result<()> {
    let provider = embedding::create_provider(&config.embedding)?;
    let github = GithubClient::new(&config.github)?;
    let store = VectorStore::connect(config).await?;

    let result = review_inner(config, &store, provider.as_ref(), &github, owner, repo, number).await;
    store.close().await;
    result
}

async fn review_inner(
    config: &Config,
    store: &VectorStore,
    provider: &dyn EmbeddingProvider,
    github: &GithubClient,
    owner: &str,
    repo: &str,
    number: u64,
) -> Result<()> {
    println!("review {}/{}#{}", owner, repo, number);

    let details = github.pr_details(owner, repo, number).await?;
    let diff = github.pr_diff(owner, repo, number).await?;

    let context = context::build_review_context(config, store, provider, &diff).await;
    if context.is_empty() {
        println!("  context: none (reviewing diff without grounding)");
    } else {
        println!("  context: {} chars retrieved", context.len());
    }

    let prompt = llm::build_prompt(&details, &diff, &context);
    let analysis = llm::analyze_diff(&config.llm, &prompt).await?;

    let path = report::write_report(&config.report, &details, &analysis)?;
    println!("  report: {}", path.display());
    println!("ok");

    Ok(())
}
