//! Diff source: pull request metadata and unified diffs from the GitHub
//! REST API.

use anyhow::{bail, Result};
use serde::Deserialize;
use std::time::Duration;

use crate::config::GithubConfig;

/// Pull request metadata consumed by the prompt and report.
#[derive(Debug, Clone)]
pub struct PrDetails {
    pub number: u64,
    pub title: String,
    pub author: String,
    pub body: Option<String>,
}

#[derive(Deserialize)]
struct PrResponse {
    number: u64,
    title: String,
    body: Option<String>,
    user: PrUser,
}

#[derive(Deserialize)]
struct PrUser {
    login: String,
}

pub struct GithubClient {
    client: reqwest::Client,
    api_base: String,
    token: Option<String>,
}

impl GithubClient {
    /// Token is read from `GITHUB_TOKEN` when present; public repositories
    /// work unauthenticated.
    pub fn new(config: &GithubConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.clone(),
            token: std::env::var("GITHUB_TOKEN").ok(),
        })
    }

    pub async fn pr_details(&self, owner: &str, repo: &str, number: u64) -> Result<PrDetails> {
        let body = self
            .get(owner, repo, number, "application/vnd.github+json")
            .await?;
        let pr: PrResponse = serde_json::from_str(&body)?;

        Ok(PrDetails {
            number: pr.number,
            title: pr.title,
            author: pr.user.login,
            body: pr.body,
        })
    }

    /// Unified diff for the pull request, via the diff media type.
    pub async fn pr_diff(&self, owner: &str, repo: &str, number: u64) -> Result<String> {
        self.get(owner, repo, number, "application/vnd.github.v3.diff")
            .await
    }

    async fn get(&self, owner: &str, repo: &str, number: u64, accept: &str) -> Result<String> {
        let url = format!("{}/repos/{}/{}/pulls/{}", self.api_base, owner, repo, number);

        let mut request = self
            .client
            .get(&url)
            .header("Accept", accept)
            .header("User-Agent", "review-harness");
        if let Some(ref token) = self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("GitHub API error {} for {}: {}", status, url, body_text);
        }

        Ok(response.text().await?)
    }
}
