//! Language-model analysis of a diff, grounded in retrieved context.

use anyhow::{bail, Result};
use std::time::Duration;

use crate::config::LlmConfig;
use crate::github::PrDetails;

/// Render the review prompt: PR metadata, the retrieved context block (when
/// any), the fenced diff, and the review instructions.
pub fn build_prompt(details: &PrDetails, diff: &str, context: &str) -> String {
    let description = details.body.as_deref().unwrap_or("No description provided.");

    let context_section = if context.is_empty() {
        String::new()
    } else {
        format!("## Relevant Code Context\n\n{}\n\n", context)
    };

    format!(
        "You are reviewing a Pull Request titled \"{title}\" by {author}.\n\
         \n\
         ## Pull Request Description\n\
         \n\
         {description}\n\
         \n\
         {context_section}## Diff to Review\n\
         \n\
         ```diff\n\
         {diff}\n\
         ```\n\
         \n\
         ## Instructions\n\
         \n\
         - Analyze the code changes for quality, consistency, and potential issues.\n\
         - Identify any technical debts or code smells.\n\
         - Provide actionable recommendations for refactoring and optimization.\n\
         - Format your response in clear, concise language.\n\
         \n\
         ## Review:\n",
        title = details.title,
        author = details.author,
        description = description,
        context_section = context_section,
        diff = diff,
    )
}

/// Send the prompt to the chat completions API and return the analysis text.
///
/// Requires `OPENAI_API_KEY`. A failure here ends the review — there is
/// nothing to report without an analysis.
pub async fn analyze_diff(config: &LlmConfig, prompt: &str) -> Result<String> {
    let api_key = std::env::var("OPENAI_API_KEY")
        .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY environment variable not set"))?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;

    let body = serde_json::json!({
        "model": config.model,
        "messages": [{ "role": "user", "content": prompt }],
        "temperature": config.temperature,
        "max_tokens": config.max_tokens,
    });

    let response = client
        .post(format!("{}/v1/chat/completions", config.api_base))
        .header("Authorization", format!("Bearer {}", api_key))
        .header("Content-Type", "application/json")
        .json(&body)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body_text = response.text().await.unwrap_or_default();
        bail!("Chat API error {}: {}", status, body_text);
    }

    let json: serde_json::Value = response.json().await?;
    parse_chat_response(&json)
}

/// Extract `choices[0].message.content` from a chat completions response.
fn parse_chat_response(json: &serde_json::Value) -> Result<String> {
    json.get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(|s| s.trim().to_string())
        .ok_or_else(|| anyhow::anyhow!("Invalid chat response: missing choices[0].message.content"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> PrDetails {
        PrDetails {
            number: 7,
            title: "Add rate limiting".to_string(),
            author: "octocat".to_string(),
            body: Some("Limits request bursts.".to_string()),
        }
    }

    #[test]
    fn test_prompt_includes_metadata_and_diff() {
        let prompt = build_prompt(&details(), "diff --git a/x b/x", "");
        assert!(prompt.contains("\"Add rate limiting\" by octocat"));
        assert!(prompt.contains("Limits request bursts."));
        assert!(prompt.contains("diff --git a/x b/x"));
    }

    #[test]
    fn test_prompt_omits_empty_context_section() {
        let prompt = build_prompt(&details(), "d", "");
        assert!(!prompt.contains("Relevant Code Context"));
    }

    #[test]
    fn test_prompt_includes_context_before_diff() {
        let prompt = build_prompt(&details(), "the-diff", "fn helper() {}");
        let ctx_pos = prompt.find("Relevant Code Context").unwrap();
        let diff_pos = prompt.find("Diff to Review").unwrap();
        assert!(ctx_pos < diff_pos);
        assert!(prompt.contains("fn helper() {}"));
    }

    #[test]
    fn test_prompt_default_description() {
        let mut d = details();
        d.body = None;
        let prompt = build_prompt(&d, "d", "");
        assert!(prompt.contains("No description provided."));
    }

    #[test]
    fn test_parse_chat_response() {
        let json = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "  Looks good.  " } }]
        });
        assert_eq!(parse_chat_response(&json).unwrap(), "Looks good.");
    }

    #[test]
    fn test_parse_chat_response_missing_choices() {
        let json = serde_json::json!({ "error": { "message": "rate limited" } });
        assert!(parse_chat_response(&json).is_err());
    }
}
