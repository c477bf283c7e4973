use anyhow::{Context, Result};
use async_trait::async_trait;
use govhub_db::models::post;
use reqwest::Client;
use serde_json::json;
use tracing::debug;
use utils::errors::SUMMARY_GENERATION_FAILED;

/// Requests an AI content summary for a post as a side effect of serving it.
/// Failures are non-fatal to callers.
#[async_trait]
pub trait SummaryService: Send + Sync {
    async fn generate(
        &self,
        post: &post::Model,
        network: &str,
        is_external_api_call: bool,
    ) -> Result<()>;
}

pub struct HttpSummaryService {
    client: Client,
    endpoint: Option<String>,
}

impl HttpSummaryService {
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint,
        }
    }
}

#[async_trait]
impl SummaryService for HttpSummaryService {
    async fn generate(
        &self,
        post: &post::Model,
        network: &str,
        is_external_api_call: bool,
    ) -> Result<()> {
        let Some(endpoint) = &self.endpoint else {
            debug!(post_id = %post.id, "No summary endpoint configured, skipping");
            return Ok(());
        };

        // A post with a summary, or with nothing to summarize, is left alone.
        if post.summary.is_some() || post.content.as_deref().is_none_or(str::is_empty) {
            return Ok(());
        }

        let response = self
            .client
            .post(endpoint)
            .json(&json!({
                "network": network,
                "postId": post.id,
                "proposalType": post.proposal_type,
                "content": post.content,
                "isExternalApiCall": is_external_api_call,
            }))
            .send()
            .await
            .context(SUMMARY_GENERATION_FAILED)?;

        if !response.status().is_success() {
            anyhow::bail!("Summary service returned HTTP {}", response.status());
        }

        debug!(post_id = %post.id, "Content summary requested");
        Ok(())
    }
}
