use std::time::Duration;

use reqwest::Client as HttpClient;

use crate::{
    error::{AppError, AppResult},
    models::{SummaryRequest, SummaryResponse},
};

/// Remote text summarization
#[async_trait::async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, content: &str) -> AppResult<String>;
}

/// Summarizer that posts `{content}` to an HTTP endpoint and reads `{summary}`
#[derive(Clone)]
pub struct HttpSummarizer {
    http_client: HttpClient,
    url: String,
}

impl HttpSummarizer {
    /// `timeout` bounds each whole request, from connect to the last body byte
    pub fn new(url: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self { http_client, url })
    }
}

#[async_trait::async_trait]
impl Summarizer for HttpSummarizer {
    async fn summarize(&self, content: &str) -> AppResult<String> {
        let response = self
            .http_client
            .post(&self.url)
            .json(&SummaryRequest {
                content: Some(content.to_string()),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(status = %status, url = %self.url, "Summarizer request failed");
            return Err(AppError::ExternalApi(format!(
                "Failed to generate summary (upstream status {})",
                status.as_u16()
            )));
        }

        let body: SummaryResponse = response.json().await?;
        Ok(body.summary)
    }
}
