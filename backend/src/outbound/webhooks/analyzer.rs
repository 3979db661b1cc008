//! Image analyzer adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use super::dto::{AnalysisRequestDto, AnalysisResponseDto};
use super::{WebhookFailure, WebhookSetupError, post_json};
use crate::domain::ports::{
    AnalysisRequest, AnalysisResponse, AnalysisService, AnalysisServiceError,
};

/// Requests assessments by POSTing to the configured analyzer URL.
pub struct AnalyzerWebhook {
    client: Client,
    endpoint: Url,
}

impl AnalyzerWebhook {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, WebhookSetupError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }
}

impl From<WebhookFailure> for AnalysisServiceError {
    fn from(failure: WebhookFailure) -> Self {
        match failure {
            WebhookFailure::Transport(message) => Self::transport(message),
            WebhookFailure::Timeout(message) => Self::timeout(message),
            WebhookFailure::Status { status, message } => Self::status(status, message),
            WebhookFailure::Decode(message) => Self::decode(message),
        }
    }
}

#[async_trait]
impl AnalysisService for AnalyzerWebhook {
    async fn analyze(
        &self,
        request: AnalysisRequest,
    ) -> Result<AnalysisResponse, AnalysisServiceError> {
        let body = AnalysisRequestDto::from(&request);
        let reply: AnalysisResponseDto = post_json(&self.client, &self.endpoint, &body).await?;
        Ok(reply.into())
    }
}
