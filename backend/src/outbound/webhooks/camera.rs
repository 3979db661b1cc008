//! Camera interface adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use super::dto::{CaptureRequestDto, CaptureResponseDto};
use super::{WebhookFailure, WebhookSetupError, endpoint_under, post_json};
use crate::domain::ports::{CaptureRequest, CaptureResponse, CaptureService, CaptureServiceError};

/// Captures images by POSTing to `{base_url}/capture`.
pub struct CameraWebhook {
    client: Client,
    endpoint: Url,
}

impl CameraWebhook {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the client cannot be constructed or the capture
    /// endpoint cannot be derived from `base_url`.
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self, WebhookSetupError> {
        let client = Client::builder().timeout(timeout).build()?;
        let endpoint = endpoint_under(base_url, "capture")?;
        Ok(Self { client, endpoint })
    }

    /// Resolved capture endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl From<WebhookFailure> for CaptureServiceError {
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
impl CaptureService for CameraWebhook {
    async fn capture(
        &self,
        request: CaptureRequest,
    ) -> Result<CaptureResponse, CaptureServiceError> {
        let body = CaptureRequestDto::from(request);
        let reply: CaptureResponseDto = post_json(&self.client, &self.endpoint, &body).await?;
        Ok(reply.into())
    }
}
