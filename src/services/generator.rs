use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;

/// A2E image editor endpoint.
pub const DEFAULT_PROVIDER_URL: &str = "https://video.a2e.ai/image-generator/image-editor";

/// Instruction sent with every face-swap request.
pub const SWAP_PROMPT: &str = "Swap the face ensuring high quality photorealism";

/// Result URL recorded when the provider answers 200 without a result location.
pub const PLACEHOLDER_RESULT_URL: &str =
    "https://via.placeholder.com/500?text=AI+Generated+Result";

/// Upper bound on a single provider call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Response fields that carry the generated image location, in lookup order.
const RESULT_URL_FIELDS: [&str; 2] = ["url", "output_url"];

/// What a successful provider call produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResult {
    /// The provider returned the location of the generated image.
    Generated(String),
    /// The provider answered 200 but without any recognized result field.
    ///
    /// Jobs are still completed with [`PLACEHOLDER_RESULT_URL`] so that a
    /// response schema change never fails a job on its own. Kept as its own
    /// variant so callers can log or count it separately.
    Placeholder(String),
}

impl GenerationResult {
    pub fn result_url(&self) -> &str {
        match self {
            GenerationResult::Generated(url) | GenerationResult::Placeholder(url) => url,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, GenerationResult::Placeholder(_))
    }
}

/// One-shot call to an external image generation provider.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Put the face from `source_image` onto `target_image`.
    async fn generate(
        &self,
        source_image: &str,
        target_image: &str,
    ) -> Result<GenerationResult, GenerationError>;
}

#[derive(Serialize)]
struct ImageEditRequest<'a> {
    source_image: &'a str,
    target_image: &'a str,
    prompt: &'a str,
}

/// Client for the A2E image editor API.
pub struct A2eClient {
    http: Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl A2eClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(GenerationError::Transport)?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            api_key: api_key.filter(|key| !key.is_empty()),
            timeout,
        })
    }

    fn classify(&self, err: reqwest::Error) -> GenerationError {
        if err.is_timeout() {
            GenerationError::Timeout(self.timeout)
        } else {
            GenerationError::Transport(err)
        }
    }
}

#[async_trait]
impl ImageGenerator for A2eClient {
    async fn generate(
        &self,
        source_image: &str,
        target_image: &str,
    ) -> Result<GenerationResult, GenerationError> {
        let body = ImageEditRequest {
            source_image,
            target_image,
            prompt: SWAP_PROMPT,
        };

        let mut request = self.http.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| self.classify(e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(GenerationError::Provider {
                status: status.to_string(),
            });
        }

        // A `null` body decodes to no fields at all.
        let payload: Option<Map<String, Value>> =
            response.json().await.map_err(|e| self.classify(e))?;

        Ok(result_from_payload(&payload.unwrap_or_default()))
    }
}

fn result_from_payload(payload: &Map<String, Value>) -> GenerationResult {
    RESULT_URL_FIELDS
        .iter()
        .find_map(|field| payload.get(*field).and_then(Value::as_str))
        .map(|url| GenerationResult::Generated(url.to_string()))
        .unwrap_or_else(|| GenerationResult::Placeholder(PLACEHOLDER_RESULT_URL.to_string()))
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Provider did not respond within {0:?}")]
    Timeout(Duration),

    #[error("Provider returned {status}")]
    Provider { status: String },

    #[error("HTTP request failed: {0}")]
    Transport(#[source] reqwest::Error),
}

impl GenerationError {
    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::Timeout(_) => "timeout",
            GenerationError::Provider { .. } => "provider",
            GenerationError::Transport(_) => "transport",
        }
    }
}
