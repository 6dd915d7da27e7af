//! reqwest implementation of the story service ports.

use async_trait::async_trait;
use futures_util::{StreamExt, TryStreamExt};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use storyloom_core::{
    AudioPayload, GenerationRequest, GenerationTransport, SpeechSynthesizer, StoreError,
    StoredStory, StoryStore, StreamError, SynthesisError, TextByteStream,
};
use tracing::debug;
use url::Url;

use crate::config::RemoteConfig;
use crate::error::{RemoteError, RemoteResult};
use crate::wire::{GenerationBody, SpeechBody};

/// Longest error body kept for diagnostics.
const MAX_ERROR_BODY: usize = 512;

/// HTTP client for the story service.
#[derive(Debug, Clone)]
pub struct HttpStoryClient {
    client: reqwest::Client,
    config: RemoteConfig,
}

impl HttpStoryClient {
    pub fn new(config: RemoteConfig) -> RemoteResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    /// Turn a non-success response into [`RemoteError::RequestFailed`].
    async fn check_status(
        url: &Url,
        response: reqwest::Response,
    ) -> RemoteResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let mut message = response.text().await.unwrap_or_default();
        if message.len() > MAX_ERROR_BODY {
            let cut = (0..=MAX_ERROR_BODY)
                .rev()
                .find(|&i| message.is_char_boundary(i))
                .unwrap_or(0);
            message.truncate(cut);
        }
        Err(RemoteError::RequestFailed {
            status: status.as_u16(),
            url: url.to_string(),
            message,
        })
    }

    async fn open_generation(&self, request: &GenerationRequest) -> RemoteResult<TextByteStream> {
        let (path, accept) = if request.is_continuation() {
            (&self.config.continue_path, "application/json")
        } else {
            (&self.config.generate_path, "text/event-stream")
        };
        let url = self.config.endpoint(path)?;
        debug!(%url, session = request.session_id(), "Requesting story stream");

        let response = self
            .client
            .post(url.clone())
            .header(ACCEPT, accept)
            .json(&GenerationBody::from(request))
            .send()
            .await?;
        let response = Self::check_status(&url, response).await?;

        Ok(response
            .bytes_stream()
            .map_err(|e| StreamError::Network(e.to_string()))
            .boxed())
    }

    async fn fetch_speech(&self, text: &str) -> RemoteResult<AudioPayload> {
        let url = self.config.endpoint(&self.config.speech_path)?;
        let response = self
            .client
            .post(url.clone())
            .timeout(self.config.timeout)
            .json(&SpeechBody { text })
            .send()
            .await?;
        let response = Self::check_status(&url, response).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;
        debug!(bytes = bytes.len(), ?content_type, "Received narration audio");
        Ok(AudioPayload::new(bytes, content_type))
    }

    async fn fetch_story_json(&self, story_id: &str) -> RemoteResult<Option<StoredStory>> {
        let mut url = self.config.endpoint(&self.config.story_path)?;
        url.query_pairs_mut().append_pair("story_id", story_id);

        let response = self
            .client
            .get(url.clone())
            .timeout(self.config.timeout)
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::check_status(&url, response).await?;

        let body = response.bytes().await?;
        let story = serde_json::from_slice::<StoredStory>(&body).map_err(|e| {
            RemoteError::InvalidResponse {
                message: format!("story payload: {e}"),
            }
        })?;
        Ok(Some(story))
    }
}

#[async_trait]
impl GenerationTransport for HttpStoryClient {
    async fn open(&self, request: &GenerationRequest) -> Result<TextByteStream, StreamError> {
        Ok(self.open_generation(request).await?)
    }
}

#[async_trait]
impl SpeechSynthesizer for HttpStoryClient {
    async fn synthesize(&self, text: &str) -> Result<AudioPayload, SynthesisError> {
        let payload = self.fetch_speech(text).await?;
        if payload.is_empty() {
            return Err(SynthesisError::EmptyPayload);
        }
        Ok(payload)
    }
}

#[async_trait]
impl StoryStore for HttpStoryClient {
    async fn fetch_story(&self, story_id: &str) -> Result<StoredStory, StoreError> {
        self.fetch_story_json(story_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(story_id.to_string()))
    }
}
