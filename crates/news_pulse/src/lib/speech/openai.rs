//! OpenAI text-to-speech backend.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

use crate::retry::RetryPolicy;

use super::{SpeechSynthesizer, TTS_CHUNK_BUDGET};

#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("rate limited: {message}")]
    RateLimited { message: String },
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
}

impl SpeechError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::RateLimited { .. })
    }
}

/// Client for the OpenAI speech endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiSpeech {
    client: Client,
    api_key: String,
    base_url: String,
    voice: String,
    retry: RetryPolicy,
}

impl OpenAiSpeech {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".into(),
            voice: "alloy".into(),
            retry: RetryPolicy::default(),
        }
    }

    /// Overrides the API base URL, for tests against a local server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn send_speech_request(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        let body = SpeechRequest {
            model: Self::TTS_MODEL,
            input: text,
            voice: &self.voice,
            response_format: "mp3",
        };

        let resp = self
            .client
            .post(format!("{}/audio/speech", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(Self::REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            if status.as_u16() == 429 {
                return Err(SpeechError::RateLimited { message });
            }
            return Err(SpeechError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.bytes().await?.to_vec())
    }
}

impl SpeechSynthesizer for OpenAiSpeech {
    const TTS_MODEL: &'static str = "tts-1-hd";
    const MAX_INPUT_CHARS: usize = TTS_CHUNK_BUDGET;
    type Error = SpeechError;

    #[tracing::instrument(skip(self, text), fields(chars = text.len()))]
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, Self::Error> {
        self.retry
            .run(|| self.send_speech_request(text), SpeechError::is_retryable)
            .await
            .inspect_err(|e| tracing::error!(error = ?e, "Speech synthesis failed"))
    }
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    model: &'static str,
    input: &'a str,
    voice: &'a str,
    response_format: &'static str,
}
