//! AI gateway: the single seam between the archive and the generative model
//! service.
//!
//! Transport-level calls return [`GatewayError`]. The public operations in
//! `ops` and `media` never fail; each maps any error to its fixed fallback
//! and logs it.

pub mod live;
mod media;
mod ops;
pub mod prompts;
pub mod wire;

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::{Config, Models};
use wire::{GenerateRequest, GenerateResponse};

pub use live::{LiveCallbacks, LiveEvent, LiveSender, LiveSession};
pub use ops::fallback;

#[derive(Debug)]
pub enum GatewayError {
    MissingApiKey,
    Transport(reqwest::Error),
    Status { status: u16, body: String },
    Decode(serde_json::Error),
    Empty,
    Operation(String),
    Base64(base64::DecodeError),
    Io(std::io::Error),
    WebSocket(tokio_tungstenite::tungstenite::Error),
    InvalidUrl(String),
    SessionClosed,
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::MissingApiKey => {
                write!(f, "no API key configured (set GEMINI_API_KEY or API_KEY)")
            }
            GatewayError::Transport(e) => write!(f, "transport error: {e}"),
            GatewayError::Status { status, body } => {
                write!(f, "service returned HTTP {status}: {body}")
            }
            GatewayError::Decode(e) => write!(f, "malformed response: {e}"),
            GatewayError::Empty => write!(f, "response carried no usable content"),
            GatewayError::Operation(msg) => write!(f, "long-running operation failed: {msg}"),
            GatewayError::Base64(e) => write!(f, "invalid inline data: {e}"),
            GatewayError::Io(e) => write!(f, "I/O error: {e}"),
            GatewayError::WebSocket(e) => write!(f, "live uplink error: {e}"),
            GatewayError::InvalidUrl(msg) => write!(f, "invalid URL {msg}"),
            GatewayError::SessionClosed => write!(f, "live session is closed"),
        }
    }
}

impl std::error::Error for GatewayError {}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        GatewayError::Transport(e)
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(e: serde_json::Error) -> Self {
        GatewayError::Decode(e)
    }
}

impl From<base64::DecodeError> for GatewayError {
    fn from(e: base64::DecodeError) -> Self {
        GatewayError::Base64(e)
    }
}

impl From<std::io::Error> for GatewayError {
    fn from(e: std::io::Error) -> Self {
        GatewayError::Io(e)
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for GatewayError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        GatewayError::WebSocket(e)
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;

/// Where an Explore search is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntelRoute {
    Location,
    Founding,
}

/// A comma or more than 10 characters reads as a place; anything else as a
/// brand or person.
pub fn route_intel(query: &str) -> IntelRoute {
    if query.contains(',') || query.chars().count() > 10 {
        IntelRoute::Location
    } else {
        IntelRoute::Founding
    }
}

/// Configured client for the generative model service. Cheap to clone.
#[derive(Clone)]
pub struct Gateway {
    http: reqwest::Client,
    api_key: Option<String>,
    api_base: String,
    live_url: String,
    models: Models,
    voice: String,
    video_poll_interval: Duration,
    media_dir: PathBuf,
}

impl Gateway {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            live_url: config.live_url.clone(),
            models: config.models.clone(),
            voice: config.voice.clone(),
            video_poll_interval: config.video_poll_interval(),
            media_dir: config.media_dir(),
        })
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_live_url(mut self, url: impl Into<String>) -> Self {
        self.live_url = url.into();
        self
    }

    pub fn with_video_poll_interval(mut self, interval: Duration) -> Self {
        self.video_poll_interval = interval;
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn models(&self) -> &Models {
        &self.models
    }

    fn key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or(GatewayError::MissingApiKey)
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!("{}/v1beta/models/{model}:{method}", self.api_base)
    }

    async fn checked(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(GatewayError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn post_json<B, R>(&self, url: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", self.key()?)
            .json(body)
            .send()
            .await?;
        let bytes = Self::checked(response).await?.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn get_json<R: DeserializeOwned>(&self, url: &str) -> Result<R> {
        let response = self
            .http
            .get(url)
            .header("x-goog-api-key", self.key()?)
            .send()
            .await?;
        let bytes = Self::checked(response).await?.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn generate(&self, model: &str, request: &GenerateRequest) -> Result<GenerateResponse> {
        tracing::debug!("generateContent on {model}");
        self.post_json(&self.model_url(model, "generateContent"), request)
            .await
    }

    /// Structured output: the reply text must parse as `T`.
    async fn generate_structured<T: DeserializeOwned>(
        &self,
        model: &str,
        request: &GenerateRequest,
    ) -> Result<T> {
        let text = self.generate(model, request).await?.text().ok_or(GatewayError::Empty)?;
        Ok(serde_json::from_str(text.trim())?)
    }

    /// Text reply, with `empty` for a successful call that produced no text
    /// and `failed` for any error.
    async fn text_or(
        &self,
        op: &str,
        model: &str,
        request: GenerateRequest,
        empty: &str,
        failed: &str,
    ) -> String {
        match self.generate(model, &request).await {
            Ok(response) => response.text().unwrap_or_else(|| empty.to_string()),
            Err(e) => {
                tracing::warn!("{op} failed: {e}");
                failed.to_string()
            }
        }
    }
}

/// Unwrap an operation result, logging and substituting on failure.
fn or_fallback<T>(op: &str, result: Result<T>, fallback: impl FnOnce() -> T) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("{op} failed: {e}");
            fallback()
        }
    }
}
