//! External service traits and their request/response types
//!
//! Both services are treated as unreliable. Implementations report every
//! failure as a [`deckcraft_core::DeckError`]; deciding what a failure means
//! for a slide is left to the callers in `content` and `image`.

use deckcraft_core::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A text completion request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRequest {
    pub prompt: String,
    pub system_prompt: String,
    pub max_tokens: u32,
}

/// A text completion response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentResponse {
    pub text: String,
    /// Source references as returned by the service
    #[serde(default)]
    pub raw_citations: Vec<String>,
}

/// An image generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRequest {
    pub prompt: String,
    /// Name of an image style preset, e.g. "professional"
    pub style: String,
}

/// An image generation response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResponse {
    pub image_url: String,
}

/// Readiness of a service as far as can be told without calling it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceStatus {
    Available,
    NoApiKey,
    Disabled,
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceStatus::Available => write!(f, "connected"),
            ServiceStatus::NoApiKey => write!(f, "not_configured"),
            ServiceStatus::Disabled => write!(f, "disabled"),
        }
    }
}

/// A text generation backend (Perplexity, mock)
pub trait ContentService: Send + Sync {
    fn name(&self) -> &str;

    fn status(&self) -> ServiceStatus;

    /// Run one completion. Must give up once `timeout` has elapsed.
    fn complete(&self, request: &ContentRequest, timeout: Duration) -> Result<ContentResponse>;
}

/// An image generation backend (fal.ai Flux, mock)
pub trait ImageService: Send + Sync {
    fn name(&self) -> &str;

    fn status(&self) -> ServiceStatus;

    /// Generate one image and return where it can be fetched from
    fn generate(&self, request: &ImageRequest, timeout: Duration) -> Result<ImageResponse>;
}
