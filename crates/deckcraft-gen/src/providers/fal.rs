//! fal.ai Flux image provider
//!
//! Generates slide backgrounds through the synchronous Flux endpoint. The
//! response carries a hosted image URL which is used as-is.

use super::classify_error;
use crate::config::DeckcraftConfig;
use crate::service::{ImageRequest, ImageResponse, ImageService, ServiceStatus};
use crate::style::ImageStyle;
use deckcraft_core::{DeckError, Result};
use std::time::Duration;

const DEFAULT_FAL_URL: &str = "https://fal.run/fal-ai/flux/dev";
const IMAGE_SIZE: &str = "landscape_16_9";

/// Image service backed by fal.ai
pub struct FalImageService {
    api_key: Option<String>,
    api_url: String,
    agent: ureq::Agent,
}

impl FalImageService {
    pub fn from_config(config: &DeckcraftConfig, agent: ureq::Agent) -> Self {
        Self {
            api_key: config.api_key("fal").map(str::to_string),
            api_url: config.api_url("fal").unwrap_or(DEFAULT_FAL_URL).to_string(),
            agent,
        }
    }

    fn payload(request: &ImageRequest) -> serde_json::Value {
        let style = ImageStyle::preset(&request.style);
        serde_json::json!({
            "prompt": style.enrich_prompt(&request.prompt),
            "image_size": IMAGE_SIZE,
            "num_images": 1,
            "enable_safety_checker": true
        })
    }
}

impl ImageService for FalImageService {
    fn name(&self) -> &str {
        "fal"
    }

    fn status(&self) -> ServiceStatus {
        match self.api_key {
            Some(_) => ServiceStatus::Available,
            None => ServiceStatus::NoApiKey,
        }
    }

    fn generate(&self, request: &ImageRequest, timeout: Duration) -> Result<ImageResponse> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            DeckError::Config(
                "fal.ai API key not configured. Set DECKCRAFT_FAL_API_KEY or add to .deckcraft/config.toml"
                    .to_string(),
            )
        })?;
        if timeout.is_zero() {
            return Err(DeckError::TransientUpstream(
                "no time left for image request".to_string(),
            ));
        }

        let mut response = self
            .agent
            .post(&self.api_url)
            .config()
            .timeout_global(Some(timeout))
            .build()
            .header("Authorization", &format!("Key {}", api_key))
            .header("Content-Type", "application/json")
            .send_json(&Self::payload(request))
            .map_err(|e| classify_error("fal", e))?;

        let body: serde_json::Value = response.body_mut().read_json().map_err(|e| {
            DeckError::InvalidResponse(format!("Failed to parse fal.ai response: {}", e))
        })?;
        let image_url = parse_image_url(&body)?;
        Ok(ImageResponse { image_url })
    }
}

/// Pull the first image URL out of a response body.
///
/// Accepts the Flux shape (`images[0].url`) and a flat `image_url`.
pub fn parse_image_url(body: &serde_json::Value) -> Result<String> {
    body.get("images")
        .and_then(|imgs| imgs.as_array())
        .and_then(|arr| arr.first())
        .and_then(|img| img.get("url"))
        .or_else(|| body.get("image_url"))
        .and_then(|u| u.as_str())
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string)
        .ok_or_else(|| DeckError::InvalidResponse("No image URL in response".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flux_response() {
        let body = serde_json::json!({
            "images": [{
                "url": "https://fal.media/files/generated.png",
                "width": 1024,
                "height": 576,
                "content_type": "image/jpeg"
            }],
            "seed": 42,
            "has_nsfw_concepts": [false],
            "prompt": "modern office"
        });
        assert_eq!(
            parse_image_url(&body).unwrap(),
            "https://fal.media/files/generated.png"
        );
    }

    #[test]
    fn test_parse_flat_response() {
        let body = serde_json::json!({"image_url": "https://cdn.example.com/a.png"});
        assert_eq!(parse_image_url(&body).unwrap(), "https://cdn.example.com/a.png");
    }

    #[test]
    fn test_parse_empty_payloads() {
        for body in [
            serde_json::json!({"images": []}),
            serde_json::json!({"images": [{"url": ""}]}),
            serde_json::json!({"detail": "Unauthorized"}),
        ] {
            assert!(matches!(
                parse_image_url(&body),
                Err(DeckError::InvalidResponse(_))
            ));
        }
    }

    #[test]
    fn test_payload_applies_style() {
        let payload = FalImageService::payload(&ImageRequest {
            prompt: "team around a whiteboard".to_string(),
            style: "minimal".to_string(),
        });
        let prompt = payload["prompt"].as_str().unwrap();
        assert!(prompt.starts_with("Minimalist presentation background"));
        assert!(prompt.contains("team around a whiteboard"));
        assert_eq!(payload["image_size"], IMAGE_SIZE);
    }
}
