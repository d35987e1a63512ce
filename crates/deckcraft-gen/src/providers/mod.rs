//! Service registry
//!
//! Maps provider names to concrete service implementations and owns the
//! HTTP agent they share.

pub mod fal;
pub mod mock;
pub mod perplexity;

use crate::config::DeckcraftConfig;
use crate::service::{
    ContentRequest, ContentResponse, ContentService, ImageRequest, ImageResponse, ImageService,
    ServiceStatus,
};
use deckcraft_core::{DeckError, Result};
use std::sync::Arc;
use std::time::Duration;

/// Build the HTTP agent shared by every outbound service.
///
/// The agent pools connections and is safe to use from many threads.
/// Timeouts are set per call, not here.
pub fn build_agent() -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .max_idle_connections_per_host(4)
        .build();
    config.into()
}

/// Map a ureq failure onto the upstream error taxonomy
pub(crate) fn classify_error(service: &str, e: ureq::Error) -> DeckError {
    match e {
        ureq::Error::Timeout(_) => {
            DeckError::TransientUpstream(format!("{} request timed out", service))
        }
        ureq::Error::Io(_) | ureq::Error::ConnectionFailed | ureq::Error::HostNotFound => {
            DeckError::TransientUpstream(format!("{} unreachable: {}", service, e))
        }
        ureq::Error::StatusCode(code) if matches!(code, 429 | 500 | 502 | 503 | 504) => {
            DeckError::TransientUpstream(format!("{} returned HTTP {}", service, code))
        }
        ureq::Error::StatusCode(code) => {
            DeckError::InvalidResponse(format!("{} returned HTTP {}", service, code))
        }
        other => DeckError::InvalidResponse(format!("{} request failed: {}", service, other)),
    }
}

/// Create a content service by name
pub fn create_content_service(
    name: &str,
    config: &DeckcraftConfig,
    agent: &ureq::Agent,
) -> Result<Arc<dyn ContentService>> {
    if !config.is_enabled(name) {
        return Ok(Arc::new(Disabled::new(name)));
    }
    match name {
        "mock" => Ok(Arc::new(mock::MockContentService::new())),
        "perplexity" => Ok(Arc::new(perplexity::PerplexityService::from_config(
            config,
            agent.clone(),
        ))),
        _ => Err(DeckError::UnknownProvider(format!(
            "'{}' is not a content provider. Available: {}",
            name,
            content_providers().join(", ")
        ))),
    }
}

/// Create an image service by name
pub fn create_image_service(
    name: &str,
    config: &DeckcraftConfig,
    agent: &ureq::Agent,
) -> Result<Arc<dyn ImageService>> {
    if !config.is_enabled(name) {
        return Ok(Arc::new(Disabled::new(name)));
    }
    match name {
        "mock" => Ok(Arc::new(mock::MockImageService::new())),
        "fal" => Ok(Arc::new(fal::FalImageService::from_config(config, agent.clone()))),
        _ => Err(DeckError::UnknownProvider(format!(
            "'{}' is not an image provider. Available: {}",
            name,
            image_providers().join(", ")
        ))),
    }
}

pub fn content_providers() -> Vec<&'static str> {
    vec!["mock", "perplexity"]
}

pub fn image_providers() -> Vec<&'static str> {
    vec!["mock", "fal"]
}

/// The external-service clients of one process.
///
/// Built once at startup and handed to every pipeline run; dropped through
/// [`ServiceClients::shutdown`].
pub struct ServiceClients {
    pub content: Arc<dyn ContentService>,
    pub image: Arc<dyn ImageService>,
    agent: Option<ureq::Agent>,
}

impl ServiceClients {
    /// Wrap already-built services (tests, embedding applications)
    pub fn new(content: Arc<dyn ContentService>, image: Arc<dyn ImageService>) -> Self {
        Self {
            content,
            image,
            agent: None,
        }
    }

    /// Build the configured services around one shared agent.
    /// Explicit provider names override the config's defaults.
    pub fn from_config(
        config: &DeckcraftConfig,
        content_provider: Option<&str>,
        image_provider: Option<&str>,
    ) -> Result<Self> {
        let agent = build_agent();
        let content_name = content_provider.unwrap_or(&config.generation.content_provider);
        let image_name = image_provider.unwrap_or(&config.generation.image_provider);

        let content = create_content_service(content_name, config, &agent)?;
        let image = create_image_service(image_name, config, &agent)?;
        log::info!(
            "services ready: content={} ({}), image={} ({})",
            content.name(),
            content.status(),
            image.name(),
            image.status()
        );

        Ok(Self {
            content,
            image,
            agent: Some(agent),
        })
    }

    /// Release the services and their connection pool.
    ///
    /// Runs still holding clones of the services keep them alive until they
    /// finish; no new run can obtain them from here.
    pub fn shutdown(self) {
        log::info!(
            "shutting down services: content={}, image={}",
            self.content.name(),
            self.image.name()
        );
        drop(self.agent);
    }
}

/// Stand-in for a provider switched off in config; every call fails fast
#[derive(Debug)]
pub struct Disabled {
    name: String,
}

impl Disabled {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    fn refuse<T>(&self) -> Result<T> {
        Err(DeckError::Config(format!("provider '{}' is disabled", self.name)))
    }
}

impl ContentService for Disabled {
    fn name(&self) -> &str {
        &self.name
    }

    fn status(&self) -> ServiceStatus {
        ServiceStatus::Disabled
    }

    fn complete(&self, _request: &ContentRequest, _timeout: Duration) -> Result<ContentResponse> {
        self.refuse()
    }
}

impl ImageService for Disabled {
    fn name(&self) -> &str {
        &self.name
    }

    fn status(&self) -> ServiceStatus {
        ServiceStatus::Disabled
    }

    fn generate(&self, _request: &ImageRequest, _timeout: Duration) -> Result<ImageResponse> {
        self.refuse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;

    #[test]
    fn test_unknown_providers_rejected() {
        let config = DeckcraftConfig::default();
        let agent = build_agent();
        assert!(matches!(
            create_content_service("openai", &config, &agent),
            Err(DeckError::UnknownProvider(_))
        ));
        assert!(matches!(
            create_image_service("dalle", &config, &agent),
            Err(DeckError::UnknownProvider(_))
        ));
    }

    #[test]
    fn test_missing_key_is_not_fatal() {
        let config = DeckcraftConfig::default();
        let clients = ServiceClients::from_config(&config, None, None).unwrap();
        assert_eq!(clients.content.name(), "perplexity");
        assert_eq!(clients.image.name(), "fal");
        clients.shutdown();
    }

    #[test]
    fn test_disabled_provider_fails_fast() {
        let mut config = DeckcraftConfig::default();
        config.providers.insert(
            "fal".to_string(),
            ProviderConfig {
                enabled: false,
                ..Default::default()
            },
        );
        let agent = build_agent();
        let image = create_image_service("fal", &config, &agent).unwrap();
        assert_eq!(image.status(), ServiceStatus::Disabled);
        let request = ImageRequest {
            prompt: "office".to_string(),
            style: "professional".to_string(),
        };
        assert!(image.generate(&request, Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_overrides_pick_mock() {
        let config = DeckcraftConfig::default();
        let clients = ServiceClients::from_config(&config, Some("mock"), Some("mock")).unwrap();
        assert_eq!(clients.content.name(), "mock");
        assert_eq!(clients.image.status(), ServiceStatus::Available);
    }

    #[test]
    fn test_classify_status_codes() {
        assert!(matches!(
            classify_error("x", ureq::Error::StatusCode(503)),
            DeckError::TransientUpstream(_)
        ));
        assert!(matches!(
            classify_error("x", ureq::Error::StatusCode(429)),
            DeckError::TransientUpstream(_)
        ));
        assert!(matches!(
            classify_error("x", ureq::Error::StatusCode(401)),
            DeckError::InvalidResponse(_)
        ));
        assert!(matches!(
            classify_error("x", ureq::Error::ConnectionFailed),
            DeckError::TransientUpstream(_)
        ));
    }
}
