//! Slide background selection: AI image, then stock art, then nothing

use crate::catalog::SlideSpec;
use crate::deck::ImageSource;
use crate::service::{ImageRequest, ImageService};
use crate::stock::StockImageIndex;
use std::sync::Arc;
use std::time::Duration;

/// Result of choosing one slide's background
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageOutcome {
    pub url: Option<String>,
    pub source: ImageSource,
}

impl ImageOutcome {
    pub fn none() -> Self {
        Self {
            url: None,
            source: ImageSource::None,
        }
    }
}

/// Picks a background for each slide. Never fails.
pub struct ImageSelector {
    service: Arc<dyn ImageService>,
    stock: Arc<StockImageIndex>,
    style: String,
    timeout: Duration,
}

impl ImageSelector {
    pub fn new(
        service: Arc<dyn ImageService>,
        stock: Arc<StockImageIndex>,
        style: &str,
        timeout: Duration,
    ) -> Self {
        Self {
            service,
            stock,
            style: style.to_string(),
            timeout,
        }
    }

    pub fn service_name(&self) -> &str {
        self.service.name()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Image prompt for a slide; depends only on the slide spec
    pub fn prompt_for(spec: &SlideSpec) -> String {
        format!(
            "Background image for a pitch deck slide titled \"{}\", theme: {}",
            spec.title, spec.image_category
        )
    }

    /// Select with the default timeout
    pub fn select(&self, spec: &SlideSpec, auto_populate: bool) -> ImageOutcome {
        self.select_within(spec, auto_populate, self.timeout)
    }

    /// Select a background, giving the image service at most `timeout`.
    ///
    /// Without `auto_populate` the image service is never called.
    pub fn select_within(
        &self,
        spec: &SlideSpec,
        auto_populate: bool,
        timeout: Duration,
    ) -> ImageOutcome {
        if !auto_populate {
            return self.stock_lookup(spec);
        }

        let request = ImageRequest {
            prompt: Self::prompt_for(spec),
            style: self.style.clone(),
        };
        match self.service.generate(&request, timeout) {
            Ok(response) if !response.image_url.trim().is_empty() => ImageOutcome {
                url: Some(response.image_url.trim().to_string()),
                source: ImageSource::Ai,
            },
            Ok(_) => {
                log::warn!(
                    "image for slide {} '{}' falling back to stock: empty image URL",
                    spec.order,
                    spec.title
                );
                self.stock_lookup(spec)
            }
            Err(e) => {
                log::warn!(
                    "image for slide {} '{}' falling back to stock: {}",
                    spec.order,
                    spec.title,
                    e
                );
                self.stock_lookup(spec)
            }
        }
    }

    /// First stock image for the slide's category
    pub fn stock_lookup(&self, spec: &SlideSpec) -> ImageOutcome {
        match self.stock.first(&spec.image_category) {
            Some(image) => ImageOutcome {
                url: Some(image.url.clone()),
                source: ImageSource::Stock,
            },
            None => {
                log::debug!(
                    "no stock image for category '{}' (slide {})",
                    spec.image_category,
                    spec.order
                );
                ImageOutcome::none()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::{MockFailure, MockImageService};
    use crate::service::{ImageResponse, ServiceStatus};
    use deckcraft_core::Result;

    struct BlankUrlService;

    impl ImageService for BlankUrlService {
        fn name(&self) -> &str {
            "blank"
        }

        fn status(&self) -> ServiceStatus {
            ServiceStatus::Available
        }

        fn generate(&self, _request: &ImageRequest, _timeout: Duration) -> Result<ImageResponse> {
            Ok(ImageResponse {
                image_url: "   ".to_string(),
            })
        }
    }

    fn spec(category: &str) -> SlideSpec {
        SlideSpec {
            title: "Team".to_string(),
            prompt_template: "Introduce the team".to_string(),
            image_category: category.to_string(),
            order: 6,
        }
    }

    fn selector(service: Arc<MockImageService>) -> ImageSelector {
        ImageSelector::new(
            service,
            Arc::new(StockImageIndex::builtin()),
            "professional",
            Duration::from_secs(60),
        )
    }

    #[test]
    fn test_ai_image_on_success() {
        let service = Arc::new(MockImageService::new());
        let outcome = selector(service.clone()).select(&spec("team"), true);
        assert_eq!(outcome.source, ImageSource::Ai);
        assert!(outcome.url.unwrap().starts_with("https://images.deckcraft.test/"));
        assert_eq!(service.prompts()[0], ImageSelector::prompt_for(&spec("team")));
    }

    #[test]
    fn test_failure_falls_back_to_stock() {
        let service = Arc::new(MockImageService::new().always_failing(MockFailure::Error));
        let outcome = selector(service).select(&spec("team"), true);
        assert_eq!(outcome.source, ImageSource::Stock);
        assert_eq!(
            outcome.url.as_deref(),
            StockImageIndex::builtin().first("team").map(|i| i.url.as_str())
        );
    }

    #[test]
    fn test_empty_payload_falls_back_to_none_without_stock() {
        let service = Arc::new(MockImageService::new().always_failing(MockFailure::Empty));
        let outcome = selector(service).select(&spec("underwater"), true);
        assert_eq!(outcome, ImageOutcome::none());
    }

    #[test]
    fn test_blank_url_is_treated_as_empty_payload() {
        let selector = ImageSelector::new(
            Arc::new(BlankUrlService),
            Arc::new(StockImageIndex::builtin()),
            "professional",
            Duration::from_secs(60),
        );
        assert_eq!(selector.select(&spec("team"), true).source, ImageSource::Stock);
        assert_eq!(selector.select(&spec("underwater"), true), ImageOutcome::none());
    }

    #[test]
    fn test_no_auto_populate_never_calls_service() {
        let service = Arc::new(MockImageService::new());
        let selector = selector(service.clone());

        assert_eq!(selector.select(&spec("team"), false).source, ImageSource::Stock);
        assert_eq!(selector.select(&spec("underwater"), false).source, ImageSource::None);
        assert_eq!(service.calls(), 0);
    }
}
