//! Slide text generation
//!
//! Wraps a [`ContentService`] so that no upstream failure ever reaches the
//! orchestrator: every error becomes a degraded slide with placeholder text.

use crate::catalog::SlideSpec;
use crate::deck::{ContentStatus, DeckGenerationRequest};
use crate::sanitize::strip_citations;
use crate::service::{ContentRequest, ContentService};
use std::sync::Arc;
use std::time::Duration;

/// Instruction sent with every slide prompt
pub const SLIDE_SYSTEM_PROMPT: &str = "You are an expert pitch deck writer helping startups raise capital. \
Write clear, persuasive and professional slide copy for an investor audience. \
Be specific and data-driven where possible, avoid hype, and keep the text between 200 and 300 words. \
Do not include citation markers, footnotes or a list of sources.";

/// Text for a slide whose content could not be generated
pub fn placeholder(title: &str) -> String {
    format!("Unable to generate content for {}; please edit manually.", title)
}

/// Result of generating one slide's text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentOutcome {
    pub content: String,
    pub status: ContentStatus,
}

impl ContentOutcome {
    pub fn degraded(title: &str) -> Self {
        Self {
            content: placeholder(title),
            status: ContentStatus::Degraded,
        }
    }
}

/// Builds slide prompts and turns service answers into clean slide text
pub struct ContentGenerator {
    service: Arc<dyn ContentService>,
    max_tokens: u32,
    timeout: Duration,
}

impl ContentGenerator {
    pub fn new(service: Arc<dyn ContentService>, max_tokens: u32, timeout: Duration) -> Self {
        Self {
            service,
            max_tokens,
            timeout,
        }
    }

    pub fn service_name(&self) -> &str {
        self.service.name()
    }

    /// Default per-call timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Build the request sent to the content service for one slide
    pub fn build_request(&self, spec: &SlideSpec, request: &DeckGenerationRequest) -> ContentRequest {
        ContentRequest {
            prompt: request.fill(&spec.prompt_template),
            system_prompt: SLIDE_SYSTEM_PROMPT.to_string(),
            max_tokens: self.max_tokens,
        }
    }

    /// Generate a slide's text with the default timeout
    pub fn generate(&self, spec: &SlideSpec, request: &DeckGenerationRequest) -> ContentOutcome {
        self.generate_within(spec, request, self.timeout)
    }

    /// Generate a slide's text, giving the service at most `timeout`.
    ///
    /// Never fails. No retries.
    pub fn generate_within(
        &self,
        spec: &SlideSpec,
        request: &DeckGenerationRequest,
        timeout: Duration,
    ) -> ContentOutcome {
        let content_request = self.build_request(spec, request);

        let response = match self.service.complete(&content_request, timeout) {
            Ok(response) => response,
            Err(e) => {
                log::warn!(
                    "content for slide {} '{}' degraded: {}",
                    spec.order,
                    spec.title,
                    e
                );
                return ContentOutcome::degraded(&spec.title);
            }
        };

        match strip_citations(&response.text) {
            Some(content) => {
                log::debug!(
                    "slide {} '{}': {} chars, {} citations stripped",
                    spec.order,
                    spec.title,
                    content.len(),
                    response.raw_citations.len()
                );
                ContentOutcome {
                    content,
                    status: ContentStatus::Ok,
                }
            }
            None => {
                log::warn!(
                    "content for slide {} '{}' degraded: response was only citation residue",
                    spec.order,
                    spec.title
                );
                ContentOutcome::degraded(&spec.title)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{SlideCatalog, DEFAULT_TEMPLATE};
    use crate::deck::techstart_request;
    use crate::providers::mock::{MockContentService, MockFailure};
    use crate::sanitize::has_citation_marker;

    fn generator(service: Arc<MockContentService>) -> ContentGenerator {
        ContentGenerator::new(service, 800, Duration::from_secs(30))
    }

    #[test]
    fn test_successful_content_is_clean() {
        let service = Arc::new(MockContentService::new());
        let catalog = SlideCatalog::load(DEFAULT_TEMPLATE).unwrap();
        let spec = catalog.get(0).unwrap();

        let outcome = generator(service.clone()).generate(spec, &techstart_request());
        assert_eq!(outcome.status, ContentStatus::Ok);
        assert!(!has_citation_marker(&outcome.content));
        assert!(!outcome.content.contains("According to"));
        assert!(!outcome.content.contains("Sources:"));
        assert!(outcome.content.contains("TechStart"));
    }

    #[test]
    fn test_prompt_is_filled_from_request() {
        let service = Arc::new(MockContentService::new());
        let catalog = SlideCatalog::load(DEFAULT_TEMPLATE).unwrap();
        let generator = generator(service.clone());
        let built = generator.build_request(catalog.get(1).unwrap(), &techstart_request());

        assert!(built.prompt.contains("TechStart"));
        assert!(built.prompt.contains("AI-powered productivity tools"));
        assert!(!built.prompt.contains('{'));
        assert_eq!(built.max_tokens, 800);
        assert!(built.system_prompt.contains("200 and 300 words"));
    }

    #[test]
    fn test_failure_yields_placeholder() {
        let service = Arc::new(MockContentService::new().always_failing(MockFailure::Error));
        let catalog = SlideCatalog::load(DEFAULT_TEMPLATE).unwrap();
        let spec = catalog.get(3).unwrap();

        let outcome = generator(service).generate(spec, &techstart_request());
        assert_eq!(outcome.status, ContentStatus::Degraded);
        assert_eq!(
            outcome.content,
            "Unable to generate content for Business Model; please edit manually."
        );
    }

    #[test]
    fn test_residue_only_response_is_degraded() {
        let service = Arc::new(MockContentService::new().always_failing(MockFailure::Empty));
        let catalog = SlideCatalog::load(DEFAULT_TEMPLATE).unwrap();
        let spec = catalog.get(0).unwrap();

        let outcome = generator(service).generate(spec, &techstart_request());
        assert_eq!(outcome.status, ContentStatus::Degraded);
        assert!(outcome.content.contains("Problem Statement"));
    }

    #[test]
    fn test_no_retry_on_failure() {
        let service = Arc::new(MockContentService::new().failing_on(&[0]));
        let catalog = SlideCatalog::load(DEFAULT_TEMPLATE).unwrap();
        let outcome = generator(service.clone()).generate(catalog.get(0).unwrap(), &techstart_request());
        assert_eq!(outcome.status, ContentStatus::Degraded);
        assert_eq!(service.calls(), 1);
    }
}
