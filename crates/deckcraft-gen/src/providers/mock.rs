//! Mock services for testing and offline runs
//!
//! Both mocks answer without network calls. Failures and latency can be
//! scripted per call index; latency is charged to a [`ManualClock`] so
//! deadline behavior can be tested without waiting.

use crate::clock::{Clock, ManualClock};
use crate::service::{
    ContentRequest, ContentResponse, ContentService, ImageRequest, ImageResponse, ImageService,
    ServiceStatus,
};
use deckcraft_core::{DeckError, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How a scripted call fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// The service answers with an error status
    Error,
    /// The service answers successfully with an unusable payload
    Empty,
}

/// Per-call scripting shared by both mocks
#[derive(Default)]
struct Script {
    failures: HashMap<usize, MockFailure>,
    fail_all: Option<MockFailure>,
    latency: Option<(Arc<ManualClock>, Duration)>,
    slow_calls: HashMap<usize, Duration>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl Script {
    /// Record a call and apply latency. Returns the call index and the
    /// failure to report, if any.
    fn begin(&self, prompt: &str, timeout: Duration) -> Result<(usize, Option<MockFailure>)> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(prompt.to_string());

        if let Some((clock, base)) = &self.latency {
            let latency = self.slow_calls.get(&index).copied().unwrap_or(*base);
            if latency > timeout {
                clock.sleep(timeout);
                return Err(DeckError::TransientUpstream(format!(
                    "mock call {} timed out after {:?}",
                    index, timeout
                )));
            }
            clock.sleep(latency);
        }

        let failure = self.fail_all.or_else(|| self.failures.get(&index).copied());
        Ok((index, failure))
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

/// A content service that writes plausible slide text locally
#[derive(Default)]
pub struct MockContentService {
    script: Script,
}

impl MockContentService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the given call indices (0-based) with an error status
    pub fn failing_on(mut self, calls: &[usize]) -> Self {
        for &call in calls {
            self.script.failures.insert(call, MockFailure::Error);
        }
        self
    }

    /// Answer the given call indices with nothing but citation residue
    pub fn empty_on(mut self, calls: &[usize]) -> Self {
        for &call in calls {
            self.script.failures.insert(call, MockFailure::Empty);
        }
        self
    }

    /// Fail every call
    pub fn always_failing(mut self, failure: MockFailure) -> Self {
        self.script.fail_all = Some(failure);
        self
    }

    /// Charge `per_call` to `clock` on every call; calls slower than their
    /// timeout time out
    pub fn with_latency(mut self, clock: Arc<ManualClock>, per_call: Duration) -> Self {
        self.script.latency = Some((clock, per_call));
        self
    }

    /// Override the latency of one call (requires `with_latency`)
    pub fn slow_on(mut self, call: usize, latency: Duration) -> Self {
        self.script.slow_calls.insert(call, latency);
        self
    }

    pub fn calls(&self) -> usize {
        self.script.calls()
    }

    /// User prompts received, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.script.prompts()
    }
}

impl ContentService for MockContentService {
    fn name(&self) -> &str {
        "mock"
    }

    fn status(&self) -> ServiceStatus {
        ServiceStatus::Available
    }

    fn complete(&self, request: &ContentRequest, timeout: Duration) -> Result<ContentResponse> {
        let (index, failure) = self.script.begin(&request.prompt, timeout)?;
        match failure {
            Some(MockFailure::Error) => Err(DeckError::TransientUpstream(format!(
                "mock content service returned HTTP 503 on call {}",
                index
            ))),
            Some(MockFailure::Empty) => Ok(ContentResponse {
                text: "[1] [2]".to_string(),
                raw_citations: vec!["Source 1".to_string(), "Source 2".to_string()],
            }),
            None => Ok(ContentResponse {
                text: mock_text(&request.prompt),
                raw_citations: vec![
                    "https://example.com/market-report".to_string(),
                    "https://example.com/customer-survey".to_string(),
                ],
            }),
        }
    }
}

fn mock_text(prompt: &str) -> String {
    let subject = prompt.split('.').next().unwrap_or(prompt).trim();
    format!(
        "{}. Demand in this segment is accelerating [1], and early adopters report measurable gains within the first quarter of use [2]. \
According to recent research, the timing favours companies that move quickly and build durable customer relationships.\n\n\
Sources:\n1. https://example.com/market-report\n2. https://example.com/customer-survey",
        subject
    )
}

/// An image service that returns deterministic URLs
#[derive(Default)]
pub struct MockImageService {
    script: Script,
}

impl MockImageService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, calls: &[usize]) -> Self {
        for &call in calls {
            self.script.failures.insert(call, MockFailure::Error);
        }
        self
    }

    /// Answer the given call indices without an image URL
    pub fn empty_on(mut self, calls: &[usize]) -> Self {
        for &call in calls {
            self.script.failures.insert(call, MockFailure::Empty);
        }
        self
    }

    pub fn always_failing(mut self, failure: MockFailure) -> Self {
        self.script.fail_all = Some(failure);
        self
    }

    pub fn with_latency(mut self, clock: Arc<ManualClock>, per_call: Duration) -> Self {
        self.script.latency = Some((clock, per_call));
        self
    }

    pub fn slow_on(mut self, call: usize, latency: Duration) -> Self {
        self.script.slow_calls.insert(call, latency);
        self
    }

    pub fn calls(&self) -> usize {
        self.script.calls()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.script.prompts()
    }
}

impl ImageService for MockImageService {
    fn name(&self) -> &str {
        "mock"
    }

    fn status(&self) -> ServiceStatus {
        ServiceStatus::Available
    }

    fn generate(&self, request: &ImageRequest, timeout: Duration) -> Result<ImageResponse> {
        let (index, failure) = self.script.begin(&request.prompt, timeout)?;
        match failure {
            Some(MockFailure::Error) => Err(DeckError::TransientUpstream(format!(
                "mock image service returned HTTP 502 on call {}",
                index
            ))),
            Some(MockFailure::Empty) => Err(DeckError::InvalidResponse(
                "No image URL in response".to_string(),
            )),
            None => Ok(ImageResponse {
                image_url: format!(
                    "https://images.deckcraft.test/generated/{}-{}.png",
                    request.style, index
                ),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content_request(prompt: &str) -> ContentRequest {
        ContentRequest {
            prompt: prompt.to_string(),
            system_prompt: String::new(),
            max_tokens: 100,
        }
    }

    #[test]
    fn test_mock_content_echoes_subject() {
        let service = MockContentService::new();
        let response = service
            .complete(&content_request("Pitch TechStart. Extra detail"), Duration::from_secs(1))
            .unwrap();
        assert!(response.text.starts_with("Pitch TechStart."));
        assert!(response.text.contains("[1]"));
        assert_eq!(service.calls(), 1);
        assert_eq!(service.prompts(), vec!["Pitch TechStart. Extra detail"]);
    }

    #[test]
    fn test_mock_content_scripted_failures() {
        let service = MockContentService::new().failing_on(&[1]).empty_on(&[2]);
        let timeout = Duration::from_secs(1);
        assert!(service.complete(&content_request("a"), timeout).is_ok());
        assert!(service.complete(&content_request("b"), timeout).is_err());
        assert_eq!(
            service.complete(&content_request("c"), timeout).unwrap().text,
            "[1] [2]"
        );
        assert_eq!(service.calls(), 3);
    }

    #[test]
    fn test_mock_latency_and_timeout() {
        let clock = Arc::new(ManualClock::new());
        let service = MockContentService::new()
            .with_latency(clock.clone(), Duration::from_secs(2))
            .slow_on(1, Duration::from_secs(50));

        let start = clock.now();
        assert!(service
            .complete(&content_request("a"), Duration::from_secs(30))
            .is_ok());
        assert_eq!(clock.now() - start, Duration::from_secs(2));

        let err = service
            .complete(&content_request("b"), Duration::from_secs(30))
            .unwrap_err();
        assert!(matches!(err, DeckError::TransientUpstream(_)));
        assert_eq!(clock.now() - start, Duration::from_secs(32));
    }

    #[test]
    fn test_mock_image_urls_are_distinct() {
        let service = MockImageService::new();
        let request = ImageRequest {
            prompt: "office".to_string(),
            style: "professional".to_string(),
        };
        let a = service.generate(&request, Duration::from_secs(1)).unwrap();
        let b = service.generate(&request, Duration::from_secs(1)).unwrap();
        assert_ne!(a.image_url, b.image_url);
        assert!(a.image_url.contains("professional"));
    }

    #[test]
    fn test_mock_image_always_failing() {
        let service = MockImageService::new().always_failing(MockFailure::Empty);
        let request = ImageRequest {
            prompt: "office".to_string(),
            style: "professional".to_string(),
        };
        assert!(matches!(
            service.generate(&request, Duration::from_secs(1)),
            Err(DeckError::InvalidResponse(_))
        ));
    }
}
