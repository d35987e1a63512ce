//! Deck generation pipeline
//!
//! Walks the slide catalog in order. Each slide asks the content generator
//! for text and the image selector for a background, then the next slide
//! starts after a pacing delay. A run-wide deadline bounds the whole deck:
//! once it passes, the remaining slides are filled with placeholders so the
//! deck always has one slide per catalog entry.
//!
//! One run occupies one thread. Independent runs may share an orchestrator
//! across threads; they share nothing mutable except the HTTP agent inside
//! the services.

use crate::catalog::{SlideCatalog, SlideSpec};
use crate::clock::{Clock, Deadline, SystemClock};
use crate::config::{DeckcraftConfig, PipelineConfig};
use crate::content::{ContentGenerator, ContentOutcome};
use crate::deck::{
    ContentStatus, DeckGenerationRequest, GeneratedSlide, GenerationResult, ImageSource,
    OverallStatus,
};
use crate::image::{ImageOutcome, ImageSelector};
use crate::providers::ServiceClients;
use crate::stock::StockImageIndex;
use crate::store::{DeckMetadata, DeckPersister};
use deckcraft_core::{DeckId, Result};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Where a slide is in its generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideState {
    Pending,
    ContentRequested,
    ContentOk,
    ContentDegraded,
    ImageRequested,
    ImageOk,
    ImageFallback,
    ImageNone,
    Assembled,
}

impl SlideState {
    pub fn after_content(status: ContentStatus) -> Self {
        match status {
            ContentStatus::Ok => SlideState::ContentOk,
            ContentStatus::Degraded => SlideState::ContentDegraded,
        }
    }

    pub fn after_image(source: ImageSource) -> Self {
        match source {
            ImageSource::Ai => SlideState::ImageOk,
            ImageSource::Stock => SlideState::ImageFallback,
            ImageSource::None => SlideState::ImageNone,
        }
    }

    /// Whether `self -> next` is a legal transition
    pub fn can_advance_to(self, next: SlideState) -> bool {
        use SlideState::*;
        matches!(
            (self, next),
            (Pending, ContentRequested)
                | (ContentRequested, ContentOk | ContentDegraded)
                | (ContentOk | ContentDegraded, ImageRequested)
                // image step skipped once the deadline has passed
                | (ContentOk | ContentDegraded, ImageNone)
                | (ImageRequested, ImageOk | ImageFallback | ImageNone)
                | (ImageOk | ImageFallback | ImageNone, Assembled)
        )
    }
}

impl fmt::Display for SlideState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SlideState::Pending => "PENDING",
            SlideState::ContentRequested => "CONTENT_REQUESTED",
            SlideState::ContentOk => "CONTENT_OK",
            SlideState::ContentDegraded => "CONTENT_DEGRADED",
            SlideState::ImageRequested => "IMAGE_REQUESTED",
            SlideState::ImageOk => "IMAGE_OK",
            SlideState::ImageFallback => "IMAGE_FALLBACK",
            SlideState::ImageNone => "IMAGE_NONE",
            SlideState::Assembled => "ASSEMBLED",
        };
        f.write_str(name)
    }
}

/// Per-slide state tracker
struct SlideRun<'a> {
    spec: &'a SlideSpec,
    state: SlideState,
}

impl<'a> SlideRun<'a> {
    fn new(spec: &'a SlideSpec) -> Self {
        Self {
            spec,
            state: SlideState::Pending,
        }
    }

    fn advance(&mut self, next: SlideState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        log::debug!(
            "slide {} '{}': {} -> {}",
            self.spec.order,
            self.spec.title,
            self.state,
            next
        );
        self.state = next;
    }
}

/// A generation result together with the id it was stored under
#[derive(Debug, Clone)]
pub struct GeneratedDeck {
    /// `None` if the persister rejected the deck
    pub deck_id: Option<DeckId>,
    pub result: GenerationResult,
}

/// Runs the generation pipeline over one slide catalog
pub struct PipelineOrchestrator {
    catalog: Arc<SlideCatalog>,
    content: ContentGenerator,
    images: ImageSelector,
    config: PipelineConfig,
    clock: Arc<dyn Clock>,
}

impl PipelineOrchestrator {
    pub fn new(
        catalog: Arc<SlideCatalog>,
        content: ContentGenerator,
        images: ImageSelector,
        config: PipelineConfig,
    ) -> Self {
        Self {
            catalog,
            content,
            images,
            config,
            clock: Arc::new(SystemClock),
        }
    }

    /// Wire an orchestrator from config and already-built service clients.
    ///
    /// Loads the configured catalog and stock index; a catalog that cannot
    /// be loaded is the one fatal error.
    pub fn from_config(
        config: &DeckcraftConfig,
        clients: &ServiceClients,
        template: Option<&str>,
    ) -> Result<Self> {
        let template = template.unwrap_or(&config.generation.template);
        let catalog = match &config.generation.catalog_path {
            Some(path) => SlideCatalog::load_from_file(path, template)?,
            None => SlideCatalog::load(template)?,
        };
        let stock = match &config.generation.stock_index_path {
            Some(path) => StockImageIndex::load(path)?,
            None => StockImageIndex::builtin(),
        };

        let pipeline = &config.pipeline;
        let content = ContentGenerator::new(
            clients.content.clone(),
            pipeline.max_tokens,
            pipeline.content_timeout(),
        );
        let images = ImageSelector::new(
            clients.image.clone(),
            Arc::new(stock),
            &config.generation.image_style,
            pipeline.image_timeout(),
        );
        Ok(Self::new(
            Arc::new(catalog),
            content,
            images,
            pipeline.clone(),
        ))
    }

    /// Replace the wall clock (tests)
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn catalog(&self) -> &SlideCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Generate a deck within the configured deadline
    pub fn run(&self, request: &DeckGenerationRequest) -> GenerationResult {
        self.run_with_deadline(request, self.config.deadline())
    }

    /// Generate a deck, stopping new work once `budget` has elapsed
    pub fn run_with_deadline(
        &self,
        request: &DeckGenerationRequest,
        budget: Duration,
    ) -> GenerationResult {
        let clock = self.clock.as_ref();
        let deadline = Deadline::after(clock, budget);
        let specs = self.catalog.slides();

        log::info!(
            "generating '{}' deck for {} ({} slides, content={}, images={})",
            self.catalog.template_id(),
            request.company_name,
            specs.len(),
            self.content.service_name(),
            if request.auto_populate_images {
                self.images.service_name()
            } else {
                "stock only"
            }
        );

        let mut slides = Vec::with_capacity(specs.len());
        let mut truncated = false;

        for spec in specs {
            if !slides.is_empty() {
                clock.sleep(deadline.clamp(clock, self.config.pacing()));
            }
            if deadline.is_expired(clock) {
                truncated = true;
                break;
            }
            let (slide, cut_short) = self.process_slide(spec, request, &deadline);
            slides.push(slide);
            if cut_short {
                truncated = true;
                break;
            }
        }

        if truncated {
            log::warn!(
                "deadline of {:?} reached after {} of {} slides; filling the rest with placeholders",
                budget,
                slides.len(),
                specs.len()
            );
            for spec in &specs[slides.len()..] {
                slides.push(placeholder_slide(spec));
            }
        }

        let overall_status = self.overall_status(&slides, truncated);
        let result = GenerationResult {
            slides,
            overall_status,
        };
        log::info!(
            "deck for {} finished: {} ({}/{} slides with generated content, {} AI images, {} stock)",
            request.company_name,
            result.overall_status,
            result.content_ok_count(),
            result.slides.len(),
            result.image_count(ImageSource::Ai),
            result.image_count(ImageSource::Stock)
        );
        result
    }

    /// Run the pipeline and hand the deck to `persister` exactly once.
    ///
    /// A persistence failure is logged; the generated slides are still
    /// returned.
    pub fn generate_and_store(
        &self,
        request: &DeckGenerationRequest,
        persister: &dyn DeckPersister,
    ) -> GeneratedDeck {
        let deck_id = DeckId::new();
        let result = self.run(request);
        let metadata = DeckMetadata::for_request(
            deck_id,
            request,
            self.catalog.template_id(),
            result.overall_status,
        );

        let deck_id = match persister.store(&result.slides, &metadata) {
            Ok(id) => Some(id),
            Err(e) => {
                log::error!("failed to store deck {}: {}", deck_id, e);
                None
            }
        };
        GeneratedDeck { deck_id, result }
    }

    /// Generate one slide. The flag is set if the deadline passed mid-slide.
    fn process_slide(
        &self,
        spec: &SlideSpec,
        request: &DeckGenerationRequest,
        deadline: &Deadline,
    ) -> (GeneratedSlide, bool) {
        let clock = self.clock.as_ref();
        let mut run = SlideRun::new(spec);

        run.advance(SlideState::ContentRequested);
        let timeout = deadline.clamp(clock, self.content.timeout());
        let content = self.content.generate_within(spec, request, timeout);
        run.advance(SlideState::after_content(content.status));

        let (image, cut_short) = if deadline.is_expired(clock) {
            (ImageOutcome::none(), true)
        } else {
            run.advance(SlideState::ImageRequested);
            let timeout = deadline.clamp(clock, self.images.timeout());
            let image = self
                .images
                .select_within(spec, request.auto_populate_images, timeout);
            (image, false)
        };
        run.advance(SlideState::after_image(image.source));
        run.advance(SlideState::Assembled);

        (assemble(spec, content, image), cut_short)
    }

    fn overall_status(&self, slides: &[GeneratedSlide], truncated: bool) -> OverallStatus {
        if truncated {
            return OverallStatus::TimedOut;
        }
        let ok = slides
            .iter()
            .filter(|s| s.content_status == ContentStatus::Ok)
            .count();
        if ok == slides.len() {
            OverallStatus::Complete
        } else if ok >= self.config.partial_threshold_for(self.catalog.len()) {
            OverallStatus::Partial
        } else {
            OverallStatus::Degraded
        }
    }
}

fn assemble(spec: &SlideSpec, content: ContentOutcome, image: ImageOutcome) -> GeneratedSlide {
    GeneratedSlide {
        title: spec.title.clone(),
        content: content.content,
        content_status: content.status,
        background_image: image.url,
        image_source: image.source,
        order: spec.order,
    }
}

/// A slide force-completed after the deadline
fn placeholder_slide(spec: &SlideSpec) -> GeneratedSlide {
    assemble(spec, ContentOutcome::degraded(&spec.title), ImageOutcome::none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DEFAULT_TEMPLATE;
    use crate::clock::ManualClock;
    use crate::deck::techstart_request;
    use crate::providers::mock::{MockContentService, MockFailure, MockImageService};
    use crate::sanitize::has_citation_marker;
    use crate::store::MemoryDeckStore;
    use deckcraft_core::DeckError;

    struct Harness {
        content: Arc<MockContentService>,
        image: Arc<MockImageService>,
        clock: Arc<ManualClock>,
        orchestrator: PipelineOrchestrator,
    }

    fn harness_with(
        content: MockContentService,
        image: MockImageService,
        clock: Arc<ManualClock>,
        config: PipelineConfig,
    ) -> Harness {
        let content = Arc::new(content);
        let image = Arc::new(image);
        let catalog = Arc::new(SlideCatalog::load(DEFAULT_TEMPLATE).unwrap());
        let orchestrator = PipelineOrchestrator::new(
            catalog,
            ContentGenerator::new(content.clone(), config.max_tokens, config.content_timeout()),
            ImageSelector::new(
                image.clone(),
                Arc::new(StockImageIndex::builtin()),
                "professional",
                config.image_timeout(),
            ),
            config,
        )
        .with_clock(clock.clone());
        Harness {
            content,
            image,
            clock,
            orchestrator,
        }
    }

    fn harness(content: MockContentService, image: MockImageService) -> Harness {
        harness_with(
            content,
            image,
            Arc::new(ManualClock::new()),
            PipelineConfig::default(),
        )
    }

    fn assert_structure(result: &GenerationResult, n: usize) {
        assert_eq!(result.slides.len(), n);
        for (i, slide) in result.slides.iter().enumerate() {
            assert_eq!(slide.order, i);
            assert!(!slide.content.is_empty());
        }
    }

    #[test]
    fn test_techstart_healthy_run() {
        let h = harness(MockContentService::new(), MockImageService::new());
        let result = h.orchestrator.run(&techstart_request());

        assert_structure(&result, 9);
        assert_eq!(result.overall_status, OverallStatus::Complete);
        for slide in &result.slides {
            assert_eq!(slide.content_status, ContentStatus::Ok);
            assert_eq!(slide.image_source, ImageSource::Ai);
            assert!(!has_citation_marker(&slide.content));
        }
        assert_eq!(h.content.calls(), 9);
        assert_eq!(h.image.calls(), 9);
    }

    #[test]
    fn test_pacing_only_between_slides() {
        let h = harness(MockContentService::new(), MockImageService::new());
        h.orchestrator.run(&techstart_request());
        // eight gaps for nine slides, no latency from the mocks
        assert_eq!(h.clock.elapsed(), Duration::from_millis(500) * 8);
    }

    #[test]
    fn test_slide_failures_are_isolated() {
        let h = harness(
            MockContentService::new().failing_on(&[2]),
            MockImageService::new().failing_on(&[5]),
        );
        let result = h.orchestrator.run(&techstart_request());

        assert_structure(&result, 9);
        let slides = &result.slides;
        assert_eq!(slides[2].content_status, ContentStatus::Degraded);
        assert!(slides[2].content.contains(&slides[2].title));
        assert_eq!(slides[1].content_status, ContentStatus::Ok);
        assert_eq!(slides[3].content_status, ContentStatus::Ok);

        assert_eq!(slides[5].image_source, ImageSource::Stock);
        assert_eq!(slides[4].image_source, ImageSource::Ai);
        assert_eq!(slides[6].image_source, ImageSource::Ai);

        // 8 of 9 >= default threshold of 7
        assert_eq!(result.overall_status, OverallStatus::Partial);
    }

    #[test]
    fn test_image_attempted_for_degraded_content() {
        let h = harness(
            MockContentService::new().always_failing(MockFailure::Error),
            MockImageService::new(),
        );
        let result = h.orchestrator.run(&techstart_request());
        assert_eq!(h.image.calls(), 9);
        assert!(result
            .slides
            .iter()
            .all(|s| s.image_source == ImageSource::Ai));
        assert_eq!(result.overall_status, OverallStatus::Degraded);
    }

    #[test]
    fn test_no_ai_calls_without_auto_populate() {
        let h = harness(MockContentService::new(), MockImageService::new());
        let mut request = techstart_request();
        request.auto_populate_images = false;

        let result = h.orchestrator.run(&request);
        assert_eq!(h.image.calls(), 0);
        assert!(result
            .slides
            .iter()
            .all(|s| matches!(s.image_source, ImageSource::Stock | ImageSource::None)));
        assert_eq!(result.overall_status, OverallStatus::Complete);
    }

    #[test]
    fn test_status_thresholds() {
        let h = harness(
            MockContentService::new().failing_on(&[0, 4]),
            MockImageService::new(),
        );
        assert_eq!(
            h.orchestrator.run(&techstart_request()).overall_status,
            OverallStatus::Partial
        );

        let h = harness(
            MockContentService::new().failing_on(&[0, 4, 8]),
            MockImageService::new(),
        );
        assert_eq!(
            h.orchestrator.run(&techstart_request()).overall_status,
            OverallStatus::Degraded
        );

        let config = PipelineConfig {
            partial_threshold: Some(5),
            ..Default::default()
        };
        let h = harness_with(
            MockContentService::new().failing_on(&[0, 4, 8]),
            MockImageService::new(),
            Arc::new(ManualClock::new()),
            config,
        );
        assert_eq!(
            h.orchestrator.run(&techstart_request()).overall_status,
            OverallStatus::Partial
        );
    }

    #[test]
    fn test_deadline_between_slides() {
        let clock = Arc::new(ManualClock::new());
        let config = PipelineConfig {
            pacing_ms: 0,
            deadline_secs: 30,
            ..Default::default()
        };
        // each slide takes exactly 10s, so the deadline lands between slides 2 and 3
        let h = harness_with(
            MockContentService::new().with_latency(clock.clone(), Duration::from_secs(9)),
            MockImageService::new().with_latency(clock.clone(), Duration::from_secs(1)),
            clock,
            config,
        );
        let result = h.orchestrator.run(&techstart_request());

        assert_structure(&result, 9);
        assert_eq!(result.overall_status, OverallStatus::TimedOut);
        for slide in &result.slides[..3] {
            assert_eq!(slide.content_status, ContentStatus::Ok);
            assert_eq!(slide.image_source, ImageSource::Ai);
        }
        for slide in &result.slides[3..] {
            assert_eq!(slide.content_status, ContentStatus::Degraded);
            assert_eq!(slide.image_source, ImageSource::None);
            assert!(slide.background_image.is_none());
        }
        assert_eq!(h.content.calls(), 3);
    }

    #[test]
    fn test_deadline_inside_slide() {
        let clock = Arc::new(ManualClock::new());
        let config = PipelineConfig {
            pacing_ms: 0,
            deadline_secs: 35,
            ..Default::default()
        };
        let h = harness_with(
            MockContentService::new().with_latency(clock.clone(), Duration::from_secs(10)),
            MockImageService::new(),
            clock.clone(),
            config,
        );
        let result = h.orchestrator.run(&techstart_request());

        assert_structure(&result, 9);
        assert_eq!(result.overall_status, OverallStatus::TimedOut);
        assert_eq!(result.content_ok_count(), 3);
        // the fourth call is cut to the 5s left, then images are skipped
        assert_eq!(h.content.calls(), 4);
        assert_eq!(h.image.calls(), 3);
        assert_eq!(clock.elapsed(), Duration::from_secs(35));
    }

    #[test]
    fn test_huge_deadline_still_returns_result() {
        let config = PipelineConfig {
            deadline_secs: u64::MAX,
            ..PipelineConfig::default()
        };
        let h = harness_with(
            MockContentService::new(),
            MockImageService::new(),
            Arc::new(ManualClock::new()),
            config,
        );
        let result = h.orchestrator.run(&techstart_request());
        assert_structure(&result, 9);
        assert_eq!(result.overall_status, OverallStatus::Complete);
    }

    #[test]
    fn test_slow_slide_times_out_alone() {
        let clock = Arc::new(ManualClock::new());
        let h = harness_with(
            MockContentService::new()
                .with_latency(clock.clone(), Duration::from_secs(1))
                .slow_on(4, Duration::from_secs(45)),
            MockImageService::new(),
            clock,
            PipelineConfig::default(),
        );
        let result = h.orchestrator.run(&techstart_request());
        assert_eq!(result.slides[4].content_status, ContentStatus::Degraded);
        assert_eq!(result.content_ok_count(), 8);
        assert_eq!(result.overall_status, OverallStatus::Partial);
    }

    #[test]
    fn test_generate_and_store_calls_persister_once() {
        let h = harness(
            MockContentService::new().failing_on(&[1]),
            MockImageService::new(),
        );
        let store = MemoryDeckStore::new();
        let deck = h
            .orchestrator
            .generate_and_store(&techstart_request(), &store);

        let id = deck.deck_id.unwrap();
        assert_eq!(store.writes(), 1);
        let stored = store.get(&id).unwrap();
        assert_eq!(stored.slides, deck.result.slides);
        assert_eq!(stored.metadata.title, "TechStart Pitch Deck");
        assert_eq!(stored.metadata.template_id, "startup_pitch");
        assert_eq!(stored.metadata.overall_status, OverallStatus::Partial);
    }

    #[test]
    fn test_timed_out_deck_is_still_stored() {
        let clock = Arc::new(ManualClock::new());
        let config = PipelineConfig {
            pacing_ms: 0,
            deadline_secs: 5,
            ..Default::default()
        };
        let h = harness_with(
            MockContentService::new().with_latency(clock.clone(), Duration::from_secs(10)),
            MockImageService::new(),
            clock,
            config,
        );
        let store = MemoryDeckStore::new();
        let deck = h
            .orchestrator
            .generate_and_store(&techstart_request(), &store);
        assert_eq!(deck.result.overall_status, OverallStatus::TimedOut);
        assert_eq!(store.writes(), 1);
        assert_eq!(store.get(&deck.deck_id.unwrap()).unwrap().slides.len(), 9);
    }

    struct FailingStore;

    impl DeckPersister for FailingStore {
        fn store(&self, _slides: &[GeneratedSlide], _metadata: &DeckMetadata) -> Result<DeckId> {
            Err(DeckError::Storage("disk full".to_string()))
        }
    }

    #[test]
    fn test_persister_failure_keeps_slides() {
        let h = harness(MockContentService::new(), MockImageService::new());
        let deck = h
            .orchestrator
            .generate_and_store(&techstart_request(), &FailingStore);
        assert!(deck.deck_id.is_none());
        assert_eq!(deck.result.slides.len(), 9);
    }

    #[test]
    fn test_concurrent_runs_are_independent() {
        let h = harness(
            MockContentService::new().failing_on(&[0]),
            MockImageService::new(),
        );
        let orchestrator = &h.orchestrator;

        let results: Vec<GenerationResult> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| orchestrator.run(&techstart_request())))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for result in &results {
            assert_structure(result, 9);
        }
        let ok: usize = results.iter().map(|r| r.content_ok_count()).sum();
        assert_eq!(ok, 4 * 9 - 1);
        assert_eq!(h.content.calls(), 36);
    }

    #[test]
    fn test_state_transitions() {
        use SlideState::*;
        assert!(Pending.can_advance_to(ContentRequested));
        assert!(!Pending.can_advance_to(ImageRequested));
        assert!(ContentDegraded.can_advance_to(ImageRequested));
        assert!(ImageFallback.can_advance_to(Assembled));
        assert!(!Assembled.can_advance_to(Pending));
        assert_eq!(
            SlideState::after_image(ImageSource::Stock),
            SlideState::ImageFallback
        );
        assert_eq!(ContentDegraded.to_string(), "CONTENT_DEGRADED");
    }

    #[test]
    fn test_from_config_with_mock_clients() {
        let config = DeckcraftConfig::default();
        let clients = ServiceClients::from_config(&config, Some("mock"), Some("mock")).unwrap();
        let orchestrator =
            PipelineOrchestrator::from_config(&config, &clients, Some("saas_pitch")).unwrap();
        assert_eq!(orchestrator.catalog().len(), 9);

        assert!(matches!(
            PipelineOrchestrator::from_config(&config, &clients, Some("creative_canvas")),
            Err(DeckError::CatalogLoad(_))
        ));
    }
}
