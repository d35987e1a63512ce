//! DeckCraft Gen - pitch deck auto-generation pipeline
//!
//! Turns a short business description into a complete investor deck by
//! walking a fixed slide catalog, asking an external content service for
//! each slide's text and an image service (or the stock index) for its
//! background. Upstream failures degrade individual slides; they never
//! abort the deck.

pub mod catalog;
pub mod clock;
pub mod config;
pub mod content;
pub mod deck;
pub mod health;
pub mod image;
pub mod pipeline;
pub mod providers;
pub mod research;
pub mod sanitize;
pub mod service;
pub mod stock;
pub mod store;
pub mod style;

pub use catalog::{SlideCatalog, SlideSpec, TemplateInfo};
pub use clock::{Clock, Deadline, ManualClock, SystemClock};
pub use config::{DeckcraftConfig, PipelineConfig};
pub use content::{ContentGenerator, ContentOutcome};
pub use deck::{
    ContentStatus, DeckGenerationRequest, GeneratedSlide, GenerationResult, ImageSource,
    OverallStatus,
};
pub use health::HealthReport;
pub use image::{ImageOutcome, ImageSelector};
pub use pipeline::{GeneratedDeck, PipelineOrchestrator, SlideState};
pub use providers::ServiceClients;
pub use research::{ResearchKind, ResearchQuery, ResearchReport};
pub use service::{ContentService, ImageService};
pub use stock::{StockImage, StockImageIndex};
pub use store::{DeckMetadata, DeckPersister, FileDeckStore, MemoryDeckStore, StoredDeck};
