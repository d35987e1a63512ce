//! Request and result types of the deck generation pipeline

use crate::catalog::PLACEHOLDER;
use regex::Captures;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Names accepted as `{placeholder}` in slide prompt templates.
pub const REQUEST_FIELDS: [&str; 5] = [
    "company_name",
    "industry",
    "business_description",
    "target_audience",
    "funding_stage",
];

/// A caller's description of the business the deck is for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckGenerationRequest {
    pub company_name: String,
    pub industry: String,
    pub business_description: String,
    pub target_audience: String,
    pub funding_stage: String,
    /// Ask the image service for AI backgrounds; stock art otherwise
    #[serde(default = "default_true")]
    pub auto_populate_images: bool,
}

fn default_true() -> bool {
    true
}

impl DeckGenerationRequest {
    /// Look up a request field by its placeholder name
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "company_name" => Some(&self.company_name),
            "industry" => Some(&self.industry),
            "business_description" => Some(&self.business_description),
            "target_audience" => Some(&self.target_audience),
            "funding_stage" => Some(&self.funding_stage),
            _ => None,
        }
    }

    /// Replace every `{field}` in `template` with the request's value
    ///
    /// Substituted values are never scanned again.
    pub fn fill(&self, template: &str) -> String {
        PLACEHOLDER
            .replace_all(template, |caps: &Captures| match self.field(&caps[1]) {
                Some(value) => value.trim().to_string(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Title used when the deck is stored
    pub fn deck_title(&self) -> String {
        format!("{} Pitch Deck", self.company_name.trim())
    }
}

/// Whether a slide's text came from the content service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    Ok,
    Degraded,
}

/// Where a slide's background image came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSource {
    Ai,
    Stock,
    None,
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Ai => write!(f, "ai"),
            ImageSource::Stock => write!(f, "stock"),
            ImageSource::None => write!(f, "none"),
        }
    }
}

/// Quality of a whole generation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    /// Every slide has generated content
    Complete,
    /// At least the partial threshold of slides has generated content
    Partial,
    /// Fewer slides than the partial threshold have generated content.
    /// Consumers that only know `complete`, `partial` and `timed_out`
    /// will see this fourth value too.
    Degraded,
    /// The pipeline deadline cut processing short
    TimedOut,
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverallStatus::Complete => write!(f, "complete"),
            OverallStatus::Partial => write!(f, "partial"),
            OverallStatus::Degraded => write!(f, "degraded"),
            OverallStatus::TimedOut => write!(f, "timed_out"),
        }
    }
}

/// One assembled slide
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedSlide {
    pub title: String,
    pub content: String,
    pub content_status: ContentStatus,
    #[serde(default)]
    pub background_image: Option<String>,
    pub image_source: ImageSource,
    pub order: usize,
}

/// Output of one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// One entry per catalog slide, in catalog order
    pub slides: Vec<GeneratedSlide>,
    pub overall_status: OverallStatus,
}

impl GenerationResult {
    /// Number of slides whose content came from the content service
    pub fn content_ok_count(&self) -> usize {
        self.slides
            .iter()
            .filter(|s| s.content_status == ContentStatus::Ok)
            .count()
    }

    /// Count slides by image source
    pub fn image_count(&self, source: ImageSource) -> usize {
        self.slides
            .iter()
            .filter(|s| s.image_source == source)
            .count()
    }
}

#[cfg(test)]
pub(crate) fn techstart_request() -> DeckGenerationRequest {
    DeckGenerationRequest {
        company_name: "TechStart".to_string(),
        industry: "technology".to_string(),
        business_description: "AI-powered productivity tools".to_string(),
        target_audience: "investors".to_string(),
        funding_stage: "seed".to_string(),
        auto_populate_images: true,
    }
}
