//! Research queries
//!
//! Free-form market, competitor and copywriting research sent through the
//! same content service the pipeline uses. Unlike slide text, research
//! keeps its citations and reports upstream failures to the caller.

use crate::service::{ContentRequest, ContentService};
use deckcraft_core::{DeckError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

const MARKET_SYSTEM_PROMPT: &str = "You are a senior market research analyst providing comprehensive market intelligence for pitch deck development. \
Provide detailed, data-driven insights with specific metrics, trends, and actionable intelligence. \
Include market size, growth rates, key trends, target demographics, market drivers, and challenges. \
Focus on recent data and specific statistics.";

const COMPETITIVE_SYSTEM_PROMPT: &str = "You are a competitive intelligence analyst providing detailed competitive analysis for business strategy development. \
Identify key competitors, analyze market positioning, assess competitive advantages and threats, and provide market share insights. \
Focus on actionable competitive intelligence.";

const CONTENT_SYSTEM_PROMPT: &str = "You are a professional pitch deck consultant creating compelling content for investors and business audiences. \
Generate persuasive, data-driven content that effectively communicates key business messages. \
Structure the content with clear key points, supporting evidence, and actionable recommendations.";

pub const DEFAULT_RESEARCH_TOKENS: u32 = 2000;

/// Kind of research query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResearchKind {
    MarketAnalysis,
    CompetitiveAnalysis,
    ContentGeneration,
}

impl ResearchKind {
    pub fn system_prompt(&self) -> &'static str {
        match self {
            ResearchKind::MarketAnalysis => MARKET_SYSTEM_PROMPT,
            ResearchKind::CompetitiveAnalysis => COMPETITIVE_SYSTEM_PROMPT,
            ResearchKind::ContentGeneration => CONTENT_SYSTEM_PROMPT,
        }
    }
}

impl fmt::Display for ResearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResearchKind::MarketAnalysis => write!(f, "market_analysis"),
            ResearchKind::CompetitiveAnalysis => write!(f, "competitive_analysis"),
            ResearchKind::ContentGeneration => write!(f, "content_generation"),
        }
    }
}

impl FromStr for ResearchKind {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "market" | "market_analysis" | "market_research" => Ok(ResearchKind::MarketAnalysis),
            "competitive" | "competitive_analysis" => Ok(ResearchKind::CompetitiveAnalysis),
            "content" | "content_generation" => Ok(ResearchKind::ContentGeneration),
            other => Err(DeckError::Config(format!(
                "unknown research type '{}' (expected market, competitive or content)",
                other
            ))),
        }
    }
}

/// A research question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchQuery {
    pub kind: ResearchKind,
    pub query: String,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default = "default_tokens")]
    pub max_tokens: u32,
}

fn default_tokens() -> u32 {
    DEFAULT_RESEARCH_TOKENS
}

impl ResearchQuery {
    pub fn new(kind: ResearchKind, query: &str) -> Self {
        Self {
            kind,
            query: query.to_string(),
            industry: None,
            company: None,
            max_tokens: DEFAULT_RESEARCH_TOKENS,
        }
    }

    /// The user prompt sent to the content service
    pub fn prompt(&self) -> String {
        let industry = self.industry.as_deref().filter(|s| !s.trim().is_empty());
        let company = self.company.as_deref().filter(|s| !s.trim().is_empty());
        match self.kind {
            ResearchKind::MarketAnalysis => format!(
                "Conduct comprehensive market research analysis for the {} industry. {}",
                industry.unwrap_or("specified"),
                self.query
            ),
            ResearchKind::CompetitiveAnalysis => format!(
                "Analyze the competitive landscape for {} in the {} industry. {}",
                company.unwrap_or("the specified company"),
                industry.unwrap_or("target"),
                self.query
            ),
            ResearchKind::ContentGeneration => {
                format!("Create compelling pitch deck content: {}", self.query)
            }
        }
    }

    pub fn to_request(&self) -> ContentRequest {
        ContentRequest {
            prompt: self.prompt(),
            system_prompt: self.kind.system_prompt().to_string(),
            max_tokens: self.max_tokens,
        }
    }
}

/// Answer to a research query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchReport {
    pub research_type: ResearchKind,
    pub content: String,
    pub citations: Vec<String>,
    pub provider: String,
    /// RFC 3339 timestamp
    pub timestamp: String,
}

/// Run one research query
pub fn run_research(
    service: &dyn ContentService,
    query: &ResearchQuery,
    timeout: Duration,
) -> Result<ResearchReport> {
    if query.query.trim().is_empty() {
        return Err(DeckError::Config("research query is empty".to_string()));
    }
    log::info!("running {} research via {}", query.kind, service.name());
    let response = service.complete(&query.to_request(), timeout)?;
    Ok(ResearchReport {
        research_type: query.kind,
        content: response.text,
        citations: response.raw_citations,
        provider: service.name().to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
