//! Layered configuration system
//!
//! Config is loaded with three layers of precedence (highest wins):
//! 1. Environment variables: `DECKCRAFT_{PROVIDER}_API_KEY`
//! 2. Project-local: `.deckcraft/config.toml`
//! 3. Global: `~/.deckcraft/config.toml`

use deckcraft_core::{DeckError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Provider names that accept an API key from the environment
pub const KEYED_PROVIDERS: [&str; 2] = ["perplexity", "fal"];

/// Provider-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_url: Option<String>,
    /// Model name, for providers that take one
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: None,
            model: None,
            enabled: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// A `[providers.<name>]` table as written in one config file. Keys that
/// are left out keep the value from a lower layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfigFile {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

/// Which services and template a generation uses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_content_provider")]
    pub content_provider: String,
    #[serde(default = "default_image_provider")]
    pub image_provider: String,
    #[serde(default = "default_image_style")]
    pub image_style: String,
    #[serde(default = "default_template")]
    pub template: String,
    /// Optional catalog file replacing the built-in templates
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    /// Optional stock index file replacing the built-in index
    #[serde(default)]
    pub stock_index_path: Option<PathBuf>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            content_provider: default_content_provider(),
            image_provider: default_image_provider(),
            image_style: default_image_style(),
            template: default_template(),
            catalog_path: None,
            stock_index_path: None,
        }
    }
}

fn default_content_provider() -> String {
    "perplexity".to_string()
}
fn default_image_provider() -> String {
    "fal".to_string()
}
fn default_image_style() -> String {
    "professional".to_string()
}
fn default_template() -> String {
    crate::catalog::DEFAULT_TEMPLATE.to_string()
}

/// Timing and quality knobs of the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Wait between one slide's completion and the next slide's first call
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,
    /// Budget for a whole run
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
    #[serde(default = "default_content_timeout_secs")]
    pub content_timeout_secs: u64,
    #[serde(default = "default_image_timeout_secs")]
    pub image_timeout_secs: u64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Minimum slides with generated content for a `partial` result.
    /// Defaults to the catalog size minus two.
    #[serde(default)]
    pub partial_threshold: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pacing_ms: default_pacing_ms(),
            deadline_secs: default_deadline_secs(),
            content_timeout_secs: default_content_timeout_secs(),
            image_timeout_secs: default_image_timeout_secs(),
            max_tokens: default_max_tokens(),
            partial_threshold: None,
        }
    }
}

fn default_pacing_ms() -> u64 {
    500
}
fn default_deadline_secs() -> u64 {
    180
}
fn default_content_timeout_secs() -> u64 {
    30
}
fn default_image_timeout_secs() -> u64 {
    60
}
fn default_max_tokens() -> u32 {
    800
}

impl PipelineConfig {
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }

    pub fn content_timeout(&self) -> Duration {
        Duration::from_secs(self.content_timeout_secs)
    }

    pub fn image_timeout(&self) -> Duration {
        Duration::from_secs(self.image_timeout_secs)
    }

    /// Effective partial threshold for a catalog of `catalog_len` slides
    pub fn partial_threshold_for(&self, catalog_len: usize) -> usize {
        self.partial_threshold
            .unwrap_or_else(|| catalog_len.saturating_sub(2))
            .min(catalog_len)
    }
}

/// Where stored decks live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_decks_dir")]
    pub decks_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            decks_dir: default_decks_dir(),
        }
    }
}

fn default_decks_dir() -> PathBuf {
    PathBuf::from(".deckcraft/decks")
}

/// Top-level config file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeckcraftConfigFile {
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfigFile>,
    #[serde(default)]
    pub generation: Option<GenerationConfig>,
    #[serde(default)]
    pub pipeline: Option<PipelineConfig>,
    #[serde(default)]
    pub storage: Option<StorageConfig>,
}

/// Resolved configuration with environment variable overrides applied
#[derive(Debug, Clone, Default)]
pub struct DeckcraftConfig {
    pub providers: HashMap<String, ProviderConfig>,
    pub generation: GenerationConfig,
    pub pipeline: PipelineConfig,
    pub storage: StorageConfig,
}

impl DeckcraftConfig {
    /// Load config with layered precedence: global < project < env vars
    pub fn load() -> Result<Self> {
        let mut config = DeckcraftConfig::default();

        // Layer 1: Global config (~/.deckcraft/config.toml)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                config.merge(Self::load_file(&global_path)?);
            }
        }

        // Layer 2: Project-local config (.deckcraft/config.toml)
        let local_path = PathBuf::from(".deckcraft/config.toml");
        if local_path.exists() {
            config.merge(Self::load_file(&local_path)?);
        }

        // Layer 3: Environment variable overrides
        config.apply_env_overrides();
        log::debug!(
            "config loaded: content={} image={} template={}",
            config.generation.content_provider,
            config.generation.image_provider,
            config.generation.template
        );
        Ok(config)
    }

    /// Load config from a specific file path only (for testing)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let mut config = DeckcraftConfig::default();
        config.merge(Self::load_file(path)?);
        config.apply_env_overrides();
        Ok(config)
    }

    /// Get API key for a provider
    pub fn api_key(&self, provider_name: &str) -> Option<&str> {
        self.providers
            .get(provider_name)
            .and_then(|p| p.api_key.as_deref())
            .filter(|k| !k.trim().is_empty())
    }

    /// Get API URL override for a provider
    pub fn api_url(&self, provider_name: &str) -> Option<&str> {
        self.providers
            .get(provider_name)
            .and_then(|p| p.api_url.as_deref())
    }

    pub fn model(&self, provider_name: &str) -> Option<&str> {
        self.providers
            .get(provider_name)
            .and_then(|p| p.model.as_deref())
    }

    /// Check if a provider is enabled
    pub fn is_enabled(&self, provider_name: &str) -> bool {
        self.providers
            .get(provider_name)
            .map(|p| p.enabled)
            .unwrap_or(true)
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".deckcraft").join("config.toml"))
    }

    fn load_file(path: &Path) -> Result<DeckcraftConfigFile> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            DeckError::Config(format!("Failed to parse config {}: {}", path.display(), e))
        })
    }

    fn merge(&mut self, overlay: DeckcraftConfigFile) {
        for (name, provider) in overlay.providers {
            let entry = self.providers.entry(name).or_default();
            if provider.api_key.is_some() {
                entry.api_key = provider.api_key;
            }
            if provider.api_url.is_some() {
                entry.api_url = provider.api_url;
            }
            if provider.model.is_some() {
                entry.model = provider.model;
            }
            if let Some(enabled) = provider.enabled {
                entry.enabled = enabled;
            }
        }

        // Sections replace wholesale; a section's omitted keys take defaults.
        if let Some(generation) = overlay.generation {
            self.generation = generation;
        }
        if let Some(pipeline) = overlay.pipeline {
            self.pipeline = pipeline;
        }
        if let Some(storage) = overlay.storage {
            self.storage = storage;
        }
    }

    fn apply_env_overrides(&mut self) {
        for name in KEYED_PROVIDERS {
            let env_key = format!("DECKCRAFT_{}_API_KEY", name.to_uppercase());
            if let Ok(key) = std::env::var(&env_key) {
                let entry = self.providers.entry(name.to_string()).or_default();
                entry.api_key = Some(key);
            }
        }
    }
}
