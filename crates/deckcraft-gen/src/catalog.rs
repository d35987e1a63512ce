//! Slide catalog: the fixed, ordered slide specifications of a deck template
//!
//! Catalogs are parsed from TOML (the built-in file is embedded at compile
//! time) and validated once at startup. Any failure here is a
//! [`DeckError::CatalogLoad`], the only error that stops a deck from being
//! generated at all.

use crate::deck::REQUEST_FIELDS;
use deckcraft_core::{DeckError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

const BUILTIN_TEMPLATES: &str = include_str!("../catalog/templates.toml");

/// Template used when the caller does not pick one
pub const DEFAULT_TEMPLATE: &str = "startup_pitch";

pub(crate) static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid regex"));

/// One slide of a catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideSpec {
    pub title: String,
    /// Prompt with `{field}` placeholders filled from the request
    #[serde(rename = "prompt")]
    pub prompt_template: String,
    /// Stock index category used for fallback art
    pub image_category: String,
    pub order: usize,
}

/// Summary of a template, as listed to users
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Slide titles in order
    pub slides: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TemplateFile {
    #[serde(default)]
    template: Vec<TemplateDef>,
}

#[derive(Debug, Deserialize)]
struct TemplateDef {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    slide: Vec<SlideSpec>,
}

/// An immutable, validated, ordered list of slide specifications
#[derive(Debug, Clone)]
pub struct SlideCatalog {
    template_id: String,
    name: String,
    slides: Vec<SlideSpec>,
}

impl SlideCatalog {
    /// Load a built-in template
    pub fn load(template_id: &str) -> Result<Self> {
        Self::from_toml_str(BUILTIN_TEMPLATES, template_id)
    }

    /// Load a template from a catalog file on disk
    pub fn load_from_file(path: &Path, template_id: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DeckError::CatalogLoad(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content, template_id)
    }

    /// Parse a catalog file and pick one template out of it
    pub fn from_toml_str(content: &str, template_id: &str) -> Result<Self> {
        let file = parse_file(content)?;
        let def = file
            .template
            .into_iter()
            .find(|t| t.id == template_id)
            .ok_or_else(|| {
                DeckError::CatalogLoad(format!("unknown template '{}'", template_id))
            })?;
        let mut catalog = Self::from_specs(&def.id, def.slide)?;
        catalog.name = def.name;
        Ok(catalog)
    }

    /// Build a catalog from slide specs, validating order and placeholders
    pub fn from_specs(template_id: &str, mut slides: Vec<SlideSpec>) -> Result<Self> {
        if slides.is_empty() {
            return Err(DeckError::CatalogLoad(format!(
                "template '{}' has no slides",
                template_id
            )));
        }

        slides.sort_by_key(|s| s.order);
        for (i, spec) in slides.iter().enumerate() {
            if spec.order != i {
                return Err(DeckError::CatalogLoad(format!(
                    "template '{}': slide '{}' has order {}, expected {}",
                    template_id, spec.title, spec.order, i
                )));
            }
            if spec.title.trim().is_empty() {
                return Err(DeckError::CatalogLoad(format!(
                    "template '{}': slide {} has an empty title",
                    template_id, i
                )));
            }
            check_placeholders(template_id, spec)?;
        }

        Ok(Self {
            template_id: template_id.to_string(),
            name: template_id.to_string(),
            slides,
        })
    }

    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn slides(&self) -> &[SlideSpec] {
        &self.slides
    }

    pub fn get(&self, order: usize) -> Option<&SlideSpec> {
        self.slides.get(order)
    }

    /// Distinct image categories referenced by this catalog
    pub fn image_categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.slides
            .iter()
            .map(|s| s.image_category.as_str())
            .filter(|c| seen.insert(*c))
            .collect()
    }
}

/// List the built-in templates, including ones with no slides
pub fn templates() -> Result<Vec<TemplateInfo>> {
    let file = parse_file(BUILTIN_TEMPLATES)?;
    Ok(file
        .template
        .into_iter()
        .map(|t| {
            let mut slides = t.slide;
            slides.sort_by_key(|s| s.order);
            TemplateInfo {
                id: t.id,
                name: t.name,
                description: t.description,
                slides: slides.into_iter().map(|s| s.title).collect(),
            }
        })
        .collect())
}

fn parse_file(content: &str) -> Result<TemplateFile> {
    toml::from_str(content)
        .map_err(|e| DeckError::CatalogLoad(format!("failed to parse catalog: {}", e)))
}

fn check_placeholders(template_id: &str, spec: &SlideSpec) -> Result<()> {
    for cap in PLACEHOLDER.captures_iter(&spec.prompt_template) {
        let name = &cap[1];
        if !REQUEST_FIELDS.contains(&name) {
            return Err(DeckError::CatalogLoad(format!(
                "template '{}': slide '{}' uses unknown placeholder {{{}}}",
                template_id, spec.title, name
            )));
        }
    }
    Ok(())
}
