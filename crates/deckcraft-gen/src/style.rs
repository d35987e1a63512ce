//! Image style presets
//!
//! An image request names a style; the image provider expands it into
//! prompt text so every background in a deck shares one look.

use serde::{Deserialize, Serialize};

/// A named set of prompt fragments for slide backgrounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageStyle {
    pub name: String,
    #[serde(default)]
    pub prompt_prefix: Option<String>,
    #[serde(default)]
    pub prompt_suffix: Option<String>,
    /// Colors as hex strings
    #[serde(default)]
    pub palette: Vec<String>,
}

impl ImageStyle {
    /// Look up a built-in preset; unknown names fall back to "professional"
    pub fn preset(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "minimal" => Self::new(
                "minimal",
                "Minimalist presentation background",
                "Clean composition, generous negative space, soft neutral tones, no text",
                &["#FFFFFF", "#E5E7EB", "#111827"],
            ),
            "vibrant" => Self::new(
                "vibrant",
                "Bold, energetic presentation background",
                "Saturated colors, dynamic lighting, modern startup aesthetic, no text",
                &["#7C3AED", "#F59E0B", "#10B981"],
            ),
            _ => Self::new(
                "professional",
                "Professional business presentation background",
                "High quality corporate photography, subtle depth of field, suitable for overlaid text, no text or logos",
                &["#1E3A8A", "#F8FAFC", "#64748B"],
            ),
        }
    }

    fn new(name: &str, prefix: &str, suffix: &str, palette: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            prompt_prefix: Some(prefix.to_string()),
            prompt_suffix: Some(suffix.to_string()),
            palette: palette.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Wrap a subject prompt in the style's fragments
    pub fn enrich_prompt(&self, subject: &str) -> String {
        let mut parts = Vec::new();
        if let Some(prefix) = &self.prompt_prefix {
            parts.push(prefix.clone());
        }
        parts.push(subject.to_string());
        if !self.palette.is_empty() {
            parts.push(format!("Color palette: {}", self.palette.join(", ")));
        }
        if let Some(suffix) = &self.prompt_suffix {
            parts.push(suffix.clone());
        }
        parts.join(". ")
    }
}
