//! Stock image index: static category -> image mapping used as fallback art

use deckcraft_core::{DeckError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// A stock image descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockImage {
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct StockFile {
    #[serde(default)]
    category: HashMap<String, Vec<StockImage>>,
}

/// Read-only lookup from image category to ordered stock images
#[derive(Debug, Clone, Default)]
pub struct StockImageIndex {
    categories: HashMap<String, Vec<StockImage>>,
}

impl StockImageIndex {
    /// The built-in index covering every category used by the built-in templates
    pub fn builtin() -> Self {
        let mut categories = HashMap::new();
        for (category, images) in BUILTIN {
            let entries = images
                .iter()
                .map(|(id, title, tags)| StockImage {
                    url: unsplash_url(id),
                    title: title.to_string(),
                    tags: tags.iter().map(|t| t.to_string()).collect(),
                })
                .collect();
            categories.insert(category.to_string(), entries);
        }
        Self { categories }
    }

    /// Parse an index from TOML:
    ///
    /// ```toml
    /// [[category.business]]
    /// url = "https://..."
    /// title = "Office"
    /// tags = ["office"]
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: StockFile = toml::from_str(content)?;
        Ok(Self {
            categories: file
                .category
                .into_iter()
                .map(|(name, images)| (name.to_lowercase(), images))
                .collect(),
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| {
            DeckError::Config(format!("invalid stock index {}: {}", path.display(), e))
        })
    }

    /// All images for a category, in index order
    pub fn images(&self, category: &str) -> &[StockImage] {
        self.categories
            .get(&category.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// First image for a category, if any
    pub fn first(&self, category: &str) -> Option<&StockImage> {
        self.images(category).first()
    }

    pub fn categories(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.categories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

fn unsplash_url(photo_id: &str) -> String {
    format!(
        "https://images.unsplash.com/{}?auto=format&fit=crop&w=1920&h=1080&q=80",
        photo_id
    )
}

type BuiltinEntry = (&'static str, &'static str, &'static [&'static str]);

const BUILTIN: &[(&str, &[BuiltinEntry])] = &[
    (
        "business",
        &[
            ("photo-1497366216548-37526070297c", "Modern office space", &["office", "workspace"]),
            ("photo-1552664730-d307ca884978", "Team meeting", &["meeting", "collaboration"]),
        ],
    ),
    (
        "technology",
        &[
            ("photo-1518770660439-4636190af475", "Circuit board", &["hardware", "tech"]),
            ("photo-1488590528505-98d2b5aba04b", "Laptop workspace", &["software", "laptop"]),
        ],
    ),
    (
        "market",
        &[
            ("photo-1460925895917-afdab827c52f", "Analytics dashboard", &["charts", "data"]),
            ("photo-1526304640581-d334cdbbf45e", "City skyline", &["economy", "scale"]),
        ],
    ),
    (
        "finance",
        &[
            ("photo-1554224155-6726b3ff858f", "Financial documents", &["numbers", "planning"]),
            ("photo-1579532537598-459ecdaf39cc", "Stock chart", &["investment", "chart"]),
        ],
    ),
    (
        "growth",
        &[
            ("photo-1533750349088-cd871a92f312", "Upward trend", &["growth", "metrics"]),
            ("photo-1504868584819-f8e8b4b6d7e3", "Growth chart", &["traction", "kpi"]),
        ],
    ),
    (
        "competition",
        &[
            ("photo-1461896836934-ffe607ba8211", "Race track", &["race", "competition"]),
            ("photo-1529699211952-734e80c4d42b", "Chess pieces", &["strategy"]),
        ],
    ),
    (
        "team",
        &[
            ("photo-1522071820081-009f0129c71c", "Team collaboration", &["people", "team"]),
            ("photo-1600880292203-757bb62b4baf", "Founders at work", &["founders"]),
        ],
    ),
    (
        "funding",
        &[
            ("photo-1559526324-4b87b5e36e44", "Handshake", &["deal", "investment"]),
            ("photo-1565514020179-026b92b84bb6", "Coins and growth", &["capital"]),
        ],
    ),
    (
        "product",
        &[
            ("photo-1551650975-87deedd944c3", "Product on screen", &["app", "demo"]),
        ],
    ),
];
