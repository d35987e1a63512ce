//! Deck persistence
//!
//! The pipeline hands every assembled deck to a [`DeckPersister`] exactly
//! once. File-backed decks are stored as `.deck.json` files in
//! `.deckcraft/decks/`; the in-memory store is for tests and embedding.

use crate::config::StorageConfig;
use crate::deck::{DeckGenerationRequest, GeneratedSlide, OverallStatus, REQUEST_FIELDS};
use deckcraft_core::{ContentHash, DeckError, DeckId, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

const DECK_EXTENSION: &str = ".deck.json";

/// Descriptive fields stored with a deck
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckMetadata {
    /// Allocated before generation; storing twice overwrites the same record
    pub deck_id: DeckId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub template_id: String,
    pub overall_status: OverallStatus,
    /// `sha256:` fingerprint of the request fields
    pub request_hash: String,
    /// RFC 3339 timestamp
    pub created_at: String,
}

impl DeckMetadata {
    pub fn for_request(
        deck_id: DeckId,
        request: &DeckGenerationRequest,
        template_id: &str,
        overall_status: OverallStatus,
    ) -> Self {
        Self {
            deck_id,
            title: request.deck_title(),
            description: request.business_description.trim().to_string(),
            template_id: template_id.to_string(),
            overall_status,
            request_hash: request_hash(request).to_prefixed_hex(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Fingerprint of everything in a request that shapes the generated deck
pub fn request_hash(request: &DeckGenerationRequest) -> ContentHash {
    let images = if request.auto_populate_images {
        "images"
    } else {
        "no-images"
    };
    ContentHash::from_fields(
        REQUEST_FIELDS
            .iter()
            .map(|name| request.field(name).unwrap_or_default().trim())
            .chain(std::iter::once(images)),
    )
}

/// A deck as persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDeck {
    pub metadata: DeckMetadata,
    pub slides: Vec<GeneratedSlide>,
}

/// Durable storage for assembled decks
pub trait DeckPersister: Send + Sync {
    /// Store a deck and return its id. Repeating the call with the same
    /// metadata must not create a second deck.
    fn store(&self, slides: &[GeneratedSlide], metadata: &DeckMetadata) -> Result<DeckId>;
}

/// File-based deck store
pub struct FileDeckStore {
    root: PathBuf,
}

impl FileDeckStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Default store location
    pub fn default_store() -> Self {
        Self::new(".deckcraft/decks")
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.decks_dir)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &DeckId) -> PathBuf {
        self.root.join(format!("{}{}", id, DECK_EXTENSION))
    }

    /// Write a deck to disk, replacing any earlier copy
    pub fn save(&self, deck: &StoredDeck) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.root)?;
        let path = self.path_for(&deck.metadata.deck_id);
        let content = serde_json::to_string_pretty(deck)
            .map_err(|e| DeckError::Storage(format!("Failed to serialize deck: {}", e)))?;

        // Readers never see a partially written file
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &path)?;
        Ok(path)
    }

    /// Load a deck by id
    pub fn load(&self, id: &DeckId) -> Result<StoredDeck> {
        let path = self.path_for(id);
        if !path.exists() {
            return Err(DeckError::DeckNotFound(id.to_string()));
        }
        let content = std::fs::read_to_string(&path)?;
        serde_json::from_str(&content).map_err(|e| {
            DeckError::Storage(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Metadata of every stored deck, newest first. Unreadable files are skipped.
    pub fn list(&self) -> Result<Vec<DeckMetadata>> {
        let mut decks = Vec::new();

        if !self.root.exists() {
            return Ok(decks);
        }

        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            let is_deck = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.ends_with(DECK_EXTENSION))
                .unwrap_or(false);
            if !is_deck {
                continue;
            }
            let content = std::fs::read_to_string(&path)?;
            match serde_json::from_str::<StoredDeck>(&content) {
                Ok(deck) => decks.push(deck.metadata),
                Err(e) => log::warn!("skipping unreadable deck {}: {}", path.display(), e),
            }
        }

        decks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(decks)
    }
}

impl DeckPersister for FileDeckStore {
    fn store(&self, slides: &[GeneratedSlide], metadata: &DeckMetadata) -> Result<DeckId> {
        let deck = StoredDeck {
            metadata: metadata.clone(),
            slides: slides.to_vec(),
        };
        let path = self.save(&deck)?;
        log::info!("stored deck {} at {}", metadata.deck_id, path.display());
        Ok(metadata.deck_id)
    }
}

/// Deck store that keeps everything in memory
#[derive(Default)]
pub struct MemoryDeckStore {
    decks: Mutex<HashMap<DeckId, StoredDeck>>,
    writes: AtomicUsize,
}

impl MemoryDeckStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &DeckId) -> Option<StoredDeck> {
        self.decks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.decks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of `store` calls received
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl DeckPersister for MemoryDeckStore {
    fn store(&self, slides: &[GeneratedSlide], metadata: &DeckMetadata) -> Result<DeckId> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let deck = StoredDeck {
            metadata: metadata.clone(),
            slides: slides.to_vec(),
        };
        self.decks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(metadata.deck_id, deck);
        Ok(metadata.deck_id)
    }
}
