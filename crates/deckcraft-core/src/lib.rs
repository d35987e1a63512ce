//! DeckCraft Core - Foundational types shared by every DeckCraft crate
//!
//! - `DeckId` - Stable identifiers for stored decks
//! - `ContentHash` - SHA-256 based fingerprints
//! - Error types and Result alias

mod error;
mod hash;
mod id;

pub use error::{DeckError, Result};
pub use hash::ContentHash;
pub use id::DeckId;
