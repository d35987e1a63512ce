//! Error types for DeckCraft

use thiserror::Error;

/// The main error type for DeckCraft operations
#[derive(Debug, Error)]
pub enum DeckError {
    /// Upstream timed out, refused the connection, or answered 429/5xx.
    #[error("Transient upstream error: {0}")]
    TransientUpstream(String),

    /// Upstream answered, but the payload was malformed or empty.
    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),

    #[error("Catalog load error: {0}")]
    CatalogLoad(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Deck not found: {0}")]
    DeckNotFound(String),

    #[error("Invalid deck id: {0}")]
    InvalidId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("TOML serialization error: {0}")]
    TomlSer(String),

    #[error("JSON error: {0}")]
    Json(String),
}

impl DeckError {
    /// True for failures that come from an external service call.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            DeckError::TransientUpstream(_) | DeckError::InvalidResponse(_)
        )
    }
}

/// Result type alias for DeckCraft operations
pub type Result<T> = std::result::Result<T, DeckError>;

impl From<toml::de::Error> for DeckError {
    fn from(err: toml::de::Error) -> Self {
        DeckError::TomlParse(err.to_string())
    }
}

impl From<toml::ser::Error> for DeckError {
    fn from(err: toml::ser::Error) -> Self {
        DeckError::TomlSer(err.to_string())
    }
}

impl From<serde_json::Error> for DeckError {
    fn from(err: serde_json::Error) -> Self {
        DeckError::Json(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_classification() {
        assert!(DeckError::TransientUpstream("timeout".into()).is_upstream());
        assert!(DeckError::InvalidResponse("empty".into()).is_upstream());
        assert!(!DeckError::CatalogLoad("missing".into()).is_upstream());
        assert!(!DeckError::Storage("disk full".into()).is_upstream());
    }

    #[test]
    fn test_toml_error_conversion() {
        let err: DeckError = toml::from_str::<toml::Value>("= broken").unwrap_err().into();
        assert!(matches!(err, DeckError::TomlParse(_)));
    }
}
