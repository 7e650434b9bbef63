//! Error types for Kiln

use thiserror::Error;

/// The main error type for Kiln operations
#[derive(Debug, Error)]
pub enum KilnError {
    /// The requested logical asset does not exist under any search path.
    #[error("Missing asset: {0}")]
    AssetMissing(String),

    /// No manifest file at the given path. Raised by manifest loading only;
    /// nothing consumes it internally yet.
    #[error("Missing manifest: {0}")]
    ManifestMissing(String),

    #[error("Engine error: {0}")]
    EngineError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),
}

/// Result type alias for Kiln operations
pub type Result<T> = std::result::Result<T, KilnError>;

impl From<toml::de::Error> for KilnError {
    fn from(err: toml::de::Error) -> Self {
        KilnError::TomlParseError(err.to_string())
    }
}
