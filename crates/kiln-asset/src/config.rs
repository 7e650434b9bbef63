//! Asset pipeline settings

use crate::base_url::BaseUrl;
use kiln_core::Result;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Hash algorithms available for subresource integrity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrityAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl IntegrityAlgorithm {
    /// The token prefix used in integrity strings, e.g. "sha256"
    pub fn label(&self) -> &'static str {
        match self {
            IntegrityAlgorithm::Sha256 => "sha256",
            IntegrityAlgorithm::Sha384 => "sha384",
            IntegrityAlgorithm::Sha512 => "sha512",
        }
    }
}

/// Immutable settings snapshot for the asset pipeline.
///
/// Constructed once and never mutated; build a new value to change
/// behavior. Unknown keys in the settings file are ignored so an older
/// binary keeps loading a newer config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// URL prefix compiled assets are served under
    pub path_prefix: String,

    /// Integrity algorithms in emission order; empty disables integrity
    pub subresource_integrity: Vec<IntegrityAlgorithm>,

    /// Root URL assets are addressed from ("" = host-relative)
    pub base_url: BaseUrl,

    /// Extra directories searched for asset sources, relative to the root
    pub search_paths: Vec<String>,

    /// Glob patterns expanded during precompile, after explicit entrypoints
    pub precompile: Vec<String>,

    /// Use fingerprinted asset names
    pub digest: bool,

    /// Compress compiled output (consumed by engine implementations)
    pub compress: bool,

    /// Optional engine cache directory
    pub cache: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path_prefix: "/assets".to_string(),
            subresource_integrity: Vec::new(),
            base_url: BaseUrl::default(),
            search_paths: Vec::new(),
            precompile: ["*.js", "*.css", "*.png", "*.jpg", "*.gif", "*.svg"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            digest: true,
            compress: true,
            cache: None,
        }
    }
}

impl Config {
    /// Load settings from `kiln.toml` under `root`, falling back to defaults
    /// when the file does not exist.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join("kiln.toml");
        if !path.is_file() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(&path)?;
        let config = toml::from_str(&raw)?;
        Ok(config)
    }

    /// Returns true if the given source URL does not satisfy the same-origin
    /// policy relative to the configured base URL.
    pub fn crossorigin(&self, source: &str) -> bool {
        self.base_url.crossorigin(source)
    }
}
