//! Asset value types

use crate::base_url::BaseUrl;
use std::fmt;

/// Output of a compiler engine lookup: one compiled asset together with its
/// identity and content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledAsset {
    /// Stable human-chosen name, e.g. "app.css"
    pub logical_path: String,
    /// Content-derived fingerprinted name, e.g. "app-<hash>.css"
    pub digest_path: String,
    pub content_type: String,
    pub source: Vec<u8>,
    /// Opaque content hash, quoted into the HTTP ETag
    pub etag: String,
}

/// A single resolved front end asset.
///
/// Produced fresh on every resolution and immutable afterwards; two
/// resolutions of the same logical asset at the same content state compare
/// equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    path: String,
    base_url: BaseUrl,
    sri: Option<String>,
    logical_path: String,
    digest_path: Option<String>,
    content_type: String,
    source: Vec<u8>,
}

impl Asset {
    pub(crate) fn new(
        path: String,
        base_url: BaseUrl,
        sri: Option<String>,
        logical_path: String,
        digest_path: Option<String>,
        content_type: String,
        source: Vec<u8>,
    ) -> Self {
        Self {
            path,
            base_url,
            sri,
            logical_path,
            digest_path,
            content_type,
            source,
        }
    }

    /// The asset's absolute URL path.
    ///
    /// With digests enabled this is the fingerprinted form, e.g.
    /// "/assets/app-28a6b886de2372ee.css"; otherwise "/assets/app.css".
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The asset's subresource integrity value, if integrity is configured
    pub fn sri(&self) -> Option<&str> {
        self.sri.as_deref()
    }

    /// The logical path, without fingerprinting
    pub fn logical_path(&self) -> &str {
        &self.logical_path
    }

    /// The fingerprinted path, when the engine reported one
    pub fn digest_path(&self) -> Option<&str> {
        self.digest_path.as_deref()
    }

    /// The asset's content type
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// The asset's raw content
    pub fn source(&self) -> &[u8] {
        &self.source
    }

    /// The asset's full URL, e.g. "https://cdn.example.com/assets/app.css"
    pub fn url(&self) -> String {
        self.base_url.join(&self.path)
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url())
    }
}
