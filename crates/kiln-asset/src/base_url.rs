//! Base URL handling for asset references

use serde::Deserialize;
use url::Url;

/// Root URL assets are addressed from.
///
/// An empty root means host-relative serving: joined paths come back
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub struct BaseUrl {
    url: String,
}

impl BaseUrl {
    /// Create a new base URL
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// The wrapped root URL string
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// Join the base URL with a path.
    ///
    /// The result carries exactly one separating slash, whether or not the
    /// root ends with one or the path starts with one.
    pub fn join(&self, path: &str) -> String {
        if self.url.is_empty() {
            return path.to_string();
        }

        format!(
            "{}/{}",
            self.url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Returns true if `source` is linked cross-origin relative to this base
    /// URL, i.e. its scheme, host, or port differ.
    ///
    /// Unparsable input (either side) counts as same-origin. This value gates
    /// whether `integrity`/`crossorigin` attributes are emitted, so the
    /// failure polarity is load-bearing: an unparsable URL must not flip them
    /// on.
    pub fn crossorigin(&self, source: &str) -> bool {
        if self.url.is_empty() {
            return false;
        }

        let (Ok(base), Ok(other)) = (Url::parse(&self.url), Url::parse(source)) else {
            return false;
        };

        base.scheme() != other.scheme()
            || base.host_str() != other.host_str()
            || base.port_or_known_default() != other.port_or_known_default()
    }
}

impl From<String> for BaseUrl {
    fn from(url: String) -> Self {
        Self { url }
    }
}
