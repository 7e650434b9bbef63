//! Asset resolution against a compiler engine

use crate::config::{Config, IntegrityAlgorithm};
use crate::engine::CompilerEngine;
use crate::types::Asset;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use kiln_core::{KilnError, Result};
use sha2::{Digest, Sha256, Sha384, Sha512};
use std::sync::{Arc, RwLock};

/// Resolves logical asset names into fully described assets.
///
/// Holds no cache of its own: every resolve re-queries the engine, so
/// freshness tracks the engine's staleness policy.
pub struct AssetResolver {
    config: Config,
    engine: Box<dyn CompilerEngine>,
}

impl AssetResolver {
    pub fn new(config: Config, engine: Box<dyn CompilerEngine>) -> Self {
        Self { config, engine }
    }

    /// The settings this resolver was built with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The engine this resolver queries
    pub fn engine(&self) -> &dyn CompilerEngine {
        self.engine.as_ref()
    }

    /// Resolve a logical path into an asset.
    ///
    /// Fails with `AssetMissing` when the engine cannot locate the path
    /// under any configured search path; a digest path is never fabricated.
    pub fn resolve(&self, logical_path: &str) -> Result<Asset> {
        let compiled = self
            .engine
            .find_asset(logical_path)?
            .ok_or_else(|| KilnError::AssetMissing(logical_path.to_string()))?;

        let chosen = if self.config.digest {
            &compiled.digest_path
        } else {
            &compiled.logical_path
        };
        let path = format!("{}/{}", self.config.path_prefix, chosen);

        Ok(Asset::new(
            path,
            self.config.base_url.clone(),
            self.integrity(&compiled.source),
            compiled.logical_path,
            Some(compiled.digest_path),
            compiled.content_type,
            compiled.source,
        ))
    }

    /// Returns true if subresource integrity is configured
    pub fn subresource_integrity(&self) -> bool {
        !self.config.subresource_integrity.is_empty()
    }

    /// Returns true if the given source URL is served cross-origin
    pub fn crossorigin(&self, source: &str) -> bool {
        self.config.crossorigin(source)
    }

    /// All logical paths the engine can currently resolve
    pub fn logical_paths(&self) -> Result<Vec<String>> {
        self.engine.logical_paths()
    }

    // One token per configured algorithm, space-joined in configured order.
    // Consumers of the `integrity` attribute get the concatenated string
    // as-is, so the format must stay stable.
    fn integrity(&self, source: &[u8]) -> Option<String> {
        if !self.subresource_integrity() {
            return None;
        }

        let tokens: Vec<String> = self
            .config
            .subresource_integrity
            .iter()
            .map(|algorithm| integrity_token(*algorithm, source))
            .collect();
        Some(tokens.join(" "))
    }
}

fn integrity_token(algorithm: IntegrityAlgorithm, source: &[u8]) -> String {
    let digest = match algorithm {
        IntegrityAlgorithm::Sha256 => Sha256::digest(source).to_vec(),
        IntegrityAlgorithm::Sha384 => Sha384::digest(source).to_vec(),
        IntegrityAlgorithm::Sha512 => Sha512::digest(source).to_vec(),
    };

    format!("{}-{}", algorithm.label(), BASE64.encode(digest))
}

/// Clonable handle to the resolver shared between the serving layer and
/// whatever rebuilds it.
///
/// `replace` swaps the shared reference atomically. Requests already
/// holding a snapshot keep serving from the old engine state until they
/// complete; none observes a half-constructed resolver.
#[derive(Clone)]
pub struct ResolverHandle {
    inner: Arc<RwLock<Arc<AssetResolver>>>,
}

impl ResolverHandle {
    pub fn new(resolver: AssetResolver) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(resolver))),
        }
    }

    /// Snapshot the current resolver
    pub fn current(&self) -> Arc<AssetResolver> {
        self.inner.read().unwrap().clone()
    }

    /// Swap in a freshly constructed resolver
    pub fn replace(&self, resolver: AssetResolver) {
        *self.inner.write().unwrap() = Arc::new(resolver);
    }
}
