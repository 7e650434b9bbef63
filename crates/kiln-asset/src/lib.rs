//! Kiln Asset - Content-addressed asset pipeline
//!
//! This crate maps logical asset names ("app.css") to fingerprinted,
//! cache-busted output paths, computes subresource integrity hashes, and
//! persists the logical-to-digest mapping produced by a precompile run.

mod base_url;
mod config;
mod engine;
mod manifest;
mod resolver;
mod types;

pub use base_url::BaseUrl;
pub use config::{Config, IntegrityAlgorithm};
pub use engine::{strip_fingerprint, CompilerEngine, DirectoryEngine};
pub use manifest::{Manifest, Precompiler, DEFAULT_ENTRYPOINTS};
pub use resolver::{AssetResolver, ResolverHandle};
pub use types::{Asset, CompiledAsset};
