//! CLI command implementations

pub mod compile;
pub mod serve;
pub mod watch;

use anyhow::Result;
use kiln_asset::{Config, DirectoryEngine};
use std::path::Path;

/// Load settings and build the engine for an application root.
pub(crate) fn load_pipeline(root: &Path) -> Result<(Config, DirectoryEngine)> {
    let config = Config::load(root)?;
    let engine = DirectoryEngine::new(root, &config);
    Ok((config, engine))
}
