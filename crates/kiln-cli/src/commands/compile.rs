//! Compile assets and write the manifest

use anyhow::Result;
use kiln_asset::{Precompiler, DEFAULT_ENTRYPOINTS};
use std::path::Path;

pub fn run(root: &Path, output: &Path) -> Result<()> {
    println!("Compiling assets...");

    let (config, engine) = super::load_pipeline(root)?;
    let precompiler = Precompiler::new(&engine, &config);

    let manifest = match precompiler.precompile(output, DEFAULT_ENTRYPOINTS, |_| {}) {
        Ok(manifest) => manifest,
        Err(e) => {
            eprintln!("Error compiling assets: {}", e);
            std::process::exit(1);
        }
    };

    println!("Assets compiled successfully:");
    for (logical, digest) in manifest.assets() {
        println!("  {} -> {}", logical, digest);
    }
    println!("Output directory: {}", output.display());

    Ok(())
}
