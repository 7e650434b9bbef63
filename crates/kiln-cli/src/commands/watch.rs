//! Watch asset directories and recompile on change

use anyhow::{Context, Result};
use kiln_asset::{Precompiler, DEFAULT_ENTRYPOINTS};
use notify::RecursiveMode;
use notify_debouncer_mini::new_debouncer;
use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

pub fn run(root: &Path, output: &Path) -> Result<()> {
    println!("Starting asset watch mode...");
    println!("Press Ctrl+C to stop");

    let (config, engine) = super::load_pipeline(root)?;
    let watch_dirs = engine.search_paths().to_vec();

    if watch_dirs.is_empty() {
        println!("No asset directories found. Looking for:");
        for dir in ["assets", "app/assets", "lib/assets", "vendor/assets"] {
            println!("  {}", root.join(dir).display());
        }
        std::process::exit(1);
    }

    println!("Watching directories:");
    for dir in &watch_dirs {
        println!("  {}", dir.display());
    }

    let (tx, rx) = mpsc::channel();
    let mut debouncer = match new_debouncer(Duration::from_millis(500), tx) {
        Ok(debouncer) => debouncer,
        Err(e) => {
            eprintln!("Error: failed to start file watcher: {}", e);
            std::process::exit(1);
        }
    };

    for dir in &watch_dirs {
        debouncer
            .watcher()
            .watch(dir, RecursiveMode::Recursive)
            .with_context(|| format!("Failed to watch {}", dir.display()))?;
    }

    for result in rx {
        match result {
            Ok(events) => {
                println!("\nChanges detected:");
                for event in &events {
                    println!("  {}", event.path.display());
                }

                println!("Recompiling assets...");
                let precompiler = Precompiler::new(&engine, &config);
                match precompiler.precompile(output, DEFAULT_ENTRYPOINTS, |_| {}) {
                    Ok(_) => println!("Assets recompiled successfully"),
                    Err(e) => eprintln!("Error recompiling assets: {}", e),
                }
            }
            Err(e) => eprintln!("Watch error: {:?}", e),
        }
    }

    Ok(())
}
