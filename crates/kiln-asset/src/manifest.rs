//! Manifest persistence and batch precompilation

use crate::config::Config;
use crate::engine::CompilerEngine;
use glob::Pattern;
use kiln_core::{KilnError, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Entry names compiled before any configured glob pattern
pub const DEFAULT_ENTRYPOINTS: &[&str] = &["app.css", "app.js"];

/// Mapping from logical path to digest path produced by a precompile run.
///
/// An entry is present only when the underlying compile succeeded; sources
/// that were simply absent leave no trace beyond `attempted`.
#[derive(Debug, Default, Clone)]
pub struct Manifest {
    assets: BTreeMap<String, String>,
    attempted: Vec<String>,
}

impl Manifest {
    /// The logical-to-digest mapping
    pub fn assets(&self) -> &BTreeMap<String, String> {
        &self.assets
    }

    /// Every entry name the precompile run attempted, in order
    pub fn attempted(&self) -> &[String] {
        &self.attempted
    }

    /// Read a previously written manifest file.
    ///
    /// Fails with `ManifestMissing` when no file exists at the path.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(KilnError::ManifestMissing(path.display().to_string()));
        }

        let raw = fs::read_to_string(path)?;
        let assets: BTreeMap<String, String> = serde_json::from_str(&raw)?;
        Ok(Self {
            assets,
            attempted: Vec::new(),
        })
    }
}

/// Drives the compiler engine over a configured asset set and persists the
/// resulting manifest.
pub struct Precompiler<'a> {
    engine: &'a dyn CompilerEngine,
    config: &'a Config,
}

impl<'a> Precompiler<'a> {
    pub fn new(engine: &'a dyn CompilerEngine, config: &'a Config) -> Self {
        Self { engine, config }
    }

    /// Compile the explicit entrypoints, then every logical path matching
    /// the configured precompile patterns, into `target_dir`, and write
    /// `manifest.json` there.
    ///
    /// An absent source is skipped without failing the run; any other
    /// engine failure aborts it. `progress` runs once per successfully
    /// compiled entry with the entry name.
    pub fn precompile(
        &self,
        target_dir: &Path,
        entrypoints: &[&str],
        mut progress: impl FnMut(&str),
    ) -> Result<Manifest> {
        fs::create_dir_all(target_dir)?;

        let mut manifest = Manifest::default();

        for name in entrypoints {
            self.compile_entry(name, target_dir, &mut manifest, &mut progress)?;
        }

        for name in self.pattern_matches()? {
            if manifest.assets.contains_key(&name) {
                continue;
            }
            self.compile_entry(&name, target_dir, &mut manifest, &mut progress)?;
        }

        write_manifest(target_dir, &manifest)?;
        Ok(manifest)
    }

    fn compile_entry(
        &self,
        name: &str,
        target_dir: &Path,
        manifest: &mut Manifest,
        progress: &mut impl FnMut(&str),
    ) -> Result<()> {
        manifest.attempted.push(name.to_string());

        if let Some(asset) = self.engine.compile(name, target_dir)? {
            manifest.assets.insert(asset.logical_path, asset.digest_path);
            progress(name);
        }

        Ok(())
    }

    fn pattern_matches(&self) -> Result<Vec<String>> {
        if self.config.precompile.is_empty() {
            return Ok(Vec::new());
        }

        let mut patterns = Vec::new();
        for raw in &self.config.precompile {
            let pattern = Pattern::new(raw).map_err(|e| {
                KilnError::ConfigError(format!("invalid precompile pattern '{}': {}", raw, e))
            })?;
            patterns.push(pattern);
        }

        let mut matches = Vec::new();
        for logical in self.engine.logical_paths()? {
            if patterns.iter().any(|p| p.matches(&logical)) {
                matches.push(logical);
            }
        }
        Ok(matches)
    }
}

// One durable snapshot after all entries were attempted. The rename keeps a
// crash mid-write from leaving a truncated manifest behind.
fn write_manifest(target_dir: &Path, manifest: &Manifest) -> Result<()> {
    let path = target_dir.join("manifest.json");
    let tmp = target_dir.join("manifest.json.tmp");

    fs::write(&tmp, serde_json::to_string_pretty(&manifest.assets)?)?;
    fs::rename(&tmp, &path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::DirectoryEngine;
    use std::path::PathBuf;

    fn temp_root() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("kiln_manifest_test_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(dir.join("assets")).unwrap();
        dir
    }

    #[test]
    fn test_precompile_skips_missing_entrypoints() {
        let root = temp_root();
        fs::write(root.join("assets/app.css"), b"body {}").unwrap();

        let config = Config {
            precompile: Vec::new(),
            ..Config::default()
        };
        let engine = DirectoryEngine::new(&root, &config);
        let target = root.join("public/assets");

        let manifest = Precompiler::new(&engine, &config)
            .precompile(&target, DEFAULT_ENTRYPOINTS, |_| {})
            .unwrap();

        assert_eq!(manifest.assets().len(), 1);
        assert!(manifest.assets().contains_key("app.css"));
        assert_eq!(manifest.attempted(), &["app.css".to_string(), "app.js".to_string()]);

        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_precompile_expands_patterns() {
        let root = temp_root();
        fs::create_dir_all(root.join("assets/img")).unwrap();
        fs::write(root.join("assets/app.css"), b"body {}").unwrap();
        fs::write(root.join("assets/extra.js"), b"var e;").unwrap();
        fs::write(root.join("assets/img/logo.png"), b"png bytes").unwrap();
        fs::write(root.join("assets/notes.md"), b"# skip me").unwrap();

        let config = Config::default();
        let engine = DirectoryEngine::new(&root, &config);
        let target = root.join("public/assets");

        let manifest = Precompiler::new(&engine, &config)
            .precompile(&target, DEFAULT_ENTRYPOINTS, |_| {})
            .unwrap();

        assert!(manifest.assets().contains_key("app.css"));
        assert!(manifest.assets().contains_key("extra.js"));
        assert!(manifest.assets().contains_key("img/logo.png"));
        assert!(!manifest.assets().contains_key("notes.md"));
        // The entrypoint compile wins; the pattern pass does not repeat it
        let attempts = manifest
            .attempted()
            .iter()
            .filter(|n| n.as_str() == "app.css")
            .count();
        assert_eq!(attempts, 1);

        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_precompile_reports_progress_per_success() {
        let root = temp_root();
        fs::write(root.join("assets/app.css"), b"body {}").unwrap();

        let config = Config {
            precompile: Vec::new(),
            ..Config::default()
        };
        let engine = DirectoryEngine::new(&root, &config);
        let target = root.join("public/assets");

        let mut compiled = Vec::new();
        Precompiler::new(&engine, &config)
            .precompile(&target, DEFAULT_ENTRYPOINTS, |name| {
                compiled.push(name.to_string())
            })
            .unwrap();

        assert_eq!(compiled, vec!["app.css".to_string()]);

        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_precompile_rejects_invalid_pattern() {
        let root = temp_root();
        let config = Config {
            precompile: vec!["[".to_string()],
            ..Config::default()
        };
        let engine = DirectoryEngine::new(&root, &config);
        let target = root.join("public/assets");

        let err = Precompiler::new(&engine, &config)
            .precompile(&target, &[], |_| {})
            .unwrap_err();
        assert!(matches!(err, KilnError::ConfigError(_)));

        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_manifest_roundtrip() {
        let root = temp_root();
        fs::write(root.join("assets/app.css"), b"body {}").unwrap();
        fs::write(root.join("assets/app.js"), b"var a;").unwrap();

        let config = Config::default();
        let engine = DirectoryEngine::new(&root, &config);
        let target = root.join("public/assets");

        let manifest = Precompiler::new(&engine, &config)
            .precompile(&target, DEFAULT_ENTRYPOINTS, |_| {})
            .unwrap();

        let loaded = Manifest::load(&target.join("manifest.json")).unwrap();
        assert_eq!(loaded.assets(), manifest.assets());

        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_manifest_file_is_pretty_printed() {
        let root = temp_root();
        fs::write(root.join("assets/app.css"), b"body {}").unwrap();

        let config = Config::default();
        let engine = DirectoryEngine::new(&root, &config);
        let target = root.join("public/assets");

        Precompiler::new(&engine, &config)
            .precompile(&target, DEFAULT_ENTRYPOINTS, |_| {})
            .unwrap();

        let raw = fs::read_to_string(target.join("manifest.json")).unwrap();
        assert!(raw.contains('\n'));
        assert!(raw.trim_start().starts_with('{'));
        assert!(!target.join("manifest.json.tmp").exists());

        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_manifest_load_missing_file() {
        let root = temp_root();
        let path = root.join("public/assets/manifest.json");

        let err = Manifest::load(&path).unwrap_err();
        assert!(matches!(err, KilnError::ManifestMissing(_)));
        assert!(err.to_string().contains("manifest.json"));

        fs::remove_dir_all(&root).ok();
    }
}
