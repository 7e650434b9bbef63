//! Compiler engine interface and the directory-backed implementation

use crate::config::Config;
use crate::types::CompiledAsset;
use kiln_core::{ContentHash, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Directories probed under the application root, in search order
const DEFAULT_SEARCH_PATHS: &[&str] = &["assets", "app/assets", "lib/assets", "vendor/assets"];

/// Interface to the content pipeline that turns source files into compiled
/// assets.
///
/// Lookup outcomes are modeled explicitly: `Ok(Some)` found, `Ok(None)`
/// source absent (benign), `Err` broken engine state. Batch callers skip
/// the former and abort on the latter.
pub trait CompilerEngine: Send + Sync {
    /// Look up an asset by logical or fingerprinted name.
    fn find_asset(&self, name: &str) -> Result<Option<CompiledAsset>>;

    /// Compile one asset into `target_dir` under its digest name.
    fn compile(&self, name: &str, target_dir: &Path) -> Result<Option<CompiledAsset>>;

    /// All logical paths the engine can currently resolve.
    fn logical_paths(&self) -> Result<Vec<String>>;
}

/// Engine that serves sources verbatim from asset directories on disk.
///
/// Content transformation is identity; what this engine supplies is the
/// identity/fingerprint contract around raw files: digest naming, content
/// types, and etags. Every lookup re-reads the filesystem, so results are
/// never stale.
pub struct DirectoryEngine {
    search_paths: Vec<PathBuf>,
}

impl DirectoryEngine {
    /// Build an engine rooted at an application directory, combining the
    /// conventional asset directories that exist with the configured extras.
    pub fn new<P: AsRef<Path>>(root: P, config: &Config) -> Self {
        let root = root.as_ref();
        let mut search_paths = Vec::new();

        for dir in DEFAULT_SEARCH_PATHS {
            let path = root.join(dir);
            if path.is_dir() {
                search_paths.push(path);
            }
        }

        for extra in &config.search_paths {
            let path = root.join(extra);
            if path.is_dir() && !search_paths.contains(&path) {
                search_paths.push(path);
            }
        }

        Self { search_paths }
    }

    /// Directories the engine searches, in order
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    fn locate(&self, logical: &str) -> Option<PathBuf> {
        // Request paths reach here verbatim; only plain relative names may
        // escape into the search directories.
        let well_formed = Path::new(logical)
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !well_formed {
            return None;
        }

        self.search_paths
            .iter()
            .map(|dir| dir.join(logical))
            .find(|candidate| candidate.is_file())
    }

    fn load(&self, logical: &str, file: &Path) -> Result<CompiledAsset> {
        let source = fs::read(file)?;
        let hash = ContentHash::from_bytes(&source).to_hex();

        Ok(CompiledAsset {
            logical_path: logical.to_string(),
            digest_path: digest_path(logical, &hash),
            content_type: content_type_for(logical).to_string(),
            source,
            etag: hash,
        })
    }
}

impl CompilerEngine for DirectoryEngine {
    fn find_asset(&self, name: &str) -> Result<Option<CompiledAsset>> {
        if let Some(file) = self.locate(name) {
            return self.load(name, &file).map(Some);
        }

        // A digest-named query resolves only while its fingerprint matches
        // the current content; stale fingerprints return None and are the
        // serving layer's fallback to handle.
        if let Some((logical, fingerprint)) = strip_fingerprint(name) {
            if let Some(file) = self.locate(&logical) {
                let asset = self.load(&logical, &file)?;
                if asset.etag == fingerprint {
                    return Ok(Some(asset));
                }
            }
        }

        Ok(None)
    }

    fn compile(&self, name: &str, target_dir: &Path) -> Result<Option<CompiledAsset>> {
        let Some(asset) = self.find_asset(name)? else {
            return Ok(None);
        };

        let dest = target_dir.join(&asset.digest_path);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&dest, &asset.source)?;

        Ok(Some(asset))
    }

    fn logical_paths(&self) -> Result<Vec<String>> {
        let mut paths = Vec::new();
        for dir in &self.search_paths {
            collect_files(dir, dir, &mut paths)?;
        }
        paths.sort();
        paths.dedup();
        Ok(paths)
    }
}

/// Split a fingerprinted name `base-<hex>.<ext>` into the logical
/// `base.<ext>` and the hex fingerprint.
///
/// Returns None when the name carries no run of lowercase hex characters
/// between a hyphen and its final extension.
pub fn strip_fingerprint(name: &str) -> Option<(String, String)> {
    let dot = name.rfind('.')?;
    let (stem, ext) = name.split_at(dot);
    let dash = stem.rfind('-')?;
    let fingerprint = &stem[dash + 1..];

    if fingerprint.is_empty()
        || !fingerprint
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    {
        return None;
    }

    Some((format!("{}{}", &stem[..dash], ext), fingerprint.to_string()))
}

/// Insert a content hash before the extension: "app.css" -> "app-<hex>.css"
fn digest_path(logical: &str, hash: &str) -> String {
    // Only a dot inside the final path segment marks an extension
    let dot = logical
        .rfind('.')
        .filter(|&dot| dot > logical.rfind('/').map_or(0, |slash| slash + 1));

    match dot {
        Some(dot) => format!("{}-{}{}", &logical[..dot], hash, &logical[dot..]),
        None => format!("{}-{}", logical, hash),
    }
}

fn content_type_for(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    match ext {
        "css" => "text/css",
        "js" | "mjs" => "application/javascript",
        "json" | "map" => "application/json",
        "html" => "text/html",
        "txt" => "text/plain",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "wasm" => "application/wasm",
        _ => "application/octet-stream",
    }
}

fn collect_files(base: &Path, dir: &Path, out: &mut Vec<String>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with('.'))
            .unwrap_or(true);
        if hidden {
            continue;
        }

        if path.is_dir() {
            collect_files(base, &path, out)?;
        } else if let Ok(rel) = path.strip_prefix(base) {
            out.push(rel.to_string_lossy().replace('\\', "/"));
        }
    }

    Ok(())
}
