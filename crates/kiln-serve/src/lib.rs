//! HTTP serving for compiled assets
//!
//! Mounts an asset endpoint onto an axum application. Requests under the
//! configured path prefix are answered live from the compiler engine, with
//! a fingerprint-stripping fallback for stale digest-named URLs; every
//! other request passes through to the wrapped application's own routes.

use axum::extract::State;
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use kiln_asset::{strip_fingerprint, CompiledAsset, CompilerEngine, ResolverHandle};
use kiln_core::Result;

/// One year, the standard lifetime for fingerprinted assets
const CACHE_CONTROL: &str = "public, max-age=31536000";

/// Mount asset serving onto `app` under the resolver's configured path
/// prefix.
///
/// The handle is shared: swapping a new resolver into it takes effect on
/// the next request without rebuilding the router.
pub fn mount(app: Router, assets: ResolverHandle) -> Router {
    let prefix = assets.current().config().path_prefix.clone();
    app.nest_service(&prefix, get(serve_asset).with_state(assets))
}

async fn serve_asset(State(assets): State<ResolverHandle>, uri: Uri) -> Response {
    let name = uri.path().trim_start_matches('/').to_string();
    let resolver = assets.current();

    match lookup(resolver.engine(), &name) {
        Ok(Some(asset)) => {
            tracing::debug!(name = %name, digest = %asset.digest_path, "asset hit");
            asset_response(asset)
        }
        Ok(None) => {
            tracing::debug!(name = %name, "asset miss");
            (
                StatusCode::NOT_FOUND,
                [(header::CONTENT_TYPE, "text/plain")],
                "Asset not found",
            )
                .into_response()
        }
        Err(err) => {
            tracing::error!(name = %name, error = %err, "asset lookup failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain")],
                format!("Asset error: {err}"),
            )
                .into_response()
        }
    }
}

/// Exact lookup first; a miss on a digest-named request retries under the
/// logical name, so a stale or hand-constructed fingerprinted URL still
/// resolves to current content.
fn lookup(engine: &dyn CompilerEngine, name: &str) -> Result<Option<CompiledAsset>> {
    if let Some(asset) = engine.find_asset(name)? {
        return Ok(Some(asset));
    }

    if let Some((logical, _)) = strip_fingerprint(name) {
        return engine.find_asset(&logical);
    }

    Ok(None)
}

fn asset_response(asset: CompiledAsset) -> Response {
    let length = asset.source.len().to_string();
    let etag = format!("\"{}\"", asset.etag);

    (
        [
            (header::CONTENT_TYPE, asset.content_type),
            (header::CONTENT_LENGTH, length),
            (header::ETAG, etag),
            (header::CACHE_CONTROL, CACHE_CONTROL.to_string()),
        ],
        asset.source,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use kiln_asset::{AssetResolver, Config, DirectoryEngine};
    use kiln_core::KilnError;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tower::ServiceExt;

    fn temp_root() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("kiln_serve_test_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(dir.join("assets")).unwrap();
        dir
    }

    fn test_app(root: &Path) -> Router {
        let config = Config::default();
        let engine = DirectoryEngine::new(root, &config);
        let resolver = AssetResolver::new(config, Box::new(engine));

        let app = Router::new().route("/", get(|| async { "home" }));
        mount(app, ResolverHandle::new(resolver))
    }

    async fn fetch(app: Router, path: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let response = app
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, body.to_vec())
    }

    #[tokio::test]
    async fn test_serves_asset_with_cache_headers() {
        let root = temp_root();
        fs::write(root.join("assets/app.css"), b"body { margin: 0 }").unwrap();

        let (status, headers, body) = fetch(test_app(&root), "/assets/app.css").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"body { margin: 0 }");
        assert_eq!(headers[header::CONTENT_TYPE], "text/css");
        assert_eq!(headers[header::CONTENT_LENGTH], "18");
        assert_eq!(headers[header::CACHE_CONTROL], "public, max-age=31536000");

        let etag = headers[header::ETAG].to_str().unwrap();
        assert!(etag.starts_with('"') && etag.ends_with('"'));

        fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn test_serves_current_digest_name() {
        let root = temp_root();
        fs::write(root.join("assets/app.css"), b"body {}").unwrap();

        let config = Config::default();
        let engine = DirectoryEngine::new(&root, &config);
        let digest_path = engine
            .find_asset("app.css")
            .unwrap()
            .unwrap()
            .digest_path;

        let (status, _, body) =
            fetch(test_app(&root), &format!("/assets/{digest_path}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"body {}");

        fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn test_fallback_strips_stale_fingerprint() {
        let root = temp_root();
        fs::write(root.join("assets/app.css"), b"current content").unwrap();

        let stale = format!("/assets/app-{}.css", "0123456789abcdef".repeat(2));
        let (status, _, body) = fetch(test_app(&root), &stale).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"current content");

        fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn test_missing_asset_is_404() {
        let root = temp_root();

        let (status, headers, body) = fetch(test_app(&root), "/assets/missing.css").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(headers[header::CONTENT_TYPE], "text/plain");
        assert_eq!(body, b"Asset not found");

        fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn test_non_asset_request_passes_through() {
        let root = temp_root();

        let (status, _, body) = fetch(test_app(&root), "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"home");

        fs::remove_dir_all(&root).ok();
    }

    struct BrokenEngine;

    impl CompilerEngine for BrokenEngine {
        fn find_asset(&self, _name: &str) -> Result<Option<CompiledAsset>> {
            Err(KilnError::EngineError("processor crashed".to_string()))
        }

        fn compile(
            &self,
            _name: &str,
            _target_dir: &Path,
        ) -> Result<Option<CompiledAsset>> {
            Err(KilnError::EngineError("processor crashed".to_string()))
        }

        fn logical_paths(&self) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_engine_failure_is_500_with_message() {
        let resolver = AssetResolver::new(Config::default(), Box::new(BrokenEngine));
        let app = mount(Router::new(), ResolverHandle::new(resolver));

        let (status, headers, body) = fetch(app, "/assets/app.css").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(headers[header::CONTENT_TYPE], "text/plain");
        assert_eq!(
            String::from_utf8(body).unwrap(),
            "Asset error: Engine error: processor crashed"
        );
    }

    #[tokio::test]
    async fn test_swapped_resolver_serves_next_request() {
        let root = temp_root();
        fs::write(root.join("assets/app.css"), b"body {}").unwrap();

        let config = Config::default();
        let engine = DirectoryEngine::new(&root, &config);
        let handle = ResolverHandle::new(AssetResolver::new(config, Box::new(engine)));
        let app = mount(Router::new(), handle.clone());

        let (status, _, _) = fetch(app.clone(), "/assets/app.css").await;
        assert_eq!(status, StatusCode::OK);

        handle.replace(AssetResolver::new(Config::default(), Box::new(BrokenEngine)));
        let (status, _, _) = fetch(app, "/assets/app.css").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        fs::remove_dir_all(&root).ok();
    }
}
