//! Development asset server

use anyhow::Result;
use axum::routing::get;
use axum::Router;
use kiln_asset::{AssetResolver, ResolverHandle};
use std::path::Path;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub fn run(root: &Path, addr: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kiln=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let (config, engine) = super::load_pipeline(root)?;
    let prefix = config.path_prefix.clone();
    let resolver = AssetResolver::new(config, Box::new(engine));
    let assets = ResolverHandle::new(resolver);

    let app = Router::new()
        .route("/", get(index))
        .layer(TraceLayer::new_for_http());
    let app = kiln_serve::mount(app, assets);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Serving assets under {} on http://{}", prefix, addr);
        axum::serve(listener, app).await?;
        Ok::<_, anyhow::Error>(())
    })
}

async fn index() -> &'static str {
    "kiln asset server"
}
