#![deny(unused_crate_dependencies)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

mod cache;
mod city;
mod config;
mod error;
mod fetch;
mod format;
mod parse;
mod routes;
mod trigger;

use std::sync::Arc;

use axum::http::Method;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::compression::CompressionLayer;

use crate::{
    cache::{HttpSource, OfferCache},
    config::Config,
};

#[cfg(all(target_env = "musl", target_pointer_width = "64"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    log::info!("shutting down");
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> core::result::Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let config = Config::from_env()?;
    log::info!("{config:?}");

    // lives until the process exits; nothing is ever evicted
    let cache = Arc::new(OfferCache::new(HttpSource::new(
        config.base_url.clone(),
        config.fetch_timeout,
    )));

    let compression_layer: CompressionLayer = CompressionLayer::new()
        .br(true)
        .deflate(true)
        .gzip(true)
        .zstd(true);
    let cors_layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(Any);

    let app = routes::router(cache)
        .layer(cors_layer)
        .layer(compression_layer);

    let listener = TcpListener::bind(config.addr).await?;
    log::info!("listening on http://{}", config.addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
