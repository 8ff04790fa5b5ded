// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Query (VWQ) HTTP service.
//!
//! Exposes `POST /v1/query`, matching an uploaded image against every
//! database the configured target-manager service knows about. Owns no
//! store of its own: every request re-fetches the current database
//! snapshot from `--target-manager-base-url`.
//!
//! # Usage
//!
//! ```bash
//! ircloud-mock-query-api --port 8082 --target-manager-base-url http://localhost:8081
//! ```

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use ircloud_mock_core::clock::SystemClock;
use ircloud_mock_core::image::{ImageMatcherChoice, TargetRaterChoice};
use ircloud_mock_query_api::client::TargetManagerClient;
use ircloud_mock_query_api::{render, routes, state};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Query (VWQ) service for the image-recognition cloud mock.
#[derive(Parser, Debug)]
#[command(name = "ircloud-mock-query-api")]
#[command(about = "Query (VWQ) HTTP service")]
#[command(version)]
struct Args {
    /// HTTP server port.
    #[arg(short, long, env = "IRCLOUD_MOCK_QUERY_API_PORT", default_value_t = 8082)]
    port: u16,

    /// Bind address.
    #[arg(short, long, env = "IRCLOUD_MOCK_QUERY_API_BIND", default_value = "0.0.0.0")]
    bind: String,

    /// Base URL of the target-manager service this query service queries
    /// for database snapshots.
    #[arg(long, env = "TARGET_MANAGER_BASE_URL")]
    target_manager_base_url: String,

    /// Seconds a deleted target stays visible to queries before entering
    /// the delete-processing window (§4.6, §4.7).
    #[arg(long, env = "IRCLOUD_MOCK_DELETION_RECOGNITION_SECONDS", default_value_t = 0.2)]
    deletion_recognition_seconds: f64,

    /// Seconds a deleted target spends in the delete-processing window
    /// (triggering the canned match-processing response) before it is
    /// fully gone.
    #[arg(long, env = "IRCLOUD_MOCK_DELETION_PROCESSING_SECONDS", default_value_t = 3.0)]
    deletion_processing_seconds: f64,

    /// Image matcher used to decide whether a query image matches a target.
    #[arg(long, env = "IRCLOUD_MOCK_QUERY_IMAGE_MATCHER", default_value = "average-hash")]
    query_image_matcher: ImageMatcherChoice,

    /// Rater used to finalize a target's processing window when this
    /// service observes it for the first time.
    #[arg(long, env = "IRCLOUD_MOCK_TARGET_RATER", default_value = "perceptual-quality")]
    target_rater: TargetRaterChoice,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "IRCLOUD_MOCK_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&args.log_level)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let state = Arc::new(state::AppState::new(
        TargetManagerClient::new(args.target_manager_base_url.clone()),
        Arc::new(SystemClock),
        args.query_image_matcher.build(),
        args.target_rater.build(),
        args.deletion_recognition_seconds,
        args.deletion_processing_seconds,
    ));

    let app = routes::build_router(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(render::handle_panic));

    let addr = format!("{}:{}", args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("ircloud-mock-query-api v{}", env!("CARGO_PKG_VERSION"));
    info!("listening on http://{addr}");
    info!("target manager: {}", args.target_manager_base_url);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    info!("shutting down");
}
