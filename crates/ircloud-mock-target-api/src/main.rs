// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Target-manager (VWS) HTTP service.
//!
//! Exposes the management API described in the project's `POST /targets`,
//! `GET/PUT/DELETE /targets/{id}`, `GET /summary`, `GET
//! /targets/{id}/summary` and `GET /duplicates/{id}` endpoints, plus the
//! administrative fixture endpoints (`/reset`, `/databases`, ...) used by
//! test harnesses and by the query-api service to discover databases.
//!
//! # Usage
//!
//! ```bash
//! ircloud-mock-target-api --port 8080 --duplicate-matcher average-hash
//! ```

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use ircloud_mock_core::clock::SystemClock;
use ircloud_mock_core::image::{ImageMatcherChoice, TargetRaterChoice};
use ircloud_mock_core::store::Store;
use ircloud_mock_target_api::{render, routes, state};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Target-manager (VWS) service for the image-recognition cloud mock.
#[derive(Parser, Debug)]
#[command(name = "ircloud-mock-target-api")]
#[command(about = "Target-manager (VWS) HTTP service")]
#[command(version)]
struct Args {
    /// HTTP server port.
    #[arg(short, long, env = "IRCLOUD_MOCK_TARGET_API_PORT", default_value_t = 8080)]
    port: u16,

    /// Bind address.
    #[arg(short, long, env = "IRCLOUD_MOCK_TARGET_API_BIND", default_value = "0.0.0.0")]
    bind: String,

    /// Image matcher used by `GET /duplicates/{id}`.
    #[arg(long, env = "IRCLOUD_MOCK_DUPLICATE_MATCHER", default_value = "exact")]
    duplicate_matcher: ImageMatcherChoice,

    /// Rater used to assign a tracking rating once a target finishes
    /// processing.
    #[arg(long, env = "IRCLOUD_MOCK_TARGET_RATER", default_value = "random")]
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
        Store::new(),
        Arc::new(SystemClock),
        args.duplicate_matcher.build(),
        args.target_rater.build(),
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
    info!("ircloud-mock-target-api v{}", env!("CARGO_PKG_VERSION"));
    info!("listening on http://{addr}");

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
