//! `sealer` — envelope sealing service entry point.
//!
//! Startup sequence:
//! 1. Load and validate bootstrap [`Config`] from environment variables.
//! 2. Initialise the telemetry pipeline.
//! 3. Initialise the SSM client.
//! 4. Hydrate [`ServiceSettings`] from Parameter Store. Steps 3 and 4 share
//!    one startup deadline.
//! 5. Decode the sealing key.
//! 6. Build the Axum router and start serving.
//!
//! Any failure before step 6 aborts the process; once serving, failures are
//! confined to the request that hit them.

mod aws;
mod config;
mod crypto;
mod hydrate;
mod key;
mod server;
mod settings;
mod telemetry;

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use config::Config;
use key::SealingKey;
use server::state::AppState;
use settings::ServiceSettings;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(cfg.otel_exporter_otlp_endpoint.as_deref(), &cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        listen_port = cfg.listen_port,
        config_path = %cfg.config_path,
        "sealer starting"
    );

    // -----------------------------------------------------------------------
    // 3–4. AWS clients and settings hydration, under one startup deadline
    // -----------------------------------------------------------------------
    let deadline = Duration::from_secs(cfg.startup_timeout_secs);
    let hydrated = within_deadline(deadline, load_settings(&cfg)).await?;

    let report = &hydrated.report;
    info!(
        applied = ?report.applied,
        missing = ?report.missing,
        skipped = report.skipped.len(),
        "settings hydrated"
    );
    let settings = hydrated.record;

    // -----------------------------------------------------------------------
    // 5. Sealing key
    // -----------------------------------------------------------------------
    let key = SealingKey::from_base64(&settings.secret_key)
        .context("failed to load sealing key from settings")?;
    info!(
        key_bits = key.bits(),
        locale_set = !settings.locale.is_empty(),
        favorite_color_set = !settings.favorite_color.is_empty(),
        "sealing key loaded"
    );
    drop(settings);

    // -----------------------------------------------------------------------
    // 6. HTTP server
    // -----------------------------------------------------------------------
    let state = AppState::new(key, cfg.auth_context.clone().into_bytes(), cfg.max_body_bytes);
    let router = server::router::build(state);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, "listening");

    let served = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    telemetry::shutdown_telemetry();
    served.context("server error")
}

/// Run startup `work`, failing if it does not finish within `deadline`.
async fn within_deadline<T>(
    deadline: Duration,
    work: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(deadline, work)
        .await
        .with_context(|| format!("startup exceeded {}s deadline", deadline.as_secs_f64()))?
}

/// Load the AWS config and hydrate [`ServiceSettings`] from Parameter Store.
async fn load_settings(cfg: &Config) -> Result<hydrate::Hydrated<ServiceSettings>> {
    let aws = aws::AwsClients::init(cfg.ssm_endpoint_url.as_deref()).await;
    let store = aws::ParameterStore::new(aws.ssm);

    hydrate::hydrate::<ServiceSettings, _>(&store, &cfg.config_path)
        .await
        .context("failed to hydrate settings from Parameter Store")
}

/// Resolve when the process receives Ctrl-C.
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
