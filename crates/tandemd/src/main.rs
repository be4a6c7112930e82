//! tandemd — Tandem matchmaking and signaling daemon.

use std::time::{Duration, Instant};

use anyhow::Result;

use tandem_api::{new_connection_map, ApiState};
use tandem_core::config::TandemConfig;
use tandem_engine::{Engine, ReportStore};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load config
    if let Err(e) = TandemConfig::write_default_if_missing() {
        tracing::warn!(error = %e, "failed to write default config");
    }
    let config = TandemConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        TandemConfig::default()
    });

    tracing::info!(
        bind = %config.network.bind_addr,
        port = config.network.port,
        email_suffix = %config.matching.email_suffix,
        "tandemd starting"
    );

    // Shared state
    let engine = Engine::new(&config);
    let state = ApiState {
        engine: engine.clone(),
        connections: new_connection_map(),
        reports: ReportStore::new(),
        started_at: Instant::now(),
    };

    // ── Shutdown channel ─────────────────────────────────────────────────────
    let (shutdown_tx, _) = tokio::sync::broadcast::channel::<()>(1);

    {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutdown signal received");
            let _ = shutdown.send(());
        });
    }

    // ── Spawn tasks ──────────────────────────────────────────────────────────

    let server_task = {
        let bind_addr = config.network.bind_addr.clone();
        let port = config.network.port;
        tokio::spawn(async move {
            if let Err(e) = tandem_api::serve(state, &bind_addr, port).await {
                tracing::error!(error = %e, "server failed");
            }
        })
    };

    let snapshot_printer = {
        let engine = engine.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(30));
            loop {
                interval.tick().await;
                let snap = engine.snapshot().await;
                tracing::info!(
                    registered = snap.registered,
                    queued = snap.queued,
                    paired = snap.paired,
                    "engine snapshot"
                );
            }
        })
    };

    // ── Wait for exit ────────────────────────────────────────────────────────

    let mut shutdown_rx = shutdown_tx.subscribe();

    tokio::select! {
        _ = shutdown_rx.recv()   => tracing::info!("shutting down"),
        r = server_task          => tracing::error!("server task exited: {:?}", r),
        r = snapshot_printer     => tracing::error!("snapshot printer exited: {:?}", r),
    }

    Ok(())
}
