//! knockd — serves a directory behind a shared-secret session gate.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use knock_core::{Argon2Verifier, CookieName, KnockConfig, VERSION};
use knock_services::{AuthGate, SessionStore, Sweeper};

fn config_path_from_args() -> Result<Option<PathBuf>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [] => Ok(None),
        [flag, path] if flag == "--config" => Ok(Some(PathBuf::from(path))),
        other => anyhow::bail!("usage: knockd [--config <path>] (got {:?})", other),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load config
    let config = match config_path_from_args()? {
        Some(path) => KnockConfig::load_from(path)?,
        None => {
            if let Err(e) = KnockConfig::write_default_if_missing() {
                tracing::warn!(error = %e, "failed to write default config");
            }
            KnockConfig::load()?
        }
    };
    let listen = config.validate().context("invalid configuration")?;

    // Cookie name is fixed for the life of the process.
    let cookie_name = CookieName::generate(&config.gate.cookie_prefix)
        .context("failed to generate cookie name")?;
    tracing::info!(version = VERSION, cookie = %cookie_name, "knockd starting");

    // Shared state
    let store = SessionStore::new();
    let gate = Arc::new(AuthGate::new(
        store.clone(),
        Arc::new(Argon2Verifier),
        config.gate.key_hash.clone(),
        cookie_name,
    ));

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

    let sweeper_task = tokio::spawn(
        Sweeper::with_timing(
            store,
            config.gate.sweep_interval(),
            config.gate.session_idle(),
            shutdown_tx.subscribe(),
        )
        .run(),
    );

    tracing::info!(root = %config.server.root.display(), "serving directory");
    let app = knock_api::site(&config.server.root, gate);
    let server_task = tokio::spawn(knock_api::serve(app, listen, shutdown_tx.subscribe()));

    // ── Wait for exit ────────────────────────────────────────────────────────

    let served = server_task.await.context("server task panicked")?;

    // Server is gone (signal or failure); stop the sweeper too.
    let _ = shutdown_tx.send(());
    if let Err(e) = sweeper_task.await {
        tracing::error!(error = %e, "session sweeper panicked");
    }

    served.context("server failed")?;
    tracing::info!("knockd stopped");
    Ok(())
}
