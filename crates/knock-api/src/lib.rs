pub mod middleware;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use knock_services::AuthGate;

/// Put `router` behind the gate. Every route, including fallbacks, is covered.
pub fn protect(router: Router, gate: Arc<AuthGate>) -> Router {
    router.layer(axum::middleware::from_fn_with_state(gate, middleware::knock))
}

/// Static directory served behind the gate.
pub fn site(root: &Path, gate: Arc<AuthGate>) -> Router {
    let files = Router::new().fallback_service(ServeDir::new(root));
    protect(files, gate).layer(TraceLayer::new_for_http())
}

pub async fn serve(
    app: Router,
    listen: SocketAddr,
    mut shutdown: broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(listen).await?;
    tracing::info!(addr = %listen, "gate listening");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        let _ = shutdown.recv().await;
    })
    .await?;
    Ok(())
}
