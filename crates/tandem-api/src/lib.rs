pub mod handlers;

use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

pub use handlers::{new_connection_map, ApiState, ConnectionMap};

/// Build the full router: WebSocket transport at /ws, ops surface under
/// /api. Public so tests can run the server on their own listener.
pub fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/status", get(handlers::handle_status))
        .route("/reports", get(handlers::handle_reports));

    Router::new()
        .route("/ws", get(handlers::handle_ws))
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(state)
}

pub async fn serve(state: ApiState, bind_addr: &str, port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(format!("{bind_addr}:{port}")).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");
    serve_on(state, listener).await
}

/// Serve on an already-bound listener.
pub async fn serve_on(state: ApiState, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let app = router(state);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;
    Ok(())
}
