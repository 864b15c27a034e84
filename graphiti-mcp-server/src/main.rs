use std::{net::SocketAddr, sync::Arc};

use axum::{extract::State, http::StatusCode, response::IntoResponse, Router};
use graphiti_bridge::{driver::neo4j::Neo4jConnector, GraphHandle};
use graphiti_mcp_server::{
    config::{ServerConfig, Transport},
    resources::ServerStats,
    startup::start_graph,
    GraphitiMcpServer,
};
use rmcp::{
    transport::streamable_http_server::{
        session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
    },
    ServiceExt,
};
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Tracing ───────────────────────────────────────────────────────────────
    // stdout carries the stdio transport, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("graphiti_mcp_server=info".parse()?)
                .add_directive("graphiti_bridge=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    info!("graphiti-mcp-server starting");

    // ── Config ────────────────────────────────────────────────────────────────
    dotenvy::dotenv().ok();
    let config = ServerConfig::from_env().map_err(|e| {
        error!("Configuration error: {}", e);
        e
    })?;

    // ── Graph ─────────────────────────────────────────────────────────────────
    let handle = start_graph(|name| std::env::var(name).ok(), Arc::new(Neo4jConnector))
        .await
        .map_err(|e| {
            error!("Graph initialization failed: {}", e);
            e
        })?;
    let stats = Arc::new(ServerStats::new());

    match config.transport {
        Transport::Stdio => serve_stdio(handle, stats).await,
        Transport::Http => serve_http(handle, stats, config.bind_addr).await,
    }
}

async fn serve_stdio(handle: Arc<GraphHandle>, stats: Arc<ServerStats>) -> anyhow::Result<()> {
    info!(transport = "stdio", "server started, waiting for client");
    let transport = (tokio::io::stdin(), tokio::io::stdout());
    let server = GraphitiMcpServer::new(handle, stats).serve(transport).await?;
    server.waiting().await?;
    info!("server stopped");
    Ok(())
}

async fn serve_http(
    handle: Arc<GraphHandle>,
    stats: Arc<ServerStats>,
    bind_addr: SocketAddr,
) -> anyhow::Result<()> {
    // ── MCP service ───────────────────────────────────────────────────────────
    let session_manager = Arc::new(LocalSessionManager::default());
    let mcp_service = StreamableHttpService::new(
        {
            let handle = handle.clone();
            move || Ok(GraphitiMcpServer::new(handle.clone(), stats.clone()))
        },
        session_manager,
        StreamableHttpServerConfig::default(),
    );

    // ── Axum router ───────────────────────────────────────────────────────────
    let app = Router::new()
        .route("/mcp", axum::routing::any_service(mcp_service))
        .route("/health", axum::routing::get(health_handler))
        .route("/ready", axum::routing::get(ready_handler))
        .with_state(handle);

    // ── Listen ────────────────────────────────────────────────────────────────
    info!(addr = %bind_addr, transport = "http", "listening");
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

/// Liveness probe: 200 while the process is running.
async fn health_handler() -> impl IntoResponse {
    StatusCode::OK
}

/// Readiness probe: 200 once the graph client is initialized.
async fn ready_handler(State(handle): State<Arc<GraphHandle>>) -> impl IntoResponse {
    if handle.is_initialized() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Graceful shutdown on SIGTERM or Ctrl-C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => { info!("received Ctrl-C, shutting down"); }
        _ = terminate => { info!("received SIGTERM, shutting down"); }
    }
}
