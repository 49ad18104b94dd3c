//! Inbound axum surface. Handlers translate route parameters into core
//! calls and hand JSON payloads to the rendering layer; templating itself
//! lives outside this service.

use crate::config::Config;
use crate::core::catalog::CatalogService;
use crate::error::AppError;
use axum::http::{header::CONTENT_TYPE, Method};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
use tower_http::cors::CorsLayer;
use tracing::info;

pub mod handlers;

use handlers::{company_handler, fallback_handler, game_detail_handler, games_handler, root_handler};

pub struct AppState {
    pub catalog: CatalogService,
    pub default_page_size: u32,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Arc<Self>, AppError> {
        Ok(Arc::new(Self {
            catalog: CatalogService::from_config(config)?,
            default_page_size: config.default_page_size,
        }))
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/", get(root_handler))
        .route("/games", get(games_handler))
        .route("/games/{slug}/{id}", get(game_detail_handler))
        .route("/companies/{slug}", get(company_handler))
        .fallback(fallback_handler)
        .layer(cors)
        .with_state(state)
}

pub async fn serve(config: Config) -> crate::Result<()> {
    let state = AppState::from_config(&config)?;
    let app = build_router(state);

    let address = format!("0.0.0.0:{}", config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind {address}: {e}"));
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    info!("Server shutting down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
