use std::sync::Arc;

use anyhow::Context;
use axum::http::{header, HeaderName, Method};
use axum::{extract::FromRef, Router};
use routes::{category_router, questions_router, quizzes_router, status_router};
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::error::ApiError;
use super::routes;
use crate::settings::Settings;

#[derive(FromRef, Clone)]
pub struct AppState {
    pool: SqlitePool,
    settings: Arc<Settings>,
}

impl AppState {
    pub fn new(pool: SqlitePool, settings: Settings) -> Self {
        Self {
            pool,
            settings: Arc::new(settings),
        }
    }
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("true"),
        ])
        .allow_methods([
            Method::GET,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ])
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(status_router())
        .merge(category_router(state.clone()))
        .merge(questions_router(state.clone()))
        .merge(quizzes_router(state))
        .fallback(|| async {
            tracing::info!("Fallback");
            ApiError::not_found()
        })
        .method_not_allowed_fallback(|| async { ApiError::MethodNotAllowed })
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(pool: SqlitePool, settings: Settings) -> anyhow::Result<()> {
    let addr = settings.address();
    let app = build_router(AppState::new(pool, settings));
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("Serving on {addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
