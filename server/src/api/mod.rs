use std::net::SocketAddr;

use anyhow::Context;
use axum::routing::get;
use axum::Router;
use context::ApiContext;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub(crate) mod context;
pub(crate) mod error;

// Routes
mod health;
mod predict;

pub async fn setup_and_serve(state: ApiContext, addr: SocketAddr) -> anyhow::Result<()> {
    let width = state.service.artifact().width();
    let app = app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("unable to bind {addr}"))?;
    tracing::info!(%addr, features = width, "service is up and running");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("error starting service")
}

pub fn app(state: ApiContext) -> Router {
    api_router()
        .with_state(state.clone())
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        // The health router is attached here so we don't attach the logging middleware to it
        .merge(health::router(state))
}

fn api_router() -> Router<ApiContext> {
    Router::new()
        .route("/", get(welcome_handler))
        .merge(predict::router())
}

async fn welcome_handler() -> &'static str {
    "Welcome to the immo-price estimator. POST property attributes to /predict."
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "unable to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
pub(crate) fn test_context() -> ApiContext {
    use immo_price::{fixtures, PredictionService, ServiceConfig};

    let service = PredictionService::new(fixtures::loaded(), ServiceConfig::default())
        .expect("fixture service is valid");
    ApiContext::new(service)
}
