use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::context::ApiContext;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// Width of the feature vector the loaded model consumes.
    pub features: usize,
    pub model: String,
}

/// Health check
pub async fn health_handler(State(ctx): State<ApiContext>) -> impl IntoResponse {
    let artifact = ctx.service.artifact();
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            features: artifact.width(),
            model: artifact.model().name().to_string(),
        }),
    )
}

pub fn router(ctx: ApiContext) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use immo_price::fixtures;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_check() {
        let api = router(crate::api::test_context());

        let response = api
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .method("GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let health: HealthResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.features, fixtures::WIDTH);
        assert_eq!(health.model, "linear");
    }
}
