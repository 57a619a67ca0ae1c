use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use immo_price::{PredictionResponse, PropertyAttributes, ResponseVariant};

use super::context::ApiContext;
use super::error::ApiError;

fn respond(
    ctx: &ApiContext,
    payload: Result<Json<PropertyAttributes>, JsonRejection>,
    variant: ResponseVariant,
) -> Result<Json<PredictionResponse>, ApiError> {
    let Json(attributes) = payload?;
    let response = ctx.service.respond(&attributes, variant)?;
    Ok(Json(response))
}

/// Price range for end users.
#[tracing::instrument(skip_all)]
pub async fn predict_handler(
    State(ctx): State<ApiContext>,
    payload: Result<Json<PropertyAttributes>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    respond(&ctx, payload, ResponseVariant::Ranged)
}

/// Raw estimate for trusted callers.
#[tracing::instrument(skip_all)]
pub async fn internal_predict_handler(
    State(ctx): State<ApiContext>,
    payload: Result<Json<PropertyAttributes>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    respond(&ctx, payload, ResponseVariant::Plain)
}

pub fn router() -> Router<ApiContext> {
    Router::new()
        .route("/predict", post(predict_handler))
        .nest(
            "/internal",
            Router::new().route("/predict", post(internal_predict_handler)),
        )
}
