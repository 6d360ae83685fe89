use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use crate::engine::AnalyticsEngine;
use crate::error::AnalyticsError;
use crate::store::{ReadingStore, StoreError};

pub mod handlers;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ReadingStore>,
    pub engine: Arc<AnalyticsEngine>,
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),
    #[error("{0}")]
    NoData(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::BadRequest(_) | Self::Analytics(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            Self::NoData(_) => (StatusCode::NOT_FOUND, self.to_string()),
            Self::Store(e) => {
                tracing::error!(error = %e, "store request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        metrics::counter!("api_errors_total", "status" => status.as_str().to_string()).increment(1);
        (status, Json(serde_json::json!({ "message": message }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/consumers", get(handlers::list_consumers))
        .route("/api/consumers/:consumer_id/hourly", get(handlers::hourly))
        .route("/api/consumers/:consumer_id/hourly-totals", get(handlers::hourly_totals))
        .route("/api/consumers/:consumer_id/tariff/weekly", get(handlers::weekly_tariff))
        .route("/api/consumers/:consumer_id/tariff/monthly", get(handlers::monthly_tariff))
        .route("/api/consumers/:consumer_id/rollup", get(handlers::rollup))
        .route("/api/consumers/:consumer_id/peak-demand", get(handlers::peak_demand))
        .route("/api/consumers/:consumer_id/peak-variance", get(handlers::peak_variance))
        .route("/api/consumers/:consumer_id/patterns", get(handlers::patterns))
        .route("/api/variance", get(handlers::variance))
        .route("/api/rank", get(handlers::rank))
        .with_state(state)
}
