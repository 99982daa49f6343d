use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::debug;

use trafficwatch_common::EventReport;

use crate::{ApiError, AppState};

pub async fn api_report(
    State(state): State<Arc<AppState>>,
    body: Result<Json<EventReport>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(report) = body.map_err(|e| {
        debug!(error = %e, "Rejected report body");
        ApiError::MalformedPayload
    })?;

    let event = state.ingestor.submit(report).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "status": "success",
            "id": event.id,
        })),
    ))
}
