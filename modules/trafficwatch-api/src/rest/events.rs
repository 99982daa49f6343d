use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json},
};
use serde::Deserialize;

use trafficwatch_common::{EventsQuery, DEFAULT_RADIUS_KM};

use crate::{ApiError, AppState};

/// Raw query string. Kept as strings so bad numbers map to our own messages
/// instead of the extractor's rejection.
#[derive(Deserialize)]
pub struct EventsParams {
    lat: Option<String>,
    lon: Option<String>,
    radius: Option<String>,
}

/// Missing, unparsable or non-positive radius falls back to the default.
pub fn parse_radius(radius: Option<&str>) -> f64 {
    radius
        .and_then(|r| r.trim().parse::<f64>().ok())
        .filter(|r| r.is_finite() && *r > 0.0)
        .unwrap_or(DEFAULT_RADIUS_KM)
}

fn parse_coord(raw: Option<&str>) -> Option<f64> {
    raw?.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

impl EventsParams {
    pub fn into_query(self) -> Result<EventsQuery, ApiError> {
        let lat = parse_coord(self.lat.as_deref()).ok_or(ApiError::InvalidLatitude)?;
        let lon = parse_coord(self.lon.as_deref()).ok_or(ApiError::InvalidLongitude)?;
        Ok(EventsQuery::new(lat, lon, parse_radius(self.radius.as_deref())))
    }
}

pub async fn api_events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EventsParams>,
) -> Result<impl IntoResponse, ApiError> {
    let query = params.into_query()?;
    let events = state.queries.find_nearby(&query).await?;
    Ok(Json(events))
}
