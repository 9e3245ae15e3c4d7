use std::collections::BTreeMap;

use axum::{extract::Extension, Json};

use super::ApiError;
use crate::services::{AnalyticsService, IncidentSummary};

// GET /api/analytics/severity
pub async fn by_severity(
    Extension(analytics): Extension<AnalyticsService>,
) -> Result<Json<BTreeMap<String, u64>>, ApiError> {
    Ok(Json(analytics.by_severity().await?))
}

// GET /api/analytics/status
pub async fn by_status(
    Extension(analytics): Extension<AnalyticsService>,
) -> Result<Json<BTreeMap<String, u64>>, ApiError> {
    Ok(Json(analytics.by_status().await?))
}

// GET /api/analytics/summary
pub async fn summary(
    Extension(analytics): Extension<AnalyticsService>,
) -> Result<Json<IncidentSummary>, ApiError> {
    Ok(Json(analytics.summary().await?))
}
