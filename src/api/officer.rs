use axum::{extract::Extension, Json};
use serde::Deserialize;

use super::{record_event, ApiError};
use crate::entities::incident;
use crate::services::{AssignRequest, AssignmentService, ServiceError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignPayload {
    pub incident_id: Option<i32>,
    pub officer_id: Option<i32>,
    pub volunteer_id: Option<i32>,
    pub note: Option<String>,
}

impl TryFrom<AssignPayload> for AssignRequest {
    type Error = ServiceError;

    fn try_from(payload: AssignPayload) -> Result<Self, Self::Error> {
        let incident_id = payload
            .incident_id
            .ok_or_else(|| ServiceError::Validation("incidentId is required".to_string()))?;
        Ok(AssignRequest {
            incident_id,
            officer_id: payload.officer_id,
            volunteer_id: payload.volunteer_id,
            note: payload.note,
        })
    }
}

// POST /api/officer/assign
pub async fn assign(
    Extension(assignments): Extension<AssignmentService>,
    Json(payload): Json<AssignPayload>,
) -> Result<Json<incident::Model>, ApiError> {
    let request = AssignRequest::try_from(payload)?;
    let incident_id = request.incident_id;
    let updated = assignments.assign(request).await?;

    record_event("incidents", "assign", "Incident assigned");
    tracing::Span::current().record("incident_id", incident_id);

    Ok(Json(updated))
}
