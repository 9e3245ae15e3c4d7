use axum::{
    body::Body,
    extract::{Extension, Multipart, Path, Query},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::debug;

use super::{record_event, ApiError};
use crate::entities::{incident, sea_orm_active_enums::IncidentStatus};
use crate::services::{IncidentService, NewIncident, ServiceError};
use crate::storage::Attachment;

/// Incident fields as sent by the reporting client.
///
/// Every field is optional on the wire so that missing required fields
/// produce one validation message instead of a deserializer error.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportIncidentRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub severity: Option<String>,
    pub reporter_id: Option<i32>,
    pub status: Option<String>,
}

impl ReportIncidentRequest {
    pub fn validate(self) -> Result<NewIncident, ServiceError> {
        let title = self.title.filter(|t| !t.trim().is_empty());
        let severity = self.severity.filter(|s| !s.trim().is_empty());

        let mut missing = Vec::new();
        if title.is_none() {
            missing.push("title");
        }
        if self.latitude.is_none() {
            missing.push("latitude");
        }
        if self.longitude.is_none() {
            missing.push("longitude");
        }
        if severity.is_none() {
            missing.push("severity");
        }

        match (title, self.latitude, self.longitude, severity) {
            (Some(title), Some(latitude), Some(longitude), Some(severity)) => {
                let status = self.status.as_deref().map(parse_status).transpose()?;
                Ok(NewIncident {
                    title,
                    description: self.description,
                    latitude,
                    longitude,
                    severity,
                    reporter_id: self.reporter_id,
                    status,
                })
            }
            _ => Err(ServiceError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            ))),
        }
    }
}

/// Full replacement body for `PUT /api/incidents/:id`.
///
/// The photo reference is owned by the attachment store and is not replaceable.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveIncidentRequest {
    pub title: String,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub severity: Option<String>,
    #[serde(default)]
    pub status: IncidentStatus,
    pub reporter_id: Option<i32>,
    pub assigned_officer_id: Option<i32>,
    pub assigned_volunteer_id: Option<i32>,
    pub assignment_note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusFilter {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusParam {
    pub status: String,
}

pub(crate) fn parse_status(raw: &str) -> Result<IncidentStatus, ServiceError> {
    raw.parse()
        .map_err(|e: crate::entities::sea_orm_active_enums::ParseIncidentStatusError| {
            ServiceError::Validation(e.to_string())
        })
}

fn not_found(id: i32) -> ApiError {
    ServiceError::NotFound {
        entity: "incident",
        id,
    }
    .into()
}

// POST /api/incidents/report - multipart with a JSON `meta` part and optional `image`
pub async fn report_incident(
    Extension(incidents): Extension<IncidentService>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut meta: Option<ReportIncidentRequest> = None;
    let mut image: Option<Attachment> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "meta" => {
                let bytes = field.bytes().await?;
                let parsed = serde_json::from_slice(&bytes)
                    .map_err(|e| ApiError::BadRequest(format!("Invalid meta part: {}", e)))?;
                meta = Some(parsed);
            }
            "image" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await?;
                image = Some(Attachment {
                    file_name,
                    content_type,
                    data,
                });
            }
            other => debug!("Ignoring multipart field {:?}", other),
        }
    }

    let new = meta
        .ok_or_else(|| ApiError::BadRequest("No meta field found".to_string()))?
        .validate()?;
    let created = incidents.report(new, image).await?;

    record_event("incidents", "report_incident", "Incident reported");
    tracing::Span::current().record("incident_id", created.id);

    Ok((StatusCode::CREATED, Json(created)))
}

// POST /api/incidents - JSON body, no attachment
pub async fn create_incident(
    Extension(incidents): Extension<IncidentService>,
    Json(payload): Json<ReportIncidentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let created = incidents.report(payload.validate()?, None).await?;

    record_event("incidents", "report_incident", "Incident reported");
    tracing::Span::current().record("incident_id", created.id);

    Ok((StatusCode::CREATED, Json(created)))
}

// GET /api/incidents?status=ASSIGNED
pub async fn list_incidents(
    Extension(incidents): Extension<IncidentService>,
    Query(filter): Query<StatusFilter>,
) -> Result<Json<Vec<incident::Model>>, ApiError> {
    let list = match filter.status.as_deref() {
        Some(raw) => incidents.by_status(parse_status(raw)?).await?,
        None => incidents.all().await?,
    };
    Ok(Json(list))
}

// GET /api/incidents/:id
pub async fn get_incident(
    Extension(incidents): Extension<IncidentService>,
    Path(id): Path<i32>,
) -> Result<Json<incident::Model>, ApiError> {
    incidents
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

// PUT /api/incidents/:id - replaces every mutable field
pub async fn save_incident(
    Extension(incidents): Extension<IncidentService>,
    Path(id): Path<i32>,
    Json(payload): Json<SaveIncidentRequest>,
) -> Result<Json<incident::Model>, ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ServiceError::Validation("Missing required fields: title".to_string()).into());
    }

    let existing = incidents.get(id).await?.ok_or_else(|| not_found(id))?;

    let saved = incidents
        .save(incident::Model {
            id,
            title: payload.title,
            description: payload.description,
            latitude: payload.latitude,
            longitude: payload.longitude,
            severity: payload.severity,
            image_path: existing.image_path,
            status: payload.status,
            reported_at: existing.reported_at,
            reporter_id: payload.reporter_id,
            assigned_officer_id: payload.assigned_officer_id,
            assigned_volunteer_id: payload.assigned_volunteer_id,
            assignment_note: payload.assignment_note,
        })
        .await?;

    record_event("incidents", "save_incident", "Incident replaced");
    tracing::Span::current().record("incident_id", saved.id);

    Ok(Json(saved))
}

// DELETE /api/incidents/:id - succeeds whether or not the incident exists
pub async fn delete_incident(
    Extension(incidents): Extension<IncidentService>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    if incidents.delete(id).await? {
        record_event("incidents", "delete_incident", "Incident deleted");
        tracing::Span::current().record("incident_id", id);
    }
    Ok(StatusCode::NO_CONTENT)
}

// PUT /api/incidents/:id/status?status=RESOLVED
pub async fn update_status(
    Extension(incidents): Extension<IncidentService>,
    Path(id): Path<i32>,
    Query(param): Query<StatusParam>,
) -> Result<Json<incident::Model>, ApiError> {
    let status = parse_status(&param.status)?;
    let updated = incidents.update_status(id, status).await?;

    record_event("incidents", "update_status", "Incident status updated");
    tracing::Span::current().record("incident_id", id);

    Ok(Json(updated))
}

// GET /api/incidents/:id/image
pub async fn serve_image(
    Extension(incidents): Extension<IncidentService>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    let incident = incidents.get(id).await?.ok_or_else(|| not_found(id))?;
    let reference = incident
        .image_path
        .ok_or_else(|| ApiError::NotFound("Incident has no image".to_string()))?;

    let data = incidents.load_attachment(&reference).await?;
    let content_type = mime_guess::from_path(&reference)
        .first_or_octet_stream()
        .to_string();

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, "public, max-age=3600".to_string()),
        ],
        Body::from(data),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> ReportIncidentRequest {
        ReportIncidentRequest {
            title: Some("Landslide".to_string()),
            description: Some("Road blocked".to_string()),
            latitude: Some(30.73),
            longitude: Some(79.06),
            severity: Some("HIGH".to_string()),
            reporter_id: Some(9),
            status: None,
        }
    }

    #[test]
    fn complete_request_becomes_new_incident() {
        let new = complete().validate().unwrap();
        assert_eq!(
            new,
            NewIncident::new("Landslide", 30.73, 79.06, "HIGH")
                .with_description("Road blocked")
                .with_reporter(9)
        );
    }

    #[test]
    fn missing_fields_are_listed_together() {
        let err = ReportIncidentRequest {
            title: Some("   ".to_string()),
            latitude: None,
            severity: None,
            ..complete()
        }
        .validate()
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Missing required fields: title, latitude, severity"
        );
    }

    #[test]
    fn explicit_status_is_parsed() {
        let new = ReportIncidentRequest {
            status: Some("in_progress".to_string()),
            ..complete()
        }
        .validate()
        .unwrap();
        assert_eq!(new.status, Some(IncidentStatus::InProgress));

        let err = ReportIncidentRequest {
            status: Some("CLOSED".to_string()),
            ..complete()
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn meta_accepts_camel_case_json() {
        let parsed: ReportIncidentRequest = serde_json::from_str(
            r#"{"title":"Fire","latitude":12.97,"longitude":77.59,"severity":"LOW","reporterId":4}"#,
        )
        .unwrap();
        assert_eq!(parsed.reporter_id, Some(4));
        assert!(parsed.validate().is_ok());
    }
}
